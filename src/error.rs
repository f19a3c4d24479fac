//! Error types and handling for the weather bot

use thiserror::Error;

/// Main error type for the weather bot
#[derive(Error, Debug)]
pub enum WeatherBotError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The weather dataset could not be read or parsed
    #[error("Dataset error: {message}")]
    Dataset { message: String },

    /// A matched location lacks the fields needed to build a forecast
    #[error("Malformed dataset entry for '{location}': {message}")]
    MalformedDataset { location: String, message: String },

    /// Entity extraction (NER model) failures
    #[error("Extraction error: {message}")]
    Extraction { message: String },

    /// Messaging platform failures
    #[error("Channel error: {message}")]
    Channel { message: String },

    /// Webhook signature verification failed
    #[error("Invalid signature: {message}")]
    Signature { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WeatherBotError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        Self::Dataset {
            message: message.into(),
        }
    }

    /// Create a new malformed dataset error for a matched location
    pub fn malformed<L: Into<String>, S: Into<String>>(location: L, message: S) -> Self {
        Self::MalformedDataset {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create a new extraction error
    pub fn extraction<S: Into<String>>(message: S) -> Self {
        Self::Extraction {
            message: message.into(),
        }
    }

    /// Create a new channel error
    pub fn channel<S: Into<String>>(message: S) -> Self {
        Self::Channel {
            message: message.into(),
        }
    }

    /// Create a new signature error
    pub fn signature<S: Into<String>>(message: S) -> Self {
        Self::Signature {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether the failure came from a call to an external service
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Extraction { .. } | Self::Channel { .. })
    }

    /// Get a user-friendly error message, suitable for a chat reply
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherBotError::Validation { message } => format!("輸入有誤：{message}"),
            WeatherBotError::Extraction { .. } | WeatherBotError::Channel { .. } => {
                "抱歉，目前無法查詢天氣，請稍後再試。".to_string()
            }
            _ => "抱歉，查詢天氣時發生錯誤，請稍後再試。".to_string(),
        }
    }
}

impl From<serde_json::Error> for WeatherBotError {
    fn from(err: serde_json::Error) -> Self {
        WeatherBotError::dataset(err.to_string())
    }
}
