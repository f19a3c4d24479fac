use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use weatherbot::{
    AppState, BotConfig, HuggingFaceClient, LineMessagingClient, NerLocationExtractor,
    SignatureVerifier, WeatherQueryPipeline, WeatherStore, logging, web,
};

#[derive(Parser)]
#[command(name = "weatherbot", version, about = "LINE weather chat bot")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the webhook server (default)
    Serve,
    /// Answer a single message from the terminal
    Ask { text: String },
}

fn build_pipeline(config: &BotConfig) -> Result<WeatherQueryPipeline> {
    let store = WeatherStore::from_path(&config.weather.data_path)
        .context("Failed to load weather dataset")?
        .with_element_name(config.weather.element_name.clone());

    let recognizer = HuggingFaceClient::new(&config.ner).context("Failed to create NER client")?;
    let extractor = NerLocationExtractor::new(recognizer, config.ner.location_label.clone());

    Ok(WeatherQueryPipeline::new(
        Arc::new(extractor),
        Arc::new(store),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = BotConfig::load_from_path(cli.config).context("Failed to load configuration")?;
    logging::init(&config.logging)?;

    let pipeline = build_pipeline(&config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Ask { text } => {
            let reply = pipeline.answer(&text).await?;
            println!("{reply}");
        }
        Command::Serve => {
            config.validate_secrets()?;
            let channel =
                LineMessagingClient::new(&config.line).context("Failed to create LINE client")?;
            let state = AppState::new(
                pipeline,
                Arc::new(channel),
                SignatureVerifier::new(&config.line.channel_secret),
            );
            let app = web::app(state, &config.server);
            web::run(&config.bind_address(), app).await?;
        }
    }

    Ok(())
}
