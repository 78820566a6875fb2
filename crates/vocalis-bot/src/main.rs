use anyhow::{Context, Result};
use std::sync::Arc;
use strum::IntoEnumIterator;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vocalis_core::event::BotCommand;
use vocalis_infrastructure::EnvConfigLoader;

mod bootstrap;
mod dispatcher;

use dispatcher::Dispatcher;

const DEFAULT_LOG_FILTER: &str = "info,vocalis=debug";

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EnvConfigLoader::from_env()
        .load()
        .context("failed to load configuration")?;
    let app = bootstrap::build(&config).context("failed to start bot")?;

    let commands: Vec<BotCommand> = BotCommand::iter().collect();
    if let Err(e) = app.telegram.set_my_commands(&commands).await {
        warn!(error = %e, "Could not register the command menu");
    }

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Interrupt received"),
                Err(e) => warn!(error = %e, "Failed to listen for interrupt, shutting down"),
            }
            shutdown.cancel();
        }
    });

    let dispatcher = Dispatcher::new(app.telegram, Arc::clone(&app.usecase), shutdown);
    dispatcher.run().await;
    info!("Bot stopped");
    Ok(())
}
