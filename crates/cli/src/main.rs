//! Command-line harness: loads content, hosts one world on the runtime, and
//! plays a short scripted encounter while streaming every event as JSON.
mod config;
mod dirs;
mod scenario;

use anyhow::{Context, Result};
use config::CliConfig;
use spell_content::ContentFactory;
use spell_runtime::{Runtime, RuntimeConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = CliConfig::from_env();
    let _guard = setup_logging(&config)?;

    let factory = ContentFactory::new(config.content.clone());
    let game_config = factory.load_config().context("loading engine config")?;
    let data = factory.load_data().context("loading content tables")?;

    let runtime_config = RuntimeConfig::from_env()
        .context("reading runtime settings")?
        .with_game_config(game_config);
    let runtime = Runtime::builder()
        .config(runtime_config)
        .data(std::sync::Arc::new(data))
        .spawn_units(scenario::cast_list())
        .start()
        .await?;

    let printer = config
        .print_events
        .then(|| scenario::print_events(&runtime.handle()));

    scenario::run(&runtime.handle()).await?;
    runtime.shutdown().await?;

    if let Some(printer) = printer {
        for task in printer {
            task.await.context("event printer task")?;
        }
    }
    Ok(())
}

/// Logs to stderr and to a per-session file.
fn setup_logging(config: &CliConfig) -> Result<WorkerGuard> {
    let log_dir = config.log_dir.clone().unwrap_or_else(dirs::log_dir);
    let session_id = config
        .session_id
        .clone()
        .unwrap_or_else(|| format!("session_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S")));

    let session_log_dir = log_dir.join(&session_id);
    std::fs::create_dir_all(&session_log_dir)
        .with_context(|| format!("creating log directory {}", session_log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "spell.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!("Logging initialized: session={}", session_id);
    tracing::info!("Log file: {}/spell.log", session_log_dir.display());

    Ok(guard)
}
