use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use logsight::config::{Config, LoggingConfig};
use logsight::services::{DatasetRegistry, LogStore};
use logsight::{AppState, build_router};

#[derive(Parser, Debug)]
#[command(name = "logsight", version, about = "Log analytics dashboard backend")]
struct Args {
    /// Path to config.toml (defaults to conf/config.toml, then config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // Guard must stay alive for the file writer to flush
    let _guard = init_tracing(&config.logging);

    let logs = LogStore::load(&config.data.log_file);
    let datasets = DatasetRegistry::new();
    datasets.load_dir(&config.data.query_dir);
    tracing::info!(
        "startup: {} log records, {} query datasets",
        logs.records().len(),
        datasets.len()
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState { config, logs, datasets });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{}", addr);
    tracing::info!("Swagger UI at http://{}/swagger-ui", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match &config.file {
        Some(file) => {
            let path = Path::new(file);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "logsight.log".into());
            let appender = tracing_appender::rolling::daily(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        },
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        },
    }
}
