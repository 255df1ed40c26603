use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use ai_chat_gateway::config::{Config, LoggingConfig};
use ai_chat_gateway::handlers::health::model_available;
use ai_chat_gateway::{AppState, build_router};

#[derive(Parser, Debug)]
#[command(name = "ai-chat-gateway", version, about = "Multilingual chat gateway for a local inference server")]
struct Args {
    /// Path to config.toml (defaults to conf/config.toml when present)
    #[arg(short, long)]
    config: Option<String>,

    /// Override server.host
    #[arg(long)]
    host: Option<String>,

    /// Override server.port
    #[arg(short, long)]
    port: Option<u16>,

    /// List installed models on the inference backend before serving
    #[arg(long)]
    check_backend: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;

    let _log_guard = init_logging(&config.logging)?;

    print_banner(&config);

    let state = Arc::new(AppState::from_config(config)?);

    if args.check_backend {
        check_backend(&state).await;
    }

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("API docs available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Console logging plus an optional daily-rolled file; the guard must outlive the server
fn init_logging(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let mut layers = vec![tracing_subscriber::fmt::layer().with_target(true).boxed()];
    let mut guard = None;

    if let Some(file) = &config.file {
        let path = Path::new(file);
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let file_name = path
            .file_name()
            .with_context(|| format!("logging.file '{}' has no file name", file))?;

        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

        let (writer, file_guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file_name));
        layers.push(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer).boxed());
        guard = Some(file_guard);
    }

    tracing_subscriber::registry().with(env_filter).with(layers).init();
    Ok(guard)
}

fn print_banner(config: &Config) {
    tracing::info!("{}", "=".repeat(60));
    tracing::info!("AI Chat Gateway v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("{}", "=".repeat(60));
    tracing::info!("Text model:   {}", config.inference.text_model);
    tracing::info!("Vision model: {}", config.inference.vision_model);
    tracing::info!("Inference:    {}", config.inference.base_url);
    tracing::info!("Web search:   {}", if config.search.enabled { "enabled" } else { "disabled" });
    tracing::info!("Default language: {}", config.language.default);
    tracing::info!(
        "Upload limit: {} bytes, max concurrent requests: {}",
        config.server.max_body_bytes,
        config.server.max_concurrent_requests
    );
}

async fn check_backend(state: &AppState) {
    let inference = &state.config.inference;
    match state.inference.list_models(inference.health_timeout()).await {
        Ok(models) => {
            tracing::info!("Inference backend is running with {} model(s)", models.len());
            for model in [&inference.text_model, &inference.vision_model] {
                if model_available(model, &models) {
                    tracing::info!("Model available: {}", model);
                } else {
                    tracing::warn!("Model not installed: {} (run `ollama pull {}`)", model, model);
                }
            }
        },
        Err(e) => tracing::warn!("Inference backend check failed: {}", e),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
