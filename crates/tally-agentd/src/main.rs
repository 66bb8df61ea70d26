use std::{path::PathBuf, sync::Arc};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use tally_api::HttpApi;
use tally_core::{MetricDescriptor, ProcessCollector, Registry};
use tally_observe::{init_local_offset, init_logger};

mod config;
use config::{AgentConfig, ENV_CONFIG_PATH};

fn main() -> anyhow::Result<()> {
    // Local offset must be read before the runtime spawns worker threads.
    init_local_offset();

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from));
    let cfg = AgentConfig::load(path.as_deref())?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cfg))
}

async fn run(cfg: AgentConfig) -> anyhow::Result<()> {
    // 1) logger
    init_logger(&cfg.logger.clone().with_env_overrides()?)?;
    info!("logger initialized");

    // 2) registry
    let registry = Arc::new(Registry::new());
    registry.register(
        MetricDescriptor::gauge("tally_build_info", "Build information of the running agent")
            .with_labels(["version"]),
    )?;
    registry
        .gauge("tally_build_info", &[env!("CARGO_PKG_VERSION")])?
        .set(1.0);

    if cfg.process_metrics {
        let collector = ProcessCollector::register(&registry)?;
        registry.register_collector(Arc::new(collector));
    }

    // 3) http
    let mut api = HttpApi::new(registry.clone(), cfg.api.clone())?;
    if cfg.request_metrics {
        api = api.with_request_metrics(registry.clone())?;
    }
    let app = api.router();

    let listener = tokio::net::TcpListener::bind(cfg.listen_addr).await?;
    info!(
        addr = %listener.local_addr()?,
        metrics = %cfg.api.metrics_path,
        health = %cfg.api.health_path,
        "serving metrics"
    );

    // 4) shutdown
    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("shut down");
    Ok(())
}

/// Cancel `token` on Ctrl-C or SIGTERM.
async fn watch_signals(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c"),
        _ = terminate => info!("received SIGTERM"),
    }
    token.cancel();
}
