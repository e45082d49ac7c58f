use clap::{Parser, ValueEnum};
use metrics_extender_client::{infer_config, ClusterClient, KubeClient};
use metrics_extender_scheduler::{Extender, ExtenderConfig, ScoringScope, DEFAULT_ADMISSION_LABEL};
use metrics_extender_server::{ApiServer, AppState, Config as ServerConfig};
use std::ffi::OsString;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "metrics-extender",
    about = "Kubernetes scheduler extender scoring nodes by live CPU usage"
)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "EXTENDER_BIND", default_value = "0.0.0.0:8001")]
    bind: String,

    /// Label key a node must carry to pass the filter
    #[arg(long, env = "EXTENDER_ADMISSION_LABEL", default_value = DEFAULT_ADMISSION_LABEL)]
    admission_label: String,

    /// Deadline in seconds for each call to the API server
    #[arg(long, env = "EXTENDER_REQUEST_TIMEOUT", default_value_t = 10)]
    request_timeout: u64,

    /// Kubeconfig used when not running inside a cluster; may list several
    /// files like $KUBECONFIG. Defaults to $KUBECONFIG, then ~/.kube/config
    #[arg(long)]
    kubeconfig: Option<OsString>,

    /// Score every node that reports metrics, not only the candidates
    #[arg(long, env = "EXTENDER_SCORE_ALL")]
    score_all_reporting_nodes: bool,

    /// Log output format
    #[arg(long, env = "EXTENDER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }

    run(cli).await
}

async fn run(cli: Cli) -> miette::Result<()> {
    let listen_addr: SocketAddr = cli
        .bind
        .parse()
        .map_err(|e| miette::miette!("Invalid bind address '{}': {}", cli.bind, e))?;

    if cli.request_timeout == 0 {
        return Err(miette::miette!("--request-timeout must be at least 1 second"));
    }

    // The API connection must be ready before any request is accepted
    let (kube_config, _source) = infer_config(cli.kubeconfig.as_deref()).await?;
    let client: Arc<dyn ClusterClient> = Arc::new(KubeClient::new(kube_config)?);

    let config = ExtenderConfig {
        admission_label: cli.admission_label,
        request_timeout: Duration::from_secs(cli.request_timeout),
        scoring_scope: if cli.score_all_reporting_nodes {
            ScoringScope::Snapshot
        } else {
            ScoringScope::Candidates
        },
    };
    info!(
        "Admission label '{}', request timeout {:?}, scoring scope {:?}",
        config.admission_label, config.request_timeout, config.scoring_scope
    );

    let extender = Arc::new(Extender::new(client, config));
    let state = Arc::new(AppState::new(extender));
    let server = ApiServer::new(ServerConfig { listen_addr }, state);

    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Shutting down gracefully...");
        signal_token.cancel();
    });

    server.run(token).await?;

    info!("Shutdown complete");
    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = terminate.recv() => Ok(()),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}
