use std::time::Duration;

use clap::Parser;
use schnorr_zkp_auth::proto::auth_service_server::AuthServiceServer;
use schnorr_zkp_auth::verifier::{AuthServiceImpl, ParameterSet, ServerConfig, ServerState};
use schnorr_zkp_auth::wire;
use tokio::signal;
use tonic::transport::Server;
use tonic_health::server::{health_reporter, HealthReporter};
use tracing::{debug, error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Schnorr zero-knowledge authentication server", long_about = None)]
#[command(version)]
struct Args {
    /// Host to bind to (overrides configuration)
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to listen on (overrides configuration)
    #[arg(short, long)]
    port: Option<u16>,

    /// Domain parameter set (overrides configuration)
    #[arg(long, value_enum)]
    parameters: Option<ParameterSet>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = ServerConfig::from_env().unwrap_or_else(|e| {
        error!("Failed to load configuration: {e}");
        info!("Using default configuration");
        ServerConfig::default()
    });

    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(parameters) = args.parameters {
        config.parameters = parameters;
    }

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {e}");
        return Err(format!("Invalid configuration: {e}").into());
    }

    let params = config.parameters.domain_parameters();
    info!(
        parameters = ?config.parameters,
        modulus_bits = params.modulus().bits(),
        generator = %wire::encode(params.generator()),
        "Loaded domain parameters"
    );

    let limits = config.limits();
    info!(
        challenge_ttl_secs = limits.challenge_ttl.as_secs(),
        session_ttl_secs = limits.session_ttl.as_secs(),
        max_pending_challenges = limits.max_pending_challenges,
        max_sessions = limits.max_sessions,
        "Loaded state limits"
    );

    let state = ServerState::with_limits(params, limits);

    let cleanup_state = state.clone();
    let cleanup_interval = config.cleanup_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_interval);
        loop {
            interval.tick().await;
            let challenges = cleanup_state.cleanup_expired_challenges();
            let sessions = cleanup_state.cleanup_expired_sessions().await;
            if challenges + sessions > 0 {
                debug!(challenges, sessions, "Removed expired state");
            }
        }
    });

    let service = AuthServiceImpl::new(state);

    let (mut health_reporter, health_service) = health_reporter();
    health_reporter
        .set_serving::<AuthServiceServer<AuthServiceImpl>>()
        .await;

    let addr = config.addr()?;
    info!("Server starting on {addr}");

    Server::builder()
        .add_service(health_service)
        .add_service(AuthServiceServer::new(service))
        .serve_with_shutdown(addr, shutdown_signal(health_reporter))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal(mut health_reporter: HealthReporter) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    health_reporter
        .set_not_serving::<AuthServiceServer<AuthServiceImpl>>()
        .await;

    info!("Initiating graceful shutdown (allowing in-flight requests to complete)");

    tokio::time::sleep(Duration::from_secs(1)).await;
}
