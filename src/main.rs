//! Tarifa CLI - flight fare prediction server
//!
//! # Commands
//!
//! - `serve` - Start the prediction server
//! - `info`  - Show version and endpoint info

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::http::HeaderValue;
use clap::{Parser, Subcommand};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tarifa::{
    api::{create_router, AppState},
    error::{Result, TarifaError},
    model::FareModel,
};

/// Tarifa - flight fare prediction service
#[derive(Parser)]
#[command(name = "tarifa")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the prediction server
    ///
    /// Examples:
    ///   tarifa serve --model models/flight_fare.json
    ///   tarifa serve --model model.json --allow-origin http://localhost:5173
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Path to the model artifact (JSON)
        #[arg(short, long)]
        model: PathBuf,

        /// Origin allowed to call the API (repeatable; any origin if unset)
        #[arg(long = "allow-origin")]
        allow_origins: Vec<String>,
    },
    /// Show version and configuration info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tarifa=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            model,
            allow_origins,
        } => {
            serve(&host, port, &model, &allow_origins).await?;
        }
        Commands::Info => {
            println!("Tarifa v{}", tarifa::VERSION);
            println!("Flight fare prediction service");
            println!();
            println!("Endpoints:");
            println!("  GET  /health       - Health check");
            println!("  GET  /metrics      - Prometheus metrics");
            println!("  POST /api/predict  - Upload .xlsx, download prediction zip");
        }
    }

    Ok(())
}

async fn serve(host: &str, port: u16, model_path: &Path, origins: &[String]) -> Result<()> {
    // A failed load is permanent: the process keeps serving, answering 503
    // from the predict endpoint, so an operator sees the failure instead of
    // a crash loop.
    let state = match FareModel::load(model_path) {
        Ok(model) => {
            info!(
                model = model.name(),
                version = model.version(),
                features = model.feature_names().len(),
                "model artifact loaded"
            );
            AppState::new(model)
        }
        Err(e) => {
            error!(
                path = %model_path.display(),
                error = %e,
                "model artifact failed to load; serving in unavailable state"
            );
            AppState::unavailable()
        }
    };

    let app = create_router(state)
        .layer(cors_layer(origins)?)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| TarifaError::Config {
            reason: format!("invalid bind address {host}:{port}: {e}"),
        })?;

    info!(%addr, "tarifa listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// CORS policy from the CLI allow-list; wildcard when the list is empty.
fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .map(|origin| {
                origin.parse().map_err(|_| TarifaError::Config {
                    reason: format!("invalid CORS origin: {origin}"),
                })
            })
            .collect::<Result<_>>()?;
        AllowOrigin::list(parsed)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any))
}
