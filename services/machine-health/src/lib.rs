//! Machine Health - predictive maintenance dashboard
//!
//! Validates sensor telemetry entered by an operator, submits it to a remote
//! failure prediction service, and shows the returned failure probability
//! together with a short history of recent predictions.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod history;
pub mod io;
pub mod predictor;
pub mod request;
pub mod scenarios;
pub mod schema;
pub mod session;

pub use config::{load_config, Config};
pub use error::{MachineHealthError, Result};
pub use predictor::{PredictionClient, PredictionResponse};
pub use schema::{validate, FieldErrors, MachineType, TelemetryReading};

use std::net::SocketAddr;
use std::sync::Arc;

use crate::dashboard::DashboardState;
use crate::io::ReqwestHttpClient;

/// Run the machine health dashboard with the given configuration
pub async fn run(config: Config) -> Result<()> {
    let http: Arc<dyn io::HttpClient> = Arc::new(ReqwestHttpClient::new());
    let predictor = Arc::new(PredictionClient::new(&config.predictor, http));

    let state = DashboardState {
        session: session::new_session_handle(),
        predictor,
        result_delay: config.predictor.result_delay,
    };

    let router = dashboard::build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.dashboard.port));

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind dashboard to port {}: {}", config.dashboard.port, e);
        MachineHealthError::Dashboard(format!("binding {}: {}", addr, e))
    })?;
    tracing::info!("Dashboard listening on http://{}", addr);
    tracing::info!("Predictions served by {}", config.predictor.endpoint_url);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutdown signal received"),
                Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
            }
        })
        .await?;

    tracing::info!("Dashboard stopped");
    Ok(())
}
