use crate::context::SetupError;

use std::{io, net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Reachability of the two upstreams the registrator depends on.
#[async_trait]
pub trait HealthProbe: Send + Sync + 'static {
	async fn metadata(&self) -> anyhow::Result<()>;

	async fn registry(&self) -> anyhow::Result<()>;
}

pub fn router<P: HealthProbe>(probe: Arc<P>) -> Router {
	Router::new()
		.route("/", get(healthcheck::<P>))
		.with_state(probe)
}

async fn healthcheck<P: HealthProbe>(State(probe): State<Arc<P>>) -> (StatusCode, &'static str) {
	if let Err(e) = probe.metadata().await {
		error!("Healthcheck failed: unable to reach metadata: {e:#}");
		return (
			StatusCode::INTERNAL_SERVER_ERROR,
			"Failed to reach metadata server",
		);
	}

	if let Err(e) = probe.registry().await {
		error!("Failed to reach Consul API: {e:#}");
		return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to reach Consul API");
	}

	(StatusCode::OK, "OK")
}

pub async fn bind(port: u16) -> Result<TcpListener, SetupError> {
	TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port)))
		.await
		.map_err(|source| SetupError::HealthcheckBind { port, source })
}

/// Serves the health check on `listener` until `stop` is cancelled.
pub async fn serve<P: HealthProbe>(
	listener: TcpListener,
	probe: Arc<P>,
	stop: CancellationToken,
) -> io::Result<()> {
	if let Ok(addr) = listener.local_addr() {
		info!("Healthcheck handler is listening on {}", addr.port());
	}

	axum::serve(listener, router(probe))
		.with_graceful_shutdown(async move { stop.cancelled().await })
		.await
}
