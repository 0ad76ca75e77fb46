use crate::{certs::dump_certs, config::Config, healthcheck, healthcheck::HealthProbe, utils};

use rcr_consul::{resolve_host_placeholder, ConsulClient, ConsulConfig, TlsFiles};
use rcr_core::{OwnershipSignature, RegistryClient, RegistryError, Syncer};
use rcr_metadata::{MetadataClient, CERT_NAMES};

use std::{io, sync::Arc};

use anyhow::Context as _;
use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum SetupError {
	#[error("failed to configure rancher-metadata client: {0}")]
	Metadata(#[source] rcr_metadata::Error),
	#[error("failed to get TLS certs from metadata: {0}")]
	Certs(#[source] rcr_metadata::Error),
	#[error("failed to configure Consul API client: {0}")]
	Consul(#[from] rcr_consul::Error),
	#[error("failed to reach Consul API: {0}")]
	ConsulUnreachable(#[source] RegistryError),
	#[error("failed to bind healthcheck port <port='{port}'>: {source}")]
	HealthcheckBind {
		port: u16,
		#[source]
		source: io::Error,
	},
}

/// Both upstream clients, shared by the sync loop and the health check.
#[derive(Debug, Clone)]
pub struct Upstreams {
	metadata: MetadataClient,
	consul: Arc<ConsulClient>,
}

#[async_trait]
impl HealthProbe for Upstreams {
	async fn metadata(&self) -> anyhow::Result<()> {
		self.metadata.self_stack().await?;
		Ok(())
	}

	async fn registry(&self) -> anyhow::Result<()> {
		self.consul.ping().await?;
		Ok(())
	}
}

pub struct Context {
	config: Config,
	upstreams: Upstreams,
	signature: OwnershipSignature,
}

impl Context {
	/// Connects to both upstreams, failing when either cannot be reached.
	pub async fn init(config: Config) -> Result<Self, SetupError> {
		let metadata = MetadataClient::connect(&config.metadata_url)
			.await
			.map_err(SetupError::Metadata)?;

		let certs = metadata.certs().await.map_err(SetupError::Certs)?;
		if certs.len() == CERT_NAMES.len() {
			dump_certs(&config.cert_dir, &certs).await;
		}

		let consul_url = if config.local_mode {
			info!("Running in local mode!");
			let host = metadata.self_host().await.map_err(SetupError::Metadata)?;
			resolve_host_placeholder(&config.consul_url, &host.agent_ip)?
		} else {
			info!("Running in remote mode!");
			config.consul_url.clone()
		};

		let tls = TlsFiles::in_dir(&config.cert_dir);
		let consul = ConsulClient::new(&ConsulConfig {
			url: consul_url,
			token: config.consul_token.clone(),
			tls: tls.exist().then_some(tls),
		})?;

		let leader = consul.ping().await.map_err(SetupError::ConsulUnreachable)?;
		info!("Consul API is reachable <leader='{leader}'>");

		let environment = metadata.environment();
		info!(
			"Registering services of environment '{}' <uuid='{}'>",
			environment.name, environment.uuid
		);
		let signature = OwnershipSignature::new(&environment.uuid);

		Ok(Self {
			config,
			upstreams: Upstreams {
				metadata,
				consul: Arc::new(consul),
			},
			signature,
		})
	}

	/// Runs the health check and the sync loop until a shutdown signal arrives.
	///
	/// A sync tick in progress when the signal arrives is allowed to finish.
	pub async fn run(self) -> anyhow::Result<()> {
		let listener = healthcheck::bind(self.config.healthcheck_port).await?;
		let stop = CancellationToken::new();

		let mut health = tokio::spawn(healthcheck::serve(
			listener,
			Arc::new(self.upstreams.clone()),
			stop.clone(),
		));

		let syncer = Syncer::new(
			self.upstreams.metadata,
			self.upstreams.consul,
			self.signature,
			self.config.sync_config(),
		);
		let sync = tokio::spawn({
			let stop = stop.clone();
			async move { syncer.run(stop).await }
		});

		let health_failure = tokio::select! {
			() = utils::shutdown_signal() => {
				info!("Shutdown signal received, exiting...");
				None
			}
			result = &mut health => Some(result),
		};

		stop.cancel();

		if let Err(e) = sync.await {
			error!("Sync loop panicked: {e}");
		}

		match health_failure {
			None => health
				.await
				.context("healthcheck server panicked")?
				.context("healthcheck server failed"),
			Some(result) => {
				result
					.context("healthcheck server panicked")?
					.context("healthcheck server failed")?;
				anyhow::bail!("healthcheck server stopped unexpectedly")
			}
		}
	}
}
