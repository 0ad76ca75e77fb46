use crate::{
	error::{RegistryError, TickError},
	inventory::{InventoryScope, SourceInventory},
	model::NodeComparison,
	ownership::OwnershipSignature,
	reconcile::{reconcile_agent, reconcile_catalog, ApplyReport},
	registry::{Observed, RegistryClient, Scope},
	transform::build_desired,
};

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncMode {
	/// Services of this host only, written to the local agent.
	#[default]
	Agent,
	/// Every node and service of the environment, written to the cluster catalog.
	Catalog,
}

impl SyncMode {
	#[must_use]
	pub const fn inventory_scope(self) -> InventoryScope {
		match self {
			Self::Agent => InventoryScope::SelfHost,
			Self::Catalog => InventoryScope::Environment,
		}
	}

	#[must_use]
	pub const fn registry_scope(self) -> Scope {
		match self {
			Self::Agent => Scope::LocalAgent,
			Self::Catalog => Scope::ClusterCatalog,
		}
	}
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
	pub interval: Duration,
	pub mode: SyncMode,
	pub node_comparison: NodeComparison,
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self {
			interval: DEFAULT_SYNC_INTERVAL,
			mode: SyncMode::default(),
			node_comparison: NodeComparison::default(),
		}
	}
}

/// Periodic reconciliation of a source inventory into a target registry.
pub struct Syncer<S, R> {
	inventory: S,
	registry: R,
	signature: OwnershipSignature,
	config: SyncConfig,
}

impl<S: SourceInventory, R: RegistryClient> Syncer<S, R> {
	pub const fn new(
		inventory: S,
		registry: R,
		signature: OwnershipSignature,
		config: SyncConfig,
	) -> Self {
		Self {
			inventory,
			registry,
			signature,
			config,
		}
	}

	/// Runs one complete reconciliation, desired and observed state are fetched from scratch.
	#[instrument(skip(self), fields(mode = ?self.config.mode))]
	pub async fn tick(&self) -> Result<ApplyReport, TickError> {
		debug!("Syncing services...");

		let sources = self
			.inventory
			.list_services(self.config.mode.inventory_scope())
			.await?;
		let desired = build_desired(&sources);

		let observed = self
			.registry
			.query_observed(self.config.mode.registry_scope(), &self.signature)
			.await
			.map_err(TickError::Observed)?
			.owned_by(&self.signature);

		debug!(
			desired_nodes = desired.len(),
			desired_services = desired.service_count(),
			"Desired state computed"
		);

		let report = match (self.config.mode, observed) {
			(SyncMode::Agent, Observed::Agent(services)) => {
				reconcile_agent(&self.registry, &services, desired.nodes()).await
			}
			(SyncMode::Catalog, Observed::Catalog(nodes)) => {
				reconcile_catalog(
					&self.registry,
					&nodes,
					&desired,
					self.config.node_comparison,
				)
				.await
			}
			(mode, _) => {
				return Err(TickError::Observed(RegistryError::Decode(format!(
					"{mode:?} mode received state of another scope"
				))));
			}
		};

		Ok(report)
	}

	/// Ticks every `interval` until `stop` is cancelled.
	///
	/// Cancellation is only observed between ticks, a running tick always completes.
	pub async fn run(&self, stop: CancellationToken) {
		info!(
			"Sync interval set to {} seconds",
			self.config.interval.as_secs_f64()
		);

		loop {
			match self.tick().await {
				Ok(report) if report.failed > 0 => error!(
					"Sync finished with {} failed action(s) out of {}",
					report.failed,
					report.total()
				),
				Ok(report) => debug!("Sync finished, {} action(s) applied", report.applied),
				Err(e) => error!("Sync aborted: {e}"),
			}

			tokio::select! {
				() = sleep(self.config.interval) => {}
				() = stop.cancelled() => {
					info!("Sync loop stopped");
					return;
				}
			}
		}
	}
}
