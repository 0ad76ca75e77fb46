use crate::registry::RegistryClient;
use super::Action;

use tracing::{error, info};

/// Outcome of applying a list of actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
	pub applied: usize,
	pub failed: usize,
}

impl ApplyReport {
	#[must_use]
	pub const fn total(&self) -> usize {
		self.applied + self.failed
	}
}

/// Applies `actions` one after the other.
///
/// A failed action is logged and skipped, the remaining ones are still applied.
pub async fn apply<R: RegistryClient + ?Sized>(client: &R, actions: &[Action]) -> ApplyReport {
	let mut report = ApplyReport::default();

	for action in actions {
		let res = match action {
			Action::RegisterNode(node) => {
				info!("Registering node {} <address='{}'>", node.name, node.address);
				client.register_node(node).await
			}
			Action::DeregisterNode(node) => {
				info!("Deregistering node {} <address='{}'>", node.name, node.address);
				client.deregister_node(node).await
			}
			Action::RegisterService { target, service } => {
				info!("Registering service {} on {target}", service.id);
				client.register_service(target, service).await
			}
			Action::DeregisterService { target, service_id } => {
				info!("Deregistering service {service_id} on {target}");
				client.deregister_service(target, service_id).await
			}
		};

		match res {
			Ok(()) => report.applied += 1,
			Err(e) => {
				error!("Failed to {action}: {e}");
				report.failed += 1;
			}
		}
	}

	report
}
