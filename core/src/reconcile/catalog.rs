use crate::{
	model::{Node, NodeComparison, Registry},
	registry::{RegistryClient, ServiceTarget},
};
use super::{apply, diff_services, Action, ApplyReport};

use tracing::info;

/// Plans the actions converging the catalog `observed` state to `desired`.
///
/// Nodes only observed are dropped as a whole, and go first so a node name they free can be
/// taken again in the same plan. Nodes only desired are created along with all their
/// services. Nodes present on both sides are diffed service by service, after a node
/// re-registration when their metadata differs under `comparison`. A node whose name changed
/// is a different node to the registry, the old one is dropped and the new one created.
#[must_use]
pub fn plan_catalog(
	observed: &Registry,
	desired: &Registry,
	comparison: NodeComparison,
) -> Vec<Action> {
	let mut actions = observed
		.nodes()
		.filter(|node| !desired.contains(node.key()))
		.map(|node| Action::DeregisterNode(node.meta.clone()))
		.collect::<Vec<_>>();

	for current in observed.nodes() {
		let Some(wanted) = desired.get(current.key()) else {
			continue;
		};

		if current.in_sync_with(wanted, comparison) {
			continue;
		}

		if current.meta.name == wanted.meta.name {
			plan_node_update(current, wanted, comparison, &mut actions);
		} else {
			actions.push(Action::DeregisterNode(current.meta.clone()));
			plan_node_creation(wanted, &mut actions);
		}
	}

	for wanted in desired.nodes().filter(|node| !observed.contains(node.key())) {
		plan_node_creation(wanted, &mut actions);
	}

	actions
}

fn plan_node_creation(wanted: &Node, actions: &mut Vec<Action>) {
	actions.push(Action::RegisterNode(wanted.meta.clone()));
	actions.extend(
		wanted
			.services
			.values()
			.map(|service| Action::RegisterService {
				target: ServiceTarget::Catalog(wanted.meta.clone()),
				service: service.clone(),
			}),
	);
}

fn plan_node_update(
	current: &Node,
	wanted: &Node,
	comparison: NodeComparison,
	actions: &mut Vec<Action>,
) {
	if !current.meta.matches(&wanted.meta, comparison) {
		actions.push(Action::RegisterNode(wanted.meta.clone()));
	}

	let diff = diff_services(&current.services, &wanted.services);

	actions.extend(
		diff.to_deregister
			.into_iter()
			.map(|service_id| Action::DeregisterService {
				target: ServiceTarget::Catalog(current.meta.clone()),
				service_id,
			}),
	);
	actions.extend(
		diff.to_register
			.into_iter()
			.map(|service| Action::RegisterService {
				target: ServiceTarget::Catalog(wanted.meta.clone()),
				service,
			}),
	);
}

/// Plans and applies the catalog diff, see [`plan_catalog`].
pub async fn reconcile_catalog<R: RegistryClient + ?Sized>(
	client: &R,
	observed: &Registry,
	desired: &Registry,
	comparison: NodeComparison,
) -> ApplyReport {
	let actions = plan_catalog(observed, desired, comparison);
	if actions.is_empty() {
		info!("Everything is in sync");
	}

	apply(client, &actions).await
}
