use crate::{
	model::{Node, Services},
	registry::{RegistryClient, ServiceTarget},
};
use super::{apply, diff_services, Action, ApplyReport};

use tracing::{info, warn};

/// Plans the actions converging the local agent services to the services of `desired_nodes`.
///
/// The agent has no node concept, so the desired nodes are merged into one flat service map
/// before diffing. With a single desired node this is a plain per-node diff.
#[must_use]
pub fn plan_agent<'a>(
	observed: &Services,
	desired_nodes: impl IntoIterator<Item = &'a Node>,
) -> Vec<Action> {
	// No desired node means no owned service survives, so an empty listing from a flapping
	// metadata service wipes the agent until the next tick.
	let desired = merge_services(desired_nodes);
	let diff = diff_services(observed, &desired);

	diff.to_deregister
		.into_iter()
		.map(|service_id| Action::DeregisterService {
			target: ServiceTarget::LocalAgent,
			service_id,
		})
		.chain(
			diff.to_register
				.into_iter()
				.map(|service| Action::RegisterService {
					target: ServiceTarget::LocalAgent,
					service,
				}),
		)
		.collect()
}

fn merge_services<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Services {
	let mut merged = Services::new();

	for node in nodes {
		for (id, service) in &node.services {
			if let Some(previous) = merged.insert(id.clone(), service.clone()) {
				if previous != *service {
					warn!(
						"Service '{id}' is declared differently by several nodes, \
						keeping the one from node '{}'",
						node.meta.name
					);
				}
			}
		}
	}

	merged
}

/// Plans and applies the agent diff, see [`plan_agent`].
pub async fn reconcile_agent<'a, R: RegistryClient + ?Sized>(
	client: &R,
	observed: &Services,
	desired_nodes: impl IntoIterator<Item = &'a Node>,
) -> ApplyReport {
	let actions = plan_agent(observed, desired_nodes);
	if actions.is_empty() {
		info!("Everything is in sync");
	}

	apply(client, &actions).await
}

#[cfg(test)]
mod tests {
	use crate::model::{NodeMeta, Service};

	use super::*;

	use std::collections::BTreeSet;

	fn service(id: &str, port: u16) -> Service {
		Service {
			id: id.to_string(),
			name: id.to_string(),
			tags: BTreeSet::from(["rancher-env".to_string()]),
			port,
			address: "10.0.0.1".to_string(),
			enable_tag_override: false,
		}
	}

	fn node(address: &str, services: &[Service]) -> Node {
		let mut node = Node::new(NodeMeta {
			key: address.to_string(),
			name: address.to_string(),
			address: address.to_string(),
			tagged_addresses: Default::default(),
		});
		for service in services {
			node.insert_service(service.clone());
		}
		node
	}

	#[test]
	fn single_node_diff() {
		let observed: Services = [service("keep", 80), service("stale", 81), service("moved", 82)]
			.into_iter()
			.map(|service| (service.id.clone(), service))
			.collect();
		let desired = node(
			"10.0.0.1",
			&[service("keep", 80), service("moved", 8082), service("new", 83)],
		);

		let actions = plan_agent(&observed, [&desired]);

		assert_eq!(
			actions,
			vec![
				Action::DeregisterService {
					target: ServiceTarget::LocalAgent,
					service_id: "stale".to_string(),
				},
				Action::RegisterService {
					target: ServiceTarget::LocalAgent,
					service: service("moved", 8082),
				},
				Action::RegisterService {
					target: ServiceTarget::LocalAgent,
					service: service("new", 83),
				},
			]
		);
	}

	#[test]
	fn several_nodes_do_not_undo_each_other() {
		let observed: Services = [service("a", 80), service("b", 81)]
			.into_iter()
			.map(|service| (service.id.clone(), service))
			.collect();
		let first = node("10.0.0.1", &[service("a", 80)]);
		let second = node("10.0.0.2", &[service("b", 81)]);

		assert!(plan_agent(&observed, [&first, &second]).is_empty());
	}

	#[test]
	fn no_desired_nodes_prunes_everything_owned() {
		let observed: Services = [service("a", 80)]
			.into_iter()
			.map(|service| (service.id.clone(), service))
			.collect();

		assert_eq!(
			plan_agent(&observed, Vec::<&Node>::new()),
			vec![Action::DeregisterService {
				target: ServiceTarget::LocalAgent,
				service_id: "a".to_string(),
			}]
		);
	}
}
