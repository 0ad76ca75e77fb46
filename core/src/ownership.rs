//! Scoping of registry entries to the Rancher environment this process mirrors.
//!
//! Every service we register is tagged with [`OwnershipSignature::tag`] and every node carries a
//! tagged address labelled [`OwnershipSignature::address_label`]. Anything lacking those marks
//! belongs to another writer and is dropped from the observed state before diffing, so no
//! action can ever reference it.

use crate::{
	model::{Node, Registry, Service, Services},
	sanitize::normalize,
};

const SIGNATURE_PREFIX: &str = "rancher";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipSignature {
	tag: String,
	address_label: String,
}

impl OwnershipSignature {
	/// Derives the signature of a Rancher environment from its UUID.
	#[must_use]
	pub fn new(environment_uuid: &str) -> Self {
		Self {
			tag: normalize(&format!("{SIGNATURE_PREFIX}-{environment_uuid}")),
			address_label: normalize(&format!("{SIGNATURE_PREFIX}-{environment_uuid}-ip")),
		}
	}

	/// Tag carried by every service registered for the environment.
	#[must_use]
	pub fn tag(&self) -> &str {
		&self.tag
	}

	/// Tagged address label carried by every node registered for the environment.
	#[must_use]
	pub fn address_label(&self) -> &str {
		&self.address_label
	}
}

#[must_use]
pub fn owns_node(node: &Node, signature: &OwnershipSignature) -> bool {
	node.meta
		.tagged_addresses
		.contains_key(signature.address_label())
}

#[must_use]
pub fn owns_service(service: &Service, signature: &OwnershipSignature) -> bool {
	service.tags.contains(signature.tag())
}

/// Keeps owned services only.
#[must_use]
pub fn filter_services(services: Services, signature: &OwnershipSignature) -> Services {
	services
		.into_iter()
		.filter(|(_, service)| owns_service(service, signature))
		.collect()
}

/// Keeps owned nodes, and within them owned services.
#[must_use]
pub fn filter_registry(registry: Registry, signature: &OwnershipSignature) -> Registry {
	registry
		.into_iter()
		.filter(|node| owns_node(node, signature))
		.map(|mut node| {
			node.services = filter_services(node.services, signature);
			node
		})
		.collect()
}
