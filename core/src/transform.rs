use crate::{
	inventory::SourceService,
	model::{NodeMeta, Registry, Service},
	ownership::OwnershipSignature,
	sanitize::normalize,
};

use std::collections::{BTreeMap, BTreeSet};

/// Tag marking every service this registrator created.
pub const CREATED_BY_TAG: &str = "created-by-rancher";

const WAN_ADDRESS_LABEL: &str = "wan";

/// Builds the desired registry state, one node per distinct source IP.
///
/// Records sharing a stack, name and port on one IP collapse into a single service, the last
/// one winning.
#[must_use]
pub fn build_desired(source_services: &[SourceService]) -> Registry {
	let mut registry = Registry::new();

	for source in source_services {
		let signature = OwnershipSignature::new(&source.environment_uuid);

		registry
			.node_or_insert_with(&source.ip, || NodeMeta {
				key: source.ip.clone(),
				name: source.host_name.clone(),
				address: source.ip.clone(),
				tagged_addresses: BTreeMap::from([
					(signature.address_label().to_string(), source.ip.clone()),
					(WAN_ADDRESS_LABEL.to_string(), source.ip.clone()),
				]),
			})
			.insert_service(service_for(source, &signature));
	}

	registry
}

fn service_for(source: &SourceService, signature: &OwnershipSignature) -> Service {
	let name = format!("{}-{}", source.stack_name, source.name);

	let mut tags = BTreeSet::from([CREATED_BY_TAG.to_string(), signature.tag().to_string()]);
	let environment_tag = normalize(&source.environment_name);
	if !environment_tag.is_empty() {
		tags.insert(environment_tag);
	}

	Service {
		id: format!("{name}-{}", source.port),
		name,
		tags,
		port: source.port,
		address: source.ip.clone(),
		enable_tag_override: false,
	}
}
