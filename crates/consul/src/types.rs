//! Consul HTTP API payloads, only the fields the registrator reads or writes.

use rcr_core::{NodeMeta, Service};

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Entry of `GET /v1/catalog/nodes`, also the `Node` object of a node detail.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogNode {
	#[serde(rename = "ID", default)]
	pub id: String,
	pub node: String,
	pub address: String,
	#[serde(default)]
	pub tagged_addresses: Option<BTreeMap<String, String>>,
}

impl CatalogNode {
	#[must_use]
	pub fn has_tagged_address(&self, label: &str) -> bool {
		self.tagged_addresses
			.as_ref()
			.is_some_and(|addresses| addresses.contains_key(label))
	}

	/// Node metadata keyed by address, the way desired nodes are keyed.
	#[must_use]
	pub fn into_meta(self) -> NodeMeta {
		NodeMeta {
			key: self.address.clone(),
			name: self.node,
			address: self.address,
			tagged_addresses: self.tagged_addresses.unwrap_or_default(),
		}
	}
}

/// Body of `GET /v1/catalog/node/<name>`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogNodeServices {
	pub node: CatalogNode,
	#[serde(default)]
	pub services: Option<BTreeMap<String, AgentService>>,
}

/// Service as returned by both the catalog node detail and `GET /v1/agent/services`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentService {
	#[serde(rename = "ID")]
	pub id: String,
	pub service: String,
	#[serde(default)]
	pub tags: Option<Vec<String>>,
	#[serde(default)]
	pub port: u16,
	#[serde(default)]
	pub address: String,
	#[serde(default)]
	pub enable_tag_override: bool,
}

impl From<AgentService> for Service {
	fn from(service: AgentService) -> Self {
		Self {
			id: service.id,
			name: service.service,
			tags: service
				.tags
				.unwrap_or_default()
				.into_iter()
				.collect::<BTreeSet<_>>(),
			port: service.port,
			address: service.address,
			enable_tag_override: service.enable_tag_override,
		}
	}
}

/// Service object nested in a catalog registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogService<'a> {
	#[serde(rename = "ID")]
	pub id: &'a str,
	pub service: &'a str,
	pub tags: Vec<&'a str>,
	pub port: u16,
	pub address: &'a str,
	pub enable_tag_override: bool,
}

impl<'a> From<&'a Service> for CatalogService<'a> {
	fn from(service: &'a Service) -> Self {
		Self {
			id: &service.id,
			service: &service.name,
			tags: service.tags.iter().map(String::as_str).collect(),
			port: service.port,
			address: &service.address,
			enable_tag_override: service.enable_tag_override,
		}
	}
}

/// Body of `PUT /v1/catalog/register`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogRegistration<'a> {
	pub node: &'a str,
	pub address: &'a str,
	pub tagged_addresses: &'a BTreeMap<String, String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub service: Option<CatalogService<'a>>,
}

impl<'a> CatalogRegistration<'a> {
	#[must_use]
	pub fn node(node: &'a NodeMeta) -> Self {
		Self {
			node: &node.name,
			address: &node.address,
			tagged_addresses: &node.tagged_addresses,
			service: None,
		}
	}

	#[must_use]
	pub fn with_service(mut self, service: &'a Service) -> Self {
		self.service = Some(service.into());
		self
	}
}

/// Body of `PUT /v1/catalog/deregister`, without a service ID the whole node goes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogDeregistration<'a> {
	pub node: &'a str,
	#[serde(rename = "ServiceID", skip_serializing_if = "Option::is_none")]
	pub service_id: Option<&'a str>,
}

/// Body of `PUT /v1/agent/service/register`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentServiceRegistration<'a> {
	#[serde(rename = "ID")]
	pub id: &'a str,
	pub name: &'a str,
	pub tags: Vec<&'a str>,
	pub port: u16,
	pub address: &'a str,
	pub enable_tag_override: bool,
}

impl<'a> From<&'a Service> for AgentServiceRegistration<'a> {
	fn from(service: &'a Service) -> Self {
		Self {
			id: &service.id,
			name: &service.name,
			tags: service.tags.iter().map(String::as_str).collect(),
			port: service.port,
			address: &service.address,
			enable_tag_override: service.enable_tag_override,
		}
	}
}
