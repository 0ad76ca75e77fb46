//! Subset of the metadata service JSON documents we read.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

/// Host label overriding the address services on that host are published with.
pub const EXTERNAL_DNS_IP_LABEL: &str = "io.rancher.host.external_dns_ip";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Stack {
	pub name: String,
	pub environment_name: String,
	pub environment_uuid: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Host {
	pub name: String,
	pub uuid: String,
	pub agent_ip: String,
	#[serde(deserialize_with = "nullable")]
	pub labels: HashMap<String, String>,
}

impl Host {
	/// Address services on this host are reachable at.
	#[must_use]
	pub fn published_ip(&self) -> &str {
		match self.labels.get(EXTERNAL_DNS_IP_LABEL) {
			Some(ip) if !ip.is_empty() => ip,
			_ => &self.agent_ip,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Container {
	pub name: String,
	#[serde(deserialize_with = "nullable")]
	pub service_name: String,
	#[serde(deserialize_with = "nullable")]
	pub stack_name: String,
	#[serde(deserialize_with = "nullable")]
	pub host_uuid: String,
	/// Port definitions, `ip:public:private/proto`.
	#[serde(deserialize_with = "nullable")]
	pub ports: Vec<String>,
	pub state: String,
	#[serde(deserialize_with = "nullable")]
	pub health_state: String,
}

impl Container {
	/// Running, and healthy or on its way to be.
	#[must_use]
	pub fn is_available(&self) -> bool {
		self.state == "running"
			&& matches!(
				self.health_state.as_str(),
				"healthy" | "initializing" | "updating-healthy" | ""
			)
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SelfService {
	pub name: String,
	#[serde(deserialize_with = "nullable")]
	pub metadata: HashMap<String, serde_json::Value>,
}

/// Metadata sends `null` for unset fields, read those as the default value.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
	pub name: String,
	pub uuid: String,
}
