use crate::{
	error::RegistryError,
	model::{NodeMeta, Registry, Service, Services},
	ownership::{filter_registry, filter_services, OwnershipSignature},
};

use std::{fmt, sync::Arc};

use async_trait::async_trait;

/// Which part of the target registry a tick reconciles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
	LocalAgent,
	ClusterCatalog,
}

/// Observed state as returned by [`RegistryClient::query_observed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
	Agent(Services),
	Catalog(Registry),
}

impl Observed {
	/// Drops every node and service not carrying `signature`.
	#[must_use]
	pub fn owned_by(self, signature: &OwnershipSignature) -> Self {
		match self {
			Self::Agent(services) => Self::Agent(filter_services(services, signature)),
			Self::Catalog(registry) => Self::Catalog(filter_registry(registry, signature)),
		}
	}
}

/// Where a service registration or deregistration is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceTarget {
	LocalAgent,
	Catalog(NodeMeta),
}

impl fmt::Display for ServiceTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::LocalAgent => write!(f, "local agent"),
			Self::Catalog(node) => write!(f, "node '{}'", node.name),
		}
	}
}

/// Writer and reader of the target registry.
///
/// Registrations are upserts, writing a service that already exists replaces it. Every call
/// fails on its own, callers decide whether a failure aborts anything else.
#[async_trait]
pub trait RegistryClient: Send + Sync {
	/// Address of the current cluster leader, doubles as a reachability probe.
	async fn ping(&self) -> Result<String, RegistryError>;

	/// Reads the current state of `scope`.
	///
	/// Implementations may use `signature` to skip fetching details of nodes that cannot be
	/// owned, but callers still filter the result through [`Observed::owned_by`].
	async fn query_observed(
		&self,
		scope: Scope,
		signature: &OwnershipSignature,
	) -> Result<Observed, RegistryError>;

	async fn register_node(&self, node: &NodeMeta) -> Result<(), RegistryError>;

	async fn deregister_node(&self, node: &NodeMeta) -> Result<(), RegistryError>;

	async fn register_service(
		&self,
		target: &ServiceTarget,
		service: &Service,
	) -> Result<(), RegistryError>;

	async fn deregister_service(
		&self,
		target: &ServiceTarget,
		service_id: &str,
	) -> Result<(), RegistryError>;
}

#[async_trait]
impl<T: RegistryClient + ?Sized> RegistryClient for Arc<T> {
	async fn ping(&self) -> Result<String, RegistryError> {
		(**self).ping().await
	}

	async fn query_observed(
		&self,
		scope: Scope,
		signature: &OwnershipSignature,
	) -> Result<Observed, RegistryError> {
		(**self).query_observed(scope, signature).await
	}

	async fn register_node(&self, node: &NodeMeta) -> Result<(), RegistryError> {
		(**self).register_node(node).await
	}

	async fn deregister_node(&self, node: &NodeMeta) -> Result<(), RegistryError> {
		(**self).deregister_node(node).await
	}

	async fn register_service(
		&self,
		target: &ServiceTarget,
		service: &Service,
	) -> Result<(), RegistryError> {
		(**self).register_service(target, service).await
	}

	async fn deregister_service(
		&self,
		target: &ServiceTarget,
		service_id: &str,
	) -> Result<(), RegistryError> {
		(**self).deregister_service(target, service_id).await
	}
}
