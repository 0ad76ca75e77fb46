use crate::error::InventoryError;

use std::sync::Arc;

use async_trait::async_trait;

/// One exposed port of a service running in the source inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceService {
	pub name: String,
	pub stack_name: String,
	pub environment_name: String,
	pub environment_uuid: String,
	pub host_name: String,
	pub ip: String,
	pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryScope {
	/// Only services running on the host this process runs on.
	SelfHost,
	/// Every service of the environment.
	Environment,
}

#[async_trait]
pub trait SourceInventory: Send + Sync {
	async fn list_services(&self, scope: InventoryScope)
		-> Result<Vec<SourceService>, InventoryError>;
}

#[async_trait]
impl<T: SourceInventory + ?Sized> SourceInventory for Arc<T> {
	async fn list_services(
		&self,
		scope: InventoryScope,
	) -> Result<Vec<SourceService>, InventoryError> {
		(**self).list_services(scope).await
	}
}
