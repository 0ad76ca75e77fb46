use thiserror::Error;

/// Failure reported by a [`SourceInventory`](crate::SourceInventory) implementation.
#[derive(Debug, Error)]
pub enum InventoryError {
	#[error("source inventory unavailable: {0}")]
	Unavailable(String),
	#[error("malformed source inventory response: {0}")]
	Malformed(String),
}

/// Failure reported by a [`RegistryClient`](crate::RegistryClient) implementation.
#[derive(Debug, Error)]
pub enum RegistryError {
	#[error("registry unreachable: {0}")]
	Transport(String),
	#[error("registry rejected request <status='{status}'>: {message}")]
	Rejected { status: u16, message: String },
	#[error("unexpected registry response: {0}")]
	Decode(String),
	#[error("unsupported registry configuration: {0}")]
	Unsupported(String),
}

/// Errors that abort a whole reconciliation tick, the next tick starts from scratch.
#[derive(Debug, Error)]
pub enum TickError {
	#[error("failed to list source services: {0}")]
	Inventory(#[from] InventoryError),
	#[error("failed to query observed registry state: {0}")]
	Observed(#[source] RegistryError),
}
