#![allow(dead_code)]

use rcr_core::{
	InventoryError, InventoryScope, Node, NodeMeta, Observed, OwnershipSignature, Registry,
	RegistryClient, RegistryError, Scope, Service, ServiceTarget, SourceInventory, SourceService,
};

use std::{
	collections::{BTreeMap, BTreeSet, HashSet},
	sync::{
		atomic::{AtomicUsize, Ordering},
		Mutex,
	},
};

use async_trait::async_trait;
use tokio::sync::Notify;

pub const ENV_UUID: &str = "env-1";

/// Registry call as seen by [`RecordingRegistry`], nodes referenced by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
	RegisterNode(String),
	DeregisterNode(String),
	RegisterService {
		node: Option<String>,
		id: String,
		port: u16,
	},
	DeregisterService {
		node: Option<String>,
		id: String,
	},
}

impl Call {
	pub const fn is_service_call(&self) -> bool {
		matches!(self, Self::RegisterService { .. } | Self::DeregisterService { .. })
	}
}

fn target_key(target: &ServiceTarget) -> Option<String> {
	match target {
		ServiceTarget::LocalAgent => None,
		ServiceTarget::Catalog(node) => Some(node.key.clone()),
	}
}

#[derive(Default)]
pub struct RecordingRegistry {
	observed: Mutex<Option<Observed>>,
	failing_ids: HashSet<String>,
	calls: Mutex<Vec<Call>>,
	scopes: Mutex<Vec<Scope>>,
}

impl RecordingRegistry {
	pub fn new(observed: Observed) -> Self {
		Self {
			observed: Mutex::new(Some(observed)),
			..Default::default()
		}
	}

	/// Registry whose state query always fails.
	pub fn unreachable() -> Self {
		Self::default()
	}

	/// Makes every call touching `id` (service ID or node key) fail.
	pub fn failing_on(mut self, id: &str) -> Self {
		self.failing_ids.insert(id.to_string());
		self
	}

	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().unwrap().clone()
	}

	pub fn scopes(&self) -> Vec<Scope> {
		self.scopes.lock().unwrap().clone()
	}

	fn record(&self, call: Call, id: &str) -> Result<(), RegistryError> {
		self.calls.lock().unwrap().push(call);

		if self.failing_ids.contains(id) {
			Err(RegistryError::Rejected {
				status: 500,
				message: format!("refusing to touch {id}"),
			})
		} else {
			Ok(())
		}
	}
}

#[async_trait]
impl RegistryClient for RecordingRegistry {
	async fn ping(&self) -> Result<String, RegistryError> {
		Ok("10.0.0.254:8300".to_string())
	}

	async fn query_observed(
		&self,
		scope: Scope,
		_signature: &OwnershipSignature,
	) -> Result<Observed, RegistryError> {
		self.scopes.lock().unwrap().push(scope);

		self.observed
			.lock()
			.unwrap()
			.clone()
			.ok_or_else(|| RegistryError::Transport("connection refused".to_string()))
	}

	async fn register_node(&self, node: &NodeMeta) -> Result<(), RegistryError> {
		self.record(Call::RegisterNode(node.key.clone()), &node.key)
	}

	async fn deregister_node(&self, node: &NodeMeta) -> Result<(), RegistryError> {
		self.record(Call::DeregisterNode(node.key.clone()), &node.key)
	}

	async fn register_service(
		&self,
		target: &ServiceTarget,
		service: &Service,
	) -> Result<(), RegistryError> {
		self.record(
			Call::RegisterService {
				node: target_key(target),
				id: service.id.clone(),
				port: service.port,
			},
			&service.id,
		)
	}

	async fn deregister_service(
		&self,
		target: &ServiceTarget,
		service_id: &str,
	) -> Result<(), RegistryError> {
		self.record(
			Call::DeregisterService {
				node: target_key(target),
				id: service_id.to_string(),
			},
			service_id,
		)
	}
}

/// Inventory answering with a fixed list, optionally holding each answer until released.
#[derive(Default)]
pub struct StaticInventory {
	services: Option<Vec<SourceService>>,
	scopes: Mutex<Vec<InventoryScope>>,
	listed: AtomicUsize,
	gate: Option<(Notify, Notify)>,
}

impl StaticInventory {
	pub fn new(services: Vec<SourceService>) -> Self {
		Self {
			services: Some(services),
			..Default::default()
		}
	}

	pub fn unavailable() -> Self {
		Self::default()
	}

	/// Every listing waits for [`Self::release`] after signalling [`Self::entered`].
	pub fn gated(services: Vec<SourceService>) -> Self {
		Self {
			services: Some(services),
			gate: Some((Notify::new(), Notify::new())),
			..Default::default()
		}
	}

	pub async fn entered(&self) {
		if let Some((entered, _)) = &self.gate {
			entered.notified().await;
		}
	}

	pub fn release(&self) {
		if let Some((_, release)) = &self.gate {
			release.notify_one();
		}
	}

	pub fn listed(&self) -> usize {
		self.listed.load(Ordering::SeqCst)
	}

	pub fn scopes(&self) -> Vec<InventoryScope> {
		self.scopes.lock().unwrap().clone()
	}
}

#[async_trait]
impl SourceInventory for StaticInventory {
	async fn list_services(
		&self,
		scope: InventoryScope,
	) -> Result<Vec<SourceService>, InventoryError> {
		self.scopes.lock().unwrap().push(scope);

		if let Some((entered, release)) = &self.gate {
			entered.notify_one();
			release.notified().await;
		}

		self.listed.fetch_add(1, Ordering::SeqCst);

		self.services
			.clone()
			.ok_or_else(|| InventoryError::Unavailable("metadata service is down".to_string()))
	}
}

pub fn source(name: &str, ip: &str, port: u16) -> SourceService {
	SourceService {
		name: name.to_string(),
		stack_name: "web".to_string(),
		environment_name: "Default".to_string(),
		environment_uuid: ENV_UUID.to_string(),
		host_name: format!("host-{ip}"),
		ip: ip.to_string(),
		port,
	}
}

pub fn signature() -> OwnershipSignature {
	OwnershipSignature::new(ENV_UUID)
}

/// Service as the transformer would produce it for this environment.
pub fn owned_service(id: &str, port: u16) -> Service {
	Service {
		id: id.to_string(),
		name: id.to_string(),
		tags: BTreeSet::from([
			"created-by-rancher".to_string(),
			signature().tag().to_string(),
		]),
		port,
		address: "10.0.0.1".to_string(),
		enable_tag_override: false,
	}
}

pub fn foreign_service(id: &str, port: u16) -> Service {
	Service {
		tags: BTreeSet::from(["team-b".to_string()]),
		..owned_service(id, port)
	}
}

pub fn owned_node(address: &str, services: Vec<Service>) -> Node {
	node_with_labels(
		address,
		BTreeMap::from([
			(signature().address_label().to_string(), address.to_string()),
			("wan".to_string(), address.to_string()),
		]),
		services,
	)
}

pub fn foreign_node(address: &str, services: Vec<Service>) -> Node {
	node_with_labels(
		address,
		BTreeMap::from([("lan".to_string(), address.to_string())]),
		services,
	)
}

fn node_with_labels(
	address: &str,
	tagged_addresses: BTreeMap<String, String>,
	services: Vec<Service>,
) -> Node {
	let mut node = Node::new(NodeMeta {
		key: address.to_string(),
		name: format!("host-{address}"),
		address: address.to_string(),
		tagged_addresses,
	});
	for service in services {
		node.insert_service(service);
	}
	node
}

pub fn registry(nodes: Vec<Node>) -> Registry {
	nodes.into_iter().collect()
}

/// Catalog keeping nodes by name the way Consul does, so two names may share an address.
#[derive(Default)]
pub struct NamedCatalog {
	nodes: Mutex<BTreeMap<String, Node>>,
	writes: AtomicUsize,
}

impl NamedCatalog {
	pub fn new(nodes: Vec<Node>) -> Self {
		Self {
			nodes: Mutex::new(
				nodes
					.into_iter()
					.map(|node| (node.meta.name.clone(), node))
					.collect(),
			),
			..Default::default()
		}
	}

	/// Observed state as the Consul client reads it, keyed by address.
	pub fn snapshot(&self) -> Registry {
		let mut registry = Registry::new();
		for node in self.nodes.lock().unwrap().values() {
			let mut node = node.clone();
			node.meta.key = node.meta.address.clone();
			registry.insert_observed(node);
		}
		registry
	}

	/// Node names mapped to their service IDs.
	pub fn contents(&self) -> BTreeMap<String, Vec<String>> {
		self.nodes
			.lock()
			.unwrap()
			.iter()
			.map(|(name, node)| (name.clone(), node.services.keys().cloned().collect()))
			.collect()
	}

	pub fn writes(&self) -> usize {
		self.writes.load(Ordering::SeqCst)
	}

	fn upsert(&self, meta: &NodeMeta) {
		let mut nodes = self.nodes.lock().unwrap();
		let node = nodes
			.entry(meta.name.clone())
			.or_insert_with(|| Node::new(meta.clone()));
		node.meta.address = meta.address.clone();
		node.meta.tagged_addresses = meta.tagged_addresses.clone();
	}
}

#[async_trait]
impl RegistryClient for NamedCatalog {
	async fn ping(&self) -> Result<String, RegistryError> {
		Ok("10.0.0.254:8300".to_string())
	}

	async fn query_observed(
		&self,
		_scope: Scope,
		_signature: &OwnershipSignature,
	) -> Result<Observed, RegistryError> {
		Ok(Observed::Catalog(self.snapshot()))
	}

	async fn register_node(&self, node: &NodeMeta) -> Result<(), RegistryError> {
		self.writes.fetch_add(1, Ordering::SeqCst);
		self.upsert(node);
		Ok(())
	}

	async fn deregister_node(&self, node: &NodeMeta) -> Result<(), RegistryError> {
		self.writes.fetch_add(1, Ordering::SeqCst);
		self.nodes.lock().unwrap().remove(&node.name);
		Ok(())
	}

	async fn register_service(
		&self,
		target: &ServiceTarget,
		service: &Service,
	) -> Result<(), RegistryError> {
		self.writes.fetch_add(1, Ordering::SeqCst);
		let ServiceTarget::Catalog(meta) = target else {
			return Err(RegistryError::Unsupported("agent write on a catalog".to_string()));
		};
		self.upsert(meta);
		if let Some(node) = self.nodes.lock().unwrap().get_mut(&meta.name) {
			node.insert_service(service.clone());
		}
		Ok(())
	}

	async fn deregister_service(
		&self,
		target: &ServiceTarget,
		service_id: &str,
	) -> Result<(), RegistryError> {
		self.writes.fetch_add(1, Ordering::SeqCst);
		let ServiceTarget::Catalog(meta) = target else {
			return Err(RegistryError::Unsupported("agent write on a catalog".to_string()));
		};
		if let Some(node) = self.nodes.lock().unwrap().get_mut(&meta.name) {
			node.services.remove(service_id);
		}
		Ok(())
	}
}
