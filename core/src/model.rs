//! Entities compared by the reconciler.
//!
//! Equality on [`Service`] is plain value equality over the fields Consul round-trips, tags
//! being a set so the order the registry echoes them back in never counts as a change. Node
//! metadata equality depends on a [`NodeComparison`] chosen by the operator.

use std::collections::{btree_map, BTreeMap, BTreeSet};

/// Services keyed by their ID.
pub type Services = BTreeMap<String, Service>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
	pub id: String,
	/// Name the service is discoverable under.
	pub name: String,
	pub tags: BTreeSet<String>,
	pub port: u16,
	pub address: String,
	pub enable_tag_override: bool,
}

/// Everything about a node except its services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMeta {
	/// Stable identifier, the node address in catalog mode.
	pub key: String,
	/// Node name as known by the registry.
	pub name: String,
	pub address: String,
	pub tagged_addresses: BTreeMap<String, String>,
}

/// Which node metadata fields take part in deciding that a node must be re-registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NodeComparison {
	/// Name, address and only the tagged addresses the desired node declares.
	#[default]
	Declared,
	/// Name, address and the complete tagged address map.
	Full,
}

impl NodeMeta {
	/// Whether `self` (observed) already matches `desired` under `comparison`.
	#[must_use]
	pub fn matches(&self, desired: &Self, comparison: NodeComparison) -> bool {
		if self.name != desired.name || self.address != desired.address {
			return false;
		}

		match comparison {
			NodeComparison::Full => self.tagged_addresses == desired.tagged_addresses,
			NodeComparison::Declared => desired
				.tagged_addresses
				.iter()
				.all(|(label, address)| self.tagged_addresses.get(label) == Some(address)),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
	pub meta: NodeMeta,
	pub services: Services,
}

impl Node {
	#[must_use]
	pub const fn new(meta: NodeMeta) -> Self {
		Self {
			meta,
			services: BTreeMap::new(),
		}
	}

	#[must_use]
	pub fn key(&self) -> &str {
		&self.meta.key
	}

	/// Inserts or overwrites a service under its ID, returning the replaced one.
	pub fn insert_service(&mut self, service: Service) -> Option<Service> {
		self.services.insert(service.id.clone(), service)
	}

	/// Whether `self` (observed) needs no action at all to match `desired`.
	#[must_use]
	pub fn in_sync_with(&self, desired: &Self, comparison: NodeComparison) -> bool {
		self.meta.matches(&desired.meta, comparison) && self.services == desired.services
	}
}

/// Snapshot of nodes keyed by [`NodeMeta::key`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
	nodes: BTreeMap<String, Node>,
}

impl Registry {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a node under its own key, replacing any node with the same key.
	pub fn insert(&mut self, node: Node) -> Option<Node> {
		self.nodes.insert(node.meta.key.clone(), node)
	}

	/// Inserts a node read from the registry without ever dropping one.
	///
	/// The registry names nodes, so two owned nodes may share an address. The first keeps the
	/// address key, any later one is stored under `address#name`, a key no desired node has,
	/// which gets it deregistered. Returns `false` when the node had to be re-keyed.
	pub fn insert_observed(&mut self, mut node: Node) -> bool {
		if !self.nodes.contains_key(node.key()) {
			self.insert(node);
			return true;
		}

		node.meta.key = format!("{}#{}", node.meta.address, node.meta.name);
		self.insert(node);
		false
	}

	/// Returns the node stored under `key`, creating it from `meta` if absent.
	pub fn node_or_insert_with(&mut self, key: &str, meta: impl FnOnce() -> NodeMeta) -> &mut Node {
		self.nodes
			.entry(key.to_string())
			.or_insert_with(|| Node::new(meta()))
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<&Node> {
		self.nodes.get(key)
	}

	#[must_use]
	pub fn contains(&self, key: &str) -> bool {
		self.nodes.contains_key(key)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.nodes.values()
	}

	/// Total number of services over all nodes.
	#[must_use]
	pub fn service_count(&self) -> usize {
		self.nodes.values().map(|node| node.services.len()).sum()
	}
}

impl FromIterator<Node> for Registry {
	fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
		let mut registry = Self::new();
		for node in iter {
			registry.insert(node);
		}
		registry
	}
}

impl IntoIterator for Registry {
	type Item = Node;
	type IntoIter = btree_map::IntoValues<String, Node>;

	fn into_iter(self) -> Self::IntoIter {
		self.nodes.into_values()
	}
}
