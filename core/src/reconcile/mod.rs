//! Diffing of desired against observed registry state.
//!
//! Planning is pure: `plan_*` functions walk two immutable snapshots and return the list of
//! [`Action`]s that converge them. Applying is sequential and never stops early, a failed
//! action is logged and left for the next tick to retry.

use crate::{
	model::{NodeMeta, Service},
	registry::ServiceTarget,
};

use std::fmt;

mod agent;
mod apply;
mod catalog;
mod diff;

pub use agent::{plan_agent, reconcile_agent};
pub use apply::{apply, ApplyReport};
pub use catalog::{plan_catalog, reconcile_catalog};
pub use diff::{diff_services, ServiceDiff};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
	RegisterNode(NodeMeta),
	DeregisterNode(NodeMeta),
	RegisterService {
		target: ServiceTarget,
		service: Service,
	},
	DeregisterService {
		target: ServiceTarget,
		service_id: String,
	},
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::RegisterNode(node) => {
				write!(f, "register node '{}' <address='{}'>", node.name, node.address)
			}
			Self::DeregisterNode(node) => {
				write!(f, "deregister node '{}' <address='{}'>", node.name, node.address)
			}
			Self::RegisterService { target, service } => {
				write!(f, "register service '{}' on {target}", service.id)
			}
			Self::DeregisterService { target, service_id } => {
				write!(f, "deregister service '{service_id}' on {target}")
			}
		}
	}
}
