//!
//! # Registrator Core
//!
//! Keeps a Consul registry in sync with the services published by a Rancher environment.
//!
//! Every tick the [`Syncer`] lists the source services, turns them into the desired
//! [`Registry`] with [`build_desired`], reads the observed state from the target registry,
//! drops whatever lacks this environment's [`OwnershipSignature`] and converges the two with
//! the smallest set of register/deregister calls. Nothing is cached between ticks.
//!
//! Two modes exist:
//! - **agent**: services of the current host against a single local agent, no node concept;
//! - **catalog**: nodes and services of the whole environment against the cluster catalog.
//!
//! The source inventory and the registry wire protocol are reached through the
//! [`SourceInventory`] and [`RegistryClient`] traits.

#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::unnecessary_cast,
	clippy::cast_lossless,
	clippy::cast_possible_truncation,
	clippy::cast_possible_wrap,
	clippy::cast_precision_loss,
	clippy::cast_sign_loss,
	clippy::dbg_macro,
	clippy::deprecated_cfg_attr,
	clippy::separated_literal_suffix,
	deprecated
)]
#![forbid(deprecated_in_future)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod error;
mod inventory;
mod model;
mod ownership;
pub mod reconcile;
mod registry;
mod sanitize;
mod syncer;
mod transform;

pub use error::{InventoryError, RegistryError, TickError};
pub use inventory::{InventoryScope, SourceInventory, SourceService};
pub use model::{Node, NodeComparison, NodeMeta, Registry, Service, Services};
pub use ownership::{filter_registry, filter_services, owns_node, owns_service, OwnershipSignature};
pub use registry::{Observed, RegistryClient, Scope, ServiceTarget};
pub use sanitize::normalize;
pub use syncer::{SyncConfig, SyncMode, Syncer, DEFAULT_SYNC_INTERVAL};
pub use transform::{build_desired, CREATED_BY_TAG};
