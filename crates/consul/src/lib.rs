//! Consul HTTP API client.
//!
//! Implements [`RegistryClient`](rcr_core::RegistryClient) over the catalog and agent
//! endpoints, with `consul://`, `consul-tls://` and plain `http(s)://` URLs.

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

mod client;
mod endpoint;
mod error;
mod types;

pub use client::{ConsulClient, ConsulConfig, TlsFiles};
pub use endpoint::{resolve_host_placeholder, Endpoint, HOST_IP_PLACEHOLDER};
pub use error::Error;
pub use types::{
	AgentService, AgentServiceRegistration, CatalogDeregistration, CatalogNode,
	CatalogNodeServices, CatalogRegistration, CatalogService,
};
