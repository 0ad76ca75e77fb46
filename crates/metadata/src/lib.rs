//! Rancher metadata client.
//!
//! Reads the containers and hosts of the current environment and turns every published port
//! into a [`SourceService`](rcr_core::SourceService) for the reconciler.

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
mod error;
mod services;
mod types;

pub use client::{MetadataClient, RetryPolicy, CERT_NAMES};
pub use error::Error;
pub use services::{HOST_SERVICE_NAME, HOST_STACK_NAME};
pub use types::{Container, Environment, Host, SelfService, Stack, EXTERNAL_DNS_IP_LABEL};
