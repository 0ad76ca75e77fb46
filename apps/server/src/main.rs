//!
//! # Rancher Consul Registrator
//!
//! Mirrors the public services of a Rancher environment into Consul, either into the agent of
//! the host it runs on (local mode) or into the cluster catalog (remote mode).

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

use crate::{config::Config, context::Context};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod certs;
mod config;
mod context;
mod healthcheck;
mod utils;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let config = Config::parse();

	tracing_subscriber::fmt()
		.without_time()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();

	info!("Starting Consul Service Registrator");

	Context::init(config).await?.run().await
}
