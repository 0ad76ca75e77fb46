use rcr_core::{NodeComparison, SyncConfig, SyncMode};

use std::{path::PathBuf, time::Duration};

use clap::{builder::BoolishValueParser, ArgAction, Parser, ValueEnum};

pub const DEFAULT_METADATA_URL: &str = "http://rancher-metadata.rancher.internal/latest";
pub const DEFAULT_CONSUL_URL: &str = "consul://RancherHostIP:8500";

#[derive(Parser, Debug, Clone)]
#[command(
	name = "rancher-consul-registrator",
	version,
	about = "Registers the public services of a Rancher environment in Consul"
)]
pub struct Config {
	/// Rancher metadata URL
	#[arg(long, env = "METADATA_URL", default_value = DEFAULT_METADATA_URL)]
	pub metadata_url: String,

	/// Consul API URL, `RancherHostIP` is replaced by the host agent IP in local mode
	#[arg(long, env = "CONSUL_URL", default_value = DEFAULT_CONSUL_URL)]
	pub consul_url: String,

	/// Consul ACL token
	#[arg(long, env = "CONSUL_TOKEN", hide_env_values = true)]
	pub consul_token: Option<String>,

	/// Where to dump the cert files from Rancher metadata
	#[arg(long, env = "CERT_DIR", default_value = "/")]
	pub cert_dir: PathBuf,

	/// Time between service syncs
	#[arg(long, env = "SYNC_INTERVAL", default_value = "10s", value_parser = parse_interval)]
	pub sync_interval: Duration,

	/// HTTP healthcheck port
	#[arg(long, env = "HEALTHCHECK_PORT", default_value_t = 10000)]
	pub healthcheck_port: u16,

	/// Only sync this host to the local agent, or register the whole environment in the catalog
	#[arg(
		long,
		env = "LOCAL_MODE",
		default_value = "true",
		action = ArgAction::Set,
		value_parser = BoolishValueParser::new()
	)]
	pub local_mode: bool,

	/// Node metadata compared before re-registering a catalog node
	#[arg(long, env = "NODE_COMPARISON", value_enum, default_value_t = NodeComparisonArg::Declared)]
	pub node_comparison: NodeComparisonArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NodeComparisonArg {
	/// Name, address and the tagged addresses we set
	Declared,
	/// Name, address and every tagged address
	Full,
}

impl From<NodeComparisonArg> for NodeComparison {
	fn from(arg: NodeComparisonArg) -> Self {
		match arg {
			NodeComparisonArg::Declared => Self::Declared,
			NodeComparisonArg::Full => Self::Full,
		}
	}
}

fn parse_interval(raw: &str) -> Result<Duration, String> {
	match humantime::parse_duration(raw) {
		Ok(interval) if interval.is_zero() => Err("sync interval must be positive".to_string()),
		Ok(interval) => Ok(interval),
		Err(e) => Err(e.to_string()),
	}
}

impl Config {
	#[must_use]
	pub fn sync_config(&self) -> SyncConfig {
		SyncConfig {
			interval: self.sync_interval,
			mode: if self.local_mode {
				SyncMode::Agent
			} else {
				SyncMode::Catalog
			},
			node_comparison: self.node_comparison.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(args: &[&str]) -> Result<Config, clap::Error> {
		Config::try_parse_from(std::iter::once("rancher-consul-registrator").chain(args.iter().copied()))
	}

	#[test]
	fn defaults() {
		let config = parse(&[]).unwrap();

		assert_eq!(config.metadata_url, DEFAULT_METADATA_URL);
		assert_eq!(config.consul_url, DEFAULT_CONSUL_URL);
		assert_eq!(config.cert_dir, PathBuf::from("/"));
		assert_eq!(config.healthcheck_port, 10000);

		let sync = config.sync_config();
		assert_eq!(sync.interval, Duration::from_secs(10));
		assert_eq!(sync.mode, SyncMode::Agent);
		assert_eq!(sync.node_comparison, NodeComparison::Declared);
	}

	#[test]
	fn remote_mode_selects_the_catalog() {
		let config = parse(&[
			"--local-mode=false",
			"--sync-interval",
			"1m 30s",
			"--node-comparison",
			"full",
			"--consul-token",
			"s3cr3t",
		])
		.unwrap();

		let sync = config.sync_config();
		assert_eq!(sync.mode, SyncMode::Catalog);
		assert_eq!(sync.interval, Duration::from_secs(90));
		assert_eq!(sync.node_comparison, NodeComparison::Full);
		assert_eq!(config.consul_token.as_deref(), Some("s3cr3t"));
	}

	#[test]
	fn boolish_local_mode() {
		assert!(!parse(&["--local-mode", "no"]).unwrap().local_mode);
		assert!(parse(&["--local-mode", "1"]).unwrap().local_mode);
	}

	#[test]
	fn bad_intervals_are_rejected() {
		assert!(parse(&["--sync-interval", "0s"]).is_err());
		assert!(parse(&["--sync-interval", "soon"]).is_err());
	}
}
