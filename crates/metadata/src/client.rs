use crate::{
	error::Error,
	services::collect_services,
	types::{Container, Environment, Host, SelfService, Stack},
};

use rcr_core::{InventoryError, InventoryScope, SourceInventory, SourceService};

use std::{collections::BTreeMap, future::Future, time::Duration};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{error, info};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Self service metadata entries holding the Consul TLS material.
pub const CERT_NAMES: [&str; 3] = ["ca.crt", "client.crt", "client.key"];

/// How long [`MetadataClient::connect`] keeps trying before giving up.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
	pub initial_delay: Duration,
	/// Retries stop once the delay reaches this value.
	pub max_delay: Duration,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			initial_delay: Duration::from_secs(1),
			max_delay: Duration::from_secs(30),
		}
	}
}

impl RetryPolicy {
	async fn run<T, F, Fut>(self, what: &str, mut op: F) -> Result<T, Error>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<T, Error>>,
	{
		let mut delay = self.initial_delay;

		loop {
			match op().await {
				Ok(value) => return Ok(value),
				Err(e) => {
					if delay >= self.max_delay {
						return Err(e);
					}
					error!("Error reading {what}: {e}...will retry");
					sleep(delay).await;
					delay *= 2;
				}
			}
		}
	}
}

/// Client of the Rancher metadata service, bound to the environment it runs in.
#[derive(Debug, Clone)]
pub struct MetadataClient {
	client: reqwest::Client,
	base_url: String,
	environment: Environment,
}

impl MetadataClient {
	/// Connects with the default [`RetryPolicy`].
	pub async fn connect(base_url: &str) -> Result<Self, Error> {
		Self::connect_with_retry(base_url, RetryPolicy::default()).await
	}

	/// Waits for the metadata service to answer, then reads the current environment.
	pub async fn connect_with_retry(base_url: &str, retry: RetryPolicy) -> Result<Self, Error> {
		Url::parse(base_url).map_err(|source| Error::InvalidUrl {
			url: base_url.to_string(),
			source,
		})?;

		let mut headers = HeaderMap::new();
		headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

		let client = reqwest::Client::builder()
			.default_headers(headers)
			.timeout(REQUEST_TIMEOUT)
			.build()
			.map_err(Error::HttpClient)?;

		let mut this = Self {
			client,
			base_url: base_url.trim_end_matches('/').to_string(),
			environment: Environment {
				name: String::new(),
				uuid: String::new(),
			},
		};

		let version = retry.run("metadata version", || this.version()).await?;
		info!("Rancher Metadata is reachable <version='{version}'>");

		let stack = retry.run("stack info", || this.self_stack()).await?;
		this.environment = Environment {
			name: stack.environment_name,
			uuid: stack.environment_uuid,
		};

		Ok(this)
	}

	#[must_use]
	pub const fn environment(&self) -> &Environment {
		&self.environment
	}

	async fn send(&self, path: &str) -> Result<reqwest::Response, Error> {
		self.client
			.get(format!("{}{path}", self.base_url))
			.send()
			.await
			.and_then(reqwest::Response::error_for_status)
			.map_err(|source| Error::Request {
				path: path.to_string(),
				source,
			})
	}

	async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
		self.send(path)
			.await?
			.json()
			.await
			.map_err(|source| Error::Decode {
				path: path.to_string(),
				source,
			})
	}

	pub async fn version(&self) -> Result<String, Error> {
		self.send("/version")
			.await?
			.text()
			.await
			.map(|version| version.trim().trim_matches('"').to_string())
			.map_err(|source| Error::Decode {
				path: "/version".to_string(),
				source,
			})
	}

	pub async fn self_stack(&self) -> Result<Stack, Error> {
		self.get("/self/stack").await
	}

	pub async fn self_host(&self) -> Result<Host, Error> {
		self.get("/self/host").await
	}

	pub async fn self_service(&self) -> Result<SelfService, Error> {
		self.get("/self/service").await
	}

	pub async fn containers(&self) -> Result<Vec<Container>, Error> {
		self.get("/containers").await
	}

	pub async fn hosts(&self) -> Result<Vec<Host>, Error> {
		self.get("/hosts").await
	}

	/// TLS material published in the self service metadata, keyed by file name.
	///
	/// Only string entries named in [`CERT_NAMES`] are returned.
	pub async fn certs(&self) -> Result<BTreeMap<String, String>, Error> {
		let service = self.self_service().await?;

		Ok(CERT_NAMES
			.iter()
			.filter_map(|name| {
				service
					.metadata
					.get(*name)
					.and_then(serde_json::Value::as_str)
					.map(|content| ((*name).to_string(), content.to_string()))
			})
			.collect())
	}

	/// Lists the published services of the environment, or of this host only.
	pub async fn services(&self, scope: InventoryScope) -> Result<Vec<SourceService>, Error> {
		let containers = self.containers().await?;
		let hosts = self.hosts().await?;

		let self_host_uuid = match scope {
			InventoryScope::SelfHost => Some(self.self_host().await?.uuid),
			InventoryScope::Environment => None,
		};

		Ok(collect_services(
			&self.environment,
			&containers,
			&hosts,
			self_host_uuid.as_deref(),
		))
	}
}

#[async_trait]
impl SourceInventory for MetadataClient {
	async fn list_services(
		&self,
		scope: InventoryScope,
	) -> Result<Vec<SourceService>, InventoryError> {
		self.services(scope).await.map_err(Into::into)
	}
}
