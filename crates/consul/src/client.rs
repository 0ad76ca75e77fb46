use crate::{
	endpoint::Endpoint,
	error::Error,
	types::{
		AgentService, AgentServiceRegistration, CatalogDeregistration, CatalogNode,
		CatalogNodeServices, CatalogRegistration,
	},
};

use rcr_core::{
	Node, NodeMeta, Observed, OwnershipSignature, Registry, RegistryClient, RegistryError, Scope,
	Service, ServiceTarget, Services,
};

use std::{
	collections::BTreeMap,
	fs,
	path::{Path, PathBuf},
	time::Duration,
};

use async_trait::async_trait;
use reqwest::{
	header::{HeaderMap, HeaderValue},
	Certificate, Identity, RequestBuilder, Response,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};
use url::Url;

const TOKEN_HEADER: &str = "x-consul-token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// PEM files presented to a `consul-tls://` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
	pub ca_cert: PathBuf,
	pub client_cert: PathBuf,
	pub client_key: PathBuf,
}

impl TlsFiles {
	/// `ca.crt`, `client.crt` and `client.key` inside `dir`.
	#[must_use]
	pub fn in_dir(dir: impl AsRef<Path>) -> Self {
		let dir = dir.as_ref();
		Self {
			ca_cert: dir.join("ca.crt"),
			client_cert: dir.join("client.crt"),
			client_key: dir.join("client.key"),
		}
	}

	/// Whether all three files are present.
	#[must_use]
	pub fn exist(&self) -> bool {
		[&self.ca_cert, &self.client_cert, &self.client_key]
			.iter()
			.all(|path| path.is_file())
	}

	fn read(path: &Path) -> Result<Vec<u8>, Error> {
		fs::read(path).map_err(|source| Error::TlsFile {
			path: path.to_path_buf(),
			source,
		})
	}

	fn load(&self) -> Result<(Certificate, Identity), Error> {
		let ca = Certificate::from_pem(&Self::read(&self.ca_cert)?).map_err(Error::Tls)?;
		let identity = Identity::from_pkcs8_pem(
			&Self::read(&self.client_cert)?,
			&Self::read(&self.client_key)?,
		)
		.map_err(Error::Tls)?;

		Ok((ca, identity))
	}
}

#[derive(Debug, Clone, Default)]
pub struct ConsulConfig {
	pub url: String,
	pub token: Option<String>,
	/// Only used by TLS endpoints.
	pub tls: Option<TlsFiles>,
}

/// Client of the Consul HTTP API.
#[derive(Debug, Clone)]
pub struct ConsulClient {
	client: reqwest::Client,
	base_url: Url,
}

impl ConsulClient {
	pub fn new(config: &ConsulConfig) -> Result<Self, Error> {
		let endpoint = Endpoint::parse(&config.url)?;

		let mut headers = HeaderMap::new();
		if let Some(token) = config.token.as_deref().filter(|token| !token.is_empty()) {
			let mut value = HeaderValue::from_str(token).map_err(|_| Error::InvalidToken)?;
			value.set_sensitive(true);
			headers.insert(TOKEN_HEADER, value);
		}

		let mut builder = reqwest::Client::builder()
			.default_headers(headers)
			.timeout(REQUEST_TIMEOUT);

		if endpoint.tls {
			// Consul agents are reached by IP, their certificates never match it.
			builder = builder.danger_accept_invalid_certs(true);

			if let Some(files) = &config.tls {
				let (ca, identity) = files.load()?;
				builder = builder.add_root_certificate(ca).identity(identity);
			}
		}

		Ok(Self {
			client: builder.build().map_err(Error::HttpClient)?,
			base_url: endpoint.base_url,
		})
	}

	#[must_use]
	pub const fn base_url(&self) -> &Url {
		&self.base_url
	}

	fn url(&self, segments: &[&str]) -> Result<Url, Error> {
		let mut url = self.base_url.clone();
		url.path_segments_mut()
			.map_err(|()| Error::InvalidUrl {
				url: self.base_url.to_string(),
				reason: "cannot be a base".to_string(),
			})?
			.pop_if_empty()
			.extend(segments);

		Ok(url)
	}

	async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response, Error> {
		let response = request.send().await.map_err(|source| Error::Request {
			path: path.to_string(),
			source,
		})?;

		let status = response.status();
		if status.is_success() {
			return Ok(response);
		}

		let body = response.text().await.unwrap_or_default();

		Err(Error::Status {
			path: path.to_string(),
			status: status.as_u16(),
			body: body.trim().to_string(),
		})
	}

	async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, Error> {
		let url = self.url(segments)?;
		let path = url.path().to_string();

		self.send(self.client.get(url), &path)
			.await?
			.json()
			.await
			.map_err(|source| Error::Decode { path, source })
	}

	async fn put<B: Serialize + Sync>(&self, segments: &[&str], body: Option<&B>) -> Result<(), Error> {
		let url = self.url(segments)?;
		let path = url.path().to_string();

		let request = match body {
			Some(body) => self.client.put(url).json(body),
			None => self.client.put(url),
		};

		self.send(request, &path).await.map(|_| ())
	}

	/// Address of the current raft leader.
	pub async fn leader(&self) -> Result<String, Error> {
		self.get(&["v1", "status", "leader"]).await
	}

	pub async fn catalog_nodes(&self) -> Result<Vec<CatalogNode>, Error> {
		self.get(&["v1", "catalog", "nodes"]).await
	}

	/// Node detail with its services, `None` when the node is unknown.
	pub async fn catalog_node(&self, name: &str) -> Result<Option<CatalogNodeServices>, Error> {
		self.get(&["v1", "catalog", "node", name]).await
	}

	pub async fn agent_services(&self) -> Result<Vec<AgentService>, Error> {
		self.get::<BTreeMap<String, AgentService>>(&["v1", "agent", "services"])
			.await
			.map(|services| services.into_values().collect())
	}

	/// Catalog nodes tagged with `signature`, each with its services, keyed by address.
	///
	/// A node whose detail cannot be read is left out. Owned nodes sharing an address are all
	/// kept, see [`Registry::insert_observed`].
	pub async fn owned_catalog(&self, signature: &OwnershipSignature) -> Result<Registry, Error> {
		let mut registry = Registry::new();

		for entry in self.catalog_nodes().await? {
			if !entry.has_tagged_address(signature.address_label()) {
				continue;
			}

			match self.catalog_node(&entry.node).await {
				Ok(Some(detail)) => {
					let mut node = Node::new(detail.node.into_meta());
					for service in detail.services.unwrap_or_default().into_values() {
						node.insert_service(service.into());
					}
					let address = node.meta.address.clone();
					if !registry.insert_observed(node) {
						warn!(
							"Node '{}' shares address {address} with another owned node",
							entry.node
						);
					}
				}
				Ok(None) => debug!("Node '{}' vanished from the catalog", entry.node),
				Err(e) => error!("Failed to read node '{}': {e}", entry.node),
			}
		}

		Ok(registry)
	}

	pub async fn catalog_register(&self, registration: &CatalogRegistration<'_>) -> Result<(), Error> {
		self.put(&["v1", "catalog", "register"], Some(registration))
			.await
	}

	pub async fn catalog_deregister(
		&self,
		deregistration: &CatalogDeregistration<'_>,
	) -> Result<(), Error> {
		self.put(&["v1", "catalog", "deregister"], Some(deregistration))
			.await
	}

	pub async fn agent_register(&self, registration: &AgentServiceRegistration<'_>) -> Result<(), Error> {
		self.put(&["v1", "agent", "service", "register"], Some(registration))
			.await
	}

	pub async fn agent_deregister(&self, service_id: &str) -> Result<(), Error> {
		self.put::<()>(&["v1", "agent", "service", "deregister", service_id], None)
			.await
	}
}

#[async_trait]
impl RegistryClient for ConsulClient {
	async fn ping(&self) -> Result<String, RegistryError> {
		self.leader().await.map_err(Into::into)
	}

	async fn query_observed(
		&self,
		scope: Scope,
		signature: &OwnershipSignature,
	) -> Result<Observed, RegistryError> {
		match scope {
			Scope::LocalAgent => Ok(Observed::Agent(
				self.agent_services()
					.await?
					.into_iter()
					.map(|service| (service.id.clone(), Service::from(service)))
					.collect::<Services>(),
			)),
			Scope::ClusterCatalog => Ok(Observed::Catalog(self.owned_catalog(signature).await?)),
		}
	}

	async fn register_node(&self, node: &NodeMeta) -> Result<(), RegistryError> {
		self.catalog_register(&CatalogRegistration::node(node))
			.await
			.map_err(Into::into)
	}

	async fn deregister_node(&self, node: &NodeMeta) -> Result<(), RegistryError> {
		self.catalog_deregister(&CatalogDeregistration {
			node: &node.name,
			service_id: None,
		})
		.await
		.map_err(Into::into)
	}

	async fn register_service(
		&self,
		target: &ServiceTarget,
		service: &Service,
	) -> Result<(), RegistryError> {
		let result = match target {
			ServiceTarget::LocalAgent => {
				self.agent_register(&AgentServiceRegistration::from(service))
					.await
			}
			ServiceTarget::Catalog(node) => {
				self.catalog_register(&CatalogRegistration::node(node).with_service(service))
					.await
			}
		};

		result.map_err(Into::into)
	}

	async fn deregister_service(
		&self,
		target: &ServiceTarget,
		service_id: &str,
	) -> Result<(), RegistryError> {
		let result = match target {
			ServiceTarget::LocalAgent => self.agent_deregister(service_id).await,
			ServiceTarget::Catalog(node) => {
				self.catalog_deregister(&CatalogDeregistration {
					node: &node.name,
					service_id: Some(service_id),
				})
				.await
			}
		};

		result.map_err(Into::into)
	}
}
