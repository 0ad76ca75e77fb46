use crate::error::Error;

use url::Url;

/// Host placeholder standing for the address of the Rancher host we run on.
pub const HOST_IP_PLACEHOLDER: &str = "RancherHostIP";

/// Base URL of the Consul HTTP API plus whether it is reached over TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
	pub base_url: Url,
	pub tls: bool,
}

fn parse(raw: &str) -> Result<Url, Error> {
	Url::parse(raw).map_err(|e| Error::InvalidUrl {
		url: raw.to_string(),
		reason: e.to_string(),
	})
}

impl Endpoint {
	/// Parses `consul://`, `consul-tls://`, `http://` and `https://` URLs.
	pub fn parse(raw: &str) -> Result<Self, Error> {
		let url = parse(raw)?;

		let (scheme, tls) = match url.scheme() {
			"consul" | "http" => ("http", false),
			"consul-tls" | "https" => ("https", true),
			other => return Err(Error::UnsupportedScheme(other.to_string())),
		};

		let host = url
			.host_str()
			.filter(|host| !host.is_empty())
			.ok_or_else(|| Error::InvalidUrl {
				url: raw.to_string(),
				reason: "missing host".to_string(),
			})?;

		let authority = url
			.port()
			.map_or_else(|| host.to_string(), |port| format!("{host}:{port}"));

		Ok(Self {
			base_url: parse(&format!("{scheme}://{authority}/"))?,
			tls,
		})
	}
}

/// Replaces a leading [`HOST_IP_PLACEHOLDER`] in the URL host with `host_ip`.
///
/// URLs without the placeholder are returned unchanged.
pub fn resolve_host_placeholder(raw: &str, host_ip: &str) -> Result<String, Error> {
	let mut url = parse(raw)?;

	let Some(host) = url.host_str() else {
		return Ok(raw.to_string());
	};

	let Some(rest) = host
		.get(..HOST_IP_PLACEHOLDER.len())
		.filter(|prefix| prefix.eq_ignore_ascii_case(HOST_IP_PLACEHOLDER))
		.map(|_| host[HOST_IP_PLACEHOLDER.len()..].to_string())
	else {
		return Ok(raw.to_string());
	};

	url.set_host(Some(&format!("{host_ip}{rest}")))
		.map_err(|e| Error::InvalidUrl {
			url: raw.to_string(),
			reason: e.to_string(),
		})?;

	Ok(url.to_string())
}
