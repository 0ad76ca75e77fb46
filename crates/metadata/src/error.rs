use rcr_core::InventoryError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("invalid metadata url '{url}': {source}")]
	InvalidUrl {
		url: String,
		#[source]
		source: url::ParseError,
	},
	#[error("failed to build http client: {0}")]
	HttpClient(#[source] reqwest::Error),
	#[error("metadata request <path='{path}'> failed: {source}")]
	Request {
		path: String,
		#[source]
		source: reqwest::Error,
	},
	#[error("unexpected metadata payload <path='{path}'>: {source}")]
	Decode {
		path: String,
		#[source]
		source: reqwest::Error,
	},
	#[error("host not found in metadata <uuid='{0}'>")]
	HostNotFound(String),
	#[error("invalid port definition '{0}'")]
	InvalidPort(String),
}

impl From<Error> for InventoryError {
	fn from(e: Error) -> Self {
		match e {
			Error::Decode { .. } | Error::InvalidPort(_) | Error::HostNotFound(_) => {
				Self::Malformed(e.to_string())
			}
			Error::InvalidUrl { .. } | Error::HttpClient(_) | Error::Request { .. } => {
				Self::Unavailable(e.to_string())
			}
		}
	}
}
