use rcr_core::RegistryError;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("bad consul url '{url}': {reason}")]
	InvalidUrl { url: String, reason: String },
	#[error("unsupported consul url scheme '{0}'")]
	UnsupportedScheme(String),
	#[error("consul token is not a valid header value")]
	InvalidToken,
	#[error("failed to read TLS file <path='{}'>: {source}", .path.display())]
	TlsFile {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("invalid TLS material: {0}")]
	Tls(#[source] reqwest::Error),
	#[error("failed to build http client: {0}")]
	HttpClient(#[source] reqwest::Error),
	#[error("consul request <path='{path}'> failed: {source}")]
	Request {
		path: String,
		#[source]
		source: reqwest::Error,
	},
	#[error("consul answered <path='{path}'> with status {status}: {body}")]
	Status {
		path: String,
		status: u16,
		body: String,
	},
	#[error("unexpected consul payload <path='{path}'>: {source}")]
	Decode {
		path: String,
		#[source]
		source: reqwest::Error,
	},
}

impl From<Error> for RegistryError {
	fn from(e: Error) -> Self {
		match e {
			Error::Status { status, path, body } => Self::Rejected {
				status,
				message: format!("{path}: {body}"),
			},
			Error::Decode { .. } => Self::Decode(e.to_string()),
			Error::Request { .. } => Self::Transport(e.to_string()),
			Error::InvalidUrl { .. }
			| Error::UnsupportedScheme(_)
			| Error::InvalidToken
			| Error::TlsFile { .. }
			| Error::Tls(_)
			| Error::HttpClient(_) => Self::Unsupported(e.to_string()),
		}
	}
}
