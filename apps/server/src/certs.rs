use std::{collections::BTreeMap, path::Path};

use tokio::fs;
use tracing::{debug, error, info};

/// Writes every cert into `dir`, leaving files that already exist untouched.
///
/// Returns how many files were written, failures are logged and skipped.
pub async fn dump_certs(dir: &Path, certs: &BTreeMap<String, String>) -> usize {
	info!("Dumping certs to {}", dir.display());

	let mut written = 0;

	for (name, content) in certs {
		let path = dir.join(name);

		if fs::try_exists(&path).await.unwrap_or(false) {
			debug!("Keeping existing cert file {}", path.display());
			continue;
		}

		let result = match fs::create_dir_all(dir).await {
			Ok(()) => fs::write(&path, content).await,
			Err(e) => Err(e),
		};

		match result {
			Ok(()) => written += 1,
			Err(e) => error!("Cannot write file to {}: {e}", path.display()),
		}
	}

	written
}
