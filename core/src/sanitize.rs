use once_cell::sync::Lazy;
use regex::Regex;

static FORBIDDEN: Lazy<Regex> =
	Lazy::new(|| Regex::new("[^a-zA-Z0-9-]").expect("hardcoded regex is valid"));
static DASH_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new("-+").expect("hardcoded regex is valid"));

/// Normalizes a free-form label into a token usable as a Consul tag or tagged address label.
///
/// Every character outside `[A-Za-z0-9-]` becomes a dash, runs of dashes collapse into one,
/// leading and trailing dashes are dropped and the result is lowercased.
#[must_use]
pub fn normalize(label: &str) -> String {
	let replaced = FORBIDDEN.replace_all(label, "-");
	let collapsed = DASH_RUNS.replace_all(&replaced, "-");

	collapsed.trim_matches('-').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn mixed_punctuation_and_case() {
		assert_eq!(normalize("Rancher_ENV! 123"), "rancher-env-123");
	}

	#[test]
	fn trims_dashes() {
		assert_eq!(normalize("---a---"), "a");
		assert_eq!(normalize("-_-"), "");
	}

	#[test]
	fn empty_input() {
		assert_eq!(normalize(""), "");
	}

	#[test]
	fn non_ascii_is_replaced() {
		assert_eq!(normalize("prod/été"), "prod-t");
	}

	#[test]
	fn uuid_signature() {
		assert_eq!(
			normalize("rancher-1a5-ip"),
			normalize(&normalize("rancher-1a5-ip"))
		);
		assert_eq!(normalize("rancher-1A5:ip"), "rancher-1a5-ip");
	}
}
