use crate::{
	error::Error,
	types::{Container, Environment, Host},
};

use rcr_core::SourceService;

use std::collections::HashMap;

use tracing::{debug, error};

/// Every host running a published container is itself published under this stack and name.
pub const HOST_STACK_NAME: &str = "rancher";
pub const HOST_SERVICE_NAME: &str = "host";

/// Public port of a `ip:public:private/proto` port definition.
pub(crate) fn public_port(definition: &str) -> Result<u16, Error> {
	definition
		.split(':')
		.nth(1)
		.and_then(|port| port.parse().ok())
		.ok_or_else(|| Error::InvalidPort(definition.to_string()))
}

/// Turns containers into source service records.
///
/// With `self_host_uuid` set, containers running on any other host are skipped.
pub(crate) fn collect_services(
	environment: &Environment,
	containers: &[Container],
	hosts: &[Host],
	self_host_uuid: Option<&str>,
) -> Vec<SourceService> {
	let hosts = hosts
		.iter()
		.map(|host| (host.uuid.as_str(), host))
		.collect::<HashMap<_, _>>();

	let mut services = Vec::new();

	for container in containers {
		if container.service_name.is_empty()
			|| container.ports.is_empty()
			|| !container.is_available()
		{
			continue;
		}

		if self_host_uuid.is_some_and(|uuid| uuid != container.host_uuid) {
			continue;
		}

		if container.host_uuid.is_empty() {
			debug!("Container's {} host_uuid is empty", container.name);
			continue;
		}

		let Some(host) = hosts.get(container.host_uuid.as_str()) else {
			error!("{}", Error::HostNotFound(container.host_uuid.clone()));
			continue;
		};

		let record = |stack_name: &str, name: &str, port| SourceService {
			name: name.to_string(),
			stack_name: stack_name.to_string(),
			environment_name: environment.name.clone(),
			environment_uuid: environment.uuid.clone(),
			host_name: host.name.clone(),
			ip: host.published_ip().to_string(),
			port,
		};

		services.push(record(HOST_STACK_NAME, HOST_SERVICE_NAME, 0));

		for definition in &container.ports {
			match public_port(definition) {
				Ok(port) => services.push(record(
					&container.stack_name,
					&container.service_name,
					port,
				)),
				Err(e) => error!("Skipping port of container {}: {e}", container.name),
			}
		}
	}

	services
}

#[cfg(test)]
mod tests {
	use super::*;

	fn environment() -> Environment {
		Environment {
			name: "Default".to_string(),
			uuid: "1a5".to_string(),
		}
	}

	fn host(uuid: &str, agent_ip: &str) -> Host {
		Host {
			name: format!("{uuid}.example.com"),
			uuid: uuid.to_string(),
			agent_ip: agent_ip.to_string(),
			..Default::default()
		}
	}

	fn container(service: &str, host_uuid: &str, ports: &[&str]) -> Container {
		Container {
			name: format!("web-{service}-1"),
			service_name: service.to_string(),
			stack_name: "web".to_string(),
			host_uuid: host_uuid.to_string(),
			ports: ports.iter().map(ToString::to_string).collect(),
			state: "running".to_string(),
			health_state: "healthy".to_string(),
		}
	}

	#[test]
	fn public_port_is_second_segment() {
		assert_eq!(public_port("0.0.0.0:8080:80/tcp").unwrap(), 8080);
		assert!(public_port("8080:80/tcp").is_err());
		assert!(public_port("8080").is_err());
		assert!(public_port("0.0.0.0:http:80/tcp").is_err());
	}

	#[test]
	fn publishes_host_and_ports() {
		let services = collect_services(
			&environment(),
			&[container("app", "h1", &["0.0.0.0:80:8080/tcp", "0.0.0.0:443:8443/tcp"])],
			&[host("h1", "10.0.0.1")],
			None,
		);

		let summary = services
			.iter()
			.map(|s| (s.stack_name.as_str(), s.name.as_str(), s.port, s.ip.as_str()))
			.collect::<Vec<_>>();

		assert_eq!(
			summary,
			vec![
				("rancher", "host", 0, "10.0.0.1"),
				("web", "app", 80, "10.0.0.1"),
				("web", "app", 443, "10.0.0.1"),
			]
		);
		assert!(services.iter().all(|s| s.environment_uuid == "1a5"
			&& s.environment_name == "Default"
			&& s.host_name == "h1.example.com"));
	}

	#[test]
	fn skips_unpublishable_containers() {
		let mut unhealthy = container("sick", "h1", &["0.0.0.0:81:81/tcp"]);
		unhealthy.health_state = "unhealthy".to_string();
		let mut standalone = container("", "h1", &["0.0.0.0:82:82/tcp"]);
		standalone.name = "standalone".to_string();

		let services = collect_services(
			&environment(),
			&[
				unhealthy,
				standalone,
				container("no-ports", "h1", &[]),
				container("no-host", "", &["0.0.0.0:83:83/tcp"]),
				container("unknown-host", "h9", &["0.0.0.0:84:84/tcp"]),
			],
			&[host("h1", "10.0.0.1")],
			None,
		);

		assert!(services.is_empty());
	}

	#[test]
	fn self_host_scope() {
		let services = collect_services(
			&environment(),
			&[
				container("local", "h1", &["0.0.0.0:80:80/tcp"]),
				container("remote", "h2", &["0.0.0.0:81:81/tcp"]),
			],
			&[host("h1", "10.0.0.1"), host("h2", "10.0.0.2")],
			Some("h1"),
		);

		assert!(services.iter().all(|s| s.ip == "10.0.0.1"));
		assert!(services.iter().any(|s| s.name == "local"));
		assert!(!services.iter().any(|s| s.name == "remote"));
	}

	#[test]
	fn bad_port_definition_keeps_the_others() {
		let services = collect_services(
			&environment(),
			&[container("app", "h1", &["garbage", "0.0.0.0:80:80/tcp"])],
			&[host("h1", "10.0.0.1")],
			None,
		);

		assert_eq!(services.len(), 2);
		assert_eq!(services[1].port, 80);
	}
}
