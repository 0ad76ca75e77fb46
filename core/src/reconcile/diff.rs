use crate::model::{Service, Services};

/// Service level changes for one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDiff {
	/// Desired services that are missing or differ, registration being an upsert.
	pub to_register: Vec<Service>,
	/// IDs of observed services no longer desired.
	pub to_deregister: Vec<String>,
}

impl ServiceDiff {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.to_register.is_empty() && self.to_deregister.is_empty()
	}
}

#[must_use]
pub fn diff_services(observed: &Services, desired: &Services) -> ServiceDiff {
	let mut diff = ServiceDiff::default();

	for (id, current) in observed {
		match desired.get(id) {
			Some(wanted) if wanted == current => {}
			Some(wanted) => diff.to_register.push(wanted.clone()),
			None => diff.to_deregister.push(id.clone()),
		}
	}

	diff.to_register.extend(
		desired
			.iter()
			.filter(|(id, _)| !observed.contains_key(*id))
			.map(|(_, wanted)| wanted.clone()),
	);

	diff
}
