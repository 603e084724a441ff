use pkg_config::Config;

use crate::{
	link::{LibKind, LinkPlan, SearchKind},
	version::ORT_API_VERSION
};

/// Asks `pkg-config` for `libonnxruntime`. Returns a plan only if the installed version is recent enough.
pub fn attempt(plan: &mut LinkPlan) -> Option<LinkPlan> {
	let lib = match Config::new().cargo_metadata(false).probe("libonnxruntime") {
		Ok(lib) => lib,
		Err(_) => {
			plan.debug("`libonnxruntime` is not configured in `pkg-config`; will fall back to default linking routine.");
			return None;
		}
	};

	let got_minor = lib.version.split('.').nth(1).and_then(|minor| minor.parse::<u32>().ok());
	match got_minor {
		Some(minor) if minor >= ORT_API_VERSION => {}
		_ => {
			plan.warning(format!(
				"libonnxruntime provided by `pkg-config` is out of date, so it will be ignored. Version was {} but ortkit expects 1.{ORT_API_VERSION}",
				lib.version
			));
			return None;
		}
	}

	let mut linked = LinkPlan::new();
	for path in lib.link_paths {
		linked.search(SearchKind::Native, path);
	}
	for name in lib.libs {
		linked.link(LibKind::Default, name);
	}
	linked.debug("Using `libonnxruntime` as configured by `pkg-config`.");
	Some(linked)
}
