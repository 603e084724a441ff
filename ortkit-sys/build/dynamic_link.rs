#[cfg(feature = "copy-dylibs")]
use std::path::Path;

#[cfg(not(feature = "load-dynamic"))]
use crate::vars;

#[cfg(not(feature = "load-dynamic"))]
pub fn prefer_dynamic_linking() -> bool {
	vars::is_truthy(vars::get(vars::PREFER_DYNAMIC_LINK).as_deref())
}

/// Places the shared libraries from `lib_dir` next to build outputs so that binaries can load them without extra setup.
#[cfg(feature = "copy-dylibs")]
pub fn copy_dylibs(lib_dir: &Path, out_dir: &Path, target: &crate::link::Target) {
	use crate::{link::dylibs, log, version::ORT_VERSION};

	let Some(target_dir) = dylibs::target_dir_from_out_dir(out_dir) else {
		log::warning!("couldn't determine the target directory from OUT_DIR `{}`; not copying dylibs", out_dir.display());
		return;
	};

	let versioned_alias = format!("libonnxruntime.so.{ORT_VERSION}");
	let versioned_alias = (target.os == "linux").then_some(versioned_alias.as_str());
	match dylibs::copy_dylibs(lib_dir, target_dir, versioned_alias) {
		Ok(placed) => {
			if placed.copied {
				log::warning!(
					"had to copy dylibs because Windows Developer Mode is not enabled, or the cache dir is on a different drive. examples & tests will not be able to access the dylibs"
				);
			} else {
				for path in placed.paths {
					println!("cargo:rerun-if-changed={}", path.display());
				}
			}
		}
		Err(e) => log::warning!("failed to copy dylibs from `{}`: {e}", lib_dir.display())
	}
}
