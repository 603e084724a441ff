use std::path::{Path, PathBuf};

use super::{LinkPlan, Target, plan_dynamic_link, plan_static_link};

/// How an ONNX Runtime build found through `ORT_LIB_LOCATION` gets linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserProvidedLink {
	/// A static build. Its prerequisites (C++ runtime, system libraries) still have to be linked.
	Static(LinkPlan),
	/// A shared library. `dylib_dir` is where `copy-dylibs` takes libraries from; `None` leaves them where they are.
	Dynamic { plan: LinkPlan, dylib_dir: Option<PathBuf> },
	/// The directory doesn't exist, so there is nothing to link.
	Missing(LinkPlan)
}

/// Plans the link against a user-provided build in `lib_dir`.
///
/// `prefer_dynamic` (`ORT_PREFER_DYNAMIC_LINK`) skips straight to dynamic linking. Otherwise a static layout is tried
/// first; when none matches, the directory is linked dynamically instead, with shared libraries taken from the
/// `profile` subdirectory if it exists, else `lib/`, else `lib_dir` itself.
pub fn plan_user_provided(lib_dir: &Path, target: &Target, profile: Option<&str>, prefer_dynamic: bool) -> UserProvidedLink {
	if prefer_dynamic {
		return UserProvidedLink::Dynamic { plan: plan_dynamic_link(lib_dir), dylib_dir: None };
	}

	if let Some(plan) = plan_static_link(lib_dir, target, profile) {
		return UserProvidedLink::Static(plan);
	}

	let mut plan = LinkPlan::new();
	plan.debug(format!("no static ONNX Runtime build found in `{}`; falling back to dynamic linking", lib_dir.display()));
	if !lib_dir.exists() {
		return UserProvidedLink::Missing(plan);
	}
	plan.extend(plan_dynamic_link(lib_dir));

	let profile_dir = profile.filter(|p| !p.is_empty()).map(|p| lib_dir.join(p));
	let dylib_dir = match profile_dir {
		Some(dir) if dir.exists() => dir,
		_ if lib_dir.join("lib").exists() => lib_dir.join("lib"),
		_ => lib_dir.to_path_buf()
	};
	UserProvidedLink::Dynamic { plan, dylib_dir: Some(dylib_dir) }
}
