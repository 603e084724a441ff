use super::{BinariesSource, LibKind, LinkPlan, SearchKind, Target};

/// System libraries a DirectML-enabled ONNX Runtime needs on Windows.
pub const DIRECTML_LIBS: &[&str] = &["dxguid", "DXCORE", "DXGI", "D3D12", "DirectML"];

/// Plans the system libraries ONNX Runtime needs on top of its own.
///
/// - `cxx_stdlib` is the `ORT_CXX_STDLIB`/`CXXSTDLIB` override; `Some("")` disables linking a C++ standard library.
/// - `rtlib_dir` is the clang runtime library directory on Apple targets, if it could be determined.
/// - `link_directml` is set when the `directml` feature is enabled.
pub fn plan_prerequisites(target: &Target, source: BinariesSource, cxx_stdlib: Option<&str>, rtlib_dir: Option<&str>, link_directml: bool) -> LinkPlan {
	let mut plan = LinkPlan::new();

	let stdlib = match cxx_stdlib {
		Some(stdlib) => (!stdlib.is_empty()).then_some(stdlib),
		None if target.triple.contains("msvc") => None,
		None if target.is_apple() => Some("c++"),
		None if target.os == "android" => Some("c++_shared"),
		None => Some("stdc++")
	};
	if let Some(stdlib) = stdlib {
		plan.link(LibKind::Default, stdlib);
	}

	if target.triple.contains("apple-darwin") {
		plan.link(LibKind::Framework, "Foundation");
		if let Some(dir) = rtlib_dir {
			plan.search(SearchKind::All, dir);
			plan.link(LibKind::Default, "clang_rt.osx");
		}
	} else if target.triple.contains("apple-ios") {
		plan.link(LibKind::Framework, "Foundation");
		plan.link(LibKind::Framework, "CoreML");
		if let Some(dir) = rtlib_dir {
			plan.search(SearchKind::All, dir);
			plan.link(LibKind::Default, if target.triple.contains("ios-sim") { "clang_rt.iossim" } else { "clang_rt.ios" });
		}
	}

	// downloaded Windows builds ship with DirectML compiled in
	if target.is_windows() && (source == BinariesSource::Downloaded || link_directml) {
		for lib in DIRECTML_LIBS {
			plan.link(LibKind::Default, *lib);
		}
	}

	plan
}

#[cfg(test)]
mod tests {
	use super::*;

	fn libs(plan: &LinkPlan) -> Vec<&str> {
		plan.libraries().map(|(_, name)| name).collect()
	}

	#[test]
	fn test_default_stdlib() {
		let linux = Target::from_triple("x86_64-unknown-linux-gnu");
		assert_eq!(libs(&plan_prerequisites(&linux, BinariesSource::UserProvided, None, None, false)), ["stdc++"]);

		let android = Target::from_triple("aarch64-linux-android");
		assert_eq!(libs(&plan_prerequisites(&android, BinariesSource::UserProvided, None, None, false)), ["c++_shared"]);

		let msvc = Target::from_triple("x86_64-pc-windows-msvc");
		assert!(plan_prerequisites(&msvc, BinariesSource::UserProvided, None, None, false).is_empty());
	}

	#[test]
	fn test_stdlib_override() {
		let linux = Target::from_triple("x86_64-unknown-linux-gnu");
		assert_eq!(libs(&plan_prerequisites(&linux, BinariesSource::UserProvided, Some("c++"), None, false)), ["c++"]);
		assert!(plan_prerequisites(&linux, BinariesSource::UserProvided, Some(""), None, false).is_empty());
	}

	#[test]
	fn test_apple_frameworks() {
		let macos = Target::from_triple("aarch64-apple-darwin");
		let plan = plan_prerequisites(&macos, BinariesSource::UserProvided, None, Some("/clang/lib/darwin"), false);
		assert_eq!(plan.libraries().collect::<Vec<_>>(), [
			(LibKind::Default, "c++"),
			(LibKind::Framework, "Foundation"),
			(LibKind::Default, "clang_rt.osx")
		]);
		assert_eq!(plan.search_paths().next(), Some(std::path::Path::new("/clang/lib/darwin")));

		let sim = Target::from_triple("aarch64-apple-ios-sim");
		let plan = plan_prerequisites(&sim, BinariesSource::UserProvided, None, Some("/res/lib/darwin"), false);
		assert!(plan.links("CoreML"));
		assert!(plan.links("clang_rt.iossim"));

		let plan = plan_prerequisites(&sim, BinariesSource::UserProvided, None, None, false);
		assert!(!plan.links("clang_rt.iossim"));
		assert_eq!(plan.search_paths().count(), 0);
	}

	#[test]
	fn test_directml_libraries() {
		let msvc = Target::from_triple("x86_64-pc-windows-msvc");
		assert_eq!(libs(&plan_prerequisites(&msvc, BinariesSource::Downloaded, None, None, false)), DIRECTML_LIBS);
		assert_eq!(libs(&plan_prerequisites(&msvc, BinariesSource::UserProvided, None, None, true)), DIRECTML_LIBS);

		let linux = Target::from_triple("x86_64-unknown-linux-gnu");
		assert!(!plan_prerequisites(&linux, BinariesSource::Downloaded, None, None, true).links("DirectML"));
	}
}
