//! `rpath` settings that let a dynamically linked binary find ONNX Runtime next to itself.
//!
//! With `copy-dylibs`, the shared libraries are placed beside build outputs, but the binary still has to be told to
//! look there. Either call [`plan_origin_rpath`] from your build script, or add the block produced by
//! [`cargo_config_snippet`] to `.cargo/config.toml`.

use super::{LinkPlan, Target};

/// Linker arguments that add the executable's own directory to its library search path.
///
/// Windows needs nothing, since the loader always searches the executable's directory for DLLs.
pub fn origin_rpath_args(target_os: &str) -> Vec<String> {
	match target_os {
		"linux" | "android" | "freebsd" | "netbsd" | "openbsd" | "dragonfly" | "illumos" | "solaris" => vec!["-Wl,-rpath,$ORIGIN".to_owned()],
		"macos" | "ios" | "tvos" | "watchos" | "visionos" => vec!["-Wl,-rpath,@loader_path".to_owned()],
		_ => Vec::new()
	}
}

pub fn plan_origin_rpath(target: &Target) -> LinkPlan {
	let mut plan = LinkPlan::new();
	for arg in origin_rpath_args(&target.os) {
		plan.link_arg(arg);
	}
	plan
}

/// The `.cargo/config.toml` equivalent of [`plan_origin_rpath`], or `None` if `target` needs no rpath.
pub fn cargo_config_snippet(target: &Target) -> Option<String> {
	let args = origin_rpath_args(&target.os);
	if args.is_empty() {
		return None;
	}
	let flags = args.iter().map(|arg| format!("\"-Clink-args={arg}\"")).collect::<Vec<_>>().join(", ");
	Some(format!("[target.{}]\nrustflags = [{flags}]\n", target.triple))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::link::Directive;

	#[test]
	fn test_origin_rpath_args() {
		assert_eq!(origin_rpath_args("linux"), ["-Wl,-rpath,$ORIGIN"]);
		assert_eq!(origin_rpath_args("macos"), ["-Wl,-rpath,@loader_path"]);
		assert!(origin_rpath_args("windows").is_empty());
	}

	#[test]
	fn test_plan_origin_rpath() {
		let plan = plan_origin_rpath(&Target::from_triple("aarch64-linux-android"));
		assert_eq!(plan.directives(), [Directive::LinkArg("-Wl,-rpath,$ORIGIN".to_owned())]);
		assert_eq!(plan.directives()[0].to_string(), "cargo:rustc-link-arg=-Wl,-rpath,$ORIGIN");

		assert!(plan_origin_rpath(&Target::from_triple("x86_64-pc-windows-msvc")).is_empty());
	}

	#[test]
	fn test_cargo_config_snippet() {
		assert_eq!(
			cargo_config_snippet(&Target::from_triple("x86_64-unknown-linux-gnu")).as_deref(),
			Some("[target.x86_64-unknown-linux-gnu]\nrustflags = [\"-Clink-args=-Wl,-rpath,$ORIGIN\"]\n")
		);
		assert_eq!(
			cargo_config_snippet(&Target::from_triple("aarch64-apple-darwin")).as_deref(),
			Some("[target.aarch64-apple-darwin]\nrustflags = [\"-Clink-args=-Wl,-rpath,@loader_path\"]\n")
		);
		assert_eq!(cargo_config_snippet(&Target::from_triple("x86_64-pc-windows-msvc")), None);
	}
}
