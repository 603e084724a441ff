use std::path::Path;

use super::{LibKind, LinkPlan, SearchKind, Target};

pub const IOS_FRAMEWORK_NAME: &str = "onnxruntime";
pub const IOS_EXTENSIONS_FRAMEWORK_NAME: &str = "onnxruntime_extensions";

fn plan_frameworks_in_sub_dir(plan: &mut LinkPlan, xcfwk_dir: &Path, ext_dir: Option<&Path>, sub_dir: &str) -> bool {
	let fwk_dir = xcfwk_dir.join(sub_dir);
	if !fwk_dir.exists() {
		plan.warning(format!("framework directory '{}' does not exist", fwk_dir.display()));
		return false;
	}
	plan.search(SearchKind::Framework, &fwk_dir);

	if !fwk_dir.join(format!("{IOS_FRAMEWORK_NAME}.framework")).exists() {
		plan.warning(format!("{IOS_FRAMEWORK_NAME}.framework not found in '{}'", fwk_dir.display()));
		return false;
	}
	plan.link(LibKind::Framework, IOS_FRAMEWORK_NAME);
	plan.debug(format!("successfully linked framework from {}", fwk_dir.display()));

	let Some(ext_dir) = ext_dir else {
		return true;
	};
	let ext_fwk_dir = ext_dir.join(sub_dir);
	if ext_fwk_dir.exists() {
		plan.search(SearchKind::Framework, &ext_fwk_dir);
		if ext_fwk_dir.join(format!("{IOS_EXTENSIONS_FRAMEWORK_NAME}.framework")).exists() {
			plan.link(LibKind::Framework, IOS_EXTENSIONS_FRAMEWORK_NAME);
		}
	}
	true
}

/// Plans linking the ONNX Runtime xcframework (and optionally the extensions xcframework) for iOS targets.
///
/// Returns `None` when `target` is not an iOS device or simulator target, or when no usable framework was found.
/// Warnings from failed attempts are added to `diagnostics`.
pub fn plan_ios_frameworks(target: &Target, xcfwk_dir: &Path, ext_dir: Option<&Path>, diagnostics: &mut LinkPlan) -> Option<LinkPlan> {
	// the xcframework only has slices for ios, ios-sim and macos
	let sub_dirs: &[&str] = match target.triple.as_str() {
		"aarch64-apple-ios" => &["ios-arm64"],
		// older Xcode builds produce a fat arm64/x86_64 simulator slice
		"aarch64-apple-ios-sim" => &["ios-arm64_x86_64-simulator", "ios-arm64-simulator"],
		other => {
			if target.is_apple() {
				diagnostics.warning(format!("can't do xcframework linking for target '{other}'"));
			}
			return None;
		}
	};

	for sub_dir in sub_dirs {
		let mut plan = LinkPlan::new();
		if plan_frameworks_in_sub_dir(&mut plan, xcfwk_dir, ext_dir, sub_dir) {
			return Some(plan);
		}
		for warning in plan.warnings() {
			diagnostics.warning(warning);
		}
	}
	None
}
