use std::process::Command;

use crate::{link::Target, log, vars};

fn macos_rtlib_search_dir() -> Option<String> {
	let output = Command::new(vars::get("CC").unwrap_or_else(|| "clang".to_string()))
		.arg("--print-search-dirs")
		.output()
		.ok()?;
	if !output.status.success() {
		log::warning!("couldn't determine macOS rtlib dir: failed to run `$CC --print-search-dirs` (exit code {:?})", output.status.code());
		return None;
	}

	let stdout = String::from_utf8_lossy(&output.stdout);
	let dir = stdout
		.lines()
		.filter(|line| line.contains("libraries: ="))
		.filter_map(|line| line.split('=').nth(1))
		.find(|path| !path.is_empty());
	if dir.is_none() {
		log::warning!("couldn't determine macOS rtlib dir: invalid output");
	}
	dir.map(|path| format!("{path}/lib/darwin"))
}

fn ios_rtlib_search_dir() -> Option<String> {
	let output = Command::new("xcrun").args(["clang", "--print-resource-dir"]).output().ok()?;
	if !output.status.success() {
		log::warning!("couldn't determine iOS rtlib dir: failed to run `xcrun clang --print-resource-dir` (exit code {:?})", output.status.code());
		return None;
	}

	let resource_dir = String::from_utf8_lossy(&output.stdout).trim().to_string();
	Some(format!("{resource_dir}/lib/darwin"))
}

/// The clang runtime library directory for Apple targets; `None` elsewhere or if it can't be determined.
pub fn rtlib_search_dir(target: &Target) -> Option<String> {
	match target.os.as_str() {
		"macos" => macos_rtlib_search_dir(),
		"ios" => ios_rtlib_search_dir(),
		_ => None
	}
}
