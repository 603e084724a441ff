// modelled on https://github.com/dirs-dev/dirs-sys-rs/blob/main/src/lib.rs

#![allow(unused)]

use std::{env, path::PathBuf};

pub const CACHE_ROOT: &str = "ortkit";

fn non_empty_var(var: &str) -> Option<PathBuf> {
	env::var_os(var).filter(|v| !v.is_empty()).map(PathBuf::from)
}

#[cfg(target_os = "windows")]
fn platform_cache_dir() -> Option<PathBuf> {
	non_empty_var("LOCALAPPDATA")
}

#[cfg(target_os = "macos")]
fn platform_cache_dir() -> Option<PathBuf> {
	non_empty_var("HOME").map(|home| home.join("Library").join("Caches"))
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn platform_cache_dir() -> Option<PathBuf> {
	non_empty_var("XDG_CACHE_HOME").or_else(|| non_empty_var("HOME").map(|home| home.join(".cache")))
}

/// Directory where downloaded binaries are kept between builds.
///
/// This runs on the build host, so the host's conventions apply regardless of the compilation target.
#[must_use]
pub fn cache_dir() -> Option<PathBuf> {
	platform_cache_dir().map(|dir| dir.join(CACHE_ROOT))
}
