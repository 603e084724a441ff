//! Placing ONNX Runtime's shared libraries next to build outputs, so that binaries, examples and tests can find them
//! without any extra configuration.

use std::{
	fs, io,
	path::{Path, PathBuf}
};

const DYLIB_MARKERS: [&str; 3] = [".dll", ".so", ".dylib"];

/// Whether `file_name` looks like a shared library. Versioned names such as `libonnxruntime.so.1.17.0` count.
pub fn is_dylib(file_name: &str) -> bool {
	DYLIB_MARKERS.into_iter().any(|marker| file_name.contains(marker))
}

/// The cargo target profile directory (e.g. `target/debug`) given a build script's `OUT_DIR`.
pub fn target_dir_from_out_dir(out_dir: &Path) -> Option<&Path> {
	out_dir.ancestors().nth(3)
}

#[derive(Debug, Default)]
pub struct PlacedDylibs {
	/// Every library that was linked (or copied) into place.
	pub paths: Vec<PathBuf>,
	/// Set when symlinking failed and the libraries had to be copied instead. Only the first directory is populated in
	/// that case.
	pub copied: bool
}

#[cfg(unix)]
fn link_file(original: &Path, link: &Path) -> io::Result<()> {
	std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn link_file(original: &Path, link: &Path) -> io::Result<()> {
	std::os::windows::fs::symlink_file(original, link)
}

#[cfg(not(any(unix, windows)))]
fn link_file(_: &Path, _: &Path) -> io::Result<()> {
	Err(io::Error::new(io::ErrorKind::Unsupported, "symlinks are not supported on this platform"))
}

/// Places every shared library in `lib_dir` into `target_dir`, `target_dir/examples` and `target_dir/deps`.
///
/// Libraries are symlinked; stale symlinks are replaced. If a symlink can't be created (Windows without Developer Mode,
/// or a cache directory on another drive), the library is copied and only `target_dir` itself is populated.
///
/// `versioned_alias`, if given, additionally links `libonnxruntime.so` under that name (e.g. `libonnxruntime.so.1.17.0`)
/// for binaries that were linked against the versioned soname.
pub fn copy_dylibs(lib_dir: &Path, target_dir: &Path, versioned_alias: Option<&str>) -> io::Result<PlacedDylibs> {
	let mut placed = PlacedDylibs::default();

	let mut libs = Vec::new();
	for entry in fs::read_dir(lib_dir)? {
		let entry = entry?;
		if entry.file_type()?.is_dir() {
			continue;
		}
		if is_dylib(&entry.file_name().to_string_lossy()) {
			libs.push(entry.path());
		}
	}

	for out_dir in [target_dir.to_path_buf(), target_dir.join("examples"), target_dir.join("deps")] {
		fs::create_dir_all(&out_dir)?;

		for lib_path in &libs {
			let Some(lib_name) = lib_path.file_name() else { continue };
			let out_path = out_dir.join(lib_name);
			if place(lib_path, &out_path)? {
				placed.copied = true;
			}
			placed.paths.push(out_path);
		}

		if let Some(alias) = versioned_alias {
			let main_lib = lib_dir.join("libonnxruntime.so");
			if main_lib.exists() {
				let out_path = out_dir.join(alias);
				if out_path.is_symlink() {
					fs::remove_file(&out_path)?;
				}
				if !out_path.exists() {
					link_file(&main_lib, &out_path)?;
				}
				placed.paths.push(out_path);
			}
		}

		if placed.copied {
			break;
		}
	}

	Ok(placed)
}

/// Symlinks `lib_path` to `out_path`, falling back to a copy. Returns whether the library was copied.
fn place(lib_path: &Path, out_path: &Path) -> io::Result<bool> {
	if out_path.is_symlink() {
		fs::remove_file(out_path)?;
	}
	if out_path.exists() {
		return Ok(false);
	}
	match link_file(lib_path, out_path) {
		Ok(()) => Ok(false),
		Err(_) => fs::copy(lib_path, out_path).map(|_| true)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::link::test_util::Scratch;

	#[test]
	fn test_is_dylib() {
		assert!(is_dylib("onnxruntime.dll"));
		assert!(is_dylib("libonnxruntime.so.1.17.0"));
		assert!(is_dylib("libonnxruntime_providers_cuda.dylib"));
		assert!(!is_dylib("onnxruntime.lib"));
		assert!(!is_dylib("libonnxruntime.a"));
	}

	#[test]
	fn test_target_dir_from_out_dir() {
		let out_dir = Path::new("/work/target/debug/build/ortkit-sys-0123456789abcdef/out");
		assert_eq!(target_dir_from_out_dir(out_dir), Some(Path::new("/work/target/debug")));
	}

	#[test]
	#[cfg(unix)]
	fn test_copy_dylibs() {
		let scratch = Scratch::new();
		scratch.touch("lib/libonnxruntime.so");
		scratch.touch("lib/libonnxruntime_providers_shared.so");
		scratch.touch("lib/libonnxruntime.a");
		scratch.mkdir("lib/cmake.so.d");
		let target_dir = scratch.mkdir("target/debug");

		let placed = copy_dylibs(&scratch.path().join("lib"), &target_dir, Some("libonnxruntime.so.1.17.0")).unwrap();
		assert!(!placed.copied);
		assert_eq!(placed.paths.len(), 9);
		for dir in [target_dir.clone(), target_dir.join("examples"), target_dir.join("deps")] {
			assert!(dir.join("libonnxruntime.so").is_symlink());
			assert!(dir.join("libonnxruntime.so.1.17.0").is_symlink());
			assert!(!dir.join("libonnxruntime.a").exists());
		}
	}

	#[test]
	#[cfg(unix)]
	fn test_stale_symlinks_are_replaced() {
		let scratch = Scratch::new();
		let lib = scratch.touch("lib/libonnxruntime.so");
		let target_dir = scratch.mkdir("target/release");
		std::os::unix::fs::symlink(scratch.path().join("gone.so"), target_dir.join("libonnxruntime.so")).unwrap();

		copy_dylibs(&scratch.path().join("lib"), &target_dir, None).unwrap();
		assert_eq!(fs::read_link(target_dir.join("libonnxruntime.so")).unwrap(), lib);
	}

	#[test]
	fn test_missing_lib_dir() {
		let scratch = Scratch::new();
		assert!(copy_dylibs(&scratch.path().join("nope"), scratch.path(), None).is_err());
	}
}
