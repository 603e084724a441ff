//! Link planning for ONNX Runtime.
//!
//! Everything in this module is a pure function of the target description and the filesystem; nothing is printed
//! until [`LinkPlan::emit`] is called. The `ortkit-sys` build script drives these planners, and downstream build
//! scripts can use them directly, e.g. to embed an `$ORIGIN` rpath:
//!
//! ```no_run
//! // build.rs
//! fn main() {
//! 	if let Some(target) = ortkit_sys::link::Target::from_env() {
//! 		ortkit_sys::link::rpath::plan_origin_rpath(&target).emit();
//! 	}
//! }
//! ```

use std::{
	env, fmt,
	path::{Path, PathBuf}
};

mod apple;
pub mod dist;
pub mod dylibs;
mod prerequisites;
pub mod rpath;
mod static_link;
mod user_provided;

pub use self::{
	apple::{IOS_FRAMEWORK_NAME, IOS_EXTENSIONS_FRAMEWORK_NAME, plan_ios_frameworks},
	prerequisites::{DIRECTML_LIBS, plan_prerequisites},
	static_link::{PROFILES, detect_profile, plan_static_link},
	user_provided::{UserProvidedLink, plan_user_provided}
};

/// The compilation target, as cargo describes it to build scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
	pub triple: String,
	pub os: String,
	pub arch: String
}

impl Target {
	pub fn new(triple: impl Into<String>, os: impl Into<String>, arch: impl Into<String>) -> Self {
		Self {
			triple: triple.into(),
			os: os.into().to_lowercase(),
			arch: arch.into().to_lowercase()
		}
	}

	/// Reads `TARGET`, `CARGO_CFG_TARGET_OS` and `CARGO_CFG_TARGET_ARCH`. Returns `None` outside of a build script.
	pub fn from_env() -> Option<Self> {
		let triple = env::var("TARGET").ok()?;
		match (env::var("CARGO_CFG_TARGET_OS"), env::var("CARGO_CFG_TARGET_ARCH")) {
			(Ok(os), Ok(arch)) => Some(Self::new(triple, os, arch)),
			_ => Some(Self::from_triple(triple))
		}
	}

	/// Derives the OS and architecture from a target triple alone.
	pub fn from_triple(triple: impl Into<String>) -> Self {
		let triple = triple.into();
		let arch = match triple.split('-').next().unwrap_or_default() {
			"i586" | "i686" => "x86",
			"armv7" | "armv7s" | "thumbv7neon" => "arm",
			"arm64" => "aarch64",
			other => other
		}
		.to_owned();
		let os = if triple.contains("windows") {
			"windows"
		} else if triple.contains("apple-darwin") {
			"macos"
		} else if triple.contains("apple-ios") {
			"ios"
		} else if triple.contains("android") {
			"android"
		} else if triple.contains("linux") {
			"linux"
		} else if triple.contains("freebsd") {
			"freebsd"
		} else if triple.contains("emscripten") {
			"emscripten"
		} else {
			"unknown"
		}
		.to_owned();
		Self { triple, os, arch }
	}

	pub fn is_windows(&self) -> bool {
		self.os == "windows"
	}

	pub fn is_apple(&self) -> bool {
		self.triple.contains("apple")
	}

	/// File name of a static library `name` on this target.
	pub fn platform_lib(&self, name: &str) -> String {
		if self.is_windows() { format!("{name}.lib") } else { format!("lib{name}.a") }
	}

	/// File name of the ONNX Runtime shared library on this target.
	pub fn dylib_name(&self) -> &'static str {
		match self.os.as_str() {
			"windows" => "onnxruntime.dll",
			"macos" | "ios" => "libonnxruntime.dylib",
			_ => "libonnxruntime.so"
		}
	}

	/// The vcpkg triplet ONNX Runtime's vcpkg builds use for this target, if any.
	pub fn vcpkg_triplet(&self) -> Option<&'static str> {
		match self.triple.as_str() {
			"i686-pc-windows-msvc" => Some("x86-windows"),
			"x86_64-pc-windows-msvc" => Some("x64-windows"),
			"x86_64-uwp-windows-msvc" => Some("x64-uwp"),
			"aarch64-pc-windows-msvc" => Some("arm64-windows"),
			"aarch64-uwp-windows-msvc" => Some("arm64-uwp"),
			"aarch64-apple-darwin" => Some("arm64-osx"),
			"x86_64-apple-darwin" => Some("x64-osx"),
			"x86_64-unknown-linux-gnu" => Some("x64-linux"),
			"armv7-linux-androideabi" => Some("arm-neon-android"),
			"x86_64-linux-android" => Some("x64-android"),
			"aarch64-linux-android" => Some("arm64-android"),
			_ => None
		}
	}
}

/// Where a set of binaries came from; downloaded binaries carry some extra link requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinariesSource {
	Downloaded,
	UserProvided
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
	Native,
	Framework,
	All
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibKind {
	Default,
	Static,
	Dylib,
	Framework
}

/// A single build script instruction or diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
	Search { kind: SearchKind, path: PathBuf },
	Link { kind: LibKind, name: String },
	LinkArg(String),
	RerunIfChanged(PathBuf),
	Debug(String),
	Warning(String)
}

impl fmt::Display for Directive {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Search { kind: SearchKind::Native, path } => write!(f, "cargo:rustc-link-search=native={}", path.display()),
			Self::Search { kind: SearchKind::Framework, path } => write!(f, "cargo:rustc-link-search=framework={}", path.display()),
			Self::Search { kind: SearchKind::All, path } => write!(f, "cargo:rustc-link-search={}", path.display()),
			Self::Link { kind: LibKind::Default, name } => write!(f, "cargo:rustc-link-lib={name}"),
			Self::Link { kind: LibKind::Static, name } => write!(f, "cargo:rustc-link-lib=static={name}"),
			Self::Link { kind: LibKind::Dylib, name } => write!(f, "cargo:rustc-link-lib=dylib={name}"),
			Self::Link { kind: LibKind::Framework, name } => write!(f, "cargo:rustc-link-lib=framework={name}"),
			Self::LinkArg(arg) => write!(f, "cargo:rustc-link-arg={arg}"),
			Self::RerunIfChanged(path) => write!(f, "cargo:rerun-if-changed={}", path.display()),
			Self::Debug(message) => write!(f, "[ortkit-sys] [DEBUG] {message}"),
			Self::Warning(message) => write!(f, "cargo:warning=[ortkit-sys] [WARN] {message}")
		}
	}
}

/// An ordered list of [`Directive`]s.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkPlan {
	directives: Vec<Directive>
}

impl LinkPlan {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, directive: Directive) {
		self.directives.push(directive);
	}

	pub fn extend(&mut self, other: LinkPlan) {
		self.directives.extend(other.directives);
	}

	pub fn search(&mut self, kind: SearchKind, path: impl Into<PathBuf>) {
		self.push(Directive::Search { kind, path: path.into() });
	}

	/// Adds `base` as a native search path, preferring its `Release` or `Debug` subdirectory when one exists (CMake
	/// multi-config generators put their outputs there).
	pub fn search_dir(&mut self, base: impl AsRef<Path>) {
		let base = base.as_ref();
		let path = if base.join("Release").is_dir() {
			base.join("Release")
		} else if base.join("Debug").is_dir() {
			base.join("Debug")
		} else {
			base.to_path_buf()
		};
		self.search(SearchKind::Native, path);
	}

	pub fn link(&mut self, kind: LibKind, name: impl Into<String>) {
		self.push(Directive::Link { kind, name: name.into() });
	}

	pub fn link_static(&mut self, name: impl Into<String>) {
		self.link(LibKind::Static, name);
	}

	/// Links `lib` statically from `dir` only if the library file is present. Returns whether it was linked.
	pub fn optional_static(&mut self, target: &Target, dir: &Path, lib: &str) -> bool {
		if dir.join(target.platform_lib(lib)).exists() {
			self.search_dir(dir);
			self.link_static(lib);
			true
		} else {
			false
		}
	}

	pub fn link_arg(&mut self, arg: impl Into<String>) {
		self.push(Directive::LinkArg(arg.into()));
	}

	pub fn debug(&mut self, message: impl Into<String>) {
		self.push(Directive::Debug(message.into()));
	}

	pub fn warning(&mut self, message: impl Into<String>) {
		self.push(Directive::Warning(message.into()));
	}

	pub fn directives(&self) -> &[Directive] {
		&self.directives
	}

	pub fn is_empty(&self) -> bool {
		self.directives.is_empty()
	}

	/// Iterates over every library this plan links, in order.
	pub fn libraries(&self) -> impl Iterator<Item = (LibKind, &str)> {
		self.directives.iter().filter_map(|d| match d {
			Directive::Link { kind, name } => Some((*kind, name.as_str())),
			_ => None
		})
	}

	pub fn links(&self, name: &str) -> bool {
		self.libraries().any(|(_, lib)| lib == name)
	}

	pub fn search_paths(&self) -> impl Iterator<Item = &Path> {
		self.directives.iter().filter_map(|d| match d {
			Directive::Search { path, .. } => Some(path.as_path()),
			_ => None
		})
	}

	pub fn warnings(&self) -> impl Iterator<Item = &str> {
		self.directives.iter().filter_map(|d| match d {
			Directive::Warning(message) => Some(message.as_str()),
			_ => None
		})
	}

	/// Prints every directive to stdout for cargo to pick up.
	pub fn emit(&self) {
		for directive in &self.directives {
			println!("{directive}");
		}
	}
}

/// Links `onnxruntime` as a shared library from `install_dir/lib`, or `install_dir` itself if it has no `lib`
/// subdirectory.
pub fn plan_dynamic_link(install_dir: &Path) -> LinkPlan {
	let lib_dir = if install_dir.join("lib").exists() { install_dir.join("lib") } else { install_dir.to_path_buf() };
	let mut plan = LinkPlan::new();
	plan.link(LibKind::Default, "onnxruntime");
	plan.search(SearchKind::Native, lib_dir);
	plan
}

#[cfg(test)]
pub(crate) mod test_util {
	use std::{
		fs,
		path::{Path, PathBuf}
	};

	/// A scratch directory under the system temp dir, removed on drop.
	pub struct Scratch(PathBuf);

	impl Scratch {
		pub fn new() -> Self {
			let path = std::env::temp_dir().join(format!("ortkit-sys-test-{}", crate::internal::random_identifier()));
			fs::create_dir_all(&path).unwrap();
			Self(path)
		}

		pub fn path(&self) -> &Path {
			&self.0
		}

		/// Creates an empty file (and its parent directories) at `rel`.
		pub fn touch(&self, rel: impl AsRef<Path>) -> PathBuf {
			let path = self.0.join(rel);
			fs::create_dir_all(path.parent().unwrap()).unwrap();
			fs::write(&path, b"").unwrap();
			path
		}

		pub fn mkdir(&self, rel: impl AsRef<Path>) -> PathBuf {
			let path = self.0.join(rel);
			fs::create_dir_all(&path).unwrap();
			path
		}
	}

	impl Drop for Scratch {
		fn drop(&mut self) {
			let _ = fs::remove_dir_all(&self.0);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::{test_util::Scratch, *};

	#[test]
	fn test_directive_display() {
		let mut plan = LinkPlan::new();
		plan.search(SearchKind::Native, "/opt/ort/lib");
		plan.link_static("onnxruntime_common");
		plan.link(LibKind::Framework, "CoreML");
		plan.link(LibKind::Default, "onnxruntime");
		plan.link_arg("-Wl,-rpath,$ORIGIN");
		plan.warning("something odd");
		let lines: Vec<String> = plan.directives().iter().map(ToString::to_string).collect();
		assert_eq!(
			lines,
			[
				"cargo:rustc-link-search=native=/opt/ort/lib",
				"cargo:rustc-link-lib=static=onnxruntime_common",
				"cargo:rustc-link-lib=framework=CoreML",
				"cargo:rustc-link-lib=onnxruntime",
				"cargo:rustc-link-arg=-Wl,-rpath,$ORIGIN",
				"cargo:warning=[ortkit-sys] [WARN] something odd"
			]
		);
	}

	#[test]
	fn test_target_from_triple() {
		let t = Target::from_triple("aarch64-apple-ios-sim");
		assert_eq!(t.os, "ios");
		assert_eq!(t.arch, "aarch64");
		assert!(t.is_apple());

		let t = Target::from_triple("i686-pc-windows-msvc");
		assert_eq!(t.os, "windows");
		assert_eq!(t.arch, "x86");
		assert_eq!(t.platform_lib("onnxruntime"), "onnxruntime.lib");
		assert_eq!(t.dylib_name(), "onnxruntime.dll");
		assert_eq!(t.vcpkg_triplet(), Some("x86-windows"));

		let t = Target::from_triple("x86_64-unknown-linux-gnu");
		assert_eq!(t.platform_lib("onnxruntime"), "libonnxruntime.a");
		assert_eq!(t.dylib_name(), "libonnxruntime.so");
	}

	#[test]
	fn test_search_dir_prefers_release() {
		let scratch = Scratch::new();
		scratch.mkdir("Debug");
		let mut plan = LinkPlan::new();
		plan.search_dir(scratch.path());
		assert_eq!(plan.search_paths().next(), Some(scratch.path().join("Debug").as_path()));

		scratch.mkdir("Release");
		let mut plan = LinkPlan::new();
		plan.search_dir(scratch.path());
		assert_eq!(plan.search_paths().next(), Some(scratch.path().join("Release").as_path()));
	}

	#[test]
	fn test_dynamic_link_prefers_lib_subdir() {
		let scratch = Scratch::new();
		let plan = plan_dynamic_link(scratch.path());
		assert_eq!(plan.search_paths().next(), Some(scratch.path()));

		scratch.mkdir("lib");
		let plan = plan_dynamic_link(scratch.path());
		assert!(plan.links("onnxruntime"));
		assert_eq!(plan.search_paths().next(), Some(scratch.path().join("lib").as_path()));
	}
}
