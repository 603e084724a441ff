use std::path::{Path, PathBuf};

use super::{DIRECTML_LIBS, LibKind, LinkPlan, Target};

/// CMake configurations probed, in order, when `ORT_LIB_PROFILE` is not set.
pub const PROFILES: [&str; 4] = ["Release", "RelWithDebInfo", "MinSizeRel", "Debug"];

const CORE_COMPONENTS: &[&str] = &["common", "flatbuffers", "framework", "graph", "lora", "mlas", "optimizer", "providers", "session", "util"];

const PROTOBUF_LIBS: &[&str] = &["protobuf-lited", "protobuf-lite", "protobuf"];

/// Abseil libraries ONNX Runtime depends on, grouped by their directory under `abseil_cpp-build/absl`.
const ABSEIL_COMPONENTS: &[(&str, &[&str])] = &[
	(
		"debugging",
		&[
			"absl_examine_stack",
			"absl_debugging_internal",
			"absl_demangle_internal",
			"absl_demangle_rust",
			"absl_decode_rust_punycode",
			"absl_utf8_for_code_point"
		]
	),
	("base", &["absl_base", "absl_spinlock_wait", "absl_malloc_internal", "absl_strerror", "absl_raw_logging_internal", "absl_throw_delegate"]),
	("hash", &["absl_hash", "absl_city", "absl_low_level_hash"]),
	("container", &["absl_hashtablez_sampler", "absl_raw_hash_set"]),
	("synchronization", &["absl_kernel_timeout_internal", "absl_graphcycles_internal", "absl_synchronization"]),
	("time", &["absl_time_zone", "absl_time"]),
	("numeric", &["absl_int128"]),
	("strings", &["absl_str_format_internal", "absl_strings", "absl_string_view", "absl_strings_internal"]),
	("debugging", &["absl_symbolize", "absl_stacktrace"]),
	(
		"log",
		&[
			"absl_log_globals",
			"absl_log_internal_format",
			"absl_log_internal_proto",
			"absl_log_internal_globals",
			"absl_log_internal_check_op",
			"absl_log_internal_log_sink_set",
			"absl_log_sink",
			"absl_log_internal_message"
		]
	)
];

/// Abseil libraries that only some ONNX Runtime versions build; linked in place when present.
const OPTIONAL_ABSEIL_LIBS: &[&str] = &["absl_log_internal_check_op"];

/// Statically built execution providers that need nothing beyond their own library.
const PLAIN_STATIC_EPS: &[&str] = &["acl", "armnn", "azure", "nnapi", "qnn", "rknpu", "tvm"];

/// Returns the first CMake configuration directory under `base` that holds a static `onnxruntime_common`.
pub fn detect_profile(base: &Path, target: &Target) -> Option<&'static str> {
	let common = target.platform_lib("onnxruntime_common");
	PROFILES.into_iter().find(|profile| base.join(profile).join(&common).exists())
}

#[derive(Debug, Clone, Copy)]
enum DepsLayout {
	/// `_deps/<dep>/<profile>`, as produced by multi-config generators.
	PerProfile,
	/// `_deps/<dep>`
	Flat
}

#[derive(Debug)]
struct BuildLayout {
	lib_dir: PathBuf,
	extension_lib_dir: PathBuf,
	deps_dir: PathBuf,
	deps: DepsLayout
}

impl BuildLayout {
	fn candidates(base: &Path, profile: &str) -> [BuildLayout; 4] {
		[
			BuildLayout {
				lib_dir: base.join(profile),
				extension_lib_dir: base.join("lib"),
				deps_dir: base.join("_deps"),
				deps: DepsLayout::PerProfile
			},
			BuildLayout {
				lib_dir: base.join(profile),
				extension_lib_dir: base.join("lib"),
				deps_dir: base.join(profile).join("_deps"),
				deps: DepsLayout::Flat
			},
			BuildLayout {
				lib_dir: base.to_path_buf(),
				extension_lib_dir: base.join("lib"),
				deps_dir: base.parent().unwrap_or(base).join("_deps"),
				deps: DepsLayout::Flat
			},
			BuildLayout {
				lib_dir: base.join("onnxruntime"),
				extension_lib_dir: base.join("onnxruntime").join("lib"),
				deps_dir: base.join("_deps"),
				deps: DepsLayout::Flat
			}
		]
	}

	fn dep(&self, rel: impl AsRef<Path>, profile: &str) -> PathBuf {
		let path = self.deps_dir.join(rel);
		match self.deps {
			DepsLayout::PerProfile => path.join(profile),
			DepsLayout::Flat => path
		}
	}
}

/// Plans a static link against an ONNX Runtime build tree rooted at `base`.
///
/// `profile` is the value of `ORT_LIB_PROFILE`; when it is `None` or empty the profile is detected from the tree.
/// Returns `None` when `base` holds neither a single-file static library nor a recognizable build tree.
pub fn plan_static_link(base: &Path, target: &Target, profile: Option<&str>) -> Option<LinkPlan> {
	let profile = match profile {
		Some(profile) if !profile.is_empty() => profile.to_owned(),
		_ => detect_profile(base, target).unwrap_or_default().to_owned()
	};

	let mut plan = LinkPlan::new();
	plan.search_dir(base);

	if base.join(target.platform_lib("onnxruntime")).exists() {
		plan.link_static("onnxruntime");
		return Some(plan);
	}

	plan.debug("doing full static linking since no single-file library was found");

	for layout in BuildLayout::candidates(base, &profile) {
		if !layout.lib_dir.join(target.platform_lib("onnxruntime_common")).exists() || !layout.deps_dir.exists() {
			continue;
		}

		plan.debug(format!("attempting to link from {}", layout.lib_dir.display()));
		match plan_build_tree(base, target, &layout, &profile) {
			Ok(tree) => {
				plan.extend(tree);
				return Some(plan);
			}
			Err(missing) => plan.warning(format!("directory {} is missing {missing}!", layout.lib_dir.display()))
		}
	}

	None
}

fn plan_build_tree(base: &Path, target: &Target, layout: &BuildLayout, profile: &str) -> Result<LinkPlan, String> {
	let mut plan = LinkPlan::new();
	plan.search_dir(&layout.lib_dir);

	for component in CORE_COMPONENTS {
		let lib = format!("onnxruntime_{component}");
		if !layout.lib_dir.join(target.platform_lib(&lib)).exists() {
			return Err(target.platform_lib(&lib));
		}
		plan.link_static(lib);
	}

	if plan.optional_static(target, &layout.extension_lib_dir, "ortcustomops") {
		plan.link_static("ocos_operators");
		plan.link_static("noexcep_operators");
	}

	let vcpkg_lib_dir = target
		.vcpkg_triplet()
		.map(|triplet| base.join("vcpkg_installed").join(triplet))
		.filter(|dir| dir.exists())
		.map(|dir| dir.join("lib"));
	if let Some(dir) = &vcpkg_lib_dir {
		plan.debug(format!("using vcpkg libraries from {}", dir.display()));
		plan.search_dir(dir);
	}

	let protobuf_dir = match &vcpkg_lib_dir {
		Some(dir) => dir.clone(),
		None => {
			let dir = layout.dep("protobuf-build", profile);
			plan.search_dir(&dir);
			dir
		}
	};
	for lib in PROTOBUF_LIBS {
		let prefixed = format!("lib{lib}");
		if target.is_windows() && protobuf_dir.join(target.platform_lib(&prefixed)).exists() {
			plan.link_static(prefixed);
		} else if protobuf_dir.join(target.platform_lib(lib)).exists() {
			plan.link_static(*lib);
		}
	}

	plan.search_dir(layout.dep("onnx-build", profile));
	plan.link_static("onnx");
	plan.link_static("onnx_proto");

	// some builds, particularly the default no-EP windows build, don't need nsync
	let nsync_dir = vcpkg_lib_dir.clone().unwrap_or_else(|| layout.dep("google_nsync-build", profile));
	plan.optional_static(target, &nsync_dir, "nsync_cpp");

	plan.search_dir(layout.dep("pytorch_cpuinfo-build", profile));
	match &vcpkg_lib_dir {
		Some(dir) => {
			plan.optional_static(target, dir, "clog");
		}
		None => {
			// clog is only built alongside unit tests, and never for android
			let candidates = [layout.dep(Path::new("pytorch_cpuinfo-build").join("deps").join("clog"), profile), layout.dep("pytorch_clog-build", profile)];
			for dir in candidates {
				if plan.optional_static(target, &dir, "clog") {
					break;
				}
			}
		}
	}
	plan.link_static("cpuinfo");

	if vcpkg_lib_dir.is_none() {
		plan.search_dir(layout.dep("re2-build", profile));
	}
	plan.link_static("re2");

	if vcpkg_lib_dir.is_some() && target.is_windows() {
		plan.link_static("abseil_dll");
	} else {
		let absl_root = Path::new("abseil_cpp-build").join("absl");
		for (component, libs) in ABSEIL_COMPONENTS {
			let dir = match &vcpkg_lib_dir {
				Some(dir) => dir.clone(),
				None => {
					let dir = layout.dep(absl_root.join(component), profile);
					plan.search_dir(&dir);
					dir
				}
			};
			for lib in *libs {
				if OPTIONAL_ABSEIL_LIBS.contains(lib) {
					plan.optional_static(target, &dir, lib);
				} else {
					plan.link_static(*lib);
				}
			}
		}
	}

	for ep in PLAIN_STATIC_EPS {
		plan.optional_static(target, &layout.lib_dir, &format!("onnxruntime_providers_{ep}"));
	}
	if plan.optional_static(target, &layout.lib_dir, "onnxruntime_providers_coreml") {
		plan.link(LibKind::Framework, "CoreML");
		plan.link(LibKind::Default, "coreml_proto");
	}
	if plan.optional_static(target, &layout.lib_dir, "onnxruntime_providers_dml") {
		for lib in DIRECTML_LIBS {
			plan.link(LibKind::Default, *lib);
		}
	}
	if plan.optional_static(target, &layout.lib_dir, "onnxruntime_providers_xnnpack") {
		let xnnpack_dir = layout.dep("googlexnnpack-build", profile);
		plan.search_dir(&xnnpack_dir);
		plan.link_static("XNNPACK");
		plan.optional_static(target, &xnnpack_dir, "microkernels-prod");

		plan.search_dir(layout.dep("pthreadpool-build", profile));
		plan.link_static("pthreadpool");
	}

	if target.arch == "aarch64" {
		plan.optional_static(target, &layout.dep("kleidiai-build", profile), "kleidiai");
	}

	Ok(plan)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::link::test_util::Scratch;

	fn linux() -> Target {
		Target::new("x86_64-unknown-linux-gnu", "linux", "x86_64")
	}

	fn populate_core(scratch: &Scratch, lib_dir: &str) {
		for component in CORE_COMPONENTS {
			scratch.touch(Path::new(lib_dir).join(format!("libonnxruntime_{component}.a")));
		}
	}

	#[test]
	fn test_single_file_library() {
		let scratch = Scratch::new();
		scratch.touch("libonnxruntime.a");
		let plan = plan_static_link(scratch.path(), &linux(), None).expect("should link");
		assert_eq!(plan.libraries().collect::<Vec<_>>(), [(LibKind::Static, "onnxruntime")]);
	}

	#[test]
	fn test_windows_library_naming() {
		let scratch = Scratch::new();
		scratch.touch("onnxruntime.lib");
		let target = Target::new("x86_64-pc-windows-msvc", "windows", "x86_64");
		assert!(plan_static_link(scratch.path(), &target, None).is_some());
		assert!(plan_static_link(scratch.path(), &linux(), None).is_none());
	}

	#[test]
	fn test_detect_profile() {
		let scratch = Scratch::new();
		assert_eq!(detect_profile(scratch.path(), &linux()), None);
		scratch.touch("Debug/libonnxruntime_common.a");
		assert_eq!(detect_profile(scratch.path(), &linux()), Some("Debug"));
		scratch.touch("RelWithDebInfo/libonnxruntime_common.a");
		assert_eq!(detect_profile(scratch.path(), &linux()), Some("RelWithDebInfo"));
	}

	#[test]
	fn test_full_build_tree() {
		let scratch = Scratch::new();
		populate_core(&scratch, "Release");
		scratch.mkdir("_deps/onnx-build/Release");
		scratch.touch("_deps/google_nsync-build/Release/libnsync_cpp.a");
		scratch.touch("_deps/protobuf-build/Release/libprotobuf-lite.a");
		scratch.touch("Release/libonnxruntime_providers_xnnpack.a");

		let plan = plan_static_link(scratch.path(), &linux(), None).expect("should link");
		for component in CORE_COMPONENTS {
			assert!(plan.links(&format!("onnxruntime_{component}")), "missing {component}");
		}
		assert!(plan.links("onnx"));
		assert!(plan.links("nsync_cpp"));
		assert!(plan.links("protobuf-lite"));
		assert!(!plan.links("protobuf"));
		assert!(plan.links("absl_log_sink"));
		assert!(plan.links("XNNPACK"));
		assert!(!plan.links("onnxruntime_providers_coreml"));
		assert!(!plan.links("clog"));
		assert!(plan.search_paths().any(|p| p == scratch.path().join("_deps").join("onnx-build").join("Release")));
	}

	#[test]
	fn test_abseil_log_link_order() {
		let scratch = Scratch::new();
		populate_core(&scratch, "Release");
		scratch.mkdir("_deps");

		let plan = plan_static_link(scratch.path(), &linux(), None).expect("should link");
		assert!(!plan.links("absl_log_internal_check_op"));

		scratch.touch("_deps/abseil_cpp-build/absl/log/Release/libabsl_log_internal_check_op.a");
		let plan = plan_static_link(scratch.path(), &linux(), None).expect("should link");
		let libs: Vec<&str> = plan.libraries().map(|(_, name)| name).collect();
		let position = |name: &str| libs.iter().position(|lib| *lib == name).unwrap_or_else(|| panic!("missing {name}"));
		assert!(position("absl_log_internal_globals") < position("absl_log_internal_check_op"));
		assert!(position("absl_log_internal_check_op") < position("absl_log_internal_log_sink_set"));
		assert!(position("absl_log_internal_log_sink_set") < position("absl_log_internal_message"));
	}

	#[test]
	fn test_explicit_profile_overrides_detection() {
		let scratch = Scratch::new();
		populate_core(&scratch, "Release");
		populate_core(&scratch, "MinSizeRel");
		scratch.mkdir("_deps");

		assert_eq!(detect_profile(scratch.path(), &linux()), Some("Release"));
		let plan = plan_static_link(scratch.path(), &linux(), Some("MinSizeRel")).expect("should link");
		assert!(plan.search_paths().any(|p| p == scratch.path().join("MinSizeRel")));
		assert!(plan.search_paths().any(|p| p == scratch.path().join("_deps").join("onnx-build").join("MinSizeRel")));
	}

	#[test]
	fn test_incomplete_tree_is_rejected() {
		let scratch = Scratch::new();
		scratch.touch("Release/libonnxruntime_common.a");
		scratch.mkdir("_deps");
		assert!(plan_static_link(scratch.path(), &linux(), None).is_none());
	}

	#[test]
	fn test_flat_tree_with_parent_deps() {
		let scratch = Scratch::new();
		populate_core(&scratch, "build/Linux");
		scratch.mkdir("build/_deps");
		let base = scratch.path().join("build").join("Linux");

		let plan = plan_static_link(&base, &linux(), None).expect("should link");
		assert!(plan.links("onnxruntime_session"));
		assert!(plan.search_paths().any(|p| p == scratch.path().join("build").join("_deps").join("re2-build")));
	}

	#[test]
	fn test_kleidiai_only_on_aarch64() {
		let scratch = Scratch::new();
		populate_core(&scratch, "onnxruntime");
		scratch.touch("_deps/kleidiai-build/libkleidiai.a");

		let plan = plan_static_link(scratch.path(), &linux(), None).expect("should link");
		assert!(!plan.links("kleidiai"));

		let arm = Target::new("aarch64-unknown-linux-gnu", "linux", "aarch64");
		let plan = plan_static_link(scratch.path(), &arm, None).expect("should link");
		assert!(plan.links("kleidiai"));
	}
}
