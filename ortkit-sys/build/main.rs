use std::env;
#[cfg(any(not(feature = "load-dynamic"), feature = "download-binaries"))]
use std::path::PathBuf;

#[cfg(not(feature = "load-dynamic"))]
mod apple;
#[cfg(feature = "download-binaries")]
mod download;
#[cfg(any(not(feature = "load-dynamic"), all(feature = "copy-dylibs", feature = "download-binaries")))]
mod dynamic_link;
#[cfg(feature = "download-binaries")]
mod error;
mod log;
#[cfg(feature = "pkg-config")]
mod pkg_config;
mod vars;

#[path = "../src/internal/mod.rs"]
#[cfg(feature = "download-binaries")]
mod internal;
#[path = "../src/link/mod.rs"]
#[allow(dead_code)]
mod link;
#[path = "../src/version.rs"]
#[allow(dead_code)]
mod version;

#[cfg(any(not(feature = "load-dynamic"), feature = "download-binaries"))]
use self::link::LinkPlan;
use self::link::Target;
#[cfg(not(feature = "load-dynamic"))]
use self::link::{BinariesSource, UserProvidedLink};

fn main() {
	println!("cargo:rustc-check-cfg=cfg(link_error)");

	if env::var("DOCS_RS").is_ok() || cfg!(feature = "disable-linking") {
		// On docs.rs we neither link nor have network access. With `disable-linking`, the application provides its own
		// backend.
		return;
	}

	let Some(target) = Target::from_env() else {
		log::warning!("`TARGET` is not set; not linking ONNX Runtime");
		return;
	};

	#[cfg(feature = "load-dynamic")]
	{
		// nothing to link, but downloaded binaries can still be placed next to build outputs
		#[cfg(feature = "download-binaries")]
		if vars::get_any(vars::SYSTEM_LIB_LOCATION).is_none() && !download::should_skip() {
			let _ = download_binaries(&target);
		}
		#[cfg(not(feature = "download-binaries"))]
		let _ = target;
	}

	#[cfg(not(feature = "load-dynamic"))]
	link_onnxruntime(&target);
}

#[cfg(not(feature = "load-dynamic"))]
fn link_onnxruntime(target: &Target) {
	#[cfg(feature = "pkg-config")]
	{
		let mut diagnostics = LinkPlan::new();
		let linked = pkg_config::attempt(&mut diagnostics);
		diagnostics.emit();
		if let Some(plan) = linked {
			plan.emit();
			return;
		}
	}

	// iOS frameworks are linked very differently from everything else, so try them first.
	if target.os == "ios" {
		if let Some(xcfwk_dir) = vars::get_any(vars::IOS_XCFWK_LOCATION).map(PathBuf::from) {
			let ext_dir = vars::get_any(vars::IOS_EXT_XCFWK_LOCATION).map(PathBuf::from);
			let mut diagnostics = LinkPlan::new();
			let linked = link::plan_ios_frameworks(target, &xcfwk_dir, ext_dir.as_deref(), &mut diagnostics);
			diagnostics.emit();
			if let Some(plan) = linked {
				plan.emit();
				prerequisites(target, BinariesSource::UserProvided).emit();
				return;
			}
		}
	}

	if let Some(lib_dir) = vars::get_any(vars::SYSTEM_LIB_LOCATION) {
		let lib_dir = PathBuf::from(lib_dir);
		let profile = vars::get(vars::SYSTEM_LIB_PROFILE);
		match link::plan_user_provided(&lib_dir, target, profile.as_deref(), dynamic_link::prefer_dynamic_linking()) {
			UserProvidedLink::Static(plan) => {
				plan.emit();
				prerequisites(target, BinariesSource::UserProvided).emit();
			}
			UserProvidedLink::Dynamic { plan, dylib_dir } => {
				plan.emit();
				#[cfg(feature = "copy-dylibs")]
				if let Some(dylib_dir) = dylib_dir {
					dynamic_link::copy_dylibs(&dylib_dir, &PathBuf::from(env::var("OUT_DIR").unwrap_or_default()), target);
				}
				#[cfg(not(feature = "copy-dylibs"))]
				let _ = dylib_dir;
			}
			UserProvidedLink::Missing(diagnostics) => {
				diagnostics.emit();
				log::error!(
					"ortkit-sys could not link to the ONNX Runtime build in `{}`: the directory does not exist\n | rerun the build with `cargo build -vv | grep ortkit-sys` to see debug messages",
					lib_dir.display()
				);
			}
		}
		return;
	}

	#[cfg(not(feature = "download-binaries"))]
	let should_skip = true;
	#[cfg(feature = "download-binaries")]
	let should_skip = download::should_skip();
	if should_skip {
		// Defer the error to the linking step so `cargo check` still works without any binaries.
		println!("cargo:rustc-cfg=link_error");
		return;
	}

	#[cfg(feature = "download-binaries")]
	if let Some(install_dir) = download_binaries(target) {
		link::plan_dynamic_link(&install_dir).emit();
		prerequisites(target, BinariesSource::Downloaded).emit();
	}
}

#[cfg(not(feature = "load-dynamic"))]
fn prerequisites(target: &Target, source: BinariesSource) -> LinkPlan {
	let cxx_stdlib = vars::get_any(vars::CXX_STDLIB);
	let rtlib_dir = apple::rtlib_search_dir(target);
	link::plan_prerequisites(target, source, cxx_stdlib.as_deref(), rtlib_dir.as_deref(), cfg!(feature = "directml"))
}

/// Downloads the prebuilt binaries for `target`, returning their install directory (the one containing `lib/`).
#[cfg(feature = "download-binaries")]
fn download_binaries(target: &Target) -> Option<PathBuf> {
	log::debug!("Using prebuilt binaries");

	let mut diagnostics = LinkPlan::new();
	let feature_set = link::dist::feature_set(target, cfg!(any(feature = "cuda", feature = "tensorrt")), cfg!(feature = "directml"));
	let dist = link::dist::resolve_dist(target, feature_set, &mut diagnostics);
	diagnostics.emit();
	let dist = match dist {
		Ok(dist) => dist,
		Err(feature_set) => {
			log::error!(
				"ortkit-sys does not provide prebuilt binaries for the target `{}` with feature set {}.\n | You may have to compile ONNX Runtime from source and point `ORT_LIB_LOCATION` to your build.",
				target.triple,
				feature_set.unwrap_or_else(|| String::from("(no features)"))
			);
			return None;
		}
	};

	let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap_or_default());
	let bin_extract_dir = match download::download(&dist, &target.triple, &out_dir) {
		Ok(dir) => dir,
		Err(e) => {
			log::error!("ortkit-sys failed to download prebuilt binaries from `{}`: {e}", dist.url);
			return None;
		}
	};

	let install_dir = bin_extract_dir.join(dist.archive_stem());

	#[cfg(feature = "copy-dylibs")]
	dynamic_link::copy_dylibs(&install_dir.join("lib"), &out_dir, target);

	Some(install_dir)
}
