#![allow(clippy::tabs_in_doc_comments)]
#![warn(clippy::unwrap_used)]

//! `ortkit` loads or links [ONNX Runtime](https://onnxruntime.ai/), sets up its process-wide environment, and
//! registers execution providers on session options.
//!
//! Execution provider registration never aborts the program by default: a provider that can't be registered is logged
//! (through [`tracing`](https://docs.rs/tracing)) and skipped, so ONNX Runtime falls back to the next provider and
//! eventually the CPU. Use [`ExecutionProviderDispatch::error_on_failure`] to turn a failure into an error instead.
//!
//! ```no_run
//! use ortkit::{
//! 	execution_providers::{CPUExecutionProvider, CUDAExecutionProvider},
//! 	session::builder::SessionBuilder
//! };
//!
//! fn main() -> ortkit::Result<()> {
//! 	ortkit::init()
//! 		.with_execution_providers([CUDAExecutionProvider::default().build(), CPUExecutionProvider::default().build()])
//! 		.commit()?;
//!
//! 	let builder = SessionBuilder::new()?.build()?;
//! 	println!("registered: {:?}", builder.registered_execution_providers());
//! 	Ok(())
//! }
//! ```
//!
//! [`ExecutionProviderDispatch::error_on_failure`]: crate::execution_providers::ExecutionProviderDispatch::error_on_failure

pub mod environment;
pub mod error;
pub mod execution_providers;
pub mod logging;
pub mod session;
pub(crate) mod util;

#[cfg(feature = "load-dynamic")]
use std::sync::Arc;
use std::{
	path::{Path, PathBuf},
	sync::OnceLock
};

pub use ortkit_sys as sys;

#[cfg(feature = "load-dynamic")]
pub use self::environment::init_from;
pub(crate) use self::logging::{debug, error, info, trace, warning as warn};
pub use self::{
	environment::{EnvironmentBuilder, init},
	error::{Error, ErrorCode, Result}
};

/// The minor version of ONNX Runtime this version of `ortkit` was written against.
pub const MINOR_VERSION: u32 = ortkit_sys::ORT_API_VERSION;

#[cfg(feature = "load-dynamic")]
pub(crate) static G_ORT_DYLIB_PATH: OnceLock<Arc<String>> = OnceLock::new();
#[cfg(feature = "load-dynamic")]
pub(crate) static G_ORT_LIB: OnceLock<Arc<libloading::Library>> = OnceLock::new();
static G_RUNTIME_VERSION: OnceLock<String> = OnceLock::new();

/// File name of the ONNX Runtime shared library on this platform.
pub const DEFAULT_DYLIB_NAME: &str = if cfg!(target_os = "windows") {
	"onnxruntime.dll"
} else if cfg!(any(target_os = "macos", target_os = "ios")) {
	"libonnxruntime.dylib"
} else {
	"libonnxruntime.so"
};

/// The path `ortkit` loads ONNX Runtime from: the path given to [`init_from`], else `ORT_DYLIB_PATH`, else
/// [`DEFAULT_DYLIB_NAME`].
///
/// Relative paths are resolved with [`resolve_dylib_path`] when the library is actually loaded.
#[cfg(feature = "load-dynamic")]
pub fn dylib_path() -> &'static str {
	G_ORT_DYLIB_PATH.get_or_init(|| {
		let path = match std::env::var("ORT_DYLIB_PATH") {
			Ok(s) if !s.is_empty() => s,
			_ => DEFAULT_DYLIB_NAME.to_owned()
		};
		Arc::new(path)
	})
	.as_str()
}

/// Resolves a dylib path the way [`api`] does before loading it.
///
/// Absolute paths are returned as-is. Relative paths are joined onto `exe_dir` (the directory of the current
/// executable) if a file exists there; otherwise the path is returned unchanged and left to the platform loader's own
/// search (`LD_LIBRARY_PATH`, `PATH`, the rpath, ...).
pub fn resolve_dylib_path(path: impl AsRef<Path>, exe_dir: Option<&Path>) -> PathBuf {
	let path = path.as_ref();
	if path.is_absolute() {
		return path.to_path_buf();
	}
	match exe_dir.map(|dir| dir.join(path)) {
		Some(relative) if relative.exists() => relative,
		_ => path.to_path_buf()
	}
}

#[cfg(feature = "load-dynamic")]
pub(crate) fn lib_handle() -> Result<&'static libloading::Library> {
	if let Some(lib) = G_ORT_LIB.get() {
		return Ok(lib);
	}

	let exe_dir = std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf));
	let path = resolve_dylib_path(dylib_path(), exe_dir.as_deref());
	debug!(path = %path.display(), "Loading ONNX Runtime dylib");
	let lib = unsafe { libloading::Library::new(&path) }.map_err(|e| {
		Error::wrap(e).with_context(format!("An error occurred while attempting to load the ONNX Runtime binary at `{}`", path.display()))
	})?;

	// if another thread won the race, our handle is dropped; the OS refcounts the library either way
	let _ = G_ORT_LIB.set(Arc::new(lib));
	G_ORT_LIB.get().map(|lib| &**lib).ok_or_else(|| Error::new("ONNX Runtime dylib handle was not stored"))
}

/// Returns information about the build of ONNX Runtime used, including version, Git commit, and compile flags.
///
/// ```no_run
/// println!("{}", ortkit::info()?);
/// // ORT Build Info: git-branch=rel-1.17.0, git-commit-id=..., build type=Release, cmake cxx flags: ...
/// # Ok::<(), ortkit::Error>(())
/// ```
pub fn info() -> Result<String> {
	let raw = ortsys![unsafe GetBuildInfoString()];
	Ok(util::char_p_to_string(raw))
}

/// The version string reported by the loaded ONNX Runtime, once [`api`] has loaded it.
///
/// Tables installed with [`set_api`] have no version, so this is `None` for alternative backends.
pub fn runtime_version() -> Option<&'static str> {
	G_RUNTIME_VERSION.get().map(String::as_str)
}

struct ApiPointer(&'static ortkit_sys::OrtApi);

static G_ORT_API: OnceLock<ApiPointer> = OnceLock::new();

/// Returns a reference to the global [`ortkit_sys::OrtApi`] table, loading ONNX Runtime if necessary.
///
/// # Errors
/// - The `alternative-backend` feature is enabled and [`set_api`] was not yet called.
/// - The ONNX Runtime dynamic library could not be loaded (`load-dynamic`).
/// - The loaded ONNX Runtime is older than [`MINOR_VERSION`].
pub fn api() -> Result<&'static ortkit_sys::OrtApi> {
	if let Some(api) = G_ORT_API.get() {
		return Ok(api.0);
	}

	#[cfg(feature = "alternative-backend")]
	return Err(Error::new(
		"attempted to use `ortkit` APIs before initializing a backend\nwhen the `alternative-backend` feature is enabled, `ortkit::set_api` must be called to configure the `OrtApi` used by the library"
	));

	#[cfg(not(feature = "alternative-backend"))]
	{
		let api = load_api()?;
		let _ = G_ORT_API.set(ApiPointer(api));
		G_ORT_API.get().map(|api| api.0).ok_or_else(|| Error::new("API table was not stored"))
	}
}

#[cfg(not(feature = "alternative-backend"))]
fn api_base() -> Result<*const ortkit_sys::OrtApiBase> {
	#[cfg(feature = "load-dynamic")]
	{
		let dylib = lib_handle()?;
		let base_getter: libloading::Symbol<unsafe extern "system" fn() -> *const ortkit_sys::OrtApiBase> = unsafe { dylib.get(b"OrtGetApiBase") }
			.map_err(|e| Error::wrap(e).with_context(format!("`OrtGetApiBase` must be present in the ONNX Runtime dylib at `{}`", dylib_path())))?;
		Ok(unsafe { base_getter() })
	}
	#[cfg(not(feature = "load-dynamic"))]
	Ok(unsafe { ortkit_sys::OrtGetApiBase() })
}

#[cfg(not(feature = "alternative-backend"))]
fn load_api() -> Result<&'static ortkit_sys::OrtApi> {
	let base = api_base()?;
	let base = unsafe { base.as_ref() }.ok_or_else(|| Error::new("`OrtGetApiBase` returned a null pointer"))?;

	if let Some(get_version_string) = base.GetVersionString {
		let version_string = util::char_p_to_string(unsafe { get_version_string() });
		info!("Loaded ONNX Runtime with version '{version_string}'");
		check_version(&version_string)?;
		let _ = G_RUNTIME_VERSION.set(version_string);
	}

	let get_api = base.GetApi.ok_or_else(|| Error::new("`OrtApiBase::GetApi` is null"))?;
	let api = unsafe { get_api(ortkit_sys::ORT_API_VERSION) };
	// SAFETY: tables for API version `ORT_API_VERSION` have at least `ORT_API_TABLE_LEN` slots and live for as long as
	// the library stays loaded, which is the rest of the process
	unsafe { api.as_ref() }.ok_or_else(|| Error::new(format!("ONNX Runtime does not support API version {}", ortkit_sys::ORT_API_VERSION)))
}

/// Compares the minor version of a `1.x.y` version string against [`MINOR_VERSION`]. Older runtimes are rejected;
/// newer ones only produce a warning.
pub(crate) fn check_version(version_string: &str) -> Result<()> {
	use std::cmp::Ordering;

	#[cfg(feature = "load-dynamic")]
	let source = dylib_path();
	#[cfg(not(feature = "load-dynamic"))]
	let source = "the linked library";

	let lib_minor_version = version_string.split('.').nth(1).map_or(0, |x| x.parse::<u32>().unwrap_or(0));
	match lib_minor_version.cmp(&MINOR_VERSION) {
		Ordering::Less => Err(Error::new(format!(
			"ortkit {} is not compatible with the ONNX Runtime binary found at `{source}`; expected GetVersionString to return '1.{MINOR_VERSION}.x', but got '{version_string}'",
			env!("CARGO_PKG_VERSION")
		))),
		Ordering::Greater => {
			warn!(
				"ortkit {} may have compatibility issues with the ONNX Runtime binary found at `{source}`; expected GetVersionString to return '1.{MINOR_VERSION}.x', but got '{version_string}'",
				env!("CARGO_PKG_VERSION")
			);
			Ok(())
		}
		Ordering::Equal => Ok(())
	}
}

/// Sets the global [`ortkit_sys::OrtApi`] table used by `ortkit`, in order to use an alternative backend or a custom
/// loading scheme.
///
/// When using `alternative-backend`, this must be called before using any other `ortkit` API.
///
/// Returns `true` if successful (i.e. no API has been set up to this point). This function will not override the API if
/// one was already set.
pub fn set_api(api: ortkit_sys::OrtApi) -> bool {
	if G_ORT_API.get().is_some() {
		return false;
	}
	let api: &'static ortkit_sys::OrtApi = Box::leak(Box::new(api));
	G_ORT_API.set(ApiPointer(api)).is_ok()
}

/// Calls a function from the global API table.
///
/// - `ortsys![unsafe F(args)]` evaluates to the function's return value, returning early with an error if the API can't
///   be loaded or `F` is missing from the table.
/// - `ortsys![unsafe F(args)?]` additionally converts the returned status with [`status_to_result`] and propagates it.
/// - `; nonNull(p)` checks that the out-pointer `p` was populated.
///
/// [`status_to_result`]: crate::error::status_to_result
#[macro_export]
macro_rules! ortsys {
	($method:ident) => {
		$crate::api()?
			.$method()
			.ok_or_else(|| $crate::Error::new_with_code($crate::ErrorCode::NotImplemented, concat!("`", stringify!($method), "` is not available in the loaded ONNX Runtime")))?
	};
	(unsafe $method:ident($($n:expr),* $(,)?)) => {
		unsafe { ($crate::ortsys![$method])($($n),*) }
	};
	(unsafe $method:ident($($n:expr),* $(,)?)?) => {
		unsafe { $crate::error::status_to_result(($crate::ortsys![$method])($($n),*)) }?
	};
	(unsafe $method:ident($($n:expr),* $(,)?)?; nonNull($($check:ident),+ $(,)?)$(;)?) => {
		$crate::ortsys![unsafe $method($($n),*)?];
		$(
			if $check.is_null() {
				return Err($crate::Error::new(concat!("expected `", stringify!($check), "` to not be null")).into());
			}
		)+
	};
}
