//! [`ExecutionProvider`]s provide hardware acceleration to sessions.
//!
//! Providers are registered in order, either per session via [`SessionBuilder::with_execution_providers`] or for every
//! session via [`EnvironmentBuilder::with_execution_providers`]. Registration fails gracefully: a provider that is
//! missing from the ONNX Runtime build, disabled at compile time, or misconfigured is logged and skipped, and ONNX
//! Runtime falls back to the next provider, and finally to the CPU.
//!
//! ```no_run
//! use ortkit::{
//! 	execution_providers::{CUDAExecutionProvider, DirectMLExecutionProvider},
//! 	session::builder::SessionBuilder
//! };
//!
//! fn main() -> ortkit::Result<()> {
//! 	let options = SessionBuilder::new()?
//! 		.with_execution_providers([
//! 			// fail loudly if CUDA can't be used
//! 			CUDAExecutionProvider::default().build().error_on_failure(),
//! 			DirectMLExecutionProvider::default().build()
//! 		])?
//! 		.build()?;
//! 	println!("using {:?}", options.registered_execution_providers());
//! 	Ok(())
//! }
//! ```
//!
//! Failures are reported through `tracing`; run with `RUST_LOG=ortkit=debug` to see every attempt.
//!
//! [`EnvironmentBuilder::with_execution_providers`]: crate::environment::EnvironmentBuilder::with_execution_providers

use std::{
	any::Any,
	ffi::{CString, c_char},
	fmt::{self, Debug},
	ptr,
	sync::Arc
};

use crate::{
	error::{Error, ErrorCode, Result},
	ortsys,
	session::builder::SessionBuilder,
	util::{MiniMap, char_p_to_string, run_on_drop}
};

pub mod cpu;
pub use self::cpu::CPUExecutionProvider;
pub mod cuda;
pub use self::cuda::CUDAExecutionProvider;
pub mod tensorrt;
pub use self::tensorrt::TensorRTExecutionProvider;
pub mod onednn;
pub use self::onednn::OneDNNExecutionProvider;
pub mod openvino;
pub use self::openvino::OpenVINOExecutionProvider;
pub mod coreml;
pub use self::coreml::CoreMLExecutionProvider;
pub mod rocm;
pub use self::rocm::ROCmExecutionProvider;
pub mod directml;
pub use self::directml::DirectMLExecutionProvider;
pub mod nnapi;
pub use self::nnapi::NNAPIExecutionProvider;
pub mod qnn;
pub use self::qnn::QNNExecutionProvider;
pub mod xnnpack;
pub use self::xnnpack::XNNPACKExecutionProvider;
pub mod acl;
pub use self::acl::ACLExecutionProvider;
pub mod armnn;
pub use self::armnn::ArmNNExecutionProvider;
pub mod tvm;
pub use self::tvm::{TVMExecutionProvider, TVMExecutorType, TVMTuningType};
pub mod migraphx;
pub use self::migraphx::MIGraphXExecutionProvider;
pub mod rknpu;
pub use self::rknpu::RKNPUExecutionProvider;
pub mod cann;
pub use self::cann::{CANNExecutionProvider, CANNImplementationMode, CANNPrecisionMode};
pub mod vitis;
pub use self::vitis::VitisAIExecutionProvider;

pub trait ExecutionProvider: Any + Send + Sync {
	/// Returns the identifier of this execution provider used internally by ONNX Runtime.
	///
	/// This is the same as what's used in ONNX Runtime's Python API to register this execution provider, i.e.
	/// [`CUDAExecutionProvider`]'s identifier is `CUDAExecutionProvider`.
	fn name(&self) -> &'static str;

	/// Returns whether this execution provider is supported on this platform.
	///
	/// For example, the CoreML execution provider implements this as:
	/// ```ignore
	/// impl ExecutionProvider for CoreMLExecutionProvider {
	/// 	fn supported_by_platform(&self) -> bool {
	/// 		cfg!(target_vendor = "apple")
	/// 	}
	/// }
	/// ```
	fn supported_by_platform(&self) -> bool {
		true
	}

	/// Returns `Ok(true)` if ONNX Runtime was *compiled with support* for this execution provider, and `Ok(false)`
	/// otherwise.
	///
	/// **Note that this does not mean the execution provider is *usable*.** The EP may still fail to load its
	/// dependencies (CUDA, cuDNN, a QNN backend...) when it is registered. To show the user whether e.g. CUDA could be
	/// enabled, register it with [`ExecutionProviderDispatch::error_on_failure`] and handle the error instead.
	fn is_available(&self) -> Result<bool> {
		is_ep_available(self.name())
	}

	/// Attempts to register this execution provider on the given session.
	fn register(&self, session_builder: &mut SessionBuilder) -> Result<(), RegisterError>;
}

/// Trait used for execution providers that can have arbitrary configuration keys applied.
///
/// Execution providers like CUDA often gain options between ONNX Runtime releases. This allows you to configure them
/// regardless of whether `ortkit` has a dedicated method for them.
pub trait ArbitrarilyConfigurableExecutionProvider {
	fn with_arbitrary_config(self, key: impl ToString, value: impl ToString) -> Self;
}

/// The strategy for extending the device memory arena.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ArenaExtendStrategy {
	/// (Default) Subsequent extensions extend by larger amounts (multiplied by powers of two)
	#[default]
	NextPowerOfTwo,
	/// Memory extends by the requested amount.
	SameAsRequested
}

impl ArenaExtendStrategy {
	pub(crate) fn as_str(&self) -> &'static str {
		match self {
			Self::NextPowerOfTwo => "kNextPowerOfTwo",
			Self::SameAsRequested => "kSameAsRequested"
		}
	}
}

/// Dynamic execution provider container, used to provide a list of multiple types of execution providers when
/// configuring execution providers for a [`SessionBuilder`] or
/// [`EnvironmentBuilder`](crate::environment::EnvironmentBuilder).
///
/// See [`ExecutionProvider`] for more info on execution providers.
#[derive(Clone)]
pub struct ExecutionProviderDispatch {
	pub(crate) inner: Arc<dyn ExecutionProvider>,
	error_on_failure: bool
}

impl ExecutionProviderDispatch {
	pub fn new<E: ExecutionProvider + 'static>(ep: E) -> Self {
		ExecutionProviderDispatch {
			inner: Arc::new(ep) as _,
			error_on_failure: false
		}
	}

	/// Configures this execution provider to log an error if registration of the EP fails, and move on to the next
	/// one. This is the default behavior; it can be overridden with [`ExecutionProviderDispatch::error_on_failure`].
	#[must_use]
	pub fn fail_silently(mut self) -> Self {
		self.error_on_failure = false;
		self
	}

	/// Configures this execution provider to return an error upon EP registration if registration of this EP fails.
	/// The default behavior is to silently fail and fall back to the next execution provider, or the CPU provider if no
	/// registrations succeed.
	#[must_use]
	pub fn error_on_failure(mut self) -> Self {
		self.error_on_failure = true;
		self
	}

	pub fn will_error_on_failure(&self) -> bool {
		self.error_on_failure
	}

	pub fn name(&self) -> &'static str {
		self.inner.name()
	}

	/// Attempt to downcast this execution provider to a concrete type `E`.
	pub fn downcast_ref<E: ExecutionProvider>(&self) -> Option<&E> {
		<dyn Any>::downcast_ref(&*self.inner)
	}
}

impl Debug for ExecutionProviderDispatch {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct(self.inner.name())
			.field("error_on_failure", &self.error_on_failure)
			.finish()
	}
}

/// Sets the current GPU device of the active EP to the device specified by `device_id`.
///
/// This only works for [`CUDAExecutionProvider`] & [`ROCmExecutionProvider`].
pub fn set_gpu_device(device_id: i32) -> Result<()> {
	ortsys![unsafe SetCurrentGpuDeviceId(device_id)?];
	Ok(())
}

/// Returns the ID of the GPU device being used by the active EP.
///
/// This only works for [`CUDAExecutionProvider`] & [`ROCmExecutionProvider`].
pub fn get_gpu_device() -> Result<i32> {
	let mut out = 0;
	ortsys![unsafe GetCurrentGpuDeviceId(&mut out)?];
	Ok(out)
}

/// Key/value options of an execution provider, in the order they were set.
#[derive(Default, Debug, Clone)]
pub(crate) struct ExecutionProviderOptions(MiniMap<String, String>);

impl ExecutionProviderOptions {
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.0.insert(key.into(), value.into());
	}

	#[allow(unused)]
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Converts the options to the parallel key/value arrays taken by ONNX Runtime.
	#[allow(unused)]
	pub fn to_ffi(&self) -> Result<ExecutionProviderOptionsFFI> {
		let mut keys = Vec::with_capacity(self.0.len());
		let mut values = Vec::with_capacity(self.0.len());
		for (k, v) in self.0.iter() {
			keys.push(CString::new(k.as_str())?);
			values.push(CString::new(v.as_str())?);
		}
		let key_ptrs = keys.iter().map(|k| k.as_ptr()).collect();
		let value_ptrs = values.iter().map(|v| v.as_ptr()).collect();
		Ok(ExecutionProviderOptionsFFI {
			key_ptrs,
			value_ptrs,
			_keys: keys,
			_values: values
		})
	}
}

#[allow(unused)]
pub(crate) struct ExecutionProviderOptionsFFI {
	key_ptrs: Vec<*const c_char>,
	value_ptrs: Vec<*const c_char>,
	_keys: Vec<CString>,
	_values: Vec<CString>
}

#[allow(unused)]
impl ExecutionProviderOptionsFFI {
	pub fn key_ptrs(&self) -> *const *const c_char {
		self.key_ptrs.as_ptr()
	}

	pub fn value_ptrs(&self) -> *const *const c_char {
		self.value_ptrs.as_ptr()
	}

	pub fn len(&self) -> usize {
		self.key_ptrs.len()
	}
}

/// Why an execution provider could not be registered.
#[derive(Debug)]
pub enum RegisterError {
	/// ONNX Runtime (or loading it) returned an error.
	Error(Error),
	/// `ortkit` was compiled without support for this execution provider; enable its Cargo feature or `load-dynamic`.
	MissingFeature
}

impl From<Error> for RegisterError {
	fn from(value: Error) -> Self {
		Self::Error(value)
	}
}

impl From<RegisterError> for Error {
	fn from(value: RegisterError) -> Self {
		match value {
			RegisterError::Error(e) => e,
			RegisterError::MissingFeature => Error::new_with_code(
				ErrorCode::ExecutionProviderFailure,
				"The execution provider could not be registered because its corresponding Cargo feature is not enabled."
			)
		}
	}
}

impl fmt::Display for RegisterError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Error(e) => fmt::Display::fmt(e, f),
			Self::MissingFeature => f.write_str("The execution provider could not be registered because its corresponding Cargo feature is not enabled.")
		}
	}
}

impl std::error::Error for RegisterError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Error(e) => Some(e),
			Self::MissingFeature => None
		}
	}
}

/// Declares a local binding for one of the `OrtSessionOptionsAppendExecutionProvider_*` functions ONNX Runtime
/// exports outside of the API table: looked up in the loaded library with `load-dynamic`, linked otherwise.
#[allow(unused)]
macro_rules! define_ep_register {
	($symbol:ident($($id:ident: $type:ty),*) -> $rt:ty) => {
		#[cfg(feature = "load-dynamic")]
		#[allow(non_snake_case)]
		let $symbol = unsafe {
			let dylib = $crate::lib_handle()?;
			let symbol: ::std::result::Result<
				::libloading::Symbol<unsafe extern "system" fn($($id: $type),*) -> $rt>,
				::libloading::Error
			> = dylib.get(stringify!($symbol).as_bytes());
			match symbol {
				Ok(symbol) => symbol.into_raw(),
				Err(e) => {
					return ::std::result::Result::Err($crate::Error::new_with_code(
						$crate::ErrorCode::NotImplemented,
						format!("Error attempting to load symbol `{}` from dynamic library: {}", stringify!($symbol), e)
					))?;
				}
			}
		};
		#[cfg(not(feature = "load-dynamic"))]
		extern "system" {
			fn $symbol($($id: $type),*) -> $rt;
		}
	};
}
#[allow(unused)]
pub(crate) use define_ep_register;

macro_rules! impl_ep {
	(arbitrary; $symbol:ident) => {
		$crate::execution_providers::impl_ep!($symbol);

		impl $crate::execution_providers::ArbitrarilyConfigurableExecutionProvider for $symbol {
			fn with_arbitrary_config(mut self, key: impl ::std::string::ToString, value: impl ::std::string::ToString) -> Self {
				self.options.set(key.to_string(), value.to_string());
				self
			}
		}
	};
	($symbol:ident) => {
		impl $symbol {
			#[must_use]
			pub fn build(self) -> $crate::execution_providers::ExecutionProviderDispatch {
				self.into()
			}
		}

		impl From<$symbol> for $crate::execution_providers::ExecutionProviderDispatch {
			fn from(value: $symbol) -> Self {
				$crate::execution_providers::ExecutionProviderDispatch::new(value)
			}
		}
	};
}
pub(crate) use impl_ep;

/// Registers `eps` on `session_builder` in order, logging the outcome of each.
///
/// Failed registrations are logged and skipped, unless the provider was marked with
/// [`ExecutionProviderDispatch::error_on_failure`], in which case the error is returned and no further providers are
/// registered. `source` names where the list came from (`"session options"` or `"environment"`).
pub(crate) fn apply_execution_providers(session_builder: &mut SessionBuilder, eps: &[ExecutionProviderDispatch], source: &'static str) -> Result<()> {
	fn register_inner(session_builder: &mut SessionBuilder, ep: &ExecutionProviderDispatch, #[allow(unused)] source: &'static str) -> Result<bool> {
		if let Err(e) = ep.inner.register(session_builder) {
			if ep.error_on_failure {
				return Err(Error::from(e).with_context(format!("Failed to register `{}`", ep.inner.name())));
			}

			if matches!(e, RegisterError::MissingFeature) {
				if ep.inner.supported_by_platform() {
					crate::warn!(%source, "{e}");
				} else {
					crate::debug!(%source, "{e} (note: additionally, `{}` may not be supported on this platform)", ep.inner.name());
				}
			} else {
				crate::error!(%source, "An error occurred when attempting to register `{}`: {e}", ep.inner.name());
			}
			Ok(false)
		} else {
			crate::info!(%source, "Successfully registered `{}`", ep.inner.name());
			session_builder.record_execution_provider(ep.inner.name());
			Ok(true)
		}
	}

	let mut fallback_to_cpu = !eps.is_empty();
	for ep in eps {
		if register_inner(session_builder, ep, source)? {
			fallback_to_cpu = false;
		}
	}
	if fallback_to_cpu {
		crate::warn!("No execution providers from {source} registered successfully; may fall back to CPU.");
	}
	Ok(())
}

/// Lists the execution providers the loaded ONNX Runtime was built with, e.g. `["CUDAExecutionProvider",
/// "CPUExecutionProvider"]`.
pub fn available_providers() -> Result<Vec<String>> {
	let mut providers: *mut *mut c_char = ptr::null_mut();
	let mut num_providers = 0;
	ortsys![unsafe GetAvailableProviders(&mut providers, &mut num_providers)?];
	if providers.is_null() {
		return Ok(Vec::new());
	}

	let _guard = run_on_drop(|| {
		if let Some(release) = crate::api().ok().and_then(|api| api.ReleaseAvailableProviders()) {
			let status = unsafe { release(providers, num_providers) };
			let _ = unsafe { crate::error::status_to_result(status) };
		}
	});

	let num_providers = usize::try_from(num_providers).unwrap_or(0);
	Ok((0..num_providers).map(|i| char_p_to_string(unsafe { *providers.add(i) })).collect())
}

fn is_ep_available(name: &str) -> Result<bool> {
	Ok(available_providers()?.iter().any(|avail| avail == name))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_options_ffi() {
		let mut options = ExecutionProviderOptions::default();
		options.set("device_id", "0");
		options.set("gpu_mem_limit", "2147483648");
		options.set("device_id", "1");
		let ffi = options.to_ffi().unwrap();
		assert_eq!(ffi.len(), 2);
		let key = unsafe { std::ffi::CStr::from_ptr(*ffi.key_ptrs()) };
		let value = unsafe { std::ffi::CStr::from_ptr(*ffi.value_ptrs()) };
		assert_eq!(key.to_str().unwrap(), "device_id");
		assert_eq!(value.to_str().unwrap(), "1");
	}

	#[test]
	fn test_options_with_nul_fail() {
		let mut options = ExecutionProviderOptions::default();
		options.set("cache_dir", "a\0b");
		assert!(options.to_ffi().is_err());
	}

	#[test]
	fn test_register_error() {
		let err = Error::from(RegisterError::MissingFeature);
		assert_eq!(err.code(), ErrorCode::ExecutionProviderFailure);
		assert!(RegisterError::MissingFeature.to_string().contains("Cargo feature"));
	}

	#[test]
	fn test_dispatch_flags() {
		let ep = CPUExecutionProvider::default().build();
		assert!(!ep.will_error_on_failure());
		assert!(ep.clone().error_on_failure().will_error_on_failure());
		assert!(!ep.error_on_failure().fail_silently().will_error_on_failure());
	}

	#[test]
	fn test_downcast() {
		let ep = CUDAExecutionProvider::default().with_device_id(1).build();
		assert_eq!(ep.name(), "CUDAExecutionProvider");
		assert!(ep.downcast_ref::<CUDAExecutionProvider>().is_some());
		assert!(ep.downcast_ref::<CPUExecutionProvider>().is_none());
	}
}
