use super::{ExecutionProvider, ExecutionProviderOptions, RegisterError};
use crate::session::builder::SessionBuilder;

/// [TensorRT execution provider](https://onnxruntime.ai/docs/execution-providers/TensorRT-ExecutionProvider.html) for
/// NVIDIA GPUs. Nodes TensorRT can't handle fall through to the next provider, so it is usually registered before
/// [`CUDAExecutionProvider`](super::CUDAExecutionProvider).
#[derive(Debug, Default, Clone)]
pub struct TensorRTExecutionProvider {
	options: ExecutionProviderOptions
}

super::impl_ep!(arbitrary; TensorRTExecutionProvider);

impl TensorRTExecutionProvider {
	#[must_use]
	pub fn with_device_id(mut self, device_id: i32) -> Self {
		self.options.set("device_id", device_id.to_string());
		self
	}

	#[must_use]
	pub fn with_max_workspace_size(mut self, max_size: usize) -> Self {
		self.options.set("trt_max_workspace_size", max_size.to_string());
		self
	}

	#[must_use]
	pub fn with_fp16(mut self, enable: bool) -> Self {
		self.options.set("trt_fp16_enable", if enable { "1" } else { "0" });
		self
	}

	#[must_use]
	pub fn with_int8(mut self, enable: bool) -> Self {
		self.options.set("trt_int8_enable", if enable { "1" } else { "0" });
		self
	}

	/// Cache built engines on disk; building an engine can take minutes.
	#[must_use]
	pub fn with_engine_cache(mut self, enable: bool) -> Self {
		self.options.set("trt_engine_cache_enable", if enable { "1" } else { "0" });
		self
	}

	#[must_use]
	pub fn with_engine_cache_path(mut self, path: impl ToString) -> Self {
		self.options.set("trt_engine_cache_path", path.to_string());
		self
	}

	#[must_use]
	pub fn with_timing_cache(mut self, enable: bool) -> Self {
		self.options.set("trt_timing_cache_enable", if enable { "1" } else { "0" });
		self
	}
}

impl ExecutionProvider for TensorRTExecutionProvider {
	fn name(&self) -> &'static str {
		"TensorrtExecutionProvider"
	}

	fn supported_by_platform(&self) -> bool {
		cfg!(any(all(target_os = "linux", any(target_arch = "aarch64", target_arch = "x86_64")), all(target_os = "windows", target_arch = "x86_64")))
	}

	#[allow(unused, unreachable_code)]
	fn register(&self, session_builder: &mut SessionBuilder) -> Result<(), RegisterError> {
		#[cfg(any(feature = "load-dynamic", feature = "tensorrt"))]
		{
			use crate::{ortsys, util};

			let mut trt_options: *mut ortkit_sys::OrtTensorRTProviderOptionsV2 = std::ptr::null_mut();
			ortsys![unsafe CreateTensorRTProviderOptions(&mut trt_options)?; nonNull(trt_options)];
			let _guard = util::run_on_drop(|| {
				if let Some(release) = crate::api().ok().and_then(|api| api.ReleaseTensorRTProviderOptions()) {
					unsafe { release(trt_options) };
				}
			});

			let ffi_options = self.options.to_ffi()?;
			if ffi_options.len() > 0 {
				ortsys![unsafe UpdateTensorRTProviderOptions(trt_options, ffi_options.key_ptrs(), ffi_options.value_ptrs(), ffi_options.len() as _)?];
			}

			ortsys![unsafe SessionOptionsAppendExecutionProvider_TensorRT_V2(session_builder.ptr_mut(), trt_options)?];
			return Ok(());
		}

		Err(RegisterError::MissingFeature)
	}
}
