use super::{ExecutionProvider, ExecutionProviderOptions, RegisterError};
use crate::session::builder::SessionBuilder;

/// [OpenVINO execution provider](https://onnxruntime.ai/docs/execution-providers/OpenVINO-ExecutionProvider.html) for
/// Intel CPUs, integrated & discrete GPUs, and NPUs.
#[derive(Debug, Default, Clone)]
pub struct OpenVINOExecutionProvider {
	options: ExecutionProviderOptions
}

super::impl_ep!(arbitrary; OpenVINOExecutionProvider);

impl OpenVINOExecutionProvider {
	/// Overrides the accelerator hardware type and precision with these values at runtime. If this option is not
	/// explicitly set, default hardware and precision specified during build time is used.
	///
	/// ```
	/// # use ortkit::execution_providers::OpenVINOExecutionProvider;
	/// let ep = OpenVINOExecutionProvider::default().with_device_type("GPU.0").build();
	/// ```
	#[must_use]
	pub fn with_device_type(mut self, device_type: impl AsRef<str>) -> Self {
		self.options.set("device_type", device_type.as_ref());
		self
	}

	#[must_use]
	pub fn with_num_threads(mut self, num_threads: usize) -> Self {
		self.options.set("num_of_threads", num_threads.to_string());
		self
	}

	/// Directory where compiled blobs are cached, which speeds up subsequent session creation.
	#[must_use]
	pub fn with_cache_dir(mut self, dir: impl AsRef<str>) -> Self {
		self.options.set("cache_dir", dir.as_ref());
		self
	}

	#[must_use]
	pub fn with_opencl_throttling(mut self, enable: bool) -> Self {
		self.options.set("enable_opencl_throttling", if enable { "true" } else { "false" });
		self
	}
}

impl ExecutionProvider for OpenVINOExecutionProvider {
	fn name(&self) -> &'static str {
		"OpenVINOExecutionProvider"
	}

	fn supported_by_platform(&self) -> bool {
		cfg!(all(target_arch = "x86_64", any(target_os = "windows", target_os = "linux")))
	}

	#[allow(unused, unreachable_code)]
	fn register(&self, session_builder: &mut SessionBuilder) -> Result<(), RegisterError> {
		#[cfg(any(feature = "load-dynamic", feature = "openvino"))]
		{
			use crate::ortsys;

			let ffi_options = self.options.to_ffi()?;
			ortsys![unsafe SessionOptionsAppendExecutionProvider(
				session_builder.ptr_mut(),
				c"OpenVINO".as_ptr(),
				ffi_options.key_ptrs(),
				ffi_options.value_ptrs(),
				ffi_options.len() as _,
			)?];
			return Ok(());
		}

		Err(RegisterError::MissingFeature)
	}
}
