use super::{ExecutionProvider, ExecutionProviderOptions, RegisterError};
use crate::session::builder::SessionBuilder;

/// [Vitis AI execution provider](https://onnxruntime.ai/docs/execution-providers/Vitis-AI-ExecutionProvider.html) for
/// AMD Ryzen AI NPUs and Xilinx accelerators.
#[derive(Debug, Default, Clone)]
pub struct VitisAIExecutionProvider {
	options: ExecutionProviderOptions
}

super::impl_ep!(arbitrary; VitisAIExecutionProvider);

impl VitisAIExecutionProvider {
	#[must_use]
	pub fn with_config_file(mut self, config_file: impl ToString) -> Self {
		self.options.set("config_file", config_file.to_string());
		self
	}

	#[must_use]
	pub fn with_cache_dir(mut self, cache_dir: impl ToString) -> Self {
		self.options.set("cache_dir", cache_dir.to_string());
		self
	}

	#[must_use]
	pub fn with_cache_key(mut self, cache_key: impl ToString) -> Self {
		self.options.set("cache_key", cache_key.to_string());
		self
	}
}

impl ExecutionProvider for VitisAIExecutionProvider {
	fn name(&self) -> &'static str {
		"VitisAIExecutionProvider"
	}

	fn supported_by_platform(&self) -> bool {
		cfg!(all(any(target_os = "linux", target_os = "windows"), target_arch = "x86_64"))
	}

	#[allow(unused, unreachable_code)]
	fn register(&self, session_builder: &mut SessionBuilder) -> Result<(), RegisterError> {
		#[cfg(any(feature = "load-dynamic", feature = "vitis"))]
		{
			use crate::ortsys;

			let ffi_options = self.options.to_ffi()?;
			ortsys![unsafe SessionOptionsAppendExecutionProvider(
				session_builder.ptr_mut(),
				c"VitisAI".as_ptr(),
				ffi_options.key_ptrs(),
				ffi_options.value_ptrs(),
				ffi_options.len() as _,
			)?];
			return Ok(());
		}

		Err(RegisterError::MissingFeature)
	}
}
