use super::{ExecutionProvider, RegisterError};
use crate::session::builder::SessionBuilder;

/// [oneDNN execution provider](https://onnxruntime.ai/docs/execution-providers/oneDNN-ExecutionProvider.html) for
/// Intel CPUs and GPUs.
#[derive(Debug, Default, Clone)]
pub struct OneDNNExecutionProvider {
	use_arena: bool
}

super::impl_ep!(OneDNNExecutionProvider);

impl OneDNNExecutionProvider {
	#[must_use]
	pub fn with_arena_allocator(mut self, enable: bool) -> Self {
		self.use_arena = enable;
		self
	}
}

impl ExecutionProvider for OneDNNExecutionProvider {
	fn name(&self) -> &'static str {
		"DnnlExecutionProvider"
	}

	fn supported_by_platform(&self) -> bool {
		cfg!(any(target_arch = "x86_64", target_arch = "aarch64"))
	}

	#[allow(unused, unreachable_code)]
	fn register(&self, session_builder: &mut SessionBuilder) -> Result<(), RegisterError> {
		#[cfg(any(feature = "load-dynamic", feature = "onednn"))]
		{
			super::define_ep_register!(OrtSessionOptionsAppendExecutionProvider_Dnnl(options: *mut ortkit_sys::OrtSessionOptions, use_arena: ortkit_sys::c_int) -> ortkit_sys::OrtStatusPtr);
			return Ok(unsafe { crate::error::status_to_result(OrtSessionOptionsAppendExecutionProvider_Dnnl(session_builder.ptr_mut(), self.use_arena.into())) }?);
		}

		Err(RegisterError::MissingFeature)
	}
}
