use super::{ExecutionProvider, RegisterError};
use crate::session::builder::SessionBuilder;

/// [ROCm execution provider](https://onnxruntime.ai/docs/execution-providers/ROCm-ExecutionProvider.html) for AMD GPUs.
#[derive(Debug, Default, Clone)]
pub struct ROCmExecutionProvider {
	device_id: i32
}

super::impl_ep!(ROCmExecutionProvider);

impl ROCmExecutionProvider {
	#[must_use]
	pub fn with_device_id(mut self, device_id: i32) -> Self {
		self.device_id = device_id;
		self
	}
}

impl ExecutionProvider for ROCmExecutionProvider {
	fn name(&self) -> &'static str {
		"ROCMExecutionProvider"
	}

	fn supported_by_platform(&self) -> bool {
		cfg!(all(target_os = "linux", target_arch = "x86_64"))
	}

	#[allow(unused, unreachable_code)]
	fn register(&self, session_builder: &mut SessionBuilder) -> Result<(), RegisterError> {
		#[cfg(any(feature = "load-dynamic", feature = "rocm"))]
		{
			super::define_ep_register!(OrtSessionOptionsAppendExecutionProvider_ROCM(options: *mut ortkit_sys::OrtSessionOptions, device_id: ortkit_sys::c_int) -> ortkit_sys::OrtStatusPtr);
			return Ok(unsafe { crate::error::status_to_result(OrtSessionOptionsAppendExecutionProvider_ROCM(session_builder.ptr_mut(), self.device_id as _)) }?);
		}

		Err(RegisterError::MissingFeature)
	}
}
