use super::{ExecutionProvider, RegisterError};
use crate::session::builder::SessionBuilder;

/// [MIGraphX execution provider](https://onnxruntime.ai/docs/execution-providers/MIGraphX-ExecutionProvider.html) for
/// AMD GPUs.
#[derive(Debug, Default, Clone)]
pub struct MIGraphXExecutionProvider {
	device_id: i32
}

super::impl_ep!(MIGraphXExecutionProvider);

impl MIGraphXExecutionProvider {
	#[must_use]
	pub fn with_device_id(mut self, device_id: i32) -> Self {
		self.device_id = device_id;
		self
	}
}

impl ExecutionProvider for MIGraphXExecutionProvider {
	fn name(&self) -> &'static str {
		"MIGraphXExecutionProvider"
	}

	fn supported_by_platform(&self) -> bool {
		cfg!(all(any(target_os = "linux", target_os = "windows"), target_arch = "x86_64"))
	}

	#[allow(unused, unreachable_code)]
	fn register(&self, session_builder: &mut SessionBuilder) -> Result<(), RegisterError> {
		#[cfg(any(feature = "load-dynamic", feature = "migraphx"))]
		{
			super::define_ep_register!(OrtSessionOptionsAppendExecutionProvider_MIGraphX(options: *mut ortkit_sys::OrtSessionOptions, device_id: std::ffi::c_int) -> ortkit_sys::OrtStatusPtr);
			return Ok(unsafe {
				crate::error::status_to_result(OrtSessionOptionsAppendExecutionProvider_MIGraphX(session_builder.ptr_mut(), self.device_id))
			}?);
		}

		Err(RegisterError::MissingFeature)
	}
}
