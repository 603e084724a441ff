use super::{ExecutionProvider, RegisterError};
use crate::session::builder::SessionBuilder;

/// [DirectML execution provider](https://onnxruntime.ai/docs/execution-providers/DirectML-ExecutionProvider.html) for
/// DirectX 12 capable GPUs on Windows.
///
/// Sessions using DirectML must disable memory pattern optimization and use sequential execution.
#[derive(Debug, Default, Clone)]
pub struct DirectMLExecutionProvider {
	device_id: i32
}

super::impl_ep!(DirectMLExecutionProvider);

impl DirectMLExecutionProvider {
	/// Index of the adapter to use, in the order returned by `IDXGIFactory::EnumAdapters`.
	#[must_use]
	pub fn with_device_id(mut self, device_id: i32) -> Self {
		self.device_id = device_id;
		self
	}
}

impl ExecutionProvider for DirectMLExecutionProvider {
	fn name(&self) -> &'static str {
		"DmlExecutionProvider"
	}

	fn supported_by_platform(&self) -> bool {
		cfg!(target_os = "windows")
	}

	#[allow(unused, unreachable_code)]
	fn register(&self, session_builder: &mut SessionBuilder) -> Result<(), RegisterError> {
		#[cfg(any(feature = "load-dynamic", feature = "directml"))]
		{
			super::define_ep_register!(OrtSessionOptionsAppendExecutionProvider_DML(options: *mut ortkit_sys::OrtSessionOptions, device_id: ortkit_sys::c_int) -> ortkit_sys::OrtStatusPtr);
			return Ok(unsafe { crate::error::status_to_result(OrtSessionOptionsAppendExecutionProvider_DML(session_builder.ptr_mut(), self.device_id as _)) }?);
		}

		Err(RegisterError::MissingFeature)
	}
}
