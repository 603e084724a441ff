use super::{ExecutionProvider, RegisterError};
use crate::session::builder::SessionBuilder;

/// [NNAPI execution provider](https://onnxruntime.ai/docs/execution-providers/NNAPI-ExecutionProvider.html) for
/// Android devices.
#[derive(Debug, Default, Clone)]
pub struct NNAPIExecutionProvider {
	use_fp16: bool,
	use_nchw: bool,
	disable_cpu: bool,
	cpu_only: bool
}

super::impl_ep!(NNAPIExecutionProvider);

impl NNAPIExecutionProvider {
	/// Use fp16 relaxation in NNAPI EP. This may improve performance but can also reduce accuracy due to the lower
	/// precision.
	#[must_use]
	pub fn with_fp16(mut self, enable: bool) -> Self {
		self.use_fp16 = enable;
		self
	}

	/// Use the NCHW layout in NNAPI EP. This is only available for Android API level 29 and higher.
	#[must_use]
	pub fn with_nchw(mut self, enable: bool) -> Self {
		self.use_nchw = enable;
		self
	}

	/// Prevents NNAPI from using CPU devices. Operators NNAPI can't run on an accelerator are then left to other
	/// execution providers instead of NNAPI's own (slow) CPU implementation.
	#[must_use]
	pub fn with_disable_cpu(mut self, enable: bool) -> Self {
		self.disable_cpu = enable;
		self
	}

	/// Using CPU only in NNAPI EP. Useful for validating output, not for performance.
	#[must_use]
	pub fn with_cpu_only(mut self, enable: bool) -> Self {
		self.cpu_only = enable;
		self
	}

	fn flags(&self) -> u32 {
		let mut flags = 0;
		if self.use_fp16 {
			flags |= 0x001;
		}
		if self.use_nchw {
			flags |= 0x002;
		}
		if self.disable_cpu {
			flags |= 0x004;
		}
		if self.cpu_only {
			flags |= 0x008;
		}
		flags
	}
}

impl ExecutionProvider for NNAPIExecutionProvider {
	fn name(&self) -> &'static str {
		"NnapiExecutionProvider"
	}

	fn supported_by_platform(&self) -> bool {
		cfg!(target_os = "android")
	}

	#[allow(unused, unreachable_code)]
	fn register(&self, session_builder: &mut SessionBuilder) -> Result<(), RegisterError> {
		#[cfg(any(feature = "load-dynamic", feature = "nnapi"))]
		{
			super::define_ep_register!(OrtSessionOptionsAppendExecutionProvider_Nnapi(options: *mut ortkit_sys::OrtSessionOptions, flags: u32) -> ortkit_sys::OrtStatusPtr);
			return Ok(unsafe { crate::error::status_to_result(OrtSessionOptionsAppendExecutionProvider_Nnapi(session_builder.ptr_mut(), self.flags())) }?);
		}

		Err(RegisterError::MissingFeature)
	}
}
