use super::{ExecutionProvider, RegisterError};
use crate::session::builder::SessionBuilder;

/// [CoreML execution provider](https://onnxruntime.ai/docs/execution-providers/CoreML-ExecutionProvider.html) for
/// hardware acceleration on Apple devices.
#[derive(Debug, Default, Clone)]
pub struct CoreMLExecutionProvider {
	use_cpu_only: bool,
	enable_on_subgraph: bool,
	only_enable_device_with_ane: bool,
	only_static_input_shapes: bool,
	create_mlprogram: bool
}

super::impl_ep!(CoreMLExecutionProvider);

impl CoreMLExecutionProvider {
	/// Limit CoreML to running on CPU only. This decreases performance, but provides reference output values without
	/// precision loss, which is useful for validation.
	#[must_use]
	pub fn with_cpu_only(mut self) -> Self {
		self.use_cpu_only = true;
		self
	}

	/// Enable CoreML EP to run on a subgraph in the body of a control flow operator (i.e. a `Loop`, `Scan` or `If`
	/// operator).
	#[must_use]
	pub fn with_subgraphs(mut self) -> Self {
		self.enable_on_subgraph = true;
		self
	}

	/// Only enable the CoreML EP on Apple devices with a compatible Apple Neural Engine.
	#[must_use]
	pub fn with_ane_only(mut self) -> Self {
		self.only_enable_device_with_ane = true;
		self
	}

	/// Only allow the CoreML EP to take nodes with inputs that have static shapes.
	#[must_use]
	pub fn with_static_input_shapes(mut self) -> Self {
		self.only_static_input_shapes = true;
		self
	}

	/// Create an ML Program (Core ML 5+, iOS 15+ / macOS 12+) instead of the older NeuralNetwork model format.
	#[must_use]
	pub fn with_ml_program(mut self) -> Self {
		self.create_mlprogram = true;
		self
	}

	fn flags(&self) -> u32 {
		let mut flags = 0;
		if self.use_cpu_only {
			flags |= 0x001;
		}
		if self.enable_on_subgraph {
			flags |= 0x002;
		}
		if self.only_enable_device_with_ane {
			flags |= 0x004;
		}
		if self.only_static_input_shapes {
			flags |= 0x008;
		}
		if self.create_mlprogram {
			flags |= 0x010;
		}
		flags
	}
}

impl ExecutionProvider for CoreMLExecutionProvider {
	fn name(&self) -> &'static str {
		"CoreMLExecutionProvider"
	}

	fn supported_by_platform(&self) -> bool {
		cfg!(target_vendor = "apple")
	}

	#[allow(unused, unreachable_code)]
	fn register(&self, session_builder: &mut SessionBuilder) -> Result<(), RegisterError> {
		#[cfg(any(feature = "load-dynamic", feature = "coreml"))]
		{
			super::define_ep_register!(OrtSessionOptionsAppendExecutionProvider_CoreML(options: *mut ortkit_sys::OrtSessionOptions, flags: u32) -> ortkit_sys::OrtStatusPtr);
			return Ok(unsafe { crate::error::status_to_result(OrtSessionOptionsAppendExecutionProvider_CoreML(session_builder.ptr_mut(), self.flags())) }?);
		}

		Err(RegisterError::MissingFeature)
	}
}
