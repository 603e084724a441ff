use std::num::NonZeroUsize;

use super::{ExecutionProvider, ExecutionProviderOptions, RegisterError};
use crate::session::builder::SessionBuilder;

/// [XNNPACK execution provider](https://onnxruntime.ai/docs/execution-providers/Xnnpack-ExecutionProvider.html) for
/// optimized floating-point inference on Arm, x86 and WebAssembly CPUs.
#[derive(Debug, Default, Clone)]
pub struct XNNPACKExecutionProvider {
	options: ExecutionProviderOptions
}

super::impl_ep!(arbitrary; XNNPACKExecutionProvider);

impl XNNPACKExecutionProvider {
	/// Size of XNNPACK's own thread pool. For best performance, also set the session's intra-op thread count to 1.
	#[must_use]
	pub fn with_intra_op_num_threads(mut self, num_threads: NonZeroUsize) -> Self {
		self.options.set("intra_op_num_threads", num_threads.to_string());
		self
	}
}

impl ExecutionProvider for XNNPACKExecutionProvider {
	fn name(&self) -> &'static str {
		"XnnpackExecutionProvider"
	}

	#[allow(unused, unreachable_code)]
	fn register(&self, session_builder: &mut SessionBuilder) -> Result<(), RegisterError> {
		#[cfg(any(feature = "load-dynamic", feature = "xnnpack"))]
		{
			use crate::ortsys;

			let ffi_options = self.options.to_ffi()?;
			ortsys![unsafe SessionOptionsAppendExecutionProvider(
				session_builder.ptr_mut(),
				c"XNNPACK".as_ptr(),
				ffi_options.key_ptrs(),
				ffi_options.value_ptrs(),
				ffi_options.len() as _,
			)?];
			return Ok(());
		}

		Err(RegisterError::MissingFeature)
	}
}
