use super::{ArenaExtendStrategy, ExecutionProvider, ExecutionProviderOptions, RegisterError};
use crate::session::builder::SessionBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CANNPrecisionMode {
	/// Convert to float32 first according to operator implementation
	ForceFP32,
	/// Convert to float16 when float16 and float32 are both supported
	ForceFP16,
	/// Convert to float16 when float32 is not supported
	AllowFP32ToFP16,
	/// Keep dtypes as is
	MustKeepOrigin,
	/// Allow mixed precision
	AllowMixedPrecision
}

impl CANNPrecisionMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			CANNPrecisionMode::ForceFP32 => "force_fp32",
			CANNPrecisionMode::ForceFP16 => "force_fp16",
			CANNPrecisionMode::AllowFP32ToFP16 => "allow_fp32_to_fp16",
			CANNPrecisionMode::MustKeepOrigin => "must_keep_origin_dtype",
			CANNPrecisionMode::AllowMixedPrecision => "allow_mix_precision"
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CANNImplementationMode {
	HighPrecision,
	HighPerformance
}

impl CANNImplementationMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			CANNImplementationMode::HighPrecision => "high_precision",
			CANNImplementationMode::HighPerformance => "high_performance"
		}
	}
}

/// [CANN execution provider](https://onnxruntime.ai/docs/execution-providers/community-maintained/CANN-ExecutionProvider.html)
/// for Huawei Ascend AI devices.
#[derive(Debug, Default, Clone)]
pub struct CANNExecutionProvider {
	options: ExecutionProviderOptions
}

super::impl_ep!(arbitrary; CANNExecutionProvider);

impl CANNExecutionProvider {
	#[must_use]
	pub fn with_device_id(mut self, device_id: i32) -> Self {
		self.options.set("device_id", device_id.to_string());
		self
	}

	/// Configure the size limit of the device memory arena in bytes. This size limit is only for the execution
	/// provider's arena; the total device memory usage may be higher.
	#[must_use]
	pub fn with_memory_limit(mut self, limit: usize) -> Self {
		self.options.set("npu_mem_limit", limit.to_string());
		self
	}

	#[must_use]
	pub fn with_arena_extend_strategy(mut self, strategy: ArenaExtendStrategy) -> Self {
		self.options.set("arena_extend_strategy", strategy.as_str());
		self
	}

	/// Use the graph inference engine. If `false`, CANN falls back to the single-operator inference engine.
	#[must_use]
	pub fn with_cann_graph(mut self, enable: bool) -> Self {
		self.options.set("enable_cann_graph", if enable { "1" } else { "0" });
		self
	}

	#[must_use]
	pub fn with_dump_graphs(mut self, enable: bool) -> Self {
		self.options.set("dump_graphs", if enable { "1" } else { "0" });
		self
	}

	#[must_use]
	pub fn with_precision_mode(mut self, mode: CANNPrecisionMode) -> Self {
		self.options.set("precision_mode", mode.as_str());
		self
	}

	#[must_use]
	pub fn with_implementation_mode(mut self, mode: CANNImplementationMode) -> Self {
		self.options.set("op_select_impl_mode", mode.as_str());
		self
	}

	/// Operators (comma separated) that use the mode set by [`CANNExecutionProvider::with_implementation_mode`].
	#[must_use]
	pub fn with_implementation_mode_oplist(mut self, list: impl ToString) -> Self {
		self.options.set("optypelist_for_implmode", list.to_string());
		self
	}
}

impl ExecutionProvider for CANNExecutionProvider {
	fn name(&self) -> &'static str {
		"CANNExecutionProvider"
	}

	fn supported_by_platform(&self) -> bool {
		cfg!(all(target_os = "linux", any(target_arch = "aarch64", target_arch = "x86_64")))
	}

	#[allow(unused, unreachable_code)]
	fn register(&self, session_builder: &mut SessionBuilder) -> Result<(), RegisterError> {
		#[cfg(any(feature = "load-dynamic", feature = "cann"))]
		{
			use crate::{ortsys, util};

			let mut cann_options: *mut ortkit_sys::OrtCANNProviderOptions = std::ptr::null_mut();
			ortsys![unsafe CreateCANNProviderOptions(&mut cann_options)?; nonNull(cann_options)];
			let _guard = util::run_on_drop(|| {
				if let Some(release) = crate::api().ok().and_then(|api| api.ReleaseCANNProviderOptions()) {
					unsafe { release(cann_options) };
				}
			});

			let ffi_options = self.options.to_ffi()?;
			if ffi_options.len() > 0 {
				ortsys![unsafe UpdateCANNProviderOptions(cann_options, ffi_options.key_ptrs(), ffi_options.value_ptrs(), ffi_options.len() as _)?];
			}

			ortsys![unsafe SessionOptionsAppendExecutionProvider_CANN(session_builder.ptr_mut(), cann_options)?];
			return Ok(());
		}

		Err(RegisterError::MissingFeature)
	}
}
