use super::{ExecutionProvider, ExecutionProviderOptions, RegisterError};
use crate::session::builder::SessionBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QNNProfilingLevel {
	Off,
	Basic,
	Detailed
}

impl QNNProfilingLevel {
	pub fn as_str(&self) -> &'static str {
		match self {
			QNNProfilingLevel::Off => "off",
			QNNProfilingLevel::Basic => "basic",
			QNNProfilingLevel::Detailed => "detailed"
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QNNPerformanceMode {
	Default,
	Burst,
	Balanced,
	HighPerformance,
	HighPowerSaver,
	LowPowerSaver,
	LowBalanced,
	PowerSaver,
	SustainedHighPerformance
}

impl QNNPerformanceMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			QNNPerformanceMode::Default => "default",
			QNNPerformanceMode::Burst => "burst",
			QNNPerformanceMode::Balanced => "balanced",
			QNNPerformanceMode::HighPerformance => "high_performance",
			QNNPerformanceMode::HighPowerSaver => "high_power_saver",
			QNNPerformanceMode::LowPowerSaver => "low_power_saver",
			QNNPerformanceMode::LowBalanced => "low_balanced",
			QNNPerformanceMode::PowerSaver => "power_saver",
			QNNPerformanceMode::SustainedHighPerformance => "sustained_high_performance"
		}
	}
}

/// [Qualcomm AI Engine Direct execution provider](https://onnxruntime.ai/docs/execution-providers/QNN-ExecutionProvider.html)
/// for Qualcomm NPUs.
///
/// A backend library must be configured with [`QNNExecutionProvider::with_backend_path`], e.g. `QnnHtp.dll` for the
/// NPU or `QnnCpu.dll` for the reference CPU backend.
#[derive(Debug, Default, Clone)]
pub struct QNNExecutionProvider {
	options: ExecutionProviderOptions
}

super::impl_ep!(arbitrary; QNNExecutionProvider);

impl QNNExecutionProvider {
	#[must_use]
	pub fn with_backend_path(mut self, path: impl ToString) -> Self {
		self.options.set("backend_path", path.to_string());
		self
	}

	#[must_use]
	pub fn with_profiling(mut self, level: QNNProfilingLevel) -> Self {
		self.options.set("profiling_level", level.as_str());
		self
	}

	#[must_use]
	pub fn with_performance_mode(mut self, mode: QNNPerformanceMode) -> Self {
		self.options.set("htp_performance_mode", mode.as_str());
		self
	}

	#[must_use]
	pub fn with_device_id(mut self, device: i32) -> Self {
		self.options.set("device_id", device.to_string());
		self
	}
}

impl ExecutionProvider for QNNExecutionProvider {
	fn name(&self) -> &'static str {
		"QNNExecutionProvider"
	}

	fn supported_by_platform(&self) -> bool {
		cfg!(any(target_os = "android", all(target_arch = "aarch64", any(target_os = "windows", target_os = "linux"))))
	}

	#[allow(unused, unreachable_code)]
	fn register(&self, session_builder: &mut SessionBuilder) -> Result<(), RegisterError> {
		#[cfg(any(feature = "load-dynamic", feature = "qnn"))]
		{
			use crate::ortsys;

			let ffi_options = self.options.to_ffi()?;
			ortsys![unsafe SessionOptionsAppendExecutionProvider(
				session_builder.ptr_mut(),
				c"QNN".as_ptr(),
				ffi_options.key_ptrs(),
				ffi_options.value_ptrs(),
				ffi_options.len() as _,
			)?];
			return Ok(());
		}

		Err(RegisterError::MissingFeature)
	}
}
