use super::SessionBuilder;
use crate::{
	error::Result,
	execution_providers::{ExecutionProviderDispatch, apply_execution_providers},
	logging::LogLevel,
	ortsys
};

impl SessionBuilder {
	/// Registers a list of execution providers for this session. Execution providers are registered in the order they
	/// are provided.
	///
	/// A provider that fails to register is logged and skipped, and ONNX Runtime falls back to the next one, and
	/// eventually the CPU. Mark a provider with
	/// [`ExecutionProviderDispatch::error_on_failure`] to get an error instead.
	///
	/// Calling this replaces the environment's default execution providers for this session, even if the list is empty.
	///
	/// ## Notes
	///
	/// - **Indiscriminate use of [`SessionBuilder::with_execution_providers`] in a library** (e.g. always enabling
	///   `CUDAExecutionProvider`) **is discouraged** unless you allow the user to configure the execution providers by
	///   providing a `Vec` of [`ExecutionProviderDispatch`]es.
	pub fn with_execution_providers(mut self, execution_providers: impl AsRef<[ExecutionProviderDispatch]>) -> Result<Self> {
		self.configured_execution_providers = true;
		apply_execution_providers(&mut self, execution_providers.as_ref(), "session options")?;
		Ok(self)
	}

	/// Don't register the environment's default execution providers on this session.
	#[must_use]
	pub fn with_no_environment_execution_providers(mut self) -> Self {
		self.configured_execution_providers = true;
		self
	}

	/// Sets the minimum severity of messages logged for sessions created from these options.
	pub fn with_log_level(mut self, log_level: LogLevel) -> Result<Self> {
		let level = ortkit_sys::OrtLoggingLevel::from(log_level) as ortkit_sys::c_int;
		ortsys![unsafe SetSessionLogSeverityLevel(self.ptr_mut(), level)?];
		Ok(self)
	}
}
