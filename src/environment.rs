//! The process-wide ONNX Runtime environment.
//!
//! ONNX Runtime allows exactly one environment per process. It is created the first time it is needed (usually by
//! [`SessionBuilder::new`](crate::session::builder::SessionBuilder::new)) with default settings, or explicitly
//! beforehand through [`init`]:
//!
//! ```no_run
//! # use ortkit::{execution_providers::CUDAExecutionProvider, logging::LogLevel};
//! # fn main() -> ortkit::Result<()> {
//! ortkit::init()
//! 	.with_name("detector")
//! 	.with_log_level(LogLevel::Warning)
//! 	.with_execution_providers([CUDAExecutionProvider::default().build()])
//! 	.commit()?;
//! # Ok(())
//! # }
//! ```

use std::{
	ffi::{CString, c_void},
	fmt, ptr,
	sync::{
		Mutex, OnceLock, PoisonError,
		atomic::{AtomicPtr, Ordering}
	}
};

use crate::{
	debug,
	error::Result,
	execution_providers::ExecutionProviderDispatch,
	logging::{self, LogLevel, LoggerFunction},
	ortsys, warn
};

static G_ENV: OnceLock<Environment> = OnceLock::new();
static G_ENV_INIT: Mutex<()> = Mutex::new(());

/// The committed environment. Obtained from [`EnvironmentBuilder::commit`] or [`get_environment`].
pub struct Environment {
	name: String,
	log_level: LogLevel,
	pub(crate) execution_providers: Vec<ExecutionProviderDispatch>,
	env_ptr: AtomicPtr<ortkit_sys::OrtEnv>,
	// kept alive for as long as ONNX Runtime may call into it, i.e. forever
	_logger: Option<Box<LoggerFunction>>
}

impl Environment {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn log_level(&self) -> LogLevel {
		self.log_level
	}

	/// Execution providers that sessions use when they don't configure their own.
	pub fn execution_providers(&self) -> &[ExecutionProviderDispatch] {
		&self.execution_providers
	}

	pub fn ptr(&self) -> *mut ortkit_sys::OrtEnv {
		self.env_ptr.load(Ordering::Relaxed)
	}
}

impl fmt::Debug for Environment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Environment")
			.field("name", &self.name)
			.field("log_level", &self.log_level)
			.field("execution_providers", &self.execution_providers)
			.field("env_ptr", &self.ptr())
			.field("custom_logger", &self._logger.is_some())
			.finish()
	}
}

/// Returns the committed environment, committing a default one first if necessary.
pub fn get_environment() -> Result<&'static Environment> {
	match G_ENV.get() {
		Some(env) => Ok(env),
		None => EnvironmentBuilder::default().commit()
	}
}

/// Returns the environment if one has been committed, without creating one.
pub fn try_get_environment() -> Option<&'static Environment> {
	G_ENV.get()
}

/// Configures the process-wide [`Environment`].
///
/// **NOTE**: Since ONNX Runtime only allows one environment per process, only the first builder to be committed has
/// any effect. Later commits return the existing environment and their configuration is ignored.
pub struct EnvironmentBuilder {
	name: String,
	log_level: LogLevel,
	execution_providers: Vec<ExecutionProviderDispatch>,
	logger: Option<LoggerFunction>,
	telemetry: bool
}

impl Default for EnvironmentBuilder {
	fn default() -> Self {
		EnvironmentBuilder {
			name: "default".to_string(),
			log_level: logging::default_log_level(),
			execution_providers: Vec::new(),
			logger: None,
			telemetry: false
		}
	}
}

impl fmt::Debug for EnvironmentBuilder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EnvironmentBuilder")
			.field("name", &self.name)
			.field("log_level", &self.log_level)
			.field("execution_providers", &self.execution_providers)
			.field("custom_logger", &self.logger.is_some())
			.field("telemetry", &self.telemetry)
			.finish()
	}
}

impl EnvironmentBuilder {
	/// Configure the environment with a given name, which ONNX Runtime uses as the log ID.
	#[must_use]
	pub fn with_name<S>(mut self, name: S) -> EnvironmentBuilder
	where
		S: Into<String>
	{
		self.name = name.into();
		self
	}

	/// Configure the minimum severity of messages ONNX Runtime logs. Defaults to the level in `ORT_LOG`, or
	/// [`LogLevel::Error`].
	#[must_use]
	pub fn with_log_level(mut self, log_level: LogLevel) -> EnvironmentBuilder {
		self.log_level = log_level;
		self
	}

	/// Configures a list of execution providers sessions created under this environment will use by default. Sessions
	/// may override these via
	/// [`SessionBuilder::with_execution_providers`](crate::session::builder::SessionBuilder::with_execution_providers).
	///
	/// Execution providers are registered in the order they are provided. A provider that fails to register is logged
	/// and skipped unless it was marked with
	/// [`ExecutionProviderDispatch::error_on_failure`](crate::execution_providers::ExecutionProviderDispatch::error_on_failure);
	/// if none of them register, ONNX Runtime falls back to the CPU.
	#[must_use]
	pub fn with_execution_providers(mut self, execution_providers: impl AsRef<[ExecutionProviderDispatch]>) -> EnvironmentBuilder {
		self.execution_providers = execution_providers.as_ref().to_vec();
		self
	}

	/// Sends ONNX Runtime's log messages to `logger` instead of `tracing`.
	///
	/// ```
	/// # use ortkit::logging::LogLevel;
	/// let builder = ortkit::init().with_logger(Box::new(|level: LogLevel, category: &str, _id: &str, location: &str, message: &str| {
	/// 	eprintln!("[{level:?}] {category} {location}: {message}");
	/// }));
	/// ```
	#[must_use]
	pub fn with_logger(mut self, logger: LoggerFunction) -> EnvironmentBuilder {
		self.logger = Some(logger);
		self
	}

	/// Enables or disables ONNX Runtime's telemetry events (only collected by official Windows builds). Telemetry is
	/// disabled unless enabled here.
	#[must_use]
	pub fn with_telemetry(mut self, enable: bool) -> EnvironmentBuilder {
		self.telemetry = enable;
		self
	}

	/// Creates the environment, or returns the existing one if an environment was already committed.
	pub fn commit(self) -> Result<&'static Environment> {
		if let Some(env) = G_ENV.get() {
			debug!(name = %env.name, "Environment already committed; ignoring new configuration");
			return Ok(env);
		}

		let _init = G_ENV_INIT.lock().unwrap_or_else(PoisonError::into_inner);
		if let Some(env) = G_ENV.get() {
			return Ok(env);
		}

		debug!(name = %self.name, log_level = ?self.log_level, "Environment not yet initialized, creating a new one");

		let cname = CString::new(self.name.clone())?;
		let mut env_ptr: *mut ortkit_sys::OrtEnv = ptr::null_mut();
		let logger = self.logger.map(Box::new);
		match &logger {
			Some(logger) => {
				let logger_param = (&**logger as *const LoggerFunction).cast_mut().cast::<c_void>();
				ortsys![unsafe CreateEnvWithCustomLogger(Some(logging::custom_logger), logger_param, self.log_level.into(), cname.as_ptr(), &mut env_ptr)?; nonNull(env_ptr)];
			}
			#[cfg(feature = "tracing")]
			None => {
				ortsys![unsafe CreateEnvWithCustomLogger(Some(logging::tracing_logger), ptr::null_mut(), self.log_level.into(), cname.as_ptr(), &mut env_ptr)?; nonNull(env_ptr)];
			}
			#[cfg(not(feature = "tracing"))]
			None => {
				ortsys![unsafe CreateEnv(self.log_level.into(), cname.as_ptr(), &mut env_ptr)?; nonNull(env_ptr)];
			}
		}
		debug!(env_ptr = ?env_ptr, "Environment created");

		if !self.telemetry {
			if let Err(e) = disable_telemetry(env_ptr) {
				warn!("Failed to disable telemetry events: {e}");
			}
		}

		let env = Environment {
			name: self.name,
			log_level: self.log_level,
			execution_providers: self.execution_providers,
			env_ptr: AtomicPtr::new(env_ptr),
			_logger: logger
		};
		Ok(G_ENV.get_or_init(|| env))
	}
}

fn disable_telemetry(env_ptr: *mut ortkit_sys::OrtEnv) -> Result<()> {
	ortsys![unsafe DisableTelemetryEvents(env_ptr)?];
	Ok(())
}

/// Creates an [`EnvironmentBuilder`] to configure the process-wide environment.
#[must_use]
pub fn init() -> EnvironmentBuilder {
	EnvironmentBuilder::default()
}

/// Like [`init`], but loads ONNX Runtime from `path` instead of the path in `ORT_DYLIB_PATH`.
///
/// Only the first call to `init_from` (or the first load of the library, whichever comes first) determines the path;
/// later paths are ignored with a warning.
#[cfg(feature = "load-dynamic")]
#[must_use]
pub fn init_from(path: impl ToString) -> EnvironmentBuilder {
	let path = path.to_string();
	let current = crate::G_ORT_DYLIB_PATH.get_or_init(|| std::sync::Arc::new(path.clone()));
	if **current != path {
		warn!(requested = %path, "ONNX Runtime dylib path was already set to `{current}`; ignoring");
	}
	EnvironmentBuilder::default()
}
