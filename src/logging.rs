use std::{
	ffi, fmt,
	panic::{self, AssertUnwindSafe},
	str::FromStr
};

use crate::util::char_p_to_str;

/// Severity of a message logged by ONNX Runtime, and the minimum severity an environment or session logs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
	Verbose,
	Info,
	Warning,
	Error,
	Fatal
}

impl From<LogLevel> for ortkit_sys::OrtLoggingLevel {
	fn from(value: LogLevel) -> Self {
		match value {
			LogLevel::Verbose => ortkit_sys::OrtLoggingLevel::ORT_LOGGING_LEVEL_VERBOSE,
			LogLevel::Info => ortkit_sys::OrtLoggingLevel::ORT_LOGGING_LEVEL_INFO,
			LogLevel::Warning => ortkit_sys::OrtLoggingLevel::ORT_LOGGING_LEVEL_WARNING,
			LogLevel::Error => ortkit_sys::OrtLoggingLevel::ORT_LOGGING_LEVEL_ERROR,
			LogLevel::Fatal => ortkit_sys::OrtLoggingLevel::ORT_LOGGING_LEVEL_FATAL
		}
	}
}

impl From<ortkit_sys::OrtLoggingLevel> for LogLevel {
	fn from(value: ortkit_sys::OrtLoggingLevel) -> Self {
		match value {
			ortkit_sys::OrtLoggingLevel::ORT_LOGGING_LEVEL_VERBOSE => LogLevel::Verbose,
			ortkit_sys::OrtLoggingLevel::ORT_LOGGING_LEVEL_INFO => LogLevel::Info,
			ortkit_sys::OrtLoggingLevel::ORT_LOGGING_LEVEL_WARNING => LogLevel::Warning,
			ortkit_sys::OrtLoggingLevel::ORT_LOGGING_LEVEL_ERROR => LogLevel::Error,
			ortkit_sys::OrtLoggingLevel::ORT_LOGGING_LEVEL_FATAL => LogLevel::Fatal
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLogLevelError(String);

impl fmt::Display for ParseLogLevelError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "unknown log level `{}`; expected one of `fatal`, `error`, `warning`, `info`, `verbose`", self.0)
	}
}

impl std::error::Error for ParseLogLevelError {}

impl FromStr for LogLevel {
	type Err = ParseLogLevelError;

	/// Parses the level names accepted by `ORT_LOG`, case-insensitively.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"fatal" => Ok(LogLevel::Fatal),
			"error" => Ok(LogLevel::Error),
			"warning" | "warn" => Ok(LogLevel::Warning),
			"info" => Ok(LogLevel::Info),
			"verbose" => Ok(LogLevel::Verbose),
			_ => Err(ParseLogLevelError(s.to_owned()))
		}
	}
}

macro_rules! trace {
	($($arg:tt)+) => {{
		#[cfg(feature = "tracing")]
		tracing::trace!($($arg)+);
	}}
}
macro_rules! debug {
	($($arg:tt)+) => {{
		#[cfg(feature = "tracing")]
		tracing::debug!($($arg)+);
	}}
}
macro_rules! info {
	($($arg:tt)+) => {{
		#[cfg(feature = "tracing")]
		tracing::info!($($arg)+);
	}}
}
macro_rules! warning {
	($($arg:tt)+) => {{
		#[cfg(feature = "tracing")]
		tracing::warn!($($arg)+);
	}}
}
macro_rules! error {
	($($arg:tt)+) => {{
		#[cfg(feature = "tracing")]
		tracing::error!($($arg)+);
	}}
}
pub(crate) use debug;
pub(crate) use error;
pub(crate) use info;
pub(crate) use trace;
pub(crate) use warning;

/// The log level an environment is created with unless [`EnvironmentBuilder::with_log_level`] says otherwise, read
/// from the `ORT_LOG` environment variable. Unset or unrecognized values mean [`LogLevel::Error`].
///
/// [`EnvironmentBuilder::with_log_level`]: crate::environment::EnvironmentBuilder::with_log_level
pub fn default_log_level() -> LogLevel {
	parse_log_level(std::env::var("ORT_LOG").ok().as_deref())
}

fn parse_log_level(value: Option<&str>) -> LogLevel {
	value.and_then(|v| v.parse().ok()).unwrap_or(LogLevel::Error)
}

/// Callback from C that will handle ONNX Runtime logging, forwarding its logs to the `tracing` crate.
#[cfg(feature = "tracing")]
pub(crate) extern "system" fn tracing_logger(
	_params: *mut ffi::c_void,
	severity: ortkit_sys::OrtLoggingLevel,
	_category: *const ffi::c_char,
	id: *const ffi::c_char,
	code_location: *const ffi::c_char,
	message: *const ffi::c_char
) {
	let Some(message) = char_p_to_str(message) else {
		return;
	};
	let id = char_p_to_str(id).unwrap_or_default();
	let code_location = char_p_to_str(code_location).unwrap_or_default();

	let span = tracing::span!(tracing::Level::TRACE, "ort", id = &*id, location = &*code_location);

	match severity {
		ortkit_sys::OrtLoggingLevel::ORT_LOGGING_LEVEL_VERBOSE => tracing::event!(parent: &span, tracing::Level::TRACE, "{message}"),
		ortkit_sys::OrtLoggingLevel::ORT_LOGGING_LEVEL_INFO => tracing::event!(parent: &span, tracing::Level::INFO, "{message}"),
		ortkit_sys::OrtLoggingLevel::ORT_LOGGING_LEVEL_WARNING => tracing::event!(parent: &span, tracing::Level::WARN, "{message}"),
		ortkit_sys::OrtLoggingLevel::ORT_LOGGING_LEVEL_ERROR => tracing::event!(parent: &span, tracing::Level::ERROR, "{message}"),
		ortkit_sys::OrtLoggingLevel::ORT_LOGGING_LEVEL_FATAL => tracing::event!(parent: &span, tracing::Level::ERROR, "(FATAL): {message}")
	}
}

/// `LoggerFunction` accepts the message's [`LogLevel`], its category, log ID, code location, and the message
/// itself.
pub type LoggerFunction = Box<dyn Fn(LogLevel, &str, &str, &str, &str) + Send + Sync>;

/// Callback from C for environments created with [`EnvironmentBuilder::with_logger`]. `logger` points to the
/// environment's [`LoggerFunction`], which lives for the rest of the process.
///
/// A panic in the logger must not unwind into ONNX Runtime; the message it was handling is dropped instead.
///
/// [`EnvironmentBuilder::with_logger`]: crate::environment::EnvironmentBuilder::with_logger
pub(crate) extern "system" fn custom_logger(
	logger: *mut ffi::c_void,
	severity: ortkit_sys::OrtLoggingLevel,
	category: *const ffi::c_char,
	id: *const ffi::c_char,
	code_location: *const ffi::c_char,
	message: *const ffi::c_char
) {
	if logger.is_null() {
		return;
	}
	let Some(message) = char_p_to_str(message) else {
		return;
	};
	let category = char_p_to_str(category).unwrap_or_default();
	let id = char_p_to_str(id).unwrap_or_default();
	let code_location = char_p_to_str(code_location).unwrap_or_default();

	let logger = unsafe { &*logger.cast::<LoggerFunction>() };
	let _ = panic::catch_unwind(AssertUnwindSafe(|| logger(LogLevel::from(severity), &*category, &*id, &*code_location, &*message)));
}
