use std::{error::Error as StdError, ffi::c_char, fmt};

use crate::util::char_p_to_string;

/// Type alias for the `Result` type returned by `ortkit` functions.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error returned by any `ortkit` API.
///
/// Errors originating from ONNX Runtime carry the [`ErrorCode`] and message of the `OrtStatus` they were created from;
/// the status itself is released as soon as it has been read.
pub struct Error {
	code: ErrorCode,
	message: String,
	cause: Option<Box<dyn StdError + Send + Sync + 'static>>
}

impl fmt::Debug for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Error")
			.field("code", &self.code)
			.field("message", &self.message)
			.field("cause", &self.cause)
			.finish()
	}
}

impl Error {
	/// Wrap a custom, user-provided error in an [`ortkit::Error`](Error).
	pub fn wrap<T: StdError + Send + Sync + 'static>(err: T) -> Self {
		Self {
			code: ErrorCode::GenericFailure,
			message: err.to_string(),
			cause: Some(Box::new(err))
		}
	}

	/// Creates a custom [`Error`] with the given message.
	pub fn new(msg: impl Into<String>) -> Self {
		Self::new_with_code(ErrorCode::GenericFailure, msg)
	}

	/// Creates a custom [`Error`] with the given [`ErrorCode`] and message.
	pub fn new_with_code(code: ErrorCode, msg: impl Into<String>) -> Self {
		Self { code, message: msg.into(), cause: None }
	}

	/// Prefixes this error's message with `context`.
	pub(crate) fn with_context(mut self, context: impl fmt::Display) -> Self {
		self.message = format!("{context}: {}", self.message);
		self
	}

	pub fn code(&self) -> ErrorCode {
		self.code
	}

	pub fn message(&self) -> &str {
		self.message.as_str()
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.message)
	}
}

impl StdError for Error {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		self.cause.as_ref().map(|x| &**x as &dyn StdError)
	}
}

impl From<Box<dyn StdError + Send + Sync + 'static>> for Error {
	fn from(err: Box<dyn StdError + Send + Sync + 'static>) -> Self {
		Self {
			code: ErrorCode::GenericFailure,
			message: err.to_string(),
			cause: Some(err)
		}
	}
}

impl From<std::ffi::NulError> for Error {
	fn from(e: std::ffi::NulError) -> Self {
		Error::new(format!("Attempted to pass invalid string to C: {e}"))
	}
}

/// Converts an [`ortkit_sys::OrtStatusPtr`] to a [`Result`], reading its code and message and releasing it.
///
/// # Safety
/// `ptr` must be null or a valid status returned from the current API table, and must not be used afterwards.
pub unsafe fn status_to_result(ptr: ortkit_sys::OrtStatusPtr) -> Result<()> {
	if ptr.is_null() {
		return Ok(());
	}

	let api = crate::api()?;
	let code = match api.GetErrorCode() {
		Some(get_error_code) => ErrorCode::from(unsafe { get_error_code(ptr) }),
		None => ErrorCode::GenericFailure
	};
	let message = match api.GetErrorMessage() {
		Some(get_error_message) => {
			let raw: *const c_char = unsafe { get_error_message(ptr) };
			char_p_to_string(raw)
		}
		None => String::from("(error message unavailable)")
	};
	if let Some(release_status) = api.ReleaseStatus() {
		unsafe { release_status(ptr) };
	}
	Err(Error::new_with_code(code, message))
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCode {
	Ok,
	GenericFailure,
	InvalidArgument,
	NoSuchFile,
	NoModel,
	EngineError,
	RuntimeException,
	InvalidProtobuf,
	ModelLoaded,
	NotImplemented,
	InvalidGraph,
	ExecutionProviderFailure
}

impl From<ortkit_sys::OrtErrorCode> for ErrorCode {
	fn from(value: ortkit_sys::OrtErrorCode) -> Self {
		use ortkit_sys::OrtErrorCode::*;
		match value {
			ORT_OK => Self::Ok,
			ORT_FAIL => Self::GenericFailure,
			ORT_INVALID_ARGUMENT => Self::InvalidArgument,
			ORT_NO_SUCHFILE => Self::NoSuchFile,
			ORT_NO_MODEL => Self::NoModel,
			ORT_ENGINE_ERROR => Self::EngineError,
			ORT_RUNTIME_EXCEPTION => Self::RuntimeException,
			ORT_INVALID_PROTOBUF => Self::InvalidProtobuf,
			ORT_MODEL_LOADED => Self::ModelLoaded,
			ORT_NOT_IMPLEMENTED => Self::NotImplemented,
			ORT_INVALID_GRAPH => Self::InvalidGraph,
			ORT_EP_FAIL => Self::ExecutionProviderFailure
		}
	}
}

impl From<ErrorCode> for ortkit_sys::OrtErrorCode {
	fn from(value: ErrorCode) -> Self {
		match value {
			ErrorCode::Ok => Self::ORT_OK,
			ErrorCode::GenericFailure => Self::ORT_FAIL,
			ErrorCode::InvalidArgument => Self::ORT_INVALID_ARGUMENT,
			ErrorCode::NoSuchFile => Self::ORT_NO_SUCHFILE,
			ErrorCode::NoModel => Self::ORT_NO_MODEL,
			ErrorCode::EngineError => Self::ORT_ENGINE_ERROR,
			ErrorCode::RuntimeException => Self::ORT_RUNTIME_EXCEPTION,
			ErrorCode::InvalidProtobuf => Self::ORT_INVALID_PROTOBUF,
			ErrorCode::ModelLoaded => Self::ORT_MODEL_LOADED,
			ErrorCode::NotImplemented => Self::ORT_NOT_IMPLEMENTED,
			ErrorCode::InvalidGraph => Self::ORT_INVALID_GRAPH,
			ErrorCode::ExecutionProviderFailure => Self::ORT_EP_FAIL
		}
	}
}
