#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

//! Linking glue and the small slice of the ONNX Runtime C API that `ortkit` needs.
//!
//! The build script of this crate decides how (and whether) ONNX Runtime is linked; see [`link`] for the planner it
//! uses, which is also available to downstream build scripts (for example to set an `$ORIGIN` rpath).

#[doc(hidden)]
pub mod internal;
pub mod link;
mod version;

#[cfg(link_error)]
mod link_error;

pub use std::ffi::{c_char, c_int, c_void};

pub use self::version::{ORT_API_VERSION, ORT_VERSION};

#[cfg(any(target_arch = "x86_64", target_arch = "x86", target_arch = "wasm32"))]
pub type size_t = usize;
#[cfg(all(target_arch = "aarch64", target_os = "windows"))]
pub type size_t = std::ffi::c_ulonglong;
#[cfg(all(any(target_arch = "aarch64", target_arch = "arm"), not(target_os = "windows")))]
pub type size_t = std::ffi::c_ulong;
#[cfg(not(any(target_arch = "x86_64", target_arch = "x86", target_arch = "wasm32", target_arch = "aarch64", target_arch = "arm")))]
pub type size_t = usize;

#[repr(i32)]
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum OrtErrorCode {
	ORT_OK = 0,
	ORT_FAIL = 1,
	ORT_INVALID_ARGUMENT = 2,
	ORT_NO_SUCHFILE = 3,
	ORT_NO_MODEL = 4,
	ORT_ENGINE_ERROR = 5,
	ORT_RUNTIME_EXCEPTION = 6,
	ORT_INVALID_PROTOBUF = 7,
	ORT_MODEL_LOADED = 8,
	ORT_NOT_IMPLEMENTED = 9,
	ORT_INVALID_GRAPH = 10,
	ORT_EP_FAIL = 11
}

#[repr(i32)]
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum OrtLoggingLevel {
	ORT_LOGGING_LEVEL_VERBOSE = 0,
	ORT_LOGGING_LEVEL_INFO = 1,
	ORT_LOGGING_LEVEL_WARNING = 2,
	ORT_LOGGING_LEVEL_ERROR = 3,
	ORT_LOGGING_LEVEL_FATAL = 4
}

macro_rules! opaque {
	($($name:ident),+) => {
		$(
			#[repr(C)]
			#[derive(Debug, Copy, Clone)]
			pub struct $name {
				_unused: [u8; 0]
			}
		)+
	};
}

opaque!(OrtStatus, OrtEnv, OrtSessionOptions, OrtCUDAProviderOptionsV2, OrtTensorRTProviderOptionsV2, OrtCANNProviderOptions);

pub type OrtStatusPtr = *mut OrtStatus;

pub type OrtLoggingFunction = Option<
	unsafe extern "system" fn(
		param: *mut c_void,
		severity: OrtLoggingLevel,
		category: *const c_char,
		logid: *const c_char,
		code_location: *const c_char,
		message: *const c_char
	)
>;

/// The helper interface used to obtain a versioned [`OrtApi`].
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct OrtApiBase {
	pub GetApi: Option<unsafe extern "system" fn(version: u32) -> *const OrtApi>,
	pub GetVersionString: Option<unsafe extern "system" fn() -> *const c_char>
}

extern "system" {
	/// Entry point of the C API. Only resolvable when ONNX Runtime is linked.
	pub fn OrtGetApiBase() -> *const OrtApiBase;
}

/// Number of leading `OrtApi` slots this crate knows about.
pub const ORT_API_TABLE_LEN: usize = 255;

/// The ONNX Runtime C API function table.
///
/// Every member of the native `OrtApi` struct is a function pointer, so the table is modelled as an array of
/// pointer-sized slots. Only the slots `ortkit` calls are given typed accessors; the positions match the C header for
/// API version 17 and later, where members are only ever appended.
///
/// A table can also be built from scratch with [`OrtApi::empty`] and the `set_*` methods, which is how alternative
/// backends (and `ortkit`'s tests) provide their own implementation.
#[repr(C)]
#[derive(Clone)]
pub struct OrtApi {
	slots: [*const c_void; ORT_API_TABLE_LEN]
}

unsafe impl Send for OrtApi {}
unsafe impl Sync for OrtApi {}

impl std::fmt::Debug for OrtApi {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OrtApi")
			.field("populated", &self.slots.iter().filter(|s| !s.is_null()).count())
			.finish()
	}
}

impl Default for OrtApi {
	fn default() -> Self {
		Self::empty()
	}
}

macro_rules! api_slots {
	($($name:ident / $setter:ident = $slot:literal: fn($($arg:ident: $ty:ty),*) $(-> $ret:ty)?;)+) => {
		impl OrtApi {
			/// A table with every slot empty.
			pub const fn empty() -> Self {
				Self { slots: [std::ptr::null(); ORT_API_TABLE_LEN] }
			}

			$(
				#[inline]
				pub fn $name(&self) -> Option<unsafe extern "system" fn($($arg: $ty),*) $(-> $ret)?> {
					let ptr = self.slots[$slot];
					if ptr.is_null() {
						None
					} else {
						// SAFETY: non-null slots hold function pointers of exactly this signature; fn pointers and data
						// pointers have the same size on every platform ONNX Runtime supports
						Some(unsafe { std::mem::transmute::<*const c_void, unsafe extern "system" fn($($ty),*) $(-> $ret)?>(ptr) })
					}
				}

				#[inline]
				pub fn $setter(&mut self, f: unsafe extern "system" fn($($arg: $ty),*) $(-> $ret)?) {
					self.slots[$slot] = f as *const c_void;
				}
			)+
		}
	};
}

api_slots! {
	CreateStatus / set_CreateStatus = 0: fn(code: OrtErrorCode, msg: *const c_char) -> OrtStatusPtr;
	GetErrorCode / set_GetErrorCode = 1: fn(status: *const OrtStatus) -> OrtErrorCode;
	GetErrorMessage / set_GetErrorMessage = 2: fn(status: *const OrtStatus) -> *const c_char;
	CreateEnv / set_CreateEnv = 3: fn(log_severity_level: OrtLoggingLevel, logid: *const c_char, out: *mut *mut OrtEnv) -> OrtStatusPtr;
	CreateEnvWithCustomLogger / set_CreateEnvWithCustomLogger = 4: fn(
		logging_function: OrtLoggingFunction,
		logger_param: *mut c_void,
		log_severity_level: OrtLoggingLevel,
		logid: *const c_char,
		out: *mut *mut OrtEnv
	) -> OrtStatusPtr;
	DisableTelemetryEvents / set_DisableTelemetryEvents = 6: fn(env: *const OrtEnv) -> OrtStatusPtr;
	CreateSessionOptions / set_CreateSessionOptions = 10: fn(options: *mut *mut OrtSessionOptions) -> OrtStatusPtr;
	EnableCpuMemArena / set_EnableCpuMemArena = 18: fn(options: *mut OrtSessionOptions) -> OrtStatusPtr;
	DisableCpuMemArena / set_DisableCpuMemArena = 19: fn(options: *mut OrtSessionOptions) -> OrtStatusPtr;
	SetSessionLogSeverityLevel / set_SetSessionLogSeverityLevel = 22: fn(options: *mut OrtSessionOptions, session_log_severity_level: c_int) -> OrtStatusPtr;
	ReleaseEnv / set_ReleaseEnv = 92: fn(input: *mut OrtEnv);
	ReleaseStatus / set_ReleaseStatus = 93: fn(input: *mut OrtStatus);
	ReleaseSessionOptions / set_ReleaseSessionOptions = 100: fn(input: *mut OrtSessionOptions);
	GetAvailableProviders / set_GetAvailableProviders = 125: fn(out_ptr: *mut *mut *mut c_char, provider_length: *mut c_int) -> OrtStatusPtr;
	ReleaseAvailableProviders / set_ReleaseAvailableProviders = 126: fn(ptr: *mut *mut c_char, providers_length: c_int) -> OrtStatusPtr;
	SetCurrentGpuDeviceId / set_SetCurrentGpuDeviceId = 160: fn(device_id: c_int) -> OrtStatusPtr;
	GetCurrentGpuDeviceId / set_GetCurrentGpuDeviceId = 161: fn(device_id: *mut c_int) -> OrtStatusPtr;
	SessionOptionsAppendExecutionProvider_TensorRT_V2 / set_SessionOptionsAppendExecutionProvider_TensorRT_V2 = 170: fn(
		options: *mut OrtSessionOptions,
		tensorrt_options: *const OrtTensorRTProviderOptionsV2
	) -> OrtStatusPtr;
	CreateTensorRTProviderOptions / set_CreateTensorRTProviderOptions = 171: fn(out: *mut *mut OrtTensorRTProviderOptionsV2) -> OrtStatusPtr;
	UpdateTensorRTProviderOptions / set_UpdateTensorRTProviderOptions = 172: fn(
		tensorrt_options: *mut OrtTensorRTProviderOptionsV2,
		provider_options_keys: *const *const c_char,
		provider_options_values: *const *const c_char,
		num_keys: size_t
	) -> OrtStatusPtr;
	ReleaseTensorRTProviderOptions / set_ReleaseTensorRTProviderOptions = 174: fn(input: *mut OrtTensorRTProviderOptionsV2);
	SessionOptionsAppendExecutionProvider_CUDA_V2 / set_SessionOptionsAppendExecutionProvider_CUDA_V2 = 204: fn(
		options: *mut OrtSessionOptions,
		cuda_options: *const OrtCUDAProviderOptionsV2
	) -> OrtStatusPtr;
	CreateCUDAProviderOptions / set_CreateCUDAProviderOptions = 205: fn(out: *mut *mut OrtCUDAProviderOptionsV2) -> OrtStatusPtr;
	UpdateCUDAProviderOptions / set_UpdateCUDAProviderOptions = 206: fn(
		cuda_options: *mut OrtCUDAProviderOptionsV2,
		provider_options_keys: *const *const c_char,
		provider_options_values: *const *const c_char,
		num_keys: size_t
	) -> OrtStatusPtr;
	ReleaseCUDAProviderOptions / set_ReleaseCUDAProviderOptions = 208: fn(input: *mut OrtCUDAProviderOptionsV2);
	SessionOptionsAppendExecutionProvider / set_SessionOptionsAppendExecutionProvider = 216: fn(
		options: *mut OrtSessionOptions,
		provider_name: *const c_char,
		provider_options_keys: *const *const c_char,
		provider_options_values: *const *const c_char,
		num_keys: size_t
	) -> OrtStatusPtr;
	SessionOptionsAppendExecutionProvider_CANN / set_SessionOptionsAppendExecutionProvider_CANN = 220: fn(
		options: *mut OrtSessionOptions,
		cann_options: *const OrtCANNProviderOptions
	) -> OrtStatusPtr;
	CreateCANNProviderOptions / set_CreateCANNProviderOptions = 221: fn(out: *mut *mut OrtCANNProviderOptions) -> OrtStatusPtr;
	UpdateCANNProviderOptions / set_UpdateCANNProviderOptions = 222: fn(
		cann_options: *mut OrtCANNProviderOptions,
		provider_options_keys: *const *const c_char,
		provider_options_values: *const *const c_char,
		num_keys: size_t
	) -> OrtStatusPtr;
	ReleaseCANNProviderOptions / set_ReleaseCANNProviderOptions = 224: fn(input: *mut OrtCANNProviderOptions);
	GetBuildInfoString / set_GetBuildInfoString = 254: fn() -> *const c_char;
}
