//! An in-process stand-in for ONNX Runtime: an `OrtApi` table whose functions record what they were asked to do.
//!
//! Execution providers behave like a CPU-only build that also happens to ship TensorRT, CANN, XNNPACK and QNN: CUDA
//! can't find its libraries, and OpenVINO and Vitis AI aren't compiled in.

#![allow(dead_code)]

use std::{
	ffi::{CStr, CString, c_char, c_int, c_void},
	io, ptr,
	sync::{
		Arc, Mutex, Once,
		atomic::{AtomicI32, AtomicUsize, Ordering}
	}
};

use ortkit::sys::{
	OrtApi, OrtCANNProviderOptions, OrtCUDAProviderOptionsV2, OrtEnv, OrtErrorCode, OrtLoggingFunction, OrtLoggingLevel, OrtSessionOptions, OrtStatus, OrtStatusPtr,
	OrtTensorRTProviderOptionsV2, size_t
};

pub const BUILD_INFO: &CStr = c"ORT Build Info: git-branch=fake, build type=Release";
pub const AVAILABLE_PROVIDERS: [&str; 2] = ["CUDAExecutionProvider", "CPUExecutionProvider"];
pub const CUDA_ERROR: &str = "CUDA_PATH is set but CUDA wasn't able to be loaded";

pub static ENVS_CREATED: AtomicUsize = AtomicUsize::new(0);
pub static TELEMETRY_DISABLED: AtomicUsize = AtomicUsize::new(0);
pub static SESSION_OPTIONS_RELEASED: AtomicUsize = AtomicUsize::new(0);
static GPU_DEVICE: AtomicI32 = AtomicI32::new(0);
static LAST_ENV: Mutex<Option<(String, OrtLoggingLevel)>> = Mutex::new(None);

/// Installs the fake table. Safe to call from every test.
pub fn setup() {
	static INIT: Once = Once::new();
	INIT.call_once(|| {
		// make sure nothing can pick up a real library, even if one is installed
		#[cfg(feature = "load-dynamic")]
		let _ = ortkit::init_from("/nonexistent/ortkit-tests/libonnxruntime.so");
		assert!(ortkit::set_api(fake_api()));
	});
}

/// Name and log level of the most recently created environment.
pub fn last_env() -> Option<(String, OrtLoggingLevel)> {
	LAST_ENV.lock().unwrap().clone()
}

/// What was appended to a set of session options: provider name and the options it was configured with.
pub type Appended = Vec<(String, Vec<(String, String)>)>;

pub fn appended_providers(options: *const OrtSessionOptions) -> Appended {
	unsafe { &*options.cast::<FakeSessionOptions>() }.providers.lock().unwrap().clone()
}

pub fn session_log_level(options: *const OrtSessionOptions) -> Option<c_int> {
	*unsafe { &*options.cast::<FakeSessionOptions>() }.log_level.lock().unwrap()
}

#[derive(Default)]
struct FakeSessionOptions {
	providers: Mutex<Appended>,
	log_level: Mutex<Option<c_int>>
}

#[derive(Default)]
struct FakeProviderOptions {
	entries: Vec<(String, String)>
}

struct FakeStatus {
	code: OrtErrorCode,
	message: CString
}

fn fail(code: OrtErrorCode, message: &str) -> OrtStatusPtr {
	let message = CString::new(message).unwrap();
	Box::into_raw(Box::new(FakeStatus { code, message })).cast()
}

unsafe fn string(p: *const c_char) -> String {
	if p.is_null() { String::new() } else { unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned() }
}

unsafe fn entries(keys: *const *const c_char, values: *const *const c_char, len: usize) -> Vec<(String, String)> {
	(0..len).map(|i| unsafe { (string(*keys.add(i)), string(*values.add(i))) }).collect()
}

unsafe fn record(options: *mut OrtSessionOptions, name: &str, options_entries: Vec<(String, String)>) {
	let options = unsafe { &*options.cast::<FakeSessionOptions>() };
	options.providers.lock().unwrap().push((name.to_owned(), options_entries));
}

unsafe extern "system" fn create_status(code: OrtErrorCode, msg: *const c_char) -> OrtStatusPtr {
	fail(code, &unsafe { string(msg) })
}

unsafe extern "system" fn get_error_code(status: *const OrtStatus) -> OrtErrorCode {
	unsafe { &*status.cast::<FakeStatus>() }.code
}

unsafe extern "system" fn get_error_message(status: *const OrtStatus) -> *const c_char {
	unsafe { &*status.cast::<FakeStatus>() }.message.as_ptr()
}

unsafe extern "system" fn release_status(status: *mut OrtStatus) {
	drop(unsafe { Box::from_raw(status.cast::<FakeStatus>()) });
}

unsafe fn new_env(level: OrtLoggingLevel, logid: *const c_char, out: *mut *mut OrtEnv) -> OrtStatusPtr {
	ENVS_CREATED.fetch_add(1, Ordering::SeqCst);
	*LAST_ENV.lock().unwrap() = Some((unsafe { string(logid) }, level));
	unsafe { *out = Box::into_raw(Box::new(0u8)).cast() };
	ptr::null_mut()
}

unsafe extern "system" fn create_env(level: OrtLoggingLevel, logid: *const c_char, out: *mut *mut OrtEnv) -> OrtStatusPtr {
	unsafe { new_env(level, logid, out) }
}

unsafe extern "system" fn create_env_with_custom_logger(
	logging_function: OrtLoggingFunction,
	logger_param: *mut c_void,
	level: OrtLoggingLevel,
	logid: *const c_char,
	out: *mut *mut OrtEnv
) -> OrtStatusPtr {
	let status = unsafe { new_env(level, logid, out) };
	if let Some(log) = logging_function {
		unsafe {
			log(
				logger_param,
				OrtLoggingLevel::ORT_LOGGING_LEVEL_WARNING,
				c"onnxruntime".as_ptr(),
				logid,
				c"environment.cc:42".as_ptr(),
				c"fake environment created".as_ptr()
			)
		};
	}
	status
}

unsafe extern "system" fn disable_telemetry_events(_env: *const OrtEnv) -> OrtStatusPtr {
	TELEMETRY_DISABLED.fetch_add(1, Ordering::SeqCst);
	ptr::null_mut()
}

unsafe extern "system" fn release_env(env: *mut OrtEnv) {
	drop(unsafe { Box::from_raw(env.cast::<u8>()) });
}

unsafe extern "system" fn create_session_options(out: *mut *mut OrtSessionOptions) -> OrtStatusPtr {
	unsafe { *out = Box::into_raw(Box::<FakeSessionOptions>::default()).cast() };
	ptr::null_mut()
}

unsafe extern "system" fn release_session_options(options: *mut OrtSessionOptions) {
	SESSION_OPTIONS_RELEASED.fetch_add(1, Ordering::SeqCst);
	drop(unsafe { Box::from_raw(options.cast::<FakeSessionOptions>()) });
}

unsafe extern "system" fn enable_cpu_mem_arena(options: *mut OrtSessionOptions) -> OrtStatusPtr {
	unsafe { record(options, "CPU", vec![("arena".to_owned(), "1".to_owned())]) };
	ptr::null_mut()
}

unsafe extern "system" fn disable_cpu_mem_arena(options: *mut OrtSessionOptions) -> OrtStatusPtr {
	unsafe { record(options, "CPU", vec![("arena".to_owned(), "0".to_owned())]) };
	ptr::null_mut()
}

unsafe extern "system" fn set_session_log_severity_level(options: *mut OrtSessionOptions, level: c_int) -> OrtStatusPtr {
	*unsafe { &*options.cast::<FakeSessionOptions>() }.log_level.lock().unwrap() = Some(level);
	ptr::null_mut()
}

unsafe extern "system" fn get_available_providers(out_ptr: *mut *mut *mut c_char, provider_length: *mut c_int) -> OrtStatusPtr {
	let providers: Box<[*mut c_char]> = AVAILABLE_PROVIDERS.iter().map(|p| CString::new(*p).unwrap().into_raw()).collect();
	unsafe {
		*provider_length = providers.len() as c_int;
		*out_ptr = Box::into_raw(providers).cast();
	}
	ptr::null_mut()
}

unsafe extern "system" fn release_available_providers(providers: *mut *mut c_char, len: c_int) -> OrtStatusPtr {
	let providers = unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(providers, len as usize)) };
	for p in providers.iter() {
		drop(unsafe { CString::from_raw(*p) });
	}
	ptr::null_mut()
}

unsafe extern "system" fn set_current_gpu_device_id(device_id: c_int) -> OrtStatusPtr {
	if device_id < 0 {
		return fail(OrtErrorCode::ORT_INVALID_ARGUMENT, "invalid device id");
	}
	GPU_DEVICE.store(device_id, Ordering::SeqCst);
	ptr::null_mut()
}

unsafe extern "system" fn get_current_gpu_device_id(device_id: *mut c_int) -> OrtStatusPtr {
	unsafe { *device_id = GPU_DEVICE.load(Ordering::SeqCst) };
	ptr::null_mut()
}

unsafe extern "system" fn create_provider_options<T>(out: *mut *mut T) -> OrtStatusPtr {
	unsafe { *out = Box::into_raw(Box::<FakeProviderOptions>::default()).cast() };
	ptr::null_mut()
}

unsafe extern "system" fn update_provider_options<T>(options: *mut T, keys: *const *const c_char, values: *const *const c_char, len: size_t) -> OrtStatusPtr {
	let options = unsafe { &mut *options.cast::<FakeProviderOptions>() };
	options.entries.extend(unsafe { entries(keys, values, len as usize) });
	ptr::null_mut()
}

unsafe extern "system" fn release_provider_options<T>(options: *mut T) {
	drop(unsafe { Box::from_raw(options.cast::<FakeProviderOptions>()) });
}

unsafe extern "system" fn append_cuda(_options: *mut OrtSessionOptions, _cuda_options: *const OrtCUDAProviderOptionsV2) -> OrtStatusPtr {
	fail(OrtErrorCode::ORT_EP_FAIL, CUDA_ERROR)
}

unsafe extern "system" fn append_tensorrt(options: *mut OrtSessionOptions, trt_options: *const OrtTensorRTProviderOptionsV2) -> OrtStatusPtr {
	let entries = unsafe { &*trt_options.cast::<FakeProviderOptions>() }.entries.clone();
	unsafe { record(options, "TensorRT", entries) };
	ptr::null_mut()
}

unsafe extern "system" fn append_cann(options: *mut OrtSessionOptions, cann_options: *const OrtCANNProviderOptions) -> OrtStatusPtr {
	let entries = unsafe { &*cann_options.cast::<FakeProviderOptions>() }.entries.clone();
	unsafe { record(options, "CANN", entries) };
	ptr::null_mut()
}

unsafe extern "system" fn append_by_name(
	options: *mut OrtSessionOptions,
	name: *const c_char,
	keys: *const *const c_char,
	values: *const *const c_char,
	len: size_t
) -> OrtStatusPtr {
	let name = unsafe { string(name) };
	match name.as_str() {
		"XNNPACK" | "QNN" => {
			unsafe { record(options, &name, entries(keys, values, len as usize)) };
			ptr::null_mut()
		}
		_ => fail(OrtErrorCode::ORT_INVALID_ARGUMENT, &format!("{name} execution provider is not supported in this build."))
	}
}

unsafe extern "system" fn get_build_info_string() -> *const c_char {
	BUILD_INFO.as_ptr()
}

pub fn fake_api() -> OrtApi {
	let mut api = OrtApi::empty();
	api.set_CreateStatus(create_status);
	api.set_GetErrorCode(get_error_code);
	api.set_GetErrorMessage(get_error_message);
	api.set_ReleaseStatus(release_status);
	api.set_CreateEnv(create_env);
	api.set_CreateEnvWithCustomLogger(create_env_with_custom_logger);
	api.set_DisableTelemetryEvents(disable_telemetry_events);
	api.set_ReleaseEnv(release_env);
	api.set_CreateSessionOptions(create_session_options);
	api.set_ReleaseSessionOptions(release_session_options);
	api.set_EnableCpuMemArena(enable_cpu_mem_arena);
	api.set_DisableCpuMemArena(disable_cpu_mem_arena);
	api.set_SetSessionLogSeverityLevel(set_session_log_severity_level);
	api.set_GetAvailableProviders(get_available_providers);
	api.set_ReleaseAvailableProviders(release_available_providers);
	api.set_SetCurrentGpuDeviceId(set_current_gpu_device_id);
	api.set_GetCurrentGpuDeviceId(get_current_gpu_device_id);
	api.set_CreateCUDAProviderOptions(create_provider_options::<OrtCUDAProviderOptionsV2>);
	api.set_UpdateCUDAProviderOptions(update_provider_options::<OrtCUDAProviderOptionsV2>);
	api.set_ReleaseCUDAProviderOptions(release_provider_options::<OrtCUDAProviderOptionsV2>);
	api.set_SessionOptionsAppendExecutionProvider_CUDA_V2(append_cuda);
	api.set_CreateTensorRTProviderOptions(create_provider_options::<OrtTensorRTProviderOptionsV2>);
	api.set_UpdateTensorRTProviderOptions(update_provider_options::<OrtTensorRTProviderOptionsV2>);
	api.set_ReleaseTensorRTProviderOptions(release_provider_options::<OrtTensorRTProviderOptionsV2>);
	api.set_SessionOptionsAppendExecutionProvider_TensorRT_V2(append_tensorrt);
	api.set_CreateCANNProviderOptions(create_provider_options::<OrtCANNProviderOptions>);
	api.set_UpdateCANNProviderOptions(update_provider_options::<OrtCANNProviderOptions>);
	api.set_ReleaseCANNProviderOptions(release_provider_options::<OrtCANNProviderOptions>);
	api.set_SessionOptionsAppendExecutionProvider_CANN(append_cann);
	api.set_SessionOptionsAppendExecutionProvider(append_by_name);
	api.set_GetBuildInfoString(get_build_info_string);
	api
}

/// Collects everything logged through `tracing` on the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogCapture {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.lock().unwrap().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

/// Runs `f` with a `tracing` subscriber that records every event, returning its result and the formatted log.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
	let capture = LogCapture::default();
	let writer = capture.clone();
	let subscriber = tracing_subscriber::fmt()
		.with_max_level(tracing::Level::TRACE)
		.with_ansi(false)
		.with_writer(move || writer.clone())
		.finish();
	let result = tracing::subscriber::with_default(subscriber, f);
	let log = String::from_utf8_lossy(&capture.0.lock().unwrap()).into_owned();
	(result, log)
}
