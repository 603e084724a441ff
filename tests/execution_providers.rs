mod common;

use ortkit::{
	ErrorCode,
	execution_providers::{
		ACLExecutionProvider, ArbitrarilyConfigurableExecutionProvider, ArmNNExecutionProvider, CANNExecutionProvider, CANNPrecisionMode,
		CPUExecutionProvider, CUDAExecutionProvider, DirectMLExecutionProvider, ExecutionProvider, ExecutionProviderDispatch,
		MIGraphXExecutionProvider, OpenVINOExecutionProvider, QNNExecutionProvider, RKNPUExecutionProvider, TVMExecutionProvider,
		TensorRTExecutionProvider, VitisAIExecutionProvider, XNNPACKExecutionProvider, available_providers, get_gpu_device, set_gpu_device
	},
	logging::LogLevel,
	session::builder::SessionBuilder
};
use test_log::test;

fn setup() {
	common::setup();
	ortkit::init()
		.with_name("execution-providers")
		.with_execution_providers([XNNPACKExecutionProvider::default().build(), CPUExecutionProvider::default().build()])
		.commit()
		.unwrap();
}

fn names(appended: &common::Appended) -> Vec<&str> {
	appended.iter().map(|(name, _)| name.as_str()).collect()
}

#[test]
fn failed_providers_are_skipped() -> ortkit::Result<()> {
	setup();

	let options = SessionBuilder::new()?
		.with_execution_providers([
			CUDAExecutionProvider::default().build(),
			TensorRTExecutionProvider::default().build(),
			OpenVINOExecutionProvider::default().build(),
			CPUExecutionProvider::default().build()
		])?
		.build()?;

	assert_eq!(options.registered_execution_providers(), ["TensorrtExecutionProvider", "CPUExecutionProvider"]);
	assert_eq!(names(&common::appended_providers(options.ptr())), ["TensorRT", "CPU"]);
	Ok(())
}

#[test]
fn error_on_failure_stops_registration() -> ortkit::Result<()> {
	setup();

	let err = SessionBuilder::new()?
		.with_execution_providers([
			TensorRTExecutionProvider::default().build(),
			CUDAExecutionProvider::default().build().error_on_failure(),
			CPUExecutionProvider::default().build()
		])
		.unwrap_err();
	assert_eq!(err.code(), ErrorCode::ExecutionProviderFailure);
	assert!(err.message().starts_with("Failed to register `CUDAExecutionProvider`"), "{err}");
	assert!(err.message().ends_with(common::CUDA_ERROR), "{err}");

	// providers marked with `error_on_failure` that do register behave like any other
	let options = SessionBuilder::new()?
		.with_execution_providers([XNNPACKExecutionProvider::default().build().error_on_failure()])?
		.build()?;
	assert_eq!(options.registered_execution_providers(), ["XnnpackExecutionProvider"]);
	Ok(())
}

#[cfg(feature = "tracing")]
#[test]
fn registration_is_logged() -> ortkit::Result<()> {
	setup();

	let (options, log) = common::capture_logs(|| {
		SessionBuilder::new()?
			.with_execution_providers([CUDAExecutionProvider::default().build(), QNNExecutionProvider::default().build()])?
			.build()
	});
	let options = options?;
	assert_eq!(options.registered_execution_providers(), ["QNNExecutionProvider"]);
	assert!(log.contains(&format!("An error occurred when attempting to register `CUDAExecutionProvider`: {}", common::CUDA_ERROR)), "{log}");
	assert!(log.contains("Successfully registered `QNNExecutionProvider`"), "{log}");
	assert!(log.contains("source=session options"), "{log}");
	assert!(!log.contains("may fall back to CPU"), "{log}");

	let (options, log) = common::capture_logs(|| {
		SessionBuilder::new()?
			.with_execution_providers([CUDAExecutionProvider::default().build(), OpenVINOExecutionProvider::default().build()])?
			.build()
	});
	assert!(options?.registered_execution_providers().is_empty());
	assert!(log.contains("OpenVINO execution provider is not supported in this build."), "{log}");
	assert!(log.contains("No execution providers from session options registered successfully; may fall back to CPU."), "{log}");
	Ok(())
}

#[test]
fn legacy_providers_fail_gracefully() -> ortkit::Result<()> {
	setup();

	// without the `directml` feature this is a missing feature; with `load-dynamic`, the entry point can't be found
	// because no real library is loaded
	let options = SessionBuilder::new()?
		.with_execution_providers([DirectMLExecutionProvider::default().build(), CPUExecutionProvider::default().build()])?
		.build()?;
	assert_eq!(options.registered_execution_providers(), ["CPUExecutionProvider"]);

	let result = SessionBuilder::new()?.with_execution_providers([DirectMLExecutionProvider::default().build().error_on_failure()]);
	assert!(result.is_err());
	Ok(())
}

#[test]
fn entry_point_providers_fail_gracefully() -> ortkit::Result<()> {
	setup();

	let legacy = || {
		[
			ACLExecutionProvider::default().with_arena_allocator(true).build(),
			ArmNNExecutionProvider::default().build(),
			TVMExecutionProvider::default().build(),
			MIGraphXExecutionProvider::default().with_device_id(1).build(),
			RKNPUExecutionProvider::default().build()
		]
	};

	let options = SessionBuilder::new()?
		.with_execution_providers(legacy().into_iter().chain([CPUExecutionProvider::default().build()]).collect::<Vec<_>>())?
		.build()?;
	assert_eq!(options.registered_execution_providers(), ["CPUExecutionProvider"]);
	assert_eq!(names(&common::appended_providers(options.ptr())), ["CPU"]);

	for provider in legacy() {
		let name = provider.name();
		let err = SessionBuilder::new()?.with_execution_providers([provider.error_on_failure()]).unwrap_err();
		assert!(err.message().starts_with(&format!("Failed to register `{name}`")), "{err}");
	}
	Ok(())
}

#[test]
fn option_map_providers() -> ortkit::Result<()> {
	setup();

	let options = SessionBuilder::new()?
		.with_execution_providers([
			VitisAIExecutionProvider::default().with_cache_dir("/tmp/vitis").build(),
			CANNExecutionProvider::default()
				.with_device_id(0)
				.with_precision_mode(CANNPrecisionMode::ForceFP16)
				.build()
		])?
		.build()?;
	assert_eq!(options.registered_execution_providers(), ["CANNExecutionProvider"]);
	assert_eq!(
		common::appended_providers(options.ptr()),
		[(
			"CANN".to_owned(),
			vec![("device_id".to_owned(), "0".to_owned()), ("precision_mode".to_owned(), "force_fp16".to_owned())]
		)]
	);

	let err = SessionBuilder::new()?
		.with_execution_providers([VitisAIExecutionProvider::default().build().error_on_failure()])
		.unwrap_err();
	assert!(err.message().ends_with("VitisAI execution provider is not supported in this build."), "{err}");
	Ok(())
}

#[test]
fn environment_providers_are_the_default() -> ortkit::Result<()> {
	setup();

	let options = SessionBuilder::new()?.build()?;
	assert_eq!(options.registered_execution_providers(), ["XnnpackExecutionProvider", "CPUExecutionProvider"]);

	let options = SessionBuilder::new()?.with_no_environment_execution_providers().build()?;
	assert!(options.registered_execution_providers().is_empty());
	assert!(common::appended_providers(options.ptr()).is_empty());

	// a session's own list replaces the environment's, even when it's empty
	let options = SessionBuilder::new()?.with_execution_providers(Vec::<ExecutionProviderDispatch>::new())?.build()?;
	assert!(options.registered_execution_providers().is_empty());

	let options = SessionBuilder::new()?
		.with_execution_providers([TensorRTExecutionProvider::default().build()])?
		.build()?;
	assert_eq!(options.registered_execution_providers(), ["TensorrtExecutionProvider"]);
	Ok(())
}

#[test]
fn provider_options_are_forwarded() -> ortkit::Result<()> {
	setup();

	let options = SessionBuilder::new()?
		.with_execution_providers([
			TensorRTExecutionProvider::default()
				.with_fp16(true)
				.with_engine_cache_path("/tmp/trt")
				.with_arbitrary_config("trt_dla_enable", "1")
				.build(),
			XNNPACKExecutionProvider::default()
				.with_intra_op_num_threads(std::num::NonZeroUsize::new(4).unwrap())
				.build(),
			CPUExecutionProvider::default().with_arena_allocator(true).build()
		])?
		.build()?;

	let pairs = |entries: &[(&str, &str)]| entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<Vec<_>>();
	assert_eq!(
		common::appended_providers(options.ptr()),
		[
			("TensorRT".to_owned(), pairs(&[("trt_fp16_enable", "1"), ("trt_engine_cache_path", "/tmp/trt"), ("trt_dla_enable", "1")])),
			("XNNPACK".to_owned(), pairs(&[("intra_op_num_threads", "4")])),
			("CPU".to_owned(), pairs(&[("arena", "1")]))
		]
	);
	Ok(())
}

#[test]
fn session_log_level() -> ortkit::Result<()> {
	setup();

	let options = SessionBuilder::new()?.with_log_level(LogLevel::Verbose)?.build()?;
	assert_eq!(common::session_log_level(options.ptr()), Some(0));
	let options = SessionBuilder::new()?.with_log_level(LogLevel::Fatal)?.build()?;
	assert_eq!(common::session_log_level(options.ptr()), Some(4));
	Ok(())
}

#[test]
fn availability() -> ortkit::Result<()> {
	setup();

	assert_eq!(available_providers()?, common::AVAILABLE_PROVIDERS);
	assert!(CUDAExecutionProvider::default().is_available()?);
	assert!(!OpenVINOExecutionProvider::default().is_available()?);
	assert!(CPUExecutionProvider::default().is_available()?);
	Ok(())
}

#[test]
fn gpu_device() -> ortkit::Result<()> {
	setup();

	set_gpu_device(1)?;
	assert_eq!(get_gpu_device()?, 1);
	assert_eq!(set_gpu_device(-1).unwrap_err().code(), ErrorCode::InvalidArgument);
	Ok(())
}
