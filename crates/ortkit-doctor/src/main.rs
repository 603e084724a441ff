use std::{env, path::Path};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use ortkit::{
	execution_providers::*,
	session::SessionBuilder,
	sys::link::{Target, rpath}
};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Variables read while building `ortkit-sys` or loading ONNX Runtime.
const VARIABLES: &[&str] = &[
	"ORT_LIB_LOCATION",
	"ORT_LIB_PATH",
	"ORT_LIB_PROFILE",
	"ORT_PREFER_DYNAMIC_LINK",
	"ORT_SKIP_DOWNLOAD",
	"ORT_OFFLINE",
	"ORT_CXX_STDLIB",
	"CXXSTDLIB",
	"ORT_IOS_XCFWK_LOCATION",
	"ORT_EXT_IOS_XCFWK_LOCATION",
	"ORT_DYLIB_PATH",
	"ORT_LOG",
	"RUST_LOG"
];

/// Troubleshoot how ONNX Runtime is found and loaded.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
	/// Load ONNX Runtime from this path instead of `ORT_DYLIB_PATH`.
	#[arg(long, global = true, value_name = "PATH")]
	dylib: Option<String>,
	#[command(subcommand)]
	command: Command
}

#[derive(Subcommand)]
enum Command {
	/// Print the configuration variables and where the runtime would be loaded from.
	Env,
	/// Load the runtime and print its version, build info and available execution providers.
	Runtime,
	/// Register execution providers on fresh session options and report which succeeded.
	Probe {
		/// Fail on the first provider that doesn't register.
		#[arg(long)]
		strict: bool,
		/// Providers to register, in order, e.g. `cuda` or `TensorrtExecutionProvider`.
		#[arg(required = true)]
		providers: Vec<String>
	},
	/// Print the linker arguments that let a binary find ONNX Runtime next to itself.
	Rpath {
		/// Operating system to print for, e.g. `linux`, `macos` or `windows`; defaults to the one this runs on.
		#[arg(long, value_name = "OS")]
		target_os: Option<String>
	}
}

fn main() -> anyhow::Result<()> {
	tracing_subscriber::registry()
		.with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
		.with(tracing_subscriber::fmt::layer())
		.init();

	let cli = Cli::parse();
	if let Some(dylib) = &cli.dylib {
		// only records the path; nothing is loaded until the API is first needed
		let _ = ortkit::init_from(dylib);
	}

	match cli.command {
		Command::Env => print_env(),
		Command::Runtime => print_runtime()?,
		Command::Probe { strict, providers } => probe(&providers, strict)?,
		Command::Rpath { target_os } => print_rpath(target_for_os(target_os.as_deref().unwrap_or(env::consts::OS)))
	}
	Ok(())
}

fn print_env() {
	for var in VARIABLES {
		match env::var(var) {
			Ok(value) => println!("{var}={value}"),
			Err(_) => println!("{var} (unset)")
		}
	}
	println!();

	let exe_dir = env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf));
	let path = ortkit::dylib_path();
	println!("dylib path: {path}");
	println!("resolves to: {}", ortkit::resolve_dylib_path(path, exe_dir.as_deref()).display());
	match ortkit::sys::internal::dirs::cache_dir() {
		Some(dir) => println!("download cache: {}", dir.display()),
		None => println!("download cache: (no cache directory on this system)")
	}
}

fn print_runtime() -> anyhow::Result<()> {
	ortkit::api().context("failed to load ONNX Runtime")?;
	println!("expected version: {}", ortkit::sys::ORT_VERSION);
	println!("loaded version: {}", ortkit::runtime_version().unwrap_or("(unknown)"));
	println!("{}", ortkit::info()?);
	println!("available execution providers:");
	for provider in available_providers()? {
		println!("  {provider}");
	}
	Ok(())
}

fn provider_by_name(name: &str) -> anyhow::Result<ExecutionProviderDispatch> {
	let name = name.to_ascii_lowercase();
	let name = name.strip_suffix("executionprovider").unwrap_or(&name);
	Ok(match name {
		"cpu" => CPUExecutionProvider::default().build(),
		"cuda" => CUDAExecutionProvider::default().build(),
		"tensorrt" => TensorRTExecutionProvider::default().build(),
		"openvino" => OpenVINOExecutionProvider::default().build(),
		"onednn" | "dnnl" => OneDNNExecutionProvider::default().build(),
		"coreml" => CoreMLExecutionProvider::default().build(),
		"rocm" => ROCmExecutionProvider::default().build(),
		"directml" | "dml" => DirectMLExecutionProvider::default().build(),
		"nnapi" => NNAPIExecutionProvider::default().build(),
		"qnn" => QNNExecutionProvider::default().build(),
		"xnnpack" => XNNPACKExecutionProvider::default().build(),
		"acl" => ACLExecutionProvider::default().build(),
		"armnn" => ArmNNExecutionProvider::default().build(),
		"tvm" => TVMExecutionProvider::default().build(),
		"migraphx" => MIGraphXExecutionProvider::default().build(),
		"rknpu" => RKNPUExecutionProvider::default().build(),
		"cann" => CANNExecutionProvider::default().build(),
		"vitisai" | "vitis" => VitisAIExecutionProvider::default().build(),
		_ => bail!("unknown execution provider `{name}`")
	})
}

fn probe(names: &[String], strict: bool) -> anyhow::Result<()> {
	let mut providers = Vec::with_capacity(names.len());
	for name in names {
		let provider = provider_by_name(name)?;
		providers.push(if strict { provider.error_on_failure() } else { provider });
	}
	debug!(count = providers.len(), strict, "Probing execution providers");

	let options = SessionBuilder::new()?.with_execution_providers(&providers)?.build()?;
	let registered = options.registered_execution_providers();
	for provider in &providers {
		let status = if registered.contains(&provider.name()) { "registered" } else { "failed" };
		println!("{:<28} {status}", provider.name());
	}
	Ok(())
}

/// Builds a target for `os` on the architecture this runs on.
fn target_for_os(os: &str) -> Target {
	let arch = env::consts::ARCH;
	let os = os.to_ascii_lowercase();
	let os = match os.as_str() {
		"darwin" | "osx" => "macos",
		"win" | "win32" => "windows",
		other => other
	};
	let triple = match os {
		"linux" => format!("{arch}-unknown-linux-gnu"),
		"macos" => format!("{arch}-apple-darwin"),
		"ios" => format!("{arch}-apple-ios"),
		"android" => format!("{arch}-linux-android"),
		"windows" => format!("{arch}-pc-windows-msvc"),
		_ => format!("{arch}-unknown-{os}")
	};
	Target::new(triple, os, arch)
}

fn print_rpath(target: Target) {
	let args = rpath::origin_rpath_args(&target.os);
	if args.is_empty() {
		println!("{} needs no rpath; the loader searches the executable's directory", target.triple);
		return;
	}
	println!("build script:");
	for directive in rpath::plan_origin_rpath(&target).directives() {
		println!("  println!(\"{directive}\");");
	}
	if let Some(snippet) = rpath::cargo_config_snippet(&target) {
		println!("\n.cargo/config.toml:\n{snippet}");
	}
}
