use super::{ExecutionProvider, RegisterError};
use crate::session::builder::SessionBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TVMExecutorType {
	GraphExecutor,
	VirtualMachine
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TVMTuningType {
	AutoTVM,
	Ansor
}

impl TVMTuningType {
	fn as_str(&self) -> &'static str {
		match self {
			TVMTuningType::AutoTVM => "AutoTVM",
			TVMTuningType::Ansor => "Ansor"
		}
	}
}

/// [TVM execution provider](https://onnxruntime.ai/docs/execution-providers/community-maintained/TVM-ExecutionProvider.html).
///
/// Options left as `None` are not passed, so TVM's own defaults apply.
#[derive(Debug, Default, Clone)]
pub struct TVMExecutionProvider {
	/// Executor type used by TVM. There is a choice between two types, `GraphExecutor` and `VirtualMachine`. Default is
	/// [`TVMExecutorType::VirtualMachine`].
	pub executor: Option<TVMExecutorType>,
	/// Path to folder with set of files (`.ro-`, `.so`/`.dll`-files and weights) obtained after model tuning.
	pub so_folder: Option<String>,
	/// Whether or not to perform a hash check on the model obtained in the `so_folder`.
	pub check_hash: Option<bool>,
	/// A path to a file that contains the pre-computed hash for the ONNX model located in the `so_folder` for checking
	/// when `check_hash` is `Some(true)`.
	pub hash_file_path: Option<String>,
	pub target: Option<String>,
	pub target_host: Option<String>,
	pub opt_level: Option<usize>,
	/// Whether or not all model weights are kept on compilation stage, otherwise they are downloaded on each inference.
	pub freeze_weights: Option<bool>,
	pub to_nhwc: Option<bool>,
	pub tuning_type: Option<TVMTuningType>,
	/// Path to AutoTVM or Ansor tuning file.
	pub tuning_file_path: Option<String>,
	pub input_names: Option<String>,
	pub input_shapes: Option<String>
}

super::impl_ep!(TVMExecutionProvider);

#[allow(unused)]
fn python_bool(value: bool) -> &'static str {
	if value { "True" } else { "False" }
}

impl TVMExecutionProvider {
	/// The `key:value,key:value` string TVM parses its options from.
	#[allow(unused)]
	pub(crate) fn option_string(&self) -> String {
		let mut options = Vec::new();
		if let Some(check_hash) = self.check_hash {
			options.push(format!("check_hash:{}", python_bool(check_hash)));
		}
		if let Some(executor) = self.executor {
			options.push(format!(
				"executor:{}",
				match executor {
					TVMExecutorType::GraphExecutor => "graph",
					TVMExecutorType::VirtualMachine => "vm"
				}
			));
		}
		if let Some(freeze_weights) = self.freeze_weights {
			options.push(format!("freeze_weights:{}", python_bool(freeze_weights)));
		}
		if let Some(hash_file_path) = &self.hash_file_path {
			options.push(format!("hash_file_path:{hash_file_path}"));
		}
		if let Some(input_names) = &self.input_names {
			options.push(format!("input_names:{input_names}"));
		}
		if let Some(input_shapes) = &self.input_shapes {
			options.push(format!("input_shapes:{input_shapes}"));
		}
		if let Some(opt_level) = self.opt_level {
			options.push(format!("opt_level:{opt_level}"));
		}
		if let Some(so_folder) = &self.so_folder {
			options.push(format!("so_folder:{so_folder}"));
		}
		if let Some(target) = &self.target {
			options.push(format!("target:{target}"));
		}
		if let Some(target_host) = &self.target_host {
			options.push(format!("target_host:{target_host}"));
		}
		if let Some(to_nhwc) = self.to_nhwc {
			options.push(format!("to_nhwc:{}", python_bool(to_nhwc)));
		}
		if let Some(tuning_type) = self.tuning_type {
			options.push(format!("tuning_type:{}", tuning_type.as_str()));
		}
		if let Some(tuning_file_path) = &self.tuning_file_path {
			options.push(format!("tuning_file_path:{tuning_file_path}"));
		}
		options.join(",")
	}
}

impl ExecutionProvider for TVMExecutionProvider {
	fn name(&self) -> &'static str {
		"TvmExecutionProvider"
	}

	#[allow(unused, unreachable_code)]
	fn register(&self, session_builder: &mut SessionBuilder) -> Result<(), RegisterError> {
		#[cfg(any(feature = "load-dynamic", feature = "tvm"))]
		{
			super::define_ep_register!(OrtSessionOptionsAppendExecutionProvider_Tvm(options: *mut ortkit_sys::OrtSessionOptions, opt_str: *const std::ffi::c_char) -> ortkit_sys::OrtStatusPtr);
			let options = std::ffi::CString::new(self.option_string()).map_err(crate::Error::from)?;
			return Ok(unsafe { crate::error::status_to_result(OrtSessionOptionsAppendExecutionProvider_Tvm(session_builder.ptr_mut(), options.as_ptr())) }?);
		}

		Err(RegisterError::MissingFeature)
	}
}
