use super::{ArenaExtendStrategy, ExecutionProvider, ExecutionProviderOptions, RegisterError};
use crate::session::builder::SessionBuilder;

/// The type of search done for cuDNN convolution algorithms.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CuDNNConvAlgorithmSearch {
	/// Expensive exhaustive benchmarking using `cudnnFindConvolutionForwardAlgorithmEx`. The first run of a graph is
	/// slow while every algorithm is tried.
	#[default]
	Exhaustive,
	/// Lightweight heuristic-based search using `cudnnGetConvolutionForwardAlgorithm_v7`.
	Heuristic,
	/// Always use `CUDNN_CONVOLUTION_FWD_ALGO_IMPLICIT_PRECOMP_GEMM`. Not the default, despite the name; useful when
	/// memory is tight.
	Default
}

impl CuDNNConvAlgorithmSearch {
	fn as_str(&self) -> &'static str {
		match self {
			Self::Exhaustive => "EXHAUSTIVE",
			Self::Heuristic => "HEURISTIC",
			Self::Default => "DEFAULT"
		}
	}
}

/// [CUDA execution provider](https://onnxruntime.ai/docs/execution-providers/CUDA-ExecutionProvider.html) for NVIDIA
/// GPUs. Requires a matching CUDA & cuDNN installation at runtime; if they can't be loaded, registration fails and
/// the next provider is used.
#[derive(Debug, Default, Clone)]
pub struct CUDAExecutionProvider {
	options: ExecutionProviderOptions
}

super::impl_ep!(arbitrary; CUDAExecutionProvider);

impl CUDAExecutionProvider {
	#[must_use]
	pub fn with_device_id(mut self, device_id: i32) -> Self {
		self.options.set("device_id", device_id.to_string());
		self
	}

	/// Configure the size limit of the device memory arena in bytes.
	#[must_use]
	pub fn with_memory_limit(mut self, limit: usize) -> Self {
		self.options.set("gpu_mem_limit", limit.to_string());
		self
	}

	#[must_use]
	pub fn with_arena_extend_strategy(mut self, strategy: ArenaExtendStrategy) -> Self {
		self.options.set("arena_extend_strategy", strategy.as_str());
		self
	}

	#[must_use]
	pub fn with_conv_algorithm_search(mut self, search: CuDNNConvAlgorithmSearch) -> Self {
		self.options.set("cudnn_conv_algo_search", search.as_str());
		self
	}

	#[must_use]
	pub fn with_copy_in_default_stream(mut self, enable: bool) -> Self {
		self.options.set("do_copy_in_default_stream", if enable { "1" } else { "0" });
		self
	}

	/// Let cuDNN allocate as much workspace as it needs for the fastest convolution algorithm.
	#[must_use]
	pub fn with_conv_max_workspace(mut self, enable: bool) -> Self {
		self.options.set("cudnn_conv_use_max_workspace", if enable { "1" } else { "0" });
		self
	}

	#[must_use]
	pub fn with_cuda_graph(mut self, enable: bool) -> Self {
		self.options.set("enable_cuda_graph", if enable { "1" } else { "0" });
		self
	}

	/// Allow TF32 math on Ampere and newer GPUs.
	#[must_use]
	pub fn with_tf32(mut self, enable: bool) -> Self {
		self.options.set("use_tf32", if enable { "1" } else { "0" });
		self
	}
}

impl ExecutionProvider for CUDAExecutionProvider {
	fn name(&self) -> &'static str {
		"CUDAExecutionProvider"
	}

	fn supported_by_platform(&self) -> bool {
		cfg!(any(all(target_os = "linux", any(target_arch = "aarch64", target_arch = "x86_64")), all(target_os = "windows", target_arch = "x86_64")))
	}

	#[allow(unused, unreachable_code)]
	fn register(&self, session_builder: &mut SessionBuilder) -> Result<(), RegisterError> {
		#[cfg(any(feature = "load-dynamic", feature = "cuda"))]
		{
			use crate::{ortsys, util};

			let mut cuda_options: *mut ortkit_sys::OrtCUDAProviderOptionsV2 = std::ptr::null_mut();
			ortsys![unsafe CreateCUDAProviderOptions(&mut cuda_options)?; nonNull(cuda_options)];
			let _guard = util::run_on_drop(|| {
				if let Some(release) = crate::api().ok().and_then(|api| api.ReleaseCUDAProviderOptions()) {
					unsafe { release(cuda_options) };
				}
			});

			let ffi_options = self.options.to_ffi()?;
			if ffi_options.len() > 0 {
				ortsys![unsafe UpdateCUDAProviderOptions(cuda_options, ffi_options.key_ptrs(), ffi_options.value_ptrs(), ffi_options.len() as _)?];
			}

			ortsys![unsafe SessionOptionsAppendExecutionProvider_CUDA_V2(session_builder.ptr_mut(), cuda_options)?];
			return Ok(());
		}

		Err(RegisterError::MissingFeature)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_options() {
		let ep = CUDAExecutionProvider::default()
			.with_device_id(1)
			.with_arena_extend_strategy(ArenaExtendStrategy::SameAsRequested)
			.with_conv_algorithm_search(CuDNNConvAlgorithmSearch::Heuristic)
			.with_tf32(false);
		assert_eq!(ep.options.get("device_id"), Some("1"));
		assert_eq!(ep.options.get("arena_extend_strategy"), Some("kSameAsRequested"));
		assert_eq!(ep.options.get("cudnn_conv_algo_search"), Some("HEURISTIC"));
		assert_eq!(ep.options.get("use_tf32"), Some("0"));
	}
}
