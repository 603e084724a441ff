/// The minor version of the ONNX Runtime C API this crate was written against.
///
/// Runtimes reporting an older `1.x` version are rejected; newer ones are accepted with a warning.
pub const ORT_API_VERSION: u32 = 17;

/// Version of the prebuilt binaries fetched by `download-binaries`.
pub const ORT_VERSION: &str = "1.17.0";
