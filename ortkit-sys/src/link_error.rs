extern "C" {
	#[link_name = "\n\nThe ortkit-sys crate could not link to ONNX Runtime because:
	- `libonnxruntime` is not configured via `pkg-config`, or the `pkg-config` feature is not enabled
	- ortkit-sys was instructed not to download prebuilt binaries (`cargo build --offline`, `ORT_SKIP_DOWNLOAD`), or the `download-binaries` feature is not enabled
	- Neither `ORT_LIB_LOCATION` nor `ORT_IOS_XCFWK_LOCATION` (for iOS) were set to link to custom binaries

To rectify this:
	- Compile ONNX Runtime from source and point `ORT_LIB_LOCATION` at the build directory
	- Enable the `download-binaries` feature if the target is supported
	- Enable ortkit's `load-dynamic` feature and ship the library alongside your executable (see `ORT_DYLIB_PATH`)\n"]
	fn trigger() -> !;
}

#[used]
static X: unsafe extern "C" fn() -> ! = trigger;
