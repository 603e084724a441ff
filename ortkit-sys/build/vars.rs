#![allow(dead_code)]

pub const SYSTEM_LIB_LOCATION: &[&str] = &["ORT_LIB_LOCATION", "ORT_LIB_PATH"];
pub const SYSTEM_LIB_PROFILE: &str = "ORT_LIB_PROFILE";
pub const IOS_XCFWK_LOCATION: &[&str] = &["ORT_IOS_XCFWK_LOCATION", "ORT_IOS_XCFWK_PATH"];
pub const IOS_EXT_XCFWK_LOCATION: &[&str] = &["ORT_EXT_IOS_XCFWK_LOCATION", "ORT_EXT_IOS_XCFWK_PATH"];
pub const PREFER_DYNAMIC_LINK: &str = "ORT_PREFER_DYNAMIC_LINK";
pub const SKIP_DOWNLOAD: &[&str] = &["ORT_SKIP_DOWNLOAD", "ORT_OFFLINE"];
pub const CXX_STDLIB: &[&str] = &[
	"ORT_CXX_STDLIB",
	// also read by the `cc` crate
	"CXXSTDLIB"
];

pub fn get(var: &str) -> Option<String> {
	println!("cargo:rerun-if-env-changed={var}");
	std::env::var(var).ok()
}

pub fn get_any(vars: &[&str]) -> Option<String> {
	let mut found = None;
	for var in vars {
		// still visit every alias so each one gets a rerun-if-env-changed
		let value = get(var);
		if found.is_none() {
			found = value;
		}
	}
	found
}

/// `1` or `true` (in any case).
pub fn is_truthy(value: Option<&str>) -> bool {
	value.is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}
