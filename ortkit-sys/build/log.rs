macro_rules! debug {
	($fmt:expr) => {
		println!("[ortkit-sys] [DEBUG] {}", format!($fmt))
	};
	($fmt:expr, $($args:tt)*) => {
		println!("[ortkit-sys] [DEBUG] {}", format!($fmt, $($args)*))
	};
}
pub(crate) use debug;

macro_rules! warning {
	($fmt:expr) => {
		println!("cargo:warning=[ortkit-sys] [WARN] {}", format!($fmt))
	};
	($fmt:expr, $($args:tt)*) => {
		println!("cargo:warning=[ortkit-sys] [WARN] {}", format!($fmt, $($args)*))
	};
}
pub(crate) use warning;

/// Reports a fatal build script error. Every line of the message becomes its own `cargo::error=` line.
macro_rules! error {
	($($args:tt)*) => {
		for line in format!($($args)*).lines() {
			println!("cargo::error={line}");
		}
	};
}
pub(crate) use error;
