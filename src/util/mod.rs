use std::{
	ffi::{CStr, c_char},
	mem::ManuallyDrop,
	ptr
};

mod map;
pub(crate) use self::map::MiniMap;

pub(crate) struct RunOnDrop<F: FnOnce()> {
	runner: ManuallyDrop<F>
}

impl<F: FnOnce()> Drop for RunOnDrop<F> {
	#[inline]
	fn drop(&mut self) {
		let runner = unsafe { ptr::read(&*self.runner) };
		runner()
	}
}

/// Runs the given closure at the end of the scope.
pub(crate) fn run_on_drop<F: FnOnce()>(f: F) -> RunOnDrop<F> {
	RunOnDrop { runner: ManuallyDrop::new(f) }
}

/// Copies a nul-terminated string owned by ONNX Runtime. Null pointers produce an empty string and invalid UTF-8 is
/// replaced.
pub(crate) fn char_p_to_string(raw: *const c_char) -> String {
	if raw.is_null() {
		return String::new();
	}
	unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned()
}

/// Like [`char_p_to_string`], but `None` for null pointers. Used for log callbacks, where a missing field should not
/// be confused with an empty one.
pub(crate) fn char_p_to_str<'a>(raw: *const c_char) -> Option<std::borrow::Cow<'a, str>> {
	if raw.is_null() {
		return None;
	}
	Some(unsafe { CStr::from_ptr(raw) }.to_string_lossy())
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use super::*;

	#[test]
	fn test_char_p_to_string() {
		assert_eq!(char_p_to_string(ptr::null()), "");
		assert_eq!(char_p_to_string(c"CUDAExecutionProvider".as_ptr()), "CUDAExecutionProvider");
		assert!(char_p_to_str(ptr::null()).is_none());
		assert_eq!(char_p_to_str(c"\xffok".as_ptr()).as_deref(), Some("\u{fffd}ok"));
	}

	#[test]
	fn test_run_on_drop() {
		let ran = Cell::new(false);
		{
			let _guard = run_on_drop(|| ran.set(true));
			assert!(!ran.get());
		}
		assert!(ran.get());
	}
}
