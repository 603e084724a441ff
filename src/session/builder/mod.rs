use std::{
	mem::ManuallyDrop,
	ptr::{self, NonNull}
};

use crate::{
	environment::{self, Environment},
	error::Result,
	execution_providers::apply_execution_providers,
	ortsys
};

mod impl_options;

/// Configures native session options using the builder pattern.
///
/// Once configured, [`SessionBuilder::build`] applies the environment's default execution providers (unless the
/// builder chose its own) and hands over the finished [`SessionOptions`].
///
/// ```no_run
/// # use ortkit::{execution_providers::CPUExecutionProvider, logging::LogLevel, session::builder::SessionBuilder};
/// # fn main() -> ortkit::Result<()> {
/// let options = SessionBuilder::new()?
/// 	.with_log_level(LogLevel::Warning)?
/// 	.with_execution_providers([CPUExecutionProvider::default().with_arena_allocator(true).build()])?
/// 	.build()?;
/// assert_eq!(options.registered_execution_providers(), ["CPUExecutionProvider"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SessionBuilder {
	session_options_ptr: NonNull<ortkit_sys::OrtSessionOptions>,
	environment: &'static Environment,
	registered_execution_providers: Vec<&'static str>,
	configured_execution_providers: bool
}

impl Drop for SessionBuilder {
	fn drop(&mut self) {
		release_session_options(self.session_options_ptr);
	}
}

impl SessionBuilder {
	/// Creates a new session builder, committing a default environment first if none exists yet.
	pub fn new() -> Result<Self> {
		let environment = environment::get_environment()?;

		let mut session_options_ptr: *mut ortkit_sys::OrtSessionOptions = ptr::null_mut();
		ortsys![unsafe CreateSessionOptions(&mut session_options_ptr)?; nonNull(session_options_ptr)];

		Ok(Self {
			session_options_ptr: unsafe { NonNull::new_unchecked(session_options_ptr) },
			environment,
			registered_execution_providers: Vec::new(),
			configured_execution_providers: false
		})
	}

	pub fn ptr(&self) -> *const ortkit_sys::OrtSessionOptions {
		self.session_options_ptr.as_ptr()
	}

	pub fn ptr_mut(&mut self) -> *mut ortkit_sys::OrtSessionOptions {
		self.session_options_ptr.as_ptr()
	}

	pub fn environment(&self) -> &'static Environment {
		self.environment
	}

	/// Names of the execution providers registered so far, in registration order.
	pub fn registered_execution_providers(&self) -> &[&'static str] {
		&self.registered_execution_providers
	}

	pub(crate) fn record_execution_provider(&mut self, name: &'static str) {
		self.registered_execution_providers.push(name);
	}

	/// Finishes configuration.
	///
	/// If neither [`SessionBuilder::with_execution_providers`] nor
	/// [`SessionBuilder::with_no_environment_execution_providers`] was called, the environment's execution providers are
	/// registered first.
	pub fn build(mut self) -> Result<SessionOptions> {
		if !self.configured_execution_providers {
			let eps = self.environment.execution_providers();
			apply_execution_providers(&mut self, eps, "environment")?;
		}

		let mut this = ManuallyDrop::new(self);
		Ok(SessionOptions {
			session_options_ptr: this.session_options_ptr,
			registered_execution_providers: std::mem::take(&mut this.registered_execution_providers)
		})
	}
}

/// Session options produced by [`SessionBuilder::build`], ready to be passed to ONNX Runtime.
///
/// The native options are released when this is dropped.
#[derive(Debug)]
pub struct SessionOptions {
	session_options_ptr: NonNull<ortkit_sys::OrtSessionOptions>,
	registered_execution_providers: Vec<&'static str>
}

// Session options are plain configuration; ONNX Runtime doesn't tie them to a thread.
unsafe impl Send for SessionOptions {}

impl SessionOptions {
	pub fn ptr(&self) -> *const ortkit_sys::OrtSessionOptions {
		self.session_options_ptr.as_ptr()
	}

	pub fn ptr_mut(&mut self) -> *mut ortkit_sys::OrtSessionOptions {
		self.session_options_ptr.as_ptr()
	}

	/// Names of the execution providers that registered successfully, in the order ONNX Runtime will try them. An
	/// empty list means ONNX Runtime will use the CPU.
	pub fn registered_execution_providers(&self) -> &[&'static str] {
		&self.registered_execution_providers
	}
}

impl Drop for SessionOptions {
	fn drop(&mut self) {
		release_session_options(self.session_options_ptr);
	}
}

fn release_session_options(ptr: NonNull<ortkit_sys::OrtSessionOptions>) {
	if let Some(release) = crate::api().ok().and_then(|api| api.ReleaseSessionOptions()) {
		unsafe { release(ptr.as_ptr()) };
	}
}
