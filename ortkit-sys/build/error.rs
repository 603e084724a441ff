use std::{fmt, io};

#[derive(Debug)]
pub enum Error {
	Http(Box<dyn std::error::Error + Send + Sync>),
	Io { context: String, source: io::Error },
	HashMismatch { expected: &'static str, got: String, inspect_at: String }
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Http(e) => write!(f, "request failed: {e}"),
			Self::Io { context, source } => write!(f, "{context}: {source}"),
			Self::HashMismatch { expected, got, inspect_at } => write!(
				f,
				"the hash of the downloaded archive does not match the expected hash\n | got {got}, expected {expected}\n | if you're using a proxy, make sure it isn't modifying responses\n | the downloaded binaries are available to inspect at: {inspect_at}"
			)
		}
	}
}

pub trait ResultExt<T> {
	fn with_context<S: fmt::Display, F: FnOnce() -> S>(self, ctx: F) -> Result<T, Error>;
}

impl<T> ResultExt<T> for io::Result<T> {
	fn with_context<S: fmt::Display, F: FnOnce() -> S>(self, ctx: F) -> Result<T, Error> {
		self.map_err(|source| Error::Io { context: ctx().to_string(), source })
	}
}
