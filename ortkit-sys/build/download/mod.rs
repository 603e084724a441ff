use std::{
	env,
	io::Read,
	path::{Path, PathBuf},
	time::Duration
};

use crate::{
	error::{Error, ResultExt},
	internal::{self, staging::StagedDir},
	link, log, vars
};

mod extract;
mod verify;
pub use self::extract::extract_verified;

impl From<ureq::Error> for Error {
	fn from(value: ureq::Error) -> Self {
		Self::Http(Box::new(value))
	}
}

pub fn fetch_file(source_url: &str) -> Result<impl Read + Send, Error> {
	log::debug!("downloading from '{source_url}'");

	let resp = ureq::AgentBuilder::new()
		.try_proxy_from_env(true)
		.https_only(true)
		.user_agent(&format!(
			"{}/{} (host {}; for {})",
			env!("CARGO_PKG_NAME"),
			env!("CARGO_PKG_VERSION"),
			env::var("HOST").unwrap_or_default(),
			env::var("TARGET").unwrap_or_default()
		))
		.timeout(Duration::from_secs(1800))
		.build()
		.get(source_url)
		.call()?;

	Ok(resp.into_reader())
}

/// Whether downloads are disabled by `CARGO_NET_OFFLINE`, `ORT_SKIP_DOWNLOAD` or `ORT_OFFLINE`.
pub fn should_skip() -> bool {
	vars::get("CARGO_NET_OFFLINE").as_deref() == Some("true") || vars::is_truthy(vars::get_any(vars::SKIP_DOWNLOAD).as_deref())
}

/// Downloads and verifies `dist` into the cache unless it is already there, returning the directory it was extracted
/// to (`<cache>/dfbin/<target>/<hash>`, or `OUT_DIR/dfbin/<hash>` if the cache isn't writable).
///
/// Archives are extracted into a staging directory next to the destination and only renamed into place once their hash
/// checks out, so an existing destination directory always holds verified binaries.
pub fn download(dist: &link::dist::Distribution, target: &str, out_dir: &Path) -> Result<PathBuf, Error> {
	let cached = internal::dirs::cache_dir().map(|dir| dir.join("dfbin").join(target).join(dist.hash));
	let fallback = out_dir.join("dfbin").join(dist.hash);

	let mut staged = None;
	for dest in cached.iter().chain([&fallback]) {
		if dest.exists() {
			log::debug!("using cached binaries from {}", dest.display());
			return Ok(dest.clone());
		}
		match StagedDir::new(dest) {
			Ok(dir) => {
				staged = Some(dir);
				break;
			}
			Err(e) => log::debug!("can't extract to {}: {e}", dest.display())
		}
	}
	let staged = match staged {
		Some(staged) => staged,
		None => StagedDir::new(&fallback).with_context(|| format!("failed to create a staging directory next to '{}'", fallback.display()))?
	};

	extract_verified(fetch_file(dist.url)?, dist.hash, staged.path())?;

	let staged_path = staged.path().display().to_string();
	staged.commit().with_context(|| format!("failed to move extracted binaries from '{staged_path}' into place"))
}
