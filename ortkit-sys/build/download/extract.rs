use std::{
	io::{self, Read},
	path::Path
};

use flate2::read::GzDecoder;

use super::verify::VerifyReader;
use crate::error::{Error, ResultExt};

/// Unpacks a `.tgz` stream into `output`.
///
/// The archive is untrusted until its hash has been checked; `tar` refuses entries that would land outside of `output`.
pub fn extract_tgz<R: Read>(reader: &mut R, output: &Path) -> Result<(), Error> {
	let mut archive = tar::Archive::new(GzDecoder::new(reader));
	archive.set_overwrite(true);
	archive
		.unpack(output)
		.with_context(|| format!("failed to extract archive to '{}'", output.display()))?;

	// drain the tar padding so every compressed byte passes through the hasher
	let mut decoder = archive.into_inner();
	io::copy(&mut decoder, &mut io::sink()).with_context(|| "failed to read end of archive")?;
	Ok(())
}

/// Unpacks a `.tgz` stream into `output` while hashing it, failing with [`Error::HashMismatch`] if its SHA-256 isn't
/// `expected_hash`. On a mismatch the extracted files stay in `output` for inspection, so `output` must not be a
/// directory that is later trusted as-is.
pub fn extract_verified<R: Read>(reader: R, expected_hash: &'static str, output: &Path) -> Result<(), Error> {
	let mut verified_reader = VerifyReader::new(reader);
	extract_tgz(&mut verified_reader, output)?;

	let got = verified_reader.finalize().with_context(|| "failed to finish reading download")?;
	if !got.eq_ignore_ascii_case(expected_hash) {
		return Err(Error::HashMismatch {
			expected: expected_hash,
			got,
			inspect_at: output.display().to_string()
		});
	}
	Ok(())
}
