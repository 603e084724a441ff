use std::io::{self, Read};

use sha2::{Digest, Sha256};

pub fn bytes_to_hex_str(bytes: &[u8]) -> String {
	const HEX_CHARS: &[u8] = b"0123456789ABCDEF";
	let mut s = String::with_capacity(bytes.len() * 2);
	for b in bytes {
		s.push(HEX_CHARS[(*b >> 4) as usize] as char);
		s.push(HEX_CHARS[(*b & 0xf) as usize] as char);
	}
	s
}

/// Hashes everything read through it, so the archive can be verified while it is being extracted.
pub struct VerifyReader<R> {
	reader: R,
	state: Sha256
}

impl<R: Read> VerifyReader<R> {
	pub fn new(reader: R) -> Self {
		Self { reader, state: Sha256::new() }
	}

	/// Consumes the rest of the stream and returns its SHA-256 hash as uppercase hex.
	pub fn finalize(mut self) -> io::Result<String> {
		// the gzip decoder stops at the end of its stream; anything trailing still counts towards the hash
		io::copy(&mut self, &mut io::sink())?;
		Ok(bytes_to_hex_str(&self.state.finalize()))
	}
}

impl<R: Read> Read for VerifyReader<R> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		let n = self.reader.read(buf)?;
		self.state.update(&buf[..n]);
		Ok(n)
	}
}
