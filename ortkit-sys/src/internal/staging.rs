use std::{
	fs, io,
	path::{Path, PathBuf}
};

/// A temporary sibling of a directory that is only moved into place once its contents have been checked.
///
/// Anything that looks at `dest` (e.g. to decide whether binaries are already cached) never sees a half-written or
/// unverified tree. A staged directory that is never committed is left behind for inspection.
#[derive(Debug)]
pub struct StagedDir {
	path: PathBuf,
	dest: PathBuf
}

impl StagedDir {
	/// Creates `tmp.<random>_<name>` next to `dest`.
	pub fn new(dest: &Path) -> io::Result<Self> {
		let name = dest
			.file_name()
			.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("`{}` has no file name", dest.display())))?;
		let path = dest.with_file_name(format!("tmp.{}_{}", super::random_identifier(), name.to_string_lossy()));
		fs::create_dir_all(&path)?;
		Ok(Self { path, dest: dest.to_path_buf() })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Renames the staged directory to its destination. If another process committed the same destination first,
	/// theirs is kept and this one is removed.
	pub fn commit(self) -> io::Result<PathBuf> {
		match fs::rename(&self.path, &self.dest) {
			Ok(()) => Ok(self.dest),
			Err(_) if self.dest.exists() => {
				let _ = fs::remove_dir_all(&self.path);
				Ok(self.dest)
			}
			Err(e) => Err(e)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scratch() -> PathBuf {
		let dir = std::env::temp_dir().join(format!("ortkit-sys-staging-{}", crate::internal::random_identifier()));
		fs::create_dir_all(&dir).unwrap();
		dir
	}

	#[test]
	fn test_commit_moves_into_place() {
		let root = scratch();
		let dest = root.join("dfbin").join("ABCD");
		fs::create_dir_all(dest.parent().unwrap()).unwrap();

		let staged = StagedDir::new(&dest).unwrap();
		assert!(staged.path().file_name().unwrap().to_string_lossy().starts_with("tmp."));
		assert_eq!(staged.path().parent(), dest.parent());
		assert!(!dest.exists());

		fs::write(staged.path().join("libonnxruntime.so"), b"").unwrap();
		let staged_path = staged.path().to_path_buf();
		assert_eq!(staged.commit().unwrap(), dest);
		assert!(dest.join("libonnxruntime.so").exists());
		assert!(!staged_path.exists());

		let _ = fs::remove_dir_all(&root);
	}

	#[test]
	fn test_commit_after_another_process() {
		let root = scratch();
		let dest = root.join("ABCD");
		let staged = StagedDir::new(&dest).unwrap();
		fs::write(staged.path().join("ours"), b"").unwrap();

		fs::create_dir_all(&dest).unwrap();
		fs::write(dest.join("theirs"), b"").unwrap();
		let staged_path = staged.path().to_path_buf();
		assert_eq!(staged.commit().unwrap(), dest);
		assert!(dest.join("theirs").exists());
		assert!(!staged_path.exists());

		let _ = fs::remove_dir_all(&root);
	}

	#[test]
	fn test_uncommitted_is_left_for_inspection() {
		let root = scratch();
		let dest = root.join("ABCD");
		let staged = StagedDir::new(&dest).unwrap();
		let staged_path = staged.path().to_path_buf();
		drop(staged);
		assert!(staged_path.exists());
		assert!(!dest.exists());

		let _ = fs::remove_dir_all(&root);
	}
}
