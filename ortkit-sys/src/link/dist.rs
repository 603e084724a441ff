//! Prebuilt ONNX Runtime binaries available for `download-binaries`.

use super::{LinkPlan, Target};

const DIST_TABLE: &str = include_str!("dist.txt");

/// A prebuilt archive and its SHA-256 hash (uppercase hex).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Distribution {
	pub url: &'static str,
	pub hash: &'static str
}

impl Distribution {
	/// The archive's file name without `.tgz`, which is also the name of the directory it extracts to.
	pub fn archive_stem(&self) -> &'static str {
		let file_name = self.url.rsplit('/').next().unwrap_or(self.url);
		file_name.strip_suffix(".tgz").unwrap_or(file_name)
	}
}

/// The feature set to look for given the enabled GPU execution provider features.
pub fn feature_set(target: &Target, cuda: bool, directml: bool) -> &'static str {
	if cuda || (directml && target.is_windows()) { "gpu" } else { "none" }
}

pub fn find_dist(target: &str, feature_set: &str) -> Option<Distribution> {
	DIST_TABLE
		.lines()
		.filter(|line| !line.is_empty() && !line.starts_with('#'))
		.filter_map(|line| {
			let mut columns = line.split('\t');
			Some((columns.next()?, columns.next()?, columns.next()?, columns.next()?))
		})
		.find(|(set, triple, ..)| *set == feature_set && *triple == target)
		.map(|(_, _, url, hash)| Distribution { url, hash })
}

/// Looks up binaries for `target` with `feature_set`, falling back to the `none` feature set.
///
/// On failure, returns the unavailable feature set (or `None` if even the `none` set is unavailable for this target).
pub fn resolve_dist(target: &Target, feature_set: &str, plan: &mut LinkPlan) -> Result<Distribution, Option<String>> {
	plan.debug(format!("looking for prebuilt binaries matching feature set: {feature_set}"));

	let mut dist = find_dist(&target.triple, feature_set);
	if dist.is_none() && feature_set != "none" {
		plan.warning(format!("feature set '{feature_set}' not available; seeing if we can download with no features instead"));
		dist = find_dist(&target.triple, "none");
	}

	dist.ok_or_else(|| (feature_set != "none").then(|| feature_set.to_owned()))
}
