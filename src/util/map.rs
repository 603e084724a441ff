use std::{borrow::Borrow, fmt, mem};

use smallvec::SmallVec;

/// Insertion-ordered map for the handful of options an execution provider takes.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct MiniMap<K, V> {
	values: SmallVec<(K, V), 6>
}

impl<K, V> Default for MiniMap<K, V> {
	fn default() -> Self {
		Self { values: SmallVec::new() }
	}
}

impl<K: Eq, V> MiniMap<K, V> {
	pub fn get<Q>(&self, key: &Q) -> Option<&V>
	where
		K: Borrow<Q>,
		Q: Eq + ?Sized
	{
		self.values.iter().find(|(k, _)| key.eq(k.borrow())).map(|(_, v)| v)
	}

	/// Inserts `value`, replacing (in place) and returning the previous value for `key`.
	pub fn insert(&mut self, key: K, value: V) -> Option<V> {
		match self.values.iter_mut().find(|(k, _)| *k == key) {
			Some((_, v)) => Some(mem::replace(v, value)),
			None => {
				self.values.push((key, value));
				None
			}
		}
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = &(K, V)> + '_ {
		self.values.iter()
	}
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for MiniMap<K, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.values.iter().map(|(k, v)| (k, v))).finish()
	}
}
