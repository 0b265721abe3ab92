// Copyright 2023 Parity Technologies (UK) Ltd.
// This file is part of dexcourt-client.
//
// dexcourt-client is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// dexcourt-client is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with dexcourt-client.  If not, see <http://www.gnu.org/licenses/>.
//

//! Persisted client state: a small string key/value store.

use log::{debug, warn};
use std::{
	collections::BTreeMap,
	fs,
	path::{Path, PathBuf},
	sync::Mutex,
};
use thiserror::Error;

const STATE_FILE: &str = "state.json";

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
	#[error("cannot encode state: {0}")]
	Encode(#[from] serde_json::Error),
	#[error("store lock poisoned")]
	Poisoned,
}

pub trait KeyValueStore: Send + Sync {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
	fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
	fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Volatile store, used in tests and for one-shot commands.
#[derive(Default)]
pub struct MemoryStore {
	entries: Mutex<BTreeMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.entries.lock().map_err(|_| StoreError::Poisoned)?.get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.entries
			.lock()
			.map_err(|_| StoreError::Poisoned)?
			.insert(key.to_owned(), value.to_owned());
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		self.entries.lock().map_err(|_| StoreError::Poisoned)?.remove(key);
		Ok(())
	}
}

/// A JSON object on disk, rewritten on every change.
pub struct FileStore {
	path: PathBuf,
	entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
	pub fn open(dir: &Path) -> Result<Self, StoreError> {
		fs::create_dir_all(dir)?;
		let path = dir.join(STATE_FILE);
		let entries = match fs::read(&path) {
			Ok(raw) => serde_json::from_slice(&raw).unwrap_or_else(|e| {
				warn!("Discarding unreadable state file {}: {}", path.display(), e);
				BTreeMap::new()
			}),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
			Err(e) => return Err(e.into()),
		};
		debug!("opened state file {} with {} entries", path.display(), entries.len());

		Ok(Self { path, entries: Mutex::new(entries) })
	}

	fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
		let tmp = self.path.with_extension("json.tmp");
		fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
		fs::rename(&tmp, &self.path)?;
		Ok(())
	}
}

impl KeyValueStore for FileStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.entries.lock().map_err(|_| StoreError::Poisoned)?.get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
		let mut updated = entries.clone();
		updated.insert(key.to_owned(), value.to_owned());
		self.persist(&updated)?;
		*entries = updated;
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
		if !entries.contains_key(key) {
			return Ok(())
		}
		let mut updated = entries.clone();
		updated.remove(key);
		self.persist(&updated)?;
		*entries = updated;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn temp_dir() -> PathBuf {
		std::env::temp_dir().join(format!("dexcourt-store-{}", rand::random::<u64>()))
	}

	#[test]
	fn memory_store_roundtrip() {
		let store = MemoryStore::default();
		assert!(store.get("a").unwrap().is_none());
		store.set("a", "1").unwrap();
		assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
		store.remove("a").unwrap();
		assert!(store.get("a").unwrap().is_none());
	}

	#[test]
	fn file_store_survives_reopen() {
		let dir = temp_dir();
		{
			let store = FileStore::open(&dir).unwrap();
			store.set("authToken", "x.y.z").unwrap();
			store.set("vote_1_2", r#"{"choice":"plaintiff"}"#).unwrap();
			store.remove("vote_1_2").unwrap();
		}
		let store = FileStore::open(&dir).unwrap();
		assert_eq!(store.get("authToken").unwrap().as_deref(), Some("x.y.z"));
		assert!(store.get("vote_1_2").unwrap().is_none());

		fs::remove_dir_all(dir).unwrap();
	}

	#[test]
	fn failed_writes_leave_entries_untouched() {
		let dir = temp_dir();
		let store = FileStore::open(&dir).unwrap();
		store.set("authToken", "old").unwrap();
		fs::remove_dir_all(&dir).unwrap();

		assert!(store.set("authToken", "new").is_err());
		assert!(store.remove("authToken").is_err());
		assert_eq!(store.get("authToken").unwrap().as_deref(), Some("old"));
	}

	#[test]
	fn file_store_discards_garbage() {
		let dir = temp_dir();
		fs::create_dir_all(&dir).unwrap();
		fs::write(dir.join(STATE_FILE), b"not json").unwrap();

		let store = FileStore::open(&dir).unwrap();
		assert!(store.get("authToken").unwrap().is_none());

		fs::remove_dir_all(dir).unwrap();
	}
}
