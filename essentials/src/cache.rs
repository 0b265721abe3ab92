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

//! Shared in-memory caches with explicit expiry and invalidation.

use crate::{
	api::{ApiError, DexCourtApi, FileOwner},
	constants::USER_CACHE_TTL,
	types::{Account, AccountId},
};
use log::trace;
use std::{
	collections::HashMap,
	hash::Hash,
	sync::{Arc, Mutex, MutexGuard},
	time::{Duration, Instant},
};

/// Key/value cache where entries expire `ttl` after insertion. `None` never expires.
pub struct TtlCache<K, V> {
	ttl: Option<Duration>,
	entries: Mutex<HashMap<K, (Instant, V)>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
	pub fn new(ttl: Option<Duration>) -> Self {
		Self { ttl, entries: Mutex::new(HashMap::new()) }
	}

	pub fn get(&self, key: &K) -> Option<V> {
		let mut entries = self.lock();
		let expired = match entries.get(key) {
			Some((inserted, _)) => self.ttl.is_some_and(|ttl| inserted.elapsed() >= ttl),
			None => return None,
		};
		if expired {
			entries.remove(key);
			return None
		}
		entries.get(key).map(|(_, value)| value.clone())
	}

	pub fn insert(&self, key: K, value: V) {
		self.lock().insert(key, (Instant::now(), value));
	}

	pub fn invalidate(&self, key: &K) {
		self.lock().remove(key);
	}

	pub fn clear(&self) {
		self.lock().clear();
	}

	pub fn len(&self) -> usize {
		self.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	// Entries are plain data, a panic elsewhere cannot leave them half-written.
	fn lock(&self) -> MutexGuard<'_, HashMap<K, (Instant, V)>> {
		self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}
}

/// The account list and avatar path caches shared by all views.
pub struct CacheService {
	users: TtlCache<(), Vec<Account>>,
	avatars: TtlCache<AccountId, String>,
}

impl Default for CacheService {
	fn default() -> Self {
		Self::new(Some(USER_CACHE_TTL))
	}
}

impl CacheService {
	pub fn new(user_ttl: Option<Duration>) -> Self {
		Self { users: TtlCache::new(user_ttl), avatars: TtlCache::new(None) }
	}

	pub fn users(&self) -> Option<Vec<Account>> {
		self.users.get(&())
	}

	pub fn store_users(&self, users: Vec<Account>) {
		self.users.insert((), users);
	}

	pub fn clear_user_cache(&self) {
		self.users.clear();
	}

	/// API path of the account avatar, if it has one.
	pub fn avatar_path(&self, account: &Account) -> Option<String> {
		if let Some(path) = self.avatars.get(&account.id) {
			return Some(path)
		}
		let path = FileOwner::Account(account.id).file_path(account.avatar_id?);
		self.avatars.insert(account.id, path.clone());
		Some(path)
	}

	pub fn clear_avatar_cache(&self) {
		self.avatars.clear();
	}
}

/// Account lookups backed by the cached account list.
pub struct UserDirectory<A> {
	api: Arc<A>,
	cache: Arc<CacheService>,
}

impl<A: DexCourtApi> UserDirectory<A> {
	pub fn new(api: Arc<A>, cache: Arc<CacheService>) -> Self {
		Self { api, cache }
	}

	pub async fn users(&self) -> Result<Vec<Account>, ApiError> {
		if let Some(users) = self.cache.users() {
			trace!("User cache hit");
			return Ok(users)
		}
		trace!("User cache miss");
		let users = self.api.accounts().await?;
		self.cache.store_users(users.clone());
		Ok(users)
	}

	/// Finds an account by `@username`, username or wallet address.
	pub async fn find(&self, query: &str) -> Result<Option<Account>, ApiError> {
		let needle = query.trim().trim_start_matches('@');
		Ok(self.users().await?.into_iter().find(|account| {
			[&account.username, &account.telegram_username, &account.wallet_address]
				.into_iter()
				.flatten()
				.any(|value| value.trim_start_matches('@').eq_ignore_ascii_case(needle))
		}))
	}

	pub async fn by_id(&self, id: AccountId) -> Result<Option<Account>, ApiError> {
		Ok(self.users().await?.into_iter().find(|account| account.id == id))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{api::MockDexCourtApi, test_utils::account};

	#[test]
	fn entries_expire() {
		let cache = TtlCache::new(Some(Duration::ZERO));
		cache.insert(1, "one");
		assert_eq!(cache.get(&1), None);
		assert!(cache.is_empty());

		let cache = TtlCache::new(None);
		cache.insert(1, "one");
		assert_eq!(cache.get(&1), Some("one"));
	}

	#[test]
	fn invalidates_entries() {
		let cache = TtlCache::new(Some(Duration::from_secs(60)));
		cache.insert("a", 1);
		cache.insert("b", 2);

		cache.invalidate(&"a");
		assert_eq!(cache.get(&"a"), None);
		assert_eq!(cache.get(&"b"), Some(2));

		cache.clear();
		assert_eq!(cache.len(), 0);
	}

	#[test]
	fn avatar_paths() {
		let cache = CacheService::default();
		let mut user = account(3, "carol");
		assert_eq!(cache.avatar_path(&user), None);

		user.avatar_id = Some(12);
		assert_eq!(cache.avatar_path(&user).as_deref(), Some("accounts/3/file/12"));
		// Cached per account until cleared.
		user.avatar_id = Some(13);
		assert_eq!(cache.avatar_path(&user).as_deref(), Some("accounts/3/file/12"));
		cache.clear_avatar_cache();
		assert_eq!(cache.avatar_path(&user).as_deref(), Some("accounts/3/file/13"));
	}

	#[tokio::test]
	async fn directory_reads_through_cache() {
		let mut api = MockDexCourtApi::new();
		api.expect_accounts().times(2).returning(|| Ok(vec![account(1, "alice"), account(2, "Bob")]));
		let cache = Arc::new(CacheService::default());
		let directory = UserDirectory::new(Arc::new(api), cache.clone());

		assert_eq!(directory.find("@bob").await.unwrap().map(|a| a.id), Some(2));
		assert_eq!(directory.by_id(1).await.unwrap().map(|a| a.id), Some(1));
		assert!(directory.find("mallory").await.unwrap().is_none());

		cache.clear_user_cache();
		assert_eq!(directory.users().await.unwrap().len(), 2);
	}

	#[tokio::test]
	async fn errors_are_not_cached() {
		let mut api = MockDexCourtApi::new();
		api.expect_accounts().times(1).returning(|| Err(ApiError::Timeout));
		let cache = Arc::new(CacheService::default());

		assert!(UserDirectory::new(Arc::new(api), cache.clone()).users().await.is_err());
		assert!(cache.users().is_none());
	}
}
