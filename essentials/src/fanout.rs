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

//! Bounded concurrent fetches merged into a keyed map.

use futures::{StreamExt, stream};
use log::warn;
use std::{collections::HashMap, fmt::Display, future::Future, hash::Hash};

/// Runs `fetch` for every id with at most `limit` requests in flight.
///
/// Completion order does not matter: results are keyed by id. Failed fetches
/// are logged and left out of the map.
pub async fn fetch_keyed<K, V, E, F, Fut>(ids: impl IntoIterator<Item = K>, limit: usize, fetch: F) -> HashMap<K, V>
where
	K: Eq + Hash + Copy + Display,
	E: Display,
	F: Fn(K) -> Fut,
	Fut: Future<Output = Result<V, E>>,
{
	stream::iter(ids)
		.map(|id| {
			let request = fetch(id);
			async move { (id, request.await) }
		})
		.buffer_unordered(limit.max(1))
		.filter_map(|(id, result)| async move {
			match result {
				Ok(value) => Some((id, value)),
				Err(e) => {
					warn!("Fetch of {} failed: {}", id, e);
					None
				},
			}
		})
		.collect()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::{
		sync::{
			Arc,
			atomic::{AtomicUsize, Ordering},
		},
		time::Duration,
	};

	#[tokio::test]
	async fn merges_out_of_order_results() {
		let results = fetch_keyed(1..=4u64, 4, |id| async move {
			tokio::time::sleep(Duration::from_millis(40 - id * 10)).await;
			Ok::<_, String>(id * 100)
		})
		.await;

		assert_eq!(results.len(), 4);
		assert_eq!(results[&1], 100);
		assert_eq!(results[&4], 400);
	}

	#[tokio::test]
	async fn drops_failures() {
		let results = fetch_keyed([1u64, 2, 3], 2, |id| async move {
			if id == 2 { Err(format!("no dispute {id}")) } else { Ok(id) }
		})
		.await;

		assert_eq!(results.len(), 2);
		assert!(!results.contains_key(&2));
	}

	#[tokio::test]
	async fn respects_concurrency_limit() {
		let in_flight = Arc::new(AtomicUsize::new(0));
		let peak = Arc::new(AtomicUsize::new(0));

		let results = fetch_keyed(0..12u64, 5, |id| {
			let in_flight = in_flight.clone();
			let peak = peak.clone();
			async move {
				let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
				peak.fetch_max(now, Ordering::SeqCst);
				tokio::time::sleep(Duration::from_millis(5)).await;
				in_flight.fetch_sub(1, Ordering::SeqCst);
				Ok::<_, String>(id)
			}
		})
		.await;

		assert_eq!(results.len(), 12);
		assert!(peak.load(Ordering::SeqCst) <= 5);
	}
}
