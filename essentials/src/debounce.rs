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

use std::{future::Future, time::Duration};
use tokio::task::JoinHandle;

/// Runs only the last of a burst of calls, `delay` after it was made.
pub struct Debouncer {
	delay: Duration,
	pending: Option<JoinHandle<()>>,
}

impl Debouncer {
	pub fn new(delay: Duration) -> Self {
		Self { delay, pending: None }
	}

	/// Schedules `action`, cancelling whatever was scheduled before.
	pub fn call<F>(&mut self, action: F)
	where
		F: Future<Output = ()> + Send + 'static,
	{
		self.cancel();
		let delay = self.delay;
		self.pending = Some(tokio::spawn(async move {
			tokio::time::sleep(delay).await;
			action.await
		}));
	}

	pub fn cancel(&mut self) {
		if let Some(pending) = self.pending.take() {
			pending.abort();
		}
	}

	pub fn is_pending(&self) -> bool {
		self.pending.as_ref().is_some_and(|pending| !pending.is_finished())
	}
}

impl Drop for Debouncer {
	fn drop(&mut self) {
		self.cancel();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::{Arc, Mutex};

	#[tokio::test]
	async fn only_last_call_fires() {
		let seen = Arc::new(Mutex::new(Vec::new()));
		let mut debouncer = Debouncer::new(Duration::from_millis(30));

		for term in ["a", "al", "ali"] {
			let seen = seen.clone();
			debouncer.call(async move { seen.lock().unwrap().push(term) });
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
		assert!(debouncer.is_pending());
		tokio::time::sleep(Duration::from_millis(100)).await;

		assert_eq!(*seen.lock().unwrap(), vec!["ali"]);
		assert!(!debouncer.is_pending());
	}

	#[tokio::test]
	async fn dropping_cancels() {
		let seen = Arc::new(Mutex::new(0));
		{
			let seen = seen.clone();
			let mut debouncer = Debouncer::new(Duration::from_millis(10));
			debouncer.call(async move { *seen.lock().unwrap() += 1 });
		}
		tokio::time::sleep(Duration::from_millis(50)).await;

		assert_eq!(*seen.lock().unwrap(), 0);
	}
}
