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

//! Incremental paging over the list endpoints.

use crate::{
	api::{ApiError, DexCourtApi, PageQuery},
	constants::PAGE_SIZE,
	disputes::DisputeRow,
	types::Agreement,
};
use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;
use typed_builder::TypedBuilder;

/// A paged collection on the server.
#[async_trait]
pub trait PageSource: Send + Sync {
	type Item: Clone + Send;

	async fn fetch_page(&self, page: usize, page_size: usize) -> Result<Vec<Self::Item>, ApiError>;
}

pub struct AgreementPages<A> {
	api: Arc<A>,
}

impl<A> AgreementPages<A> {
	pub fn new(api: Arc<A>) -> Self {
		Self { api }
	}
}

#[async_trait]
impl<A: DexCourtApi> PageSource for AgreementPages<A> {
	type Item = Agreement;

	async fn fetch_page(&self, page: usize, page_size: usize) -> Result<Vec<Agreement>, ApiError> {
		self.api.agreements(&PageQuery::page(page, page_size)).await
	}
}

pub struct DisputePages<A> {
	api: Arc<A>,
}

impl<A> DisputePages<A> {
	pub fn new(api: Arc<A>) -> Self {
		Self { api }
	}
}

#[async_trait]
impl<A: DexCourtApi> PageSource for DisputePages<A> {
	type Item = DisputeRow;

	async fn fetch_page(&self, page: usize, page_size: usize) -> Result<Vec<DisputeRow>, ApiError> {
		let items = self.api.disputes(&PageQuery::page(page, page_size)).await?;
		Ok(items.into_iter().map(DisputeRow::from).collect())
	}
}

#[derive(Clone, Debug, TypedBuilder)]
pub struct ReconcilerOptions {
	#[builder(default = PAGE_SIZE)]
	pub page_size: usize,
}

impl Default for ReconcilerOptions {
	fn default() -> Self {
		Self::builder().build()
	}
}

type ItemFilter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Accumulates pages of `S` for "load more" style consumption.
///
/// `has_more` is a structural guess: a full page means there may be another
/// one. When the total is an exact multiple of the page size one extra empty
/// page is fetched before `has_more` turns false.
pub struct ListReconciler<S: PageSource> {
	source: S,
	options: ReconcilerOptions,
	filter: Option<ItemFilter<S::Item>>,
	items: Vec<S::Item>,
	page: usize,
	loaded: bool,
	has_more: bool,
	last_error: Option<ApiError>,
}

impl<S: PageSource> ListReconciler<S> {
	pub fn new(source: S, options: ReconcilerOptions) -> Self {
		Self {
			source,
			options,
			filter: None,
			items: Vec::new(),
			page: 0,
			loaded: false,
			has_more: true,
			last_error: None,
		}
	}

	/// Keeps only the items matching `filter`. `has_more` still follows the raw page length.
	pub fn with_filter(mut self, filter: impl Fn(&S::Item) -> bool + Send + Sync + 'static) -> Self {
		self.filter = Some(Box::new(filter));
		self
	}

	/// Fetches `page`, replacing the accumulated items when `reset` is set and
	/// appending otherwise. A failed fetch counts as an empty final page.
	pub async fn fetch_page(&mut self, page: usize, reset: bool) -> &[S::Item] {
		let page_size = self.options.page_size;
		let batch = match self.source.fetch_page(page, page_size).await {
			Ok(batch) => {
				self.last_error = None;
				batch
			},
			Err(e) => {
				warn!("Cannot fetch page {}: {}", page, e);
				self.last_error = Some(e);
				Vec::new()
			},
		};

		self.has_more = self.last_error.is_none() && batch.len() == page_size;
		let fetched = batch.len();
		let kept: Vec<S::Item> = match &self.filter {
			Some(keep) => batch.into_iter().filter(|item| keep(item)).collect(),
			None => batch,
		};
		debug!("Page {}: {} fetched, {} kept, has_more={}", page, fetched, kept.len(), self.has_more);

		if reset {
			self.items = kept;
		} else {
			self.items.extend(kept);
		}
		self.page = page;
		self.loaded = true;
		&self.items
	}

	/// First page again, dropping everything accumulated.
	pub async fn refresh(&mut self) -> &[S::Item] {
		self.fetch_page(0, true).await
	}

	/// Appends the next page, if there may be one.
	pub async fn load_more(&mut self) -> &[S::Item] {
		if !self.loaded {
			return self.refresh().await
		}
		if !self.has_more {
			return &self.items
		}
		let next = self.page + 1;
		self.fetch_page(next, false).await
	}

	pub fn items(&self) -> &[S::Item] {
		&self.items
	}

	pub fn has_more(&self) -> bool {
		self.has_more
	}

	pub fn page(&self) -> usize {
		self.page
	}

	pub fn last_error(&self) -> Option<&ApiError> {
		self.last_error.as_ref()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		api::{MockDexCourtApi, envelope::ListEnvelope},
		listing::{Identity, RegexLegacyParser, involvement_filter},
		test_utils::{account, agreement, dispute_item},
		types::{AgreementStatus, DisputeStatus},
	};
	use std::sync::Mutex;

	/// `total` numbered items served in pages; pages listed in `failing` error out.
	struct Numbers {
		total: usize,
		failing: Vec<usize>,
		calls: Mutex<Vec<usize>>,
	}

	impl Numbers {
		fn new(total: usize) -> Self {
			Self { total, failing: Vec::new(), calls: Mutex::new(Vec::new()) }
		}
	}

	#[async_trait]
	impl PageSource for Numbers {
		type Item = usize;

		async fn fetch_page(&self, page: usize, page_size: usize) -> Result<Vec<usize>, ApiError> {
			self.calls.lock().unwrap().push(page);
			if self.failing.contains(&page) {
				return Err(ApiError::Timeout)
			}
			Ok((page * page_size..((page + 1) * page_size).min(self.total)).collect())
		}
	}

	fn options(page_size: usize) -> ReconcilerOptions {
		ReconcilerOptions::builder().page_size(page_size).build()
	}

	#[tokio::test]
	async fn full_pages_mean_more() {
		let mut list = ListReconciler::new(Numbers::new(25), options(10));

		assert_eq!(list.load_more().await.len(), 10);
		assert!(list.has_more());
		assert_eq!(list.load_more().await.len(), 20);
		assert!(list.has_more());
		assert_eq!(list.load_more().await.len(), 25);
		assert!(!list.has_more());
		assert_eq!(list.page(), 2);

		// Nothing left to ask for.
		list.load_more().await;
		assert_eq!(list.source.calls.lock().unwrap().len(), 3);
	}

	#[tokio::test]
	async fn exact_multiple_needs_an_empty_page() {
		let mut list = ListReconciler::new(Numbers::new(20), options(10));

		list.load_more().await;
		list.load_more().await;
		assert!(list.has_more());

		assert_eq!(list.load_more().await.len(), 20);
		assert!(!list.has_more());
	}

	#[tokio::test]
	async fn reset_replaces_items() {
		let mut list = ListReconciler::new(Numbers::new(30), options(10));
		list.fetch_page(0, true).await;
		list.fetch_page(1, false).await;

		let items = list.fetch_page(2, true).await;

		assert_eq!(items.first(), Some(&20));
		assert_eq!(items.len(), 10);
	}

	#[tokio::test]
	async fn errors_degrade_to_final_empty_page() {
		let mut source = Numbers::new(30);
		source.failing = vec![1];
		let mut list = ListReconciler::new(source, options(10));

		list.load_more().await;
		assert_eq!(list.load_more().await.len(), 10);
		assert!(!list.has_more());
		assert!(matches!(list.last_error(), Some(ApiError::Timeout)));

		list.refresh().await;
		assert!(list.last_error().is_none());
		assert!(list.has_more());
	}

	#[tokio::test]
	async fn filters_after_paging() {
		let mut list = ListReconciler::new(Numbers::new(20), options(10)).with_filter(|n| n % 2 == 0);

		assert_eq!(list.load_more().await, &[0, 2, 4, 6, 8]);
		assert!(list.has_more());
	}

	#[tokio::test]
	async fn pages_agreements_for_a_user() {
		let mut api = MockDexCourtApi::new();
		api.expect_agreements().withf(|query| query.skip == 0 && query.top == 2).returning(|_| {
			let mut mine = agreement(1, AgreementStatus::Active);
			mine.first_party = Some(account(7, "alice"));
			Ok(vec![mine, agreement(2, AgreementStatus::Active)])
		});
		let identity = Identity { id: Some(7), ..Default::default() };

		let mut list = ListReconciler::new(AgreementPages::new(Arc::new(api)), options(2))
			.with_filter(involvement_filter(identity, Arc::new(RegexLegacyParser)));

		let items = list.refresh().await;
		assert_eq!(items.len(), 1);
		assert_eq!(items[0].id, 1);
		assert!(list.has_more());
	}

	#[tokio::test]
	async fn unknown_codes_keep_the_page_full() {
		const PAGE: &str = r#"{"results":[
			{"id":1,"title":"ok","type":1},
			{"id":2,"title":"new","type":1,"visibility":3},
			{"id":3,"type":9,"status":2}
		]}"#;
		let mut api = MockDexCourtApi::new();
		api.expect_agreements()
			.returning(|_| serde_json::from_str::<ListEnvelope<Agreement>>(PAGE).map_err(ApiError::from)?.into_items());

		let mut list = ListReconciler::new(AgreementPages::new(Arc::new(api)), options(3));

		assert_eq!(list.refresh().await.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2, 3]);
		assert!(list.has_more());
		assert!(list.last_error().is_none());
	}

	#[tokio::test]
	async fn pages_dispute_rows() {
		let mut api = MockDexCourtApi::new();
		api.expect_disputes().returning(|_| Ok(vec![dispute_item(3, DisputeStatus::VoteInProgress)]));

		let mut list = ListReconciler::new(DisputePages::new(Arc::new(api)), ReconcilerOptions::default());

		assert!(list.refresh().await[0].is_voting());
		assert!(!list.has_more());
	}
}
