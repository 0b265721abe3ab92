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

//! Dispute rows and outcome retrieval.

use crate::{
	api::{ApiError, DexCourtApi, PageQuery},
	constants::{MAX_CONCURRENT_REQUESTS, PAGE_SIZE},
	fanout::fetch_keyed,
	types::{
		Account, AccountId, AgreementId, DefenseResponse, DisputeDetails, DisputeId, DisputeListItem, DisputeStatus,
		FileRef,
	},
	voting::outcome::{VoteCalculationResult, VoteOutcomeData, calculate_vote_results},
};
use log::{debug, warn};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};

/// Either API shape a dispute row can be built from.
#[derive(Debug, Clone)]
pub enum DisputeSource {
	Details(DisputeDetails),
	ListItem(DisputeListItem),
}

/// Flat view of a dispute. Fields the source shape lacks are left empty.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DisputeRow {
	pub id: DisputeId,
	pub title: String,
	pub description: String,
	pub claim: String,
	pub status: DisputeStatus,
	pub agreement_id: Option<AgreementId>,
	pub agreement_title: Option<String>,
	pub plaintiff: Option<Account>,
	pub defendant: Option<Account>,
	pub evidence: Vec<FileRef>,
	pub plaintiff_witnesses: Vec<Account>,
	pub defendant_witnesses: Vec<Account>,
	pub defense: Option<DefenseResponse>,
	pub created_at: Option<String>,
	pub updated_at: Option<String>,
	pub voting_id: Option<String>,
	pub voting_started_at: Option<String>,
	pub voting_ends_at: Option<String>,
}

impl DisputeRow {
	pub fn is_voting(&self) -> bool {
		self.status == DisputeStatus::VoteInProgress
	}

	/// Whether the account is plaintiff or defendant.
	pub fn involves(&self, account: AccountId) -> bool {
		[&self.plaintiff, &self.defendant].into_iter().flatten().any(|party| party.id == account)
	}
}

impl From<DisputeSource> for DisputeRow {
	fn from(source: DisputeSource) -> Self {
		match source {
			DisputeSource::Details(details) => DisputeRow {
				id: details.id,
				title: details.title,
				description: details.description,
				claim: details.claim.unwrap_or_default(),
				status: details.status,
				agreement_id: details.agreement.as_ref().map(|agreement| agreement.id),
				agreement_title: details.agreement.map(|agreement| agreement.title).filter(|title| !title.is_empty()),
				plaintiff: details.plaintiff,
				defendant: details.defendant,
				evidence: details.evidence,
				plaintiff_witnesses: details.witnesses.plaintiff,
				defendant_witnesses: details.witnesses.defendant,
				defense: details.defendant_response,
				created_at: details.created_at,
				updated_at: details.updated_at,
				voting_id: details.voting_id,
				voting_started_at: details.voting_started_at,
				voting_ends_at: details.voting_ends_at,
			},
			DisputeSource::ListItem(item) => DisputeRow {
				id: item.id,
				title: item.title,
				claim: item.claim.unwrap_or_default(),
				status: item.status,
				agreement_id: item.agreement_id,
				plaintiff: item.plaintiff,
				defendant: item.defendant,
				created_at: item.created_at,
				voting_id: item.voting_id,
				voting_ends_at: item.voting_ends_at,
				..Default::default()
			},
		}
	}
}

impl From<DisputeDetails> for DisputeRow {
	fn from(details: DisputeDetails) -> Self {
		DisputeSource::Details(details).into()
	}
}

impl From<DisputeListItem> for DisputeRow {
	fn from(item: DisputeListItem) -> Self {
		DisputeSource::ListItem(item).into()
	}
}

/// Raw outcome of a dispute vote with its weighted evaluation.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DisputeOutcome {
	pub data: VoteOutcomeData,
	pub result: VoteCalculationResult,
}

pub struct DisputeService<A> {
	api: Arc<A>,
	page_size: usize,
}

impl<A: DexCourtApi> DisputeService<A> {
	pub fn new(api: Arc<A>) -> Self {
		Self { api, page_size: PAGE_SIZE }
	}

	pub fn with_page_size(mut self, page_size: usize) -> Self {
		self.page_size = page_size;
		self
	}

	pub async fn vote_outcome(&self, id: DisputeId) -> Result<DisputeOutcome, ApiError> {
		let data = self.api.vote_outcome(id).await?;
		let result = calculate_vote_results(&data);
		debug!("Dispute {} outcome: {:?}", id, result);
		Ok(DisputeOutcome { data, result })
	}

	pub async fn dispute(&self, id: DisputeId) -> Result<DisputeRow, ApiError> {
		Ok(self.api.dispute(id).await?.into())
	}

	/// A page of dispute rows. Errors yield an empty page.
	pub async fn rows(&self, page: usize) -> Vec<DisputeRow> {
		match self.api.disputes(&PageQuery::page(page, self.page_size)).await {
			Ok(items) => items.into_iter().map(DisputeRow::from).collect(),
			Err(e) => {
				warn!("Cannot fetch disputes page {}: {}", page, e);
				Vec::new()
			},
		}
	}

	/// Full rows for `ids`, fetched concurrently. Missing entries failed to load.
	pub async fn details_for(&self, ids: impl IntoIterator<Item = DisputeId>) -> HashMap<DisputeId, DisputeRow> {
		let api = &self.api;
		fetch_keyed(ids, MAX_CONCURRENT_REQUESTS, move |id| async move {
			api.dispute(id).await.map(DisputeRow::from)
		})
		.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		api::MockDexCourtApi,
		test_utils::{account, dispute_item},
		types::{AgreementRef, Winner, Witnesses},
		voting::outcome::{GroupVotes, PerGroup},
	};

	fn details(id: DisputeId) -> DisputeDetails {
		DisputeDetails {
			id,
			title: "Late delivery".into(),
			description: "Never shipped".into(),
			claim: Some("Refund".into()),
			status: DisputeStatus::VoteInProgress,
			agreement: Some(AgreementRef { id: 3, title: "Shipping".into() }),
			plaintiff: Some(account(1, "alice")),
			defendant: Some(account(2, "bob")),
			witnesses: Witnesses { plaintiff: vec![account(5, "carol")], defendant: vec![] },
			..Default::default()
		}
	}

	#[test]
	fn projects_details() {
		let row = DisputeRow::from(details(9));

		assert_eq!(row.agreement_id, Some(3));
		assert_eq!(row.agreement_title.as_deref(), Some("Shipping"));
		assert_eq!(row.plaintiff_witnesses.len(), 1);
		assert_eq!(row.claim, "Refund");
		assert!(row.is_voting());
		assert!(row.involves(2));
		assert!(!row.involves(5));
	}

	#[test]
	fn list_items_leave_details_empty() {
		let row = DisputeRow::from(dispute_item(4, DisputeStatus::Settled));

		assert_eq!(row.id, 4);
		assert!(row.description.is_empty());
		assert!(row.claim.is_empty());
		assert!(row.evidence.is_empty());
		assert!(row.defense.is_none());
		assert!(!row.involves(1));
	}

	#[tokio::test]
	async fn list_errors_degrade_to_empty_page() {
		let mut api = MockDexCourtApi::new();
		api.expect_disputes().returning(|_| Err(ApiError::Timeout));

		assert!(DisputeService::new(Arc::new(api)).rows(0).await.is_empty());
	}

	#[tokio::test]
	async fn rows_use_page_offsets() {
		let mut api = MockDexCourtApi::new();
		api.expect_disputes()
			.withf(|query| query.top == 3 && query.skip == 6)
			.returning(|_| Ok(vec![dispute_item(1, DisputeStatus::Pending)]));

		let rows = DisputeService::new(Arc::new(api)).with_page_size(3).rows(2).await;

		assert_eq!(rows.len(), 1);
	}

	#[tokio::test]
	async fn details_skip_failed_ids() {
		let mut api = MockDexCourtApi::new();
		api.expect_dispute().returning(|id| if id == 2 { Err(ApiError::Timeout) } else { Ok(details(id)) });

		let rows = DisputeService::new(Arc::new(api)).details_for([1, 2, 3]).await;

		assert_eq!(rows.len(), 2);
		assert_eq!(rows[&3].id, 3);
	}

	#[tokio::test]
	async fn evaluates_outcome() {
		let mut api = MockDexCourtApi::new();
		api.expect_vote_outcome().returning(|_| {
			Ok(VoteOutcomeData {
				votes_per_group: PerGroup {
					judges: Some(GroupVotes { plaintiff: 7, defendant: 3, dismiss: 0, total: 10 }),
					..Default::default()
				},
				judge_pct: Some(70.0),
				winner: Some(Winner::Plaintiff),
				..Default::default()
			})
		});

		let outcome = DisputeService::new(Arc::new(api)).vote_outcome(1).await.unwrap();

		assert_eq!(outcome.result.win_pct, 49);
		assert_eq!(outcome.result.winner, Some(Winner::Plaintiff));
	}
}
