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

//! The boundary to the DexCourt REST API.

pub mod client;
pub mod envelope;
pub mod error;

use crate::{
	types::{
		Account, AccountId, Agreement, AgreementId, AgreementType, DisputeDetails, DisputeId, DisputeListItem, FileId,
		LeaderboardEntry, LeaderboardSort, ReputationEvent, Visibility, VoteChoice,
	},
	voting::outcome::VoteOutcomeData,
};
use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use client::{ApiOptions, HttpApi};
pub use error::{ApiError, ApiErrorCode};

/// Offset based paging as accepted by the list endpoints.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct PageQuery {
	pub top: usize,
	pub skip: usize,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub search: Option<String>,
}

impl PageQuery {
	/// Query for the zero based page `page` of `page_size` items.
	pub fn page(page: usize, page_size: usize) -> Self {
		Self { top: page_size, skip: page * page_size, search: None }
	}
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct LeaderboardQuery {
	pub top: usize,
	pub skip: usize,
	pub sort: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub search: Option<String>,
}

impl LeaderboardQuery {
	pub fn new(top: usize, skip: usize, sort: LeaderboardSort, search: Option<String>) -> Self {
		Self { top, skip, sort: sort.to_string(), search }
	}
}

/// Server answer of `POST /dispute/{id}/check-eligibility`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
	pub can_vote: bool,
	pub reason: Option<u8>,
	pub tier: Option<u8>,
	pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAgreement {
	pub title: String,
	pub description: String,
	pub agreement_type: AgreementType,
	pub visibility: Visibility,
	/// Username or wallet address of the creating party.
	pub first_party: String,
	/// Username or wallet address of the other party.
	pub counter_party: String,
	pub deadline: String,
	pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDispute {
	pub title: String,
	pub description: String,
	pub claim: String,
	/// Username or wallet address of the defendant.
	pub defendant: String,
	pub witnesses: Vec<String>,
	pub files: Vec<PathBuf>,
}

/// Entity an uploaded file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileOwner {
	Agreement(AgreementId),
	Dispute(DisputeId),
	Account(AccountId),
}

impl FileOwner {
	/// API path serving `file` of this owner.
	pub fn file_path(&self, file: FileId) -> String {
		match self {
			FileOwner::Agreement(id) => format!("agreement/{id}/file/{file}"),
			FileOwner::Dispute(id) => format!("dispute/{id}/file/{file}"),
			FileOwner::Account(id) => format!("accounts/{id}/file/{file}"),
		}
	}
}

#[automock]
#[async_trait]
pub trait DexCourtApi: Send + Sync {
	/// `POST /login/telegram`, returns a session token.
	async fn login_telegram(&self, otp: &str) -> Result<String, ApiError>;
	/// `POST /login/wallet/nonce`, returns the nonce to be signed.
	async fn wallet_nonce(&self, wallet_address: &str) -> Result<String, ApiError>;
	/// `POST /login/wallet/verify`, returns a session token.
	async fn verify_wallet(&self, wallet_address: &str, signature: &str) -> Result<String, ApiError>;

	async fn agreements(&self, query: &PageQuery) -> Result<Vec<Agreement>, ApiError>;
	async fn agreement(&self, id: AgreementId) -> Result<Agreement, ApiError>;
	async fn create_agreement(&self, agreement: &NewAgreement) -> Result<Agreement, ApiError>;

	async fn disputes(&self, query: &PageQuery) -> Result<Vec<DisputeListItem>, ApiError>;
	async fn dispute(&self, id: DisputeId) -> Result<DisputeDetails, ApiError>;
	async fn create_dispute(&self, agreement_id: AgreementId, dispute: &NewDispute)
	-> Result<DisputeDetails, ApiError>;
	async fn cast_vote(&self, id: DisputeId, choice: VoteChoice, comment: Option<String>) -> Result<(), ApiError>;
	async fn vote_outcome(&self, id: DisputeId) -> Result<VoteOutcomeData, ApiError>;
	async fn check_eligibility(&self, id: DisputeId) -> Result<EligibilityResponse, ApiError>;

	async fn reputation(&self, account: AccountId, top: usize, skip: usize) -> Result<Vec<ReputationEvent>, ApiError>;
	async fn leaderboard(&self, query: &LeaderboardQuery) -> Result<Vec<LeaderboardEntry>, ApiError>;
	async fn accounts(&self) -> Result<Vec<Account>, ApiError>;

	/// Raw bytes of an uploaded file, `path` as built by [`FileOwner::file_path`].
	async fn fetch_file(&self, path: &str) -> Result<Vec<u8>, ApiError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn encodes_page_queries() {
		assert_eq!(serde_urlencoded::to_string(PageQuery::page(2, 10)).unwrap(), "top=10&skip=20");

		let query = LeaderboardQuery::new(5, 0, LeaderboardSort::Asc, Some("ali ce".into()));
		assert_eq!(serde_urlencoded::to_string(&query).unwrap(), "top=5&skip=0&sort=asc&search=ali+ce");
	}

	#[test]
	fn builds_file_paths() {
		assert_eq!(FileOwner::Dispute(3).file_path(8), "dispute/3/file/8");
		assert_eq!(FileOwner::Account(1).file_path(2), "accounts/1/file/2");
	}
}
