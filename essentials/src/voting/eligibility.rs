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

//! Whether the current user may vote on a dispute.
//!
//! Two sources are reconciled: the server eligibility check and a local
//! `vote_{dispute}_{user}` flag written right after a successful vote. The
//! local flag wins so a cast vote shows up before the server has processed
//! it. It is a hint only and may be stale if the vote later failed.

use crate::{
	api::{ApiError, DexCourtApi, EligibilityResponse},
	storage::{KeyValueStore, StoreError},
	types::{AccountId, DisputeId, VoteChoice},
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;

/// Server reason codes, indexed by code.
const REASON_MESSAGES: [&str; 8] = [
	"User is eligible to vote",
	"Dispute is not open for voting",
	"User is plaintiff",
	"User is defendant",
	"User has already voted",
	"Voting period has ended",
	"User is a witness in this dispute",
	"User does not meet the voting requirements",
];

pub const ALREADY_VOTED_REASON: u8 = 4;
pub const ELIGIBILITY_ERROR: &str = "Error checking eligibility";

pub fn reason_message(code: u8) -> &'static str {
	REASON_MESSAGES.get(code as usize).copied().unwrap_or("Unknown reason")
}

/// Persisted key of the local vote flag.
pub fn vote_key(dispute_id: DisputeId, user_id: AccountId) -> String {
	format!("vote_{dispute_id}_{user_id}")
}

/// Value stored under [`vote_key`].
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct LocalVote {
	pub choice: VoteChoice,
	/// Unix time in milliseconds.
	pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum VotingState {
	#[default]
	Unknown,
	Checking,
	Eligible { tier: Option<u8>, weight: Option<f64> },
	Ineligible { reason: Option<String> },
	/// The local flag exists. Its content is `None` when it cannot be decoded.
	VotedLocally { vote: Option<LocalVote> },
	VotedConfirmed,
}

impl VotingState {
	fn from_response(response: EligibilityResponse) -> Self {
		match response.reason {
			Some(ALREADY_VOTED_REASON) => VotingState::VotedConfirmed,
			_ if response.can_vote => VotingState::Eligible { tier: response.tier, weight: response.weight },
			reason => VotingState::Ineligible { reason: reason.map(|code| reason_message(code).to_owned()) },
		}
	}
}

/// Flat view of a [`VotingState`].
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VotingStatus {
	pub has_voted: bool,
	pub can_vote: bool,
	pub reason: Option<String>,
	pub tier: Option<u8>,
	pub weight: Option<f64>,
	pub is_loading: bool,
}

impl From<&VotingState> for VotingStatus {
	fn from(state: &VotingState) -> Self {
		match state {
			VotingState::Unknown => VotingStatus::default(),
			VotingState::Checking => VotingStatus { is_loading: true, ..Default::default() },
			VotingState::Eligible { tier, weight } =>
				VotingStatus { can_vote: true, tier: *tier, weight: *weight, ..Default::default() },
			VotingState::Ineligible { reason } => VotingStatus { reason: reason.clone(), ..Default::default() },
			VotingState::VotedLocally { .. } => VotingStatus {
				has_voted: true,
				reason: Some(reason_message(ALREADY_VOTED_REASON).to_owned()),
				..Default::default()
			},
			VotingState::VotedConfirmed => VotingStatus {
				has_voted: true,
				reason: Some(reason_message(ALREADY_VOTED_REASON).to_owned()),
				..Default::default()
			},
		}
	}
}

pub struct VotingEligibilityChecker<A> {
	api: Arc<A>,
	store: Arc<dyn KeyValueStore>,
	dispute_id: Option<DisputeId>,
	user_id: Option<AccountId>,
	state: VotingState,
}

impl<A: DexCourtApi> VotingEligibilityChecker<A> {
	pub fn new(
		api: Arc<A>,
		store: Arc<dyn KeyValueStore>,
		dispute_id: Option<DisputeId>,
		user_id: Option<AccountId>,
	) -> Self {
		Self { api, store, dispute_id, user_id, state: VotingState::Unknown }
	}

	pub fn state(&self) -> &VotingState {
		&self.state
	}

	pub fn status(&self) -> VotingStatus {
		(&self.state).into()
	}

	fn transition(&mut self, state: VotingState) {
		debug!("voting state {:?}/{:?}: {:?} -> {:?}", self.dispute_id, self.user_id, self.state, state);
		self.state = state;
	}

	/// Reconciles local and server state. Never fails: errors end in `Ineligible`.
	pub async fn check_voting_status(&mut self) -> VotingStatus {
		let (Some(dispute_id), Some(user_id)) = (self.dispute_id, self.user_id) else {
			self.transition(VotingState::Ineligible { reason: None });
			return self.status()
		};

		if let Some(vote) = self.local_vote(dispute_id, user_id) {
			self.transition(VotingState::VotedLocally { vote });
			return self.status()
		}

		self.transition(VotingState::Checking);
		let next = match self.api.check_eligibility(dispute_id).await {
			Ok(response) => VotingState::from_response(response),
			Err(e) => {
				warn!("Eligibility check for dispute {} failed: {}", dispute_id, e);
				VotingState::Ineligible { reason: Some(ELIGIBILITY_ERROR.to_owned()) }
			},
		};
		self.transition(next);

		self.status()
	}

	/// Records a successful vote locally so it is reported before the server catches up.
	pub fn mark_as_voted(&mut self, choice: VoteChoice) -> Result<(), StoreError> {
		let (Some(dispute_id), Some(user_id)) = (self.dispute_id, self.user_id) else {
			warn!("Cannot record a vote without dispute and user");
			return Ok(())
		};
		let vote = LocalVote { choice, timestamp: now_millis() };
		self.store.set(&vote_key(dispute_id, user_id), &serde_json::to_string(&vote)?)?;
		self.transition(VotingState::VotedLocally { vote: Some(vote) });
		Ok(())
	}

	/// Submits a vote and marks it locally once the server accepted it.
	pub async fn cast_vote(&mut self, choice: VoteChoice, comment: Option<String>) -> Result<(), ApiError> {
		let Some(dispute_id) = self.dispute_id else {
			return Err(ApiError::Http { status: 400, code: None, message: "no dispute selected".to_owned() })
		};
		self.api.cast_vote(dispute_id, choice, comment).await?;
		if let Err(e) = self.mark_as_voted(choice) {
			warn!("Vote on dispute {} accepted but not recorded locally: {}", dispute_id, e);
		}
		Ok(())
	}

	/// `Some` if the flag exists, with its content if it decodes.
	fn local_vote(&self, dispute_id: DisputeId, user_id: AccountId) -> Option<Option<LocalVote>> {
		match self.store.get(&vote_key(dispute_id, user_id)) {
			Ok(Some(raw)) => Some(serde_json::from_str(&raw).ok()),
			Ok(None) => None,
			Err(e) => {
				warn!("Cannot read local vote flag: {}", e);
				None
			},
		}
	}
}

fn now_millis() -> i64 {
	(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
