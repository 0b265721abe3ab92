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

//! Weighted vote outcome of a dispute.
//!
//! The API reports raw counts and per-group percentages for three voter
//! groups: judges and two community tiers. Judges decide a fixed share of
//! the result, the community tiers the rest, weighted between each other by
//! the number of votes they cast.

use crate::{
	constants::{COMMUNITY_WEIGHT, JUDGE_WEIGHT},
	types::{VoteChoice, Winner},
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(default)]
pub struct GroupVotes {
	pub plaintiff: u64,
	pub defendant: u64,
	pub dismiss: u64,
	pub total: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(default)]
pub struct GroupPercentages {
	pub plaintiff: f64,
	pub defendant: f64,
	pub dismiss: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PerGroup<T> {
	#[serde(default)]
	pub judges: Option<T>,
	#[serde(default)]
	pub community_tier_one: Option<T>,
	#[serde(default)]
	pub community_tier_two: Option<T>,
}

/// Body of `GET /dispute/{id}/vote-outcome`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutcomeData {
	#[serde(default)]
	pub votes_per_group: PerGroup<GroupVotes>,
	#[serde(default)]
	pub percentages_per_group: PerGroup<GroupPercentages>,
	/// Plaintiff share among judges. Falls back to the judges' group percentage.
	#[serde(default)]
	pub judge_pct: Option<f64>,
	#[serde(default)]
	pub winner: Option<Winner>,
}

const TIE_TOLERANCE: f64 = 1e-9;

/// Split of the final result between judges and community.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeWeights {
	pub judges: f64,
	pub community: f64,
}

impl Default for OutcomeWeights {
	fn default() -> Self {
		Self { judges: JUDGE_WEIGHT, community: COMMUNITY_WEIGHT }
	}
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoteCalculationResult {
	pub total_votes: u64,
	pub judge_votes: u64,
	pub community_votes: u64,
	pub tier_one_votes: u64,
	pub tier_two_votes: u64,
	pub plaintiff_votes: u64,
	pub defendant_votes: u64,
	pub dismiss_votes: u64,
	pub judge_pct: f64,
	pub community_pct: f64,
	pub weighted_plaintiff_pct: f64,
	pub weighted_defendant_pct: f64,
	pub win_pct: i64,
	/// As reported by the server, never derived from the percentages.
	pub winner: Option<Winner>,
	pub is_dismissed_due_to_no_votes: bool,
}

impl VoteCalculationResult {
	/// Side favoured by the weighted percentages, `None` on a tie.
	///
	/// This may disagree with [`Self::winner`].
	pub fn leading_side(&self) -> Option<VoteChoice> {
		let margin = self.weighted_plaintiff_pct - 50.0;
		if margin.abs() < TIE_TOLERANCE {
			None
		} else if margin > 0.0 {
			Some(VoteChoice::Plaintiff)
		} else {
			Some(VoteChoice::Defendant)
		}
	}
}

pub fn calculate_vote_results(data: &VoteOutcomeData) -> VoteCalculationResult {
	calculate_with_weights(data, OutcomeWeights::default())
}

pub fn calculate_with_weights(data: &VoteOutcomeData, weights: OutcomeWeights) -> VoteCalculationResult {
	let votes = &data.votes_per_group;
	let judges = votes.judges.unwrap_or_default();
	let tier_one = votes.community_tier_one.unwrap_or_default();
	let tier_two = votes.community_tier_two.unwrap_or_default();

	let judge_votes = judges.total;
	let community_votes = tier_one.total.saturating_add(tier_two.total);
	let total_votes = judge_votes.saturating_add(community_votes);

	let percentages = &data.percentages_per_group;
	let tier_one_pct = percentages.community_tier_one.unwrap_or_default().plaintiff;
	let tier_two_pct = percentages.community_tier_two.unwrap_or_default().plaintiff;
	let community_pct = if community_votes == 0 {
		0.0
	} else {
		(tier_one_pct * tier_one.total as f64 + tier_two_pct * tier_two.total as f64) / community_votes as f64
	};
	let judge_pct = data
		.judge_pct
		.or_else(|| percentages.judges.map(|p| p.plaintiff))
		.unwrap_or_default();

	let weighted_plaintiff_pct = judge_pct * weights.judges + community_pct * weights.community;

	VoteCalculationResult {
		total_votes,
		judge_votes,
		community_votes,
		tier_one_votes: tier_one.total,
		tier_two_votes: tier_two.total,
		plaintiff_votes: judges.plaintiff.saturating_add(tier_one.plaintiff).saturating_add(tier_two.plaintiff),
		defendant_votes: judges.defendant.saturating_add(tier_one.defendant).saturating_add(tier_two.defendant),
		dismiss_votes: judges.dismiss.saturating_add(tier_one.dismiss).saturating_add(tier_two.dismiss),
		judge_pct,
		community_pct,
		weighted_plaintiff_pct,
		weighted_defendant_pct: 100.0 - weighted_plaintiff_pct,
		win_pct: weighted_plaintiff_pct.round() as i64,
		winner: data.winner,
		is_dismissed_due_to_no_votes: data.winner == Some(Winner::Dismissed) && total_votes == 0,
	}
}
