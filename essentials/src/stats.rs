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

//! Dashboard counters computed from fetched lists.

use crate::{
	disputes::DisputeRow,
	types::{Agreement, AgreementStatus},
};
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgreementStats {
	pub total: usize,
	pub active: usize,
	pub escrow: usize,
	pub by_status: BTreeMap<String, usize>,
	pub by_type: BTreeMap<String, usize>,
}

impl AgreementStats {
	pub fn collect(agreements: &[Agreement]) -> Self {
		Self {
			total: agreements.len(),
			active: agreements.iter().filter(|a| a.status == AgreementStatus::Active).count(),
			escrow: agreements.iter().filter(|a| a.is_escrow()).count(),
			by_status: agreements.iter().map(|a| a.status.to_string()).counts().into_iter().collect(),
			by_type: agreements.iter().map(|a| a.agreement_type.to_string()).counts().into_iter().collect(),
		}
	}
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DisputeStats {
	pub total: usize,
	pub voting: usize,
	pub by_status: BTreeMap<String, usize>,
}

impl DisputeStats {
	pub fn collect(disputes: &[DisputeRow]) -> Self {
		Self {
			total: disputes.len(),
			voting: disputes.iter().filter(|d| d.is_voting()).count(),
			by_status: disputes.iter().map(|d| d.status.to_string()).counts().into_iter().collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		test_utils::{agreement, dispute_item},
		types::{AgreementType, DisputeStatus},
	};

	#[test]
	fn counts_agreements() {
		let mut escrow = agreement(3, AgreementStatus::Active);
		escrow.agreement_type = AgreementType::Escrow;
		let agreements =
			vec![agreement(1, AgreementStatus::Active), agreement(2, AgreementStatus::Completed), escrow];

		let stats = AgreementStats::collect(&agreements);

		assert_eq!(stats.total, 3);
		assert_eq!(stats.active, 2);
		assert_eq!(stats.escrow, 1);
		assert_eq!(stats.by_status["active"], 2);
		assert_eq!(stats.by_type["reputational"], 2);
	}

	#[test]
	fn counts_disputes() {
		let statuses = [DisputeStatus::VoteInProgress, DisputeStatus::VoteInProgress, DisputeStatus::Settled];
		let rows: Vec<DisputeRow> = statuses
			.into_iter()
			.enumerate()
			.map(|(id, status)| dispute_item(id as u64, status).into())
			.collect();

		let stats = DisputeStats::collect(&rows);

		assert_eq!(stats.voting, 2);
		assert_eq!(stats.by_status["settled"], 1);
		assert_eq!(DisputeStats::collect(&[]), DisputeStats::default());
	}
}
