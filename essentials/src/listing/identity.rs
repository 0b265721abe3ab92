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

//! Who the current user is, and whether a record involves them.

use super::legacy::LegacyRoleParser;
use crate::types::{AccountId, Agreement};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
	pub id: Option<AccountId>,
	pub wallet: Option<String>,
	pub username: Option<String>,
}

impl Identity {
	pub fn is_anonymous(&self) -> bool {
		self.id.is_none() && self.wallet.is_none() && self.username.is_none()
	}

	/// Checks party ids first, then the structured wallet fields. The
	/// description is parsed only when the agreement has no wallet fields.
	pub fn is_involved_in(&self, agreement: &Agreement, legacy: &dyn LegacyRoleParser) -> bool {
		if let Some(id) = self.id {
			let parties = [&agreement.first_party, &agreement.counter_party];
			if parties.into_iter().flatten().any(|party| party.id == id) {
				return true
			}
		}

		let wallets: Vec<&str> = [&agreement.payee_wallet_address, &agreement.payer_wallet_address]
			.into_iter()
			.flatten()
			.map(String::as_str)
			.collect();
		if !wallets.is_empty() {
			return self.wallet.as_deref().is_some_and(|own| wallets.iter().any(|w| w.eq_ignore_ascii_case(own)))
		}

		legacy.parse(&agreement.description).handles().any(|handle| self.matches_handle(handle))
	}

	fn matches_handle(&self, handle: &str) -> bool {
		match handle.strip_prefix('@') {
			Some(name) => self
				.username
				.as_deref()
				.is_some_and(|own| own.trim_start_matches('@').eq_ignore_ascii_case(name)),
			None => self.wallet.as_deref().is_some_and(|own| own.eq_ignore_ascii_case(handle)),
		}
	}
}

/// Predicate keeping the agreements `identity` takes part in.
pub fn involvement_filter(
	identity: Identity,
	legacy: Arc<dyn LegacyRoleParser>,
) -> impl Fn(&Agreement) -> bool + Send + Sync + 'static {
	move |agreement| identity.is_involved_in(agreement, legacy.as_ref())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		listing::legacy::RegexLegacyParser,
		test_utils::{WALLET, account, agreement},
		types::AgreementStatus,
	};

	fn me() -> Identity {
		let wallet = WALLET.to_uppercase().replace("0X", "0x");
		Identity { id: Some(7), wallet: Some(wallet), username: Some("alice".into()) }
	}

	#[test]
	fn matches_party_ids() {
		let mut record = agreement(1, AgreementStatus::Active);
		record.counter_party = Some(account(7, "alice"));

		assert!(me().is_involved_in(&record, &RegexLegacyParser));
		assert!(!Identity { id: Some(8), ..Default::default() }.is_involved_in(&record, &RegexLegacyParser));
	}

	#[test]
	fn matches_wallets_ignoring_case() {
		let mut record = agreement(1, AgreementStatus::Active);
		record.payer_wallet_address = Some(WALLET.into());

		assert!(me().is_involved_in(&record, &RegexLegacyParser));
	}

	#[test]
	fn structured_wallets_shadow_the_description() {
		let mut record = agreement(1, AgreementStatus::Active);
		record.payee_wallet_address = Some("0x00000000000000000000000000000000000000aa".into());
		record.description = "Service Provider: @alice".into();

		assert!(!me().is_involved_in(&record, &RegexLegacyParser));
	}

	#[test]
	fn falls_back_to_legacy_description() {
		let mut record = agreement(1, AgreementStatus::Completed);
		record.description = "Service Recipient: @Alice".into();
		assert!(me().is_involved_in(&record, &RegexLegacyParser));

		record.description = format!("Service Provider: {WALLET}");
		assert!(me().is_involved_in(&record, &RegexLegacyParser));

		record.description = "Service Provider: @mallory".into();
		assert!(!me().is_involved_in(&record, &RegexLegacyParser));
	}

	#[test]
	fn builds_filters() {
		let keep = involvement_filter(me(), Arc::new(RegexLegacyParser));
		let mut record = agreement(1, AgreementStatus::Active);
		assert!(!keep(&record));

		record.first_party = Some(account(7, "alice"));
		assert!(keep(&record));
	}
}
