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

//! Wire types of the DexCourt REST API.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{AsRefStr, Display, EnumString};

pub type AccountId = u64;
pub type AgreementId = u64;
pub type DisputeId = u64;
pub type FileId = u64;

/// A platform account as embedded in agreements, disputes and account listings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Account {
	pub id: AccountId,
	pub username: Option<String>,
	pub wallet_address: Option<String>,
	pub telegram_username: Option<String>,
	pub avatar_id: Option<FileId>,
	#[serde(default)]
	pub is_judge: bool,
}

impl Account {
	/// Name suitable for display: username, then wallet, then the numeric id.
	pub fn display_name(&self) -> String {
		if let Some(username) = self.username.as_deref().filter(|v| !v.is_empty()) {
			return format!("@{}", username.trim_start_matches('@'))
		}
		if let Some(wallet) = self.wallet_address.as_deref().filter(|v| !v.is_empty()) {
			return short_wallet(wallet)
		}
		format!("#{}", self.id)
	}
}

/// Abbreviates `0x1234...abcd`.
pub fn short_wallet(wallet: &str) -> String {
	if wallet.len() <= 10 {
		return wallet.to_owned()
	}
	format!("{}...{}", &wallet[..6], &wallet[wallet.len() - 4..])
}

/// Checks for a `0x`-prefixed 20 byte hex address.
pub fn is_wallet_address(value: &str) -> bool {
	match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
		Some(body) => body.len() == 40 && hex::decode(body).is_ok(),
		None => false,
	}
}

/// Agreement kind. Codes we do not know are preserved.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(from = "u8", into = "u8")]
pub enum AgreementType {
	#[default]
	Reputational,
	Escrow,
	Other(u8),
}

impl From<u8> for AgreementType {
	fn from(value: u8) -> Self {
		match value {
			1 => AgreementType::Reputational,
			2 => AgreementType::Escrow,
			v => AgreementType::Other(v),
		}
	}
}

impl From<AgreementType> for u8 {
	fn from(value: AgreementType) -> Self {
		match value {
			AgreementType::Reputational => 1,
			AgreementType::Escrow => 2,
			AgreementType::Other(v) => v,
		}
	}
}

impl fmt::Display for AgreementType {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			AgreementType::Reputational => write!(f, "reputational"),
			AgreementType::Escrow => write!(f, "escrow"),
			AgreementType::Other(v) => write!(f, "type({v})"),
		}
	}
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(from = "u8", into = "u8")]
pub enum Visibility {
	#[default]
	Private,
	Public,
	Other(u8),
}

impl From<u8> for Visibility {
	fn from(value: u8) -> Self {
		match value {
			1 => Visibility::Private,
			2 => Visibility::Public,
			v => Visibility::Other(v),
		}
	}
}

impl From<Visibility> for u8 {
	fn from(value: Visibility) -> Self {
		match value {
			Visibility::Private => 1,
			Visibility::Public => 2,
			Visibility::Other(v) => v,
		}
	}
}

/// Agreement lifecycle as reported by the API. Codes we do not know are preserved.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(from = "u8", into = "u8")]
pub enum AgreementStatus {
	#[default]
	Pending,
	Active,
	Completed,
	Disputed,
	Cancelled,
	Expired,
	Other(u8),
}

impl From<u8> for AgreementStatus {
	fn from(value: u8) -> Self {
		match value {
			1 => AgreementStatus::Pending,
			2 => AgreementStatus::Active,
			3 => AgreementStatus::Completed,
			4 => AgreementStatus::Disputed,
			5 => AgreementStatus::Cancelled,
			6 => AgreementStatus::Expired,
			v => AgreementStatus::Other(v),
		}
	}
}

impl From<AgreementStatus> for u8 {
	fn from(value: AgreementStatus) -> Self {
		match value {
			AgreementStatus::Pending => 1,
			AgreementStatus::Active => 2,
			AgreementStatus::Completed => 3,
			AgreementStatus::Disputed => 4,
			AgreementStatus::Cancelled => 5,
			AgreementStatus::Expired => 6,
			AgreementStatus::Other(v) => v,
		}
	}
}

impl fmt::Display for AgreementStatus {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			AgreementStatus::Pending => write!(f, "pending"),
			AgreementStatus::Active => write!(f, "active"),
			AgreementStatus::Completed => write!(f, "completed"),
			AgreementStatus::Disputed => write!(f, "disputed"),
			AgreementStatus::Cancelled => write!(f, "cancelled"),
			AgreementStatus::Expired => write!(f, "expired"),
			AgreementStatus::Other(v) => write!(f, "status({v})"),
		}
	}
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
	pub id: FileId,
	pub file_name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Agreement {
	pub id: AgreementId,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub description: String,
	#[serde(rename = "type", default)]
	pub agreement_type: AgreementType,
	#[serde(default)]
	pub visibility: Visibility,
	#[serde(default)]
	pub status: AgreementStatus,
	pub first_party: Option<Account>,
	pub counter_party: Option<Account>,
	pub payee_wallet_address: Option<String>,
	pub payer_wallet_address: Option<String>,
	/// Decimal string as sent by the API.
	pub amount: Option<String>,
	pub token_symbol: Option<String>,
	pub deadline: Option<String>,
	pub created_at: Option<String>,
	#[serde(default)]
	pub files: Vec<FileRef>,
}

impl Agreement {
	pub fn is_escrow(&self) -> bool {
		self.agreement_type == AgreementType::Escrow
	}
}

/// Dispute lifecycle as reported by the API. Codes we do not know are preserved.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(from = "u8", into = "u8")]
pub enum DisputeStatus {
	#[default]
	Pending,
	VoteInProgress,
	Settled,
	Dismissed,
	PendingPayment,
	Other(u8),
}

impl From<u8> for DisputeStatus {
	fn from(value: u8) -> Self {
		match value {
			1 => DisputeStatus::Pending,
			2 => DisputeStatus::VoteInProgress,
			3 => DisputeStatus::Settled,
			4 => DisputeStatus::Dismissed,
			5 => DisputeStatus::PendingPayment,
			v => DisputeStatus::Other(v),
		}
	}
}

impl From<DisputeStatus> for u8 {
	fn from(value: DisputeStatus) -> Self {
		match value {
			DisputeStatus::Pending => 1,
			DisputeStatus::VoteInProgress => 2,
			DisputeStatus::Settled => 3,
			DisputeStatus::Dismissed => 4,
			DisputeStatus::PendingPayment => 5,
			DisputeStatus::Other(v) => v,
		}
	}
}

impl fmt::Display for DisputeStatus {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			DisputeStatus::Pending => write!(f, "pending"),
			DisputeStatus::VoteInProgress => write!(f, "vote in progress"),
			DisputeStatus::Settled => write!(f, "settled"),
			DisputeStatus::Dismissed => write!(f, "dismissed"),
			DisputeStatus::PendingPayment => write!(f, "pending payment"),
			DisputeStatus::Other(v) => write!(f, "status({v})"),
		}
	}
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgreementRef {
	pub id: AgreementId,
	#[serde(default)]
	pub title: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Witnesses {
	#[serde(default)]
	pub plaintiff: Vec<Account>,
	#[serde(default)]
	pub defendant: Vec<Account>,
}

/// The defendant's answer to a dispute.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DefenseResponse {
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub evidence: Vec<FileRef>,
	pub created_at: Option<String>,
}

/// Dispute shape returned by `GET /dispute/{id}`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DisputeDetails {
	pub id: DisputeId,
	pub title: String,
	#[serde(default)]
	pub description: String,
	pub claim: Option<String>,
	#[serde(default)]
	pub status: DisputeStatus,
	pub agreement: Option<AgreementRef>,
	pub plaintiff: Option<Account>,
	pub defendant: Option<Account>,
	#[serde(default)]
	pub evidence: Vec<FileRef>,
	#[serde(default)]
	pub witnesses: Witnesses,
	pub defendant_response: Option<DefenseResponse>,
	pub created_at: Option<String>,
	pub updated_at: Option<String>,
	pub voting_id: Option<String>,
	pub voting_started_at: Option<String>,
	pub voting_ends_at: Option<String>,
}

/// Dispute shape returned by `GET /dispute`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DisputeListItem {
	pub id: DisputeId,
	pub title: String,
	pub claim: Option<String>,
	#[serde(default)]
	pub status: DisputeStatus,
	pub agreement_id: Option<AgreementId>,
	pub plaintiff: Option<Account>,
	pub defendant: Option<Account>,
	pub created_at: Option<String>,
	pub voting_id: Option<String>,
	pub voting_ends_at: Option<String>,
}

#[derive(
	Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VoteChoice {
	Plaintiff,
	Defendant,
	Dismiss,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Winner {
	Plaintiff,
	Defendant,
	Dismissed,
	/// Anything else the API reports while a vote is still open.
	#[serde(other)]
	Undecided,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReputationEvent {
	pub id: u64,
	pub event_type: String,
	pub value: i64,
	pub agreement_id: Option<AgreementId>,
	pub dispute_id: Option<DisputeId>,
	pub created_at: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
	#[serde(alias = "id")]
	pub account_id: AccountId,
	pub username: Option<String>,
	pub wallet_address: Option<String>,
	#[serde(alias = "score")]
	pub reputation: i64,
	pub rank: Option<u32>,
}

/// Leaderboard ordering accepted by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum LeaderboardSort {
	#[default]
	Desc,
	Asc,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_agreement_with_numeric_codes() {
		let raw = r#"{
			"id": 12,
			"title": "Logo design",
			"description": "Service Provider: @alice",
			"type": 2,
			"visibility": 2,
			"status": 9,
			"firstParty": {"id": 1, "username": "alice"},
			"counterParty": {"id": 2, "walletAddress": "0x00000000000000000000000000000000000000aa"},
			"amount": "150.5"
		}"#;
		let agreement: Agreement = serde_json::from_str(raw).unwrap();

		assert!(agreement.is_escrow());
		assert_eq!(agreement.visibility, Visibility::Public);
		assert_eq!(agreement.status, AgreementStatus::Other(9));
		assert_eq!(agreement.first_party.unwrap().display_name(), "@alice");
		assert_eq!(agreement.counter_party.unwrap().display_name(), "0x0000...00aa");
		assert!(agreement.files.is_empty());
	}

	#[test]
	fn keeps_unknown_type_and_visibility_codes() {
		let raw = r#"{"id": 1, "type": 7, "visibility": 3}"#;
		let agreement: Agreement = serde_json::from_str(raw).unwrap();

		assert_eq!(agreement.agreement_type, AgreementType::Other(7));
		assert_eq!(agreement.visibility, Visibility::Other(3));
		assert!(agreement.title.is_empty());
		assert!(!agreement.is_escrow());
		assert_eq!(serde_json::to_string(&agreement.visibility).unwrap(), "3");
	}

	#[test]
	fn status_codes_survive_serialization() {
		assert_eq!(serde_json::to_string(&DisputeStatus::VoteInProgress).unwrap(), "2");
		assert_eq!(serde_json::to_string(&DisputeStatus::Other(42)).unwrap(), "42");
		assert_eq!(u8::from(AgreementStatus::from(6)), 6);
	}

	#[test]
	fn parses_vote_choice() {
		assert_eq!("defendant".parse::<VoteChoice>().unwrap(), VoteChoice::Defendant);
		assert_eq!(serde_json::to_string(&VoteChoice::Dismiss).unwrap(), "\"dismiss\"");
		assert!("abstain".parse::<VoteChoice>().is_err());
	}

	#[test]
	fn checks_wallet_addresses() {
		assert!(is_wallet_address("0x52908400098527886E0F7030069857D2E4169EE7"));
		assert!(!is_wallet_address("0x52908400098527886E0F7030069857D2E4169EE"));
		assert!(!is_wallet_address("52908400098527886E0F7030069857D2E4169EE7"));
		assert!(!is_wallet_address("0xZZ908400098527886E0F7030069857D2E4169EE7"));
	}

	#[test]
	fn falls_back_to_id_for_display() {
		let account = Account { id: 7, username: Some(String::new()), ..Default::default() };
		assert_eq!(account.display_name(), "#7");
	}
}
