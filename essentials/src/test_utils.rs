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

use crate::{
	auth::{AuthToken, TokenStore},
	storage::{KeyValueStore, MemoryStore},
	types::{Account, AccountId, Agreement, AgreementStatus, AgreementType, DisputeListItem, DisputeStatus},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use std::sync::Arc;

pub const WALLET: &str = "0x52908400098527886e0f7030069857d2e4169ee7";

pub fn token_with_claims(claims: &str) -> AuthToken {
	let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
	let payload = URL_SAFE_NO_PAD.encode(claims);
	AuthToken::parse(&format!("{header}.{payload}.c2lnbmF0dXJl")).unwrap()
}

/// Token for account 42, expiring in 2100.
pub fn valid_token() -> AuthToken {
	token_with_claims(r#"{"id":42,"exp":4102444800}"#)
}

pub fn memory_store() -> Arc<dyn KeyValueStore> {
	Arc::new(MemoryStore::default())
}

pub fn memory_tokens() -> TokenStore {
	TokenStore::new(memory_store())
}

pub fn account(id: AccountId, username: &str) -> Account {
	Account { id, username: Some(username.to_owned()), ..Default::default() }
}

pub fn agreement(id: u64, status: AgreementStatus) -> Agreement {
	Agreement {
		id,
		title: format!("Agreement {id}"),
		description: String::new(),
		agreement_type: AgreementType::Reputational,
		visibility: Default::default(),
		status,
		first_party: None,
		counter_party: None,
		payee_wallet_address: None,
		payer_wallet_address: None,
		amount: None,
		token_symbol: None,
		deadline: None,
		created_at: None,
		files: Vec::new(),
	}
}

pub fn dispute_item(id: u64, status: DisputeStatus) -> DisputeListItem {
	DisputeListItem { id, title: format!("Dispute {id}"), status, ..Default::default() }
}
