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

//! Session tokens and the login flows that produce them.

use crate::{
	api::{ApiError, DexCourtApi},
	constants::{AUTH_TOKEN_KEY, MIN_TOKEN_LENGTH},
	storage::{KeyValueStore, StoreError},
	types::{AccountId, is_wallet_address},
};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use log::{info, warn};
use mockall::automock;
use serde::Deserialize;
use std::{fmt, sync::Arc};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Error)]
pub enum AuthError {
	#[error("malformed token")]
	MalformedToken,
	#[error("cannot decode token claims: {0}")]
	Claims(String),
	#[error("invalid wallet address: {0}")]
	InvalidWallet(String),
	#[error("wallet refused to sign: {0}")]
	Signer(String),
	#[error(transparent)]
	Api(#[from] ApiError),
	#[error(transparent)]
	Store(#[from] StoreError),
}

/// Claims we read from the token payload. The token is never verified locally.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
	#[serde(alias = "userId", alias = "accountId")]
	pub id: Option<AccountId>,
	pub exp: Option<i64>,
}

/// A JWT-shaped session token: three dot separated parts.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl fmt::Debug for AuthToken {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "AuthToken(..{} chars)", self.0.len())
	}
}

impl AuthToken {
	pub fn parse(raw: &str) -> Result<Self, AuthError> {
		let raw = raw.trim();
		if raw.len() < MIN_TOKEN_LENGTH || raw.split('.').count() != 3 {
			return Err(AuthError::MalformedToken)
		}
		Ok(Self(raw.to_owned()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn claims(&self) -> Result<TokenClaims, AuthError> {
		let payload = self.0.split('.').nth(1).ok_or(AuthError::MalformedToken)?;
		let raw = URL_SAFE_NO_PAD
			.decode(payload.trim_end_matches('='))
			.map_err(|e| AuthError::Claims(e.to_string()))?;
		serde_json::from_slice(&raw).map_err(|e| AuthError::Claims(e.to_string()))
	}

	/// Account the token was issued for, if the payload says so.
	pub fn account_id(&self) -> Option<AccountId> {
		self.claims().ok().and_then(|claims| claims.id)
	}

	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		matches!(self.claims(), Ok(TokenClaims { exp: Some(exp), .. }) if exp <= now.unix_timestamp())
	}
}

/// Reads and writes the persisted session token.
#[derive(Clone)]
pub struct TokenStore {
	store: Arc<dyn KeyValueStore>,
}

impl TokenStore {
	pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
		Self { store }
	}

	/// The stored token, dropping it if it is malformed or expired.
	pub fn load(&self) -> Option<AuthToken> {
		let raw = match self.store.get(AUTH_TOKEN_KEY) {
			Ok(Some(raw)) => raw,
			Ok(None) => return None,
			Err(e) => {
				warn!("Cannot read stored token: {}", e);
				return None
			},
		};
		match AuthToken::parse(&raw) {
			Ok(token) if !token.is_expired_at(OffsetDateTime::now_utc()) => Some(token),
			Ok(_) => {
				info!("Stored token has expired");
				self.discard();
				None
			},
			Err(_) => {
				warn!("Dropping malformed stored token");
				self.discard();
				None
			},
		}
	}

	pub fn save(&self, token: &AuthToken) -> Result<(), StoreError> {
		self.store.set(AUTH_TOKEN_KEY, token.as_str())
	}

	pub fn clear(&self) -> Result<(), StoreError> {
		self.store.remove(AUTH_TOKEN_KEY)
	}

	fn discard(&self) {
		if let Err(e) = self.clear() {
			warn!("Cannot remove stored token: {}", e);
		}
	}
}

/// Wallet connector able to sign the login nonce.
#[automock]
#[async_trait]
pub trait WalletSigner: Send + Sync {
	async fn sign_message(&self, message: &str) -> Result<String, AuthError>;
}

pub struct Login<'a, A> {
	api: &'a A,
	tokens: &'a TokenStore,
}

impl<'a, A: DexCourtApi> Login<'a, A> {
	pub fn new(api: &'a A, tokens: &'a TokenStore) -> Self {
		Self { api, tokens }
	}

	pub async fn telegram(&self, otp: &str) -> Result<AuthToken, AuthError> {
		let raw = self.api.login_telegram(otp.trim()).await?;
		self.accept(&raw)
	}

	pub async fn wallet_nonce(&self, wallet: &str) -> Result<String, AuthError> {
		if !is_wallet_address(wallet) {
			return Err(AuthError::InvalidWallet(wallet.to_owned()))
		}
		Ok(self.api.wallet_nonce(wallet).await?)
	}

	pub async fn verify_wallet(&self, wallet: &str, signature: &str) -> Result<AuthToken, AuthError> {
		if !is_wallet_address(wallet) {
			return Err(AuthError::InvalidWallet(wallet.to_owned()))
		}
		let raw = self.api.verify_wallet(wallet, signature).await?;
		self.accept(&raw)
	}

	/// Full wallet flow: nonce, signature, verification.
	pub async fn wallet(&self, wallet: &str, signer: &dyn WalletSigner) -> Result<AuthToken, AuthError> {
		let nonce = self.wallet_nonce(wallet).await?;
		let signature = signer.sign_message(&nonce).await?;
		self.verify_wallet(wallet, &signature).await
	}

	pub fn logout(&self) -> Result<(), AuthError> {
		self.tokens.clear()?;
		info!("Logged out");
		Ok(())
	}

	fn accept(&self, raw: &str) -> Result<AuthToken, AuthError> {
		let token = AuthToken::parse(raw)?;
		self.tokens.save(&token)?;
		info!("Logged in{}", token.account_id().map(|id| format!(" as account {id}")).unwrap_or_default());
		Ok(token)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		api::MockDexCourtApi,
		test_utils::{WALLET, memory_tokens, token_with_claims, valid_token},
	};

	#[test]
	fn validates_token_shape() {
		assert!(AuthToken::parse("a.b.c").is_err());
		assert!(AuthToken::parse("aaaaaaaaaa.bbbbbbbbbb").is_err());
		assert!(AuthToken::parse("aaaaaaaaaa.bbbbbbbbbb.cccc.dddd").is_err());
		assert!(AuthToken::parse(" aaaaaaaaaa.bbbbbbbbbb.cccc ").is_ok());
	}

	#[test]
	fn reads_claims() {
		let token = valid_token();
		assert_eq!(token.account_id(), Some(42));
		assert!(!token.is_expired_at(OffsetDateTime::now_utc()));

		let expired = token_with_claims(r#"{"id":1,"exp":1000}"#);
		assert!(expired.is_expired_at(OffsetDateTime::now_utc()));
	}

	#[test]
	fn opaque_payload_has_no_claims() {
		let token = AuthToken::parse("not-base64!.not-base64!.signature").unwrap();
		assert!(token.claims().is_err());
		assert!(token.account_id().is_none());
		assert!(!token.is_expired_at(OffsetDateTime::now_utc()));
	}

	#[test]
	fn store_drops_expired_and_malformed_tokens() {
		let tokens = memory_tokens();
		tokens.save(&token_with_claims(r#"{"exp":1000}"#)).unwrap();
		assert!(tokens.load().is_none());

		tokens.store.set(AUTH_TOKEN_KEY, "garbage").unwrap();
		assert!(tokens.load().is_none());
		assert!(tokens.store.get(AUTH_TOKEN_KEY).unwrap().is_none());
	}

	#[tokio::test]
	async fn telegram_login_persists_token() {
		let tokens = memory_tokens();
		let mut api = MockDexCourtApi::new();
		let raw = valid_token().as_str().to_owned();
		api.expect_login_telegram().withf(|otp| otp == "123456").returning(move |_| Ok(raw.clone()));

		let token = Login::new(&api, &tokens).telegram(" 123456 ").await.unwrap();

		assert_eq!(tokens.load(), Some(token));
	}

	#[tokio::test]
	async fn rejects_malformed_server_token() {
		let tokens = memory_tokens();
		let mut api = MockDexCourtApi::new();
		api.expect_login_telegram().returning(|_| Ok("short".into()));

		let result = Login::new(&api, &tokens).telegram("1").await;

		assert!(matches!(result, Err(AuthError::MalformedToken)));
		assert!(tokens.load().is_none());
	}

	#[tokio::test]
	async fn wallet_login_signs_nonce() {
		let tokens = memory_tokens();
		let mut api = MockDexCourtApi::new();
		let raw = valid_token().as_str().to_owned();
		api.expect_wallet_nonce().withf(|wallet| wallet == WALLET).returning(|_| Ok("nonce-1".into()));
		api.expect_verify_wallet()
			.withf(|wallet, signature| wallet == WALLET && signature == "signed(nonce-1)")
			.returning(move |_, _| Ok(raw.clone()));
		let mut signer = MockWalletSigner::new();
		signer.expect_sign_message().returning(|m| Ok(format!("signed({m})")));

		Login::new(&api, &tokens).wallet(WALLET, &signer).await.unwrap();

		assert!(tokens.load().is_some());
	}

	#[tokio::test]
	async fn wallet_login_checks_address_first() {
		let tokens = memory_tokens();
		let api = MockDexCourtApi::new();

		let result = Login::new(&api, &tokens).wallet_nonce("0x123").await;

		assert!(matches!(result, Err(AuthError::InvalidWallet(_))));
	}

	#[tokio::test]
	async fn logout_clears_token() {
		let tokens = memory_tokens();
		tokens.save(&valid_token()).unwrap();
		let api = MockDexCourtApi::new();

		Login::new(&api, &tokens).logout().unwrap();

		assert!(tokens.load().is_none());
	}
}
