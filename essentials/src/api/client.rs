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

//! A `reqwest` implementation of [`DexCourtApi`].

use super::{
	DexCourtApi, EligibilityResponse, LeaderboardQuery, NewAgreement, NewDispute, PageQuery,
	envelope::{Envelope, ListEnvelope},
	error::ApiError,
};
use crate::{
	auth::TokenStore,
	constants::{DEFAULT_TIMEOUT_SECS, DISPUTE_CREATION_TIMEOUT, HTTP_UA, NONCE_TIMEOUT},
	types::{
		Account, AccountId, Agreement, AgreementId, DisputeDetails, DisputeId, DisputeListItem, LeaderboardEntry,
		ReputationEvent, VoteChoice,
	},
	voting::outcome::VoteOutcomeData,
};
use async_trait::async_trait;
use log::{debug, trace};
use reqwest::{
	Method, RequestBuilder,
	multipart::{Form, Part},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{path::PathBuf, time::Duration};
use typed_builder::TypedBuilder;
use url::Url;

const TELEGRAM_LOGIN_ENDPOINT: &str = "login/telegram";
const WALLET_NONCE_ENDPOINT: &str = "login/wallet/nonce";
const WALLET_VERIFY_ENDPOINT: &str = "login/wallet/verify";
const AGREEMENT_ENDPOINT: &str = "agreement";
const DISPUTE_ENDPOINT: &str = "dispute";
const ACCOUNTS_ENDPOINT: &str = "accounts";
const LEADERBOARD_ENDPOINT: &str = "accounts/reputation/leaderboard";

#[derive(TypedBuilder, Clone, Debug)]
pub struct ApiOptions {
	/// Default request timeout in seconds.
	#[builder(default = DEFAULT_TIMEOUT_SECS)]
	timeout: f32,
}

impl Default for ApiOptions {
	fn default() -> Self {
		Self::builder().build()
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TelegramLoginRequest<'a> {
	otp: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WalletRequest<'a> {
	wallet_address: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	signature: Option<&'a str>,
}

#[derive(Serialize)]
struct VoteRequest {
	choice: VoteChoice,
	#[serde(skip_serializing_if = "Option::is_none")]
	comment: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
	token: String,
}

#[derive(Deserialize)]
struct NonceResponse {
	nonce: String,
}

#[derive(Serialize)]
struct ReputationQuery {
	top: usize,
	skip: usize,
}

/// HTTP client for the DexCourt API.
#[derive(Clone)]
pub struct HttpApi {
	/// Base URL for the requests, always ends with `/`
	base_url: Url,
	/// Async HTTP client
	http_client: reqwest::Client,
	/// Source of the bearer token, requests are anonymous without it
	tokens: Option<TokenStore>,
}

impl HttpApi {
	pub fn new(url: &str, opts: &ApiOptions) -> Result<Self, ApiError> {
		let http_client = reqwest::Client::builder()
			.timeout(Duration::from_secs_f32(opts.timeout))
			.user_agent(HTTP_UA)
			.build()
			.map_err(ApiError::Network)?;
		let mut base_url = Url::parse(url)?;
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());
			base_url.set_path(&path);
		}

		Ok(Self { base_url, http_client, tokens: None })
	}

	pub fn with_tokens(mut self, tokens: TokenStore) -> Self {
		self.tokens = Some(tokens);
		self
	}

	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
		Ok(self.base_url.join(path.trim_start_matches('/'))?)
	}

	fn request(&self, method: Method, url: Url) -> RequestBuilder {
		debug!("{} {}", method, url);
		let builder = self.http_client.request(method, url);
		match self.tokens.as_ref().and_then(|tokens| tokens.load()) {
			Some(token) => builder.bearer_auth(token.as_str()),
			None => builder,
		}
	}

	fn with_query<Q: Serialize>(&self, path: &str, query: &Q) -> Result<Url, ApiError> {
		let mut url = self.endpoint(path)?;
		let encoded = serde_urlencoded::to_string(query).map_err(|e| ApiError::Query(e.to_string()))?;
		if !encoded.is_empty() {
			url.set_query(Some(&encoded));
		}
		Ok(url)
	}

	fn create_agreement_request(&self, agreement: &NewAgreement) -> Result<RequestBuilder, ApiError> {
		let url = self.endpoint(AGREEMENT_ENDPOINT)?;
		let form = upload_form(agreement_fields(agreement), &agreement.files)?;
		Ok(self.request(Method::POST, url).multipart(form))
	}

	fn create_dispute_request(
		&self,
		agreement_id: AgreementId,
		dispute: &NewDispute,
	) -> Result<RequestBuilder, ApiError> {
		let url = self.endpoint(&format!("{DISPUTE_ENDPOINT}/{agreement_id}"))?;
		let form = upload_form(dispute_fields(dispute)?, &dispute.files)?;
		Ok(self.request(Method::POST, url).timeout(DISPUTE_CREATION_TIMEOUT).multipart(form))
	}

	async fn body(builder: RequestBuilder) -> Result<Vec<u8>, ApiError> {
		let response = builder.send().await?;
		let status = response.status();
		let body = response.bytes().await?;
		trace!("response {}: {} bytes", status, body.len());
		if !status.is_success() {
			return Err(ApiError::from_response(status.as_u16(), &body))
		}
		Ok(body.to_vec())
	}

	async fn json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
		let body = Self::body(builder).await?;
		serde_json::from_slice::<Envelope<T>>(&body)?.into_inner()
	}

	async fn list<T: DeserializeOwned>(builder: RequestBuilder) -> Result<Vec<T>, ApiError> {
		let body = Self::body(builder).await?;
		serde_json::from_slice::<ListEnvelope<T>>(&body)?.into_items()
	}
}

/// Text parts of `POST /agreement`. Type and visibility travel as numeric codes.
fn agreement_fields(agreement: &NewAgreement) -> Vec<(&'static str, String)> {
	vec![
		("title", agreement.title.clone()),
		("description", agreement.description.clone()),
		("type", u8::from(agreement.agreement_type).to_string()),
		("visibility", u8::from(agreement.visibility).to_string()),
		("firstParty", agreement.first_party.clone()),
		("counterParty", agreement.counter_party.clone()),
		("deadline", agreement.deadline.clone()),
	]
}

fn dispute_fields(dispute: &NewDispute) -> Result<Vec<(&'static str, String)>, ApiError> {
	Ok(vec![
		("title", dispute.title.clone()),
		("description", dispute.description.clone()),
		("claim", dispute.claim.clone()),
		("defendant", dispute.defendant.clone()),
		("witnesses", serde_json::to_string(&dispute.witnesses)?),
	])
}

fn upload_form(fields: Vec<(&'static str, String)>, files: &[PathBuf]) -> Result<Form, ApiError> {
	let mut form = Form::new();
	for (name, value) in fields {
		form = form.text(name, value);
	}
	for path in files {
		let data =
			std::fs::read(path).map_err(|source| ApiError::Upload { path: path.display().to_string(), source })?;
		let file_name = path
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_else(|| "file".to_owned());
		form = form.part("files", Part::bytes(data).file_name(file_name));
	}
	Ok(form)
}

#[async_trait]
impl DexCourtApi for HttpApi {
	async fn login_telegram(&self, otp: &str) -> Result<String, ApiError> {
		let url = self.endpoint(TELEGRAM_LOGIN_ENDPOINT)?;
		let response: TokenResponse =
			Self::json(self.request(Method::POST, url).json(&TelegramLoginRequest { otp })).await?;
		Ok(response.token)
	}

	async fn wallet_nonce(&self, wallet_address: &str) -> Result<String, ApiError> {
		let url = self.endpoint(WALLET_NONCE_ENDPOINT)?;
		let request = self
			.request(Method::POST, url)
			.timeout(NONCE_TIMEOUT)
			.json(&WalletRequest { wallet_address, signature: None });
		let response: NonceResponse = Self::json(request).await?;
		Ok(response.nonce)
	}

	async fn verify_wallet(&self, wallet_address: &str, signature: &str) -> Result<String, ApiError> {
		let url = self.endpoint(WALLET_VERIFY_ENDPOINT)?;
		let request = self
			.request(Method::POST, url)
			.json(&WalletRequest { wallet_address, signature: Some(signature) });
		let response: TokenResponse = Self::json(request).await?;
		Ok(response.token)
	}

	async fn agreements(&self, query: &PageQuery) -> Result<Vec<Agreement>, ApiError> {
		let url = self.with_query(AGREEMENT_ENDPOINT, query)?;
		Self::list(self.request(Method::GET, url)).await
	}

	async fn agreement(&self, id: AgreementId) -> Result<Agreement, ApiError> {
		let url = self.endpoint(&format!("{AGREEMENT_ENDPOINT}/{id}"))?;
		Self::json(self.request(Method::GET, url)).await
	}

	async fn create_agreement(&self, agreement: &NewAgreement) -> Result<Agreement, ApiError> {
		Self::json(self.create_agreement_request(agreement)?).await
	}

	async fn disputes(&self, query: &PageQuery) -> Result<Vec<DisputeListItem>, ApiError> {
		let url = self.with_query(DISPUTE_ENDPOINT, query)?;
		Self::list(self.request(Method::GET, url)).await
	}

	async fn dispute(&self, id: DisputeId) -> Result<DisputeDetails, ApiError> {
		let url = self.endpoint(&format!("{DISPUTE_ENDPOINT}/{id}"))?;
		Self::json(self.request(Method::GET, url)).await
	}

	async fn create_dispute(
		&self,
		agreement_id: AgreementId,
		dispute: &NewDispute,
	) -> Result<DisputeDetails, ApiError> {
		Self::json(self.create_dispute_request(agreement_id, dispute)?).await
	}

	async fn cast_vote(&self, id: DisputeId, choice: VoteChoice, comment: Option<String>) -> Result<(), ApiError> {
		let url = self.endpoint(&format!("{DISPUTE_ENDPOINT}/{id}/vote"))?;
		Self::body(self.request(Method::POST, url).json(&VoteRequest { choice, comment })).await?;
		Ok(())
	}

	async fn vote_outcome(&self, id: DisputeId) -> Result<VoteOutcomeData, ApiError> {
		let url = self.endpoint(&format!("{DISPUTE_ENDPOINT}/{id}/vote-outcome"))?;
		Self::json(self.request(Method::GET, url)).await
	}

	async fn check_eligibility(&self, id: DisputeId) -> Result<EligibilityResponse, ApiError> {
		let url = self.endpoint(&format!("{DISPUTE_ENDPOINT}/{id}/check-eligibility"))?;
		Self::json(self.request(Method::POST, url)).await
	}

	async fn reputation(
		&self,
		account: AccountId,
		top: usize,
		skip: usize,
	) -> Result<Vec<ReputationEvent>, ApiError> {
		let path = format!("{ACCOUNTS_ENDPOINT}/{account}/reputation");
		let url = self.with_query(&path, &ReputationQuery { top, skip })?;
		Self::list(self.request(Method::GET, url)).await
	}

	async fn leaderboard(&self, query: &LeaderboardQuery) -> Result<Vec<LeaderboardEntry>, ApiError> {
		let url = self.with_query(LEADERBOARD_ENDPOINT, query)?;
		Self::list(self.request(Method::GET, url)).await
	}

	async fn accounts(&self) -> Result<Vec<Account>, ApiError> {
		let url = self.endpoint(ACCOUNTS_ENDPOINT)?;
		Self::list(self.request(Method::GET, url)).await
	}

	async fn fetch_file(&self, path: &str) -> Result<Vec<u8>, ApiError> {
		let url = self.endpoint(path)?;
		Self::body(self.request(Method::GET, url)).await
	}
}
