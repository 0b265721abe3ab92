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

//! Normalisation of the response shapes the API uses for the same payload.

use super::error::ApiError;
use log::warn;
use serde::{Deserialize, Deserializer, de::Error as _};

/// A `"success": false` flag. Any other value does not match.
#[derive(Debug)]
pub struct Unsuccessful;

impl<'de> Deserialize<'de> for Unsuccessful {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		match bool::deserialize(deserializer)? {
			false => Ok(Unsuccessful),
			true => Err(D::Error::custom("request succeeded")),
		}
	}
}

/// One list entry. Entries that do not decode are skipped instead of failing the page.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum Entry<T> {
	Valid(T),
	Invalid(serde_json::Value),
}

/// A list as returned by the various list endpoints.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
	Failed {
		success: Unsuccessful,
		#[serde(default)]
		message: Option<String>,
	},
	Bare(Vec<Entry<T>>),
	Results { results: Vec<Entry<T>> },
	Accounts { accounts: Vec<Entry<T>> },
	Data { data: Vec<Entry<T>> },
}

impl<T> ListEnvelope<T> {
	pub fn into_items(self) -> Result<Vec<T>, ApiError> {
		let entries = match self {
			ListEnvelope::Failed { message, .. } => return Err(rejected(message)),
			ListEnvelope::Bare(entries) => entries,
			ListEnvelope::Results { results } => results,
			ListEnvelope::Accounts { accounts } => accounts,
			ListEnvelope::Data { data } => data,
		};
		Ok(entries
			.into_iter()
			.filter_map(|entry| match entry {
				Entry::Valid(item) => Some(item),
				Entry::Invalid(raw) => {
					warn!("Skipping list entry that cannot be decoded: {}", raw);
					None
				},
			})
			.collect())
	}
}

/// A single object, either bare or wrapped into `data`.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum Envelope<T> {
	Failed {
		success: Unsuccessful,
		#[serde(default)]
		message: Option<String>,
	},
	Wrapped { data: T },
	Bare(T),
}

impl<T> Envelope<T> {
	pub fn into_inner(self) -> Result<T, ApiError> {
		match self {
			Envelope::Failed { message, .. } => Err(rejected(message)),
			Envelope::Wrapped { data } => Ok(data),
			Envelope::Bare(inner) => Ok(inner),
		}
	}
}

fn rejected(message: Option<String>) -> ApiError {
	ApiError::Rejected(message.unwrap_or_default())
}
