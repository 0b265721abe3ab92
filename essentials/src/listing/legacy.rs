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

//! Best-effort role extraction from free-text agreement descriptions.
//!
//! Older agreements carry no structured wallet fields; their parties were
//! written into the description as `Service Provider: 0x...` or
//! `Service Recipient: @name`. This parser is only consulted for such
//! records and can be removed once none remain.

use regex::Regex;
use std::sync::LazyLock;

static SERVICE_PROVIDER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)Service Provider:\s*(0x[a-fA-F0-9]{40}|@[a-zA-Z0-9_]+)").expect("static pattern is valid; qed")
});

static SERVICE_RECIPIENT: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)Service Recipient:\s*(0x[a-fA-F0-9]{40}|@[a-zA-Z0-9_]+)").expect("static pattern is valid; qed")
});

/// Party handles found in a description: a wallet address or an `@username`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyRoles {
	pub service_provider: Option<String>,
	pub service_recipient: Option<String>,
}

impl LegacyRoles {
	pub fn handles(&self) -> impl Iterator<Item = &str> {
		[&self.service_provider, &self.service_recipient].into_iter().flatten().map(String::as_str)
	}
}

pub trait LegacyRoleParser: Send + Sync {
	fn parse(&self, description: &str) -> LegacyRoles;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegexLegacyParser;

impl LegacyRoleParser for RegexLegacyParser {
	fn parse(&self, description: &str) -> LegacyRoles {
		let capture = |re: &Regex| re.captures(description).and_then(|c| c.get(1)).map(|m| m.as_str().to_owned());
		LegacyRoles { service_provider: capture(&SERVICE_PROVIDER), service_recipient: capture(&SERVICE_RECIPIENT) }
	}
}
