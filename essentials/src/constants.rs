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

use std::time::Duration;

/// Default DexCourt REST API endpoint.
pub const DEFAULT_API_URL: &str = "https://dev-api.dexcourt.com";
/// Used to distinguish our user-agent
pub const HTTP_UA: &str = "dexcourt-client";
/// Default timeout for API requests, in seconds.
pub const DEFAULT_TIMEOUT_SECS: f32 = 10.0;
/// Dispute creation uploads evidence and may take a while.
pub const DISPUTE_CREATION_TIMEOUT: Duration = Duration::from_secs(30);
/// Wallet login nonce requests.
pub const NONCE_TIMEOUT: Duration = Duration::from_secs(20);

/// Number of items requested per page by list reconcilers.
pub const PAGE_SIZE: usize = 10;
/// Maximum number of concurrent detail requests issued by a fan-out.
pub const MAX_CONCURRENT_REQUESTS: usize = 5;

/// How long the account list stays cached.
pub const USER_CACHE_TTL: Duration = Duration::from_secs(60);

/// Share of the final outcome decided by judges.
pub const JUDGE_WEIGHT: f64 = 0.7;
/// Share of the final outcome decided by the community tiers.
pub const COMMUNITY_WEIGHT: f64 = 0.3;

/// Persisted key holding the session token.
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Shortest string we are willing to treat as a token.
pub const MIN_TOKEN_LENGTH: usize = 20;

/// Default directory for persisted client state.
pub const DEFAULT_STATE_DIR: &str = ".dexcourt";
