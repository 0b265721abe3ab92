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

//! Client-side engine for the DexCourt agreement and dispute platform.

pub mod api;
pub mod auth;
pub mod cache;
pub mod constants;
pub mod debounce;
pub mod disputes;
pub mod fanout;
pub mod init;
pub mod listing;
pub mod preview;
pub mod stats;
pub mod storage;
pub mod types;
pub mod voting;

#[cfg(test)]
mod test_utils;
