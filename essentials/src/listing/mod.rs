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

//! Paged agreement and dispute lists, optionally narrowed to the current user.

pub mod identity;
pub mod legacy;
pub mod reconciler;

pub use identity::{Identity, involvement_filter};
pub use legacy::{LegacyRoleParser, LegacyRoles, RegexLegacyParser};
pub use reconciler::{AgreementPages, DisputePages, ListReconciler, PageSource, ReconcilerOptions};
