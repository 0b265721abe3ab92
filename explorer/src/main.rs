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

use clap::{Parser, ValueEnum};
use color_eyre::eyre::eyre;
use colored::Colorize;
use dexcourt_essentials::{
	api::{ApiError, DexCourtApi, HttpApi, LeaderboardQuery, NewAgreement, NewDispute},
	auth::{AuthError, Login},
	cache::{CacheService, UserDirectory},
	constants::MAX_CONCURRENT_REQUESTS,
	disputes::DisputeService,
	fanout::fetch_keyed,
	init::{self, ApiCliOptions, ClientContext, OutputMode},
	listing::{
		AgreementPages, DisputePages, Identity, ListReconciler, ReconcilerOptions, RegexLegacyParser,
		involvement_filter,
	},
	stats::{AgreementStats, DisputeStats},
	types::{AccountId, AgreementId, AgreementType, DisputeId, LeaderboardSort, Visibility, Winner},
};
use log::{debug, error, info};
use serde::Serialize;
use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

/// Login method
#[derive(Clone, Debug, Parser)]
#[clap(rename_all = "kebab-case")]
pub(crate) enum LoginMethod {
	/// Log in with a one-time password from the Telegram bot
	Telegram {
		#[clap(long)]
		otp: String,
	},
	/// Request the nonce a wallet has to sign
	Nonce {
		#[clap(long)]
		wallet: String,
	},
	/// Log in with a signed nonce
	Verify {
		#[clap(long)]
		wallet: String,
		#[clap(long)]
		signature: String,
	},
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum AgreementKind {
	Reputational,
	Escrow,
}

impl From<AgreementKind> for AgreementType {
	fn from(kind: AgreementKind) -> Self {
		match kind {
			AgreementKind::Reputational => AgreementType::Reputational,
			AgreementKind::Escrow => AgreementType::Escrow,
		}
	}
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum Access {
	Private,
	Public,
}

impl From<Access> for Visibility {
	fn from(access: Access) -> Self {
		match access {
			Access::Private => Visibility::Private,
			Access::Public => Visibility::Public,
		}
	}
}

/// Mode of this command
#[derive(Clone, Debug, Parser)]
#[clap(rename_all = "kebab-case")]
pub(crate) enum ExplorerMode {
	/// Start a session
	Login {
		#[clap(subcommand)]
		method: LoginMethod,
	},
	/// Drop the stored session
	Logout,
	/// List agreements
	Agreements {
		/// Zero based page number
		#[clap(long, default_value = "0")]
		page: usize,
		/// Only agreements the given identity takes part in
		#[clap(long)]
		mine: bool,
		/// Account ID, taken from the session token when omitted
		#[clap(long)]
		user_id: Option<AccountId>,
		#[clap(long)]
		wallet: Option<String>,
		#[clap(long)]
		username: Option<String>,
	},
	/// List disputes
	Disputes {
		/// Zero based page number
		#[clap(long, default_value = "0")]
		page: usize,
	},
	/// Reputation history of an account
	#[clap(arg_required_else_help = true)]
	Reputation {
		account: AccountId,
		#[clap(long, default_value = "10")]
		top: usize,
		#[clap(long, default_value = "0")]
		skip: usize,
	},
	/// Reputation leaderboard
	Leaderboard {
		#[clap(long, default_value = "10")]
		top: usize,
		#[clap(long, default_value = "0")]
		skip: usize,
		/// desc or asc
		#[clap(long, default_value = "desc")]
		sort: LeaderboardSort,
		#[clap(long)]
		search: Option<String>,
	},
	/// Look up platform accounts
	Users {
		/// `@username`, username or wallet address
		#[clap(long)]
		find: Option<String>,
	},
	/// Create an agreement
	#[clap(arg_required_else_help = true)]
	NewAgreement {
		#[clap(long)]
		title: String,
		#[clap(long, default_value = "")]
		description: String,
		#[clap(long, value_enum, default_value = "reputational")]
		kind: AgreementKind,
		#[clap(long, value_enum, default_value = "private")]
		visibility: Access,
		/// Username or wallet address of the creating party
		#[clap(long)]
		first_party: String,
		/// Username or wallet address of the other party
		#[clap(long)]
		counter_party: String,
		#[clap(long)]
		deadline: String,
		/// File to attach, may be repeated
		#[clap(long = "file")]
		files: Vec<PathBuf>,
	},
	/// Open a dispute on an agreement
	#[clap(arg_required_else_help = true)]
	NewDispute {
		agreement: AgreementId,
		#[clap(long)]
		title: String,
		#[clap(long, default_value = "")]
		description: String,
		#[clap(long)]
		claim: String,
		/// Username or wallet address of the defendant
		#[clap(long)]
		defendant: String,
		/// Witness username or wallet, may be repeated
		#[clap(long = "witness")]
		witnesses: Vec<String>,
		/// Evidence file, may be repeated
		#[clap(long = "file")]
		files: Vec<PathBuf>,
	},
	/// Counters over the first pages of agreements and disputes
	Dashboard {
		/// Pages of each list to load
		#[clap(long, default_value = "5")]
		max_pages: usize,
	},
}

#[derive(Clone, Debug, Parser)]
#[clap(author, version, about = "Browse DexCourt agreements, disputes and reputation")]
pub(crate) struct ExplorerOptions {
	#[clap(flatten)]
	api: ApiCliOptions,
	#[clap(subcommand)]
	mode: ExplorerMode,
	#[clap(flatten)]
	verbose: init::VerbosityOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
	page: usize,
	has_more: bool,
	items: Vec<T>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OpenVote {
	title: String,
	win_pct: i64,
	winner: Option<Winner>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Dashboard {
	agreements: AgreementStats,
	disputes: DisputeStats,
	open_votes: BTreeMap<DisputeId, OpenVote>,
}

pub(crate) struct ExplorerTool {
	mode: ExplorerMode,
	ctx: ClientContext,
}

impl ExplorerTool {
	pub fn new(opts: ExplorerOptions) -> color_eyre::Result<Self> {
		let ctx = opts.api.connect()?;
		Ok(Self { mode: opts.mode, ctx })
	}

	pub async fn run(self) -> color_eyre::Result<()> {
		let api = self.ctx.api.clone();
		let output = self.ctx.output;
		match self.mode.clone() {
			ExplorerMode::Login { method } => self.login(method).await?,
			ExplorerMode::Logout => {
				Login::new(api.as_ref(), &self.ctx.tokens).logout()?;
				println!("{}", "Logged out".green());
			},
			ExplorerMode::Agreements { page, mine, user_id, wallet, username } => {
				let mut list = ListReconciler::new(AgreementPages::new(api), ReconcilerOptions::default());
				if mine {
					let identity = Identity {
						id: user_id.or_else(|| self.ctx.tokens.load().and_then(|token| token.account_id())),
						wallet,
						username,
					};
					if identity.is_anonymous() {
						return Err(eyre!("--mine needs a session or one of --user-id, --wallet, --username"))
					}
					debug!("filtering agreements for {:?}", identity);
					list = list.with_filter(involvement_filter(identity, Arc::new(RegexLegacyParser)));
				}
				list.fetch_page(page, true).await;
				if let Some(e) = list.last_error() {
					return Err(eyre!("Cannot get agreements: {}", e.user_message()))
				}
				let result = Page { page, has_more: list.has_more(), items: list.items().to_vec() };
				init::format_output(&result, output)?;
			},
			ExplorerMode::Disputes { page } => {
				let mut list = ListReconciler::new(DisputePages::new(api), ReconcilerOptions::default());
				list.fetch_page(page, true).await;
				if let Some(e) = list.last_error() {
					return Err(eyre!("Cannot get disputes: {}", e.user_message()))
				}
				let result = Page { page, has_more: list.has_more(), items: list.items().to_vec() };
				init::format_output(&result, output)?;
			},
			ExplorerMode::Reputation { account, top, skip } => {
				let events = api
					.reputation(account, top, skip)
					.await
					.map_err(|e| api_error("Cannot get reputation", e))?;
				if output == OutputMode::Pretty {
					let total: i64 = events.iter().map(|event| event.value).sum();
					println!("Account {}: {} events, net {}", account.to_string().bold(), events.len(), signed(total));
				}
				init::format_output(&events, output)?;
			},
			ExplorerMode::Leaderboard { top, skip, sort, search } => {
				let query = LeaderboardQuery::new(top, skip, sort, search);
				let entries = api.leaderboard(&query).await.map_err(|e| api_error("Cannot get leaderboard", e))?;
				init::format_output(&entries, output)?;
			},
			ExplorerMode::Users { find } => {
				let directory = UserDirectory::new(api, Arc::new(CacheService::default()));
				match find {
					Some(query) => {
						let user = directory.find(&query).await.map_err(|e| api_error("Cannot get users", e))?;
						match user {
							Some(user) => init::format_output(&user, output)?,
							None => return Err(eyre!("No account matches {}", query)),
						}
					},
					None => {
						let users = directory.users().await.map_err(|e| api_error("Cannot get users", e))?;
						init::format_output(&users, output)?;
					},
				}
			},
			ExplorerMode::NewAgreement {
				title,
				description,
				kind,
				visibility,
				first_party,
				counter_party,
				deadline,
				files,
			} => {
				let agreement = NewAgreement {
					title,
					description,
					agreement_type: kind.into(),
					visibility: visibility.into(),
					first_party,
					counter_party,
					deadline,
					files,
				};
				let created =
					api.create_agreement(&agreement).await.map_err(|e| api_error("Cannot create agreement", e))?;
				info!("Created agreement {}", created.id);
				init::format_output(&created, output)?;
			},
			ExplorerMode::NewDispute { agreement, title, description, claim, defendant, witnesses, files } => {
				let dispute = NewDispute { title, description, claim, defendant, witnesses, files };
				let created = api
					.create_dispute(agreement, &dispute)
					.await
					.map_err(|e| api_error("Cannot open dispute", e))?;
				info!("Opened dispute {} on agreement {}", created.id, agreement);
				init::format_output(&created, output)?;
			},
			ExplorerMode::Dashboard { max_pages } => {
				let dashboard = dashboard(api, max_pages).await;
				if output == OutputMode::Pretty {
					println!(
						"{} agreements ({} active, {} escrow), {} disputes ({} in voting)",
						dashboard.agreements.total.to_string().bold(),
						dashboard.agreements.active.to_string().green(),
						dashboard.agreements.escrow,
						dashboard.disputes.total.to_string().bold(),
						dashboard.disputes.voting.to_string().yellow(),
					);
				}
				init::format_output(&dashboard, output)?;
			},
		}

		Ok(())
	}

	async fn login(&self, method: LoginMethod) -> color_eyre::Result<()> {
		let login = Login::new(self.ctx.api.as_ref(), &self.ctx.tokens);
		match method {
			LoginMethod::Telegram { otp } => {
				let token = login.telegram(&otp).await.map_err(auth_error)?;
				logged_in(token.account_id());
			},
			LoginMethod::Nonce { wallet } => {
				let nonce = login.wallet_nonce(&wallet).await.map_err(auth_error)?;
				println!("{nonce}");
			},
			LoginMethod::Verify { wallet, signature } => {
				let token = login.verify_wallet(&wallet, &signature).await.map_err(auth_error)?;
				logged_in(token.account_id());
			},
		}
		Ok(())
	}
}

/// Loads up to `max_pages` of both lists and the outcome of every open vote.
async fn dashboard(api: Arc<HttpApi>, max_pages: usize) -> Dashboard {
	let mut agreements = ListReconciler::new(AgreementPages::new(api.clone()), ReconcilerOptions::default());
	let mut disputes = ListReconciler::new(DisputePages::new(api.clone()), ReconcilerOptions::default());
	for _ in 0..max_pages.max(1) {
		if !agreements.has_more() && !disputes.has_more() {
			break
		}
		agreements.load_more().await;
		disputes.load_more().await;
	}
	info!("loaded {} agreements and {} disputes", agreements.items().len(), disputes.items().len());

	let service = DisputeService::new(api);
	let voting: Vec<_> = disputes.items().iter().filter(|row| row.is_voting()).collect();
	let titles: BTreeMap<DisputeId, String> = voting.iter().map(|row| (row.id, row.title.clone())).collect();
	let service = &service;
	let outcomes = fetch_keyed(voting.iter().map(|row| row.id), MAX_CONCURRENT_REQUESTS, |id| async move {
		service.vote_outcome(id).await
	})
	.await;

	Dashboard {
		agreements: AgreementStats::collect(agreements.items()),
		disputes: DisputeStats::collect(disputes.items()),
		open_votes: outcomes
			.into_iter()
			.map(|(id, outcome)| {
				let title = titles.get(&id).cloned().unwrap_or_default();
				(id, OpenVote { title, win_pct: outcome.result.win_pct, winner: outcome.result.winner })
			})
			.collect(),
	}
}

fn logged_in(account: Option<AccountId>) {
	match account {
		Some(id) => println!("{} as account {}", "Logged in".green(), id.to_string().bold()),
		None => println!("{}", "Logged in".green()),
	}
}

fn signed(value: i64) -> colored::ColoredString {
	if value < 0 { value.to_string().red() } else { format!("+{value}").green() }
}

fn api_error(context: &str, e: ApiError) -> color_eyre::Report {
	debug!("{}: {:?}", context, e);
	eyre!("{}: {}", context, e.user_message())
}

fn auth_error(e: AuthError) -> color_eyre::Report {
	match e {
		AuthError::Api(e) => api_error("Login failed", e),
		e => eyre!("Login failed: {}", e),
	}
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	let opts = ExplorerOptions::parse();
	init::init_cli(&opts.verbose)?;

	let explorer_cli = match ExplorerTool::new(opts) {
		Ok(tool) => tool,
		Err(err) => {
			error!("FATAL: cannot start explorer command: {}", err);
			std::process::exit(1)
		},
	};
	if let Err(err) = explorer_cli.run().await {
		error!("FATAL: {}", err);
		std::process::exit(1)
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_agreement_filters() {
		let opts =
			ExplorerOptions::parse_from(["dexcourt-explorer", "agreements", "--page", "2", "--mine", "--user-id", "7"]);
		match opts.mode {
			ExplorerMode::Agreements { page, mine, user_id, .. } => {
				assert_eq!(page, 2);
				assert!(mine);
				assert_eq!(user_id, Some(7));
			},
			mode => panic!("unexpected mode {mode:?}"),
		}
	}

	#[test]
	fn parses_new_dispute() {
		let opts = ExplorerOptions::parse_from([
			"dexcourt-explorer",
			"new-dispute",
			"12",
			"--title",
			"Late",
			"--claim",
			"Refund",
			"--defendant",
			"@bob",
			"--witness",
			"@carol",
			"--witness",
			"@dave",
		]);
		match opts.mode {
			ExplorerMode::NewDispute { agreement, witnesses, files, .. } => {
				assert_eq!(agreement, 12);
				assert_eq!(witnesses, vec!["@carol", "@dave"]);
				assert!(files.is_empty());
			},
			mode => panic!("unexpected mode {mode:?}"),
		}
	}

	#[test]
	fn parses_new_agreement_codes() {
		let opts = ExplorerOptions::parse_from([
			"dexcourt-explorer",
			"new-agreement",
			"--title",
			"Logo",
			"--kind",
			"escrow",
			"--visibility",
			"public",
			"--first-party",
			"@alice",
			"--counter-party",
			"@bob",
			"--deadline",
			"2026-12-01",
			"--file",
			"brief.pdf",
		]);
		match opts.mode {
			ExplorerMode::NewAgreement { kind, visibility, files, .. } => {
				assert_eq!(AgreementType::from(kind), AgreementType::Escrow);
				assert_eq!(Visibility::from(visibility), Visibility::Public);
				assert_eq!(files, vec![PathBuf::from("brief.pdf")]);
			},
			mode => panic!("unexpected mode {mode:?}"),
		}
	}

	#[test]
	fn parses_leaderboard_sort() {
		let opts =
			ExplorerOptions::parse_from(["dexcourt-explorer", "--output", "json", "leaderboard", "--sort", "asc"]);
		assert_eq!(opts.api.output, OutputMode::Json);
		assert!(matches!(opts.mode, ExplorerMode::Leaderboard { sort: LeaderboardSort::Asc, top: 10, .. }));
		assert!(ExplorerOptions::try_parse_from(["dexcourt-explorer", "leaderboard", "--sort", "up"]).is_err());
	}
}
