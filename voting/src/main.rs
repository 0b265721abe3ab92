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

use clap::Parser;
use color_eyre::eyre::eyre;
use colored::Colorize;
use dexcourt_essentials::{
	api::{ApiError, HttpApi},
	disputes::{DisputeOutcome, DisputeService},
	init::{self, ApiCliOptions, ClientContext, OutputMode},
	types::{AccountId, DisputeId, VoteChoice, Winner},
	voting::{VotingEligibilityChecker, VotingStatus},
};
use log::{debug, error};

/// Mode of this command
#[derive(Clone, Debug, Parser)]
#[clap(rename_all = "kebab-case")]
pub(crate) enum VotingMode {
	/// Weighted outcome of a dispute vote
	#[clap(arg_required_else_help = true)]
	Outcome {
		/// Dispute ID
		id: DisputeId,
	},
	/// Whether a user may vote on a dispute
	#[clap(arg_required_else_help = true)]
	Status {
		/// Dispute ID
		id: DisputeId,
		/// Voter account, taken from the session token when omitted
		#[clap(long)]
		user: Option<AccountId>,
	},
	/// Cast a vote
	#[clap(arg_required_else_help = true)]
	Cast {
		/// Dispute ID
		id: DisputeId,
		/// Voter account, taken from the session token when omitted
		#[clap(long)]
		user: Option<AccountId>,
		/// plaintiff, defendant or dismiss
		#[clap(long)]
		choice: VoteChoice,
		#[clap(long)]
		comment: Option<String>,
	},
}

#[derive(Clone, Debug, Parser)]
#[clap(author, version, about = "Inspect dispute votes and cast your own")]
pub(crate) struct VotingOptions {
	#[clap(flatten)]
	api: ApiCliOptions,
	#[clap(subcommand)]
	mode: VotingMode,
	#[clap(flatten)]
	verbose: init::VerbosityOptions,
}

pub(crate) struct VotingTool {
	mode: VotingMode,
	ctx: ClientContext,
}

impl VotingTool {
	pub fn new(opts: VotingOptions) -> color_eyre::Result<Self> {
		let ctx = opts.api.connect()?;
		Ok(Self { mode: opts.mode, ctx })
	}

	pub async fn run(self) -> color_eyre::Result<()> {
		match self.mode.clone() {
			VotingMode::Outcome { id } => {
				let outcome = DisputeService::new(self.ctx.api.clone())
					.vote_outcome(id)
					.await
					.map_err(|e| api_error("Cannot get vote outcome", e))?;
				if self.ctx.output == OutputMode::Pretty {
					print_outcome(id, &outcome);
				}
				init::format_output(&outcome, self.ctx.output)?;
			},
			VotingMode::Status { id, user } => {
				let mut checker = self.checker(id, user);
				let status = checker.check_voting_status().await;
				self.print_status(id, &status)?;
			},
			VotingMode::Cast { id, user, choice, comment } => {
				let mut checker = self.checker(id, user);
				checker
					.cast_vote(choice, comment)
					.await
					.map_err(|e| api_error("Cannot cast vote", e))?;
				println!("Voted {} on dispute {}", choice.to_string().bold(), id);
				self.print_status(id, &checker.status())?;
			},
		}

		Ok(())
	}

	fn checker(&self, id: DisputeId, user: Option<AccountId>) -> VotingEligibilityChecker<HttpApi> {
		let user = user.or_else(|| self.ctx.tokens.load().and_then(|token| token.account_id()));
		debug!("checking dispute {} for user {:?}", id, user);
		VotingEligibilityChecker::new(self.ctx.api.clone(), self.ctx.store.clone(), Some(id), user)
	}

	fn print_status(&self, id: DisputeId, status: &VotingStatus) -> color_eyre::Result<()> {
		if self.ctx.output == OutputMode::Pretty {
			let verdict = if status.has_voted {
				"already voted".yellow()
			} else if status.can_vote {
				"can vote".green()
			} else {
				"cannot vote".red()
			};
			println!(
				"Dispute {}: {}{}",
				id.to_string().bold(),
				verdict.bold(),
				status.reason.as_deref().map(|reason| format!(" ({reason})")).unwrap_or_default()
			);
		}
		init::format_output(status, self.ctx.output)
	}
}

fn print_outcome(id: DisputeId, outcome: &DisputeOutcome) {
	let result = &outcome.result;
	let winner = match result.winner {
		Some(Winner::Plaintiff) => "plaintiff".green(),
		Some(Winner::Defendant) => "defendant".red(),
		Some(Winner::Dismissed) if result.is_dismissed_due_to_no_votes => "dismissed, no votes".yellow(),
		Some(Winner::Dismissed) => "dismissed".yellow(),
		Some(Winner::Undecided) | None => "undecided".white(),
	};
	println!(
		"Dispute {}: {} votes ({} judges, {} community), plaintiff {} / defendant {}, winner: {}",
		id.to_string().bold(),
		result.total_votes,
		result.judge_votes,
		result.community_votes,
		format!("{:.2}%", result.weighted_plaintiff_pct).green().bold(),
		format!("{:.2}%", result.weighted_defendant_pct).red().bold(),
		winner.bold(),
	);
}

fn api_error(context: &str, e: ApiError) -> color_eyre::Report {
	debug!("{}: {:?}", context, e);
	eyre!("{}: {}", context, e.user_message())
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	let opts = VotingOptions::parse();
	init::init_cli(&opts.verbose)?;

	let voting_cli = match VotingTool::new(opts) {
		Ok(tool) => tool,
		Err(err) => {
			error!("FATAL: cannot start voting command: {}", err);
			std::process::exit(1)
		},
	};
	if let Err(err) = voting_cli.run().await {
		error!("FATAL: {}", err);
		std::process::exit(1)
	}

	Ok(())
}
