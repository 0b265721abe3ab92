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
	api::{ApiOptions, HttpApi},
	auth::TokenStore,
	constants::{DEFAULT_API_URL, DEFAULT_STATE_DIR, DEFAULT_TIMEOUT_SECS},
	storage::{FileStore, KeyValueStore},
};
use clap::{ArgAction, Args};
use log::{LevelFilter, debug};
use serde::Serialize;
use std::{path::PathBuf, str::FromStr, sync::Arc};

#[derive(Clone, Debug, Args)]
pub struct VerbosityOptions {
	/// Verbosity level: -v - info, -vv - debug, -vvv - trace
	#[clap(short = 'v', long, action = ArgAction::Count, global = true)]
	pub verbose: u8,
}

/// Output mode for the CLI commands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
	Pretty,
	Json,
}

impl FromStr for OutputMode {
	type Err = &'static str;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pretty" => Ok(OutputMode::Pretty),
			"json" => Ok(OutputMode::Json),
			_ => Err("invalid output mode"),
		}
	}
}

/// Connection options shared by all tools.
#[derive(Clone, Debug, Args)]
pub struct ApiCliOptions {
	/// URL of the DexCourt API.
	#[clap(long, default_value = DEFAULT_API_URL)]
	pub api_url: String,
	/// HTTP API timeout, in seconds
	#[clap(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
	pub timeout: f32,
	/// Directory holding the session token and local vote flags.
	#[clap(long, default_value = DEFAULT_STATE_DIR)]
	pub state_dir: PathBuf,
	/// Pretty print output of the commands (pretty by default)
	#[clap(long, default_value = "pretty", global = true)]
	pub output: OutputMode,
}

/// Everything a command needs to talk to the API.
pub struct ClientContext {
	pub api: Arc<HttpApi>,
	pub store: Arc<dyn KeyValueStore>,
	pub tokens: TokenStore,
	pub output: OutputMode,
}

impl ApiCliOptions {
	pub fn connect(&self) -> color_eyre::Result<ClientContext> {
		let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&self.state_dir)?);
		let tokens = TokenStore::new(store.clone());
		let api = HttpApi::new(&self.api_url, &ApiOptions::builder().timeout(self.timeout).build())?
			.with_tokens(tokens.clone());
		debug!("created DexCourt API client for {}", api.base_url());
		Ok(ClientContext { api: Arc::new(api), store, tokens, output: self.output })
	}
}

pub fn init_cli(opts: &VerbosityOptions) -> color_eyre::Result<()> {
	color_eyre::install()?;
	let log_level = match opts.verbose {
		0 => LevelFilter::Warn,
		1 => LevelFilter::Info,
		2 => LevelFilter::Debug,
		_ => LevelFilter::Trace,
	};
	env_logger::Builder::from_default_env()
		.filter(None, log_level)
		.format_timestamp(Some(env_logger::fmt::TimestampPrecision::Micros))
		.try_init()?;

	Ok(())
}

pub fn format_output<T: Serialize + ?Sized>(input: &T, mode: OutputMode) -> color_eyre::Result<()> {
	let res = match mode {
		OutputMode::Pretty => serde_json::to_string_pretty(input)?,
		OutputMode::Json => serde_json::to_string(input)?,
	};

	println!("{}", res);

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::Parser;

	#[derive(Parser)]
	struct TestCli {
		#[clap(flatten)]
		api: ApiCliOptions,
		#[clap(flatten)]
		verbose: VerbosityOptions,
	}

	#[test]
	fn parses_defaults() {
		let cli = TestCli::parse_from(["test"]);

		assert_eq!(cli.api.api_url, DEFAULT_API_URL);
		assert_eq!(cli.api.timeout, DEFAULT_TIMEOUT_SECS);
		assert_eq!(cli.api.output, OutputMode::Pretty);
		assert_eq!(cli.verbose.verbose, 0);
	}

	#[test]
	fn parses_overrides() {
		let cli = TestCli::parse_from(["test", "--output", "json", "--timeout", "2.5", "-vv", "--state-dir", "/tmp/x"]);

		assert_eq!(cli.api.output, OutputMode::Json);
		assert_eq!(cli.api.timeout, 2.5);
		assert_eq!(cli.api.state_dir, PathBuf::from("/tmp/x"));
		assert_eq!(cli.verbose.verbose, 2);
		assert!(TestCli::try_parse_from(["test", "--output", "yaml"]).is_err());
	}
}
