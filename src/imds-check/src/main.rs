// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Checks the EC2 instance metadata service and prints the result as JSON.

const DESCRIPTION: &str = concat!(
    "Checks whether the EC2 instance metadata service is reachable, which",
    " access modes (IMDSv1, IMDSv2) it supports, and fetches metadata keys.",
    " Directories are expanded recursively and printed as nested JSON.",
    " Diagnostics go to stderr, the JSON document goes to stdout."
);

use clap::Parser;
use imds_probe::config::Config;
use imds_probe::report::{self, Command};
use imds_probe::transport::ReqwestTransport;
use tracing::Level;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = enable_tracing(args.verbose);
    tracing::debug!("{args:?}");

    let config = Config::builder().use_ipv6(args.ipv6).build();
    let transport = ReqwestTransport::new(&config)?;
    let document = report::run(&config, &transport, &args.command()).await;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn enable_tracing(verbose: u8) -> tracing::dispatcher::DefaultGuard {
    let max_level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = tracing_subscriber::fmt()
        .with_level(true)
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_default(subscriber)
}

/// Fetches EC2 metadata.
#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = DESCRIPTION)]
struct Args {
    /// Use the IPv6 metadata endpoint.
    #[arg(short = '6', long)]
    ipv6: bool,

    /// Specific metadata key or path to fetch.
    ///
    /// If empty, lists all keys at the root path.
    #[arg(short, long, default_value = "")]
    key: String,

    /// Show only the value of the specified key in simple JSON format.
    #[arg(short, long)]
    simple: bool,

    /// Check IMDS version support (v1, v2, or both).
    #[arg(short = 'v', long)]
    check_imds_version: bool,

    /// Check if metadata access is enabled.
    #[arg(short = 'm', long)]
    check_metadata_access: bool,

    /// Log progress to stderr. Repeat for more detail.
    #[arg(long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn command(&self) -> Command {
        if self.check_metadata_access {
            Command::AccessCheck
        } else if self.check_imds_version {
            Command::VersionCheck
        } else {
            Command::Fetch {
                key: self.key.clone(),
                simple: self.simple,
            }
        }
    }
}
