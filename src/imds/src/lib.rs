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

//! Diagnostics for the EC2 [Instance Metadata Service] (IMDS).
//!
//! The metadata service is a link-local HTTP service that exposes the
//! configuration of the instance as a hierarchy of keys. This crate answers
//! three questions about it:
//! * is the service reachable at all?
//! * which access modes does it support: token-based (IMDSv2), legacy
//!   unauthenticated (IMDSv1), both, or neither?
//! * what is stored under a given key, as a nested JSON document?
//!
//! The service never says whether a key is a directory or a value. The
//! [node] module infers that from the shape of each response, and the
//! [walker] module uses that inference to expand directories recursively.
//!
//! Example usage:
//!
//! ```no_run
//! # use imds_probe::{config::Config, report};
//! # tokio_test::block_on(async {
//! let config = Config::builder().build();
//! let transport = imds_probe::transport::ReqwestTransport::new(&config)?;
//! let document = report::access_check(&config, &transport).await;
//! println!("{}", serde_json::to_string_pretty(&document)?);
//! # Ok::<(), anyhow::Error>(())
//! # });
//! ```
//!
//! [Instance Metadata Service]: https://docs.aws.amazon.com/AWSEC2/latest/UserGuide/instancedata-data-retrieval.html

pub mod config;
pub mod document;
pub mod errors;
pub mod node;
pub mod probe;
pub mod report;
pub mod token;
pub mod transport;
pub mod walker;

pub use errors::Error;

/// A `Result` alias where the `Err` case is [Error].
pub type Result<T> = std::result::Result<T, Error>;
