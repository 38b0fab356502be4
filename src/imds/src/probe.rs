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

//! Reachability and access-mode detection.
//!
//! Every check reads the `instance-id` key, which exists on every instance.
//! Token-based access is always attempted first; legacy access is only tried
//! when the token-based attempt did not succeed.

use crate::config::{Config, PROBE_KEY};
use crate::token::{Token, acquire_token};
use crate::transport::{Transport, get_metadata};
use http::StatusCode;

/// How the metadata service can be reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reachability {
    /// Neither token-based nor legacy access works.
    Disabled,
    /// Only unauthenticated (IMDSv1) access works.
    Legacy,
    /// Token-based (IMDSv2) access works. Legacy access may work too, it is
    /// not tested.
    Token(Token),
}

impl Reachability {
    pub fn is_reachable(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// The token to attach to subsequent requests, if any.
    pub fn token(&self) -> Option<&Token> {
        match self {
            Self::Token(t) => Some(t),
            _ => None,
        }
    }
}

/// The access modes supported by the metadata service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionSupport {
    Both,
    V1Only,
    V2Only,
    Neither,
}

impl VersionSupport {
    pub fn new(v1: bool, v2: bool) -> Self {
        match (v1, v2) {
            (true, true) => Self::Both,
            (true, false) => Self::V1Only,
            (false, true) => Self::V2Only,
            (false, false) => Self::Neither,
        }
    }
}

impl std::fmt::Display for VersionSupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Self::Both => "Supports both IMDSv1 and IMDSv2",
            Self::V1Only => "Supports only IMDSv1",
            Self::V2Only => "Supports only IMDSv2",
            Self::Neither => "Does not support IMDSv1 or IMDSv2",
        };
        f.write_str(msg)
    }
}

/// Determines whether the metadata service is reachable, and how.
pub async fn probe<T>(config: &Config, transport: &T) -> Reachability
where
    T: Transport + ?Sized,
{
    let mut reachability = Reachability::Disabled;
    if let Some(token) = acquire_token(config, transport).await {
        if probe_key(config, transport, Some(&token)).await {
            reachability = Reachability::Token(token);
        }
    }
    if !reachability.is_reachable() && probe_key(config, transport, None).await {
        reachability = Reachability::Legacy;
    }
    tracing::info!(
        endpoint = config.endpoint().base(),
        reachable = reachability.is_reachable(),
        token = reachability.token().is_some(),
        "metadata service probe"
    );
    reachability
}

/// Tests token-based and legacy access independently.
///
/// This repeats the token handshake even if [probe] already ran, so the
/// answer reflects the service's current configuration.
pub async fn classify_version_support<T>(config: &Config, transport: &T) -> VersionSupport
where
    T: Transport + ?Sized,
{
    let v2 = match acquire_token(config, transport).await {
        Some(token) => probe_key(config, transport, Some(&token)).await,
        None => false,
    };
    let v1 = probe_key(config, transport, None).await;
    let support = VersionSupport::new(v1, v2);
    tracing::info!(v1, v2, "{support}");
    support
}

/// Checks whether the metadata service answers on the configured endpoint.
///
/// The CLI builds `config` for the IPv6 endpoint before calling this. The
/// check is the same token-first, legacy-second probe as [probe].
pub async fn is_ipv6_enabled<T>(config: &Config, transport: &T) -> bool
where
    T: Transport + ?Sized,
{
    probe(config, transport).await.is_reachable()
}

async fn probe_key<T>(config: &Config, transport: &T, token: Option<&Token>) -> bool
where
    T: Transport + ?Sized,
{
    matches!(
        get_metadata(config, transport, token, PROBE_KEY).await,
        Ok(response) if response.status == StatusCode::OK
    )
}
