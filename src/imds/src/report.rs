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

//! The documents printed by the command-line tool.
//!
//! Each function runs one command end to end and returns the JSON document
//! describing the outcome. Failures are part of the outcome: they produce an
//! `{"error": ...}` document, never an `Err`.

use crate::config::{AddressFamily, Config};
use crate::document::rewrap;
use crate::node::Classification;
use crate::probe::{classify_version_support, is_ipv6_enabled, probe};
use crate::transport::Transport;
use crate::walker;
use serde_json::{Value, json};

pub const IPV6_DISABLED: &str = "IPv6 is not enabled on this instance.";
pub const VERSION_CHECK_DISABLED: &str = "Metadata access is disabled. Cannot check IMDS version.";
pub const FETCH_DISABLED: &str =
    "Metadata access is disabled. Cannot fetch metadata or list keys.";
pub const NO_VALUE: &str = "No value found for the specified key.";
pub const NO_METADATA: &str = "No metadata found.";
pub const NO_KEYS: &str = "No keys found.";

/// What the tool was asked to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Report whether the metadata service is reachable.
    AccessCheck,
    /// Report which access modes the service supports.
    VersionCheck,
    /// Fetch a key, or the whole hierarchy if `key` is empty.
    Fetch { key: String, simple: bool },
}

/// Runs `command` against the endpoint in `config`.
///
/// When `config` selects the IPv6 endpoint, the endpoint is checked first and
/// nothing else runs if it does not answer.
pub async fn run<T>(config: &Config, transport: &T, command: &Command) -> Value
where
    T: Transport + ?Sized,
{
    if config.endpoint().family() == AddressFamily::Ipv6
        && !is_ipv6_enabled(config, transport).await
    {
        return error(IPV6_DISABLED);
    }
    match command {
        Command::AccessCheck => access_check(config, transport).await,
        Command::VersionCheck => version_check(config, transport).await,
        Command::Fetch { key, simple } => fetch(config, transport, key, *simple).await,
    }
}

/// `{"metadata_access": "enabled"}` or `{"metadata_access": "disabled"}`.
pub async fn access_check<T>(config: &Config, transport: &T) -> Value
where
    T: Transport + ?Sized,
{
    let access = if probe(config, transport).await.is_reachable() {
        "enabled"
    } else {
        "disabled"
    };
    json!({"metadata_access": access})
}

/// `{"imds_version_support": ...}`, if the service is reachable at all.
pub async fn version_check<T>(config: &Config, transport: &T) -> Value
where
    T: Transport + ?Sized,
{
    if !probe(config, transport).await.is_reachable() {
        return error(VERSION_CHECK_DISABLED);
    }
    let support = classify_version_support(config, transport).await;
    json!({"imds_version_support": support.to_string()})
}

/// Fetches `key`, or every key when `key` is empty.
///
/// With `simple` set, `key` must name a value and the document is
/// `{"value": ...}`. Otherwise the resolved subtree is nested under the
/// segments of `key`.
pub async fn fetch<T>(config: &Config, transport: &T, key: &str, simple: bool) -> Value
where
    T: Transport + ?Sized,
{
    let reachability = probe(config, transport).await;
    if !reachability.is_reachable() {
        return error(FETCH_DISABLED);
    }
    let token = reachability.token();

    if key.is_empty() {
        return match walker::resolve(config, transport, token, "").await {
            Some(node) if !node.is_empty() => Value::from(node),
            _ => error(NO_KEYS),
        };
    }
    if simple {
        return match walker::fetch(config, transport, token, key).await {
            Ok(Classification::Leaf(v)) if !v.is_empty() => json!({"value": v}),
            _ => error(NO_VALUE),
        };
    }
    match walker::resolve(config, transport, token, key).await {
        Some(node) if !node.is_empty() => rewrap(key, node),
        _ => error(NO_METADATA),
    }
}

fn error(message: &str) -> Value {
    json!({"error": message})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TOKEN_HEADER;
    use crate::transport::tests::{MockTransport, ok, status, test_config, unreachable};
    use crate::transport::{Request, Response};
    use http::{Method, StatusCode};

    /// A fake metadata service that only supports legacy access.
    fn legacy_service(r: Request) -> crate::Result<Response> {
        if r.method == Method::PUT || r.headers.contains_key(TOKEN_HEADER) {
            return status(StatusCode::FORBIDDEN);
        }
        match r.url.trim_start_matches("http://test-only/latest/meta-data/") {
            "" => ok("ami-id\ninstance-id\nplacement/"),
            "ami-id" => ok("ami-0abc"),
            "instance-id" => ok("i-123"),
            "placement/" => ok("availability-zone\nregion"),
            "placement/availability-zone" => ok("us-east-1a"),
            "placement/region" => ok("us-east-1"),
            _ => status(StatusCode::NOT_FOUND),
        }
    }

    fn legacy_transport() -> MockTransport {
        let mut transport = MockTransport::new();
        transport.expect_send().returning(legacy_service);
        transport
    }

    fn unreachable_transport() -> MockTransport {
        let mut transport = MockTransport::new();
        transport.expect_send().returning(|_| unreachable());
        transport
    }

    #[tokio::test]
    async fn access_disabled() {
        let transport = unreachable_transport();
        let got = access_check(&test_config(), &transport).await;
        assert_eq!(got, json!({"metadata_access": "disabled"}));
    }

    #[tokio::test]
    async fn access_enabled() {
        let got = access_check(&test_config(), &legacy_transport()).await;
        assert_eq!(got, json!({"metadata_access": "enabled"}));
    }

    #[tokio::test]
    async fn version_check_legacy_only() {
        let got = version_check(&test_config(), &legacy_transport()).await;
        assert_eq!(got, json!({"imds_version_support": "Supports only IMDSv1"}));
    }

    #[tokio::test]
    async fn version_check_short_circuits() {
        let mut transport = MockTransport::new();
        // One token handshake and one legacy probe, nothing else.
        transport.expect_send().times(2).returning(|_| unreachable());
        let got = version_check(&test_config(), &transport).await;
        assert_eq!(got, json!({"error": VERSION_CHECK_DISABLED}));
    }

    #[tokio::test]
    async fn fetch_short_circuits() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(2).returning(|_| unreachable());
        let got = fetch(&test_config(), &transport, "instance-id", false).await;
        assert_eq!(got, json!({"error": FETCH_DISABLED}));
    }

    #[tokio::test]
    async fn fetch_root() {
        let got = fetch(&test_config(), &legacy_transport(), "", false).await;
        let want = json!({
            "ami-id": "ami-0abc",
            "instance-id": "i-123",
            "placement/": {
                "availability-zone": "us-east-1a",
                "region": "us-east-1",
            },
        });
        assert_eq!(got, want);
    }

    #[tokio::test]
    async fn fetch_root_ignores_simple() {
        let got = fetch(&test_config(), &legacy_transport(), "", true).await;
        assert!(got.get("ami-id").is_some(), "{got}");
    }

    #[tokio::test]
    async fn fetch_nested_key() {
        let got = fetch(&test_config(), &legacy_transport(), "placement/", false).await;
        let want = json!({
            "placement": {
                "availability-zone": "us-east-1a",
                "region": "us-east-1",
            },
        });
        assert_eq!(got, want);
    }

    #[tokio::test]
    async fn fetch_leaf_key() {
        let got = fetch(&test_config(), &legacy_transport(), "placement/region", false).await;
        assert_eq!(got, json!({"placement": {"region": "us-east-1"}}));
    }

    #[tokio::test]
    async fn fetch_missing_key() {
        let got = fetch(&test_config(), &legacy_transport(), "missing", false).await;
        assert_eq!(got, json!({"error": NO_METADATA}));
    }

    #[tokio::test]
    async fn fetch_simple_value() {
        let got = fetch(&test_config(), &legacy_transport(), "instance-id", true).await;
        assert_eq!(got, json!({"value": "i-123"}));
    }

    #[tokio::test]
    async fn fetch_simple_directory() {
        let got = fetch(&test_config(), &legacy_transport(), "placement/", true).await;
        assert_eq!(got, json!({"error": NO_VALUE}));
    }

    #[tokio::test]
    async fn fetch_simple_missing() {
        let got = fetch(&test_config(), &legacy_transport(), "missing", true).await;
        assert_eq!(got, json!({"error": NO_VALUE}));
    }

    #[tokio::test]
    async fn fetch_empty_root() {
        let mut transport = MockTransport::new();
        transport.expect_send().returning(|r| {
            if r.method == Method::PUT {
                status(StatusCode::FORBIDDEN)
            } else if r.url.ends_with("instance-id") {
                ok("i-123")
            } else {
                ok("")
            }
        });
        let got = fetch(&test_config(), &transport, "", false).await;
        assert_eq!(got, json!({"error": NO_KEYS}));
    }

    #[tokio::test]
    async fn run_ipv6_disabled() {
        let config = crate::config::Config::builder()
            .use_ipv6(true)
            .endpoint("http://test-only")
            .build();
        let mut transport = MockTransport::new();
        // The IPv6 check makes two attempts, then nothing else runs.
        transport.expect_send().times(2).returning(|_| unreachable());
        let got = run(&config, &transport, &Command::AccessCheck).await;
        assert_eq!(got, json!({"error": IPV6_DISABLED}));
    }

    #[tokio::test]
    async fn run_ipv6_enabled() {
        let config = crate::config::Config::builder()
            .use_ipv6(true)
            .endpoint("http://test-only")
            .build();
        let got = run(&config, &legacy_transport(), &Command::AccessCheck).await;
        assert_eq!(got, json!({"metadata_access": "enabled"}));
    }

    #[tokio::test]
    async fn run_commands() {
        let config = test_config();
        let transport = legacy_transport();
        let got = run(&config, &transport, &Command::VersionCheck).await;
        assert_eq!(got, json!({"imds_version_support": "Supports only IMDSv1"}));
        let command = Command::Fetch {
            key: "ami-id".to_string(),
            simple: true,
        };
        let got = run(&config, &transport, &command).await;
        assert_eq!(got, json!({"value": "ami-0abc"}));
    }
}
