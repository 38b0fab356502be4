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

//! Endpoint selection and the fixed protocol settings.
//!
//! A [Config] is built once, at startup, and passed by reference to every
//! operation. Nothing in it changes afterwards.

use std::time::Duration;

/// The IPv4 link-local address of the metadata service.
pub const IPV4_ENDPOINT: &str = "http://169.254.169.254";
/// The IPv6 address of the metadata service (Nitro instances only).
pub const IPV6_ENDPOINT: &str = "http://[fd00:ec2::254]";
/// Overrides the base address, mostly useful for testing.
pub const ENDPOINT_ENV_VAR: &str = "AWS_EC2_METADATA_SERVICE_ENDPOINT";

pub(crate) const TOKEN_PATH: &str = "/latest/api/token";
pub(crate) const METADATA_PATH: &str = "/latest/meta-data/";
pub(crate) const TOKEN_TTL_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";
pub(crate) const TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";
/// The leaf key used to test reachability.
pub(crate) const PROBE_KEY: &str = "instance-id";

const DEFAULT_TOKEN_TTL_SECONDS: u64 = 21600;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_MAX_DEPTH: usize = 32;
const DEFAULT_MAX_CHILDREN: usize = 4096;

/// The two address families where the metadata service listens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AddressFamily {
    #[default]
    Ipv4,
    Ipv6,
}

/// The base address of the metadata service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    family: AddressFamily,
    base: String,
}

impl Endpoint {
    fn new(family: AddressFamily, base: String) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self { family, base }
    }

    /// The address family selected on the command line.
    ///
    /// This is the selection, an override in [ENDPOINT_ENV_VAR] does not
    /// change it.
    pub fn family(&self) -> AddressFamily {
        self.family
    }

    /// The base address, without a trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The URL for the token handshake.
    pub fn token_url(&self) -> String {
        format!("{}{TOKEN_PATH}", self.base)
    }

    /// The URL for a metadata key. The empty key is the root listing.
    pub fn metadata_url(&self, key_path: &str) -> String {
        format!("{}{METADATA_PATH}{key_path}", self.base)
    }
}

/// Settings shared by every request made during one invocation.
#[derive(Clone, Debug)]
pub struct Config {
    endpoint: Endpoint,
    token_ttl_seconds: u64,
    timeout: Duration,
    max_depth: usize,
    max_children: usize,
}

impl Config {
    /// Returns a builder with the default settings.
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The lifetime requested for new tokens.
    pub fn token_ttl_seconds(&self) -> u64 {
        self.token_ttl_seconds
    }

    /// The timeout applied to each request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// How many directory levels below the requested key are expanded.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// How many children a single directory may list.
    pub fn max_children(&self) -> usize {
        self.max_children
    }
}

/// Creates [Config] instances.
#[derive(Debug, Default)]
pub struct Builder {
    family: AddressFamily,
    endpoint: Option<String>,
    token_ttl_seconds: Option<u64>,
    timeout: Option<Duration>,
    max_depth: Option<usize>,
    max_children: Option<usize>,
}

impl Builder {
    /// Use the IPv6 address of the metadata service.
    pub fn use_ipv6(mut self, v: bool) -> Self {
        self.family = if v {
            AddressFamily::Ipv6
        } else {
            AddressFamily::Ipv4
        };
        self
    }

    /// Sets the base address, e.g. `http://127.0.0.1:8080`.
    ///
    /// The [ENDPOINT_ENV_VAR] environment variable takes precedence over this
    /// setting.
    pub fn endpoint<S: Into<String>>(mut self, v: S) -> Self {
        self.endpoint = Some(v.into());
        self
    }

    pub fn token_ttl_seconds(mut self, v: u64) -> Self {
        self.token_ttl_seconds = Some(v);
        self
    }

    pub fn timeout(mut self, v: Duration) -> Self {
        self.timeout = Some(v);
        self
    }

    pub fn max_depth(mut self, v: usize) -> Self {
        self.max_depth = Some(v);
        self
    }

    pub fn max_children(mut self, v: usize) -> Self {
        self.max_children = Some(v);
        self
    }

    pub fn build(self) -> Config {
        Config {
            endpoint: Endpoint::new(self.family, resolve_base(self.family, self.endpoint)),
            token_ttl_seconds: self.token_ttl_seconds.unwrap_or(DEFAULT_TOKEN_TTL_SECONDS),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
            max_children: self.max_children.unwrap_or(DEFAULT_MAX_CHILDREN),
        }
    }
}

fn resolve_base(family: AddressFamily, endpoint_override: Option<String>) -> String {
    if let Ok(base) = std::env::var(ENDPOINT_ENV_VAR) {
        base
    } else if let Some(base) = endpoint_override {
        base
    } else {
        match family {
            AddressFamily::Ipv4 => IPV4_ENDPOINT.to_string(),
            AddressFamily::Ipv6 => IPV6_ENDPOINT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::builder().endpoint("http://test-only").build();
        assert_eq!(config.token_ttl_seconds(), 21600);
        assert_eq!(config.timeout(), Duration::from_secs(2));
        assert_eq!(config.max_depth(), DEFAULT_MAX_DEPTH);
        assert_eq!(config.max_children(), DEFAULT_MAX_CHILDREN);
        assert_eq!(config.endpoint().family(), AddressFamily::Ipv4);
    }

    #[test]
    fn urls() {
        let config = Config::builder().endpoint("http://test-only/").build();
        let endpoint = config.endpoint();
        assert_eq!(endpoint.base(), "http://test-only");
        assert_eq!(endpoint.token_url(), "http://test-only/latest/api/token");
        assert_eq!(endpoint.metadata_url(""), "http://test-only/latest/meta-data/");
        assert_eq!(
            endpoint.metadata_url("network/interfaces/"),
            "http://test-only/latest/meta-data/network/interfaces/"
        );
    }

    #[test]
    fn overrides() {
        let config = Config::builder()
            .endpoint("http://test-only")
            .token_ttl_seconds(60)
            .timeout(Duration::from_millis(250))
            .max_depth(3)
            .max_children(7)
            .build();
        assert_eq!(config.token_ttl_seconds(), 60);
        assert_eq!(config.timeout(), Duration::from_millis(250));
        assert_eq!(config.max_depth(), 3);
        assert_eq!(config.max_children(), 7);
    }
}
