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

//! Session tokens for the token-based (IMDSv2) access mode.
//!
//! A token is requested once per invocation with a `PUT` to the token path.
//! If that fails for any reason the tool continues in legacy (IMDSv1) mode,
//! so [acquire_token] returns an `Option` rather than a `Result`.

use crate::config::{Config, TOKEN_HEADER, TOKEN_TTL_HEADER};
use crate::transport::{Request, Transport};
use crate::{Error, Result};
use http::{HeaderName, HeaderValue};

/// An opaque session token.
///
/// The value is whatever the service returned, it is not parsed or
/// validated.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Token").field(&"[censored]").finish()
    }
}

/// Performs the token handshake.
///
/// Returns `None` on transport failures, non-success status codes, and empty
/// responses. None of these are errors: they mean "use legacy mode".
pub async fn acquire_token<T>(config: &Config, transport: &T) -> Option<Token>
where
    T: Transport + ?Sized,
{
    let request = Request::put(config.endpoint().token_url()).header(
        HeaderName::from_static(TOKEN_TTL_HEADER),
        HeaderValue::from(config.token_ttl_seconds()),
    );
    let response = match transport.send(request).await.and_then(|r| r.success()) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("token handshake failed, falling back to legacy mode: {e}");
            return None;
        }
    };
    if response.body.is_empty() {
        tracing::debug!("token handshake returned an empty token");
        return None;
    }
    tracing::debug!("token handshake succeeded");
    Some(Token(response.body))
}

/// Attaches the token header to `request`, if there is a token.
pub(crate) fn authorize(request: Request, token: Option<&Token>) -> Result<Request> {
    let Some(token) = token else {
        return Ok(request);
    };
    let mut value = HeaderValue::from_str(token.as_str()).map_err(Error::invalid_header)?;
    value.set_sensitive(true);
    Ok(request.header(HeaderName::from_static(TOKEN_HEADER), value))
}
