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

//! The HTTP boundary.
//!
//! Everything above this module sees a request go out and a status plus body
//! come back, or an [Error]. Each call is a single attempt bounded by the
//! configured timeout.

use crate::config::Config;
use crate::token::{self, Token};
use crate::{Error, Result};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};

/// A single request to the metadata service.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
}

impl Request {
    pub fn get<S: Into<String>>(url: S) -> Self {
        Self::new(Method::GET, url.into())
    }

    pub fn put<S: Into<String>>(url: S) -> Self {
        Self::new(Method::PUT, url.into())
    }

    fn new(method: Method, url: String) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// The status and body returned by the metadata service.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub body: String,
}

impl Response {
    /// Converts non-success responses into an error.
    pub fn success(self) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(Error::status_code(self.status))
        }
    }
}

/// Sends requests to the metadata service.
///
/// Implementations make exactly one attempt per call. Any status code is a
/// successful call at this level; callers decide what a non-success status
/// means for them.
#[async_trait::async_trait]
pub trait Transport: std::fmt::Debug + Send + Sync {
    async fn send(&self, request: Request) -> Result<Response>;
}

/// A [Transport] backed by [reqwest].
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(Error::transport)?;
        Ok(Self { inner })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        let response = self
            .inner
            .request(request.method, request.url)
            .headers(request.headers)
            .send()
            .await
            .map_err(Error::transport)?;
        let status = response.status();
        let body = response.text().await.map_err(Error::transport)?;
        Ok(Response { status, body })
    }
}

/// Sends a GET for `key_path`, attaching `token` when present.
pub(crate) async fn get_metadata<T>(
    config: &Config,
    transport: &T,
    token: Option<&Token>,
    key_path: &str,
) -> Result<Response>
where
    T: Transport + ?Sized,
{
    let url = config.endpoint().metadata_url(key_path);
    let request = token::authorize(Request::get(url.as_str()), token)?;
    let result = transport.send(request).await;
    match &result {
        Ok(response) => tracing::debug!(%url, status = %response.status, authenticated = token.is_some(), "GET"),
        Err(e) => tracing::debug!(%url, authenticated = token.is_some(), "GET failed: {e}"),
    }
    result
}
