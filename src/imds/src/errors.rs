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

//! Errors produced while talking to the metadata service.
//!
//! None of these errors are fatal for the tool. Callers absorb them into
//! "not reachable", "legacy mode", or "no metadata found" outcomes, but the
//! error still carries enough detail to explain the outcome in the logs.

use http::StatusCode;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type for metadata service operations.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    /// The request could not be sent, or the response could not be read.
    ///
    /// Timeouts, refused connections, and unroutable link-local addresses all
    /// land here.
    pub fn is_transport(&self) -> bool {
        matches!(self.0, ErrorKind::Transport(_))
    }

    /// The service answered with a non-success status code.
    pub fn is_status(&self) -> bool {
        matches!(self.0, ErrorKind::Status(_))
    }

    /// The status code returned by the service, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match &self.0 {
            ErrorKind::Status(status) => Some(*status),
            _ => None,
        }
    }

    /// The service answered with an empty body.
    ///
    /// An empty value is reported as missing, the same as a failed fetch.
    pub fn is_empty_body(&self) -> bool {
        matches!(self.0, ErrorKind::EmptyBody)
    }

    /// A directory was nested deeper than the configured maximum.
    pub fn is_depth_exceeded(&self) -> bool {
        matches!(self.0, ErrorKind::DepthExceeded(_))
    }

    /// A directory listed more children than the configured maximum.
    pub fn is_fan_out_exceeded(&self) -> bool {
        matches!(self.0, ErrorKind::FanOutExceeded { .. })
    }

    /// A header value could not be built from the token or configuration.
    pub fn is_invalid_header(&self) -> bool {
        matches!(self.0, ErrorKind::InvalidHeader(_))
    }

    pub(crate) fn transport<T>(source: T) -> Error
    where
        T: Into<BoxError>,
    {
        Error(ErrorKind::Transport(source.into()))
    }

    pub(crate) fn status_code(status: StatusCode) -> Error {
        Error(ErrorKind::Status(status))
    }

    pub(crate) fn empty_body() -> Error {
        Error(ErrorKind::EmptyBody)
    }

    pub(crate) fn depth_exceeded(limit: usize) -> Error {
        Error(ErrorKind::DepthExceeded(limit))
    }

    pub(crate) fn fan_out_exceeded(count: usize, limit: usize) -> Error {
        Error(ErrorKind::FanOutExceeded { count, limit })
    }

    pub(crate) fn invalid_header<T>(source: T) -> Error
    where
        T: Into<BoxError>,
    {
        Error(ErrorKind::InvalidHeader(source.into()))
    }
}

#[derive(thiserror::Error, Debug)]
enum ErrorKind {
    #[error("cannot reach the metadata service: {0}")]
    Transport(#[source] BoxError),
    #[error("the metadata service returned status {0}")]
    Status(StatusCode),
    #[error("the metadata service returned an empty body")]
    EmptyBody,
    #[error("metadata hierarchy is nested deeper than {0} levels")]
    DepthExceeded(usize),
    #[error("metadata directory lists {count} children, the limit is {limit}")]
    FanOutExceeded { count: usize, limit: usize },
    #[error("cannot build request header: {0}")]
    InvalidHeader(#[source] BoxError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn constructors() {
        let error = Error::transport("connection refused");
        assert!(error.is_transport(), "{error:?}");
        assert!(error.source().is_some(), "{error:?}");
        assert!(error.to_string().contains("connection refused"), "{error}");
        assert_eq!(error.status(), None);

        let error = Error::status_code(StatusCode::UNAUTHORIZED);
        assert!(error.is_status(), "{error:?}");
        assert!(error.source().is_none(), "{error:?}");
        assert_eq!(error.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(error.to_string().contains("401"), "{error}");

        let error = Error::empty_body();
        assert!(error.is_empty_body(), "{error:?}");
        assert!(error.source().is_none(), "{error:?}");

        let error = Error::depth_exceeded(32);
        assert!(error.is_depth_exceeded(), "{error:?}");
        assert!(error.to_string().contains("32"), "{error}");

        let error = Error::fan_out_exceeded(10, 5);
        assert!(error.is_fan_out_exceeded(), "{error:?}");
        assert!(error.to_string().contains("10 children"), "{error}");

        let error = Error::invalid_header("bad byte");
        assert!(error.is_invalid_header(), "{error:?}");
        assert!(error.source().is_some(), "{error:?}");
    }
}
