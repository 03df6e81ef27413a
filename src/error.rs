// Copyright Materialize, Inc. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository, or online at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde_json::Value;
use thiserror::Error;

/// An error returned by a [`Client`] or an [`Object`].
///
/// Errors fall into two groups. [`Error::InvalidArgument`] and
/// [`Error::MissingField`] are detected locally, before any request is sent.
/// Every other variant describes the outcome of a request, and
/// [`Error::is_api_error`] distinguishes the ones the API itself reported.
///
/// [`Client`]: crate::Client
/// [`Object`]: crate::Object
#[derive(Debug, Error)]
pub enum Error {
    /// A precondition was violated before any request was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A field was read that was never set or loaded.
    #[error("undefined field `{field}` of {resource}")]
    MissingField {
        /// The resource type name.
        resource: &'static str,
        /// The requested field.
        field: String,
    },
    /// The request could not complete its round trip.
    #[error("{message}")]
    Connection {
        /// A description of the failure, including its underlying cause.
        message: String,
        /// The underlying transport error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The API rejected the credentials (HTTP 401).
    #[error(transparent)]
    Authentication(ApiError),
    /// The API rejected the request (HTTP 400, 403, or 404).
    #[error(transparent)]
    InvalidRequest(ApiError),
    /// The API is rate limiting this client (HTTP 429).
    #[error(transparent)]
    RateLimit(ApiError),
    /// Any other failure reported by, or decoding failure of, the API.
    #[error(transparent)]
    Api(ApiError),
}

/// An error returned by the Invoiced API.
///
/// For details, see: <https://developer.invoiced.com/api/#errors>
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ApiError {
    /// A human-readable description of the error.
    pub message: String,
    /// The HTTP status code.
    pub status_code: u16,
    /// The decoded error body, if the response carried valid JSON.
    pub body: Option<Value>,
}

impl ApiError {
    /// The fallback used when an error response cannot be interpreted.
    pub(crate) fn general(status_code: u16, raw_body: &str, body: Option<Value>) -> ApiError {
        ApiError {
            message: format!("API Error {status_code} - {raw_body}"),
            status_code,
            body,
        }
    }
}

impl Error {
    pub(crate) fn connection<E>(e: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Connection {
            message: format!(
                "There was an error connecting to the Invoiced API. Please check \
                 your internet connection or status.invoiced.com for service \
                 outages. The reason was: {e}"
            ),
            source: Box::new(e),
        }
    }

    /// Returns the API error details, if the API reported this error.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Authentication(e)
            | Error::InvalidRequest(e)
            | Error::RateLimit(e)
            | Error::Api(e) => Some(e),
            Error::InvalidArgument(_) | Error::MissingField { .. } | Error::Connection { .. } => {
                None
            }
        }
    }

    /// Reports whether this error originated from an API response rather
    /// than from local validation or the transport.
    pub fn is_api_error(&self) -> bool {
        self.api_error().is_some()
    }

    /// Returns the HTTP status code, or `0` if no response was received.
    pub fn status_code(&self) -> u16 {
        self.api_error().map_or(0, |e| e.status_code)
    }

    /// Returns the decoded error body, if any.
    pub fn body(&self) -> Option<&Value> {
        self.api_error().and_then(|e| e.body.as_ref())
    }

    /// Returns the human-readable error message.
    pub fn message(&self) -> String {
        match self {
            Error::Connection { message, .. } => message.clone(),
            _ => match self.api_error() {
                Some(e) => e.message.clone(),
                None => self.to_string(),
            },
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(e: reqwest_middleware::Error) -> Error {
        Error::connection(e)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Error {
        Error::connection(e)
    }
}
