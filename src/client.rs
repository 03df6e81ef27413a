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

use std::collections::BTreeMap;
use std::fmt;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode, Url};
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::RequestOptions;
use crate::error::{ApiError, Error};
use crate::util;
use crate::{ClientBuilder, ClientConfig};

pub mod object;
pub mod resources;
pub mod sso;

/// Request parameters: a query string for `GET` and `DELETE` requests, a
/// JSON body for every other method.
pub type Params = serde_json::Map<String, Value>;

/// Identifies this library in the `User-Agent` header and in sign-in tokens.
pub(crate) const USER_AGENT_VALUE: &str = concat!("Invoiced Rust/", env!("CARGO_PKG_VERSION"));

/// An API client for Invoiced.
///
/// The API client is designed to be wrapped in an [`Arc`] and used from
/// multiple threads simultaneously.
///
/// [`Arc`]: std::sync::Arc
pub struct Client {
    pub(crate) inner: ClientWithMiddleware,
    pub(crate) api_key: String,
    pub(crate) sandbox: bool,
    pub(crate) endpoint: Url,
    pub(crate) sso_key: Option<String>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("sandbox", &self.sandbox)
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

/// A successful response from the API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// The HTTP status code.
    pub code: u16,
    /// The response headers, keyed by lowercase name. Repeated headers are
    /// joined with `", "`.
    pub headers: BTreeMap<String, String>,
    /// The decoded body. Absent only for `204 No Content` responses.
    pub body: Option<Value>,
}

impl Client {
    /// Creates a new `Client` from its required configuration parameters.
    pub fn new(config: ClientConfig) -> Result<Client, Error> {
        ClientBuilder::default().build(config)
    }

    /// Creates a builder for a `Client` that allows for customization of
    /// optional parameters.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Returns the API key used by this client.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the base URL that requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Reports whether this client talks to the sandbox API.
    pub fn is_sandbox(&self) -> bool {
        self.sandbox
    }

    /// Performs an API request.
    ///
    /// `method` is case insensitive. For `GET` and `DELETE` requests `params`
    /// are sent in the query string; for every other method they are sent as
    /// the JSON body.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        params: &Params,
        options: &RequestOptions,
    ) -> Result<ApiResponse, Error> {
        let method = parse_method(method)?;
        let req = self.build_request(method.clone(), util::path_segments(path));
        let req = match &options.idempotency_key {
            Some(key) if !key.is_empty() => req.header("Idempotency-Key", key),
            _ => req,
        };
        let req = if method == Method::GET || method == Method::DELETE {
            let query = util::query_pairs(params);
            if query.is_empty() {
                req
            } else {
                req.query(&query)
            }
        } else {
            let body = serde_json::to_vec(params)
                .map_err(|e| Error::InvalidArgument(format!("unable to encode params: {e}")))?;
            req.body(body)
        };
        debug!(%method, path, "sending request");
        self.send_request(req).await
    }

    fn build_request<P>(&self, method: Method, path: P) -> RequestBuilder
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .expect("builder validated URL can be a base")
            .pop_if_empty()
            .extend(path);
        self.inner
            .request(method, url)
            .basic_auth(&self.api_key, Some(""))
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, USER_AGENT_VALUE)
    }

    async fn send_request(&self, req: RequestBuilder) -> Result<ApiResponse, Error> {
        let res = req.send().await?;
        let status_code = res.status();
        let headers = flatten_headers(res.headers());
        let res_body = res.text().await?;
        debug!(status = status_code.as_u16(), "received response");
        classify(status_code, headers, &res_body)
    }
}

fn parse_method(method: &str) -> Result<Method, Error> {
    match method.to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "PATCH" => Ok(Method::PATCH),
        "DELETE" => Ok(Method::DELETE),
        _ => Err(Error::InvalidArgument(format!(
            "unsupported HTTP method {method:?}"
        ))),
    }
}

fn flatten_headers(headers: &reqwest::header::HeaderMap) -> BTreeMap<String, String> {
    headers
        .keys()
        .map(|name| {
            let values: Vec<_> = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect();
            (name.as_str().to_owned(), values.join(", "))
        })
        .collect()
}

/// Turns a raw HTTP response into a response envelope or a typed error.
fn classify(
    status_code: StatusCode,
    headers: BTreeMap<String, String>,
    res_body: &str,
) -> Result<ApiResponse, Error> {
    let code = status_code.as_u16();
    if (200..400).contains(&code) {
        let body = if status_code == StatusCode::NO_CONTENT {
            None
        } else {
            match serde_json::from_str(res_body) {
                Ok(body) => Some(body),
                Err(e) => {
                    warn!(code, "unable to decode API response as JSON: {e}");
                    return Err(Error::Api(ApiError {
                        message: format!("could not decode JSON of {code} response: {res_body}"),
                        status_code: code,
                        body: None,
                    }));
                }
            }
        };
        return Ok(ApiResponse {
            code,
            headers,
            body,
        });
    }

    let error = match serde_json::from_str::<Value>(res_body) {
        Ok(error) => error,
        Err(e) => {
            warn!(code, "unable to decode API error as JSON: {e}");
            return Err(Error::Api(ApiError::general(code, res_body, None)));
        }
    };
    let message = match error.get("message").and_then(Value::as_str) {
        Some(message) => message.to_owned(),
        None => return Err(Error::Api(ApiError::general(code, res_body, Some(error)))),
    };
    let e = ApiError {
        message,
        status_code: code,
        body: Some(error),
    };
    Err(match code {
        401 => Error::Authentication(e),
        400 | 403 | 404 => Error::InvalidRequest(e),
        429 => Error::RateLimit(e),
        _ => Error::Api(e),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("get").unwrap(), Method::GET);
        assert_eq!(parse_method("Patch").unwrap(), Method::PATCH);
        assert!(matches!(
            parse_method("TRACE"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_classify_success() {
        let res = classify(StatusCode::OK, BTreeMap::new(), r#"{"id":1}"#).unwrap();
        assert_eq!(res.code, 200);
        assert_eq!(res.body, Some(json!({"id": 1})));

        let res = classify(StatusCode::NO_CONTENT, BTreeMap::new(), "").unwrap();
        assert_eq!(res.body, None);

        let err = classify(StatusCode::OK, BTreeMap::new(), "not json").unwrap_err();
        assert_eq!(err.status_code(), 200);
        assert!(err.message().contains("not json"));
    }

    #[test]
    fn test_classify_dispatch() {
        let cases = [
            (401, "Authentication"),
            (400, "InvalidRequest"),
            (403, "InvalidRequest"),
            (404, "InvalidRequest"),
            (429, "RateLimit"),
            (500, "Api"),
            (502, "Api"),
        ];
        for (code, kind) in cases {
            let status = StatusCode::from_u16(code).unwrap();
            let err = classify(status, BTreeMap::new(), r#"{"message":"oops"}"#).unwrap_err();
            let actual = match &err {
                Error::Authentication(_) => "Authentication",
                Error::InvalidRequest(_) => "InvalidRequest",
                Error::RateLimit(_) => "RateLimit",
                Error::Api(_) => "Api",
                _ => "other",
            };
            assert_eq!(actual, kind, "status {code}");
            assert_eq!(err.status_code(), code);
            assert_eq!(err.message(), "oops");
            assert_eq!(err.body(), Some(&json!({"message": "oops"})));
        }
    }

    #[test]
    fn test_classify_undecodable_error() {
        let err = classify(StatusCode::BAD_GATEWAY, BTreeMap::new(), "<html>").unwrap_err();
        assert!(matches!(err, Error::Api(_)));
        assert_eq!(err.message(), "API Error 502 - <html>");
        assert_eq!(err.body(), None);

        let err = classify(StatusCode::NOT_FOUND, BTreeMap::new(), r#"{"type":"x"}"#).unwrap_err();
        assert!(matches!(err, Error::Api(_)));
        assert_eq!(err.message(), r#"API Error 404 - {"type":"x"}"#);
        assert_eq!(err.body(), Some(&json!({"type": "x"})));
    }
}
