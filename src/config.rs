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

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::{Certificate, Url};
use reqwest_middleware::Middleware;

use crate::client::Client;
use crate::error::Error;

/// The endpoint of the production API.
pub static PRODUCTION_ENDPOINT: Lazy<Url> = Lazy::new(|| {
    "https://api.invoiced.com"
        .parse()
        .expect("url known to be valid")
});

/// The endpoint of the sandbox API.
pub static SANDBOX_ENDPOINT: Lazy<Url> = Lazy::new(|| {
    "https://api.sandbox.invoiced.com"
        .parse()
        .expect("url known to be valid")
});

pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub(crate) const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Configures the required parameters of a [`Client`].
pub struct ClientConfig {
    /// The API key to authenticate with.
    pub api_key: String,
}

/// A builder for a [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    sandbox: bool,
    endpoint: Option<Url>,
    sso_key: Option<String>,
    ca_bundle: Option<PathBuf>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl ClientBuilder {
    /// Directs requests at the sandbox API rather than production.
    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Sets the endpoint.
    ///
    /// Takes precedence over [`ClientBuilder::with_sandbox`].
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Sets the single sign-on key used by
    /// [`Client::generate_sign_in_token`].
    ///
    /// The key is listed under Settings > Developers > Single Sign-On in the
    /// Invoiced application.
    pub fn with_sso_key(mut self, sso_key: impl Into<String>) -> Self {
        self.sso_key = Some(sso_key.into());
        self
    }

    /// Trusts every certificate in the PEM bundle at `path` in addition to
    /// the default roots.
    pub fn with_ca_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_bundle = Some(path.into());
        self
    }

    /// Adds middleware to the HTTP stack.
    ///
    /// The created [`Client`] never retries on its own. Callers that want
    /// retries or request logging can install middleware for them here.
    pub fn with_middleware<M>(mut self, middleware: M) -> Self
    where
        M: Middleware,
    {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Creates a [`Client`] that incorporates the optional parameters
    /// configured on the builder and the specified required parameters.
    pub fn build(self, config: ClientConfig) -> Result<Client, Error> {
        if config.api_key.is_empty() {
            return Err(Error::InvalidArgument(
                "You must provide an API Key".into(),
            ));
        }
        let mut builder = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT);
        if let Some(path) = &self.ca_bundle {
            let pem = fs::read(path).map_err(|e| {
                Error::InvalidArgument(format!(
                    "unable to read CA bundle {}: {e}",
                    path.display()
                ))
            })?;
            let certs = Certificate::from_pem_bundle(&pem).map_err(|e| {
                Error::InvalidArgument(format!(
                    "unable to parse CA bundle {}: {e}",
                    path.display()
                ))
            })?;
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }
        let client = builder.build().map_err(|e| {
            Error::InvalidArgument(format!("unable to build HTTP client: {e}"))
        })?;
        let inner = self
            .middleware
            .into_iter()
            .fold(reqwest_middleware::ClientBuilder::new(client), |b, m| {
                b.with_arc(m)
            })
            .build();
        let endpoint = match self.endpoint {
            Some(endpoint) => endpoint,
            None if self.sandbox => SANDBOX_ENDPOINT.clone(),
            None => PRODUCTION_ENDPOINT.clone(),
        };
        if endpoint.cannot_be_a_base() {
            return Err(Error::InvalidArgument(format!(
                "endpoint {endpoint} cannot be a base URL"
            )));
        }
        Ok(Client {
            inner,
            api_key: config.api_key,
            sandbox: self.sandbox,
            endpoint,
            sso_key: self.sso_key,
        })
    }
}

/// Per-request options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub(crate) idempotency_key: Option<String>,
}

impl RequestOptions {
    /// The default request options.
    ///
    /// Exposed as a constant for use in constant evaluation contexts.
    pub const DEFAULT: RequestOptions = RequestOptions {
        idempotency_key: None,
    };

    /// Sets the idempotency key for the request.
    ///
    /// The API performs a write at most once per key, which allows a failed
    /// request to be safely retried. An empty key is not sent.
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}
