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

use std::time::Duration;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::client::{Client, USER_AGENT_VALUE};
use crate::error::Error;

/// The claims of a customer sign-in token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInClaims {
    /// The library that issued the token.
    pub iss: String,
    /// The Invoiced ID of the customer being signed in.
    pub sub: i64,
    /// When the token was issued, in seconds since the Unix epoch.
    pub iat: i64,
    /// When the token expires, in seconds since the Unix epoch.
    pub exp: i64,
}

impl Client {
    /// Generates a single sign-on token that signs `customer_id` into the
    /// customer portal for `ttl`.
    ///
    /// Requires a key configured with [`ClientBuilder::with_sso_key`].
    ///
    /// [`ClientBuilder::with_sso_key`]: crate::ClientBuilder::with_sso_key
    pub fn generate_sign_in_token(&self, customer_id: i64, ttl: Duration) -> Result<String, Error> {
        self.sign_in_token_at(customer_id, ttl, OffsetDateTime::now_utc())
    }

    /// Like [`Client::generate_sign_in_token`], but issued at `now` rather
    /// than the current time.
    pub fn sign_in_token_at(
        &self,
        customer_id: i64,
        ttl: Duration,
        now: OffsetDateTime,
    ) -> Result<String, Error> {
        let sso_key = match &self.sso_key {
            Some(key) if !key.is_empty() => key,
            _ => {
                return Err(Error::InvalidArgument(
                    "Please provide a single sign-on key! You can find this value in \
                     Settings > Developers > Single Sign-On of the Invoiced application."
                        .into(),
                ))
            }
        };
        let iat = now.unix_timestamp();
        let ttl = i64::try_from(ttl.as_secs())
            .map_err(|_| Error::InvalidArgument(format!("sign-in TTL too large: {ttl:?}")))?;
        let claims = SignInClaims {
            iss: USER_AGENT_VALUE.into(),
            sub: customer_id,
            iat,
            exp: iat.saturating_add(ttl),
        };
        let key = EncodingKey::from_secret(sso_key.as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &key)
            .map_err(|e| Error::InvalidArgument(format!("unable to sign token: {e}")))
    }
}
