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

//! An async API client for the [Invoiced] billing platform.
//!
//! Every resource exposed by the API is reached through a named accessor on
//! [`Client`], which returns an untyped [`Object`] standing for the
//! resource's collection:
//!
//! ```no_run
//! # async fn example() -> Result<(), invoiced::Error> {
//! use invoiced::{Client, ClientConfig, Params, RequestOptions};
//! use serde_json::json;
//!
//! let client = Client::new(ClientConfig {
//!     api_key: "...".into(),
//! })?;
//! let mut params = Params::new();
//! params.insert("name".into(), json!("Acme"));
//! let mut customer = client
//!     .customer()
//!     .create(&params, &RequestOptions::DEFAULT)
//!     .await?;
//! customer.set("payment_terms", "NET 30")?;
//! customer.save(&RequestOptions::DEFAULT).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Maintainership
//!
//! This is not an official Invoiced product. This crate is developed by
//! [Materialize], the streaming data warehouse. Contributions are encouraged:
//!
//! * [View source code](https://github.com/MaterializeInc/rust-invoiced)
//! * [Report an issue](https://github.com/MaterializeInc/rust-invoiced/issues/new)
//! * [Submit a pull request](https://github.com/MaterializeInc/rust-invoiced/compare)
//!
//! [Materialize]: https://materialize.com
//!
//! # See also
//!
//! Additional information is available in the [official Invoiced API
//! documentation][official-api-docs].
//!
//! [Invoiced]: https://invoiced.com
//! [official-api-docs]: https://developer.invoiced.com/api

#[warn(missing_debug_implementations, missing_docs)]
mod client;
mod config;
mod error;
mod util;

pub use client::object::{List, Object};
pub use client::resources::{Operation, ResourceKind};
pub use client::sso::SignInClaims;
pub use client::{ApiResponse, Client, Params};
pub use config::{
    ClientBuilder, ClientConfig, RequestOptions, PRODUCTION_ENDPOINT, SANDBOX_ENDPOINT,
};
pub use error::{ApiError, Error};
