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

use std::fmt;

use crate::client::object::Object;
use crate::client::Client;
use crate::util;

/// An operation that a resource may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Creating a new object in the collection.
    Create,
    /// Fetching a single object by ID.
    Retrieve,
    /// Saving changes to an existing object.
    Update,
    /// Deleting an object.
    Delete,
    /// Listing the objects in the collection.
    List,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Create => "create",
            Operation::Retrieve => "retrieve",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::List => "list",
        })
    }
}

use Operation::{Create, Delete, List, Retrieve, Update};

const CRUD: &[Operation] = &[Create, Retrieve, Update, Delete, List];

macro_rules! resources {
    ($($(#[$meta:meta])* $kind:ident => $accessor:ident, $ops:expr;)*) => {
        /// A resource type exposed by the Invoiced API.
        #[non_exhaustive]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ResourceKind {
            $(
                #[doc = concat!("The `", stringify!($kind), "` resource.")]
                $(#[$meta])*
                $kind,
            )*
        }

        impl ResourceKind {
            /// Every resource type, in alphabetical order.
            pub const ALL: &'static [ResourceKind] = &[$(ResourceKind::$kind,)*];

            /// Returns the type name of the resource, e.g. `CreditNote`.
            pub fn name(&self) -> &'static str {
                match self {
                    $(ResourceKind::$kind => stringify!($kind),)*
                }
            }

            /// Returns the operations that the resource supports.
            pub fn operations(&self) -> &'static [Operation] {
                match self {
                    $(ResourceKind::$kind => $ops,)*
                }
            }
        }

        impl Client {
            $(
                #[doc = concat!("Returns the `", stringify!($kind), "` collection.")]
                pub fn $accessor(&self) -> Object<'_> {
                    Object::new(self, ResourceKind::$kind)
                }
            )*
        }
    };
}

resources! {
    ///
    /// Superseded by [`ResourceKind::Item`].
    CatalogItem => catalog_item, CRUD;
    Charge => charge, &[Create, Retrieve];
    Coupon => coupon, CRUD;
    CreditNote => credit_note, CRUD;
    Customer => customer, CRUD;
    Estimate => estimate, CRUD;
    Event => event, &[Retrieve, List];
    File => file, &[Create, Retrieve, Delete];
    Invoice => invoice, CRUD;
    Item => item, CRUD;
    Note => note, CRUD;
    Payment => payment, CRUD;
    Plan => plan, CRUD;
    Refund => refund, &[Create, Retrieve];
    Subscription => subscription, CRUD;
    Task => task, CRUD;
    TaxRate => tax_rate, CRUD;
    Transaction => transaction, CRUD;
}

impl ResourceKind {
    /// Returns the name of the collection that holds this resource, e.g.
    /// `credit_notes`.
    pub fn collection(&self) -> String {
        util::collection_name(self.name())
    }

    /// Reports whether the resource supports `op`.
    pub fn supports(&self, op: Operation) -> bool {
        self.operations().contains(&op)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collections() {
        let collections: Vec<_> = ResourceKind::ALL.iter().map(|k| k.collection()).collect();
        assert_eq!(
            collections,
            [
                "catalog_items",
                "charges",
                "coupons",
                "credit_notes",
                "customers",
                "estimates",
                "events",
                "files",
                "invoices",
                "items",
                "notes",
                "payments",
                "plans",
                "refunds",
                "subscriptions",
                "tasks",
                "tax_rates",
                "transactions",
            ]
        );
    }

    #[test]
    fn test_collection_is_deterministic() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.collection(), kind.collection());
        }
    }

    #[test]
    fn test_operations() {
        assert!(ResourceKind::Invoice.supports(Operation::Update));
        assert!(ResourceKind::Charge.supports(Operation::Create));
        assert!(!ResourceKind::Charge.supports(Operation::List));
        assert!(!ResourceKind::Event.supports(Operation::Create));
        for kind in ResourceKind::ALL {
            assert!(kind.supports(Operation::Retrieve), "{kind}");
        }
    }
}
