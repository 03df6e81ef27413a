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
use std::ops::Index;

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::client::resources::{Operation, ResourceKind};
use crate::client::{Client, Params};
use crate::config::RequestOptions;
use crate::error::{ApiError, Error};
use crate::util;

/// Fields that can only be set by the API.
const PERMANENT_FIELDS: [&str; 1] = ["id"];

static NULL: Value = Value::Null;

/// An Invoiced object of any [`ResourceKind`].
///
/// An object without an ID stands for its whole collection: it is what the
/// accessors on [`Client`] return, and it is the starting point for
/// [`Object::create`], [`Object::retrieve`] and [`Object::list`]. An object
/// with an ID stands for a single remote entity.
///
/// Fields are untyped JSON values. Every field assigned with
/// [`Object::set`] is remembered as dirty until the next successful
/// [`Object::save`], which sends only the dirty fields.
#[derive(Debug, Clone)]
pub struct Object<'a> {
    client: &'a Client,
    kind: ResourceKind,
    collection: String,
    endpoint: String,
    values: Params,
    dirty: Vec<String>,
}

/// A single page of objects returned by [`Object::list`].
#[derive(Debug, Clone)]
pub struct List<'a> {
    /// The objects on this page.
    pub objects: Vec<Object<'a>>,
    /// The total number of objects across all pages, if the API reported it.
    pub total_count: Option<u64>,
}

impl<'a> Object<'a> {
    /// Creates an empty object that is not yet bound to an ID.
    pub fn new(client: &'a Client, kind: ResourceKind) -> Object<'a> {
        let collection = kind.collection();
        Object {
            client,
            kind,
            endpoint: format!("/{collection}"),
            collection,
            values: Params::new(),
            dirty: vec![],
        }
    }

    /// Creates an object bound to `id` whose fields are `values`.
    ///
    /// The ID must be a non-empty string or a number.
    pub fn with_id(
        client: &'a Client,
        kind: ResourceKind,
        id: impl Into<Value>,
        mut values: Params,
    ) -> Result<Object<'a>, Error> {
        let id = id.into();
        let segment = util::id_segment(&id)
            .ok_or_else(|| Error::InvalidArgument(format!("invalid {kind} ID: {id}")))?;
        let mut object = Object::new(client, kind);
        object.endpoint = format!("/{}/{segment}", object.collection);
        values.insert("id".into(), id);
        object.values = values;
        Ok(object)
    }

    /// Creates an object from a JSON object, such as an API response body.
    ///
    /// The object is bound to the `id` field of `value`, if present. A
    /// present, non-null `id` must be a non-empty string or a number.
    pub fn from_value(
        client: &'a Client,
        kind: ResourceKind,
        value: Value,
    ) -> Result<Object<'a>, Error> {
        match value {
            Value::Object(values) => {
                if let Some(id) = values.get("id").filter(|id| !id.is_null()) {
                    if util::id_segment(id).is_none() {
                        return Err(Error::InvalidArgument(format!("invalid {kind} ID: {id}")));
                    }
                }
                Ok(Object::from_values(client, kind, values))
            }
            _ => Err(Error::InvalidArgument(format!(
                "{kind} must be a JSON object, got: {value}"
            ))),
        }
    }

    fn from_values(client: &'a Client, kind: ResourceKind, values: Params) -> Object<'a> {
        let mut object = Object::new(client, kind);
        if let Some(id) = values.get("id").and_then(util::id_segment) {
            object.endpoint = format!("/{}/{id}", object.collection);
        }
        object.values = values;
        object
    }

    /// Returns the client used by this object.
    pub fn client(&self) -> &'a Client {
        self.client
    }

    /// Returns the resource type of this object.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the path of this object relative to the API endpoint, e.g.
    /// `/charges/123`.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the ID of this object, if it is bound to one.
    ///
    /// Only a non-empty string or a number binds an object; the endpoint ends
    /// in `/<id>` exactly when this returns `Some`.
    pub fn id(&self) -> Option<&Value> {
        self.values
            .get("id")
            .filter(|id| util::id_segment(id).is_some())
    }

    /// Returns the value of `field`, or an error if the field was never set
    /// or loaded.
    pub fn field(&self, field: &str) -> Result<&Value, Error> {
        self.values.get(field).ok_or_else(|| Error::MissingField {
            resource: self.kind.name(),
            field: field.into(),
        })
    }

    /// Returns the value of `field`, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Sets `field` to `value` and marks it dirty.
    ///
    /// The API interprets empty strings as a request to clear a field, so
    /// they are rejected; set the field to [`Value::Null`] instead. The `id`
    /// field is assigned by the API and cannot be set.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Result<(), Error> {
        let field = field.into();
        let value = value.into();
        if value.as_str() == Some("") {
            return Err(Error::InvalidArgument(format!(
                "You cannot set '{field}' to an empty string. We interpret empty \
                 strings as NULL in requests. You may set '{field}' to null to \
                 delete the property"
            )));
        }
        if PERMANENT_FIELDS.contains(&field.as_str()) {
            return Err(Error::InvalidArgument(format!(
                "'{field}' is assigned by the API and cannot be set"
            )));
        }
        if !self.dirty.contains(&field) {
            self.dirty.push(field.clone());
        }
        self.values.insert(field, value);
        Ok(())
    }

    /// Removes `field` locally, returning its previous value.
    ///
    /// The removal is not sent by [`Object::save`]. To clear a field on the
    /// server, set it to [`Value::Null`].
    pub fn remove(&mut self, field: &str) -> Result<Option<Value>, Error> {
        if PERMANENT_FIELDS.contains(&field) {
            return Err(Error::InvalidArgument(format!(
                "'{field}' is assigned by the API and cannot be removed"
            )));
        }
        self.dirty.retain(|f| f != field);
        Ok(self.values.shift_remove(field))
    }

    /// Reports whether `field` is present.
    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Returns the names of the fields that are present, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Returns the names of the fields set since the object was loaded or
    /// last saved.
    pub fn dirty_fields(&self) -> &[String] {
        &self.dirty
    }

    /// Reports whether any field was set since the object was loaded or last
    /// saved.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Returns all fields as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(self.values.clone())
    }

    /// Returns all fields as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.values).unwrap_or_default()
    }

    /// Fetches the object with the given ID.
    ///
    /// The receiver is left untouched; a new object is returned.
    pub async fn retrieve(&self, id: impl Into<Value>, params: &Params) -> Result<Object<'a>, Error> {
        let id = id.into();
        let segment = util::id_segment(&id)
            .ok_or_else(|| Error::InvalidArgument("Missing ID.".into()))?;
        self.require(Operation::Retrieve)?;
        let path = format!("{}/{segment}", self.collection);
        let res = self
            .client
            .request("GET", &path, params, &RequestOptions::DEFAULT)
            .await?;
        let values = expect_object(res.code, res.body)?;
        Object::with_id(self.client, self.kind, id, values)
    }

    /// Creates a new object in this collection.
    pub async fn create(
        &self,
        params: &Params,
        options: &RequestOptions,
    ) -> Result<Object<'a>, Error> {
        self.require(Operation::Create)?;
        let res = self
            .client
            .request("POST", &self.collection, params, options)
            .await?;
        let values = expect_object(res.code, res.body)?;
        Ok(Object::from_values(self.client, self.kind, values))
    }

    /// Saves this object.
    ///
    /// An object bound to an ID sends its dirty fields, and nothing at all
    /// if no field is dirty. An object without an ID is created from all of
    /// its fields and becomes bound to the ID the API assigns. In both cases
    /// the fields are replaced by the API's response.
    ///
    /// Returns whether a request was made.
    pub async fn save(&mut self, options: &RequestOptions) -> Result<bool, Error> {
        let res = if self.id().is_some() {
            self.require(Operation::Update)?;
            if self.dirty.is_empty() {
                return Ok(false);
            }
            let params: Params = self
                .dirty
                .iter()
                .filter_map(|f| Some((f.clone(), self.values.get(f)?.clone())))
                .collect();
            debug!(resource = %self.kind, fields = ?self.dirty, "saving object");
            self.client
                .request("PATCH", &self.endpoint, &params, options)
                .await?
        } else {
            self.require(Operation::Create)?;
            debug!(resource = %self.kind, "creating object");
            self.client
                .request("POST", &self.collection, &self.values, options)
                .await?
        };
        let mut values = expect_object(res.code, res.body)?;
        match values.get("id").and_then(util::id_segment) {
            Some(id) => self.endpoint = format!("/{}/{id}", self.collection),
            None => {
                if let Some(id) = self.values.get("id") {
                    values.insert("id".into(), id.clone());
                }
            }
        }
        self.values = values;
        self.dirty.clear();
        Ok(true)
    }

    /// Deletes this object.
    pub async fn delete(&self, options: &RequestOptions) -> Result<(), Error> {
        self.require(Operation::Delete)?;
        if self.id().is_none() {
            return Err(Error::InvalidArgument(format!(
                "cannot delete a {} without an ID",
                self.kind
            )));
        }
        self.client
            .request("DELETE", &self.endpoint, &Params::new(), options)
            .await?;
        Ok(())
    }

    /// Lists one page of the objects in this collection.
    ///
    /// `params` are passed through as the query string, which is how
    /// filters, sorting and pagination (`page`, `per_page`) are selected.
    pub async fn list(&self, params: &Params) -> Result<List<'a>, Error> {
        self.require(Operation::List)?;
        let res = self
            .client
            .request("GET", &self.collection, params, &RequestOptions::DEFAULT)
            .await?;
        let total_count = res
            .headers
            .get("x-total-count")
            .and_then(|c| c.trim().parse().ok());
        let items = match res.body {
            Some(Value::Array(items)) => items,
            body => {
                return Err(Error::Api(ApiError {
                    message: format!("expected a JSON array in {} response", res.code),
                    status_code: res.code,
                    body,
                }))
            }
        };
        let objects = items
            .into_iter()
            .map(|item| {
                let values = expect_object(res.code, Some(item))?;
                Ok(Object::from_values(self.client, self.kind, values))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(List {
            objects,
            total_count,
        })
    }

    fn require(&self, op: Operation) -> Result<(), Error> {
        if self.kind.supports(op) {
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!(
                "{} does not support {op}",
                self.collection
            )))
        }
    }
}

fn expect_object(code: u16, body: Option<Value>) -> Result<Params, Error> {
    match body {
        Some(Value::Object(values)) => Ok(values),
        body => Err(Error::Api(ApiError {
            message: format!("expected a JSON object in {code} response"),
            status_code: code,
            body,
        })),
    }
}

impl Index<&str> for Object<'_> {
    type Output = Value;

    fn index(&self, field: &str) -> &Value {
        self.values.get(field).unwrap_or(&NULL)
    }
}

impl Serialize for Object<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.values.serialize(serializer)
    }
}

impl fmt::Display for Object<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} JSON: {}", self.kind, self.to_json_pretty())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ClientConfig;

    fn client() -> Client {
        Client::new(ClientConfig {
            api_key: "API_KEY".into(),
        })
        .unwrap()
    }

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => panic!("params must be an object"),
        }
    }

    #[test]
    fn test_endpoint() {
        let client = client();
        let charge = Object::with_id(&client, ResourceKind::Charge, 123, Params::new()).unwrap();
        assert_eq!(charge.endpoint(), "/charges/123");
        assert_eq!(client.credit_note().endpoint(), "/credit_notes");
        assert_eq!(client.tax_rate().endpoint(), "/tax_rates");
    }

    #[test]
    fn test_with_id() {
        let client = client();
        let invoice = Object::with_id(
            &client,
            ResourceKind::Invoice,
            "inv_1",
            params(json!({"total": 100, "status": "draft"})),
        )
        .unwrap();
        assert_eq!(invoice.id(), Some(&json!("inv_1")));
        assert!(invoice.endpoint().ends_with("/inv_1"));
        assert!(!invoice.is_dirty());
        assert_eq!(invoice.keys().collect::<Vec<_>>(), ["total", "status", "id"]);

        for id in [json!(""), json!(null), json!({"id": 1})] {
            let res = Object::with_id(&client, ResourceKind::Invoice, id, Params::new());
            assert!(matches!(res, Err(Error::InvalidArgument(_))));
        }
    }

    #[test]
    fn test_from_value() {
        let client = client();
        let customer =
            Object::from_value(&client, ResourceKind::Customer, json!({"id": 7, "name": "Acme"}))
                .unwrap();
        assert_eq!(customer.endpoint(), "/customers/7");
        assert_eq!(customer["name"], "Acme");

        let res = Object::from_value(&client, ResourceKind::Customer, json!([1, 2]));
        assert!(matches!(res, Err(Error::InvalidArgument(_))));

        for id in [json!(""), json!(false), json!([1])] {
            let res = Object::from_value(
                &client,
                ResourceKind::Customer,
                json!({"id": id, "name": "x"}),
            );
            assert!(matches!(res, Err(Error::InvalidArgument(_))), "{id}");
        }

        let customer =
            Object::from_value(&client, ResourceKind::Customer, json!({"id": null})).unwrap();
        assert_eq!(customer.id(), None);
        assert_eq!(customer.endpoint(), "/customers");
    }

    #[test]
    fn test_fields() {
        let client = client();
        let mut customer = client.customer();
        assert!(matches!(
            customer.field("name"),
            Err(Error::MissingField { resource: "Customer", .. })
        ));
        assert_eq!(customer["name"], Value::Null);

        customer.set("name", "Acme").unwrap();
        customer.set("payment_terms", "NET 30").unwrap();
        customer.set("name", "Acme Corp").unwrap();
        assert_eq!(customer.field("name").unwrap(), "Acme Corp");
        assert_eq!(customer.dirty_fields(), ["name", "payment_terms"]);
        assert!(customer.contains("name"));

        assert_eq!(customer.remove("name").unwrap(), Some(json!("Acme Corp")));
        assert!(!customer.contains("name"));
        assert_eq!(customer.dirty_fields(), ["payment_terms"]);
        assert_eq!(customer.remove("name").unwrap(), None);

        customer.set("payment_terms", Value::Null).unwrap();
        assert_eq!(customer.get("payment_terms"), Some(&Value::Null));
    }

    #[test]
    fn test_set_rejects_empty_string() {
        let client = client();
        let mut invoice =
            Object::with_id(&client, ResourceKind::Invoice, 1, params(json!({"notes": "x"})))
                .unwrap();
        for field in ["notes", "name", "id"] {
            let res = invoice.set(field, "");
            assert!(matches!(res, Err(Error::InvalidArgument(_))), "{field}");
        }
        assert_eq!(invoice["notes"], "x");
        assert!(!invoice.is_dirty());
    }

    #[test]
    fn test_id_is_permanent() {
        let client = client();
        let mut invoice = Object::with_id(&client, ResourceKind::Invoice, 1, Params::new()).unwrap();
        assert!(matches!(invoice.set("id", 2), Err(Error::InvalidArgument(_))));
        assert!(matches!(invoice.remove("id"), Err(Error::InvalidArgument(_))));
        assert_eq!(invoice.id(), Some(&json!(1)));
        assert!(!invoice.is_dirty());
    }

    #[test]
    fn test_serialization() {
        let client = client();
        let mut item = client.item();
        item.set("name", "Widget").unwrap();
        item.set("unit_cost", 9.5).unwrap();
        assert_eq!(item.to_json(), json!({"name": "Widget", "unit_cost": 9.5}));
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"name": "Widget", "unit_cost": 9.5})
        );
        assert_eq!(
            item.to_string(),
            "Item JSON: {\n  \"name\": \"Widget\",\n  \"unit_cost\": 9.5\n}"
        );
    }
}
