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

use heck::ToSnakeCase;
use serde_json::Value;

/// Nouns that are spelled the same in the singular and plural.
const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "money",
    "news",
    "series",
    "sheep",
    "species",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("man", "men"),
    ("person", "people"),
    ("woman", "women"),
];

/// Derives the collection name of a resource from its type name.
///
/// Any module qualifier is stripped, the remaining PascalCase name is
/// converted to snake_case, and the final word is pluralized:
/// `CreditNote` becomes `credit_notes`.
pub(crate) fn collection_name(type_name: &str) -> String {
    let unqualified = type_name
        .rsplit(|c: char| c == ':' || c == '\\')
        .next()
        .unwrap_or(type_name);
    let snake = unqualified.to_snake_case();
    match snake.rsplit_once('_') {
        Some((head, last)) => format!("{head}_{}", pluralize(last)),
        None => pluralize(&snake),
    }
}

/// Pluralizes a single lowercase English noun.
pub(crate) fn pluralize(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.into();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
        return (*plural).into();
    }
    if let Some(stem) = word.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| word.ends_with(s)) {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Splits a relative API path into its non-empty segments.
pub(crate) fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Renders an object identifier as a path segment.
///
/// Only non-empty strings and numbers identify an object.
pub(crate) fn id_segment(id: &Value) -> Option<String> {
    match id {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Flattens request parameters into query string pairs.
///
/// Nested values use bracket notation (`filter[customer]=1`, `ids[0]=4`).
/// Null values are omitted and booleans are sent as `1` or `0`.
pub(crate) fn query_pairs(params: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = vec![];
    for (key, value) in params {
        push_query_pairs(&mut pairs, key.clone(), value);
    }
    pairs
}

fn push_query_pairs(pairs: &mut Vec<(String, String)>, key: String, value: &Value) {
    match value {
        Value::Null => (),
        Value::Bool(b) => pairs.push((key, if *b { "1" } else { "0" }.into())),
        Value::Number(n) => pairs.push((key, n.to_string())),
        Value::String(s) => pairs.push((key, s.clone())),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                push_query_pairs(pairs, format!("{key}[{i}]"), item);
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                push_query_pairs(pairs, format!("{key}[{k}]"), v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_collection_name() {
        assert_eq!(collection_name("CreditNote"), "credit_notes");
        assert_eq!(collection_name("TaxRate"), "tax_rates");
        assert_eq!(collection_name("Item"), "items");
        assert_eq!(collection_name("CatalogItem"), "catalog_items");
        assert_eq!(collection_name("Invoiced\\Charge"), "charges");
        assert_eq!(collection_name("invoiced::Subscription"), "subscriptions");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("batch"), "batches");
        assert_eq!(pluralize("company"), "companies");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("information"), "information");
    }

    #[test]
    fn test_id_segment() {
        assert_eq!(id_segment(&json!(123)), Some("123".into()));
        assert_eq!(id_segment(&json!("abc")), Some("abc".into()));
        assert_eq!(id_segment(&json!("")), None);
        assert_eq!(id_segment(&json!(null)), None);
        assert_eq!(id_segment(&json!([1])), None);
    }

    #[test]
    fn test_query_pairs() {
        let params = json!({
            "per_page": 10,
            "filter": {"customer": 123, "paid": false, "draft": true},
            "ids": [4, 5],
            "skip": null,
            "sort": "date",
        });
        let pairs = query_pairs(params.as_object().unwrap());
        let pairs: Vec<_> = pairs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [
                ("per_page", "10"),
                ("filter[customer]", "123"),
                ("filter[paid]", "0"),
                ("filter[draft]", "1"),
                ("ids[0]", "4"),
                ("ids[1]", "5"),
                ("sort", "date"),
            ]
        );
    }
}
