use crate::SqlMap;
use crate::error::{EtlError, EtlResult};
use crate::extract::opensea::{RawCollectionRecord, RawCollectionsResponse};
use crate::util::{empty_to_null, group_key, stringify_list, trim_string};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

/// A collection that passed cleaning, in the column layout of `ethereum_collections`.
///
/// `collection`, `name` and `owner` are never `Null`. `contracts` holds the JSON text of the
/// original list, or the original value if it was not a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SqlMap)]
pub struct CleanedCollectionRecord {
    pub collection: Value,
    pub name: Value,
    pub description: Value,
    pub image_url: Value,
    pub owner: Value,
    pub twitter_username: Value,
    pub contracts: Value,
    /// Number of records in the same batch sharing this `owner`.
    pub owner_collection_count: i64,
}

/// Clean a raw `collections` response into rows ready for loading.
///
/// Records missing `collection`, `name` or `owner` (after empty strings become `Null` and the
/// three are trimmed) are dropped; the rest keep their order. Each retained record is tagged
/// with how many retained records share its owner.
///
/// Fails only when the response holds no collections at all.
pub fn transform(raw: &RawCollectionsResponse) -> EtlResult<Vec<CleanedCollectionRecord>> {
    let collections = match raw.collections.as_deref() {
        Some(collections) if !collections.is_empty() => collections,
        _ => {
            return Err(EtlError::Transformation(
                "no collections found in the provided OpenSea data".to_string(),
            ));
        }
    };

    let mut records: Vec<CleanedCollectionRecord> =
        collections.iter().filter_map(clean_record).collect();

    let dropped = collections.len() - records.len();
    if dropped > 0 {
        debug!(dropped, "dropped collections missing a required field");
    }

    // Count per owner, then broadcast the count back onto every record of that owner.
    let mut owner_counts: HashMap<String, i64> = HashMap::new();
    for record in &records {
        *owner_counts.entry(group_key(&record.owner)).or_default() += 1;
    }
    for record in &mut records {
        record.owner_collection_count = owner_counts[&group_key(&record.owner)];
    }

    info!(
        received = collections.len(),
        retained = records.len(),
        owners = owner_counts.len(),
        "collections transformed"
    );

    Ok(records)
}

fn clean_record(raw: &RawCollectionRecord) -> Option<CleanedCollectionRecord> {
    let collection = required(&raw.collection)?;
    let name = required(&raw.name)?;
    let owner = required(&raw.owner)?;

    Some(CleanedCollectionRecord {
        collection,
        name,
        description: empty_to_null(raw.description.clone()),
        image_url: empty_to_null(raw.image_url.clone()),
        owner,
        twitter_username: empty_to_null(raw.twitter_username.clone()),
        contracts: stringify_list(empty_to_null(raw.contracts.clone())),
        owner_collection_count: 0,
    })
}

/// Empty-to-null, then trim; `None` if the field ends up `Null`.
fn required(value: &Value) -> Option<Value> {
    match trim_string(empty_to_null(value.clone())) {
        Value::Null => None,
        value => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(collections: Value) -> RawCollectionsResponse {
        serde_json::from_value(json!({ "collections": collections })).unwrap()
    }

    fn owners(records: &[CleanedCollectionRecord]) -> Vec<&Value> {
        records.iter().map(|r| &r.owner).collect()
    }

    #[test]
    fn test_no_collections_is_an_error() {
        let empty = raw(json!([]));
        assert!(matches!(transform(&empty), Err(EtlError::Transformation(_))));

        let absent = RawCollectionsResponse::default();
        assert!(matches!(transform(&absent), Err(EtlError::Transformation(_))));
    }

    #[test]
    fn test_single_record_is_trimmed() {
        let records = transform(&raw(json!([
            { "collection": "foo-slug", "name": "Foo", "owner": " 0xABC " }
        ])))
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].owner, json!("0xABC"));
        assert_eq!(records[0].collection, json!("foo-slug"));
        assert_eq!(records[0].owner_collection_count, 1);
        assert_eq!(records[0].description, Value::Null);
    }

    #[test]
    fn test_owner_counts_are_broadcast() {
        let records = transform(&raw(json!([
            { "collection": "a", "name": "A", "owner": "A" },
            { "collection": "b", "name": "B", "owner": "A" },
            { "collection": "c", "name": "C", "owner": "B" }
        ])))
        .unwrap();

        let counts: Vec<i64> = records.iter().map(|r| r.owner_collection_count).collect();
        assert_eq!(counts, vec![2, 2, 1]);
    }

    #[test]
    fn test_owner_counts_use_trimmed_owner() {
        let records = transform(&raw(json!([
            { "collection": "a", "name": "A", "owner": "0xabc" },
            { "collection": "b", "name": "B", "owner": "  0xabc" }
        ])))
        .unwrap();

        assert!(records.iter().all(|r| r.owner_collection_count == 2));
    }

    #[test]
    fn test_records_missing_required_fields_are_dropped_in_order() {
        let records = transform(&raw(json!([
            { "collection": "keep-1", "name": "K1", "owner": "0x1" },
            { "collection": "", "name": "No slug", "owner": "0x2" },
            { "collection": "no-name", "owner": "0x3" },
            { "collection": "null-owner", "name": "N", "owner": null },
            { "collection": "keep-2", "name": "K2", "owner": "0x4" },
            { "collection": "empty-owner", "name": "E", "owner": "" },
            { "collection": "keep-3", "name": "K3", "owner": "0x1" }
        ])))
        .unwrap();

        let slugs: Vec<&Value> = records.iter().map(|r| &r.collection).collect();
        assert_eq!(slugs, vec!["keep-1", "keep-2", "keep-3"]);
        assert_eq!(owners(&records), vec!["0x1", "0x4", "0x1"]);
        assert_eq!(records[0].owner_collection_count, 2);
        assert_eq!(records[1].owner_collection_count, 1);
    }

    #[test]
    fn test_all_records_dropped_yields_empty_output() {
        let records = transform(&raw(json!([{ "collection": "x", "name": "" , "owner": "0x1" }])))
            .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_whitespace_only_survives_as_empty_string() {
        // Empty strings are nulled before trimming, so whitespace trims down to "".
        let records = transform(&raw(json!([
            { "collection": "ws", "name": "   ", "owner": "0x1" }
        ])))
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, json!(""));
    }

    #[test]
    fn test_non_string_required_fields_are_untouched() {
        let records = transform(&raw(json!([
            { "collection": 7, "name": "Seven", "owner": "0x7" }
        ])))
        .unwrap();

        assert_eq!(records[0].collection, json!(7));
    }

    #[test]
    fn test_contracts_are_stringified() {
        let contracts = json!([{ "address": "0xdead", "chain": "ethereum" }]);
        let records = transform(&raw(json!([
            { "collection": "a", "name": "A", "owner": "0x1", "contracts": contracts },
            { "collection": "b", "name": "B", "owner": "0x1", "contracts": null },
            { "collection": "c", "name": "C", "owner": "0x1", "contracts": "0xbeef" },
            { "collection": "d", "name": "D", "owner": "0x1", "contracts": "" }
        ])))
        .unwrap();

        let Value::String(text) = &records[0].contracts else {
            panic!("contracts were not stringified");
        };
        assert_eq!(serde_json::from_str::<Value>(text).unwrap(), contracts);
        assert_eq!(records[1].contracts, Value::Null);
        assert_eq!(records[2].contracts, json!("0xbeef"));
        assert_eq!(records[3].contracts, Value::Null);
    }

    #[test]
    fn test_optional_empty_strings_become_null() {
        let records = transform(&raw(json!([
            {
                "collection": "a",
                "name": "A",
                "owner": "0x1",
                "description": "",
                "image_url": "https://img",
                "twitter_username": ""
            }
        ])))
        .unwrap();

        assert_eq!(records[0].description, Value::Null);
        assert_eq!(records[0].image_url, json!("https://img"));
        assert_eq!(records[0].twitter_username, Value::Null);
    }

    #[test]
    fn test_sql_map_follows_table_columns() {
        let records = transform(&raw(json!([
            { "collection": "a", "name": "A", "owner": "0x1", "contracts": ["0x2"] }
        ])))
        .unwrap();

        assert_eq!(
            records[0].sql_columns(),
            vec![
                "collection",
                "name",
                "description",
                "image_url",
                "owner",
                "twitter_username",
                "contracts",
                "owner_collection_count",
            ]
        );
        let values = records[0].sql_map();
        assert_eq!(values[0], crate::SqlValue::Text("a".to_string()));
        assert_eq!(values[2], crate::SqlValue::Null);
        assert_eq!(values[6], crate::SqlValue::Text("[\"0x2\"]".to_string()));
        assert_eq!(values[7], crate::SqlValue::Integer(1));
    }
}
