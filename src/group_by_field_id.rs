use {
    crate::{
        Policy,
        input::{self, MISSING_KEY, is_scalar, kind_name, property_key},
    },
    indexmap::IndexMap,
    serde_json::{Map, Value},
    tap::Pipe,
    tracing::{debug, instrument},
};

/// Top level attribute holding the records.
pub const MASTER: &str = "master";
/// Record attribute the buckets are keyed by.
pub const FIELD_ID: &str = "fieldId";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] input::Error),
    #[error("record #{index} is expected to be an object, found {found}")]
    NotAnObject { index: usize, found: &'static str },
    #[error("record #{index} has no '{attribute}' attribute")]
    MissingAttribute {
        index: usize,
        attribute: &'static str,
    },
    #[error("record #{index} has a '{attribute}' of type {found}, which cannot be used as a key")]
    UnsupportedKey {
        index: usize,
        attribute: &'static str,
        found: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, self::Error>;

/// Splits a record into its bucket key and the record without [`FIELD_ID`].
fn keyed(index: usize, record: Value, policy: Policy) -> Result<(String, Value)> {
    let mut fields = match record {
        Value::Object(fields) => fields,
        other if policy.is_permissive() => {
            debug!(
                index,
                found = kind_name(&other),
                "record is not an object, grouping it under the missing key"
            );
            return Ok((MISSING_KEY.to_string(), other));
        }
        other => {
            return Err(self::Error::NotAnObject {
                index,
                found: kind_name(&other),
            });
        }
    };
    // shift_remove keeps the remaining attributes in their original order
    let key = match fields.shift_remove(FIELD_ID) {
        Some(key) if is_scalar(&key) => property_key(&key),
        Some(key) if policy.is_permissive() => {
            debug!(
                index,
                found = kind_name(&key),
                "composite key, grouping it under its json text"
            );
            property_key(&key)
        }
        Some(key) => {
            return Err(self::Error::UnsupportedKey {
                index,
                attribute: FIELD_ID,
                found: kind_name(&key),
            });
        }
        None if policy.is_permissive() => {
            debug!(index, "record has no fieldId, grouping it under the missing key");
            MISSING_KEY.to_string()
        }
        None => {
            return Err(self::Error::MissingAttribute {
                index,
                attribute: FIELD_ID,
            });
        }
    };
    Ok((key, Value::Object(fields)))
}

/// Groups the records of `input.master` by their `fieldId`.
///
/// Every record is moved into the bucket for its key with the `fieldId` attribute removed.
/// Buckets appear in the order their key was first seen and keep the relative order of
/// their records. In [`Policy::Strict`] the first malformed record aborts the whole call.
#[instrument(skip_all, fields(%policy))]
pub fn group_by_field_id(input: Value, policy: Policy) -> Result<Map<String, Value>> {
    input::take_sequence(input, MASTER)?
        .into_iter()
        .enumerate()
        .try_fold(IndexMap::<String, Vec<Value>>::new(), |mut buckets, (index, record)| {
            keyed(index, record, policy).map(|(key, record)| {
                buckets.entry(key).or_default().push(record);
                buckets
            })
        })?
        .pipe(|buckets| {
            debug!(
                buckets = buckets.len(),
                records = buckets.values().map(Vec::len).sum::<usize>(),
                "grouped"
            );
            buckets
                .into_iter()
                .map(|(key, records)| (key, Value::Array(records)))
                .collect::<Map<_, _>>()
        })
        .pipe(Ok)
}

#[cfg(test)]
mod tests {
    use {super::*, anyhow::Context, serde_json::json, tap::Pipe};

    #[test_log::test]
    fn test_groups_example() -> anyhow::Result<()> {
        json!({
            "master": [
                {"fieldId": "a", "v": 1},
                {"fieldId": "b", "v": 2},
                {"fieldId": "a", "v": 3}
            ]
        })
        .pipe(|input| group_by_field_id(input, Policy::Strict))?
        .pipe(Value::Object)
        .pipe(|got| {
            let expected = json!({
                "a": [{"v": 1}, {"v": 3}],
                "b": [{"v": 2}]
            });
            anyhow::ensure!(got == expected, "expected:\n{expected}\n\ngot:\n{got}");
            Ok(())
        })
    }

    #[test_log::test]
    fn test_empty_master_gives_empty_map() -> anyhow::Result<()> {
        Policy::ALL.into_iter().try_for_each(|policy| {
            let got = group_by_field_id(json!({"master": []}), policy)?;
            anyhow::ensure!(got.is_empty(), "{policy}: {got:?}");
            Ok(())
        })
    }

    #[test]
    fn test_keys_in_first_seen_order() -> anyhow::Result<()> {
        let got = group_by_field_id(
            json!({"master": [
                {"fieldId": "z"},
                {"fieldId": "a"},
                {"fieldId": "z"},
                {"fieldId": "m"}
            ]}),
            Policy::Strict,
        )?;
        anyhow::ensure!(got.keys().map(String::as_str).eq(["z", "a", "m"]));
        Ok(())
    }

    #[test]
    fn test_other_attributes_keep_their_order() -> anyhow::Result<()> {
        let got = group_by_field_id(
            json!({"master": [{"c": 1, "fieldId": 7, "a": 2, "b": 3}]}),
            Policy::Strict,
        )?;
        let record = got
            .get("7")
            .and_then(|bucket| bucket.get(0))
            .and_then(Value::as_object)
            .context("first record of bucket 7")?;
        anyhow::ensure!(record.keys().map(String::as_str).eq(["c", "a", "b"]));
        Ok(())
    }

    #[test]
    fn test_numeric_and_string_keys_share_a_bucket() -> anyhow::Result<()> {
        let got = group_by_field_id(
            json!({"master": [
                {"fieldId": 1, "v": "n"},
                {"fieldId": "1", "v": "s"},
                {"fieldId": true},
                {"fieldId": null}
            ]}),
            Policy::Strict,
        )?
        .pipe(Value::Object);
        let expected = json!({
            "1": [{"v": "n"}, {"v": "s"}],
            "true": [{}],
            "null": [{}]
        });
        anyhow::ensure!(got == expected, "expected:\n{expected}\n\ngot:\n{got}");
        Ok(())
    }

    #[test_log::test]
    fn test_equal_numbers_share_a_bucket() -> anyhow::Result<()> {
        let got = r#"{"master": [
            {"fieldId": 1, "v": "int"},
            {"fieldId": 1.0, "v": "float"},
            {"fieldId": "1", "v": "string"},
            {"fieldId": 1e2, "v": "exponent"},
            {"fieldId": 100, "v": "hundred"}
        ]}"#
        .pipe(serde_json::from_str::<Value>)?
        .pipe(|input| group_by_field_id(input, Policy::Strict))?
        .pipe(Value::Object);
        let expected = json!({
            "1": [{"v": "int"}, {"v": "float"}, {"v": "string"}],
            "100": [{"v": "exponent"}, {"v": "hundred"}]
        });
        anyhow::ensure!(got == expected, "expected:\n{expected}\n\ngot:\n{got}");
        Ok(())
    }

    #[test]
    fn test_strict_rejects_missing_field_id() {
        let err = group_by_field_id(
            json!({"master": [{"fieldId": "a"}, {"v": 2}]}),
            Policy::Strict,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingAttribute {
                index: 1,
                attribute: FIELD_ID
            }
        ));
        assert_eq!(err.to_string(), "record #1 has no 'fieldId' attribute");
    }

    #[test]
    fn test_strict_rejects_non_object_record() {
        assert!(matches!(
            group_by_field_id(json!({"master": [{"fieldId": "a"}, 5]}), Policy::Strict),
            Err(Error::NotAnObject {
                index: 1,
                found: "Value::Number"
            })
        ));
    }

    #[test]
    fn test_strict_rejects_composite_key() {
        assert!(matches!(
            group_by_field_id(json!({"master": [{"fieldId": ["a"]}]}), Policy::Strict),
            Err(Error::UnsupportedKey {
                index: 0,
                attribute: FIELD_ID,
                found: "Value::Array"
            })
        ));
    }

    #[test_log::test]
    fn test_permissive_collects_missing_under_sentinel() -> anyhow::Result<()> {
        let got = group_by_field_id(
            json!({"master": [
                {"v": 1},
                {"fieldId": "a", "v": 2},
                "loose",
                {"v": 3},
                {"fieldId": {"k": 1}}
            ]}),
            Policy::Permissive,
        )?
        .pipe(Value::Object);
        let expected = json!({
            "undefined": [{"v": 1}, "loose", {"v": 3}],
            "a": [{"v": 2}],
            r#"{"k":1}"#: [{}]
        });
        anyhow::ensure!(got == expected, "expected:\n{expected}\n\ngot:\n{got}");
        Ok(())
    }

    #[test]
    fn test_top_level_errors_in_both_policies() {
        Policy::ALL.into_iter().for_each(|policy| {
            assert!(matches!(
                group_by_field_id(json!({"results": []}), policy),
                Err(Error::Input(input::Error::MissingSequence { attribute: MASTER }))
            ));
            assert!(matches!(
                group_by_field_id(json!("master"), policy),
                Err(Error::Input(input::Error::UnsupportedTopLevelValue("Value::String")))
            ));
        });
    }
}
