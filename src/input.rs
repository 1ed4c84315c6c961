use {
    serde_json::{Number, Value},
    tap::Pipe,
};

/// Key standing in for an attribute the record does not have.
pub const MISSING_KEY: &str = "undefined";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported top level value, it expected an object, found {0}")]
    UnsupportedTopLevelValue(&'static str),
    #[error("top level object has no '{attribute}' attribute")]
    MissingSequence { attribute: &'static str },
    #[error("top level attribute '{attribute}' is expected to be an array, found {found}")]
    NotASequence {
        attribute: &'static str,
        found: &'static str,
    },
}

type Result<T> = std::result::Result<T, self::Error>;

pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Value::Null",
        Value::Bool(_) => "Value::Bool",
        Value::Number(_) => "Value::Number",
        Value::String(_) => "Value::String",
        Value::Array(_) => "Value::Array",
        Value::Object(_) => "Value::Object",
    }
}

pub fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Turns a value into the string it would become as a JSON object key:
/// strings verbatim, numbers by numeric value, everything else as compact JSON text.
pub fn property_key(value: &Value) -> String {
    match value {
        Value::String(key) => key.clone(),
        Value::Number(number) => number_key(number),
        other => other.to_string(),
    }
}

/// `1`, `1.0` and `1e0` are the same number and must give the same key.
fn number_key(number: &Number) -> String {
    match (number.as_i64(), number.as_u64(), number.as_f64()) {
        (Some(int), _, _) => int.to_string(),
        (_, Some(uint), _) => uint.to_string(),
        // -0.0 would otherwise render as "-0"
        (_, _, Some(float)) if float == 0.0 => "0".to_string(),
        // f64 Display drops a zero fraction and never uses exponent notation
        (_, _, Some(float)) => float.to_string(),
        (None, None, None) => number.to_string(),
    }
}

/// Moves the array stored under `attribute` out of a top level object.
pub fn take_sequence(value: Value, attribute: &'static str) -> Result<Vec<Value>> {
    match value {
        Value::Object(mut map) => map
            .remove(attribute)
            .ok_or(self::Error::MissingSequence { attribute })?
            .pipe(|sequence| match sequence {
                Value::Array(records) => Ok(records),
                other => Err(self::Error::NotASequence {
                    attribute,
                    found: kind_name(&other),
                }),
            }),
        other => Err(self::Error::UnsupportedTopLevelValue(kind_name(&other))),
    }
}

/// Borrows the array stored under `attribute` of a top level object.
pub fn sequence<'a>(value: &'a Value, attribute: &'static str) -> Result<&'a [Value]> {
    match value {
        Value::Object(map) => match map.get(attribute) {
            Some(Value::Array(records)) => Ok(records.as_slice()),
            Some(other) => Err(self::Error::NotASequence {
                attribute,
                found: kind_name(other),
            }),
            None => Err(self::Error::MissingSequence { attribute }),
        },
        other => Err(self::Error::UnsupportedTopLevelValue(kind_name(other))),
    }
}
