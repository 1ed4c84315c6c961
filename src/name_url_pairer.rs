use {
    crate::{
        Policy,
        input::{self, MISSING_KEY, kind_name, property_key},
    },
    serde::{Serialize, ser::SerializeMap},
    serde_json::{Map, Value},
    tap::Pipe,
    tracing::{debug, instrument},
};

/// Top level attribute holding the catalog records.
pub const RESULTS: &str = "results";
pub const NAME: &str = "name";
pub const URL: &str = "url";

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
    #[error("record #{index} has a '{attribute}' of type {found}, expected a string")]
    UnexpectedType {
        index: usize,
        attribute: &'static str,
        found: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, self::Error>;

/// One `{ name: url }` entry. Serializes as a map with exactly one key.
#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    pub name: String,
    pub url: Value,
}

impl Pairing {
    pub fn into_entry(self) -> Map<String, Value> {
        std::iter::once((self.name, self.url)).collect()
    }
}

impl Serialize for Pairing {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_map(Some(1)).and_then(|mut map| {
            map.serialize_entry(&self.name, &self.url)
                .and_then(|()| map.end())
        })
    }
}

impl From<Pairing> for Value {
    fn from(pairing: Pairing) -> Self {
        pairing.into_entry().pipe(Value::Object)
    }
}

/// Renders pairings as a JSON array of single-key objects.
pub fn pairings_to_value(pairings: Vec<Pairing>) -> Value {
    pairings.into_iter().map(Value::from).collect::<Vec<_>>().pipe(Value::Array)
}

fn string_attribute<'a>(
    index: usize,
    fields: &'a Map<String, Value>,
    attribute: &'static str,
) -> Result<&'a str> {
    match fields.get(attribute) {
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(other) => Err(self::Error::UnexpectedType {
            index,
            attribute,
            found: kind_name(other),
        }),
        None => Err(self::Error::MissingAttribute { index, attribute }),
    }
}

fn strict_pairing(index: usize, record: &Value) -> Result<Pairing> {
    match record {
        Value::Object(fields) => string_attribute(index, fields, NAME).and_then(|name| {
            string_attribute(index, fields, URL).map(|url| Pairing {
                name: name.to_string(),
                url: Value::String(url.to_string()),
            })
        }),
        other => Err(self::Error::NotAnObject {
            index,
            found: kind_name(other),
        }),
    }
}

fn permissive_pairing(index: usize, record: &Value) -> Pairing {
    let Value::Object(fields) = record else {
        debug!(
            index,
            found = kind_name(record),
            "record is not an object, pairing the missing key with null"
        );
        return Pairing {
            name: MISSING_KEY.to_string(),
            url: Value::Null,
        };
    };
    let name = fields.get(NAME).map(property_key).unwrap_or_else(|| {
        debug!(index, "record has no name, using the missing key");
        MISSING_KEY.to_string()
    });
    let url = fields.get(URL).cloned().unwrap_or_else(|| {
        debug!(index, "record has no url, using null");
        Value::Null
    });
    Pairing { name, url }
}

/// Maps every record of `input.results` to a single-entry `{ name: url }` pairing.
///
/// The output has one pairing per record, in input order. Repeated names are kept as
/// separate entries.
#[instrument(skip_all, fields(%policy))]
pub fn pair_names_with_urls(input: &Value, policy: Policy) -> Result<Vec<Pairing>> {
    let records = input::sequence(input, RESULTS)?;
    (match policy {
        Policy::Strict => records
            .iter()
            .enumerate()
            .map(|(index, record)| strict_pairing(index, record))
            .collect::<Result<Vec<_>>>()?,
        Policy::Permissive => records
            .iter()
            .enumerate()
            .map(|(index, record)| permissive_pairing(index, record))
            .collect(),
    })
    .pipe(|pairings| {
        debug!(pairings = pairings.len(), "paired");
        Ok(pairings)
    })
}
