//! JSON-LD (de)serialization of mapped entities.
//!
//! Entities are plain serde types that name their JSON-LD type through
//! [`JsonLdEntity::TYPE`]. On the wire the type appears as the short name in
//! an `@type` member:
//!
//! ```
//! use jsonld_client::codec::{from_jsonld, to_jsonld, JsonLdEntity, OneOrMany};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Letter {
//!     id: Option<String>,
//!     letter: String,
//! }
//!
//! impl JsonLdEntity for Letter {
//!     const TYPE: &'static str = "alphabet::Letter";
//!     fn id(&self) -> Option<&str> {
//!         self.id.as_deref()
//!     }
//! }
//!
//! let body = to_jsonld(&Letter { id: None, letter: "a".into() }).unwrap();
//! assert_eq!(&body[..], br#"{"@type":"Letter","id":null,"letter":"a"}"#);
//!
//! let many = from_jsonld::<Letter>(r#"[{"@type":"Letter","letter":"b"}]"#).unwrap();
//! assert_eq!(many.into_vec()[0].letter, "b");
//! ```

use crate::error::{JsonLdError, Result};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Member carrying the JSON-LD type of an object.
pub const TYPE_KEY: &str = "@type";

/// Separator between namespace segments of a type name.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// A serde type exchanged with a JSON-LD API.
pub trait JsonLdEntity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Namespaced type name, e.g. `"library::Book"`.
    const TYPE: &'static str;

    /// Identifier of a persisted entity.
    fn id(&self) -> Option<&str>;

    fn short_type() -> &'static str {
        short_name(Self::TYPE)
    }
}

/// Last segment of a namespaced type name.
pub fn short_name(type_name: &str) -> &str {
    type_name
        .rsplit(NAMESPACE_SEPARATOR)
        .next()
        .unwrap_or(type_name)
}

/// Namespace of a type name, empty for unqualified names.
pub fn namespace(type_name: &str) -> &str {
    type_name
        .rsplit_once(NAMESPACE_SEPARATOR)
        .map(|(ns, _)| ns)
        .unwrap_or_default()
}

/// A body holding either a single object or an array of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }

    /// The single object, or the first element of an array.
    pub fn into_first(self) -> Option<T> {
        match self {
            OneOrMany::One(item) => Some(item),
            OneOrMany::Many(items) => items.into_iter().next(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Serialize an entity as a JSON-LD object tagged with its short type.
pub fn to_jsonld<T: JsonLdEntity>(entity: &T) -> Result<Bytes> {
    let mut value = serde_json::to_value(entity)?;
    let Some(object) = value.as_object_mut() else {
        return Err(JsonLdError::serialization(format!(
            "{} does not serialize to a JSON object",
            T::TYPE
        )));
    };
    object.insert(TYPE_KEY.to_string(), Value::String(T::short_type().to_string()));
    Ok(Bytes::from(serde_json::to_vec(&value)?))
}

/// Deserialize a body holding one entity or an array of entities.
///
/// An `@type` member must carry the short name of `T`.
pub fn from_jsonld<T: JsonLdEntity>(body: &str) -> Result<OneOrMany<T>> {
    decode_body(body, &|found| short_name(found) == T::short_type())
}

/// Like [`from_jsonld`], but an `@type` member is first resolved to a full
/// type name by `resolve` and must then equal `T::TYPE`.
pub fn from_jsonld_resolved<T, R>(body: &str, resolve: R) -> Result<OneOrMany<T>>
where
    T: JsonLdEntity,
    R: Fn(&str) -> String,
{
    decode_body(body, &|found| resolve(found) == T::TYPE)
}

fn decode_body<T: JsonLdEntity>(body: &str, accepts: &dyn Fn(&str) -> bool) -> Result<OneOrMany<T>> {
    match serde_json::from_str(body)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| decode_entity::<T>(item, accepts))
            .collect::<Result<Vec<_>>>()
            .map(OneOrMany::Many),
        value => decode_entity(value, accepts).map(OneOrMany::One),
    }
}

fn decode_entity<T: JsonLdEntity>(mut value: Value, accepts: &dyn Fn(&str) -> bool) -> Result<T> {
    if let Some(object) = value.as_object_mut() {
        if let Some(found) = object.remove(TYPE_KEY) {
            let found = found.as_str().unwrap_or_default();
            if !accepts(found) {
                return Err(JsonLdError::serialization(format!(
                    "Expected {} but got {}",
                    T::short_type(),
                    found
                )));
            }
        }
    }
    Ok(serde_json::from_value(value)?)
}
