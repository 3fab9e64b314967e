use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::StreamError;

/// One document of a rendered stream.
///
/// `position` is the document's index in the stream it was decoded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    position: usize,
    body: Mapping,
}

/// The `apiVersion`/`kind` pair of a manifest, read without parsing anything else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeMeta<'a> {
    pub api_version: Option<&'a str>,
    pub kind: Option<&'a str>,
}

impl TypeMeta<'_> {
    /// True when both markers are present and equal the given pair.
    pub fn is(&self, api_version: &str, kind: &str) -> bool {
        self.api_version == Some(api_version) && self.kind == Some(kind)
    }
}

impl Manifest {
    pub fn new(position: usize, body: Mapping) -> Self {
        Self { position, body }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn body(&self) -> &Mapping {
        &self.body
    }

    pub fn into_body(self) -> Mapping {
        self.body
    }

    /// Read the type markers. Non-string markers read as absent.
    pub fn type_meta(&self) -> TypeMeta<'_> {
        TypeMeta {
            api_version: self.body.get("apiVersion").and_then(Value::as_str),
            kind: self.body.get("kind").and_then(Value::as_str),
        }
    }

    /// Deserialize the whole document into `T`.
    pub fn parse_as<T: DeserializeOwned>(&self) -> Result<T, StreamError> {
        serde_yaml::from_value(Value::Mapping(self.body.clone())).map_err(|source| {
            StreamError::Schema {
                index: self.position,
                source,
            }
        })
    }
}
