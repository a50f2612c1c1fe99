use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;

/// Supporting reference data (tools, project types, organizations).
///
/// Only `id` and `name` are interpreted; everything else is carried through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    #[serde(default, deserialize_with = "lenient::opt_id_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReferenceRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            extra: Map::new(),
        }
    }
}
