//! Field shapes shared by every document type in the content store

use serde::{Deserialize, Serialize};

/// A `slug` field: `{ "_type": "slug", "current": "..." }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slug {
    #[serde(rename = "_type", default = "slug_type")]
    pub kind: String,
    pub current: String,
}

impl Slug {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            kind: slug_type(),
            current: current.into(),
        }
    }
}

fn slug_type() -> String {
    "slug".to_string()
}
