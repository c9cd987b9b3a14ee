//! Resource views the CLI reads: containers, databases, sources,
//! replication specs. Only the fields the tooling consumes are modeled.

use serde::{Deserialize, Serialize};

/// Opaque reference to a server-side object (e.g. `CONTAINER-3`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectRef(pub String);

impl ObjectRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectRef {
    fn from(value: &str) -> Self {
        ObjectRef(value.to_string())
    }
}

/// Minimal name + reference pair; the shape of most listing endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NamedRef {
    pub reference: ObjectRef,
    pub name: String,
}

/// Self-service data container.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContainerView {
    pub reference: ObjectRef,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<ObjectRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<String>,
}

/// Database as listed by the engine; VDB names resolve against these.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseView {
    pub reference: ObjectRef,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Source backing a database. A VDB's source is virtual and not staging.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceView {
    pub reference: ObjectRef,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<ObjectRef>,
    #[serde(rename = "virtual", default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub staging: bool,
}
