//! Engine catalog: the configuration file mapping engine names to
//! addresses and credentials, and target-set resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One remote management endpoint. Immutable once loaded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineTarget {
    pub name: String,
    pub address: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default)]
    pub https: bool,
    #[serde(default)]
    pub default: bool,
}

impl EngineTarget {
    /// Base URL for the engine's REST API.
    pub fn base_url(&self) -> String {
        let scheme = if self.https { "https" } else { "http" };
        match self.port {
            Some(port) => format!("{scheme}://{}:{port}", self.address),
            None => format!("{scheme}://{}", self.address),
        }
    }
}

/// Which engines a command runs against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetSelector {
    /// Every engine in the catalog.
    All,
    /// A single engine picked by name.
    Named(String),
    /// The engine flagged `default` in the catalog.
    Default,
}

/// The parsed catalog file. Loaded once before any worker starts and
/// read-only thereafter.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EngineCatalog {
    engines: Vec<EngineTarget>,
}

impl EngineCatalog {
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!(
                "unable to read engine catalog {}: {e}",
                path.display()
            ))
        })?;
        let catalog: EngineCatalog = serde_json::from_str(&raw).map_err(|e| {
            EngineError::Config(format!(
                "engine catalog {} is not valid JSON: {e}",
                path.display()
            ))
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.engines.is_empty() {
            return Err(EngineError::Config(
                "engine catalog contains no engines".into(),
            ));
        }
        for (i, engine) in self.engines.iter().enumerate() {
            if engine.name.is_empty() {
                return Err(EngineError::Config(format!(
                    "engine entry {i} has an empty name"
                )));
            }
            if self.engines[..i].iter().any(|e| e.name == engine.name) {
                return Err(EngineError::Config(format!(
                    "duplicate engine name '{}' in catalog",
                    engine.name
                )));
            }
        }
        Ok(())
    }

    pub fn engines(&self) -> &[EngineTarget] {
        &self.engines
    }

    pub fn get(&self, name: &str) -> Option<&EngineTarget> {
        self.engines.iter().find(|e| e.name == name)
    }

    /// Resolve the selector to a concrete target set.
    ///
    /// Fails before any worker starts: an unknown name is
    /// [`EngineError::UnknownEngine`], and asking for the default when no
    /// engine carries the flag is [`EngineError::NoTargetEngine`].
    pub fn resolve(&self, selector: &TargetSelector) -> Result<Vec<EngineTarget>, EngineError> {
        match selector {
            TargetSelector::All => Ok(self.engines.clone()),
            TargetSelector::Named(name) => self
                .get(name)
                .cloned()
                .map(|e| vec![e])
                .ok_or_else(|| EngineError::UnknownEngine(name.clone())),
            TargetSelector::Default => self
                .engines
                .iter()
                .find(|e| e.default)
                .cloned()
                .map(|e| vec![e])
                .ok_or(EngineError::NoTargetEngine),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> EngineCatalog {
        serde_json::from_str(
            r#"{
              "engines": [
                {"name": "east", "address": "east.example", "username": "admin", "password": "pw"},
                {"name": "west", "address": "west.example", "username": "admin", "password": "pw", "default": true, "port": 8443, "https": true}
              ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn resolves_all() {
        let targets = catalog().resolve(&TargetSelector::All).unwrap();
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn resolves_named() {
        let targets = catalog()
            .resolve(&TargetSelector::Named("east".into()))
            .unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name, "east");
    }

    #[test]
    fn unknown_name_fails_before_workers() {
        let err = catalog()
            .resolve(&TargetSelector::Named("missing-name".into()))
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownEngine(name) if name == "missing-name"));
    }

    #[test]
    fn resolves_default_flag() {
        let targets = catalog().resolve(&TargetSelector::Default).unwrap();
        assert_eq!(targets[0].name, "west");
    }

    #[test]
    fn missing_default_fails() {
        let catalog: EngineCatalog = serde_json::from_str(
            r#"{"engines": [{"name": "east", "address": "e", "username": "u", "password": "p"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            catalog.resolve(&TargetSelector::Default),
            Err(EngineError::NoTargetEngine)
        ));
    }

    #[test]
    fn duplicate_names_rejected() {
        let dup: EngineCatalog = serde_json::from_str(
            r#"{"engines": [
                {"name": "east", "address": "a", "username": "u", "password": "p"},
                {"name": "east", "address": "b", "username": "u", "password": "p"}
            ]}"#,
        )
        .unwrap();
        assert!(matches!(dup.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn base_url_honors_scheme_and_port() {
        let catalog = catalog();
        assert_eq!(catalog.get("east").unwrap().base_url(), "http://east.example");
        assert_eq!(
            catalog.get("west").unwrap().base_url(),
            "https://west.example:8443"
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let err = EngineCatalog::load(Path::new("/nonexistent/engines.json")).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn load_parses_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engines.json");
        std::fs::write(
            &path,
            r#"{"engines": [{"name": "east", "address": "east.example",
                "username": "admin", "password": "pw", "default": true}]}"#,
        )
        .unwrap();
        let catalog = EngineCatalog::load(&path).unwrap();
        assert_eq!(catalog.engines().len(), 1);
        assert!(catalog.get("east").unwrap().default);
    }
}
