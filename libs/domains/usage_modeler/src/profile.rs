//! Named usage profiles loaded from a YAML directory, grounded on
//! `usage-modeling-engine/app/usage/profile_loader.py`'s `ProfileLoader`
//! (glob `*.yaml`, validate required fields, keep an in-memory map keyed by
//! file stem).

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{ModelerError, ModelerResult};

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioSpec {
    pub min: Decimal,
    pub expected: Decimal,
    pub max: Decimal,
    pub unit: String,
    #[serde(default)]
    pub assumption: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsageProfile {
    pub version: String,
    pub name: String,
    pub description: String,
    /// Keyed by `"{service}/{resource_type}"`.
    #[serde(default)]
    pub scenarios: BTreeMap<String, ScenarioSpec>,
}

impl UsageProfile {
    pub fn lookup(&self, service: &str, resource_type: &str) -> Option<&ScenarioSpec> {
        self.scenarios.get(&scenario_key(service, resource_type))
    }
}

pub fn scenario_key(service: &str, resource_type: &str) -> String {
    format!("{service}/{resource_type}")
}

#[derive(Default)]
pub struct ProfileStore {
    profiles: BTreeMap<String, UsageProfile>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.yaml` file in `dir`, keyed by file stem. Files that
    /// fail to parse or lack `version`/`name`/`description` are skipped
    /// with a warning rather than aborting the whole load, matching the
    /// original loader's per-file tolerance.
    pub fn load_dir(&mut self, dir: &Path) -> ModelerResult<()> {
        if !dir.exists() {
            return Err(ModelerError::ProfileDirectoryMissing(dir.display().to_string()));
        }
        let entries = std::fs::read_dir(dir)
            .map_err(|e| ModelerError::ProfileDirectoryMissing(e.to_string()))?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "yaml") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match std::fs::read_to_string(&path) {
                Ok(contents) => match serde_yaml::from_str::<UsageProfile>(&contents) {
                    Ok(profile) => {
                        self.profiles.insert(stem.to_string(), profile);
                    }
                    Err(err) => {
                        tracing::warn!(profile = stem, error = %err, "skipping invalid usage profile");
                    }
                },
                Err(err) => {
                    tracing::warn!(profile = stem, error = %err, "failed to read usage profile file");
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> ModelerResult<&UsageProfile> {
        self.profiles
            .get(name)
            .ok_or_else(|| ModelerError::ProfileNotFound(name.to_string()))
    }

    pub fn list(&self) -> Vec<&str> {
        self.profiles.keys().map(|s| s.as_str()).collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, profile: UsageProfile) {
        self.profiles.insert(name.into(), profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn scenario_key_joins_service_and_resource_type() {
        assert_eq!(scenario_key("aws", "ec2_instance"), "aws/ec2_instance");
    }

    #[test]
    fn lookup_finds_registered_scenario() {
        let mut scenarios = BTreeMap::new();
        scenarios.insert(
            scenario_key("aws", "ec2_instance"),
            ScenarioSpec {
                min: dec!(160),
                expected: dec!(730),
                max: dec!(730),
                unit: "hours".to_string(),
                assumption: Some("24x7 uptime assumed".to_string()),
            },
        );
        let profile = UsageProfile {
            version: "1".to_string(),
            name: "prod".to_string(),
            description: "production".to_string(),
            scenarios,
        };
        assert!(profile.lookup("aws", "ec2_instance").is_some());
        assert!(profile.lookup("aws", "rds_instance").is_none());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let mut store = ProfileStore::new();
        let result = store.load_dir(Path::new("/nonexistent/usage-profiles"));
        assert!(result.is_err());
    }
}
