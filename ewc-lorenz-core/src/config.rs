//! The flat key-value configuration record shared with the containerised model.
//!
//! The record is written to [`CONFIG_FILE_NAME`] in the run's working directory and is the
//! only thing the external model process reads from this adapter.
//! Keys are not validated, so any override is persisted as given.

use crate::errors::{LorenzError, LorenzResult};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{json, Map};
use std::fs;
use std::path::Path;

/// A single configuration value (a scalar or a small sequence)
pub type ConfigValue = serde_json::Value;

/// Name of the configuration file read by the model process
pub const CONFIG_FILE_NAME: &str = "lorenz_config.json";

/// Name of the configuration file removed when a run is finalized
///
/// This differs in case from [`CONFIG_FILE_NAME`]. On a case-sensitive filesystem the
/// written file is not found at cleanup and stays in the working directory.
pub const CLEANUP_FILE_NAME: &str = "Lorenz_config.json";

/// Keys exposed as model parameters
pub const LORENZ_PARAMS: [&str; 1] = ["J"];

/// Keys exposed as model states
pub const LORENZ_STATES: [&str; 1] = ["start_state"];

const JSON_INDENT: &[u8] = b"    ";

/// Caller-supplied values applied on top of the configuration record.
///
/// Overrides are applied in insertion order so a later duplicate key wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOverrides(Vec<(String, ConfigValue)>);

impl ConfigOverrides {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add an override, consuming and returning the set
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for ConfigOverrides
where
    K: Into<String>,
    V: Into<ConfigValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Configuration record for a single Lorenz run
///
/// Entries keep the order in which they were first inserted.
/// Each instance starts from its own copy of the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LorenzConfig {
    values: Map<String, ConfigValue>,
}

impl Default for LorenzConfig {
    fn default() -> Self {
        let mut values = Map::new();
        values.insert("F".to_string(), json!(1));
        values.insert("dt".to_string(), json!(1));
        values.insert("J".to_string(), json!(10));
        values.insert("start_state".to_string(), json!([0, 0, 0]));
        Self { values }
    }
}

impl LorenzConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// Set a value, returning the previous one
    ///
    /// An existing key keeps its position in the record.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Option<ConfigValue> {
        self.values.insert(key.into(), value.into())
    }

    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        for (key, value) in overrides.iter() {
            self.set(key, value.clone());
        }
    }

    /// Project the record onto a fixed set of keys
    ///
    /// Keys missing from the record are skipped.
    pub fn view(&self, keys: &[&str]) -> Vec<(String, ConfigValue)> {
        keys.iter()
            .filter_map(|key| {
                self.values
                    .get(*key)
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.values.iter()
    }

    /// Serialise as indented JSON (four spaces per level)
    pub fn to_json_pretty(&self) -> LorenzResult<String> {
        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(JSON_INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(buffer).map_err(|e| LorenzError::Error(e.to_string()))
    }

    /// Write the record to `path`, replacing any existing file
    ///
    /// The parent directory must already exist.
    pub fn write(&self, path: &Path) -> LorenzResult<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Read a record previously written with [`LorenzConfig::write`]
    pub fn read(path: &Path) -> LorenzResult<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LorenzConfig::default();
        let keys: Vec<&str> = config.iter().map(|(k, _)| k.as_str()).collect();

        assert_eq!(keys, vec!["F", "dt", "J", "start_state"]);
        assert_eq!(config.get("J"), Some(&json!(10)));
        assert_eq!(config.get("start_state"), Some(&json!([0, 0, 0])));
    }

    #[test]
    fn instances_do_not_share_state() {
        let mut first = LorenzConfig::new();
        first.set("J", 40);

        let second = LorenzConfig::new();
        assert_eq!(second.get("J"), Some(&json!(10)));
    }

    #[test]
    fn overrides_apply_in_order() {
        let mut config = LorenzConfig::new();
        let overrides = ConfigOverrides::new()
            .with("J", 5)
            .with("custom", "value")
            .with("J", 7);

        config.apply(&overrides);

        assert_eq!(config.get("J"), Some(&json!(7)));
        assert_eq!(config.get("custom"), Some(&json!("value")));
        // Existing keys keep their position, new keys are appended
        let keys: Vec<&str> = config.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["F", "dt", "J", "start_state", "custom"]);
    }

    #[test]
    fn overrides_from_iterator() {
        let overrides: ConfigOverrides = vec![("J", json!(3)), ("start_state", json!([1, 2, 3]))]
            .into_iter()
            .collect();

        assert_eq!(overrides.len(), 2);
        assert!(!overrides.is_empty());
        assert_eq!(overrides.iter().next(), Some(("J", &json!(3))));
    }

    #[test]
    fn view_projects_requested_keys() {
        let config = LorenzConfig::new();

        assert_eq!(config.view(&LORENZ_PARAMS), vec![("J".to_string(), json!(10))]);
        assert_eq!(
            config.view(&LORENZ_STATES),
            vec![("start_state".to_string(), json!([0, 0, 0]))]
        );
        assert!(config.view(&["missing"]).is_empty());
    }

    #[test]
    fn pretty_json_uses_four_space_indent() {
        let mut config = LorenzConfig::new();
        config.set("F", 1.0);
        config.set("dt", 0.1);

        let expected = r#"{
    "F": 1.0,
    "dt": 0.1,
    "J": 10,
    "start_state": [
        0,
        0,
        0
    ]
}"#;
        assert_eq!(config.to_json_pretty().unwrap(), expected);
    }

    #[test]
    fn non_finite_numbers_are_written_as_null() {
        let mut config = LorenzConfig::new();
        config.set("F", f64::NAN);

        let restored: serde_json::Value =
            serde_json::from_str(&config.to_json_pretty().unwrap()).unwrap();
        assert_eq!(restored["F"], serde_json::Value::Null);
    }

    #[test]
    fn write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = LorenzConfig::new();
        config.set("end_time", 2.5);
        config.write(&path).unwrap();

        let restored = LorenzConfig::read(&path).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join(CONFIG_FILE_NAME);

        let result = LorenzConfig::new().write(&path);
        assert!(matches!(result, Err(LorenzError::Io(_))));
    }
}
