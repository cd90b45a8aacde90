/*
 * Copyright 2026 sukawasatoru
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use crate::feature::migrate::migrate_functions::{load_toml, write_toml};
use crate::model::DeviceState;
use crate::prelude::*;
use std::path::Path;

/// Stamps unversioned files and fills in the device state allow-list.
pub fn migrate_0_1_0(preferences_path: &Path) -> Fallible<()> {
    if !preferences_path.exists() {
        info!("preferences not found");
        return Ok(());
    }

    let mut preferences = load_toml(preferences_path)?;

    if let Some(version) = preferences.get("version") {
        info!(?version, "exists version");
        return Ok(());
    }

    let prefs_table = preferences
        .as_table_mut()
        .context("failed to parse to table")?;

    prefs_table.insert("version".into(), toml::Value::String("0.1.0".into()));

    if !prefs_table.contains_key("recognized_states") {
        let states = DeviceState::default_recognized()
            .iter()
            .map(|data| toml::Value::String(data.to_string()))
            .collect();
        prefs_table.insert("recognized_states".into(), toml::Value::Array(states));
    }

    write_toml(preferences_path, &preferences)?;

    info!("succeeded migration to 0.1.0");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::migrate::migrate_functions::tests::{check_version, prepare_preferences};
    use tempfile::tempdir;

    #[test]
    fn migrate_0_1_0() {
        let temp_dir = tempdir().context("prepare tempfile::tempdir()").unwrap();
        let prefs_path = temp_dir.path().join("settings.toml");

        prepare_preferences(&prefs_path, "adb_path = \"/usr/local/bin/adb\"\n");

        super::migrate_0_1_0(&prefs_path).unwrap();

        let preferences = load_toml(&prefs_path).unwrap();
        check_version(&preferences, "0.1.0");

        let states = preferences["recognized_states"]
            .as_array()
            .context("preferences.recognized_states")
            .unwrap()
            .iter()
            .filter_map(|data| data.as_str())
            .collect::<Vec<_>>();
        assert_eq!(vec!["device", "offline"], states);
        assert_eq!(
            Some("/usr/local/bin/adb"),
            preferences["adb_path"].as_str()
        );
    }

    #[test]
    fn keep_configured_states() {
        let temp_dir = tempdir().context("prepare tempfile::tempdir()").unwrap();
        let prefs_path = temp_dir.path().join("settings.toml");

        prepare_preferences(&prefs_path, "recognized_states = [\"device\"]\n");

        super::migrate_0_1_0(&prefs_path).unwrap();

        let preferences = load_toml(&prefs_path).unwrap();
        assert_eq!(1, preferences["recognized_states"].as_array().unwrap().len());
    }

    #[test]
    fn skip_migrate() {
        let temp_dir = tempdir().context("prepare tempfile::tempdir()").unwrap();
        let prefs_path = temp_dir.path().join("settings.toml");

        prepare_preferences(&prefs_path, "version = \"0.1.1\"\n");

        super::migrate_0_1_0(&prefs_path).unwrap();

        let preferences = load_toml(&prefs_path).unwrap();
        check_version(&preferences, "0.1.1");
        assert!(preferences.get("recognized_states").is_none());
    }
}
