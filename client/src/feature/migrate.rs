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

mod migrate_0_1_0;
mod migrate_functions;

use crate::data::preferences_repository::{project_dirs, PREFERENCES_FILE_NAME};
use crate::feature::migrate::migrate_functions::{load_toml, write_toml};
use crate::model::FileVersion;
use crate::prelude::*;
use migrate_0_1_0::migrate_0_1_0;
use std::path::Path;

/// Migrates `preferences.toml` in the default config directory.
pub fn migrate() -> Fallible<()> {
    migrate_file(&project_dirs()?.config_dir().join(PREFERENCES_FILE_NAME))
}

/// Migrates exactly `preferences_path`; sibling files are never touched.
pub fn migrate_file(preferences_path: &Path) -> Fallible<()> {
    let version = FileVersion::current();

    info!(%version, path = %preferences_path.display(), "start migration");

    let functions = prepare_migrate_functions(preferences_path);

    for (version_str, migrate) in functions {
        let migrate_version = version_str.parse::<FileVersion>()?;

        info!(%migrate_version, "start migrate");
        migrate()?;
        info!(%migrate_version, "end migrate");
    }

    set_latest_version(preferences_path, &version)?;

    info!(%version, "succeeded all migration");
    Ok(())
}

#[allow(clippy::type_complexity)]
fn prepare_migrate_functions(
    preferences_path: &Path,
) -> Vec<(&'static str, Box<dyn Fn() -> Fallible<()>>)> {
    #[allow(clippy::type_complexity)]
    let mut functions: Vec<(&'static str, Box<dyn Fn() -> Fallible<()>>)> = vec![];

    let preferences_path = preferences_path.to_path_buf();
    functions.push(("0.1.0", Box::new(move || migrate_0_1_0(&preferences_path))));

    functions
}

fn set_latest_version(preferences_path: &Path, new_version: &FileVersion) -> Fallible<()> {
    if !preferences_path.exists() {
        return Ok(());
    }

    let mut preferences = load_toml(preferences_path)?;

    let preferences_version = preferences
        .get("version")
        .and_then(|data| data.as_str())
        .context("preferences.version")?
        .parse::<FileVersion>()?;

    if &preferences_version < new_version {
        info!(%preferences_version, "set version to preferences");

        preferences
            .as_table_mut()
            .context("failed to parse to table")?
            .insert("version".into(), toml::Value::try_from(new_version)?);

        write_toml(preferences_path, &preferences)?;

        info!("succeeded set version to preferences");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::preferences_repository::{PreferencesRepository, PreferencesRepositoryImpl};
    use crate::feature::migrate::migrate_functions::tests::{check_version, prepare_preferences};
    use tempfile::tempdir;

    #[test]
    fn set_version() {
        let temp_dir = tempdir().context("prepare tempfile::tempdir()").unwrap();
        let prefs_path = temp_dir.path().join(PREFERENCES_FILE_NAME);

        prepare_preferences(&prefs_path, "version = \"0.0.1\"\n");
        set_latest_version(&prefs_path, &"0.1.0".parse().unwrap()).unwrap();

        check_version(&load_toml(&prefs_path).unwrap(), "0.1.0");
    }

    #[test]
    fn keep_newer_version() {
        let temp_dir = tempdir().context("prepare tempfile::tempdir()").unwrap();
        let prefs_path = temp_dir.path().join(PREFERENCES_FILE_NAME);

        prepare_preferences(&prefs_path, "version = \"9.0.0\"\n");
        set_latest_version(&prefs_path, &"0.1.0".parse().unwrap()).unwrap();

        check_version(&load_toml(&prefs_path).unwrap(), "9.0.0");
    }

    #[test]
    fn migrate_without_preferences() {
        let temp_dir = tempdir().context("prepare tempfile::tempdir()").unwrap();
        let prefs_path = temp_dir.path().join(PREFERENCES_FILE_NAME);

        migrate_file(&prefs_path).unwrap();

        assert!(!prefs_path.exists());
    }

    #[test]
    fn migrate_legacy_preferences() {
        let temp_dir = tempdir().context("prepare tempfile::tempdir()").unwrap();
        let prefs_path = temp_dir.path().join(PREFERENCES_FILE_NAME);

        prepare_preferences(&prefs_path, "adb_path = \"/usr/bin/adb\"\n");
        migrate_file(&prefs_path).unwrap();

        let preferences = load_toml(&prefs_path).unwrap();
        check_version(&preferences, env!("CARGO_PKG_VERSION"));
        assert_eq!(Some("/usr/bin/adb"), preferences["adb_path"].as_str());
    }

    #[tokio::test]
    async fn migrate_custom_file_only() {
        let temp_dir = tempdir().context("prepare tempfile::tempdir()").unwrap();
        let custom_path = temp_dir.path().join("custom.toml");
        let sibling_path = temp_dir.path().join(PREFERENCES_FILE_NAME);

        prepare_preferences(&custom_path, "adb_path = \"/usr/bin/adb\"\n");
        prepare_preferences(&sibling_path, "other = 1\n");

        migrate_file(&custom_path).unwrap();

        assert_eq!(
            "other = 1\n",
            std::fs::read_to_string(&sibling_path).unwrap()
        );

        check_version(&load_toml(&custom_path).unwrap(), env!("CARGO_PKG_VERSION"));

        let prefs = PreferencesRepositoryImpl::new(custom_path)
            .load()
            .await
            .unwrap();
        assert_eq!(Some("/usr/bin/adb".into()), prefs.adb_path);
    }

    #[test]
    fn latest_version() {
        let temp_dir = tempdir().context("prepare tempfile::tempdir()").unwrap();
        let last_version = prepare_migrate_functions(&temp_dir.path().join(PREFERENCES_FILE_NAME))
            .last()
            .unwrap()
            .0
            .parse::<FileVersion>()
            .unwrap();

        assert!(
            last_version <= FileVersion::current(),
            "last_version: {}, env: {}",
            last_version,
            env!("CARGO_PKG_VERSION")
        );
    }
}
