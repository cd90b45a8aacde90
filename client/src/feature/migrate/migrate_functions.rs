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

use crate::prelude::*;
use std::path::Path;

pub fn load_toml(prefs_file_path: &Path) -> Fallible<toml::Value> {
    let buf = std::fs::read_to_string(prefs_file_path)
        .with_context(|| format!("read {}", prefs_file_path.display()))?;
    toml::from_str(&buf).with_context(|| format!("parse {}", prefs_file_path.display()))
}

pub fn write_toml(prefs_file_path: &Path, toml_value: &toml::Value) -> Fallible<()> {
    std::fs::write(prefs_file_path, toml::to_string_pretty(toml_value)?)
        .with_context(|| format!("write {}", prefs_file_path.display()))
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub fn check_version(toml_value: &toml::Value, version: &str) {
        assert_eq!(
            Some(version),
            toml_value.get("version").and_then(toml::Value::as_str)
        );
    }

    pub fn prepare_preferences(prefs_path: &Path, file_str: &str) {
        std::fs::write(prefs_path, file_str)
            .with_context(|| format!("write {}", prefs_path.display()))
            .unwrap();
    }
}
