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

use crate::model::DeviceState;
use std::path::PathBuf;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Preferences {
    /// Overrides every other adb lookup when set.
    pub adb_path: Option<PathBuf>,
    pub recognized_states: Vec<DeviceState>,
    /// Archive used by bootstrap instead of the embedded one.
    pub platform_tools_archive: Option<PathBuf>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            adb_path: None,
            recognized_states: DeviceState::default_recognized(),
            platform_tools_archive: None,
        }
    }
}
