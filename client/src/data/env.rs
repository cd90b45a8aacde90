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

use directories::BaseDirs;
use std::path::{Path, PathBuf};

const PLATFORM_TOOLS_REVISION: &str = "r33.0.2";

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("platform({0}) not supported yet")]
    UnsupportedPlatform(&'static str),

    #[error("home directory not found")]
    HomeDirNotFound,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Platform {
    Darwin,
    Linux,
    Windows,
}

impl Platform {
    fn current() -> Result<Self, EnvError> {
        match std::env::consts::OS {
            "macos" => Ok(Platform::Darwin),
            "linux" => Ok(Platform::Linux),
            "windows" => Ok(Platform::Windows),
            other => Err(EnvError::UnsupportedPlatform(other)),
        }
    }

    fn archive_suffix(&self) -> &'static str {
        match self {
            Platform::Darwin => "darwin",
            Platform::Linux => "linux",
            Platform::Windows => "windows",
        }
    }
}

/// Host layout of the bundled platform-tools.
#[derive(Clone, Debug)]
pub struct Env {
    platform: Platform,
    data_dir: PathBuf,
}

impl Env {
    /// `~/.adb_helper` on the current host.
    pub fn pick() -> Result<Self, EnvError> {
        let home = BaseDirs::new().ok_or(EnvError::HomeDirNotFound)?;
        Self::with_data_dir(home.home_dir().join(".adb_helper"))
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Result<Self, EnvError> {
        Ok(Self {
            platform: Platform::current()?,
            data_dir,
        })
    }

    /// Name of the embedded archive, e.g. `platform-tools_r33.0.2-darwin.zip`.
    pub fn platform_zip(&self) -> String {
        format!(
            "platform-tools_{}-{}.zip",
            PLATFORM_TOOLS_REVISION,
            self.platform.archive_suffix()
        )
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn platform_tools_dir(&self) -> PathBuf {
        self.data_dir.join("platform-tools")
    }

    pub fn adb(&self) -> PathBuf {
        self.platform_tools_dir().join(Self::adb_file_name())
    }

    pub fn adb_file_name() -> &'static str {
        if cfg!(target_os = "windows") {
            "adb.exe"
        } else {
            "adb"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        let env = Env::with_data_dir("/tmp/adb_helper_test".into()).unwrap();
        assert_eq!(Path::new("/tmp/adb_helper_test"), env.data_dir());
        assert_eq!(
            PathBuf::from("/tmp/adb_helper_test/platform-tools"),
            env.platform_tools_dir()
        );
        assert!(env.adb().starts_with(env.platform_tools_dir()));
        assert!(env.platform_zip().starts_with("platform-tools_r33.0.2-"));
        assert!(env.platform_zip().ends_with(".zip"));
    }

    #[test]
    fn pick_uses_home() {
        let env = Env::pick().unwrap();
        assert!(env.data_dir().ends_with(".adb_helper"));
    }
}
