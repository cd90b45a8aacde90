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

use crate::model::{DeviceState, FileVersion, Preferences};
use crate::prelude::*;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs::{create_dir_all, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};

pub const PREFERENCES_FILE_NAME: &str = "preferences.toml";

pub fn project_dirs() -> Fallible<ProjectDirs> {
    ProjectDirs::from("com", "adb-helper", "AdbHelper").context("directories")
}

#[async_trait::async_trait]
pub trait PreferencesRepository: Send + Sync {
    async fn load(&self) -> Fallible<Preferences>;
}

pub struct PreferencesRepositoryImpl {
    config_file_path: PathBuf,
}

impl PreferencesRepositoryImpl {
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            config_file_path: file_path,
        }
    }

    async fn prepare(&self) -> Fallible<()> {
        if !self.config_file_path.exists() {
            create_dir_all(self.config_file_path.parent().context("file directory")?).await?;

            let mut buf = BufWriter::new(
                File::create(&self.config_file_path)
                    .await
                    .context("failed to create preferences file")?,
            );

            buf.write_all(toml::to_string::<PrefsDto>(&Preferences::default().into())?.as_bytes())
                .await?;

            buf.flush().await.context("failed to flush preferences")?;

            info!(path = %self.config_file_path.display(), "created preferences");
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl PreferencesRepository for PreferencesRepositoryImpl {
    async fn load(&self) -> Fallible<Preferences> {
        self.prepare().await?;

        let mut buf = BufReader::new(
            File::open(&self.config_file_path)
                .await
                .context("failed to open preferences file")?,
        );

        let mut prefs_string = String::new();
        buf.read_to_string(&mut prefs_string)
            .await
            .context("failed to load preferences file")?;

        Ok(toml::from_str::<PrefsDto>(&prefs_string)
            .with_context(|| format!("failed to parse preferences: {}", prefs_string))?
            .into())
    }
}

pub struct MockPreferencesRepository;

#[async_trait::async_trait]
impl PreferencesRepository for MockPreferencesRepository {
    async fn load(&self) -> Fallible<Preferences> {
        Ok(Default::default())
    }
}

/// Falls back to the defaults when the file cannot be loaded.
pub async fn load_or_default<P>(repo: &P) -> Preferences
where
    P: PreferencesRepository + ?Sized,
{
    match repo.load().await {
        Ok(data) => data,
        Err(e) => {
            warn!(?e, "failed to load preferences");
            Default::default()
        }
    }
}

fn default_recognized_states() -> Vec<DeviceState> {
    DeviceState::default_recognized()
}

#[derive(Debug, Deserialize, Eq, PartialEq, Serialize)]
struct PrefsDto {
    version: FileVersion,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    adb_path: Option<PathBuf>,

    #[serde(default = "default_recognized_states")]
    recognized_states: Vec<DeviceState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    platform_tools_archive: Option<PathBuf>,
}

impl From<Preferences> for PrefsDto {
    fn from(value: Preferences) -> Self {
        Self {
            version: FileVersion::current(),
            adb_path: value.adb_path,
            recognized_states: value.recognized_states,
            platform_tools_archive: value.platform_tools_archive,
        }
    }
}

impl From<PrefsDto> for Preferences {
    fn from(value: PrefsDto) -> Self {
        let non_empty = |path: Option<PathBuf>| path.filter(|data| !data.as_os_str().is_empty());

        Self {
            adb_path: non_empty(value.adb_path),
            recognized_states: value.recognized_states,
            platform_tools_archive: non_empty(value.platform_tools_archive),
        }
    }
}
