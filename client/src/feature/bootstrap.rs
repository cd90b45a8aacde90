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

use crate::data::asset::Asset;
use crate::data::env::Env;
use crate::prelude::*;
use std::fs::{self, File};
use std::io::{self, BufWriter, Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("platform-tools archive not found: {0}")]
    ArchiveNotFound(String),

    #[error("invalid platform-tools archive")]
    InvalidArchive(#[from] zip::result::ZipError),

    #[error("archive entry escapes the data directory: {0}")]
    UnsafeEntry(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Clone, Debug)]
pub enum ArchiveSource {
    Embedded,
    File(PathBuf),
}

#[derive(Debug, Eq, PartialEq)]
pub enum BootstrapOutcome {
    AlreadyPresent,
    Extracted { entries: usize },
}

/// Extracts platform-tools into the data directory unless a previous run already did.
///
/// Entries are staged in a temporary directory next to the destination and moved in
/// once the whole archive has been written.
#[instrument(skip_all, fields(data_dir = %env.data_dir().display()))]
pub fn bootstrap(
    env: &Env,
    source: &ArchiveSource,
    mut note: impl FnMut(&str),
) -> Result<BootstrapOutcome, BootstrapError> {
    if is_present(&env.platform_tools_dir()) {
        info!("platform-tools already present");
        return Ok(BootstrapOutcome::AlreadyPresent);
    }

    fs::create_dir_all(env.data_dir())?;

    let entries = match source {
        ArchiveSource::Embedded => {
            let name = env.platform_zip();
            let file = Asset::get(&name).ok_or(BootstrapError::ArchiveNotFound(name))?;
            extract(Cursor::new(file.data), env.data_dir(), &mut note)?
        }
        ArchiveSource::File(path) => {
            let file = File::open(path).map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    BootstrapError::ArchiveNotFound(path.display().to_string())
                }
                _ => e.into(),
            })?;
            extract(file, env.data_dir(), &mut note)?
        }
    };

    info!(entries, "succeeded extraction");
    Ok(BootstrapOutcome::Extracted { entries })
}

fn is_present(dir: &Path) -> bool {
    match fs::read_dir(dir) {
        Ok(mut data) => data.next().is_some(),
        Err(_) => false,
    }
}

fn extract<R: Read + Seek>(
    reader: R,
    dest: &Path,
    note: &mut impl FnMut(&str),
) -> Result<usize, BootstrapError> {
    let mut archive = ZipArchive::new(reader)?;
    let staging = tempfile::Builder::new()
        .prefix(".extract-")
        .tempdir_in(dest)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| BootstrapError::UnsafeEntry(name.clone()))?;

        note(&format!("extracting: {}", name));
        debug!(%name, "extract");

        let target = staging.path().join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(&target)?);
        io::copy(&mut entry, &mut writer)?;
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        seal(&target)?;
    }

    for top in fs::read_dir(staging.path())? {
        let top = top?;
        let final_path = dest.join(top.file_name());
        if final_path.is_dir() {
            fs::remove_dir_all(&final_path)?;
        } else if final_path.exists() {
            fs::remove_file(&final_path)?;
        }
        fs::rename(top.path(), &final_path)?;
    }

    Ok(archive.len())
}

#[cfg(unix)]
fn seal(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o555))
}

#[cfg(not(unix))]
fn seal(path: &Path) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_readonly(true);
    fs::set_permissions(path, permissions)
}
