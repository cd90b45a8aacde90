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

use crate::data::adb_repository::AdbRepository;
use crate::model::{DeviceRecord, DeviceState};
use crate::prelude::*;

const BANNER: &str = "List of devices attached";

fn is_banner(line: &str) -> bool {
    line.starts_with(BANNER) || line.starts_with('*')
}

/// Parses `adb devices` output.
///
/// Only lines ending with one of `recognized` survive, and the state must be exactly
/// that token. The banner and daemon status lines are skipped before the suffix check.
pub fn parse_devices(raw: &str, recognized: &[DeviceState]) -> Vec<DeviceRecord> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::trim)
        .filter(|line| {
            if is_banner(line) {
                debug!(%line, "skip banner");
                return false;
            }
            true
        })
        .filter(|line| {
            recognized
                .iter()
                .any(|state| line.ends_with(state.as_str()))
        })
        .filter_map(|line| {
            let segments = line.split('\t').collect::<Vec<_>>();
            if segments.len() < 2 {
                debug!(%line, "skip line");
                return None;
            }

            let state = match segments[1].trim().parse::<DeviceState>() {
                Ok(data) if recognized.contains(&data) => data,
                _ => {
                    debug!(%line, "skip unrecognized state");
                    return None;
                }
            };

            Some(DeviceRecord {
                serial: segments[0].trim().into(),
                state,
            })
        })
        .collect()
}

pub fn parse_devices_default(raw: &str) -> Vec<DeviceRecord> {
    parse_devices(raw, &DeviceState::default_recognized())
}

#[instrument(skip_all)]
pub async fn refresh_devices<R>(repo: &R, recognized: &[DeviceState]) -> Fallible<Vec<DeviceRecord>>
where
    R: AdbRepository + ?Sized,
{
    let raw = repo.devices().await.context("failed to invoke adb devices")?;
    let devices = parse_devices(&raw, recognized);
    info!(count = devices.len(), "devices refreshed");
    Ok(devices)
}
