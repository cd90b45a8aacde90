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
use once_cell::sync::Lazy;
use regex::Regex;

static DIMENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".* (\d+x\d+)").expect("dimension pattern"));

fn dimension(line: &str) -> Option<&str> {
    DIMENSION
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|data| data.as_str())
}

/// Formats `wm size` output.
///
/// A single line yields its `WxH` token. With an override set, `wm size` prints the
/// physical size first and the override second, which becomes `override[physical]`.
/// Anything else comes back unchanged.
pub fn format_screen_size(raw: &str) -> String {
    let lines = raw.lines().collect::<Vec<_>>();

    let formatted = match lines.as_slice() {
        [] => None,
        [line] => dimension(line).map(str::to_string),
        [physical, overridden, ..] => dimension(physical)
            .zip(dimension(overridden))
            .map(|(physical, overridden)| format!("{overridden}[{physical}]")),
    };

    match formatted {
        Some(data) => data,
        None => {
            debug!(%raw, "no dimension found");
            raw.into()
        }
    }
}
