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

use crate::function::serde_functions::FromStrVisitor;
use std::fmt;

/// `major.minor.patch` stamp written into `preferences.toml`.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct FileVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

impl FileVersion {
    pub fn current() -> Self {
        Self::from([
            env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or_default(),
            env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or_default(),
            env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or_default(),
        ])
    }
}

impl From<[u32; 3]> for FileVersion {
    fn from([major, minor, patch]: [u32; 3]) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl std::str::FromStr for FileVersion {
    type Err = anyhow::Error;

    fn from_str(version: &str) -> Result<Self, Self::Err> {
        let mut segments = version.trim().split('.');
        let mut next = |name: &str| -> anyhow::Result<u32> {
            let segment = segments
                .next()
                .ok_or_else(|| anyhow::anyhow!("{} not found in {:?}", name, version))?;
            Ok(segment.parse()?)
        };

        let parsed = Self::from([next("major")?, next("minor")?, next("patch")?]);

        if segments.next().is_some() {
            anyhow::bail!("too many segments: {:?}", version);
        }

        Ok(parsed)
    }
}

impl fmt::Display for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl serde::Serialize for FileVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for FileVersion {
    fn deserialize<D>(deserializer: D) -> Result<FileVersion, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(FromStrVisitor::new("a version string"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order() {
        let v = |s: &str| s.parse::<FileVersion>().unwrap();
        assert!(v("0.1.0") < v("0.1.1"));
        assert!(v("0.2.0") > v("0.1.9"));
        assert!(v("1.0.0") > v("0.10.10"));
        assert_eq!(v("0.1.0"), v(" 0.1.0 "));
    }

    #[test]
    fn reject_malformed() {
        assert!("0.1".parse::<FileVersion>().is_err());
        assert!("0.1.0.1".parse::<FileVersion>().is_err());
        assert!("a.b.c".parse::<FileVersion>().is_err());
    }

    #[test]
    fn current_matches_package() {
        assert_eq!(
            env!("CARGO_PKG_VERSION"),
            FileVersion::current().to_string()
        );
    }
}
