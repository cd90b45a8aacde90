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
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum DeviceState {
    Device,
    Offline,
    Other(String),
}

impl DeviceState {
    pub fn as_str(&self) -> &str {
        match self {
            DeviceState::Device => "device",
            DeviceState::Offline => "offline",
            DeviceState::Other(data) => data.as_str(),
        }
    }

    /// Tokens accepted by `adb devices` parsing unless preferences say otherwise.
    pub fn default_recognized() -> Vec<DeviceState> {
        vec![DeviceState::Device, DeviceState::Offline]
    }
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum ParseDeviceStateError {
    #[error("device state is empty")]
    Empty,

    #[error("device state contains whitespace: {0:?}")]
    Whitespace(String),
}

impl FromStr for DeviceState {
    type Err = ParseDeviceStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseDeviceStateError::Empty);
        }

        if s.chars().any(char::is_whitespace) {
            return Err(ParseDeviceStateError::Whitespace(s.into()));
        }

        Ok(match s {
            "device" => DeviceState::Device,
            "offline" => DeviceState::Offline,
            _ => DeviceState::Other(s.into()),
        })
    }
}

impl Display for DeviceState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for DeviceState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for DeviceState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(FromStrVisitor::new("a device state token"))
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DeviceRecord {
    pub serial: String,
    pub state: DeviceState,
}

impl DeviceRecord {
    /// Only devices in the `device` state accept shell commands.
    pub fn is_available(&self) -> bool {
        self.state == DeviceState::Device
    }

    /// Reconstructs the `adb devices` line this record was parsed from.
    pub fn to_listing_line(&self) -> String {
        format!("{}\t{}", self.serial, self.state)
    }
}

impl Display for DeviceRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_state() {
        assert_eq!(DeviceState::Device, "device".parse().unwrap());
        assert_eq!(DeviceState::Offline, "offline".parse().unwrap());
        assert_eq!(
            DeviceState::Other("unauthorized".into()),
            "unauthorized".parse().unwrap()
        );
        assert_eq!(
            Err(ParseDeviceStateError::Empty),
            "".parse::<DeviceState>()
        );
        assert!(matches!(
            "no permissions".parse::<DeviceState>(),
            Err(ParseDeviceStateError::Whitespace(_))
        ));
    }

    #[test]
    fn available_only_for_device_state() {
        let device = DeviceRecord {
            serial: "emulator-5554".into(),
            state: DeviceState::Device,
        };
        assert!(device.is_available());

        let offline = DeviceRecord {
            state: DeviceState::Offline,
            ..device.clone()
        };
        assert!(!offline.is_available());
        assert_eq!("emulator-5554\toffline", offline.to_listing_line());
    }
}
