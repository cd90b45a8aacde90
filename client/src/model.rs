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

pub use command_descriptor::{
    CommandDescriptor, CommandResult, FuncCategory, OutputFormatter, ResultSnapshot,
};
pub use device_record::{DeviceRecord, DeviceState, ParseDeviceStateError};
pub use file_version::FileVersion;
pub use preferences::Preferences;

mod command_descriptor;
mod device_record;
mod file_version;
mod preferences;
