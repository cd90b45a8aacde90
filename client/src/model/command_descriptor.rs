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

use crate::feature::formatter::format_screen_size;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FuncCategory {
    WindowManager,
}

impl FuncCategory {
    pub const ALL: [Self; 1] = [Self::WindowManager];

    pub fn desc(&self) -> &'static str {
        match self {
            FuncCategory::WindowManager => "Window Manager",
        }
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &'static CommandDescriptor> + '_ {
        CommandDescriptor::catalog()
            .iter()
            .filter(move |data| &data.category == self)
    }
}

impl Display for FuncCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.desc())
    }
}

/// Turns the raw stdout of a command into the text shown to the user.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OutputFormatter {
    Raw,
    ScreenSize,
}

impl OutputFormatter {
    pub fn format(&self, raw: &str) -> String {
        match self {
            OutputFormatter::Raw => raw.into(),
            OutputFormatter::ScreenSize => format_screen_size(raw),
        }
    }
}

#[derive(Debug, Eq, Hash, PartialEq)]
pub struct CommandDescriptor {
    pub command: &'static str,
    pub label: &'static str,
    pub category: FuncCategory,
    pub formatter: OutputFormatter,
}

static CATALOG: [CommandDescriptor; 1] = [CommandDescriptor {
    command: "shell wm size",
    label: "Screen size",
    category: FuncCategory::WindowManager,
    formatter: OutputFormatter::ScreenSize,
}];

impl CommandDescriptor {
    pub fn catalog() -> &'static [CommandDescriptor] {
        &CATALOG
    }

    /// Case-insensitive lookup by label.
    pub fn find(label: &str) -> Option<&'static CommandDescriptor> {
        CATALOG
            .iter()
            .find(|data| data.label.eq_ignore_ascii_case(label.trim()))
    }

    pub fn args(&self) -> impl Iterator<Item = &'static str> {
        self.command.split_whitespace()
    }
}

impl Display for CommandDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.label, self.command)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandResult {
    pub descriptor: &'static CommandDescriptor,
    pub text: String,
}

pub type ResultSnapshot = HashMap<&'static CommandDescriptor, CommandResult>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_screen_size() {
        let descriptor = CommandDescriptor::find("screen size").unwrap();
        assert_eq!("shell wm size", descriptor.command);
        assert_eq!(FuncCategory::WindowManager, descriptor.category);
        assert_eq!(
            vec!["shell", "wm", "size"],
            descriptor.args().collect::<Vec<_>>()
        );
        assert!(CommandDescriptor::find("reboot").is_none());
    }

    #[test]
    fn every_descriptor_belongs_to_a_category() {
        let listed = FuncCategory::ALL
            .iter()
            .flat_map(|data| data.descriptors())
            .count();
        assert_eq!(CommandDescriptor::catalog().len(), listed);
    }

    #[test]
    fn display_shows_label_and_command() {
        let descriptor = CommandDescriptor::find("Screen size").unwrap();
        assert_eq!("Screen size (shell wm size)", descriptor.to_string());
    }

    #[test]
    fn raw_formatter_is_identity() {
        assert_eq!("a\nb", OutputFormatter::Raw.format("a\nb"));
    }
}
