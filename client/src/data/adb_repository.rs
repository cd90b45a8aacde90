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

use crate::data::env::Env;
use crate::model::Preferences;
use crate::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::sync::Mutex;

#[async_trait::async_trait]
pub trait AdbRepository: Send + Sync {
    /// Raw stdout of `adb devices`.
    async fn devices(&self) -> Fallible<String>;

    /// Raw stdout of `adb -s <serial> <command>`.
    async fn shell(&self, serial: &str, command: &str) -> Fallible<String>;
}

pub struct AdbRepositoryImpl {
    adb_path: PathBuf,
}

impl AdbRepositoryImpl {
    pub fn new(adb_path: PathBuf) -> Self {
        Self { adb_path }
    }

    pub fn adb_path(&self) -> &Path {
        &self.adb_path
    }

    #[cfg(target_os = "windows")]
    fn adb_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.adb_path);
        // CREATE_NO_WINDOW
        cmd.creation_flags(0x08000000);
        cmd
    }

    #[cfg(not(target_os = "windows"))]
    fn adb_command(&self) -> tokio::process::Command {
        tokio::process::Command::new(&self.adb_path)
    }

    async fn run<'a>(&self, args: impl IntoIterator<Item = &'a str>) -> Fallible<String> {
        let args = args.into_iter().collect::<Vec<_>>();
        debug!(adb = %self.adb_path.display(), ?args, "invoke");

        let output = self
            .adb_command()
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("failed to invoke {}", self.adb_path.display()))?;

        if !output.status.success() {
            warn!(
                status = ?output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                ?args,
                "adb exited with failure"
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait::async_trait]
impl AdbRepository for AdbRepositoryImpl {
    async fn devices(&self) -> Fallible<String> {
        self.run(["devices"]).await
    }

    async fn shell(&self, serial: &str, command: &str) -> Fallible<String> {
        self.run(["-s", serial].into_iter().chain(command.split_whitespace()))
            .await
    }
}

/// Returns canned output and records every shell invocation.
///
/// Outputs registered for the same command are handed out in order; the last one
/// repeats once the queue runs dry.
#[derive(Default)]
pub struct MockAdbRepository {
    devices: String,
    shell_outputs: Mutex<HashMap<String, VecDeque<String>>>,
    fail_shell: bool,
    invocations: Mutex<Vec<(String, String)>>,
}

impl MockAdbRepository {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_devices(mut self, raw: &str) -> Self {
        self.devices = raw.into();
        self
    }

    pub fn with_shell(mut self, command: &str, raw: &str) -> Self {
        self.shell_outputs
            .get_mut()
            .entry(command.into())
            .or_default()
            .push_back(raw.into());
        self
    }

    pub fn with_shell_failure(mut self) -> Self {
        self.fail_shell = true;
        self
    }

    pub async fn invocations(&self) -> Vec<(String, String)> {
        self.invocations.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl AdbRepository for MockAdbRepository {
    async fn devices(&self) -> Fallible<String> {
        Ok(self.devices.clone())
    }

    async fn shell(&self, serial: &str, command: &str) -> Fallible<String> {
        self.invocations
            .lock()
            .await
            .push((serial.into(), command.into()));

        if self.fail_shell {
            anyhow::bail!("mock spawn failure");
        }

        let mut shell_outputs = self.shell_outputs.lock().await;
        let output = match shell_outputs.get_mut(command) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        Ok(output.unwrap_or_default())
    }
}

/// Picks the adb executable: preferences, then the bootstrapped copy, then the SDK,
/// then whatever `adb` resolves to on `PATH`.
pub fn find_adb_path(prefs: &Preferences, env: Option<&Env>) -> PathBuf {
    if let Some(data) = &prefs.adb_path {
        if !data.as_os_str().is_empty() {
            info!(adb = %data.display(), "use adb from preferences");
            return data.clone();
        }
    }

    if let Some(env) = env {
        if env.adb().is_file() {
            info!(adb = %env.adb().display(), "use bundled adb");
            return env.adb();
        }
    }

    if let Ok(data) = std::env::var("ANDROID_HOME").or_else(|_| std::env::var("ANDROID_SDK_ROOT"))
    {
        let path = Path::new(&data)
            .join("platform-tools")
            .join(Env::adb_file_name());
        if path.is_file() {
            debug!(adb = %path.display(), "use adb from env");
            return path;
        }
    }

    "adb".into()
}
