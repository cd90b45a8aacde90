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
use crate::model::{CommandDescriptor, CommandResult, DeviceRecord, DeviceState, ResultSnapshot};
use crate::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Latest command results for one device.
///
/// Results are published as immutable snapshots; every completion swaps in a new map,
/// so the last completion for a descriptor wins.
pub struct DeviceSession {
    device: DeviceRecord,
    repo: Arc<dyn AdbRepository>,
    results_tx: watch::Sender<Arc<ResultSnapshot>>,
    shutdown_tx: watch::Sender<bool>,
}

impl DeviceSession {
    fn new(device: DeviceRecord, repo: Arc<dyn AdbRepository>) -> Self {
        let (results_tx, _) = watch::channel(Arc::new(ResultSnapshot::new()));
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            device,
            repo,
            results_tx,
            shutdown_tx,
        }
    }

    pub fn device(&self) -> &DeviceRecord {
        &self.device
    }

    pub fn results(&self) -> Arc<ResultSnapshot> {
        self.results_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ResultSnapshot>> {
        self.results_tx.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Runs `descriptor` in the background. No timeout and no retry.
    pub fn handle(self: &Arc<Self>, descriptor: &'static CommandDescriptor) -> JoinHandle<()> {
        let session = self.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            if *shutdown_rx.borrow_and_update() {
                debug!(serial = %session.device, "session already closed");
                return;
            }

            tokio::select! {
                _ = shutdown_rx.changed() => {
                    debug!(serial = %session.device, label = descriptor.label, "cancelled");
                }
                _ = session.execute(descriptor) => {}
            }
        })
    }

    #[instrument(skip_all, fields(serial = %self.device, label = descriptor.label))]
    async fn execute(&self, descriptor: &'static CommandDescriptor) {
        let text = match self.repo.shell(&self.device.serial, descriptor.command).await {
            Ok(raw) => descriptor.formatter.format(&raw),
            Err(e) => {
                warn!(?e, "failed to run command");
                String::new()
            }
        };

        debug!(%text, "publish result");

        self.results_tx.send_modify(|snapshot| {
            let mut next = ResultSnapshot::clone(snapshot);
            next.insert(descriptor, CommandResult { descriptor, text });
            *snapshot = Arc::new(next);
        });
    }

    /// Stops in-flight commands. The last snapshot stays readable.
    fn close(&self) {
        self.shutdown_tx.send_replace(true);
    }
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("device {serial} is not available: {state}")]
    Unavailable { serial: String, state: DeviceState },
}

/// Sessions keyed by serial. Sessions exist only between `open` and `close`.
pub struct DeviceRegistry {
    repo: Arc<dyn AdbRepository>,
    sessions: HashMap<String, Arc<DeviceSession>>,
}

impl DeviceRegistry {
    pub fn new(repo: Arc<dyn AdbRepository>) -> Self {
        Self {
            repo,
            sessions: HashMap::new(),
        }
    }

    pub fn open(&mut self, device: &DeviceRecord) -> Result<Arc<DeviceSession>, RegistryError> {
        if !device.is_available() {
            return Err(RegistryError::Unavailable {
                serial: device.serial.clone(),
                state: device.state.clone(),
            });
        }

        let session = self
            .sessions
            .entry(device.serial.clone())
            .or_insert_with(|| {
                info!(serial = %device, "open session");
                Arc::new(DeviceSession::new(device.clone(), self.repo.clone()))
            });

        Ok(session.clone())
    }

    pub fn get(&self, serial: &str) -> Option<Arc<DeviceSession>> {
        self.sessions.get(serial).cloned()
    }

    pub fn close(&mut self, serial: &str) -> bool {
        match self.sessions.remove(serial) {
            Some(session) => {
                info!(%serial, "close session");
                session.close();
                true
            }
            None => false,
        }
    }

    /// Called whenever the device list is shown again.
    pub fn close_all(&mut self) {
        for (serial, session) in self.sessions.drain() {
            debug!(%serial, "close session");
            session.close();
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Drop for DeviceRegistry {
    fn drop(&mut self) {
        self.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::adb_repository::MockAdbRepository;
    use crate::model::{FuncCategory, OutputFormatter};
    use std::time::Duration;

    static ID: CommandDescriptor = CommandDescriptor {
        command: "shell id",
        label: "Id",
        category: FuncCategory::WindowManager,
        formatter: OutputFormatter::Raw,
    };

    fn device(serial: &str, state: DeviceState) -> DeviceRecord {
        DeviceRecord {
            serial: serial.into(),
            state,
        }
    }

    fn screen_size() -> &'static CommandDescriptor {
        CommandDescriptor::find("Screen size").unwrap()
    }

    struct PendingAdbRepository;

    #[async_trait::async_trait]
    impl AdbRepository for PendingAdbRepository {
        async fn devices(&self) -> Fallible<String> {
            std::future::pending().await
        }

        async fn shell(&self, _: &str, _: &str) -> Fallible<String> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn results_are_formatted_and_merged() {
        let repo = Arc::new(
            MockAdbRepository::new()
                .with_shell(
                    "shell wm size",
                    "Physical size: 1080x2400\nOverride size: 1080x2160\n",
                )
                .with_shell("shell id", "uid=2000(shell)\n"),
        );
        let mut registry = DeviceRegistry::new(repo.clone());
        let session = registry.open(&device("serial", DeviceState::Device)).unwrap();

        let before = session.results();
        let handles = vec![session.handle(screen_size()), session.handle(&ID)];
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(before.is_empty());

        let results = session.results();
        assert_eq!(2, results.len());
        assert_eq!("1080x2160[1080x2400]", results[screen_size()].text);
        assert_eq!("uid=2000(shell)\n", results[&ID].text);

        let mut invocations = repo.invocations().await;
        invocations.sort();
        assert_eq!(
            vec![
                ("serial".to_string(), "shell id".to_string()),
                ("serial".to_string(), "shell wm size".to_string()),
            ],
            invocations
        );
    }

    #[tokio::test]
    async fn rerun_overwrites() {
        let repo = Arc::new(
            MockAdbRepository::new()
                .with_shell("shell id", "first")
                .with_shell("shell id", "second"),
        );
        let mut registry = DeviceRegistry::new(repo);
        let session = registry.open(&device("serial", DeviceState::Device)).unwrap();
        let mut rx = session.subscribe();

        session.handle(&ID).await.unwrap();
        let first = session.results();
        assert_eq!("first", first[&ID].text);

        session.handle(&ID).await.unwrap();

        rx.changed().await.unwrap();
        assert_eq!(1, rx.borrow().len());
        assert_eq!("second", rx.borrow()[&ID].text);
        assert_eq!("second", session.results()[&ID].text);

        // earlier snapshots are replaced, not mutated.
        assert_eq!("first", first[&ID].text);
    }

    #[tokio::test]
    async fn spawn_failure_gives_blank_result() {
        let repo = Arc::new(MockAdbRepository::new().with_shell_failure());
        let mut registry = DeviceRegistry::new(repo);
        let session = registry.open(&device("serial", DeviceState::Device)).unwrap();

        session.handle(screen_size()).await.unwrap();

        assert_eq!("", session.results()[screen_size()].text);
    }

    #[tokio::test]
    async fn close_cancels_in_flight() {
        let mut registry = DeviceRegistry::new(Arc::new(PendingAdbRepository));
        let session = registry.open(&device("serial", DeviceState::Device)).unwrap();

        let handle = session.handle(&ID);
        tokio::task::yield_now().await;
        assert!(registry.close("serial"));

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(session.is_closed());
        assert!(session.results().is_empty());

        // handles after close return immediately.
        session.handle(&ID).await.unwrap();
    }

    #[tokio::test]
    async fn registry_lifecycle() {
        let mut registry = DeviceRegistry::new(Arc::new(MockAdbRepository::new()));
        assert!(registry.is_empty());

        let a = registry.open(&device("a", DeviceState::Device)).unwrap();
        let a_again = registry.open(&device("a", DeviceState::Device)).unwrap();
        assert!(Arc::ptr_eq(&a, &a_again));
        assert_eq!("a", a.device().serial);
        registry.open(&device("b", DeviceState::Device)).unwrap();
        assert_eq!(2, registry.len());
        assert!(registry.get("b").is_some());
        assert!(registry.get("c").is_none());

        assert_eq!(
            Err(RegistryError::Unavailable {
                serial: "c".into(),
                state: DeviceState::Offline,
            }),
            registry.open(&device("c", DeviceState::Offline)).map(|_| ())
        );

        assert!(registry.close("a"));
        assert!(!registry.close("a"));
        assert!(a.is_closed());

        registry.close_all();
        assert!(registry.is_empty());
    }
}
