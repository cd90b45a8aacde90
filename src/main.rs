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

use adb_helper::data::adb_repository::{find_adb_path, AdbRepositoryImpl};
use adb_helper::data::env::Env;
use adb_helper::data::preferences_repository::{
    load_or_default, project_dirs, PreferencesRepositoryImpl, PREFERENCES_FILE_NAME,
};
use adb_helper::feature::bootstrap::{bootstrap, ArchiveSource, BootstrapOutcome};
use adb_helper::feature::device_list::refresh_devices;
use adb_helper::feature::device_session::DeviceRegistry;
use adb_helper::feature::migrate::{migrate, migrate_file};
use adb_helper::model::{CommandDescriptor, FuncCategory, Preferences};
use adb_helper::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use structopt::StructOpt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, StructOpt)]
#[structopt(name = "adb-helper", about = "Runs canned adb commands against connected devices")]
struct Opt {
    /// Directory that holds the extracted platform-tools (default: ~/.adb_helper)
    #[structopt(long, parse(from_os_str))]
    data_dir: Option<PathBuf>,

    /// Path to preferences.toml
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, StructOpt)]
enum Cmd {
    /// Extracts the bundled platform-tools
    Bootstrap {
        /// Archive to extract instead of the embedded one
        #[structopt(long, parse(from_os_str))]
        archive: Option<PathBuf>,
    },

    /// Lists connected devices
    Devices,

    /// Lists the available commands
    Commands,

    /// Runs commands on a device and prints their formatted output
    Run {
        /// Device serial
        #[structopt(short, long)]
        serial: String,

        /// Command labels to run (all commands if omitted)
        labels: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Fallible<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opt = Opt::from_args();

    info!(?opt, "Hello");

    let config_file_path = match &opt.config {
        Some(data) => {
            migrate_file(data)?;
            data.clone()
        }
        None => {
            migrate()?;
            project_dirs()?.config_dir().join(PREFERENCES_FILE_NAME)
        }
    };

    let prefs = load_or_default(&PreferencesRepositoryImpl::new(config_file_path)).await;

    let env = match opt.data_dir {
        Some(data) => Env::with_data_dir(data)?,
        None => Env::pick()?,
    };

    match opt.cmd {
        Cmd::Bootstrap { archive } => run_bootstrap(env, &prefs, archive).await?,
        Cmd::Devices => run_devices(&env, &prefs).await?,
        Cmd::Commands => run_commands(),
        Cmd::Run { serial, labels } => run_descriptors(&env, &prefs, &serial, &labels).await?,
    }

    info!("Bye");
    Ok(())
}

async fn run_bootstrap(env: Env, prefs: &Preferences, archive: Option<PathBuf>) -> Fallible<()> {
    let source = match archive.or_else(|| prefs.platform_tools_archive.clone()) {
        Some(data) => ArchiveSource::File(data),
        None => ArchiveSource::Embedded,
    };

    let outcome = tokio::task::spawn_blocking(move || {
        bootstrap(&env, &source, |note| println!("{}", note)).map(|data| (data, env))
    })
    .await??;

    match outcome {
        (BootstrapOutcome::AlreadyPresent, env) => println!(
            "platform-tools already present in {}",
            env.platform_tools_dir().display()
        ),
        (BootstrapOutcome::Extracted { entries }, env) => println!(
            "extracted {} entries into {}",
            entries,
            env.data_dir().display()
        ),
    }

    Ok(())
}

async fn run_devices(env: &Env, prefs: &Preferences) -> Fallible<()> {
    let repo = AdbRepositoryImpl::new(find_adb_path(prefs, Some(env)));
    let devices = refresh_devices(&repo, &prefs.recognized_states).await?;

    if devices.is_empty() {
        println!("no devices");
        return Ok(());
    }

    for device in devices {
        if device.is_available() {
            println!("{}", device.to_listing_line());
        } else {
            println!("{}\t(unavailable)", device.to_listing_line());
        }
    }

    Ok(())
}

fn run_commands() {
    for category in FuncCategory::ALL {
        println!("{}", category);
        for descriptor in category.descriptors() {
            println!("  {}", descriptor);
        }
    }
}

async fn run_descriptors(
    env: &Env,
    prefs: &Preferences,
    serial: &str,
    labels: &[String],
) -> Fallible<()> {
    let descriptors = if labels.is_empty() {
        CommandDescriptor::catalog().iter().collect::<Vec<_>>()
    } else {
        labels
            .iter()
            .map(|label| {
                CommandDescriptor::find(label).with_context(|| format!("unknown command: {}", label))
            })
            .collect::<Fallible<Vec<_>>>()?
    };

    let repo = Arc::new(AdbRepositoryImpl::new(find_adb_path(prefs, Some(env))));
    let devices = refresh_devices(repo.as_ref(), &prefs.recognized_states).await?;
    let device = devices
        .iter()
        .find(|data| data.serial == serial)
        .with_context(|| format!("device not found: {}", serial))?;

    let mut registry = DeviceRegistry::new(repo);
    let session = registry.open(device)?;
    info!(serial = %session.device(), "session opened");

    let handles = descriptors
        .iter()
        .map(|&descriptor| session.handle(descriptor))
        .collect::<Vec<_>>();
    for handle in handles {
        if let Err(e) = handle.await {
            warn!(?e, "command task failed");
        }
    }

    let results = session.results();
    for descriptor in descriptors {
        match results.get(descriptor) {
            Some(data) => println!("{}: {}", descriptor.label, data.text.trim_end()),
            None => println!("{}:", descriptor.label),
        }
    }

    registry.close_all();
    Ok(())
}
