//! TrueHDR Tweaks settings editor: command-line entry point.
//!
//! Reads `truehdrtweaks.ini` from next to the game's data directory, applies
//! one command and writes the file back if anything changed.
//!
//! # Usage
//!
//! ```text
//! truehdr-editor [OPTIONS] <COMMAND>
//!
//! Commands:
//!   show                      Print every setting
//!   get <SETTING> [--raw]     Print one setting
//!   set <SETTING> <VALUE>     Change one setting
//!   enable <SETTING>          Switch an option on (writes its default)
//!   disable <SETTING>         Switch an option off (writes -1)
//!   toggle                    Flip HDRDisplayMode between SDR and SDR to HDR
//!
//! Options:
//!   --game-data <DIR>         Game data directory [env: TRUEHDR_GAME_DATA]
//!   --config <FILE>           Editor config file [env: TRUEHDR_EDITOR_CONFIG]
//!   --debounce-ms <MS>        Save debounce window
//!   --log-level <LEVEL>       Fallback log level when RUST_LOG is unset
//! ```
//!
//! Log output goes to stderr so `get` output can be piped.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use truehdr_core::SettingKey;

use truehdr_editor::application::commands::{self, CommandError};
use truehdr_editor::application::settings_store::SettingsStore;
use truehdr_editor::infrastructure::storage::config::{load_config, EditorConfig};
use truehdr_editor::infrastructure::storage::FsSettingsFile;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Editor for the TrueHDR Tweaks settings file.
#[derive(Debug, Parser)]
#[command(
    name = "truehdr-editor",
    about = "Edit truehdrtweaks.ini from the command line",
    version
)]
struct Cli {
    /// Game data directory.  The settings file lives in its parent.
    #[arg(long, env = "TRUEHDR_GAME_DATA")]
    game_data: Option<PathBuf>,

    /// Editor config file.  Defaults to the platform config directory.
    #[arg(long, env = "TRUEHDR_EDITOR_CONFIG")]
    config: Option<PathBuf>,

    /// Save debounce window in milliseconds.
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Log level used when `RUST_LOG` is not set.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every setting.
    Show,
    /// Print one setting.
    Get {
        setting: String,
        /// Print the stored text instead of the typed value.
        #[arg(long)]
        raw: bool,
    },
    /// Change one setting.
    Set {
        setting: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Switch an option on, writing its default value.
    Enable { setting: String },
    /// Switch an option off, writing -1.
    Disable { setting: String },
    /// Flip HDRDisplayMode between SDR and SDR to HDR.
    Toggle,
}

impl Cli {
    /// Command-line values take precedence over the config file.
    fn override_config(&self, config: &mut EditorConfig) {
        if let Some(dir) = &self.game_data {
            config.game_data_dir = Some(dir.clone());
        }
        if let Some(ms) = self.debounce_ms {
            config.debounce_ms = ms;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}

// ── Command execution ─────────────────────────────────────────────────────────

/// Runs `command` against a loaded store and returns the lines to print.
fn run(store: &SettingsStore, command: Command) -> Result<Vec<String>, CommandError> {
    let lines = match command {
        Command::Show => commands::snapshot(store)?
            .into_iter()
            .map(|(key, text)| match text {
                Ok(text) => format!("{:<20} {text}", key.ini_key()),
                Err(e) => format!("{:<20} error: {e}", key.ini_key()),
            })
            .collect(),
        Command::Get { setting, raw } => {
            let key = commands::resolve(&setting)?;
            let text = if raw {
                store.raw(key).unwrap_or_default()
            } else {
                commands::describe(store, key)?
            };
            vec![text]
        }
        Command::Set { setting, value } => {
            let key = commands::resolve(&setting)?;
            let changed = commands::apply(store, key, &value)?;
            vec![change_line(store, key, changed)?]
        }
        Command::Enable { setting } => {
            let key = commands::resolve(&setting)?;
            let changed = commands::set_enabled(store, key, true)?;
            vec![change_line(store, key, changed)?]
        }
        Command::Disable { setting } => {
            let key = commands::resolve(&setting)?;
            let changed = commands::set_enabled(store, key, false)?;
            vec![change_line(store, key, changed)?]
        }
        Command::Toggle => {
            let mode = commands::toggle_display_mode(store)?;
            vec![format!("HDRDisplayMode = {mode}")]
        }
    };
    Ok(lines)
}

fn change_line(
    store: &SettingsStore,
    key: SettingKey,
    changed: bool,
) -> Result<String, CommandError> {
    let text = commands::describe(store, key)?;
    Ok(if changed {
        format!("{key} = {text}")
    } else {
        format!("{key} = {text} (unchanged)")
    })
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// 1. CLI arguments are parsed and merged over the editor config file.
/// 2. `tracing_subscriber` is initialised; `RUST_LOG` wins over the config.
/// 3. The settings file is loaded, the command applied and any change
///    flushed before the process exits.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref()).context("failed to load editor config")?;
    cli.override_config(&mut config);

    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let game_data = config
        .game_data_dir
        .clone()
        .context("no game data directory: pass --game-data or set game_data_dir in the config")?;
    let file = Arc::new(FsSettingsFile::for_game(&game_data, &config.file_name));
    let store = SettingsStore::new(file, config.store_options())?;
    store
        .load()
        .with_context(|| format!("cannot open {}", store.path().display()))?;

    for line in run(&store, cli.command)? {
        println!("{line}");
    }

    if store.flush()? {
        info!("saved {}", store.path().display());
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
