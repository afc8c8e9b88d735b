//! `trainrecon config`: inspect or create the settings file.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use trainrecon_config::Settings;

use crate::CliError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the settings file location
    Path,

    /// Print the effective settings as JSON, with resolved data paths
    Show,

    /// Write a settings file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn cmd_config(cmd: ConfigCommands, path: Option<&Path>, settings: &Settings) -> Result<(), CliError> {
    let path: PathBuf = path.map(Path::to_path_buf).unwrap_or_else(Settings::config_path);

    match cmd {
        ConfigCommands::Path => {
            println!("{}", path.display());
            if !path.exists() {
                eprintln!("(file does not exist; defaults apply)");
            }
            Ok(())
        }
        ConfigCommands::Show => {
            let mut value = serde_json::to_value(settings)
                .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
            if let Some(map) = value.as_object_mut() {
                map.insert(
                    "resolved.historyDatabase".into(),
                    settings.history_db_path().display().to_string().into(),
                );
                map.insert(
                    "resolved.trackerPath".into(),
                    settings.tracker_file_path().display().to_string().into(),
                );
            }
            let json_str = serde_json::to_string_pretty(&value)
                .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
            println!("{json_str}");
            Ok(())
        }
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::args(format!("{} already exists", path.display()))
                    .with_hint("pass --force to overwrite it"));
            }
            Settings::default()
                .save_to(&path)
                .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
            eprintln!("wrote {}", path.display());
            Ok(())
        }
    }
}
