//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, mut settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            set_value(&mut settings, key, value)?;
            settings.save()?;
            Output::success(&format!("Set {} = {}", key, value));
        }

        ConfigAction::Edit => {
            let config_path = Settings::default_config_path();

            // Create default config if it doesn't exist
            if !config_path.exists() {
                settings.save()?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("{} expects true or false, got {:?}", key, value))
}

/// Apply a dotted `section.field` assignment to the settings.
fn set_value(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        "general.log_level" => settings.general.log_level = value.to_string(),
        "youtube.api_key" => settings.youtube.api_key = Some(value.to_string()),
        "youtube.language" => settings.youtube.language = value.to_string(),
        "transcripts.enabled" => settings.transcripts.enabled = parse_bool(key, value)?,
        "transcripts.dir" => settings.transcripts.dir = value.to_string(),
        "transcripts.include_in_csv" => {
            settings.transcripts.include_in_csv = parse_bool(key, value)?
        }
        "summaries.enabled" => settings.summaries.enabled = parse_bool(key, value)?,
        "summaries.dir" => settings.summaries.dir = value.to_string(),
        "summaries.model" => settings.summaries.model = value.to_string(),
        "summaries.language" => settings.summaries.language = Some(value.to_string()),
        "summaries.include_in_csv" => {
            settings.summaries.include_in_csv = parse_bool(key, value)?
        }
        "snippet.enabled" => settings.snippet.enabled = parse_bool(key, value)?,
        "snippet.start_marker" => settings.snippet.start_marker = value.to_string(),
        "snippet.end_marker" => settings.snippet.end_marker = value.to_string(),
        "export.output_dir" => settings.export.output_dir = value.to_string(),
        "export.sort_ascending" => settings.export.sort_ascending = parse_bool(key, value)?,
        _ => {
            return Err(anyhow::anyhow!(
                "Unknown config key: {} (use `config show` to list keys)",
                key
            ))
        }
    }
    Ok(())
}
