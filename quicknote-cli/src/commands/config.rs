//! Config inspection (`quicknote config path|show`)

use anyhow::Result;
use clap::Subcommand;
use quicknote_core::QuicknoteConfig;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the config file location
    Path,
    /// Print the effective config (file + environment), secrets redacted
    Show,
}

pub fn run_config(config: &QuicknoteConfig, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            let path = QuicknoteConfig::config_path();
            let note = if path.exists() { "" } else { " (not created yet)" };
            println!("{}{}", path.display(), note);
        }
        ConfigCommands::Show => {
            print!("{}", toml::to_string_pretty(&redacted(config))?);
        }
    }
    Ok(())
}

fn redacted(config: &QuicknoteConfig) -> QuicknoteConfig {
    let mut config = config.clone();
    let mask = |v: &mut Option<String>| {
        if v.is_some() {
            *v = Some("<redacted>".to_string());
        }
    };
    mask(&mut config.supabase.service_key);
    mask(&mut config.supabase.jwt_secret);
    config
}
