//! `ferre config` command - inspect configuration

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration (file, environment and flags merged)
    Show,

    /// Print the config file location
    Path,
}

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let config = Config::load().with_api_url(global.api_url.as_deref());
            print!("{}", config.to_yaml());
        }
        ConfigCommands::Path => match Config::config_path() {
            Some(path) => {
                let note = if path.exists() { "" } else { " (not created)" };
                println!("{}{}", path.display(), style(note).dim());
            }
            None => {
                return Err(miette::miette!(
                    "no config directory could be determined; set FERRE_CONFIG"
                ))
            }
        },
    }
    Ok(())
}
