//! `pipegraph config`: read and edit `config.toml`

use clap::{Args, Subcommand, ValueEnum};
use serde_json::{Map, Value};

use crate::config::{config_file_path, Config, ConfigKey};
use crate::output::OutputFormat;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print one value
    Get { key: ConfigKey },
    /// Change one value and save
    Set { key: ConfigKey, value: String },
    /// Put one value back to its default and save
    Unset { key: ConfigKey },
    /// Print every value
    List,
    /// Print where the config file lives
    Path,
    /// Write a config file with the defaults
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: &ConfigArgs, format: OutputFormat) -> anyhow::Result<()> {
    let path = config_file_path();
    let mut config = Config::load();

    match &args.command {
        ConfigCommands::Get { key } => println!("{}", config.get(*key)),
        ConfigCommands::Set { key, value } => {
            config.set(*key, value)?;
            config.save()?;
            tracing::info!("Config {} set to {}", key.name(), value);
            println!("{} = {}", key.name(), config.get(*key));
        }
        ConfigCommands::Unset { key } => {
            config.reset(*key);
            config.save()?;
            println!("{} = {} (default)", key.name(), config.get(*key));
        }
        ConfigCommands::List => {
            let entries = ConfigKey::value_variants()
                .iter()
                .map(|key| (key.name(), config.get(*key)));
            match format {
                OutputFormat::Json => {
                    let map: Map<String, Value> = entries
                        .map(|(name, value)| (name.to_string(), Value::String(value)))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&map)?);
                }
                OutputFormat::Table => {
                    println!("# {}", path.display());
                    for (name, value) in entries {
                        println!("{} = {}", name, value);
                    }
                }
            }
        }
        ConfigCommands::Path => println!("{}", path.display()),
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!("{} exists; pass --force to replace it", path.display());
            }
            Config::default().save()?;
            println!("Wrote defaults to {}", path.display());
        }
    }

    Ok(())
}
