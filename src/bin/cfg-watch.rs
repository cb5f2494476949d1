//! cfg-watch - Loads a configuration file on top of defaults and prints every change.

use std::{error::Error, path::PathBuf, time::Duration};

use cfg_manager::{LiveConfig, Manager, TomlLoader, tracing_config};
use clap::Parser;
use futures::StreamExt;
use toml::{Table, Value};
use tracing::info;

#[derive(Parser)]
#[command(name = "cfg-watch")]
#[command(about = "Load a TOML config file over defaults and print it whenever it changes")]
struct Cli {
    /// Configuration file to load and watch
    path: PathBuf,

    /// Default value as KEY=VALUE; VALUE is parsed as TOML, falling back to a string
    #[arg(short, long = "default", value_parser = parse_default)]
    defaults: Vec<(String, Value)>,

    /// Delimiter separating nested keys in defaults
    #[arg(long, default_value = ".")]
    key_delim: String,

    /// Fail instead of creating a missing file
    #[arg(long)]
    no_create: bool,

    /// Print the configuration once and exit
    #[arg(long)]
    no_watch: bool,

    /// Do not recreate the file when it is removed
    #[arg(long)]
    no_recover: bool,

    /// Debounce window for file events, in milliseconds
    #[arg(long, default_value_t = 100)]
    debounce_ms: u64,

    /// Directory for rolling log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Print configurations as JSON instead of TOML
    #[arg(long)]
    json: bool,
}

fn parse_default(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;

    let value = format!("value = {value}")
        .parse::<Table>()
        .ok()
        .and_then(|mut table| table.remove("value"))
        .unwrap_or_else(|| Value::String(value.to_string()));

    Ok((key.to_string(), value))
}

fn render(config: &Table, json: bool) -> Result<String, Box<dyn Error>> {
    if json {
        Ok(serde_json::to_string_pretty(config)?)
    } else {
        Ok(toml::to_string_pretty(config)?)
    }
}

async fn watch_until_interrupted(
    config: &LiveConfig<Table>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let mut changes = Box::pin(config.changes());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            change = changes.next() => {
                let Some(change) = change else {
                    break;
                };
                println!("# {:?} after {}", change.kind, change.trigger);
                println!("{}", render(&config.get(), json)?);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let _guard = match &cli.log_dir {
        Some(dir) => Some(tracing_config::init_with_file(dir)?),
        None => {
            tracing_config::init()?;
            None
        }
    };

    let manager = Manager::builder(TomlLoader, &cli.path)
        .key_delim(cli.key_delim.as_str())
        .with_defaults(cli.defaults.iter().map(|(k, v)| (k, v.clone())))
        .create_if_not_exists(!cli.no_create)
        .watch_config_file(!cli.no_watch)
        .recover_if_removed(!cli.no_recover)
        .debounce(Duration::from_millis(cli.debounce_ms))
        .build();

    let config = manager.read_config(Table::new()).await?;
    println!("{}", render(&config.get(), cli.json)?);

    if config.is_watching() {
        watch_until_interrupted(&config, cli.json).await?;
        config.stop().await;
    }

    Ok(())
}
