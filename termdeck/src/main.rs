mod console;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use termdeck_engine::{EngineConfig, SessionManager};

use crate::console::Flow;

#[derive(Parser)]
#[command(name = "termdeck")]
#[command(about = "Saved remote-login connections with simulated sessions", long_about = None)]
struct Cli {
    /// Directory holding the connection catalog
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        Env::default().default_filter_or(cli.log_level.as_str()),
    )
    .format_timestamp_millis()
    .init();

    let mut config = EngineConfig::default();
    if let Some(data_dir) = cli.data_dir {
        config = config.with_data_dir(data_dir);
    }
    log::info!("using data dir {}", config.data_dir().display());

    let mut manager = SessionManager::from_config(&config);
    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();

    writeln!(stdout, "termdeck: type `help` for commands")?;
    loop {
        write!(stdout, "{}", console::prompt(&manager))?;
        stdout.flush()?;

        let mut line = String::new();
        let read = stdin
            .read_line(&mut line)
            .context("failed to read console input")?;
        if read == 0 {
            break;
        }

        let line = line.trim_end_matches(['\r', '\n']);
        match console::execute(&mut manager, line, &mut stdout) {
            Ok(Flow::Continue) => {},
            Ok(Flow::Quit) => break,
            Err(err) => writeln!(stdout, "error: {err:#}")?,
        }
    }

    Ok(())
}
