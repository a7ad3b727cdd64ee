use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use quickset::applier::{LayoutPresetApplier, SelectOutcome};
use quickset::common::config::{Config, config_file};
use quickset::common::log;
use quickset::model::{DisplayConfig, Preset};
use quickset::sys::backend::Backend;
use quickset::sys::confirm::{AutoAccept, Confirm, CountdownPrompt};
use quickset::sys::xrandr::XrandrBackend;
use tracing::warn;

#[derive(Parser)]
#[command(name = "quickset")]
#[command(about = "Switch between monitor layout presets", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a layout preset to the connected outputs
    Apply {
        #[arg(value_enum)]
        preset: Preset,

        /// Print the computed layout instead of applying it.
        #[arg(long)]
        dry_run: bool,

        /// Keep the new layout without the confirmation countdown.
        #[arg(short, long)]
        yes: bool,

        /// Seconds before an unconfirmed layout is reverted.
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Show the current outputs and their modes
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    log::init_logging();

    let settings = if config_file().exists() {
        match Config::read(&config_file()) {
            Ok(settings) => settings,
            Err(err) => {
                eprintln!("quickset: {}: {err:#}", config_file().display());
                return ExitCode::FAILURE;
            }
        }
    } else {
        Config::default()
    };
    for issue in settings.validate() {
        warn!("{issue}");
    }

    match run(cli.command, settings) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("quickset: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, mut settings: Config) -> anyhow::Result<ExitCode> {
    let mut backend = XrandrBackend::new(&settings.backend);
    match command {
        Commands::List => {
            let config = backend.snapshot()?;
            print_outputs(&config);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Apply { preset, dry_run, yes, timeout } => {
            settings.confirm.auto_accept |= yes;
            if let Some(timeout) = timeout {
                settings.confirm.timeout_secs = timeout;
            }

            if dry_run {
                let mut config = backend.snapshot()?;
                if !preset.apply_to(&mut config) {
                    println!("{preset}: nothing to change");
                } else {
                    print_outputs(&config);
                }
                return Ok(ExitCode::SUCCESS);
            }

            let confirm: Box<dyn Confirm> = if settings.confirm.auto_accept {
                Box::new(AutoAccept)
            } else {
                Box::new(CountdownPrompt::new(Duration::from_secs(
                    settings.confirm.timeout_secs,
                )))
            };
            let mut applier = LayoutPresetApplier::from_backend(backend, confirm)?;
            match applier.select(preset)? {
                SelectOutcome::Accepted => println!("{preset} layout confirmed"),
                SelectOutcome::Reverted => println!("previous layout restored"),
                SelectOutcome::Invalid => println!("{preset} layout cannot be applied"),
                SelectOutcome::Unchanged => println!("{preset}: nothing to change"),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_outputs(config: &DisplayConfig) {
    for output in &config.outputs {
        if !output.connected {
            println!("{} disconnected", output.name);
            continue;
        }
        let state = if output.enabled {
            format!("enabled at {},{}", output.pos.x, output.pos.y)
        } else {
            "disabled".to_string()
        };
        let primary = if output.primary { " primary" } else { "" };
        println!("{} connected{primary}, {state}", output.name);
        for mode in &output.modes {
            let marker = if Some(&mode.id) == output.current_mode.as_ref() { "*" } else { " " };
            println!("  {marker} {} {:.2}Hz", mode.size, mode.refresh);
        }
    }
}
