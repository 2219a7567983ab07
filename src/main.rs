use std::env;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use tracing::info;
use tracing_subscriber::EnvFilter;

use veform::signaling::OutgoingMessage;
use veform::{ClientConfig, FormBuilder};

const USAGE: &str = "Usage: veform <check <form> | print <form> | config [--config <file>]>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = env::args();
    let _ = args.next();
    let Some(command) = args.next() else {
        anyhow::bail!("{USAGE}");
    };

    match command.as_str() {
        "check" => {
            let path = form_path(&mut args, "check")?;
            check(&path)
        }
        "print" => {
            let path = form_path(&mut args, "print")?;
            let builder = load_form(&path)?;
            let message = OutgoingMessage::Form(builder.snapshot());
            let json = serde_json::to_string_pretty(&message)
                .map_err(|e| anyhow!("Failed to serialize form: {}", e))?;
            println!("{json}");
            Ok(())
        }
        "config" => {
            let mut config_path: Option<PathBuf> = None;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "-c" | "--config" => {
                        let path = args
                            .next()
                            .ok_or_else(|| anyhow!("--config requires a file path"))?;
                        config_path = Some(PathBuf::from(path));
                    }
                    other => anyhow::bail!("Unknown option '{other}'. Use --config <file>"),
                }
            }

            let config = match &config_path {
                Some(path) => {
                    info!("Loading configuration from {}", path.display());
                    ClientConfig::from_file(path)
                }
                None => ClientConfig::from_env(),
            }
            .map_err(|e| anyhow!(e.to_string()))?;

            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| anyhow!("Failed to render configuration: {}", e))?;
            print!("{yaml}");
            Ok(())
        }
        other => anyhow::bail!("Unknown command '{other}'. {USAGE}"),
    }
}

fn form_path(args: &mut env::Args, command: &str) -> anyhow::Result<PathBuf> {
    let path = args
        .next()
        .ok_or_else(|| anyhow!("'{command}' requires a form file path"))?;
    if let Some(extra) = args.next() {
        anyhow::bail!("Unexpected argument '{extra}' after '{command} {path}'");
    }
    Ok(PathBuf::from(path))
}

fn load_form(path: &Path) -> anyhow::Result<FormBuilder> {
    FormBuilder::from_file(path).map_err(|e| anyhow!("{}: {}", path.display(), e))
}

fn check(path: &Path) -> anyhow::Result<()> {
    let builder = load_form(path)?;

    let dangling = builder.dangling_move_targets();
    for (field, target) in &dangling {
        eprintln!(
            "{}: field '{}' moves to unknown field '{}'",
            path.display(),
            field,
            target
        );
    }
    if !dangling.is_empty() {
        anyhow::bail!(
            "{}: {} dangling move target(s)",
            path.display(),
            dangling.len()
        );
    }

    println!("{}: {} fields OK", path.display(), builder.len());
    Ok(())
}
