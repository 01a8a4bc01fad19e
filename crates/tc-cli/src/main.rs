//! Text-to-CAD command-line entry point

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tc_cad::ExportFormat;
use tc_core::{CadConfiguration, CadContext, Entity, Settings};

#[derive(Parser, Debug)]
#[command(name = "tc", version, about = "Turn labeled entities into CAD models")]
struct Cli {
    /// RON settings file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    /// Directory exported models are written to
    #[arg(long = "export-dir", global = true)]
    export_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize a configuration from an entity JSON array
    Parse {
        entities: PathBuf,
        /// Write the configuration here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Compose and export a configuration JSON file
    Build {
        config: PathBuf,
        #[arg(long)]
        format: Option<ExportFormat>,
    },
    /// Run the whole pipeline on an entity JSON array
    Generate {
        entities: PathBuf,
        #[arg(long)]
        format: Option<ExportFormat>,
    },
    /// List registered shape and operation types
    Handlers,
}

fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tc_cli=info,tc_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let ctx = CadContext::new(load_settings(&cli)?);

    match cli.command {
        Commands::Parse { entities, out } => {
            let synthesis = ctx.configure(&read_entities(&entities)?);
            for warning in &synthesis.warnings {
                eprintln!("warning: {}", warning);
            }
            let json = synthesis
                .configuration
                .to_json_pretty()
                .context("Failed to serialize configuration")?;
            match out {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", json),
            }
        }
        Commands::Build { config, format } => {
            let text = std::fs::read_to_string(&config)
                .with_context(|| format!("Failed to read {}", config.display()))?;
            let config = CadConfiguration::from_json(&text)
                .with_context(|| format!("Invalid configuration in {}", config.display()))?;
            let path = ctx.build(&config, format)?;
            println!("{}", path.display());
        }
        Commands::Generate { entities, format } => {
            let response = ctx.generate(&read_entities(&entities)?, format);
            println!(
                "{}",
                serde_json::to_string_pretty(&response).context("Failed to serialize response")?
            );
            if !response.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Handlers => {
            println!("Shapes:");
            for key in ctx.shape_handlers().supported_types() {
                println!("  {}", key);
            }
            println!("Operations:");
            for kind in ctx.operation_handlers().supported_types() {
                println!("  {}", kind);
            }
            println!("Export formats:");
            for format in ExportFormat::ALL {
                println!("  {}", format);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let settings = match &cli.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let mut settings = settings.with_env_overrides();
    if let Some(dir) = &cli.export_dir {
        settings.export_dir = dir.clone();
    }
    tracing::debug!(?settings, "Using settings");
    Ok(settings)
}

fn read_entities(path: &Path) -> Result<Vec<Entity>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not an entity JSON array", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_format_flag() {
        let cli = Cli::try_parse_from(["tc", "build", "model.json", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Build {
                format: Some(ExportFormat::Json),
                ..
            }
        ));

        let cli = Cli::try_parse_from(["tc", "--export-dir", "out", "handlers"]).unwrap();
        assert_eq!(cli.export_dir, Some(PathBuf::from("out")));
        assert!(Cli::try_parse_from(["tc", "build", "m.json", "--format", "dwg"]).is_err());
    }

    #[test]
    fn test_read_entities() {
        let dir = std::env::temp_dir().join(format!("tc-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("entities.json");
        std::fs::write(
            &path,
            r#"[{"start": 0, "end": 4, "label": "SHAPE_TYPE", "text": "cube"}]"#,
        )
        .unwrap();

        let entities = read_entities(&path).unwrap();
        assert_eq!(entities, vec![Entity::new(0, 4, "SHAPE_TYPE", "cube")]);
        assert!(read_entities(&dir.join("missing.json")).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
