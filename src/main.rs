use clap::Parser;
use downlevel::{TranspileError, Transpiler, TranspilerConfig};
use std::fs;
use std::path::PathBuf;

/// Rewrites an XSLT 2.0-style stylesheet for a 1.0 processor.
#[derive(Parser, Debug)]
#[command(name = "downlevel", version, about)]
struct Cli {
    /// Stylesheet to transpile.
    input: PathBuf,

    /// Write the result here instead of standard output.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Accept documents whose doctype declares entities.
    #[arg(long)]
    allow_entities: bool,
}

fn main() -> Result<(), TranspileError> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => TranspilerConfig::from_file(path)?,
        None => TranspilerConfig::default(),
    };
    if cli.allow_entities {
        config.disable_entities = false;
    }

    let transpiler = Transpiler::builder().with_config(config).build();
    let output = transpiler.transpile_file(&cli.input)?;

    match &cli.output {
        Some(path) => {
            fs::write(path, output)?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{}", output),
    }
    Ok(())
}
