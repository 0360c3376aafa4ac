use std::fs::{self, File};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};

/// Links one or more orange ISA object files into a flat executable image.
#[derive(Parser, Debug)]
#[command(name = "orangelink")]
struct Args {
    /// Object files to link, in the order their sections should appear.
    inputs: Vec<PathBuf>,

    /// Where to write the linked executable image.
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> link::Result<()> {
    let mut objects = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        debug!(input = %path.display(), "reading object");
        let file = File::open(path)?;
        let object = objfile::text::read(file)?;
        objects.push(object);
    }

    let image = link::link(&objects)?;
    fs::write(&args.output, image)?;
    Ok(())
}
