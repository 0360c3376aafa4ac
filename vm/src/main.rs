use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};

/// Runs a flat orange ISA executable image.
#[derive(Parser, Debug)]
#[command(name = "orangevm")]
struct Args {
    /// Executable image to run.
    image: PathBuf,

    /// Size in bytes of the stack block mounted at the top of the address
    /// space.
    #[arg(long, default_value_t = vm::STACK_SIZE)]
    stack_size: u64,
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

fn run(args: &Args) -> vm::Result<()> {
    debug!(image = %args.image.display(), stack_size = args.stack_size, "loading image");
    let file = File::open(&args.image)?;
    let image = objfile::Image::read(file)?;
    vm::run(&image, args.stack_size)
}
