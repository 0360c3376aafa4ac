use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};

/// Assembles orange ISA source into an object file or a flat executable
/// image.
#[derive(Parser, Debug)]
#[command(name = "orangeasm")]
struct Args {
    /// Source file to assemble.
    input: PathBuf,

    /// Where to write the assembled output.
    #[arg(short, long)]
    output: PathBuf,

    /// Emit a flat executable image instead of a relocatable object file.
    #[arg(long)]
    executable: bool,

    /// Also write a `<output>.map` file mapping each assembled address
    /// back to its source line, for tools that want to annotate
    /// disassembly or runtime errors.
    #[arg(long)]
    source_map: bool,
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

fn run(args: &Args) -> asm::Result<()> {
    let source = fs::read_to_string(&args.input)?;
    debug!(input = %args.input.display(), executable = args.executable, "assembling");

    let source_map = if args.executable {
        let (image, source_map) = asm::assemble_to_executable_with_source_map(&source)?;
        fs::write(&args.output, image)?;
        source_map
    } else {
        let (object, source_map) = asm::assemble_to_object_with_source_map(&source)?;
        let bytes = objfile::text::to_bytes(&object)?;
        fs::write(&args.output, bytes)?;
        source_map
    };

    if args.source_map {
        let mut map_name = args.output.file_name().unwrap_or_default().to_os_string();
        map_name.push(".map");
        let map_path = args.output.with_file_name(map_name);
        debug!(path = %map_path.display(), "writing source map");
        fs::write(&map_path, source_map.to_text())?;
    }

    Ok(())
}
