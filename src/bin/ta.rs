use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use koch_core::driver::{CancellationToken, DriverConfig};
use koch_core::{AcquisitionSet, Mode};

/// Apply P. Kocher's TA algorithm.
#[derive(Parser)]
#[command(about = "Apply P. Kocher's TA algorithm")]
struct Args {
    /// Name of the data file (generated with target)
    datafile: PathBuf,
    /// Number of experiments to use
    n: usize,
}

fn run(args: &Args) -> Result<u64, koch::Error> {
    koch::self_test()?;

    if args.n < 1 {
        return Err(koch_core::Error::BadInput(format!(
            "invalid number of experiments: {} (shall be greater than 1)",
            args.n
        ))
        .into());
    }

    let acquisitions = koch_traces::ta::load(&args.datafile, args.n)?;
    tracing::info!(n = acquisitions.n, "loaded timing acquisitions");

    let acq = AcquisitionSet::new_timing(acquisitions.c, acquisitions.t)?;
    let config = DriverConfig::new(Mode::Ta);
    let cancel = CancellationToken::new();
    let recovered = koch_core::driver::run(&acq, &config, &cancel)?;
    tracing::info!(score = recovered.score, "recovered last-round subkey");
    Ok(recovered.key)
}

fn main() -> ExitCode {
    koch::init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(key) => {
            println!("0x{key:012x}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
