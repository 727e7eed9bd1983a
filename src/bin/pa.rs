use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use koch_core::driver::{CancellationToken, DriverConfig};
use koch_core::{AcquisitionSet, FocusWindow, Mode};

/// Apply P. Kocher's DPA algorithm based on a decision function.
#[derive(Parser)]
#[command(about = "Apply P. Kocher's DPA algorithm based on decision function")]
struct Args {
    /// Name of the traces file (e.g. pa.hws)
    datafile: PathBuf,
    /// Number of acquisitions to use
    n: usize,
    /// Index of target bit in L15 (1 to 32, as in the DES standard)
    #[arg(default_value_t = 1)]
    target_bit: u32,
}

fn run(args: &Args) -> Result<u64, koch::Error> {
    koch::self_test()?;

    if args.n < 1 {
        return Err(koch_core::Error::BadInput(format!(
            "invalid number of acquisitions: {} (shall be greater than 1)",
            args.n
        ))
        .into());
    }
    if !(1..=32).contains(&args.target_bit) {
        return Err(koch_core::Error::BadInput(format!(
            "invalid target bit index: {} (shall be between 1 and 32 included)",
            args.target_bit
        ))
        .into());
    }

    let target_sbox = koch_core::leakage::pa::target_bit_to_sbox(args.target_bit);
    tracing::info!(target_bit = args.target_bit, target_sbox, "diagnostic target S-box");

    let acquisitions = koch_traces::pa::load(&args.datafile, args.n)?;
    tracing::info!(n = acquisitions.n, "loaded power traces");

    koch_traces::pa::average(&acquisitions.t, "average")?;

    let acq = AcquisitionSet::new_power(acquisitions.c, acquisitions.t, FocusWindow::default())?;
    let config = DriverConfig::new(Mode::Pa);
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
