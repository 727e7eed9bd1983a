//! PA trace-file loader and average-trace plot emission.
//!
//! The original HWSec binary trace format is not part of the retrieved
//! source beyond "decoding is the loader's responsibility", so this loader
//! defines its own simple, testable text format: one line per acquisition,
//! `<ciphertext-hex> <sample0> <sample1> ... <sampleL-1>`, whitespace
//! separated. All rows must share the same sample count.

use std::io::{BufRead, Write};
use std::path::Path;

use crate::error::Error;

/// Ciphertexts paired with per-sample power traces, read from a PA data
/// file.
#[derive(Debug, Clone)]
pub struct PowerTraces {
    pub n: usize,
    pub c: Vec<u64>,
    pub t: Vec<Vec<f64>>,
}

/// Reads exactly `n` acquisitions from `path`. Fails with
/// [`Error::BadInput`] if the file has fewer than `n` parseable lines or
/// rows disagree on sample count.
pub fn load(path: impl AsRef<Path>, n: usize) -> Result<PowerTraces, Error> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);

    let mut c = Vec::with_capacity(n);
    let mut t: Vec<Vec<f64>> = Vec::with_capacity(n);
    let mut trace_len = None;

    for line in reader.lines().take(n) {
        let line = line?;
        let mut fields = line.split_whitespace();
        let ciphertext_hex = fields
            .next()
            .ok_or_else(|| Error::BadInput("missing ciphertext field".into()))?;
        let ciphertext = u64::from_str_radix(ciphertext_hex.trim_start_matches("0x"), 16)
            .map_err(|e| Error::BadInput(format!("malformed ciphertext {ciphertext_hex}: {e}")))?;

        let samples: Vec<f64> = fields
            .map(|s| {
                s.parse()
                    .map_err(|e| Error::BadInput(format!("malformed sample {s}: {e}")))
            })
            .collect::<Result<_, _>>()?;

        match trace_len {
            None => trace_len = Some(samples.len()),
            Some(len) if len != samples.len() => {
                return Err(Error::BadInput(
                    "power traces do not share a common length".into(),
                ));
            }
            Some(_) => {}
        }

        c.push(ciphertext);
        t.push(samples);
    }

    if c.len() != n {
        return Err(Error::BadInput(format!(
            "could not read {n} acquisitions from traces file, only found {}",
            c.len()
        )));
    }

    Ok(PowerTraces { n, c, t })
}

/// Computes the per-sample mean trace across all acquisitions, writes it to
/// `<prefix>.dat` (one value per line) and emits a companion gnuplot script
/// at `<prefix>.cmd`. Run once, before ranking, as the "Averaging" driver
/// state.
pub fn average(traces: &[Vec<f64>], prefix: &str) -> Result<Vec<f64>, Error> {
    let n = traces.len();
    if n == 0 {
        return Err(Error::BadInput("no traces to average".into()));
    }
    let trace_len = traces[0].len();
    if traces.iter().any(|row| row.len() != trace_len) {
        return Err(Error::BadInput(
            "power traces do not share a common length".into(),
        ));
    }

    let mut sums = vec![0.0f64; trace_len];
    for row in traces {
        for (acc, &sample) in sums.iter_mut().zip(row.iter()) {
            *acc += sample;
        }
    }
    let average: Vec<f64> = sums.into_iter().map(|s| s / n as f64).collect();

    let dat_path = format!("{prefix}.dat");
    let mut dat_file = std::fs::File::create(&dat_path)?;
    for value in &average {
        writeln!(dat_file, "{value}")?;
    }

    let cmd_path = format!("{prefix}.cmd");
    let mut cmd_file = std::fs::File::create(cmd_path)?;
    writeln!(cmd_file, "set grid")?;
    writeln!(cmd_file, "plot \"{dat_path}\" with lines")?;

    tracing::info!(file = %dat_path, "average power trace stored");
    Ok(average)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn round_trips_written_data() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0x0123456789abcdef 1.0 2.0 3.0").unwrap();
        writeln!(file, "0xfedcba9876543210 4.0 5.0 6.0").unwrap();

        let loaded = load(file.path(), 2).unwrap();
        assert_eq!(loaded.n, 2);
        assert_eq!(loaded.t, vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
    }

    #[test]
    fn rejects_uneven_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0x0123456789abcdef 1.0 2.0 3.0").unwrap();
        writeln!(file, "0xfedcba9876543210 4.0 5.0").unwrap();

        let result = load(file.path(), 2);
        assert!(matches!(result, Err(Error::BadInput(_))));
    }

    #[test]
    fn average_has_one_line_per_sample_and_references_dat_in_cmd() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("average");
        let prefix_str = prefix.to_str().unwrap();

        let traces = vec![vec![1.0, 2.0, 3.0], vec![3.0, 4.0, 5.0]];
        let avg = average(&traces, prefix_str).unwrap();
        assert_eq!(avg, vec![2.0, 3.0, 4.0]);

        let dat_contents = std::fs::read_to_string(format!("{prefix_str}.dat")).unwrap();
        assert_eq!(dat_contents.lines().count(), 3);

        let cmd_contents = std::fs::read_to_string(format!("{prefix_str}.cmd")).unwrap();
        assert!(cmd_contents.contains(&format!("{prefix_str}.dat")));
    }
}
