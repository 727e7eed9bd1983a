//! TA timing-file loader: one acquisition per line,
//! `<ciphertext-hex> <timing-float>`, whitespace-separated.

use std::io::BufRead;
use std::path::Path;

use crate::error::Error;

/// Ciphertexts paired with scalar timing measurements, read from a TA data
/// file.
#[derive(Debug, Clone)]
pub struct TimingAcquisitions {
    pub n: usize,
    pub c: Vec<u64>,
    pub t: Vec<f64>,
}

/// Reads exactly `n` acquisitions from `path`. Fails with
/// [`Error::BadInput`] if the file has fewer than `n` parseable lines.
pub fn load(path: impl AsRef<Path>, n: usize) -> Result<TimingAcquisitions, Error> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);

    let mut c = Vec::with_capacity(n);
    let mut t = Vec::with_capacity(n);

    for line in reader.lines().take(n) {
        let line = line?;
        let mut fields = line.split_whitespace();
        let ciphertext_hex = fields
            .next()
            .ok_or_else(|| Error::BadInput("missing ciphertext field".into()))?;
        let timing_str = fields
            .next()
            .ok_or_else(|| Error::BadInput("missing timing field".into()))?;

        let ciphertext = u64::from_str_radix(ciphertext_hex.trim_start_matches("0x"), 16)
            .map_err(|e| Error::BadInput(format!("malformed ciphertext {ciphertext_hex}: {e}")))?;
        let timing: f64 = timing_str
            .parse()
            .map_err(|e| Error::BadInput(format!("malformed timing {timing_str}: {e}")))?;

        c.push(ciphertext);
        t.push(timing);
    }

    if c.len() != n {
        return Err(Error::BadInput(format!(
            "could not read {n} acquisitions from traces file, only found {}",
            c.len()
        )));
    }

    Ok(TimingAcquisitions { n, c, t })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn round_trips_written_data() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0x0123456789abcdef 1.5").unwrap();
        writeln!(file, "0xfedcba9876543210 2.25").unwrap();
        writeln!(file, "0x1111111111111111 3.0").unwrap();

        let loaded = load(file.path(), 3).unwrap();
        assert_eq!(loaded.n, 3);
        assert_eq!(loaded.c, vec![0x0123_4567_89ab_cdef, 0xfedc_ba98_7654_3210, 0x1111_1111_1111_1111]);
        assert_eq!(loaded.t, vec![1.5, 2.25, 3.0]);
    }

    #[test]
    fn rejects_too_few_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0x0123456789abcdef 1.5").unwrap();

        let result = load(file.path(), 3);
        assert!(matches!(result, Err(Error::BadInput(_))));
    }

    #[test]
    fn rejects_malformed_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not-hex 1.5").unwrap();

        let result = load(file.path(), 1);
        assert!(matches!(result, Err(Error::BadInput(_))));
    }
}
