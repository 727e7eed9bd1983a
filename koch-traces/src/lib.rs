//! File I/O for the koch side-channel toolkit: TA timing-file and PA
//! trace-file loaders, plus gnuplot average-trace emission.

pub mod error;
pub mod pa;
pub mod ta;

pub use error::Error;
pub use pa::PowerTraces;
pub use ta::TimingAcquisitions;
