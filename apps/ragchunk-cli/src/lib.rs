//! Batch driver for the chunking pipeline: load a directory of extracted
//! papers, chunk each one with the requested strategies and write the results.

pub mod logging;
pub mod runner;
