//! adiftools - single-pass processors for ADIF amateur radio contact logs
//!
//! Every tool reads ADI records one at a time, applies one transformation
//! (filter, reshape, enrich, aggregate, or reorder), and writes records or a
//! summary. The core pieces are the time window and stable sort, the
//! statistics aggregator, and the dedupe and fill-if-absent enrichment
//! contracts.

pub mod adi;
pub mod ascii;
pub mod cabrillo;
pub mod canonical;
pub mod cli;
pub mod clublog;
pub mod commands;
pub mod config;
pub mod csv_output;
pub mod cty;
pub mod dedupe;
pub mod enrich;
pub mod filter;
pub mod io;
pub mod policy;
pub mod record;
pub mod stats;
pub mod store;
pub mod timestamp;
pub mod window;
