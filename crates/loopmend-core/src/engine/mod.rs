//! # Engine Module
//!
//! This module implements the repair pipeline's individual stages, providing
//! the computational framework between the raw data models and the high-level
//! preparation workflow.
//!
//! ## Overview
//!
//! The engine turns a deposited structure plus its reference sequence into a
//! repaired structure: it measures what is missing, drives an injected
//! conformational-search capability to produce candidate repairs, scores and
//! selects among them, and grafts the winning coordinates back into the
//! original entry.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Repair parameters, defaults, and TOML loading
//! - **Gap Detection** ([`gaps`]) - Alignment of coordinates against the reference sequence
//! - **Quality Scoring** ([`quality`]) - The 0-100 completeness score
//! - **Search Capabilities** ([`search`]) - Injected conformational-search and
//!   statistical-potential interfaces
//! - **Decoy Generation** ([`decoys`]) - The bounded stochastic attempt loop
//! - **Decoy Selection** ([`selection`]) - Combined scoring and deterministic best-pick
//! - **Merging** ([`merge`]) - Splicing repaired loops into the heteroatom-bearing original
//! - **Renumbering** ([`renumber`]) - Contiguous per-chain residue numbering
//! - **Progress Monitoring** ([`progress`]) - Progress reporting and user feedback
//! - **Error Handling** ([`error`]) - Engine-specific error types and propagation

pub mod config;
pub mod decoys;
pub mod error;
pub mod gaps;
pub mod merge;
pub mod progress;
pub mod quality;
pub mod renumber;
pub mod search;
pub mod selection;
