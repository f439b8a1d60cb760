//! # Core Module
//!
//! This module provides the fundamental building blocks for representing and
//! exchanging protein structures in Loopmend, serving as the stateless foundation
//! of the library.
//!
//! ## Overview
//!
//! The core module implements the data structures and utilities required to hold
//! an experimentally determined structure in memory, to relate it to the full
//! sequence it was determined from, and to read and write it on disk. Everything
//! here is free of pipeline state; the repair logic itself lives in
//! [`crate::engine`].
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, residues, chains, complete
//!   structures, and reference sequences
//! - **File I/O** ([`io`]) - Reading and writing structure file formats
//! - **Identification Tables** ([`utils`]) - Residue-name and atom-name
//!   classification shared across the library

pub mod io;
pub mod models;
pub mod utils;
