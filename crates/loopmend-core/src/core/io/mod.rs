//! Provides input/output functionality for structure file formats.
//!
//! This module contains the unified trait-based interface for structure file
//! I/O and its implementation for the PDB format, including the canonical
//! SEQRES-derived reference sequences used by gap detection.

pub mod pdb;
pub mod traits;
