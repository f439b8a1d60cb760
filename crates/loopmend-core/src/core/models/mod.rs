//! # Core Models Module
//!
//! This module contains the fundamental data structures used to represent protein
//! structures in Loopmend, providing the foundation for all preparation operations.
//!
//! ## Overview
//!
//! The models module defines the core abstractions for representing molecular
//! structures: atoms with coordinates, residues with their numbering and chemical
//! classification, chains, and the arena-backed [`structure::Structure`] that ties
//! them together. It also defines the [`sequence::ReferenceSequence`], the
//! coordinate-independent record of what each chain *should* contain, against
//! which gaps are detected.
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atom representation with coordinates and PDB attributes
//! - [`residue`] - Residue structure, numbering, and polymer/heteroatom classification
//! - [`chain`] - Chain organization preserving author ordering
//! - [`structure`] - Complete structure with arena storage and fast lookups
//! - [`sequence`] - Per-chain reference sequences with alphabet validation
//! - [`ids`] - Unique identifier types for atoms, residues, and chains

pub mod atom;
pub mod chain;
pub mod ids;
pub mod residue;
pub mod sequence;
pub mod structure;
