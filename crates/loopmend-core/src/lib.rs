//! # Loopmend Core Library
//!
//! A library for preparing experimentally determined protein structures for molecular
//! dynamics simulation, centered on the detection and ab-initio repair of missing
//! loop regions.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (`Structure`,
//!   `ReferenceSequence`), residue and atom identification tables, and structure
//!   file I/O.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer implements the repair
//!   pipeline's individual stages: gap and discontinuity detection against a
//!   reference sequence, structure quality scoring, decoy generation through an
//!   injected conformational-search capability, decoy selection, coordinate
//!   merging, and residue renumbering.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level, user-facing
//!   layer. It ties the `engine` and `core` together to execute the complete
//!   preparation pipeline, from raw structure to repaired, rescored, and
//!   renumbered output. It provides a simple and powerful entry point for
//!   end-users of the library.

pub mod core;
pub mod engine;
pub mod workflows;
