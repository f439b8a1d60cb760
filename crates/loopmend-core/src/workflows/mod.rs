//! # Workflows Module
//!
//! This module provides the high-level entry points that orchestrate a
//! complete structure preparation run.
//!
//! ## Overview
//!
//! Workflows are the top-level API for users of the library. They sequence
//! the engine stages (gap detection, quality scoring, decoy generation,
//! selection, merging, renumbering) into a single call, handle the fallback
//! paths when modeling cannot proceed, and report progress throughout.
//!
//! ## Architecture
//!
//! - **Preparation Workflow** ([`prepare`]) - Full detect, repair, merge,
//!   rescore, and renumber pipeline with graceful degradation when the
//!   conformational-search capability is absent or defeated.

pub mod prepare;
