//! DrySight - Guided Interview Engine
//!
//! This crate implements the rules-driven interview engine behind
//! water-damage restoration scoping: a versioned question catalogue,
//! session planning, skip-logic sequencing, and answer-to-field mapping
//! with confidence scoring.

pub mod config;
pub mod domain;
