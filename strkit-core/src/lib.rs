//! Core data types for strkit: a toolkit for finding tandem repeats in long
//! nucleotide sequences and placing them on gene annotations.
//!
//! This crate holds the value types every other strkit crate passes around:
//!
//! - [`models::Interval`]: a generic half-open integer interval carrying a payload
//! - repeat loci ([`models::PerfectLocus`], [`models::ImperfectLocus`],
//!   [`models::CompoundLocus`], [`models::LargeMotifLocus`])
//! - annotation features and genes ([`models::AnnotationFeature`], [`models::GeneInfo`])
//!
//! All locus and feature coordinates are 1-based and inclusive.

pub mod errors;
pub mod models;
pub mod utils;
