//! Workflows that span repositories and the detector chain.

pub mod analysis;
