//! Domain types and pure logic for the solar inspection service.
//!
//! Nothing in this crate performs I/O. The persistence layer, detector
//! clients and HTTP handlers all build on these types.

pub mod classification;
pub mod defect;
pub mod error;
pub mod panel_map;
pub mod report;
pub mod scoring;
pub mod types;
