//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - inputs (`CountrySelection`, `Indicator`, `FetchConfig`, `MissingPolicy`)
//! - normalized observations (`Observation`, `ObservationSet`)
//! - chart outputs (`ChartPayload`, `Series`, `Layout`, `Dashboard`)

pub mod types;

pub use types::*;
