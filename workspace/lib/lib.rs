//! Shared pieces of the simulation scripts: layered run configuration,
//! logging set-up, and SVG rendering.

pub mod config;
pub mod logging;
pub mod plot;
