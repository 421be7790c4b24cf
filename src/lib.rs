//! Site-specific hourly climate series from a mesoscale weather grid.
//!
//! Given a site and the four grid series of the cell that encloses it, the
//! crate corrects each series to the site elevation, blends them with
//! distance weights, derives humidity and radiation quantities, computes the
//! hour-averaged solar position and splits total horizontal irradiance into
//! direct normal and diffuse components with one of five models.
//!
//! # Example
//!
//! ```rust,no_run
//! use siteclimate::{run_with_config, GridSeries, Quadrant, RunConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunConfig::load("run.json")?;
//! let load = |p: &str| -> Result<GridSeries, Box<dyn std::error::Error>> {
//!     Ok(serde_json::from_str(&std::fs::read_to_string(p)?)?)
//! };
//! let series = Quadrant::new(load("sw.json")?, load("se.json")?, load("nw.json")?, load("ne.json")?);
//! let target = run_with_config(&config, series)?;
//! println!("{} hours", target.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod physics;
pub mod sim;
pub mod weather;

pub use config::RunConfig;
pub use error::{ClimateError, Result};
pub use sim::pipeline::{run, run_with_config, Location};
pub use sim::separation::{SeparationModel, SeparationResult, Separator};
pub use sim::solar::SolarPositionRecord;
pub use weather::{Corner, GridSeries, Quadrant, TargetSeries};
