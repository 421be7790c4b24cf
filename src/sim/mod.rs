//! Estimation stages of the site climate pipeline.
//!
//! Stages run in the order of [`pipeline::run`]:
//!
//! 1. [`interpolation`]: elevation correction and distance weighting
//! 2. [`derived`]: humidity, dew point, longwave conversion, nocturnal radiation
//! 3. [`solar`]: hour-averaged solar position
//! 4. [`separation`]: direct/diffuse split of shortwave irradiance
//! 5. [`wind`]: 16-point wind speed and direction

pub mod derived;
pub mod interpolation;
pub mod pipeline;
pub mod separation;
pub mod solar;
pub mod wind;
