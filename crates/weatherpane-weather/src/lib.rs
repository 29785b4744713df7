//! Weather service for weatherpane
//!
//! Resolves the user's position and fetches current conditions plus a
//! multi-day forecast for it.

pub mod location;
pub mod provider;
pub mod types;

pub use location::{
    resolve_location, resolve_with, IpLocationProvider, LocationProvider, NativeLocationProvider,
};
pub use provider::WeatherProvider;
pub use types::*;
