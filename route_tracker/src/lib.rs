pub mod config;
pub mod gpx_util;
pub mod location_tracker;
pub mod map_controller;
pub mod provider;
pub mod simulated_provider;

pub use config::*;
pub use location_tracker::*;
pub use map_controller::*;
pub use provider::*;
pub use simulated_provider::*;
