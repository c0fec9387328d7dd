//! Safe SQL builder: schema from settings only, everything else as parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
