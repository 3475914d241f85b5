//! The canonical generation steps.

pub mod filter;
pub mod finite;
pub mod materialize;
pub mod round;
pub mod widescreen;

pub use filter::{FilterByTarget, FilterByVisibility};
pub use finite::DropNonFinite;
pub use materialize::MaterializeAssets;
pub use round::RoundPrecision;
pub use widescreen::WidescreenOffset;
