pub mod collision;
pub mod dynamics;
pub mod error;
pub mod geometry;

pub use error::Error;
