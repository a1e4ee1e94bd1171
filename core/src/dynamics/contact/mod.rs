pub mod constraint;
pub mod manager;
pub mod solver;

pub use constraint::{ContactConstraint, ContactKey, SolvableContact};
pub use manager::{ContactEvent, ContactManager, ContactPointData};
