pub mod body;
pub mod ccd;
pub mod contact;
pub mod force;
pub mod island;
pub mod joint;
pub mod listener;
pub mod settings;
pub mod timestep;
pub mod world;

pub use body::{Body, BodyId, Filter, Fixture};
pub use joint::{Joint, JointId, LimitState};
pub use settings::{ContinuousDetectionMode, Settings};
pub use timestep::TimeStep;
pub use world::World;
