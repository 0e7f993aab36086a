//! Shared data structures for plant emissions analytics
//!
//! - `emission`: telemetry samples (`EmissionRecord`)
//! - `plant`: generation facilities (`Plant`, `PlantType`)
//! - `optimization`: improvement actions and their status lifecycle
//! - `period`: reporting windows
//! - `analytics`: outputs of the analytics entry points

mod analytics;
mod emission;
mod optimization;
mod period;
mod plant;

pub use analytics::*;
pub use emission::*;
pub use optimization::*;
pub use period::*;
pub use plant::*;
