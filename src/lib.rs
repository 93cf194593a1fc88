pub use cgmath;
pub use config::ManagerConfig;
pub use engine::SweepReport;
pub use error::Error;
pub use interface::{CommandInterface, LaneSelector, VehicleInsertion};
pub use manager::{ScenarioHook, TrafficManager, TrafficManagerBuilder};
pub use queue::{InsertionQueue, PendingInsertion};
pub use scenario::{Lane, Road, Route, ScenarioCache, VehicleType};
pub use scheduler::{EventScheduler, Scheduler};
pub use slotmap::{Key, KeyData};
use slotmap::new_key_type;
pub use telemetry::{
    AccumulatingObserver, EntitySample, EntityTotals, InsertionEvent, InsertionObserver, Payload,
    ReportConfig,
};

mod config;
mod engine;
mod error;
mod interface;
mod manager;
mod queue;
mod scenario;
mod scheduler;
mod telemetry;

new_key_type! {
    /// Unique ID of a [VehicleType].
    pub struct VehicleTypeId;
    /// Unique ID of a [Road].
    pub struct RoadId;
    /// Unique ID of a [Lane].
    pub struct LaneId;
    /// Unique ID of a [Route].
    pub struct RouteId;
    /// Unique ID of a timer armed with a [Scheduler].
    pub struct TimerId;
}

/// A 2D point in world space, in m.
pub type Point2d = cgmath::Point2<f64>;
