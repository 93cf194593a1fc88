#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The name of the vehicle type that every scenario defines implicitly.
/// It is never offered for insertion.
pub const DEFAULT_VEHICLE_TYPE: &str = "DEFAULT_VEHTYPE";

/// The configuration of a [TrafficManager](crate::TrafficManager).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ManagerConfig {
    /// Whether the vehicles of each route must enter the simulation in the order they were queued.
    ///
    /// When `false`, vehicles without a lane preference may use any start lane of their route,
    /// and a vehicle which cannot be inserted does not hold back the vehicles queued behind it.
    pub insert_in_order: bool,
    /// The vehicle type name excluded when loading the scenario.
    pub default_vehicle_type: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            insert_in_order: true,
            default_vehicle_type: DEFAULT_VEHICLE_TYPE.to_string(),
        }
    }
}

impl ManagerConfig {
    /// Parses a config from JSON. Missing fields take their default values.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(json)?)
    }
}
