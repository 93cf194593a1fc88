#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which lane of a route's first road a vehicle should enter on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LaneSelector {
    /// Let the command interface choose.
    #[default]
    Any,
    /// The lane with the given index on the first road of the route.
    Index(usize),
}

impl fmt::Display for LaneSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneSelector::Any => write!(f, "any"),
            LaneSelector::Index(idx) => write!(f, "{}", idx),
        }
    }
}

/// The attributes of a vehicle to be placed into the simulation.
#[derive(Clone, Copy, Debug)]
pub struct VehicleInsertion<'a> {
    /// The unique name of the new vehicle.
    pub name: &'a str,
    /// The name of the vehicle type.
    pub vehicle_type: &'a str,
    /// The name of the route the vehicle will follow.
    pub route: &'a str,
    /// The simulation time of the insertion in s.
    pub time: f64,
    /// The longitudinal position along the lane in m.
    pub position: f64,
    /// The initial velocity in m/s.
    pub speed: f64,
    /// The lane to insert on.
    pub lane: LaneSelector,
}

/// The traffic control interface which owns the simulated road network.
///
/// All calls are synchronous and complete within the current tick.
pub trait CommandInterface {
    /// Gets the names of all vehicle types.
    fn vehicle_type_ids(&self) -> Vec<String>;

    /// Gets the names of all roads.
    fn road_ids(&self) -> Vec<String>;

    /// Gets the names of all lanes.
    fn lane_ids(&self) -> Vec<String>;

    /// Gets the names of all routes.
    fn route_ids(&self) -> Vec<String>;

    /// Gets the name of the road the given lane belongs to.
    fn lane_road(&self, lane: &str) -> String;

    /// Gets the names of the roads a route traverses, in order.
    fn route_roads(&self, route: &str) -> Vec<String>;

    /// Attempts to place a vehicle into the simulation.
    /// Returns `false` if it could not be placed, e.g. because the lane is occupied.
    fn add_vehicle(&mut self, vehicle: &VehicleInsertion) -> bool;
}
