use crate::{CommandInterface, LaneId, RoadId, RouteId, VehicleTypeId};
use itertools::Itertools;
use log::{debug, info, warn};
use slotmap::SlotMap;
use std::collections::HashMap;

/// A type of vehicle defined by the scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VehicleType {
    /// The name of the vehicle type.
    name: String,
    /// The number of vehicles of this type inserted so far.
    count: usize,
}

/// A road of the network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Road {
    name: String,
    /// The lanes of the road, in the order they were reported.
    lanes: Vec<LaneId>,
}

/// A single lane of a road.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lane {
    name: String,
    road: RoadId,
}

/// A route through the network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    name: String,
    /// The roads the route traverses.
    roads: Vec<RoadId>,
    /// The lanes of the route's first road, where vehicles may enter.
    start_lanes: Vec<LaneId>,
}

/// A snapshot of the scenario topology, taken once from the [CommandInterface].
#[derive(Clone, Debug, Default)]
pub struct ScenarioCache {
    loaded: bool,
    vehicle_types: SlotMap<VehicleTypeId, VehicleType>,
    roads: SlotMap<RoadId, Road>,
    lanes: SlotMap<LaneId, Lane>,
    routes: SlotMap<RouteId, Route>,
    type_names: HashMap<String, VehicleTypeId>,
    road_names: HashMap<String, RoadId>,
    lane_names: HashMap<String, LaneId>,
    route_names: HashMap<String, RouteId>,
}

impl VehicleType {
    /// Gets the name of the vehicle type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the number of vehicles of this type inserted so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The name the next inserted vehicle of this type will receive.
    pub(crate) fn next_vehicle_name(&self) -> String {
        format!("{}.{}", self.name, self.count)
    }

    pub(crate) fn increment(&mut self) {
        self.count += 1;
    }
}

impl Road {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lanes(&self) -> &[LaneId] {
        &self.lanes
    }
}

impl Lane {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the road the lane belongs to.
    pub fn road(&self) -> RoadId {
        self.road
    }
}

impl Route {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roads(&self) -> &[RoadId] {
        &self.roads
    }

    /// Gets the lanes vehicles on this route may be inserted on.
    pub fn start_lanes(&self) -> &[LaneId] {
        &self.start_lanes
    }
}

impl ScenarioCache {
    /// Creates an empty, unloaded cache.
    pub fn new() -> Self {
        Default::default()
    }

    /// Whether the cache has been populated.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Populates the cache from the command interface.
    /// Does nothing if the cache is already loaded.
    ///
    /// Returns `true` if this call populated the cache.
    ///
    /// # Parameters
    /// * `commands` - The interface to query the scenario from
    /// * `default_type` - A vehicle type name to leave out of the type table
    pub fn load(&mut self, commands: &dyn CommandInterface, default_type: &str) -> bool {
        if self.loaded {
            return false;
        }
        self.load_vehicle_types(commands, default_type);
        self.load_roads(commands);
        self.load_lanes(commands);
        self.load_routes(commands);
        self.loaded = true;
        true
    }

    fn load_vehicle_types(&mut self, commands: &dyn CommandInterface, default_type: &str) {
        let names = commands.vehicle_type_ids();
        info!("Having currently {} vehicle types", names.len());
        for name in names.into_iter().filter(|name| name != default_type) {
            if self.type_names.contains_key(&name) {
                warn!("Duplicate vehicle type {}", name);
                continue;
            }
            debug!("Found vehicle type {}", name);
            let id = self.vehicle_types.insert(VehicleType {
                name: name.clone(),
                count: 0,
            });
            self.type_names.insert(name, id);
        }
    }

    fn load_roads(&mut self, commands: &dyn CommandInterface) {
        let names = commands.road_ids();
        info!("Having currently {} roads in the scenario", names.len());
        for name in names {
            if self.road_names.contains_key(&name) {
                warn!("Duplicate road {}", name);
                continue;
            }
            debug!("Found road {}", name);
            let id = self.roads.insert(Road {
                name: name.clone(),
                lanes: vec![],
            });
            self.road_names.insert(name, id);
        }
    }

    fn load_lanes(&mut self, commands: &dyn CommandInterface) {
        let names = commands.lane_ids();
        info!("Having currently {} lanes in the scenario", names.len());
        for name in names {
            if self.lane_names.contains_key(&name) {
                warn!("Duplicate lane {}", name);
                continue;
            }
            let road_name = commands.lane_road(&name);
            let Some(&road) = self.road_names.get(&road_name) else {
                warn!("Lane {} is on unknown road {}", name, road_name);
                continue;
            };
            debug!("Found lane {} on road {}", name, road_name);
            let id = self.lanes.insert(Lane {
                name: name.clone(),
                road,
            });
            self.roads[road].lanes.push(id);
            self.lane_names.insert(name, id);
        }
    }

    fn load_routes(&mut self, commands: &dyn CommandInterface) {
        let names = commands.route_ids();
        info!("Having currently {} routes in the scenario", names.len());
        for name in names {
            if self.route_names.contains_key(&name) {
                warn!("Duplicate route {}", name);
                continue;
            }
            let road_names = commands.route_roads(&name);
            let roads = road_names
                .iter()
                .filter_map(|road| {
                    let id = self.road_names.get(road).copied();
                    if id.is_none() {
                        warn!("Route {} uses unknown road {}", name, road);
                    }
                    id
                })
                .collect::<Vec<_>>();
            // Vehicles enter on the first road as reported, even if it is unknown.
            let start_lanes = match road_names.first() {
                Some(first) => self
                    .road_names
                    .get(first)
                    .map(|road| self.roads[*road].lanes.clone())
                    .unwrap_or_default(),
                None => {
                    warn!("Route {} has no roads", name);
                    vec![]
                }
            };
            debug!(
                "Found route {} starting on lanes [{}]",
                name,
                start_lanes
                    .iter()
                    .map(|lane| &self.lanes[*lane].name)
                    .join(", ")
            );
            let id = self.routes.insert(Route {
                name: name.clone(),
                roads,
                start_lanes,
            });
            self.route_names.insert(name, id);
        }
    }

    /// Finds a vehicle type by name.
    pub fn vehicle_type_id(&self, name: &str) -> Option<VehicleTypeId> {
        self.type_names.get(name).copied()
    }

    /// Finds a road by name.
    pub fn road_id(&self, name: &str) -> Option<RoadId> {
        self.road_names.get(name).copied()
    }

    /// Finds a lane by name.
    pub fn lane_id(&self, name: &str) -> Option<LaneId> {
        self.lane_names.get(name).copied()
    }

    /// Finds a route by name.
    pub fn route_id(&self, name: &str) -> Option<RouteId> {
        self.route_names.get(name).copied()
    }

    pub fn vehicle_type(&self, id: VehicleTypeId) -> Option<&VehicleType> {
        self.vehicle_types.get(id)
    }

    pub(crate) fn vehicle_type_mut(&mut self, id: VehicleTypeId) -> Option<&mut VehicleType> {
        self.vehicle_types.get_mut(id)
    }

    pub fn road(&self, id: RoadId) -> Option<&Road> {
        self.roads.get(id)
    }

    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.get(id)
    }

    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(id)
    }

    /// Gets the lanes vehicles on the given route may be inserted on.
    /// Empty if the route is unknown.
    pub fn start_lanes(&self, route: RouteId) -> &[LaneId] {
        self.routes
            .get(route)
            .map(|route| route.start_lanes())
            .unwrap_or(&[])
    }

    /// Gets the number of vehicles of the given type inserted so far.
    pub fn inserted_count(&self, id: VehicleTypeId) -> usize {
        self.vehicle_types.get(id).map(|t| t.count).unwrap_or(0)
    }

    /// Returns an iterator over all the vehicle types.
    pub fn iter_vehicle_types(&self) -> impl Iterator<Item = (VehicleTypeId, &VehicleType)> {
        self.vehicle_types.iter()
    }

    /// Returns an iterator over all the roads.
    pub fn iter_roads(&self) -> impl Iterator<Item = (RoadId, &Road)> {
        self.roads.iter()
    }

    /// Returns an iterator over all the lanes.
    pub fn iter_lanes(&self) -> impl Iterator<Item = (LaneId, &Lane)> {
        self.lanes.iter()
    }

    /// Returns an iterator over all the routes.
    pub fn iter_routes(&self) -> impl Iterator<Item = (RouteId, &Route)> {
        self.routes.iter()
    }
}

#[cfg(test)]
mod test {
    use super::ScenarioCache;
    use crate::{CommandInterface, VehicleInsertion};
    use std::cell::Cell;

    /// A two road network with a single route across both.
    #[derive(Default)]
    struct TwoRoads {
        queries: Cell<usize>,
    }

    impl TwoRoads {
        fn query(&self) {
            self.queries.set(self.queries.get() + 1);
        }
    }

    impl CommandInterface for TwoRoads {
        fn vehicle_type_ids(&self) -> Vec<String> {
            self.query();
            vec!["DEFAULT_VEHTYPE".into(), "car".into(), "truck".into()]
        }

        fn road_ids(&self) -> Vec<String> {
            self.query();
            vec!["a".into(), "b".into()]
        }

        fn lane_ids(&self) -> Vec<String> {
            self.query();
            vec!["a_0".into(), "b_0".into(), "a_1".into(), "x_0".into()]
        }

        fn route_ids(&self) -> Vec<String> {
            self.query();
            vec!["ab".into(), "empty".into(), "ghost".into()]
        }

        fn lane_road(&self, lane: &str) -> String {
            self.query();
            lane.split('_').next().unwrap().to_string()
        }

        fn route_roads(&self, route: &str) -> Vec<String> {
            self.query();
            match route {
                "ab" => vec!["a".into(), "b".into()],
                "ghost" => vec!["x".into(), "a".into()],
                _ => vec![],
            }
        }

        fn add_vehicle(&mut self, _: &VehicleInsertion) -> bool {
            unreachable!()
        }
    }

    #[test]
    fn loads_topology() {
        let commands = TwoRoads::default();
        let mut cache = ScenarioCache::new();
        assert!(cache.load(&commands, "DEFAULT_VEHTYPE"));

        assert!(cache.vehicle_type_id("DEFAULT_VEHTYPE").is_none());
        let car = cache.vehicle_type_id("car").unwrap();
        assert_eq!(cache.vehicle_type(car).unwrap().name(), "car");
        assert_eq!(cache.iter_vehicle_types().count(), 2);

        let a = cache.road_id("a").unwrap();
        let lanes = cache.road(a).unwrap().lanes();
        assert_eq!(lanes.len(), 2);
        assert_eq!(cache.lane(lanes[1]).unwrap().name(), "a_1");
        assert!(cache.lane_id("x_0").is_none());

        let ab = cache.route_id("ab").unwrap();
        assert_eq!(cache.route(ab).unwrap().roads().len(), 2);
        assert_eq!(cache.start_lanes(ab), lanes);

        let empty = cache.route_id("empty").unwrap();
        assert!(cache.start_lanes(empty).is_empty());
    }

    /// A route starting on a road the scenario does not report has nowhere to enter.
    #[test]
    fn unknown_first_road_has_no_start_lanes() {
        let commands = TwoRoads::default();
        let mut cache = ScenarioCache::new();
        cache.load(&commands, "DEFAULT_VEHTYPE");

        let ghost = cache.route_id("ghost").unwrap();
        let a = cache.road_id("a").unwrap();
        assert_eq!(cache.route(ghost).unwrap().roads(), [a]);
        assert!(cache.start_lanes(ghost).is_empty());
        assert!(cache.road_id("x").is_none());
    }

    #[test]
    fn load_is_idempotent() {
        let commands = TwoRoads::default();
        let mut cache = ScenarioCache::new();
        assert!(cache.load(&commands, "DEFAULT_VEHTYPE"));
        let queries = commands.queries.get();
        let ab = cache.route_id("ab").unwrap();
        let start_lanes = cache.start_lanes(ab).to_vec();

        assert!(!cache.load(&commands, "DEFAULT_VEHTYPE"));
        assert_eq!(commands.queries.get(), queries);
        assert_eq!(cache.route_id("ab"), Some(ab));
        assert_eq!(cache.start_lanes(ab), start_lanes);
        assert_eq!(cache.iter_lanes().count(), 3);
    }
}
