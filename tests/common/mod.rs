//! A scripted command interface and helpers shared by the integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use traffic_insertion::{
    CommandInterface, EventScheduler, InsertionEvent, InsertionObserver, LaneSelector,
    ManagerConfig, SweepReport, TrafficManager, VehicleInsertion,
};

/// The interval between insertion sweeps in s.
pub const INTERVAL: f64 = 1.0;

/// One call to [CommandInterface::add_vehicle].
#[derive(Clone, Debug, PartialEq)]
pub struct Attempt {
    pub name: String,
    pub vehicle_type: String,
    pub route: String,
    pub time: f64,
    pub position: f64,
    pub lane: LaneSelector,
    pub accepted: bool,
}

/// A small network with a scripted acceptance rule.
///
/// * Road `e1` has three lanes, road `e2` has one, road `e3` has none.
/// * Route `R1` runs `e1 -> e2`, `R2` runs `e2`, `R_EMPTY` starts on `e3`.
/// * Route `R_GHOST` starts on `ghost`, a road the scenario never reports, then runs `e1`.
pub struct ScriptedInterface {
    accept: Box<dyn FnMut(&VehicleInsertion) -> bool>,
    pub attempts: Vec<Attempt>,
    pub queries: Cell<usize>,
}

impl ScriptedInterface {
    pub fn new(accept: impl FnMut(&VehicleInsertion) -> bool + 'static) -> Self {
        Self {
            accept: Box::new(accept),
            attempts: vec![],
            queries: Cell::new(0),
        }
    }

    fn query(&self) {
        self.queries.set(self.queries.get() + 1);
    }

    /// The attempts made at the given time.
    pub fn attempts_at(&self, time: f64) -> impl Iterator<Item = &Attempt> {
        self.attempts.iter().filter(move |a| a.time == time)
    }
}

impl CommandInterface for ScriptedInterface {
    fn vehicle_type_ids(&self) -> Vec<String> {
        self.query();
        ["DEFAULT_VEHTYPE", "T0", "T1"].map(String::from).to_vec()
    }

    fn road_ids(&self) -> Vec<String> {
        self.query();
        ["e1", "e2", "e3"].map(String::from).to_vec()
    }

    fn lane_ids(&self) -> Vec<String> {
        self.query();
        ["e1_0", "e1_1", "e1_2", "e2_0"].map(String::from).to_vec()
    }

    fn route_ids(&self) -> Vec<String> {
        self.query();
        ["R1", "R2", "R_EMPTY", "R_GHOST"].map(String::from).to_vec()
    }

    fn lane_road(&self, lane: &str) -> String {
        self.query();
        lane[..2].to_string()
    }

    fn route_roads(&self, route: &str) -> Vec<String> {
        self.query();
        let roads: &[&str] = match route {
            "R1" => &["e1", "e2"],
            "R2" => &["e2"],
            "R_GHOST" => &["ghost", "e1"],
            _ => &["e3", "e1"],
        };
        roads.iter().map(|r| r.to_string()).collect()
    }

    fn add_vehicle(&mut self, vehicle: &VehicleInsertion) -> bool {
        let accepted = (self.accept)(vehicle);
        self.attempts.push(Attempt {
            name: vehicle.name.to_string(),
            vehicle_type: vehicle.vehicle_type.to_string(),
            route: vehicle.route.to_string(),
            time: vehicle.time,
            position: vehicle.position,
            lane: vehicle.lane,
            accepted,
        });
        accepted
    }
}

/// Records every insertion event.
#[derive(Clone, Default)]
pub struct Recorder(pub Rc<RefCell<Vec<InsertionEvent>>>);

impl InsertionObserver for Recorder {
    fn on_insertion(&mut self, event: &InsertionEvent) {
        self.0.borrow_mut().push(event.clone());
    }
}

pub type Manager = TrafficManager<EventScheduler, ScriptedInterface>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a running manager over the scripted network.
pub fn manager(
    insert_in_order: bool,
    accept: impl FnMut(&VehicleInsertion) -> bool + 'static,
) -> Manager {
    init_logger();
    TrafficManager::builder()
        .config(ManagerConfig {
            insert_in_order,
            ..Default::default()
        })
        .scheduler(EventScheduler::new(INTERVAL))
        .command_interface(ScriptedInterface::new(accept))
        .build()
        .unwrap()
}

/// Fires the manager's next timer.
pub fn tick(manager: &mut Manager) -> Option<SweepReport> {
    let timer = manager.scheduler_mut().pop_due(f64::INFINITY).unwrap();
    manager.handle_timer(timer)
}
