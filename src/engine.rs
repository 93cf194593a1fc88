//! The insertion sweep, which drains the [InsertionQueue] through the [CommandInterface].

use crate::telemetry::{InsertionEvent, InsertionObserver};
use crate::{
    CommandInterface, InsertionQueue, LaneSelector, PendingInsertion, RouteId, ScenarioCache,
    VehicleInsertion,
};
use log::{debug, trace, warn};
use std::collections::VecDeque;

/// A summary of a single sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// The number of calls made to [CommandInterface::add_vehicle].
    pub attempts: usize,
    /// The number of vehicles inserted.
    pub inserted: usize,
    /// The number of routes whose sweep ended early.
    pub blocked_routes: usize,
    /// The number of vehicles still waiting after the sweep.
    pub pending: usize,
}

/// What became of a pending vehicle during a sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    /// The vehicle was inserted on the given lane and leaves the queue.
    Inserted(LaneSelector),
    /// The vehicle stays queued; the vehicles behind it are still attempted.
    Retained,
    /// The vehicle stays queued and no more vehicles on the route are attempted.
    Blocked,
}

/// Everything a sweep needs besides the queue.
pub(crate) struct Sweep<'a> {
    pub scenario: &'a mut ScenarioCache,
    pub commands: &'a mut dyn CommandInterface,
    pub observers: &'a mut [Box<dyn InsertionObserver>],
    pub insert_in_order: bool,
    /// The current simulation time in s.
    pub time: f64,
}

impl<'a> Sweep<'a> {
    /// Attempts to insert the queued vehicles of every route.
    pub fn run(mut self, queue: &mut InsertionQueue) -> SweepReport {
        let mut report = SweepReport::default();
        for (route, bucket) in queue.buckets_mut() {
            self.sweep_route(route, bucket, &mut report);
        }
        queue.prune();
        report.pending = queue.len();
        report
    }

    /// Walks a route's bucket from the front, removing the vehicles that get inserted.
    fn sweep_route(
        &mut self,
        route_id: RouteId,
        bucket: &mut VecDeque<PendingInsertion>,
        report: &mut SweepReport,
    ) {
        let Some(route) = self.scenario.route(route_id) else {
            warn!("Skipping {} vehicles queued on unknown route", bucket.len());
            report.blocked_routes += 1;
            return;
        };
        let route_name = route.name().to_string();
        let num_start_lanes = route.start_lanes().len();
        debug!("Processing route {}", route_name);

        let mut idx = 0;
        while let Some(vehicle) = bucket.get(idx).copied() {
            match self.attempt(&route_name, num_start_lanes, &vehicle, report) {
                Outcome::Inserted(_) => {
                    bucket.remove(idx);
                }
                Outcome::Retained => idx += 1,
                Outcome::Blocked => {
                    report.blocked_routes += 1;
                    break;
                }
            }
        }
    }

    /// Attempts to insert a single vehicle.
    fn attempt(
        &mut self,
        route: &str,
        num_start_lanes: usize,
        vehicle: &PendingInsertion,
        report: &mut SweepReport,
    ) -> Outcome {
        let failed = if self.insert_in_order {
            Outcome::Blocked
        } else {
            Outcome::Retained
        };

        let Some(vehicle_type) = self.scenario.vehicle_type(vehicle.vehicle_type) else {
            warn!("Vehicle queued on route {} has an unknown type", route);
            return failed;
        };
        let type_name = vehicle_type.name().to_string();
        let name = vehicle_type.next_vehicle_name();

        let outcome = if vehicle.lane == LaneSelector::Any && !self.insert_in_order {
            // Any start lane will do. If none of them has room, the entry
            // to the route is saturated, so nothing behind is attempted.
            // This only holds while vehicles enter at the start of the route.
            (0..num_start_lanes)
                .map(LaneSelector::Index)
                .find(|lane| self.try_insert(&name, &type_name, route, vehicle, *lane, report))
                .map(Outcome::Inserted)
                .unwrap_or(Outcome::Blocked)
        } else if self.try_insert(&name, &type_name, route, vehicle, vehicle.lane, report) {
            Outcome::Inserted(vehicle.lane)
        } else {
            failed
        };

        if let Outcome::Inserted(lane) = outcome {
            debug!("Successfully inserted {}", name);
            if let Some(vehicle_type) = self.scenario.vehicle_type_mut(vehicle.vehicle_type) {
                vehicle_type.increment();
            }
            report.inserted += 1;
            let event = InsertionEvent {
                vehicle: name,
                vehicle_type: type_name,
                route: route.to_string(),
                lane,
                time: self.time,
                position: vehicle.position,
                speed: vehicle.speed,
            };
            for observer in self.observers.iter_mut() {
                observer.on_insertion(&event);
            }
        }
        outcome
    }

    fn try_insert(
        &mut self,
        name: &str,
        vehicle_type: &str,
        route: &str,
        vehicle: &PendingInsertion,
        lane: LaneSelector,
        report: &mut SweepReport,
    ) -> bool {
        trace!(
            "Trying to add {} with route {} vehicle type {} on lane {}",
            name,
            route,
            vehicle_type,
            lane
        );
        report.attempts += 1;
        self.commands.add_vehicle(&VehicleInsertion {
            name,
            vehicle_type,
            route,
            time: self.time,
            position: vehicle.position,
            speed: vehicle.speed,
            lane,
        })
    }
}
