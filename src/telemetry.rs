use crate::{LaneSelector, Point2d};
use log::{debug, info};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// A free-form set of numeric channels attached to an [EntitySample],
/// e.g. emissions or fuel consumption during the last time step.
pub type Payload = SmallVec<[f64; 4]>;

/// Emitted whenever a queued vehicle is inserted into the simulation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InsertionEvent {
    /// The unique name given to the vehicle.
    pub vehicle: String,
    /// The name of the vehicle's type.
    pub vehicle_type: String,
    /// The name of the vehicle's route.
    pub route: String,
    /// The lane passed to the command interface.
    pub lane: LaneSelector,
    /// The simulation time in s.
    pub time: f64,
    /// The longitudinal position along the lane in m.
    pub position: f64,
    /// The initial velocity in m/s.
    pub speed: f64,
}

/// A snapshot of an externally tracked simulated entity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntitySample {
    /// The ID of the entity.
    pub id: usize,
    /// The simulation time in s.
    pub time: f64,
    /// The world space coordinates of the entity.
    pub pos: Point2d,
    /// The velocity in m/s.
    pub vel: f64,
    /// The acceleration in m/s<sup>2</sup>.
    pub acc: f64,
    /// Additional per-step measurements.
    pub payload: Payload,
}

/// Observes the traffic manager. All methods default to doing nothing.
pub trait InsertionObserver {
    /// Called after a vehicle has been inserted.
    fn on_insertion(&mut self, _event: &InsertionEvent) {}

    /// Called for each sample passed to [TrafficManager::report_entity](crate::TrafficManager::report_entity).
    fn on_entity_sample(&mut self, _sample: &EntitySample) {}
}

/// When [AccumulatingObserver] reports on each entity.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReportConfig {
    /// The x coordinate each entity starts at, indexed by entity ID.
    /// Entities without an entry start at 0.
    pub start_x: Vec<f64>,
    /// How far an entity must travel along x before it is reported, in m.
    pub report_distance: f64,
}

/// The running state of an entity kept by [AccumulatingObserver].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityTotals {
    /// The most recent sample.
    pub last: Option<EntitySample>,
    /// The sum of each payload channel over every sample.
    pub totals: Payload,
    /// The number of samples received.
    pub samples: usize,
}

/// Accumulates the payload of every entity and logs a report
/// once the entity has travelled the configured distance.
#[derive(Clone, Debug, Default)]
pub struct AccumulatingObserver {
    config: ReportConfig,
    entities: HashMap<usize, EntityTotals>,
    inserted: usize,
}

impl EntityTotals {
    fn add(&mut self, sample: &EntitySample) {
        if self.totals.len() < sample.payload.len() {
            self.totals.resize(sample.payload.len(), 0.0);
        }
        for (total, value) in self.totals.iter_mut().zip(&sample.payload) {
            *total += value;
        }
        self.samples += 1;
        self.last = Some(sample.clone());
    }
}

impl AccumulatingObserver {
    /// Creates a new observer.
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Gets the accumulated state of an entity.
    pub fn entity(&self, id: usize) -> Option<&EntityTotals> {
        self.entities.get(&id)
    }

    /// Returns an iterator over all the entities seen so far.
    pub fn iter_entities(&self) -> impl Iterator<Item = (usize, &EntityTotals)> {
        self.entities.iter().map(|(id, totals)| (*id, totals))
    }

    /// Gets the number of insertions observed.
    pub fn inserted(&self) -> usize {
        self.inserted
    }

    /// Whether the entity has travelled far enough to be reported.
    pub fn is_reportable(&self, sample: &EntitySample) -> bool {
        let start = self.config.start_x.get(sample.id).copied().unwrap_or(0.0);
        sample.pos.x - start >= self.config.report_distance
    }
}

impl InsertionObserver for AccumulatingObserver {
    fn on_insertion(&mut self, _event: &InsertionEvent) {
        self.inserted += 1;
    }

    fn on_entity_sample(&mut self, sample: &EntitySample) {
        let reportable = self.is_reportable(sample);
        let entity = self.entities.entry(sample.id).or_default();
        entity.add(sample);
        if reportable {
            info!(
                "Entity {}: vel {}, pos ({}, {}), totals {:?}, last step {:?}",
                sample.id, sample.vel, sample.pos.x, sample.pos.y, entity.totals, sample.payload
            );
        } else {
            debug!("Entity {} has not reached the report mark at {}", sample.id, sample.time);
        }
    }
}
