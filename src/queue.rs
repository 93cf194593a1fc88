use crate::{LaneSelector, RouteId, VehicleTypeId};
use slotmap::SparseSecondaryMap;
use std::collections::VecDeque;

/// A vehicle waiting to be inserted into the simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingInsertion {
    /// The type of the vehicle.
    pub vehicle_type: VehicleTypeId,
    /// The lane to insert the vehicle on.
    pub lane: LaneSelector,
    /// The longitudinal position along the lane in m.
    pub position: f64,
    /// The initial velocity in m/s.
    pub speed: f64,
}

/// The vehicles waiting to be inserted, bucketed by route.
/// Each bucket is kept in the order vehicles were queued.
#[derive(Clone, Debug, Default)]
pub struct InsertionQueue {
    buckets: SparseSecondaryMap<RouteId, VecDeque<PendingInsertion>>,
}

impl PendingInsertion {
    /// Creates a request for a vehicle of the given type, on any lane, at the start of the lane and at rest.
    pub fn new(vehicle_type: VehicleTypeId) -> Self {
        Self {
            vehicle_type,
            lane: LaneSelector::Any,
            position: 0.0,
            speed: 0.0,
        }
    }
}

impl InsertionQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Default::default()
    }

    /// Queues a vehicle for insertion on the given route, behind any vehicles already queued there.
    pub fn enqueue(&mut self, route: RouteId, vehicle: PendingInsertion) {
        match self.buckets.get_mut(route) {
            Some(bucket) => bucket.push_back(vehicle),
            None => {
                self.buckets.insert(route, VecDeque::from([vehicle]));
            }
        }
    }

    /// Gets the total number of vehicles waiting to be inserted.
    pub fn len(&self) -> usize {
        self.buckets.values().map(|bucket| bucket.len()).sum()
    }

    /// Whether no vehicles are waiting on any route.
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(|bucket| bucket.is_empty())
    }

    /// Gets the number of vehicles waiting on the given route.
    pub fn route_len(&self, route: RouteId) -> usize {
        self.buckets.get(route).map(|bucket| bucket.len()).unwrap_or(0)
    }

    /// Returns an iterator over the vehicles waiting on the given route, front first.
    pub fn pending(&self, route: RouteId) -> impl Iterator<Item = &PendingInsertion> {
        self.buckets.get(route).into_iter().flatten()
    }

    /// Returns an iterator over the routes which have vehicles waiting.
    pub fn routes(&self) -> impl Iterator<Item = RouteId> + '_ {
        self.buckets
            .iter()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(route, _)| route)
    }

    /// Mutable access to every bucket, for the insertion sweep.
    pub(crate) fn buckets_mut(
        &mut self,
    ) -> impl Iterator<Item = (RouteId, &mut VecDeque<PendingInsertion>)> {
        self.buckets.iter_mut()
    }

    /// Drops the buckets that have been emptied.
    pub(crate) fn prune(&mut self) {
        self.buckets.retain(|_, bucket| !bucket.is_empty());
    }
}

#[cfg(test)]
mod test {
    use super::{InsertionQueue, PendingInsertion};
    use crate::{LaneSelector, RouteId, VehicleTypeId};
    use slotmap::SlotMap;

    #[test]
    fn buckets_are_fifo() {
        let mut routes = SlotMap::<RouteId, ()>::with_key();
        let mut types = SlotMap::<VehicleTypeId, ()>::with_key();
        let (r1, r2) = (routes.insert(()), routes.insert(()));
        let car = types.insert(());

        let mut queue = InsertionQueue::new();
        assert!(queue.is_empty());
        for idx in 0..3 {
            queue.enqueue(
                r1,
                PendingInsertion {
                    lane: LaneSelector::Index(idx),
                    ..PendingInsertion::new(car)
                },
            );
        }
        queue.enqueue(r2, PendingInsertion::new(car));

        assert_eq!(queue.len(), 4);
        assert_eq!(queue.route_len(r1), 3);
        assert_eq!(queue.route_len(r2), 1);
        let lanes = queue.pending(r1).map(|v| v.lane).collect::<Vec<_>>();
        assert_eq!(
            lanes,
            [0, 1, 2].map(LaneSelector::Index).to_vec()
        );
        assert_eq!(queue.routes().count(), 2);
    }

    #[test]
    fn prune_drops_empty_buckets() {
        let mut routes = SlotMap::<RouteId, ()>::with_key();
        let mut types = SlotMap::<VehicleTypeId, ()>::with_key();
        let route = routes.insert(());
        let car = types.insert(());

        let mut queue = InsertionQueue::new();
        queue.enqueue(route, PendingInsertion::new(car));
        for (_, bucket) in queue.buckets_mut() {
            bucket.clear();
        }
        queue.prune();
        assert!(queue.is_empty());
        assert_eq!(queue.routes().count(), 0);
        assert_eq!(queue.pending(route).count(), 0);
    }
}
