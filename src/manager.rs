use crate::engine::Sweep;
use crate::{
    CommandInterface, EntitySample, Error, InsertionObserver, InsertionQueue, LaneSelector,
    ManagerConfig, PendingInsertion, RouteId, ScenarioCache, Scheduler, SweepReport, TimerId,
    VehicleTypeId,
};
use log::{debug, info};

/// Notified once the scenario has been loaded, typically to queue the vehicles of the run.
pub trait ScenarioHook {
    fn scenario_loaded(&mut self, scenario: &ScenarioCache, queue: &mut InsertionQueue);
}

impl<F: FnMut(&ScenarioCache, &mut InsertionQueue)> ScenarioHook for F {
    fn scenario_loaded(&mut self, scenario: &ScenarioCache, queue: &mut InsertionQueue) {
        self(scenario, queue)
    }
}

/// Inserts queued vehicles into a running traffic simulation.
///
/// Each time its timer fires, the manager attempts to insert every queued vehicle
/// through the [CommandInterface], then re-arms the timer.
pub struct TrafficManager<S: Scheduler, C: CommandInterface> {
    config: ManagerConfig,
    scheduler: S,
    commands: C,
    /// The scenario topology, loaded before the first sweep.
    scenario: ScenarioCache,
    /// The vehicles waiting to be inserted.
    queue: InsertionQueue,
    hook: Option<Box<dyn ScenarioHook>>,
    observers: Vec<Box<dyn InsertionObserver>>,
    /// The armed insertion timer, if the manager is running.
    timer: Option<TimerId>,
    /// Whether the scheduler has reported that it is ready.
    ready: bool,
}

/// Assembles a [TrafficManager].
pub struct TrafficManagerBuilder<S: Scheduler, C: CommandInterface> {
    config: ManagerConfig,
    scheduler: Option<S>,
    commands: Option<C>,
    hook: Option<Box<dyn ScenarioHook>>,
    observers: Vec<Box<dyn InsertionObserver>>,
}

impl<S: Scheduler, C: CommandInterface> Default for TrafficManagerBuilder<S, C> {
    fn default() -> Self {
        Self {
            config: Default::default(),
            scheduler: None,
            commands: None,
            hook: None,
            observers: vec![],
        }
    }
}

impl<S: Scheduler, C: CommandInterface> TrafficManagerBuilder<S, C> {
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn scheduler(mut self, scheduler: S) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn command_interface(mut self, commands: C) -> Self {
        self.commands = Some(commands);
        self
    }

    /// Sets the hook called once the scenario is loaded.
    pub fn on_scenario_loaded(mut self, hook: impl ScenarioHook + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn observer(mut self, observer: impl InsertionObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Creates the manager and arms its first timer.
    pub fn build(self) -> Result<TrafficManager<S, C>, Error> {
        let scheduler = self.scheduler.ok_or(Error::MissingScheduler)?;
        let commands = self.commands.ok_or(Error::MissingCommandInterface)?;
        let interval = scheduler.update_interval();
        if !interval.is_finite() || interval <= 0.0 {
            return Err(Error::InvalidUpdateInterval(interval));
        }

        let mut manager = TrafficManager {
            config: self.config,
            scheduler,
            commands,
            scenario: ScenarioCache::new(),
            queue: InsertionQueue::new(),
            hook: self.hook,
            observers: self.observers,
            timer: None,
            ready: false,
        };
        manager.arm();
        info!(
            "Traffic manager started, inserting every {} s, in order: {}",
            interval, manager.config.insert_in_order
        );
        Ok(manager)
    }
}

impl<S: Scheduler, C: CommandInterface> TrafficManager<S, C> {
    /// Starts assembling a new manager.
    pub fn builder() -> TrafficManagerBuilder<S, C> {
        Default::default()
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn command_interface(&self) -> &C {
        &self.commands
    }

    pub fn command_interface_mut(&mut self) -> &mut C {
        &mut self.commands
    }

    /// Gets the scenario cache, which is empty until the scenario is loaded.
    pub fn scenario(&self) -> &ScenarioCache {
        &self.scenario
    }

    pub fn queue(&self) -> &InsertionQueue {
        &self.queue
    }

    /// Whether the insertion timer is armed.
    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Registers an observer.
    pub fn add_observer(&mut self, observer: Box<dyn InsertionObserver>) {
        self.observers.push(observer);
    }

    /// Loads the scenario, if it has not been loaded already.
    /// The scenario hook is called the first time.
    pub fn load_scenario(&mut self) -> &ScenarioCache {
        let loaded = self
            .scenario
            .load(&self.commands, &self.config.default_vehicle_type);
        if loaded {
            if let Some(hook) = &mut self.hook {
                hook.scenario_loaded(&self.scenario, &mut self.queue);
            }
        }
        &self.scenario
    }

    /// Queues a vehicle for insertion on the given route.
    /// It will be attempted on a future sweep, but may never be inserted if the route stays saturated.
    pub fn enqueue(&mut self, route: RouteId, vehicle: PendingInsertion) {
        self.queue.enqueue(route, vehicle);
    }

    /// Queues a vehicle for insertion on the given route.
    ///
    /// # Parameters
    /// * `route` - The route the vehicle will follow
    /// * `vehicle_type` - The type of the vehicle
    /// * `lane` - The lane of the route's first road to insert on
    /// * `position` - The longitudinal position along the lane in m
    /// * `speed` - The initial velocity in m/s
    pub fn enqueue_insertion(
        &mut self,
        route: RouteId,
        vehicle_type: VehicleTypeId,
        lane: LaneSelector,
        position: f64,
        speed: f64,
    ) {
        self.enqueue(
            route,
            PendingInsertion {
                vehicle_type,
                lane,
                position,
                speed,
            },
        );
    }

    /// Handles a fired timer.
    ///
    /// Returns the result of the sweep if one was performed. Timers which
    /// do not belong to this manager are ignored.
    pub fn handle_timer(&mut self, timer: TimerId) -> Option<SweepReport> {
        if self.timer != Some(timer) {
            return None;
        }
        self.timer = None;

        if !self.ready {
            self.ready = self.scheduler.is_ready();
        }
        let report = if self.ready {
            Some(self.sweep())
        } else {
            debug!("Command interface not ready, deferring insertion");
            None
        };

        self.arm();
        report
    }

    /// Attempts to insert every queued vehicle once, loading the scenario first if needed.
    pub fn sweep(&mut self) -> SweepReport {
        self.load_scenario();
        let report = Sweep {
            scenario: &mut self.scenario,
            commands: &mut self.commands,
            observers: &mut self.observers,
            insert_in_order: self.config.insert_in_order,
            time: self.scheduler.now(),
        }
        .run(&mut self.queue);
        debug!(
            "Inserted {} vehicles in {} attempts, {} pending",
            report.inserted, report.attempts, report.pending
        );
        report
    }

    /// Passes a sample of an externally tracked entity on to the observers.
    pub fn report_entity(&mut self, sample: &EntitySample) {
        for observer in &mut self.observers {
            observer.on_entity_sample(sample);
        }
    }

    /// Cancels the insertion timer. The manager will not sweep again.
    pub fn finish(&mut self) {
        if let Some(timer) = self.timer.take() {
            self.scheduler.cancel(timer);
            info!("Traffic manager stopped, {} vehicles pending", self.queue.len());
        }
    }

    /// Arms the timer for the next sweep.
    fn arm(&mut self) {
        let time = self.scheduler.now() + self.scheduler.update_interval();
        self.timer = Some(self.scheduler.schedule_at(time));
    }
}

impl<S: Scheduler, C: CommandInterface> Drop for TrafficManager<S, C> {
    fn drop(&mut self) {
        self.finish();
    }
}
