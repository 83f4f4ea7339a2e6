//! Control loop runtime.
//!
//! [`ControlLoop`] owns the service, the cadence scheduler and every
//! adapter.  The binary calls [`run_once_feeding`](ControlLoop::run_once_feeding)
//! forever with a fixed sleep in between; tests call
//! [`run_once`](ControlLoop::run_once) with a simulated clock.
//!
//! An iteration may block on several store requests.  The feed hook runs
//! after each output's command intake, after telemetry and after
//! reconciliation, so no more than
//! [`MAX_STORE_CALLS_BETWEEN_FEEDS`](crate::config::MAX_STORE_CALLS_BETWEEN_FEEDS)
//! requests separate two feeds.

use crate::app::ports::{
    ActuatorId, ActuatorPort, CadenceKind, EventSink, RemoteStorePort, SchedulerDelegate,
    SensorPort,
};
use crate::app::service::ControllerService;
use crate::config::ControllerConfig;
use crate::error::Result;
use crate::scheduler::Scheduler;

pub struct ControlLoop<H, S, E> {
    service: ControllerService,
    scheduler: Scheduler,
    hw: H,
    store: S,
    sink: E,
}

impl<H, S, E> ControlLoop<H, S, E>
where
    H: SensorPort + ActuatorPort,
    S: RemoteStorePort,
    E: EventSink,
{
    pub fn new(config: &ControllerConfig, hw: H, store: S, sink: E) -> Result<Self> {
        Ok(Self {
            service: ControllerService::new(config)?,
            scheduler: Scheduler::from_config(config),
            hw,
            store,
            sink,
        })
    }

    /// Drive outputs off, publish initial status and arm both cadences.
    pub fn start(&mut self, now_ms: u32) {
        self.service
            .start(&mut self.hw, &mut self.store, &mut self.sink);
        self.scheduler.arm(now_ms);
    }

    /// One loop iteration: due cadences, then reconciliation.
    pub fn run_once(&mut self, now_ms: u32) {
        self.run_once_feeding(now_ms, &mut || {});
    }

    /// [`run_once`](Self::run_once), calling `feed` between blocking stages.
    pub fn run_once_feeding(&mut self, now_ms: u32, feed: &mut dyn FnMut()) {
        let mut dispatch = Dispatch {
            service: &mut self.service,
            hw: &mut self.hw,
            store: &mut self.store,
            sink: &mut self.sink,
            feed: &mut *feed,
        };
        self.scheduler.tick(now_ms, &mut dispatch);

        self.service
            .reconcile(now_ms, &mut self.hw, &mut self.store, &mut self.sink);
        feed();
    }

    pub fn service(&self) -> &ControllerService {
        &self.service
    }

    pub fn hw(&self) -> &H {
        &self.hw
    }

    pub fn hw_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

/// Routes scheduler callbacks into the service with borrowed adapters.
struct Dispatch<'a, H, S, E> {
    service: &'a mut ControllerService,
    hw: &'a mut H,
    store: &'a mut S,
    sink: &'a mut E,
    feed: &'a mut dyn FnMut(),
}

impl<H, S, E> SchedulerDelegate for Dispatch<'_, H, S, E>
where
    H: SensorPort + ActuatorPort,
    S: RemoteStorePort,
    E: EventSink,
{
    fn on_cadence_due(&mut self, kind: CadenceKind, now_ms: u32) {
        match kind {
            CadenceKind::CommandPoll => {
                for id in ActuatorId::ALL {
                    self.service.poll_command(
                        id,
                        now_ms,
                        &mut *self.hw,
                        &mut *self.store,
                        &mut *self.sink,
                    );
                    (self.feed)();
                }
            }
            CadenceKind::Telemetry => {
                self.service
                    .push_telemetry(&mut *self.hw, &mut *self.store, &mut *self.sink);
                (self.feed)();
            }
        }
    }
}
