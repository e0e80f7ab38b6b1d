//! Servers and the attend process
//!
//! A server is a station with a bounded FIFO resource, a service rate and a
//! per-client log. Visiting it is one suspendable process, [`AttendProcess`]:
//!
//! 1. record `arrive`
//! 2. acquire a slot of the server's resource (may wait)
//! 3. record `enter`
//! 4. work: an exponential service delay, or for a consultory the client's
//!    whole routed journey through the downstream stations
//! 5. record `exit` and release the slot

use crate::consultory::{Consultory, RouteProcess};
use crate::network::Network;
use clinic_core::{
    Capacity, ClientId, Context, Process, ResourceId, ServerId, ServiceTimeDistribution,
    SimRng, SimTime, Yield,
};
use clinic_metrics::statistics::{self, Window};
use clinic_metrics::{Action, Occupancy, StatLog};
use std::fmt;
use std::ops::Range;
use std::time::Duration;
use tracing::{error, trace};

/// A station of the network.
pub struct Server {
    id: ServerId,
    name: String,
    rate: f64,
    capacity: Capacity,
    resource: ResourceId,
    service: Box<dyn ServiceTimeDistribution>,
    consultory: Option<Consultory>,
    stats: StatLog,
}

impl Server {
    pub(crate) fn new(
        id: ServerId,
        name: String,
        rate: f64,
        capacity: Capacity,
        resource: ResourceId,
        service: Box<dyn ServiceTimeDistribution>,
    ) -> Self {
        Self {
            id,
            name,
            rate,
            capacity,
            resource,
            service,
            consultory: None,
            stats: StatLog::new(),
        }
    }

    pub(crate) fn with_consultory(mut self, consultory: Consultory) -> Self {
        self.consultory = Some(consultory);
        self
    }

    pub fn id(&self) -> ServerId {
        self.id
    }

    /// Station kind, e.g. "Doctor"
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Service intensity in clients per time unit
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn resource(&self) -> ResourceId {
        self.resource
    }

    /// Orchestration data when this server is a consultory
    pub fn consultory(&self) -> Option<&Consultory> {
        self.consultory.as_ref()
    }

    pub fn is_consultory(&self) -> bool {
        self.consultory.is_some()
    }

    pub fn stats(&self) -> &StatLog {
        &self.stats
    }

    pub(crate) fn record(&mut self, client: ClientId, action: Action, time: SimTime) {
        self.stats.record(client, action, time);
    }

    /// The bare service delay, without queueing.
    ///
    /// A consultory uses it as the inter-arrival time of its clients.
    pub fn process_time(&self, rng: &mut SimRng) -> Duration {
        self.service.sample(rng)
    }

    /// The process of `client` visiting this server
    pub fn attend(&self, client: ClientId) -> AttendProcess {
        AttendProcess::new(self.id, self.resource, client)
    }

    pub fn average_waiting_time(&self, window: Window) -> Option<f64> {
        statistics::average_waiting_time(&self.stats, window)
    }

    pub fn average_queue_waiting_time(&self, window: Window) -> Option<f64> {
        statistics::average_queued_waiting_time(&self.stats, window)
    }

    pub fn average_attention_waiting_time(&self, window: Window) -> Option<f64> {
        statistics::average_attention_waiting_time(&self.stats, window)
    }

    /// Sampled mean occupancy over `range`, or over
    /// [`default_population_range`](statistics::default_population_range)
    /// when `None`
    pub fn average_clients(&self, range: Option<Range<u64>>, occupancy: Occupancy) -> Option<f64> {
        let range = range.or_else(|| statistics::default_population_range(&self.stats))?;
        statistics::average_occupancy(&self.stats, range, occupancy)
    }

    pub fn average_finished_clients(&self, range: Option<Range<u64>>) -> Option<f64> {
        let range = range.or_else(|| statistics::default_population_range(&self.stats))?;
        statistics::average_finished(&self.stats, range)
    }

    pub fn clients_at(&self, t: SimTime, occupancy: Occupancy) -> usize {
        statistics::occupancy_at(&self.stats, t, occupancy)
    }

    pub fn finished_clients(&self, t: SimTime) -> usize {
        statistics::finished_at(&self.stats, t)
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.name, self.id.0)
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("rate", &self.rate)
            .field("capacity", &self.capacity)
            .field("resource", &self.resource)
            .field("consultory", &self.consultory.is_some())
            .field("clients", &self.stats.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttendStage {
    Arriving,
    Entering,
    Leaving,
    Finished,
}

/// One client's visit to one server
pub struct AttendProcess {
    server: ServerId,
    resource: ResourceId,
    client: ClientId,
    stage: AttendStage,
}

impl AttendProcess {
    pub fn new(server: ServerId, resource: ResourceId, client: ClientId) -> Self {
        Self {
            server,
            resource,
            client,
            stage: AttendStage::Arriving,
        }
    }

    pub fn client(&self) -> ClientId {
        self.client
    }

    pub fn server(&self) -> ServerId {
        self.server
    }

    /// Start the work of the stage: a service delay or a routed journey.
    fn work(&mut self, ctx: &mut Context<'_, Network>) -> Yield<Network> {
        let network = ctx.world_mut();
        let route = network
            .server(self.server)
            .and_then(Server::consultory)
            .map(|consultory| consultory.strategy().route(consultory, self.client));

        if let Some(itinerary) = route {
            return Yield::join(RouteProcess::new(self.server, self.client, itinerary));
        }

        match network.sample_service(self.server) {
            Some(delay) => Yield::Timeout(delay),
            None => {
                error!(
                    server = %self.server,
                    client = %self.client,
                    "Service time requested from unknown server"
                );
                Yield::Timeout(Duration::ZERO)
            }
        }
    }
}

impl Process<Network> for AttendProcess {
    fn resume(&mut self, ctx: &mut Context<'_, Network>) -> Yield<Network> {
        let now = ctx.now();
        match self.stage {
            AttendStage::Arriving => {
                ctx.world_mut().log(self.server, self.client, Action::Arrive, now);
                self.stage = AttendStage::Entering;
                Yield::Acquire(self.resource)
            }
            AttendStage::Entering => {
                ctx.world_mut().log(self.server, self.client, Action::Enter, now);
                self.stage = AttendStage::Leaving;
                self.work(ctx)
            }
            AttendStage::Leaving => {
                ctx.world_mut().log(self.server, self.client, Action::Exit, now);
                ctx.release(self.resource);
                self.stage = AttendStage::Finished;
                trace!(server = %self.server, client = %self.client, "Visit finished");
                Yield::Done
            }
            AttendStage::Finished => Yield::Done,
        }
    }

    fn name(&self) -> &'static str {
        "attend"
    }
}
