//! The world every clinic process acts on

use crate::client::Client;
use crate::server::Server;
use clinic_core::{ClientId, Registry, ServerId, SimRng, SimTime};
use clinic_metrics::{Action, EventRecord, EventSink, MetricsError};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Servers, clients, the trial's generator and the event sink.
///
/// One network belongs to one trial; nothing in it is shared with another
/// trial.
pub struct Network {
    registry: Registry,
    rng: SimRng,
    servers: BTreeMap<ServerId, Server>,
    clients: BTreeMap<ClientId, Client>,
    sink: Box<dyn EventSink>,
}

impl Network {
    pub fn new(rng: SimRng, sink: Box<dyn EventSink>) -> Self {
        Self {
            registry: Registry::new(),
            rng,
            servers: BTreeMap::new(),
            clients: BTreeMap::new(),
            sink,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn rng_mut(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    pub(crate) fn insert_server(&mut self, server: Server) {
        self.servers.insert(server.id(), server);
    }

    pub fn server(&self, id: ServerId) -> Option<&Server> {
        self.servers.get(&id)
    }

    pub fn servers(&self) -> impl Iterator<Item = &Server> {
        self.servers.values()
    }

    /// Servers whose station kind is `name`, in creation order
    pub fn servers_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Server> + 'a {
        self.servers.values().filter(move |s| s.name() == name)
    }

    /// Create a client at `now`
    pub fn new_client(&mut self, now: SimTime) -> ClientId {
        let id = self.registry.next_client();
        self.clients.insert(id, Client::new(id, now));
        id
    }

    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    pub fn clients(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    pub fn completed_clients(&self) -> usize {
        self.clients.values().filter(|c| c.done).count()
    }

    pub(crate) fn complete(&mut self, client: ClientId) {
        if let Some(entry) = self.clients.get_mut(&client) {
            entry.done = true;
        }
    }

    /// Draw a service time of `server` from the trial's generator
    pub fn sample_service(&mut self, server: ServerId) -> Option<Duration> {
        let Network { servers, rng, .. } = self;
        servers.get(&server).map(|s| s.process_time(rng))
    }

    /// Write `action` into the server's log and forward it to the sink.
    pub fn log(&mut self, server: ServerId, client: ClientId, action: Action, time: SimTime) {
        let Some(entry) = self.servers.get_mut(&server) else {
            debug!(server = %server, client = %client, "Dropping record for unknown server");
            return;
        };
        entry.record(client, action, time);
        debug!(time = %time, client = %client, action = %action, server = %server, "Stage record");
        self.sink.record(&EventRecord {
            time,
            client,
            action,
            server,
            station: entry.name().to_string(),
        });
    }
}

impl Network {
    /// Flush the event sink once the run is over.
    pub fn finish_sink(&mut self) -> Result<(), MetricsError> {
        self.sink.finish()
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("registry", &self.registry)
            .field("servers", &self.servers.len())
            .field("clients", &self.clients.len())
            .finish()
    }
}
