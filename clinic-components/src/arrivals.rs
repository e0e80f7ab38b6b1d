//! Poisson arrivals into an entry server

use crate::network::Network;
use clinic_core::{ClientId, Context, Process, ServerId, Yield};
use tracing::{error, trace};

/// Endless source of clients for `entry`.
///
/// Each round creates a client, waits for the entry server's
/// [`process_time`](crate::Server::process_time) and then starts the client's
/// visit as an independent process, so arrivals never wait for earlier
/// clients to finish.
pub struct ArrivalGenerator {
    entry: ServerId,
    pending: Option<ClientId>,
    limit: Option<u64>,
    created: u64,
}

impl ArrivalGenerator {
    pub fn new(entry: ServerId) -> Self {
        Self {
            entry,
            pending: None,
            limit: None,
            created: 0,
        }
    }

    /// Stop after `clients` arrivals
    pub fn with_limit(mut self, clients: u64) -> Self {
        self.limit = Some(clients);
        self
    }

    pub fn entry(&self) -> ServerId {
        self.entry
    }
}

impl Process<Network> for ArrivalGenerator {
    fn resume(&mut self, ctx: &mut Context<'_, Network>) -> Yield<Network> {
        if let Some(client) = self.pending.take() {
            match ctx.world().server(self.entry) {
                Some(server) => {
                    let visit = server.attend(client);
                    trace!(client = %client, entry = %self.entry, "Client arrives");
                    ctx.spawn(visit);
                }
                None => {
                    error!(entry = %self.entry, "Arrivals point at an unknown server");
                    return Yield::Done;
                }
            }
        }

        if self.limit.is_some_and(|limit| self.created >= limit) {
            return Yield::Done;
        }

        let now = ctx.now();
        let network = ctx.world_mut();
        let Some(gap) = network.sample_service(self.entry) else {
            error!(entry = %self.entry, "Arrivals point at an unknown server");
            return Yield::Done;
        };
        self.pending = Some(network.new_client(now));
        self.created += 1;
        Yield::Timeout(gap)
    }

    fn name(&self) -> &'static str {
        "arrivals"
    }
}
