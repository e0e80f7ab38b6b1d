//! Consultory: a server whose work is sending its client through the clinic

use crate::network::Network;
use crate::routing::{Itinerary, RoutingStrategy};
use clinic_core::{ClientId, Context, Process, ServerId, Yield};
use tracing::{debug, error};

/// Downstream stations of a consultory and the strategy that routes clients
/// between them.
pub struct Consultory {
    bond_sellers: Vec<ServerId>,
    receptionists: Vec<ServerId>,
    doctors: Vec<ServerId>,
    strategy: Box<dyn RoutingStrategy>,
}

impl Consultory {
    pub fn new(
        bond_sellers: Vec<ServerId>,
        receptionists: Vec<ServerId>,
        doctors: Vec<ServerId>,
        strategy: Box<dyn RoutingStrategy>,
    ) -> Self {
        Self {
            bond_sellers,
            receptionists,
            doctors,
            strategy,
        }
    }

    /// A consultory that only delegates to `strategy`
    pub fn with_strategy(strategy: Box<dyn RoutingStrategy>) -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new(), strategy)
    }

    pub fn bond_sellers(&self) -> &[ServerId] {
        &self.bond_sellers
    }

    pub fn receptionists(&self) -> &[ServerId] {
        &self.receptionists
    }

    pub fn doctors(&self) -> &[ServerId] {
        &self.doctors
    }

    pub fn strategy(&self) -> &dyn RoutingStrategy {
        self.strategy.as_ref()
    }

    /// Every server a client of this consultory may be sent to
    pub fn downstream(&self) -> Vec<ServerId> {
        let mut servers: Vec<ServerId> = self
            .bond_sellers
            .iter()
            .chain(&self.receptionists)
            .chain(&self.doctors)
            .copied()
            .collect();
        servers.extend(self.strategy.referenced_servers());
        servers
    }
}

/// Walks a client's itinerary: one joined visit per stage, then marks the
/// client done.
pub struct RouteProcess {
    consultory: ServerId,
    client: ClientId,
    itinerary: Box<dyn Itinerary>,
    stages: usize,
}

impl RouteProcess {
    pub fn new(consultory: ServerId, client: ClientId, itinerary: Box<dyn Itinerary>) -> Self {
        Self {
            consultory,
            client,
            itinerary,
            stages: 0,
        }
    }
}

impl Process<Network> for RouteProcess {
    fn resume(&mut self, ctx: &mut Context<'_, Network>) -> Yield<Network> {
        let network = ctx.world_mut();
        while let Some(next) = self.itinerary.next_stage(network.rng_mut()) {
            match network.server(next) {
                Some(server) => {
                    self.stages += 1;
                    return Yield::join(server.attend(self.client));
                }
                None => {
                    error!(
                        consultory = %self.consultory,
                        server = %next,
                        "Itinerary names an unknown server, skipping stage"
                    );
                }
            }
        }

        network.complete(self.client);
        debug!(
            client = %self.client,
            consultory = %self.consultory,
            stages = self.stages,
            "Client done"
        );
        Yield::Done
    }

    fn name(&self) -> &'static str {
        "route"
    }
}
