//! Validated construction of a clinic network
//!
//! Every check runs here, before the first event: rates must be positive and
//! finite, capacities at least one slot or unbounded, routing probabilities
//! within `[0, 1]`, and every server a consultory may route to must exist.
//! A client is never routed to the same server twice, directly or through a
//! nested consultory.
//!
//! ```
//! use clinic_components::builder::NetworkBuilder;
//! use clinic_components::{Consultory, FixedRoute};
//! use clinic_core::{Capacity, SimTime};
//!
//! let mut builder = NetworkBuilder::new(7);
//! let desk = builder.station("Desk", 5.0, Capacity::Bounded(1)).unwrap();
//! let entry = builder
//!     .consultory(
//!         "Front",
//!         4.0,
//!         Capacity::Unbounded,
//!         Consultory::with_strategy(Box::new(FixedRoute::new(vec![desk]))),
//!     )
//!     .unwrap();
//! builder.arrivals(entry).unwrap();
//!
//! let mut sim = builder.build();
//! sim.run(SimTime::from_units(10));
//! assert!(sim.world().registry().clients_created() > 0);
//! ```

use crate::arrivals::ArrivalGenerator;
use crate::consultory::Consultory;
use crate::network::Network;
use crate::server::Server;
use clinic_core::{
    seeded_rng, validate_rate, Capacity, Exponential, ServerId, ServiceTimeDistribution,
    SimError, SimResult, Simulation,
};
use clinic_metrics::{EventSink, NullSink};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use tracing::debug;

/// Require a strictly positive, finite value.
pub fn validate_positive(field: &str, value: f64) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::Configuration(format!(
            "'{field}' must be positive and finite, got {value}"
        )))
    }
}

/// Helper for validating numeric ranges
pub fn validate_range<T: PartialOrd + Display>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> SimResult<()> {
    if value < min || value > max {
        Err(SimError::Configuration(format!(
            "'{field}' must be between {min} and {max}, got {value}"
        )))
    } else {
        Ok(())
    }
}

/// Assembles the servers and arrival streams of one trial.
pub struct NetworkBuilder {
    sim: Simulation<Network>,
}

impl NetworkBuilder {
    /// A network whose events go nowhere
    pub fn new(seed: u64) -> Self {
        Self::with_sink(seed, Box::new(NullSink))
    }

    pub fn with_sink(seed: u64, sink: Box<dyn EventSink>) -> Self {
        Self {
            sim: Simulation::new(Network::new(seeded_rng(seed), sink)),
        }
    }

    pub fn network(&self) -> &Network {
        self.sim.world()
    }

    /// Add a station with exponential service at `rate`.
    pub fn station(&mut self, name: &str, rate: f64, capacity: Capacity) -> SimResult<ServerId> {
        validate_rate(name, rate)?;
        let service = Exponential::new(rate)?;
        let server = self.add_server(name, rate, capacity, Box::new(service))?;
        Ok(self.insert(server))
    }

    /// Add a station with a custom service time distribution.
    pub fn station_with_service(
        &mut self,
        name: &str,
        capacity: Capacity,
        service: Box<dyn ServiceTimeDistribution>,
    ) -> SimResult<ServerId> {
        let mean = service.mean_units();
        validate_positive(&format!("{name} mean service time"), mean)?;
        let server = self.add_server(name, 1.0 / mean, capacity, service)?;
        Ok(self.insert(server))
    }

    /// Add a consultory. `arrival_rate` drives both its own bare service
    /// delay and the inter-arrival time of an [`ArrivalGenerator`] feeding it.
    pub fn consultory(
        &mut self,
        name: &str,
        arrival_rate: f64,
        capacity: Capacity,
        consultory: Consultory,
    ) -> SimResult<ServerId> {
        validate_rate(name, arrival_rate)?;
        capacity.validate(name)?;
        for downstream in consultory.downstream() {
            if self.sim.world().server(downstream).is_none() {
                return Err(SimError::UnknownServer(format!(
                    "{name} routes to {downstream}"
                )));
            }
        }
        consultory.strategy().validate(&consultory)?;
        self.check_disjoint_reach(name, &consultory)?;

        let service = Exponential::new(arrival_rate)?;
        let server = self
            .add_server(name, arrival_rate, capacity, Box::new(service))?
            .with_consultory(consultory);
        Ok(self.insert(server))
    }

    /// Servers a client may visit once sent to `server`, `server` included.
    fn reach(&self, server: ServerId) -> BTreeSet<ServerId> {
        let mut reached = BTreeSet::from([server]);
        let nested = self
            .sim
            .world()
            .server(server)
            .and_then(Server::consultory);
        if let Some(consultory) = nested {
            for downstream in consultory.downstream() {
                reached.extend(self.reach(downstream));
            }
        }
        reached
    }

    /// A client keeps one record per server, so the stations behind two
    /// different downstream servers of a consultory may not overlap.
    fn check_disjoint_reach(&self, name: &str, consultory: &Consultory) -> SimResult<()> {
        let downstream: BTreeSet<ServerId> = consultory.downstream().into_iter().collect();
        let mut claimed: BTreeMap<ServerId, ServerId> = BTreeMap::new();
        for first in downstream {
            for reached in self.reach(first) {
                if let Some(other) = claimed.insert(reached, first) {
                    return Err(SimError::Configuration(format!(
                        "{name} may send a client to {reached} through both {other} and {first}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn insert(&mut self, server: Server) -> ServerId {
        let id = server.id();
        self.sim.world_mut().insert_server(server);
        id
    }

    fn add_server(
        &mut self,
        name: &str,
        rate: f64,
        capacity: Capacity,
        service: Box<dyn ServiceTimeDistribution>,
    ) -> SimResult<Server> {
        capacity.validate(name)?;
        let resource = self.sim.add_resource(capacity);
        let id = self.sim.world_mut().registry_mut().next_server();
        debug!(server = %id, station = name, rate, capacity = %capacity, "Server created");
        Ok(Server::new(id, name.to_string(), rate, capacity, resource, service))
    }

    /// Feed `entry` with an endless Poisson stream of clients.
    pub fn arrivals(&mut self, entry: ServerId) -> SimResult<()> {
        self.arrivals_with(ArrivalGenerator::new(entry))
    }

    pub fn arrivals_with(&mut self, generator: ArrivalGenerator) -> SimResult<()> {
        if self.sim.world().server(generator.entry()).is_none() {
            return Err(SimError::UnknownServer(format!(
                "arrivals enter at {}",
                generator.entry()
            )));
        }
        self.sim.spawn(generator);
        Ok(())
    }

    pub fn build(self) -> Simulation<Network> {
        self.sim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{ClinicRouting, FixedRoute};
    use clinic_core::SimTime;

    #[test]
    fn test_validate_helpers() {
        assert!(validate_positive("horizon", 2.0).is_ok());
        assert!(validate_positive("horizon", 0.0).is_err());
        assert!(validate_positive("horizon", f64::INFINITY).is_err());
        assert!(validate_range("trials", 5u64, 1, 10).is_ok());
        assert!(validate_range("trials", 0u64, 1, 10).is_err());
        assert!(validate_range("p", 1.2, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_station_validation() {
        let mut builder = NetworkBuilder::new(1);
        assert!(matches!(
            builder.station("Doctor", 0.0, Capacity::Bounded(1)),
            Err(SimError::InvalidRate { .. })
        ));
        assert!(matches!(
            builder.station("Doctor", 5.0, Capacity::Bounded(0)),
            Err(SimError::InvalidCapacity { .. })
        ));
        let id = builder.station("Doctor", 5.0, Capacity::Bounded(1)).unwrap();
        // failed attempts do not consume ids
        assert_eq!(id, ServerId(1));
        assert_eq!(builder.network().server(id).unwrap().to_string(), "Doctor #1");
    }

    #[test]
    fn test_consultory_rejects_unknown_downstream() {
        let mut builder = NetworkBuilder::new(1);
        let result = builder.consultory(
            "Consultory",
            10.0,
            Capacity::Unbounded,
            Consultory::with_strategy(Box::new(FixedRoute::new(vec![ServerId(42)]))),
        );
        assert!(matches!(result, Err(SimError::UnknownServer(_))));
    }

    #[test]
    fn test_consultory_checks_strategy() {
        let mut builder = NetworkBuilder::new(1);
        let reception = builder.station("Reception", 12.0, Capacity::Bounded(1)).unwrap();
        let doctor = builder.station("Doctor", 5.0, Capacity::Bounded(1)).unwrap();
        let result = builder.consultory(
            "Consultory",
            10.0,
            Capacity::Unbounded,
            Consultory::new(
                vec![],
                vec![reception],
                vec![doctor],
                Box::new(ClinicRouting { p: 0.0, q: 0.5 }),
            ),
        );
        assert!(matches!(result, Err(SimError::Configuration(_))));
    }

    #[test]
    fn test_consultory_rejects_repeated_stage() {
        let mut builder = NetworkBuilder::new(1);
        let desk = builder.station("Desk", 5.0, Capacity::Bounded(1)).unwrap();
        let result = builder.consultory(
            "Front",
            4.0,
            Capacity::Unbounded,
            Consultory::with_strategy(Box::new(FixedRoute::new(vec![desk, desk]))),
        );
        assert!(matches!(result, Err(SimError::Configuration(_))));
    }

    #[test]
    fn test_consultory_rejects_overlap_with_nested_consultory() {
        let mut builder = NetworkBuilder::new(1);
        let desk = builder.station("Desk", 5.0, Capacity::Bounded(1)).unwrap();
        let lab = builder.station("Lab", 5.0, Capacity::Bounded(1)).unwrap();
        let wing = builder
            .consultory(
                "Wing",
                4.0,
                Capacity::Unbounded,
                Consultory::with_strategy(Box::new(FixedRoute::new(vec![desk]))),
            )
            .unwrap();

        let result = builder.consultory(
            "Front",
            4.0,
            Capacity::Unbounded,
            Consultory::with_strategy(Box::new(FixedRoute::new(vec![wing, desk]))),
        );
        assert!(matches!(result, Err(SimError::Configuration(_))));

        let front = builder
            .consultory(
                "Front",
                4.0,
                Capacity::Unbounded,
                Consultory::with_strategy(Box::new(FixedRoute::new(vec![wing, lab]))),
            )
            .unwrap();
        builder.arrivals(front).unwrap();
        let mut sim = builder.build();
        sim.run(SimTime::from_units(10));
        assert!(sim.world().completed_clients() > 0);
    }

    #[test]
    fn test_arrivals_need_known_entry() {
        let mut builder = NetworkBuilder::new(1);
        assert!(builder.arrivals(ServerId(1)).is_err());
    }
}
