//! Routing strategies
//!
//! A consultory does not know how its clients move through the downstream
//! stations; it asks its [`RoutingStrategy`] for an [`Itinerary`] per client
//! and walks it one stage at a time. Branching draws happen when the stage is
//! reached, interleaved with the visits themselves.

use crate::consultory::Consultory;
use clinic_core::{validate_probability, ClientId, ServerId, SimError, SimResult, SimRng};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lazily yields the servers a client visits, in order
pub trait Itinerary {
    /// Next server to visit, or `None` once the journey is over
    fn next_stage(&mut self, rng: &mut SimRng) -> Option<ServerId>;
}

/// Decides the itinerary of each client entering a consultory
pub trait RoutingStrategy {
    fn route(&self, consultory: &Consultory, client: ClientId) -> Box<dyn Itinerary>;

    /// Servers this strategy may send clients to, besides the consultory's own lists
    fn referenced_servers(&self) -> Vec<ServerId> {
        Vec::new()
    }

    /// Check that the strategy can route clients of `consultory`.
    fn validate(&self, _consultory: &Consultory) -> SimResult<()> {
        Ok(())
    }
}

/// The clinic's routing.
///
/// With probability `p` the client first sees the first bond-seller. Every
/// client then sees the first receptionist, then the first doctor with
/// probability `q` or the second doctor otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClinicRouting {
    pub p: f64,
    pub q: f64,
}

impl ClinicRouting {
    pub fn new(p: f64, q: f64) -> SimResult<Self> {
        validate_probability("p", p)?;
        validate_probability("q", q)?;
        Ok(Self { p, q })
    }
}

impl RoutingStrategy for ClinicRouting {
    fn route(&self, consultory: &Consultory, _client: ClientId) -> Box<dyn Itinerary> {
        Box::new(ClinicItinerary {
            p: self.p,
            q: self.q,
            bond_seller: consultory.bond_sellers().first().copied(),
            receptionist: consultory.receptionists().first().copied(),
            doctors: (
                consultory.doctors().first().copied(),
                consultory.doctors().get(1).copied(),
            ),
            stage: ClinicStage::BondSeller,
        })
    }

    fn validate(&self, consultory: &Consultory) -> SimResult<()> {
        validate_probability("p", self.p)?;
        validate_probability("q", self.q)?;
        if consultory.bond_sellers().is_empty() && self.p > 0.0 {
            return Err(SimError::Configuration(
                "clinic routing with p > 0 needs a bond-seller".to_string(),
            ));
        }
        if consultory.receptionists().is_empty() {
            return Err(SimError::Configuration(
                "clinic routing needs a receptionist".to_string(),
            ));
        }
        if consultory.doctors().len() < 2 {
            return Err(SimError::Configuration(
                "clinic routing needs two doctors".to_string(),
            ));
        }

        let bond_seller = consultory.bond_sellers().first().filter(|_| self.p > 0.0);
        let receptionist = &consultory.receptionists()[0];
        let mut earlier: Vec<&ServerId> = bond_seller.into_iter().collect();
        if earlier.contains(&receptionist) {
            return Err(SimError::Configuration(format!(
                "clinic routing would send a client to {receptionist} twice"
            )));
        }
        earlier.push(receptionist);
        for doctor in &consultory.doctors()[..2] {
            if earlier.contains(&doctor) {
                return Err(SimError::Configuration(format!(
                    "clinic routing would send a client to {doctor} twice"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClinicStage {
    BondSeller,
    Reception,
    Doctor,
    Finished,
}

struct ClinicItinerary {
    p: f64,
    q: f64,
    bond_seller: Option<ServerId>,
    receptionist: Option<ServerId>,
    doctors: (Option<ServerId>, Option<ServerId>),
    stage: ClinicStage,
}

impl Itinerary for ClinicItinerary {
    fn next_stage(&mut self, rng: &mut SimRng) -> Option<ServerId> {
        loop {
            match self.stage {
                ClinicStage::BondSeller => {
                    self.stage = ClinicStage::Reception;
                    if rng.gen_bool(self.p) {
                        return self.bond_seller;
                    }
                }
                ClinicStage::Reception => {
                    self.stage = ClinicStage::Doctor;
                    return self.receptionist;
                }
                ClinicStage::Doctor => {
                    self.stage = ClinicStage::Finished;
                    return if rng.gen_bool(self.q) {
                        self.doctors.0
                    } else {
                        self.doctors.1
                    };
                }
                ClinicStage::Finished => return None,
            }
        }
    }
}

/// Every client visits the same servers in the same order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedRoute {
    pub stages: Vec<ServerId>,
}

impl FixedRoute {
    pub fn new(stages: Vec<ServerId>) -> Self {
        Self { stages }
    }
}

impl RoutingStrategy for FixedRoute {
    fn route(&self, _consultory: &Consultory, _client: ClientId) -> Box<dyn Itinerary> {
        Box::new(FixedItinerary {
            stages: self.stages.clone().into_iter(),
        })
    }

    fn referenced_servers(&self) -> Vec<ServerId> {
        self.stages.clone()
    }

    /// A client keeps one record per server, so no stage may repeat.
    fn validate(&self, _consultory: &Consultory) -> SimResult<()> {
        let mut seen = BTreeSet::new();
        for stage in &self.stages {
            if !seen.insert(*stage) {
                return Err(SimError::Configuration(format!(
                    "fixed route visits {stage} more than once"
                )));
            }
        }
        Ok(())
    }
}

struct FixedItinerary {
    stages: std::vec::IntoIter<ServerId>,
}

impl Itinerary for FixedItinerary {
    fn next_stage(&mut self, _rng: &mut SimRng) -> Option<ServerId> {
        self.stages.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::seeded_rng;

    fn clinic(routing: ClinicRouting) -> Consultory {
        Consultory::new(
            vec![ServerId(1)],
            vec![ServerId(2)],
            vec![ServerId(3), ServerId(4)],
            Box::new(routing),
        )
    }

    fn walk(consultory: &Consultory, rng: &mut SimRng) -> Vec<ServerId> {
        let mut itinerary = consultory.strategy().route(consultory, ClientId(1));
        std::iter::from_fn(|| itinerary.next_stage(rng)).collect()
    }

    #[test]
    fn test_clinic_routing_extremes() {
        let mut rng = seeded_rng(1);
        let always = clinic(ClinicRouting::new(1.0, 1.0).unwrap());
        let never = clinic(ClinicRouting::new(0.0, 0.0).unwrap());
        for _ in 0..50 {
            assert_eq!(
                walk(&always, &mut rng),
                vec![ServerId(1), ServerId(2), ServerId(3)]
            );
            assert_eq!(walk(&never, &mut rng), vec![ServerId(2), ServerId(4)]);
        }
    }

    #[test]
    fn test_clinic_routing_branch_frequencies() {
        let mut rng = seeded_rng(99);
        let consultory = clinic(ClinicRouting::new(0.8, 0.3).unwrap());
        let runs = 10_000;
        let mut bond = 0;
        let mut first_doctor = 0;
        for _ in 0..runs {
            let stages = walk(&consultory, &mut rng);
            if stages[0] == ServerId(1) {
                bond += 1;
            }
            if stages.last() == Some(&ServerId(3)) {
                first_doctor += 1;
            }
        }
        let bond_ratio = bond as f64 / runs as f64;
        let doctor_ratio = first_doctor as f64 / runs as f64;
        assert!((bond_ratio - 0.8).abs() < 0.02, "bond ratio {bond_ratio}");
        assert!((doctor_ratio - 0.3).abs() < 0.02, "doctor ratio {doctor_ratio}");
    }

    #[test]
    fn test_clinic_routing_validation() {
        assert!(ClinicRouting::new(1.5, 0.3).is_err());
        assert!(ClinicRouting::new(0.5, -0.1).is_err());

        let routing = ClinicRouting::new(0.5, 0.5).unwrap();
        let one_doctor = Consultory::new(
            vec![ServerId(1)],
            vec![ServerId(2)],
            vec![ServerId(3)],
            Box::new(routing),
        );
        assert!(routing.validate(&one_doctor).is_err());
        assert!(routing.validate(&clinic(routing)).is_ok());
    }

    #[test]
    fn test_clinic_routing_rejects_shared_stations() {
        let routing = ClinicRouting::new(0.5, 0.5).unwrap();
        let shared_desk = Consultory::new(
            vec![ServerId(1)],
            vec![ServerId(1)],
            vec![ServerId(3), ServerId(4)],
            Box::new(routing),
        );
        assert!(matches!(
            routing.validate(&shared_desk),
            Err(SimError::Configuration(_))
        ));

        let doctor_at_reception = Consultory::new(
            vec![ServerId(1)],
            vec![ServerId(2)],
            vec![ServerId(3), ServerId(2)],
            Box::new(routing),
        );
        assert!(routing.validate(&doctor_at_reception).is_err());

        // without bond-sellers in play the shared desk is never visited twice
        let no_bonds = ClinicRouting::new(0.0, 0.5).unwrap();
        let reused = Consultory::new(
            vec![ServerId(2)],
            vec![ServerId(2)],
            vec![ServerId(3), ServerId(4)],
            Box::new(no_bonds),
        );
        assert!(no_bonds.validate(&reused).is_ok());
    }

    #[test]
    fn test_fixed_route_rejects_repeated_stage() {
        let route = FixedRoute::new(vec![ServerId(5), ServerId(6), ServerId(5)]);
        let consultory = Consultory::with_strategy(Box::new(route.clone()));
        assert!(matches!(
            route.validate(&consultory),
            Err(SimError::Configuration(_))
        ));
    }

    #[test]
    fn test_fixed_route() {
        let route = FixedRoute::new(vec![ServerId(5), ServerId(6)]);
        let consultory = Consultory::new(vec![], vec![], vec![], Box::new(route.clone()));
        let mut rng = seeded_rng(0);
        assert_eq!(walk(&consultory, &mut rng), vec![ServerId(5), ServerId(6)]);
        assert_eq!(route.referenced_servers(), vec![ServerId(5), ServerId(6)]);
    }
}
