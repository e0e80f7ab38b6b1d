//! Construction of the clinic network for one trial

use crate::config::ClinicConfig;
use clinic_components::{ClinicRouting, Consultory, Network, NetworkBuilder};
use clinic_core::{ServerId, SimResult, Simulation};
use clinic_metrics::EventSink;

/// Ids of the clinic's stations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClinicLayout {
    pub consultory: ServerId,
    pub doctors: [ServerId; 2],
    pub bond_seller: ServerId,
    pub reception: ServerId,
}

/// Build the clinic described by `config`, seeded with `seed`, with arrivals
/// already scheduled.
///
/// Stations are created in the same order for every trial, so a station has
/// the same id in every trial of an experiment.
pub fn build_clinic(
    config: &ClinicConfig,
    seed: u64,
    sink: Box<dyn EventSink>,
) -> SimResult<(Simulation<Network>, ClinicLayout)> {
    let mut builder = NetworkBuilder::with_sink(seed, sink);

    let doctors = [
        builder.station("Doctor", config.doctors[0].rate, config.doctors[0].capacity)?,
        builder.station("Doctor", config.doctors[1].rate, config.doctors[1].capacity)?,
    ];
    let bond_seller = builder.station(
        "BondSeller",
        config.bond_seller.rate,
        config.bond_seller.capacity,
    )?;
    let reception = builder.station("Reception", config.reception.rate, config.reception.capacity)?;

    let routing = ClinicRouting::new(config.p, config.q)?;
    let consultory = builder.consultory(
        "Consultory",
        config.arrival_rate,
        config.consultory_capacity,
        Consultory::new(
            vec![bond_seller],
            vec![reception],
            doctors.to_vec(),
            Box::new(routing),
        ),
    )?;
    builder.arrivals(consultory)?;

    let layout = ClinicLayout {
        consultory,
        doctors,
        bond_seller,
        reception,
    };
    Ok((builder.build(), layout))
}
