//! Clients travelling through the network

use clinic_core::{ClientId, SimTime};
use serde::Serialize;

/// A client created by the arrival generator.
///
/// `done` flips once the last stage of the client's itinerary exits. Clients
/// caught mid-journey by the horizon keep `done == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Client {
    pub id: ClientId,
    pub created_at: SimTime,
    pub done: bool,
}

impl Client {
    pub fn new(id: ClientId, created_at: SimTime) -> Self {
        Self {
            id,
            created_at,
            done: false,
        }
    }
}
