//! Clinic network components
//!
//! Servers, consultories, routing strategies and arrival streams, all acting
//! on a shared [`Network`] world driven by a `clinic_core::Simulation`.
//!
//! - [`Server`]: a station with a FIFO resource, a service rate and a stat log
//! - [`Consultory`]: a server whose work is routing its client downstream
//! - [`RoutingStrategy`]: [`ClinicRouting`] and [`FixedRoute`]
//! - [`ArrivalGenerator`]: endless Poisson arrivals into an entry server
//! - [`NetworkBuilder`]: validated construction of all of the above

pub mod arrivals;
pub mod builder;
pub mod client;
pub mod consultory;
pub mod network;
pub mod routing;
pub mod server;

pub use arrivals::ArrivalGenerator;
pub use builder::{validate_positive, validate_range, NetworkBuilder};
pub use client::Client;
pub use consultory::{Consultory, RouteProcess};
pub use network::Network;
pub use routing::{ClinicRouting, FixedRoute, Itinerary, RoutingStrategy};
pub use server::{AttendProcess, Server};
