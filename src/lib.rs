//! A BGP security-extension routing simulator: AS-graph route
//! propagation, RPKI/path-end/BGPsec validity flags, prefix-hijack
//! injection, and valley-free reachability analysis.

pub mod as_graph;
pub mod engine;
pub mod error;
pub mod loader;
pub mod policy;
pub mod reachability;
pub mod relationship;
pub mod report;
pub mod route;

pub use as_graph::{As, AsGraph, Asn};
pub use engine::{find_routes_to, hijack_n_hops};
pub use error::SimError;
pub use loader::{load_from_path, load_from_reader};
pub use policy::{DefaultPolicy, RoutingPolicy, RovPolicy};
pub use reachability::{
    any_customer_provider_cycles, determine_reachability_all, determine_reachability_one,
};
pub use relationship::Relationship;
pub use report::{write_connectivity_file, write_routing_table_snapshot};
pub use route::Route;
