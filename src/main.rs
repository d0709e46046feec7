//! A single illustrative run: build a small topology, propagate routes
//! to a destination, inject a hijack, and print the resulting routing
//! tables. Not a general-purpose CLI (spec.md marks argument-parsed
//! front-ends out of scope) — see the teacher's own `main.rs` for the
//! shape this is trimmed from.

use bgpsimulator::{find_routes_to, hijack_n_hops, AsGraph, DefaultPolicy, Relationship};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    env_logger::init();

    let mut graph = build_topology();
    let policy = DefaultPolicy;

    println!("Propagating routes to AS 1...");
    find_routes_to(&mut graph, &policy, 1).expect("AS 1 exists in this topology");
    print_routing_tables(&graph, 1);

    println!("\nInjecting a 2-hop hijack of AS 1 from AS 5...");
    let mut rng = StdRng::seed_from_u64(42);
    hijack_n_hops(&mut graph, &policy, 1, 5, 2, &mut rng).expect("valid hijack parameters");
    print_routing_tables(&graph, 1);
}

/// AS 1 is a stub dual-homed to providers 2 and 3; 2 and 3 are peers of
/// each other and both customers of Tier-1 AS 4; AS 5 is a second stub
/// of AS 4, standing in as the hijacker.
fn build_topology() -> AsGraph {
    let mut graph = AsGraph::new();
    graph.add_edge(2, 1, Relationship::Customer).unwrap();
    graph.add_edge(3, 1, Relationship::Customer).unwrap();
    graph.add_edge(2, 3, Relationship::Peer).unwrap();
    graph.add_edge(4, 2, Relationship::Customer).unwrap();
    graph.add_edge(4, 3, Relationship::Customer).unwrap();
    graph.add_edge(4, 5, Relationship::Customer).unwrap();
    graph
}

fn print_routing_tables(graph: &AsGraph, dest: u32) {
    let mut asns: Vec<u32> = graph.asns().collect();
    asns.sort_unstable();
    for asn in asns {
        let as_obj = graph.get(asn).unwrap();
        match as_obj.routing_table.get(&dest) {
            Some(route) if asn != dest => println!("  AS {}: {}", asn, route),
            _ => {}
        }
    }
}
