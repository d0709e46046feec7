//! The route propagation engine: `find_routes_to` and `hijack_n_hops`.
//!
//! Both drive the same FIFO work queue to a fixpoint (spec.md §4.3/§4.4).
//! `learn_route` lives here rather than on `As` itself because it needs
//! simultaneous access to the receiving AS's mutable routing table and to
//! the rest of the graph (to resolve neighbor ASNs for the policy) — an
//! index-keyed `AsGraph` can't hand out `&mut As` and `&AsGraph` for the
//! same underlying map at once, so the orchestration is expressed as a
//! free function over `&mut AsGraph` instead of a method on a borrowed
//! `&mut As`. This mirrors the teacher's own `SimulationEngine`, which
//! clones the deciding `AS` to sidestep the identical borrow conflict
//! (`src/engine.rs::process_asns_for_relationship` in the teacher crate).

use std::collections::VecDeque;

use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::as_graph::{As, AsGraph, Asn};
use crate::error::SimError;
use crate::policy::RoutingPolicy;
use crate::relationship::Relationship;
use crate::route::Route;

/// Have `receiver` consider `route` for installation, per spec.md §4.2:
/// 1. Never install a route to oneself.
/// 2. Reject if the policy doesn't accept it.
/// 3. Reject if an existing route for the destination is preferred.
/// 4. Install the route (replacing any prior entry).
/// 5. Return the neighbors the route should be forwarded to.
fn learn_route(
    graph: &mut AsGraph,
    policy: &dyn RoutingPolicy,
    receiver: Asn,
    route: Route,
) -> Vec<Asn> {
    if route.dest == receiver {
        return Vec::new();
    }
    if !policy.accept_route(graph, receiver, &route) {
        return Vec::new();
    }

    let current = graph.get(receiver).and_then(|a| a.routing_table.get(&route.dest));
    if let Some(current) = current {
        if !policy.prefer_route(graph, receiver, current, &route) {
            return Vec::new();
        }
    }

    graph
        .get_mut(receiver)
        .expect("receiver must exist to learn a route")
        .routing_table
        .insert(route.dest, route.clone());

    let mut forward_to = Vec::new();
    for &relation in &Relationship::ALL {
        if policy.forward_to(graph, receiver, &route, relation) {
            let neighbors = graph
                .get(receiver)
                .expect("receiver must exist")
                .get_neighbors(relation);
            forward_to.extend(neighbors.iter().copied());
        }
    }
    forward_to
}

fn bgpsec_enabled(graph: &AsGraph, asn: Asn) -> bool {
    graph.get(asn).map(|a| a.bgpsec_enabled).unwrap_or(false)
}

/// Drains `queue`, learning and forwarding each route until no AS has
/// anything left to forward. Terminates because every step either is
/// rejected (no work added) or strictly improves some AS's route for the
/// destination under a total, cycle-free preference order over a finite
/// state space (spec.md §4.3).
fn run_to_fixpoint(graph: &mut AsGraph, policy: &dyn RoutingPolicy, mut queue: VecDeque<(Asn, Route)>) {
    while let Some((receiver, route)) = queue.pop_front() {
        trace!("{} considering route {}", receiver, route);
        for neighbor in learn_route(graph, policy, receiver, route.clone()) {
            let forwarded = As::forward_route(&route, neighbor, bgpsec_enabled(graph, neighbor));
            queue.push_back((neighbor, forwarded));
        }
    }
}

/// Synchronous fixpoint propagation of routes towards `target`, flooding
/// outward along permitted exports (spec.md §4.3).
pub fn find_routes_to(
    graph: &mut AsGraph,
    policy: &dyn RoutingPolicy,
    target: Asn,
) -> Result<(), SimError> {
    if !graph.contains(target) {
        return Err(SimError::InvalidArgument(format!(
            "unknown target AS {}",
            target
        )));
    }
    debug!("propagating routes to AS {}", target);

    let neighbors: Vec<Asn> = graph
        .get(target)
        .expect("checked above")
        .neighbor_asns()
        .collect();

    let mut queue = VecDeque::new();
    for neighbor in neighbors {
        let route = graph
            .get(target)
            .expect("checked above")
            .originate_route(neighbor);
        queue.push_back((neighbor, route));
    }

    run_to_fixpoint(graph, policy, queue);
    Ok(())
}

/// Seeds a forged route for `victim.id` at `attacker` and re-propagates
/// it, per spec.md §4.4. The attacker never installs the forged route in
/// its own table — it only forwards it to its neighbors — so `attacker`'s
/// pre-existing entry for `victim` (if any) is left untouched.
pub fn hijack_n_hops(
    graph: &mut AsGraph,
    policy: &dyn RoutingPolicy,
    victim: Asn,
    attacker: Asn,
    n: i64,
    rng: &mut impl Rng,
) -> Result<(), SimError> {
    if n < 0 {
        return Err(SimError::InvalidArgument(
            "hijack hop count must be non-negative".to_string(),
        ));
    }
    if !graph.contains(victim) {
        return Err(SimError::InvalidArgument(format!("unknown victim AS {}", victim)));
    }
    if !graph.contains(attacker) {
        return Err(SimError::InvalidArgument(format!(
            "unknown attacker AS {}",
            attacker
        )));
    }

    let path = match n {
        0 => vec![attacker],
        1 => vec![victim, attacker],
        _ => {
            let middle_pool: Vec<Asn> = graph
                .asns()
                .filter(|&asn| asn != victim && asn != attacker)
                .collect();
            let needed = (n - 1) as usize;
            if middle_pool.len() < needed {
                return Err(SimError::InvalidArgument(format!(
                    "not enough eligible middle ASes: need {}, have {}",
                    needed,
                    middle_pool.len()
                )));
            }
            let middle: Vec<Asn> = middle_pool
                .choose_multiple(rng, needed)
                .copied()
                .collect();
            let mut path = Vec::with_capacity(needed + 2);
            path.push(victim);
            path.extend(middle);
            path.push(attacker);
            path
        }
    };

    let bad_route = Route::new(victim, path, n == 0, n <= 1, false);

    debug!(
        "hijacking AS {} from AS {} with a {}-hop forged path",
        victim, attacker, n
    );

    let attacker_neighbors: Vec<Asn> = graph
        .get(attacker)
        .expect("checked above")
        .neighbor_asns()
        .collect();

    let mut queue = VecDeque::new();
    for neighbor in attacker_neighbors {
        let forwarded = As::forward_route(&bad_route, neighbor, bgpsec_enabled(graph, neighbor));
        queue.push_back((neighbor, forwarded));
    }

    run_to_fixpoint(graph, policy, queue);
    Ok(())
}
