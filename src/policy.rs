use std::cmp::Ordering;

use crate::as_graph::{AsGraph, Asn};
use crate::relationship::Relationship;
use crate::route::Route;

/// The extension point for route selection and export.
///
/// Implementations receive the graph and the ASN of the AS currently
/// deciding, rather than a borrowed `&As`, so that an index-keyed
/// `AsGraph` (this crate's representation, see DESIGN.md) can still
/// resolve neighbor ASNs during comparison. A policy is expected to be
/// a pure function of its inputs — it holds no per-AS mutable state —
/// so one instance is shared across every AS by reference: callers pass
/// a single `&dyn RoutingPolicy` into `find_routes_to`/`hijack_n_hops`,
/// which thread it down to each `learn_route` call rather than storing
/// it per-node.
pub trait RoutingPolicy: Send + Sync {
    /// Filter at ingress, e.g. reject routes already containing `receiver`.
    fn accept_route(&self, graph: &AsGraph, receiver: Asn, route: &Route) -> bool;

    /// True iff `new` should replace `current` for the same destination.
    /// A total decision procedure; ties are resolved here, not by the engine.
    fn prefer_route(&self, graph: &AsGraph, receiver: Asn, current: &Route, new: &Route) -> bool;

    /// True iff a route just installed at `receiver` should be exported
    /// to neighbors of the given commercial relation.
    fn forward_to(
        &self,
        graph: &AsGraph,
        receiver: Asn,
        route: &Route,
        relation: Relationship,
    ) -> bool;
}

/// The relation `receiver` holds towards the AS that sent it `route`
/// (`route.first_hop()`, the path element just before `receiver`).
/// `Route` carries no explicit recv-relationship field, unlike the
/// teacher's per-prefix `Announcement`; this is recoverable from the path
/// itself because `receiver` is always `route.final_hop()` by
/// construction, so its predecessor on the path is exactly the neighbor
/// that forwarded the route in.
fn sender_relation(graph: &AsGraph, receiver: Asn, route: &Route) -> Option<Relationship> {
    let sender = route.first_hop()?;
    graph.get(receiver)?.relation_to(sender)
}

/// The minimum policy spec.md §4.1 requires: loop prevention, shortest-path
/// selection with a commercial tie-break (customer > peer > provider) and
/// a deterministic lowest-ASN tie-break, and standard valley-free export.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl DefaultPolicy {
    fn relation_rank(rel: Relationship) -> u8 {
        match rel {
            Relationship::Customer => 2,
            Relationship::Peer => 1,
            Relationship::Provider => 0,
        }
    }
}

impl RoutingPolicy for DefaultPolicy {
    fn accept_route(&self, _graph: &AsGraph, _receiver: Asn, route: &Route) -> bool {
        !route.contains_cycle()
    }

    fn prefer_route(&self, graph: &AsGraph, receiver: Asn, current: &Route, new: &Route) -> bool {
        match new.length().cmp(&current.length()) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => {
                let cur_rank = sender_relation(graph, receiver, current)
                    .map(Self::relation_rank)
                    .unwrap_or(0);
                let new_rank = sender_relation(graph, receiver, new)
                    .map(Self::relation_rank)
                    .unwrap_or(0);
                match new_rank.cmp(&cur_rank) {
                    Ordering::Greater => true,
                    Ordering::Less => false,
                    Ordering::Equal => {
                        let cur_next = current.first_hop().unwrap_or(current.dest);
                        let new_next = new.first_hop().unwrap_or(new.dest);
                        new_next < cur_next
                    }
                }
            }
        }
    }

    fn forward_to(
        &self,
        graph: &AsGraph,
        receiver: Asn,
        route: &Route,
        relation: Relationship,
    ) -> bool {
        if route.length() < 2 {
            // The self-route is never exported.
            return false;
        }
        match sender_relation(graph, receiver, route) {
            Some(Relationship::Customer) => true,
            _ => relation == Relationship::Customer,
        }
    }
}

/// A Route Origin Validation policy: identical to [`DefaultPolicy`] except
/// it also rejects routes flagged `origin_invalid` at ingress.
///
/// Demonstrates the pluggability contract spec.md §4.1 describes without
/// overreaching into the "specific routing policies themselves" that
/// spec.md §1 marks out of scope — this is not a full ROV deployment
/// model (no partial-adoption bookkeeping, no RPKI record store), just
/// the one-predicate override the default policy's contract invites.
/// Grounded on the teacher's `policy_extensions::rov::ROVPolicy`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RovPolicy;

impl RoutingPolicy for RovPolicy {
    fn accept_route(&self, graph: &AsGraph, receiver: Asn, route: &Route) -> bool {
        !route.origin_invalid && DefaultPolicy.accept_route(graph, receiver, route)
    }

    fn prefer_route(&self, graph: &AsGraph, receiver: Asn, current: &Route, new: &Route) -> bool {
        DefaultPolicy.prefer_route(graph, receiver, current, new)
    }

    fn forward_to(
        &self,
        graph: &AsGraph,
        receiver: Asn,
        route: &Route,
        relation: Relationship,
    ) -> bool {
        DefaultPolicy.forward_to(graph, receiver, route, relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::as_graph::AsGraph;

    fn triangle() -> AsGraph {
        // 1, 2, 3 all mutual peers.
        let mut g = AsGraph::new();
        g.add_as(1);
        g.add_as(2);
        g.add_as(3);
        g.add_edge(1, 2, Relationship::Peer).unwrap();
        g.add_edge(1, 3, Relationship::Peer).unwrap();
        g.add_edge(2, 3, Relationship::Peer).unwrap();
        g
    }

    #[test]
    fn accept_rejects_routes_that_already_looped_through_the_receiver() {
        let g = triangle();
        let policy = DefaultPolicy;
        // 2 already appears on the path once; arriving at 2 again closes a loop.
        let looped = Route::new(1, vec![1, 2, 3, 2], false, false, false);
        assert!(!policy.accept_route(&g, 2, &looped));

        let clean = Route::new(1, vec![1, 2, 3], false, false, false);
        assert!(policy.accept_route(&g, 3, &clean));
    }

    #[test]
    fn prefer_shorter_path() {
        let g = triangle();
        let policy = DefaultPolicy;
        let short = Route::new(1, vec![1, 2], false, false, false);
        let long = Route::new(1, vec![1, 3, 2], false, false, false);
        assert!(!policy.prefer_route(&g, 2, &short, &long));
        assert!(policy.prefer_route(&g, 2, &long, &short));
    }

    #[test]
    fn peer_route_not_exported_to_peer() {
        let g = triangle();
        let policy = DefaultPolicy;
        // route.final_hop() == 2, route.first_hop() == 1, relation(2, 1) == Peer
        let route = Route::new(1, vec![1, 2], false, false, false);
        assert!(!policy.forward_to(&g, 2, &route, Relationship::Peer));
        assert!(!policy.forward_to(&g, 2, &route, Relationship::Provider));
    }

    #[test]
    fn rov_policy_rejects_origin_invalid_routes_default_accepts() {
        let g = triangle();
        let route = Route::new(1, vec![1, 2], true, false, false);
        assert!(DefaultPolicy.accept_route(&g, 3, &route));
        assert!(!RovPolicy.accept_route(&g, 3, &route));
    }
}
