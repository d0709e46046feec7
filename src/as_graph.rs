use std::collections::{HashMap, HashSet};

use crate::relationship::Relationship;
use crate::route::Route;

/// Unsigned AS identifier. 32 bits is sufficient for public ASNs.
pub type Asn = u32;

/// An AS node: its neighbors by commercial relation, its routing table,
/// and its security posture. Neighbor links are set at construction and
/// never mutated afterward (spec.md §3 Lifecycle); the routing table is
/// the only field propagation mutates.
#[derive(Debug, Clone)]
pub struct As {
    pub asn: Asn,
    pub customers: Vec<Asn>,
    pub peers: Vec<Asn>,
    pub providers: Vec<Asn>,
    pub publishes_rpki: bool,
    pub publishes_path_end: bool,
    pub bgpsec_enabled: bool,
    pub routing_table: HashMap<Asn, Route>,
}

impl As {
    pub fn new(asn: Asn) -> Self {
        let mut as_obj = As {
            asn,
            customers: Vec::new(),
            peers: Vec::new(),
            providers: Vec::new(),
            publishes_rpki: false,
            publishes_path_end: false,
            bgpsec_enabled: false,
            routing_table: HashMap::new(),
        };
        as_obj.reset_routing_table();
        as_obj
    }

    pub fn get_neighbors(&self, rel: Relationship) -> &[Asn] {
        match rel {
            Relationship::Customer => &self.customers,
            Relationship::Peer => &self.peers,
            Relationship::Provider => &self.providers,
        }
    }

    /// Every neighbor regardless of relation.
    pub fn neighbor_asns(&self) -> impl Iterator<Item = Asn> + '_ {
        self.customers
            .iter()
            .chain(self.peers.iter())
            .chain(self.providers.iter())
            .copied()
    }

    /// This AS's relation towards `neighbor`, if one exists.
    pub fn relation_to(&self, neighbor: Asn) -> Option<Relationship> {
        if self.customers.contains(&neighbor) {
            Some(Relationship::Customer)
        } else if self.peers.contains(&neighbor) {
            Some(Relationship::Peer)
        } else if self.providers.contains(&neighbor) {
            Some(Relationship::Provider)
        } else {
            None
        }
    }

    pub fn is_stub(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn neighbor_counts_by_relation(&self) -> HashMap<Relationship, usize> {
        let mut counts = HashMap::new();
        counts.insert(Relationship::Customer, self.customers.len());
        counts.insert(Relationship::Peer, self.peers.len());
        counts.insert(Relationship::Provider, self.providers.len());
        counts
    }

    /// Construct the first leg of a route this AS originates: a route
    /// for `self.asn` whose path already contains the intended receiver,
    /// so that on receipt the receiver is already `final_hop`.
    pub fn originate_route(&self, next_hop: Asn) -> Route {
        Route::new(self.asn, vec![self.asn, next_hop], false, false, self.bgpsec_enabled)
    }

    /// Construct the route that results from forwarding `route` one more
    /// hop to `next_hop`. `next_hop_bgpsec_enabled` is the security
    /// posture of the AS the route is being forwarded to.
    pub fn forward_route(route: &Route, next_hop: Asn, next_hop_bgpsec_enabled: bool) -> Route {
        let mut path = route.path.clone();
        path.push(next_hop);
        Route::new(
            route.dest,
            path,
            route.origin_invalid,
            route.path_end_invalid,
            route.authenticated && next_hop_bgpsec_enabled,
        )
    }

    /// Clears the routing table and reinstalls the self-route.
    pub fn reset_routing_table(&mut self) {
        self.routing_table.clear();
        self.routing_table.insert(
            self.asn,
            Route::new(self.asn, vec![self.asn], false, false, true),
        );
    }
}

/// Owns all AS nodes in the topology. Edges are implicit in each `As`'s
/// neighbor lists; the graph holds no separate edge set, matching
/// spec.md §3.
#[derive(Debug, Clone, Default)]
pub struct AsGraph {
    as_dict: HashMap<Asn, As>,
}

impl AsGraph {
    pub fn new() -> Self {
        AsGraph {
            as_dict: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_dict.is_empty()
    }

    pub fn get(&self, asn: Asn) -> Option<&As> {
        self.as_dict.get(&asn)
    }

    pub fn get_mut(&mut self, asn: Asn) -> Option<&mut As> {
        self.as_dict.get_mut(&asn)
    }

    pub fn contains(&self, asn: Asn) -> bool {
        self.as_dict.contains_key(&asn)
    }

    pub fn iter(&self) -> impl Iterator<Item = &As> {
        self.as_dict.values()
    }

    pub fn asns(&self) -> impl Iterator<Item = Asn> + '_ {
        self.as_dict.keys().copied()
    }

    /// Inserts a bare AS node with no neighbors, if it is not already
    /// present. Returns `false` if it already existed.
    pub fn add_as(&mut self, asn: Asn) -> bool {
        if self.as_dict.contains_key(&asn) {
            return false;
        }
        self.as_dict.insert(asn, As::new(asn));
        true
    }

    /// Adds `a`/`b` as bare nodes if absent, then installs `relation` on
    /// `a`'s neighbor list towards `b` and the inverse relation on `b`'s
    /// towards `a`. Replaces any prior relation between the two (the
    /// loader's "last occurrence wins" rule, spec.md §4.7).
    pub fn add_edge(&mut self, a: Asn, b: Asn, relation: Relationship) -> Result<(), String> {
        if a == b {
            return Err(format!("AS {} cannot have a relation with itself", a));
        }
        self.add_as(a);
        self.add_as(b);
        self.remove_edge(a, b);
        install_relation(self.as_dict.get_mut(&a).unwrap(), b, relation);
        install_relation(self.as_dict.get_mut(&b).unwrap(), a, relation.invert());
        Ok(())
    }

    fn remove_edge(&mut self, a: Asn, b: Asn) {
        if let Some(as_a) = self.as_dict.get_mut(&a) {
            as_a.customers.retain(|&x| x != b);
            as_a.peers.retain(|&x| x != b);
            as_a.providers.retain(|&x| x != b);
        }
        if let Some(as_b) = self.as_dict.get_mut(&b) {
            as_b.customers.retain(|&x| x != a);
            as_b.peers.retain(|&x| x != a);
            as_b.providers.retain(|&x| x != a);
        }
    }

    pub fn clear_routing_tables(&mut self) {
        for as_obj in self.as_dict.values_mut() {
            as_obj.reset_routing_table();
        }
    }

    /// ASes sorted descending by customer-neighbor count, the `n` largest.
    pub fn identify_top_isps(&self, n: usize) -> Vec<Asn> {
        let mut by_customers: Vec<(Asn, usize)> = self
            .as_dict
            .values()
            .map(|a| (a.asn, a.customers.len()))
            .collect();
        by_customers.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        by_customers.into_iter().take(n).map(|(asn, _)| asn).collect()
    }

    /// The union of providers of every AS in `ids`.
    pub fn get_providers(&self, ids: &[Asn]) -> HashSet<Asn> {
        let mut providers = HashSet::new();
        for &id in ids {
            if let Some(as_obj) = self.get(id) {
                providers.extend(as_obj.providers.iter().copied());
            }
        }
        providers
    }
}

fn install_relation(as_obj: &mut As, neighbor: Asn, relation: Relationship) {
    match relation {
        Relationship::Customer => as_obj.customers.push(neighbor),
        Relationship::Peer => as_obj.peers.push(neighbor),
        Relationship::Provider => as_obj.providers.push(neighbor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_routing_table_installs_self_route() {
        let a = As::new(42);
        let route = a.routing_table.get(&42).unwrap();
        assert_eq!(route.path, vec![42]);
        assert_eq!(a.routing_table.len(), 1);
    }

    #[test]
    fn add_edge_is_symmetric() {
        let mut g = AsGraph::new();
        g.add_edge(1, 2, Relationship::Customer).unwrap();
        assert_eq!(g.get(1).unwrap().customers, vec![2]);
        assert_eq!(g.get(2).unwrap().providers, vec![1]);
    }

    #[test]
    fn add_edge_peer_is_mirrored_as_peer() {
        let mut g = AsGraph::new();
        g.add_edge(1, 2, Relationship::Peer).unwrap();
        assert_eq!(g.get(1).unwrap().peers, vec![2]);
        assert_eq!(g.get(2).unwrap().peers, vec![1]);
    }

    #[test]
    fn duplicate_edge_last_wins() {
        let mut g = AsGraph::new();
        g.add_edge(1, 2, Relationship::Peer).unwrap();
        g.add_edge(1, 2, Relationship::Customer).unwrap();
        assert_eq!(g.get(1).unwrap().customers, vec![2]);
        assert!(g.get(1).unwrap().peers.is_empty());
        assert_eq!(g.get(2).unwrap().providers, vec![1]);
        assert!(g.get(2).unwrap().peers.is_empty());
    }

    #[test]
    fn top_isps_by_customer_count() {
        let mut g = AsGraph::new();
        g.add_as(0);
        for i in 1..=9 {
            g.add_edge(0, i, Relationship::Customer).unwrap();
        }
        assert_eq!(g.identify_top_isps(1), vec![0]);
        assert_eq!(g.get(0).unwrap().customers.len(), 9);
    }

    #[test]
    fn originate_and_forward_route() {
        let mut a = As::new(1);
        a.bgpsec_enabled = true;
        let r = a.originate_route(2);
        assert_eq!(r.path, vec![1, 2]);
        assert_eq!(r.dest, 1);
        assert!(r.authenticated);

        let r2 = As::forward_route(&r, 3, false);
        assert_eq!(r2.path, vec![1, 2, 3]);
        assert!(!r2.authenticated);
    }
}
