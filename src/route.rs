use std::collections::HashSet;
use std::fmt;

use crate::as_graph::Asn;

/// An immutable BGP path announcement carrying security flags.
///
/// `dest` equals `path[0]` for legitimate routes, but may differ under a
/// hijack (the forged path's origin is the attacker, while `dest` is
/// still the victim's ASN the route is installed against).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Route {
    pub dest: Asn,
    pub path: Vec<Asn>,
    /// True iff the origin is expected to publish an RPKI record but
    /// does not.
    pub origin_invalid: bool,
    /// True iff the first hop is expected to publish a path-end record
    /// but does not.
    pub path_end_invalid: bool,
    /// True iff every AS on the path had BGPsec enabled when it signed.
    pub authenticated: bool,
}

impl Route {
    pub fn new(
        dest: Asn,
        path: Vec<Asn>,
        origin_invalid: bool,
        path_end_invalid: bool,
        authenticated: bool,
    ) -> Self {
        Route {
            dest,
            path,
            origin_invalid,
            path_end_invalid,
            authenticated,
        }
    }

    pub fn length(&self) -> usize {
        self.path.len()
    }

    pub fn origin(&self) -> Option<Asn> {
        self.path.first().copied()
    }

    /// The upstream AS the origin announced to. Undefined (`None`) when
    /// the path is shorter than two hops.
    pub fn first_hop(&self) -> Option<Asn> {
        if self.path.len() < 2 {
            None
        } else {
            self.path.get(self.path.len() - 2).copied()
        }
    }

    pub fn final_hop(&self) -> Option<Asn> {
        self.path.last().copied()
    }

    pub fn contains_cycle(&self) -> bool {
        let unique: HashSet<Asn> = self.path.iter().copied().collect();
        unique.len() != self.path.len()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path_str = self
            .path
            .iter()
            .map(|asn| asn.to_string())
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{}", path_str)?;
        let mut flags = Vec::new();
        if self.origin_invalid {
            flags.push("origin_invalid");
        }
        if self.path_end_invalid {
            flags.push("path_end_invalid");
        }
        if self.authenticated {
            flags.push("authenticated");
        }
        if !flags.is_empty() {
            write!(f, " {}", flags.join(" "))?;
        }
        Ok(())
    }
}
