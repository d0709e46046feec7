use std::fmt;

/// A commercial relationship between two ASes, always stated from the
/// local AS's point of view: if A considers B a `Customer`, B considers
/// A a `Provider`. `Peer` is symmetric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Relationship {
    Customer,
    Peer,
    Provider,
}

impl Relationship {
    /// The relation the other endpoint of the edge sees.
    pub fn invert(&self) -> Self {
        match self {
            Relationship::Customer => Relationship::Provider,
            Relationship::Provider => Relationship::Customer,
            Relationship::Peer => Relationship::Peer,
        }
    }

    /// All three relationship kinds, in the order export rules are
    /// usually checked (customers first, since they are always
    /// reachable).
    pub const ALL: [Relationship; 3] = [
        Relationship::Customer,
        Relationship::Peer,
        Relationship::Provider,
    ];
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Relationship::Customer => "CUSTOMER",
            Relationship::Peer => "PEER",
            Relationship::Provider => "PROVIDER",
        };
        write!(f, "{}", s)
    }
}
