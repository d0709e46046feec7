//! Persisted-state output (spec.md §6): writes reachability counts to a
//! simple text file, one `<ASN> <count>` line per AS, sorted by ASN for
//! a diffable, deterministic file.
//!
//! Grounded on the original's `check_connectivity` CLI command, which
//! writes the same per-AS counts after a numpy/tqdm dense-matrix
//! computation; that matrix machinery is out of scope here (spec.md §9
//! settles the reachability algorithm on the bitset/auxiliary-graph
//! approach in `reachability.rs` instead), but the output contract it
//! produced is kept.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::as_graph::{Asn, AsGraph};
use crate::error::SimError;
use crate::route::Route;

/// Writes `counts` to `path` as `<ASN> <count>` lines, sorted by ASN.
pub fn write_connectivity_file<P: AsRef<Path>>(
    path: P,
    counts: &HashMap<Asn, usize>,
) -> Result<(), SimError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| SimError::Io {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;
    let mut writer = BufWriter::new(file);

    let mut entries: Vec<(&Asn, &usize)> = counts.iter().collect();
    entries.sort_by_key(|(asn, _)| **asn);

    for (asn, count) in entries {
        writeln!(writer, "{} {}", asn, count).map_err(|e| SimError::Io {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
    }
    Ok(())
}

/// Snapshots every AS's routing table entry for `dest`, as JSON, for
/// downstream tooling that wants structured routes rather than the flat
/// connectivity-count format above. Skips ASes with no entry for `dest`
/// (always true of `dest` itself before any route to it has converged).
pub fn write_routing_table_snapshot<P: AsRef<Path>>(
    path: P,
    graph: &AsGraph,
    dest: Asn,
) -> Result<(), SimError> {
    let path = path.as_ref();
    let mut entries: Vec<(Asn, &Route)> = graph
        .iter()
        .filter_map(|a| a.routing_table.get(&dest).map(|r| (a.asn, r)))
        .collect();
    entries.sort_by_key(|(asn, _)| *asn);
    let snapshot: HashMap<Asn, &Route> = entries.into_iter().collect();

    let file = File::create(path).map_err(|e| SimError::Io {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), &snapshot).map_err(|e| SimError::Io {
        path: path.display().to_string(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn writes_sorted_lines() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("connectivity_test_{}.txt", std::process::id()));

        let mut counts = HashMap::new();
        counts.insert(3u32, 2usize);
        counts.insert(1u32, 3usize);
        counts.insert(2u32, 1usize);

        write_connectivity_file(&path, &counts).unwrap();

        let mut contents = String::new();
        File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "1 3\n2 1\n3 2\n");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn writes_routing_table_snapshot_as_json() {
        use crate::as_graph::AsGraph;
        use crate::relationship::Relationship;

        let mut graph = AsGraph::new();
        graph.add_edge(2, 1, Relationship::Customer).unwrap();
        crate::engine::find_routes_to(&mut graph, &crate::policy::DefaultPolicy, 1).unwrap();

        let dir = std::env::temp_dir();
        let path = dir.join(format!("routing_snapshot_test_{}.json", std::process::id()));
        write_routing_table_snapshot(&path, &graph, 1).unwrap();

        let mut contents = String::new();
        File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        let parsed: HashMap<String, Route> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed["2"].path, vec![1, 2]);
        assert!(!parsed.contains_key("1"));

        std::fs::remove_file(&path).unwrap();
    }
}
