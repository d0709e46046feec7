//! The as-rel loader (spec.md §4.7/§6): parses lines of the form
//! `a|b|k` where `k` is `-1` (a is provider of b) or `0` (a and b are
//! peers). `#`-prefixed lines are comments. Duplicate edges are
//! permitted; the last occurrence wins.
//!
//! This is the one piece of spec.md §4.7 ("the loader") actually in
//! scope: spec.md §1 only excludes *acquisition* of CAIDA data (the
//! network download, bzip2 decompression, and on-disk caching the
//! teacher's `as_graph_generators::caida` module performs) and
//! statistics rendering, not the line-format parser itself, which §6
//! lists as a public operation ("Load graph from a path").

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use log::warn;

use crate::as_graph::AsGraph;
use crate::error::SimError;
use crate::relationship::Relationship;

/// Parses as-rel lines from any reader into a new [`AsGraph`].
pub fn load_from_reader<R: Read>(reader: R, source: &str) -> Result<AsGraph, SimError> {
    let buf = BufReader::new(reader);
    let mut graph = AsGraph::new();

    for (lineno, line) in buf.lines().enumerate() {
        let line = line.map_err(|e| SimError::InvalidAsRelFile {
            path: source.to_string(),
            detail: format!("line {}: {}", lineno + 1, e),
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = trimmed.split('|').collect();
        if parts.len() != 3 {
            return Err(SimError::InvalidAsRelFile {
                path: source.to_string(),
                detail: format!("line {}: expected 3 fields, got {}: {:?}", lineno + 1, parts.len(), trimmed),
            });
        }

        let as1: u32 = parts[0].trim().parse().map_err(|_| SimError::InvalidAsRelFile {
            path: source.to_string(),
            detail: format!("line {}: non-integer ASN {:?}", lineno + 1, parts[0]),
        })?;
        let as2: u32 = parts[1].trim().parse().map_err(|_| SimError::InvalidAsRelFile {
            path: source.to_string(),
            detail: format!("line {}: non-integer ASN {:?}", lineno + 1, parts[1]),
        })?;
        let code: i32 = parts[2].trim().parse().map_err(|_| SimError::InvalidAsRelFile {
            path: source.to_string(),
            detail: format!("line {}: non-integer relation code {:?}", lineno + 1, parts[2]),
        })?;

        match code {
            // as1 is provider of as2: as1 views as2 as a customer.
            -1 => {
                graph
                    .add_edge(as1, as2, Relationship::Customer)
                    .map_err(|detail| SimError::InvalidAsRelFile {
                        path: source.to_string(),
                        detail: format!("line {}: {}", lineno + 1, detail),
                    })?;
            }
            0 => {
                graph
                    .add_edge(as1, as2, Relationship::Peer)
                    .map_err(|detail| SimError::InvalidAsRelFile {
                        path: source.to_string(),
                        detail: format!("line {}: {}", lineno + 1, detail),
                    })?;
            }
            other => {
                return Err(SimError::InvalidAsRelFile {
                    path: source.to_string(),
                    detail: format!("line {}: unknown relation code {}", lineno + 1, other),
                });
            }
        }
    }

    if graph.is_empty() {
        warn!("{}: loaded an empty AS graph", source);
    }
    Ok(graph)
}

/// Parses an as-rel file at `path` into a new [`AsGraph`].
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<AsGraph, SimError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SimError::InvalidAsRelFile {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;
    load_from_reader(file, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn load(text: &str) -> Result<AsGraph, SimError> {
        load_from_reader(Cursor::new(text), "<test>")
    }

    #[test]
    fn parses_provider_customer_and_peer_lines() {
        let g = load("1|2|-1\n2|3|0\n").unwrap();
        assert_eq!(g.get(1).unwrap().customers, vec![2]);
        assert_eq!(g.get(2).unwrap().providers, vec![1]);
        assert_eq!(g.get(2).unwrap().peers, vec![3]);
        assert_eq!(g.get(3).unwrap().peers, vec![2]);
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let g = load("# comment\n\n1|2|-1\n").unwrap();
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn duplicate_edge_last_occurrence_wins() {
        let g = load("1|2|0\n1|2|-1\n").unwrap();
        assert_eq!(g.get(1).unwrap().customers, vec![2]);
        assert!(g.get(1).unwrap().peers.is_empty());
    }

    #[test]
    fn malformed_line_is_an_error() {
        let err = load("1|2\n").unwrap_err();
        assert!(matches!(err, SimError::InvalidAsRelFile { .. }));
    }

    #[test]
    fn non_integer_field_is_an_error() {
        let err = load("a|2|-1\n").unwrap_err();
        assert!(matches!(err, SimError::InvalidAsRelFile { .. }));
    }

    #[test]
    fn unknown_relation_code_is_an_error() {
        let err = load("1|2|5\n").unwrap_err();
        assert!(matches!(err, SimError::InvalidAsRelFile { .. }));
    }
}
