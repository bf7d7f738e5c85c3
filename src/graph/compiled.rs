//! Precompiled word graph files
//!
//! Layout: 4-byte magic, little-endian `u32` format version, 64 hex
//! characters of BLAKE3 checksum over the payload, then the bincode-encoded
//! node table. Loading fails loudly on any inconsistency; a graph is either
//! fully valid or not returned at all.

use std::path::Path;

use super::word_graph::{GraphNode, ROOT, WordGraph};
use crate::error::LoadError;

const MAGIC: &[u8; 4] = b"ZDWG";
const FORMAT_VERSION: u32 = 1;
const CHECKSUM_LEN: usize = 64;
const HEADER_LEN: usize = MAGIC.len() + 4 + CHECKSUM_LEN;

/// Hex BLAKE3 checksum of a graph's encoded node table
///
/// # Errors
/// Returns an error if the node table cannot be encoded.
pub fn checksum(graph: &WordGraph) -> Result<String, LoadError> {
    let payload = bincode::serialize(graph.nodes())?;
    Ok(blake3::hash(&payload).to_hex().to_string())
}

/// Encode a graph into the compiled file format
///
/// # Errors
/// Returns an error if the node table cannot be encoded.
pub fn to_bytes(graph: &WordGraph) -> Result<Vec<u8>, LoadError> {
    let payload = bincode::serialize(graph.nodes())?;
    let hash = blake3::hash(&payload).to_hex();

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(hash.as_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decode a compiled graph, optionally checking it against a known checksum
///
/// # Errors
/// Returns `LoadError::InvalidGraph` for a bad header or node table,
/// `LoadError::ChecksumMismatch` when the payload does not hash to the
/// embedded or expected checksum.
pub fn from_bytes(bytes: &[u8], expected_checksum: Option<&str>) -> Result<WordGraph, LoadError> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(LoadError::InvalidGraph("missing graph header".into()));
    }

    let mut version = [0u8; 4];
    version.copy_from_slice(&bytes[4..8]);
    let version = u32::from_le_bytes(version);
    if version != FORMAT_VERSION {
        return Err(LoadError::IncompatibleVersion {
            found: version,
            expected: FORMAT_VERSION,
        });
    }

    let embedded = String::from_utf8_lossy(&bytes[8..HEADER_LEN]).into_owned();
    let payload = &bytes[HEADER_LEN..];
    let actual = blake3::hash(payload).to_hex().to_string();
    if actual != embedded {
        return Err(LoadError::ChecksumMismatch {
            expected: embedded,
            actual,
        });
    }
    if let Some(expected) = expected_checksum
        && !expected.eq_ignore_ascii_case(&actual)
    {
        return Err(LoadError::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        });
    }

    let nodes: Vec<GraphNode> = bincode::deserialize(payload)?;
    validate(&nodes)?;
    Ok(WordGraph::from_nodes(nodes))
}

/// Write a compiled graph to disk
///
/// # Errors
/// Returns an error if encoding or writing fails.
pub fn save(graph: &WordGraph, path: &Path) -> Result<(), LoadError> {
    let bytes = to_bytes(graph)?;
    std::fs::write(path, bytes).map_err(|e| LoadError::from_io(path, e))?;
    log::info!(
        "Wrote compiled graph ({} words, {} nodes) to {}",
        graph.len(),
        graph.node_count(),
        path.display()
    );
    Ok(())
}

/// Read a compiled graph from disk
///
/// # Errors
/// Returns `LoadError::FileNotFound`/`Unreadable` for I/O problems and the
/// errors of [`from_bytes`] for bad content.
pub fn load(path: &Path, expected_checksum: Option<&str>) -> Result<WordGraph, LoadError> {
    let bytes = std::fs::read(path).map_err(|e| LoadError::from_io(path, e))?;
    let graph = from_bytes(&bytes, expected_checksum)?;
    log::info!(
        "Loaded compiled graph with {} words from {}",
        graph.len(),
        path.display()
    );
    Ok(graph)
}

/// Structural checks: edges in range, sorted, labelled A-Z, and no cycles
fn validate(nodes: &[GraphNode]) -> Result<(), LoadError> {
    if nodes.is_empty() {
        return Err(LoadError::InvalidGraph("graph has no root node".into()));
    }
    for (i, node) in nodes.iter().enumerate() {
        let mut prev: Option<u8> = None;
        for &(letter, target) in &node.edges {
            if !letter.is_ascii_uppercase() {
                return Err(LoadError::InvalidGraph(format!(
                    "node {i} has edge label {letter:#04x}"
                )));
            }
            if target as usize >= nodes.len() || target == ROOT {
                return Err(LoadError::InvalidGraph(format!(
                    "node {i} points at invalid node {target}"
                )));
            }
            if prev.is_some_and(|p| p >= letter) {
                return Err(LoadError::InvalidGraph(format!(
                    "node {i} has unsorted edges"
                )));
            }
            prev = Some(letter);
        }
    }

    // Three-colour DFS for cycle detection
    let mut state = vec![0u8; nodes.len()];
    let mut stack: Vec<(usize, usize)> = vec![(ROOT as usize, 0)];
    state[ROOT as usize] = 1;
    while let Some(top) = stack.last_mut() {
        let (node, edge) = *top;
        if let Some(&(_, target)) = nodes[node].edges.get(edge) {
            top.1 += 1;
            let target = target as usize;
            match state[target] {
                0 => {
                    state[target] = 1;
                    stack.push((target, 0));
                }
                1 => {
                    return Err(LoadError::InvalidGraph(format!(
                        "cycle through node {target}"
                    )));
                }
                _ => {}
            }
        } else {
            state[node] = 2;
            stack.pop();
        }
    }
    Ok(())
}
