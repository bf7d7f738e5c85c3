//! Compile command
//!
//! Writes a loaded lexicon's word graph to a compiled graph file.

use std::path::{Path, PathBuf};

use crate::engine::WordEngine;
use crate::error::LoadError;
use crate::graph::compiled;

pub struct CompileResult {
    pub lexicon: String,
    pub path: PathBuf,
    pub words: usize,
    pub nodes: usize,
    /// Checksum to pass back when importing the file
    pub checksum: String,
}

/// # Errors
/// Returns `LoadError::UnknownLexicon`, or the error from writing the file.
pub fn compile_graph(engine: &WordEngine, lexicon: &str, path: &Path) -> Result<CompileResult, LoadError> {
    let graph = engine
        .lexicon(lexicon)
        .ok_or_else(|| LoadError::UnknownLexicon(lexicon.to_string()))?
        .graph();
    compiled::save(graph, path)?;
    Ok(CompileResult {
        lexicon: lexicon.to_string(),
        path: path.to_path_buf(),
        words: graph.len(),
        nodes: graph.node_count(),
        checksum: compiled::checksum(graph)?,
    })
}
