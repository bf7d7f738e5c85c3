//! Directed acyclic word graph
//!
//! A minimized trie that shares both prefixes and suffixes. Every node also
//! carries a length mask: bit `n` is set when a word ends exactly `n` letters
//! below the node. Traversals use it to prune branches that cannot produce a
//! word of the length still required.
//!
//! Nodes are immutable once built, so a graph can be shared freely between
//! concurrent readers.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::pattern::{AnagramPool, Pattern, Token};
use crate::core::{MAX_WORD_LEN, WordError, canonical_word};

/// Index of the root node
pub const ROOT: u32 = 0;

/// A node in the word graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphNode {
    /// Edges sorted by letter: (letter, target node index)
    pub edges: Vec<(u8, u32)>,
    pub is_final: bool,
    /// Bit `n` set when a word ends `n` letters below this node
    #[serde(skip)]
    pub len_mask: u32,
}

impl GraphNode {
    fn new(is_final: bool) -> Self {
        Self {
            edges: Vec::new(),
            is_final,
            len_mask: 0,
        }
    }

    #[inline]
    fn child(&self, letter: u8) -> Option<u32> {
        self.edges
            .binary_search_by_key(&letter, |&(l, _)| l)
            .ok()
            .map(|i| self.edges[i].1)
    }
}

/// Incremental builder; words must arrive in sorted order
struct GraphBuilder {
    nodes: Vec<GraphNode>,
    /// Maps minimized node signature to node index
    suffix_cache: FxHashMap<GraphNode, u32>,
    prev_word: Vec<u8>,
    active_path: Vec<u32>,
}

impl GraphBuilder {
    fn new() -> Self {
        Self {
            nodes: vec![GraphNode::new(false)],
            suffix_cache: FxHashMap::default(),
            prev_word: Vec::new(),
            active_path: vec![ROOT],
        }
    }

    fn insert(&mut self, word: &[u8]) {
        let common = self
            .prev_word
            .iter()
            .zip(word)
            .take_while(|(a, b)| a == b)
            .count();

        self.minimize(common);

        for &letter in &word[common..] {
            let idx = self.nodes.len() as u32;
            self.nodes.push(GraphNode::new(false));
            if let Some(&parent) = self.active_path.last() {
                self.nodes[parent as usize].edges.push((letter, idx));
            }
            self.active_path.push(idx);
        }

        if let Some(&last) = self.active_path.last() {
            self.nodes[last as usize].is_final = true;
        }
        self.prev_word = word.to_vec();
    }

    /// Replace nodes below `down_to` on the active path with equivalent
    /// already-minimized nodes
    fn minimize(&mut self, down_to: usize) {
        let keep = down_to + 1;
        while self.active_path.len() > keep {
            let Some(child) = self.active_path.pop() else {
                break;
            };
            let Some(&parent) = self.active_path.last() else {
                break;
            };
            let signature = self.nodes[child as usize].clone();
            if let Some(&existing) = self.suffix_cache.get(&signature) {
                if let Some(edge) = self.nodes[parent as usize]
                    .edges
                    .iter_mut()
                    .rev()
                    .find(|(_, target)| *target == child)
                {
                    edge.1 = existing;
                }
            } else {
                self.suffix_cache.insert(signature, child);
            }
        }
    }

    fn finish(mut self) -> Vec<GraphNode> {
        self.minimize(0);
        compact(&self.nodes)
    }
}

/// Drop nodes orphaned by minimization and renumber in visiting order
fn compact(nodes: &[GraphNode]) -> Vec<GraphNode> {
    let mut remap: FxHashMap<u32, u32> = FxHashMap::default();
    let mut order = vec![ROOT];
    remap.insert(ROOT, 0);
    let mut i = 0;
    while i < order.len() {
        let old = order[i];
        for &(_, target) in &nodes[old as usize].edges {
            if !remap.contains_key(&target) {
                remap.insert(target, order.len() as u32);
                order.push(target);
            }
        }
        i += 1;
    }

    order
        .iter()
        .map(|&old| {
            let node = &nodes[old as usize];
            let mut edges: Vec<(u8, u32)> = node
                .edges
                .iter()
                .map(|&(l, t)| (l, remap.get(&t).copied().unwrap_or(ROOT)))
                .collect();
            edges.sort_unstable_by_key(|&(l, _)| l);
            GraphNode {
                edges,
                is_final: node.is_final,
                len_mask: 0,
            }
        })
        .collect()
}

/// Fill in `len_mask` for every node
///
/// The graph is acyclic, so a post-order walk visits each node once.
pub(crate) fn compute_len_masks(nodes: &mut [GraphNode]) {
    if nodes.is_empty() {
        return;
    }
    let mut done = vec![false; nodes.len()];
    // Explicit stack: (node, next edge to visit)
    let mut stack: Vec<(usize, usize)> = vec![(ROOT as usize, 0)];
    while let Some(top) = stack.last_mut() {
        let (node, edge) = *top;
        if let Some(&(_, target)) = nodes[node].edges.get(edge) {
            top.1 += 1;
            let target = target as usize;
            if !done[target] {
                stack.push((target, 0));
            }
            continue;
        }
        let mut mask = u32::from(nodes[node].is_final);
        for &(_, target) in &nodes[node].edges {
            mask |= nodes[target as usize].len_mask << 1;
        }
        nodes[node].len_mask = mask;
        done[node] = true;
        stack.pop();
    }
}

/// Acceptability index over a static word set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordGraph {
    nodes: Vec<GraphNode>,
    word_count: usize,
}

impl Default for WordGraph {
    fn default() -> Self {
        Self::from_words(std::iter::empty::<&str>())
    }
}

impl WordGraph {
    /// Build a graph from words in any order and case
    ///
    /// Words that are not plain letters (see [`canonical_word`]) are skipped
    /// with a warning; use [`WordGraph::try_from_words`] to reject them.
    ///
    /// # Examples
    /// ```
    /// use zyzzyva::graph::WordGraph;
    ///
    /// let graph = WordGraph::from_words(["CAT", "act", "TACO", "C4T"]);
    /// assert!(graph.contains("cat"));
    /// assert!(!graph.contains("CATS"));
    /// assert_eq!(graph.len(), 3);
    /// ```
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut skipped = 0usize;
        let canonical = words
            .into_iter()
            .filter_map(|w| match canonical_word(w.as_ref()) {
                Ok(word) => Some(word),
                Err(e) => {
                    log::debug!("Skipping '{}': {e}", w.as_ref());
                    skipped += 1;
                    None
                }
            })
            .collect();
        if skipped > 0 {
            log::warn!("Skipped {skipped} malformed words while building a word graph");
        }
        Self::from_canonical(canonical)
    }

    /// Build a graph, failing on the first word that is not plain letters
    ///
    /// # Errors
    /// Returns the [`WordError`] of the first malformed word.
    pub fn try_from_words<I, S>(words: I) -> Result<Self, WordError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let canonical = words
            .into_iter()
            .map(|w| canonical_word(w.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_canonical(canonical))
    }

    fn from_canonical(words: Vec<String>) -> Self {
        let mut sorted: Vec<Vec<u8>> = words.into_iter().map(String::into_bytes).collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut builder = GraphBuilder::new();
        for word in &sorted {
            builder.insert(word);
        }
        let mut nodes = builder.finish();
        compute_len_masks(&mut nodes);

        Self {
            nodes,
            word_count: sorted.len(),
        }
    }

    /// Wrap nodes that have already been validated
    pub(crate) fn from_nodes(mut nodes: Vec<GraphNode>) -> Self {
        compute_len_masks(&mut nodes);
        let word_count = count_words(&nodes);
        Self { nodes, word_count }
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.word_count
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.word_count == 0
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    #[inline]
    fn node(&self, idx: u32) -> &GraphNode {
        &self.nodes[idx as usize]
    }

    /// Exact membership, in time proportional to the word length
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        if word.is_empty() || self.nodes.is_empty() {
            return false;
        }
        let mut node = ROOT;
        for b in word.bytes() {
            match self.node(node).child(b.to_ascii_uppercase()) {
                Some(next) => node = next,
                None => return false,
            }
        }
        self.node(node).is_final
    }

    /// True when some word of length in `[min, max]` (relative to `node`)
    /// ends below it
    #[inline]
    fn reaches(&self, node: u32, min: usize, max: usize) -> bool {
        if min > max || min >= 32 {
            return false;
        }
        let max = max.min(31);
        let window = (u32::MAX >> (31 - max)) & (u32::MAX << min);
        self.node(node).len_mask & window != 0
    }

    /// All words with length in `[min_len, max_len]`, alphabetically
    #[must_use]
    pub fn words_in_range(&self, min_len: usize, max_len: usize) -> Vec<String> {
        let mut out = Vec::new();
        if self.nodes.is_empty() {
            return out;
        }
        let mut prefix = Vec::with_capacity(MAX_WORD_LEN);
        self.collect(ROOT, min_len.max(1), max_len, &mut prefix, &mut out);
        out
    }

    #[must_use]
    pub fn words_of_length(&self, len: usize) -> Vec<String> {
        self.words_in_range(len, len)
    }

    /// Every word in the graph, alphabetically
    #[must_use]
    pub fn words(&self) -> Vec<String> {
        self.words_in_range(1, usize::MAX)
    }

    fn collect(
        &self,
        node: u32,
        min_len: usize,
        max_len: usize,
        prefix: &mut Vec<u8>,
        out: &mut Vec<String>,
    ) {
        let depth = prefix.len();
        if !self.reaches(node, min_len.saturating_sub(depth), max_len.saturating_sub(depth)) {
            return;
        }
        if self.node(node).is_final && depth >= min_len && depth <= max_len {
            out.push(String::from_utf8_lossy(prefix).into_owned());
        }
        if depth >= max_len {
            return;
        }
        for &(letter, child) in &self.node(node).edges {
            prefix.push(letter);
            self.collect(child, min_len, max_len, prefix, out);
            prefix.pop();
        }
    }

    /// Words matching a positional pattern, alphabetically
    #[must_use]
    pub fn match_pattern(&self, pattern: &Pattern, min_len: usize, max_len: usize) -> Vec<String> {
        let tokens = pattern.tokens();
        // Letters still required after token i, and whether a star follows
        let mut fixed_after = vec![0usize; tokens.len() + 1];
        let mut star_after = vec![false; tokens.len() + 1];
        for i in (0..tokens.len()).rev() {
            fixed_after[i] = fixed_after[i + 1] + usize::from(tokens[i] != Token::Star);
            star_after[i] = star_after[i + 1] || tokens[i] == Token::Star;
        }

        let mut walk = PatternWalk {
            graph: self,
            tokens,
            fixed_after: &fixed_after,
            star_after: &star_after,
            min_len: min_len.max(1),
            max_len,
            found: FxHashSet::default(),
            prefix: Vec::with_capacity(MAX_WORD_LEN),
        };
        if !self.nodes.is_empty() {
            walk.visit(ROOT, 0);
        }
        sorted(walk.found)
    }

    /// Words using exactly the pattern's letters, alphabetically
    #[must_use]
    pub fn match_anagram(&self, pattern: &Pattern, min_len: usize, max_len: usize) -> Vec<String> {
        self.anagram_search(pattern.anagram_pool(), false, min_len, max_len)
    }

    /// Words using only letters available in the pattern, alphabetically
    #[must_use]
    pub fn match_subanagram(
        &self,
        pattern: &Pattern,
        min_len: usize,
        max_len: usize,
    ) -> Vec<String> {
        self.anagram_search(pattern.anagram_pool(), true, min_len, max_len)
    }

    fn anagram_search(
        &self,
        pool: AnagramPool,
        partial: bool,
        min_len: usize,
        max_len: usize,
    ) -> Vec<String> {
        // Identical wildcard masks are interchangeable, so group them
        let mut kinds: Vec<(u32, usize)> = Vec::new();
        for &mask in &pool.wildcards {
            match kinds.iter_mut().find(|(m, _)| *m == mask) {
                Some((_, n)) => *n += 1,
                None => kinds.push((mask, 1)),
            }
        }
        let mut walk = AnagramWalk {
            graph: self,
            letters: pool.letters,
            kinds,
            star: pool.star,
            partial,
            min_len: min_len.max(1),
            max_len,
            found: FxHashSet::default(),
            prefix: Vec::with_capacity(MAX_WORD_LEN),
        };
        if !self.nodes.is_empty() {
            walk.visit(ROOT);
        }
        sorted(walk.found)
    }
}

fn sorted(found: FxHashSet<String>) -> Vec<String> {
    let mut words: Vec<String> = found.into_iter().collect();
    words.sort_unstable();
    words
}

fn count_words(nodes: &[GraphNode]) -> usize {
    // Words below each node, memoized over the shared suffixes
    fn count(idx: usize, nodes: &[GraphNode], memo: &mut [Option<usize>]) -> usize {
        if let Some(n) = memo[idx] {
            return n;
        }
        let mut n = usize::from(nodes[idx].is_final);
        for &(_, target) in &nodes[idx].edges {
            n += count(target as usize, nodes, memo);
        }
        memo[idx] = Some(n);
        n
    }
    if nodes.is_empty() {
        return 0;
    }
    let mut memo: Vec<Option<usize>> = vec![None; nodes.len()];
    count(ROOT as usize, nodes, &mut memo)
}

struct PatternWalk<'a> {
    graph: &'a WordGraph,
    tokens: &'a [Token],
    fixed_after: &'a [usize],
    star_after: &'a [bool],
    min_len: usize,
    max_len: usize,
    found: FxHashSet<String>,
    prefix: Vec<u8>,
}

impl PatternWalk<'_> {
    fn visit(&mut self, node: u32, token: usize) {
        let depth = self.prefix.len();
        let need = self.fixed_after[token];
        let (lo, hi) = if self.star_after[token] {
            (need, self.max_len.saturating_sub(depth))
        } else {
            (need, need.min(self.max_len.saturating_sub(depth)))
        };
        let lo = lo.max(self.min_len.saturating_sub(depth));
        if !self.graph.reaches(node, lo, hi) {
            return;
        }

        if token == self.tokens.len() {
            if self.graph.node(node).is_final && depth >= self.min_len {
                self.found
                    .insert(String::from_utf8_lossy(&self.prefix).into_owned());
            }
            return;
        }

        let graph = self.graph;
        let tok = self.tokens[token];
        if tok == Token::Star {
            // Star matches nothing more...
            self.visit(node, token + 1);
            // ...or one more letter and stays
            if depth < self.max_len {
                for &(letter, child) in &graph.node(node).edges {
                    self.prefix.push(letter);
                    self.visit(child, token);
                    self.prefix.pop();
                }
            }
            return;
        }

        if depth >= self.max_len {
            return;
        }
        if let Token::Letter(letter) = tok {
            if let Some(child) = graph.node(node).child(letter) {
                self.prefix.push(letter);
                self.visit(child, token + 1);
                self.prefix.pop();
            }
            return;
        }
        for &(letter, child) in &graph.node(node).edges {
            if tok.accepts(letter) {
                self.prefix.push(letter);
                self.visit(child, token + 1);
                self.prefix.pop();
            }
        }
    }
}

struct AnagramWalk<'a> {
    graph: &'a WordGraph,
    letters: crate::core::LetterCounts,
    /// (accept mask, unused count)
    kinds: Vec<(u32, usize)>,
    star: bool,
    partial: bool,
    min_len: usize,
    max_len: usize,
    found: FxHashSet<String>,
    prefix: Vec<u8>,
}

impl AnagramWalk<'_> {
    fn remaining(&self) -> usize {
        self.letters.total() + self.kinds.iter().map(|&(_, n)| n).sum::<usize>()
    }

    fn visit(&mut self, node: u32) {
        let depth = self.prefix.len();
        let remaining = self.remaining();
        let room = self.max_len.saturating_sub(depth);
        let (lo, hi) = match (self.partial, self.star) {
            (true, true) => (0, room),
            (true, false) => (0, remaining.min(room)),
            (false, true) => (remaining, room),
            (false, false) => (remaining, remaining.min(room)),
        };
        let lo = lo.max(self.min_len.saturating_sub(depth));
        if !self.graph.reaches(node, lo, hi) {
            return;
        }

        let complete = self.partial || remaining == 0;
        if self.graph.node(node).is_final && depth >= self.min_len && complete {
            self.found
                .insert(String::from_utf8_lossy(&self.prefix).into_owned());
        }
        if depth >= self.max_len {
            return;
        }

        let graph = self.graph;
        for &(letter, child) in &graph.node(node).edges {
            self.prefix.push(letter);
            // An exact tile is never worse than a wildcard for the same letter
            if self.letters.take(letter) {
                self.visit(child);
                self.letters.add(letter);
            } else {
                let bit = 1u32 << (letter - b'A');
                for k in 0..self.kinds.len() {
                    let (mask, unused) = self.kinds[k];
                    if unused > 0 && mask & bit != 0 {
                        self.kinds[k].1 -= 1;
                        self.visit(child);
                        self.kinds[k].1 += 1;
                    }
                }
                if self.star {
                    self.visit(child);
                }
            }
            self.prefix.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> WordGraph {
        WordGraph::from_words([
            "CAT", "ACT", "TACO", "COAT", "COATS", "CATS", "AT", "TA", "A", "SCAT", "TACT",
            "COTTA", "OCA", "OCAS",
        ])
    }

    #[test]
    fn malformed_words_are_skipped() {
        let g = WordGraph::from_words(["A1", "AB", "", "a-b"]);
        assert_eq!(g.words(), ["AB"]);
        let found = g.match_anagram(&Pattern::parse("A?").unwrap(), 0, 15);
        assert_eq!(found, ["AB"]);
    }

    #[test]
    fn try_from_words_rejects_malformed_words() {
        assert!(matches!(
            WordGraph::try_from_words(["AB", "A1"]),
            Err(WordError::InvalidCharacter('1'))
        ));
        assert_eq!(WordGraph::try_from_words(["ab", "BA"]).unwrap().len(), 2);
    }

    #[test]
    fn contains_all_inserted_words() {
        let g = graph();
        for w in ["CAT", "ACT", "TACO", "COATS", "A", "OCAS"] {
            assert!(g.contains(w), "{w} missing");
        }
        assert!(g.contains("cat"));
        assert!(!g.contains("CA"));
        assert!(!g.contains("CATSS"));
        assert!(!g.contains(""));
        assert_eq!(g.len(), 14);
    }

    #[test]
    fn suffix_sharing_shrinks_graph() {
        let g = WordGraph::from_words(["TESTING", "RESTING", "NESTING", "BESTING"]);
        // A plain trie would need 1 + 4 * 7 = 29 nodes
        assert!(g.node_count() < 15, "got {}", g.node_count());
        assert!(g.contains("NESTING"));
        assert!(!g.contains("ESTING"));
    }

    #[test]
    fn duplicates_and_case_are_merged() {
        let g = WordGraph::from_words(["cat", "CAT", "Cat"]);
        assert_eq!(g.len(), 1);
        assert_eq!(g.words(), vec!["CAT"]);
    }

    #[test]
    fn empty_graph() {
        let g = WordGraph::default();
        assert!(g.is_empty());
        assert!(!g.contains("A"));
        assert!(g.words().is_empty());
    }

    #[test]
    fn words_by_length() {
        let g = graph();
        assert_eq!(g.words_of_length(2), vec!["AT", "TA"]);
        assert_eq!(g.words_in_range(5, 5), vec!["COATS", "COTTA"]);
        assert_eq!(g.words().len(), 14);
    }

    #[test]
    fn len_masks_reflect_word_ends() {
        let g = graph();
        let root = &g.nodes[ROOT as usize];
        // Words of lengths 1 through 5 exist
        assert_eq!(root.len_mask, 0b11_1110);
    }

    #[test]
    fn pattern_search() {
        let g = graph();
        let p = Pattern::parse("?A?").unwrap();
        assert_eq!(g.match_pattern(&p, 0, MAX_WORD_LEN), vec!["CAT"]);

        let star = Pattern::parse("*AT*").unwrap();
        assert_eq!(
            g.match_pattern(&star, 0, MAX_WORD_LEN),
            vec!["AT", "CAT", "CATS", "COAT", "COATS", "SCAT"]
        );

        let bounded = g.match_pattern(&star, 3, 3);
        assert_eq!(bounded, vec!["CAT"]);
    }

    #[test]
    fn pattern_search_agrees_with_matcher() {
        let g = graph();
        for text in ["C*", "*S", "[CT]?[^T]*", "?", "*", "T*T", "*O*A*"] {
            let p = Pattern::parse(text).unwrap();
            let brute: Vec<String> = g.words().into_iter().filter(|w| p.matches(w)).collect();
            assert_eq!(g.match_pattern(&p, 0, MAX_WORD_LEN), brute, "pattern {text}");
        }
    }

    #[test]
    fn anagram_search() {
        let g = graph();
        let p = Pattern::parse("CAT").unwrap();
        assert_eq!(g.match_anagram(&p, 0, MAX_WORD_LEN), vec!["ACT", "CAT"]);

        let blank = Pattern::parse("CA?").unwrap();
        assert_eq!(g.match_anagram(&blank, 0, MAX_WORD_LEN), vec!["ACT", "CAT", "OCA"]);
    }

    #[test]
    fn subanagram_search() {
        let g = graph();
        let p = Pattern::parse("TACOS").unwrap();
        assert_eq!(
            g.match_subanagram(&p, 3, 4),
            vec!["ACT", "CAT", "CATS", "COAT", "OCA", "OCAS", "SCAT", "TACO"]
        );
    }

    #[test]
    fn anagram_search_agrees_with_matcher() {
        let g = graph();
        for text in ["CAT*", "?T", "[AC][OT]?", "TACOS", "A??", "*"] {
            let p = Pattern::parse(text).unwrap();
            let all = g.words();
            let brute_exact: Vec<String> =
                all.iter().filter(|w| p.matches_anagram(w)).cloned().collect();
            let brute_sub: Vec<String> = all
                .iter()
                .filter(|w| p.matches_subanagram(w))
                .cloned()
                .collect();
            assert_eq!(g.match_anagram(&p, 0, MAX_WORD_LEN), brute_exact, "anagram {text}");
            assert_eq!(g.match_subanagram(&p, 0, MAX_WORD_LEN), brute_sub, "subanagram {text}");
        }
    }
}
