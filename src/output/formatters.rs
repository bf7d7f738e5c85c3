//! Formatting utilities for terminal output

use crate::store::ValueOrder;

/// A word flanked by its hooks, e.g. `s CAT s`
#[must_use]
pub fn hooked_word(front: &str, word: &str, back: &str, width: usize) -> String {
    format!("{front:>width$} {word} {back}")
}

/// Position with its tie window when the window is wider than one word
#[must_use]
pub fn order_text(order: ValueOrder) -> String {
    if order.min == order.max {
        order.order.to_string()
    } else {
        format!("{} ({}-{})", order.order, order.min, order.max)
    }
}

/// Wrap words into lines no wider than `width` columns
#[must_use]
pub fn wrap_words(words: &[String], width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in words {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
