//! Recursive separator-driven text splitting
//!
//! Splits on the coarsest separator that still yields pieces under the size
//! bound, recursing into oversize pieces with the finer separators; the empty
//! separator at the end of the list means raw character slicing. Small
//! adjacent pieces are merged back together up to the size bound, keeping a
//! trailing window of at most `chunk_overlap` characters between neighbors.
//!
//! Lengths here are measured in characters, not bytes.

use std::collections::VecDeque;
use tracing::warn;

pub(crate) struct RecursiveTextSplitter<'a> {
    separators: &'a [&'a str],
    chunk_size: usize,
    chunk_overlap: usize,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl<'a> RecursiveTextSplitter<'a> {
    pub(crate) fn new(separators: &'a [&'a str], chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            separators,
            chunk_size,
            chunk_overlap,
        }
    }

    pub(crate) fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[&'a str]) -> Vec<String> {
        // Pick the coarsest separator present in the text; the finer ones are
        // kept for recursion into oversize pieces.
        let mut separator = *separators.last().unwrap_or(&"");
        let mut remaining: &[&str] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = sep;
                break;
            }
            if text.contains(sep) {
                separator = sep;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let splits: Vec<&str> = if separator.is_empty() {
            text.split_terminator("")
                .filter(|s| !s.is_empty())
                .collect()
        } else {
            text.split(separator).filter(|s| !s.is_empty()).collect()
        };

        let mut final_chunks = Vec::new();
        let mut good_splits: Vec<&str> = Vec::new();

        for piece in splits {
            if char_len(piece) < self.chunk_size {
                good_splits.push(piece);
            } else {
                if !good_splits.is_empty() {
                    final_chunks.extend(self.merge_splits(&good_splits, separator));
                    good_splits.clear();
                }
                if remaining.is_empty() {
                    final_chunks.push(piece.to_string());
                } else {
                    final_chunks.extend(self.split_recursive(piece, remaining));
                }
            }
        }

        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits, separator));
        }

        final_chunks
    }

    /// Greedily re-combine small pieces up to `chunk_size`, carrying a
    /// trailing window of at most `chunk_overlap` characters into the next
    /// chunk
    fn merge_splits(&self, splits: &[&str], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut docs: Vec<String> = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in splits {
            let piece_len = char_len(piece);
            let sep_cost = if current.is_empty() { 0 } else { separator_len };

            if total + piece_len + sep_cost > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        size = total,
                        requested = self.chunk_size,
                        "produced a chunk longer than the requested size"
                    );
                }
                if !current.is_empty() {
                    if let Some(doc) = join_pieces(&current, separator) {
                        docs.push(doc);
                    }
                    // Shed from the front until the retained tail fits inside
                    // the overlap budget and leaves room for the next piece
                    while total > self.chunk_overlap
                        || (total > 0
                            && total
                                + piece_len
                                + if current.is_empty() { 0 } else { separator_len }
                                > self.chunk_size)
                    {
                        let dropped = match current.pop_front() {
                            Some(d) => d,
                            None => break,
                        };
                        total -= char_len(dropped)
                            + if current.is_empty() { 0 } else { separator_len };
                    }
                }
            }

            current.push_back(piece);
            total += piece_len + if current.len() > 1 { separator_len } else { 0 };
        }

        if let Some(doc) = join_pieces(&current, separator) {
            docs.push(doc);
        }

        docs
    }
}

fn join_pieces(pieces: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = pieces
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
