//! Recursive character text splitter.
//!
//! Splits on the coarsest separator present (paragraphs, then lines, then
//! words, then characters) and merges the pieces back into chunks of at most
//! `chunk_size` characters, carrying up to `chunk_overlap` characters of
//! trailing context into the next chunk.

use serde::{Deserialize, Serialize};

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// A text chunk with source information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    /// The text content
    pub text: String,
    /// Source identifier (file path)
    pub source: String,
    /// Chunk index within the source
    pub chunk_index: usize,
}

#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveCharacterSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Splits `text` and tags each chunk with `source`.
    pub fn split_document(&self, text: &str, source: &str) -> Vec<TextChunk> {
        self.split_text(text)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| TextChunk {
                text,
                source: source.to_string(),
                chunk_index,
            })
            .collect()
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, remaining) = pick_separator(text, separators);

        let splits: Vec<String> = if separator.is_empty() {
            text.chars().map(|c| c.to_string()).collect()
        } else {
            text.split(separator.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect()
        };

        let mut chunks = Vec::new();
        let mut good: Vec<String> = Vec::new();

        for split in splits {
            if char_len(&split) < self.chunk_size {
                good.push(split);
                continue;
            }

            if !good.is_empty() {
                chunks.extend(self.merge_splits(&good, &separator));
                good.clear();
            }

            if remaining.is_empty() {
                chunks.push(split);
            } else {
                chunks.extend(self.split_with(&split, remaining));
            }
        }

        if !good.is_empty() {
            chunks.extend(self.merge_splits(&good, &separator));
        }

        chunks
    }

    fn merge_splits(&self, splits: &[String], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut docs = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut total = 0usize;

        for piece in splits {
            let len = char_len(piece);
            let joined_len = if current.is_empty() { 0 } else { sep_len };

            if total + len + joined_len > self.chunk_size {
                if total > self.chunk_size {
                    tracing::warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total,
                        self.chunk_size
                    );
                }

                if !current.is_empty() {
                    push_joined(&mut docs, &current, separator);

                    while !current.is_empty() {
                        let pending = total + len + sep_len;
                        if total <= self.chunk_overlap && pending <= self.chunk_size {
                            break;
                        }
                        let trailing_sep = if current.len() > 1 { sep_len } else { 0 };
                        total = total.saturating_sub(char_len(current[0]) + trailing_sep);
                        current.remove(0);
                    }
                }
            }

            current.push(piece.as_str());
            let joined = if current.len() > 1 { sep_len } else { 0 };
            total += len + joined;
        }

        push_joined(&mut docs, &current, separator);
        docs
    }
}

fn pick_separator<'a>(text: &str, separators: &'a [String]) -> (String, &'a [String]) {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() || text.contains(sep.as_str()) {
            return (sep.clone(), &separators[i + 1..]);
        }
    }
    (String::new(), &[])
}

fn push_joined(docs: &mut Vec<String>, parts: &[&str], separator: &str) {
    if parts.is_empty() {
        return;
    }
    let doc = parts.join(separator);
    let doc = doc.trim();
    if !doc.is_empty() {
        docs.push(doc.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
