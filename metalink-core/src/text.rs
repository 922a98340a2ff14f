//! Per-element character accumulation.
//!
//! SAX tokenizers may split the text content of a single element across
//! any number of fragments, and report a child element's text while the
//! parent is still open. The accumulator keeps one buffer per open
//! element so each end event sees exactly its own concatenated text.

/// LIFO stack of character buffers, one per open element.
///
/// `enter`/`exit` calls must pair with element start/end events; the
/// scoping discipline matches element nesting exactly.
#[derive(Debug, Default)]
pub struct TextAccumulator {
    stack: Vec<String>,
}

impl TextAccumulator {
    pub fn new() -> Self {
        TextAccumulator { stack: Vec::new() }
    }

    /// Open a fresh buffer for the element about to start.
    pub fn enter(&mut self) {
        self.stack.push(String::new());
    }

    /// Append a fragment to the innermost open buffer.
    ///
    /// Text outside any element (prolog whitespace, trailing junk) has
    /// no buffer and is dropped.
    pub fn append(&mut self, fragment: &str) {
        if let Some(buf) = self.stack.last_mut() {
            buf.push_str(fragment);
        }
    }

    /// Close the innermost buffer and return its accumulated text.
    pub fn exit(&mut self) -> String {
        self.stack.pop().unwrap_or_default()
    }

    /// Number of currently open buffers.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
