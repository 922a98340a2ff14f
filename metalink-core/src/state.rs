//! The parsing state machine.
//!
//! A single cursor over a fixed set of states consumes element events and
//! drives the [`DocumentBuilder`]. Unrecognized or invalid elements send
//! the cursor into [`ParserState::Skip`], which counts nesting depth and
//! ignores the whole subtree before restoring the pre-skip state; fatal
//! builder failures send it into [`ParserState::Error`], which swallows
//! every remaining event.
//!
//! Only the skip state needs to remember where it came from, so a single
//! resume slot stands in for a full state stack.

use phf::phf_map;

use crate::builder::DocumentBuilder;
use crate::error::ErrorCode;
use crate::event::{parse_unsigned, Attributes, ElementHandler};
use crate::model::Metalink;

/// States of the parse cursor. One is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Before the `<metalink>` root.
    Initial,
    /// Inside `<metalink>`.
    Metalink,
    /// Inside `<files>`.
    Files,
    /// Inside `<file>`.
    File,
    Size,
    Version,
    Language,
    Os,
    /// Inside `<resources>`.
    Resources,
    Url,
    /// Inside `<verification>`.
    Verification,
    /// Inside a whole-file `<hash>`.
    Hash,
    /// Inside `<pieces>`.
    Pieces,
    /// Inside a per-chunk `<hash piece="..">`.
    PieceHash,
    /// Document complete; remaining events are ignored.
    Fin,
    /// Ignoring an unrecognized subtree, counting nesting depth.
    Skip,
    /// Fatal failure; remaining events are ignored.
    Error,
}

/// Child elements of `<file>` that carry plain text content.
static FILE_CHILD_STATES: phf::Map<&'static str, ParserState> = phf_map! {
    "size" => ParserState::Size,
    "version" => ParserState::Version,
    "language" => ParserState::Language,
    "os" => ParserState::Os,
    "verification" => ParserState::Verification,
};

/// Event-driven parser: consumes start/end events, produces a [`Metalink`].
///
/// One instance per parse. The tokenizer adapter pushes events strictly
/// sequentially through the [`ElementHandler`] impl.
#[derive(Debug)]
pub struct StateMachine {
    state: ParserState,
    /// State to restore when the skip depth returns to zero.
    resume: ParserState,
    skip_depth: u32,
    builder: DocumentBuilder,
}

impl StateMachine {
    pub fn new() -> Self {
        StateMachine {
            state: ParserState::Initial,
            resume: ParserState::Initial,
            skip_depth: 0,
            builder: DocumentBuilder::new(),
        }
    }

    /// Currently active state.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// First fatal error recorded by the builder, if any.
    pub fn error(&self) -> Option<ErrorCode> {
        self.builder.error()
    }

    /// Finish the parse: the document on success, the sticky error code
    /// otherwise. A partial document is never exposed.
    pub fn finish(self) -> Result<Metalink, ErrorCode> {
        match self.builder.error() {
            Some(code) => Err(code),
            None => Ok(self.builder.finish()),
        }
    }

    /// Apply a builder result: advance to `next` on success, escalate to
    /// the error state on failure.
    fn transition(&mut self, result: Result<(), ErrorCode>, next: ParserState) {
        match result {
            Ok(()) => self.state = next,
            Err(code) => self.fail(code),
        }
    }

    pub(crate) fn fail(&mut self, code: ErrorCode) {
        self.builder.set_error(code);
        self.state = ParserState::Error;
    }

    /// Ignore the element that just opened and everything under it.
    fn enter_skip(&mut self) {
        self.resume = self.state;
        self.skip_depth = 1;
        self.state = ParserState::Skip;
    }

    fn start_file(&mut self, attrs: &Attributes) {
        // name is required and must be non-empty; skip the entry otherwise.
        match attrs.get("name") {
            Some(name) if !name.trim().is_empty() => {
                self.builder.begin_file();
                let result = self.builder.file_set_name(name);
                self.transition(result, ParserState::File);
            }
            _ => self.enter_skip(),
        }
    }

    fn start_resources(&mut self, attrs: &Attributes) {
        let maxconnections = attrs
            .get("maxconnections")
            .and_then(parse_unsigned::<u32>)
            .unwrap_or(0);
        let result = self.builder.file_set_maxconnections(maxconnections);
        self.transition(result, ParserState::Resources);
    }

    fn start_url(&mut self, attrs: &Attributes) {
        // type is required; entries without it are never staged.
        let Some(mirror_type) = attrs.get("type") else {
            self.enter_skip();
            return;
        };
        self.builder.begin_resource();
        let result = (|| {
            self.builder.resource_set_type(mirror_type)?;
            if let Some(location) = attrs.get("location") {
                self.builder.resource_set_location(location)?;
            }
            let preference = attrs
                .get("preference")
                .and_then(parse_unsigned::<u32>)
                .unwrap_or(0);
            self.builder.resource_set_preference(preference)?;
            let maxconnections = attrs
                .get("maxconnections")
                .and_then(parse_unsigned::<u32>)
                .unwrap_or(0);
            self.builder.resource_set_maxconnections(maxconnections)
        })();
        self.transition(result, ParserState::Url);
    }

    fn start_hash(&mut self, attrs: &Attributes) {
        let Some(hash_type) = attrs.get("type") else {
            self.enter_skip();
            return;
        };
        self.builder.begin_checksum();
        let result = self.builder.checksum_set_type(hash_type);
        self.transition(result, ParserState::Hash);
    }

    fn start_pieces(&mut self, attrs: &Attributes) {
        // Both type and a valid non-negative length are required; a bad
        // length drops the whole <pieces> block, not just the attribute.
        let Some(hash_type) = attrs.get("type") else {
            self.enter_skip();
            return;
        };
        let Some(length) = attrs.get("length").and_then(parse_unsigned::<u64>) else {
            self.enter_skip();
            return;
        };
        self.builder.begin_chunk_checksum();
        let result = (|| {
            self.builder.chunk_checksum_set_type(hash_type)?;
            self.builder.chunk_checksum_set_length(length)
        })();
        self.transition(result, ParserState::Pieces);
    }

    fn start_piece_hash(&mut self, attrs: &Attributes) {
        let Some(piece) = attrs.get("piece").and_then(parse_unsigned::<u32>) else {
            self.enter_skip();
            return;
        };
        self.builder.begin_piece_hash();
        let result = self.builder.piece_hash_set_piece(piece);
        self.transition(result, ParserState::PieceHash);
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementHandler for StateMachine {
    fn on_element_start(&mut self, name: &str, attrs: &Attributes) {
        match self.state {
            ParserState::Initial => {
                if name == "metalink" {
                    self.state = ParserState::Metalink;
                } else {
                    self.enter_skip();
                }
            }
            ParserState::Metalink => {
                if name == "files" {
                    self.state = ParserState::Files;
                } else {
                    self.enter_skip();
                }
            }
            ParserState::Files => {
                if name == "file" {
                    self.start_file(attrs);
                } else {
                    self.enter_skip();
                }
            }
            ParserState::File => {
                if name == "resources" {
                    self.start_resources(attrs);
                } else if let Some(&next) = FILE_CHILD_STATES.get(name) {
                    self.state = next;
                } else {
                    self.enter_skip();
                }
            }
            ParserState::Resources => {
                if name == "url" {
                    self.start_url(attrs);
                } else {
                    self.enter_skip();
                }
            }
            ParserState::Verification => {
                if name == "hash" {
                    self.start_hash(attrs);
                } else if name == "pieces" {
                    self.start_pieces(attrs);
                } else {
                    self.enter_skip();
                }
            }
            ParserState::Pieces => {
                if name == "hash" {
                    self.start_piece_hash(attrs);
                } else {
                    self.enter_skip();
                }
            }
            // Leaf states hold text only; any child element is ignored.
            ParserState::Size
            | ParserState::Version
            | ParserState::Language
            | ParserState::Os
            | ParserState::Url
            | ParserState::Hash
            | ParserState::PieceHash => self.enter_skip(),
            ParserState::Skip => self.skip_depth += 1,
            ParserState::Fin | ParserState::Error => {}
        }
    }

    fn on_element_end(&mut self, _name: &str, text: &str) {
        match self.state {
            ParserState::Initial | ParserState::Fin | ParserState::Error => {}
            ParserState::Metalink => {
                // Document complete; anything after </metalink> is noise.
                self.state = ParserState::Fin;
            }
            ParserState::Files => {
                let result = self.builder.accumulate_files();
                self.transition(result, ParserState::Metalink);
            }
            ParserState::File => {
                let result = self.builder.commit_file();
                self.transition(result, ParserState::Files);
            }
            ParserState::Size => {
                let size = parse_unsigned::<u64>(text).unwrap_or(0);
                let result = self.builder.file_set_size(size);
                self.transition(result, ParserState::File);
            }
            ParserState::Version => {
                let result = self.builder.file_set_version(text.trim());
                self.transition(result, ParserState::File);
            }
            ParserState::Language => {
                let result = self.builder.file_set_language(text.trim());
                self.transition(result, ParserState::File);
            }
            ParserState::Os => {
                let result = self.builder.file_set_os(text.trim());
                self.transition(result, ParserState::File);
            }
            ParserState::Resources => self.state = ParserState::File,
            ParserState::Url => {
                let result = (|| {
                    self.builder.resource_set_url(text.trim())?;
                    self.builder.commit_resource()
                })();
                self.transition(result, ParserState::Resources);
            }
            ParserState::Verification => self.state = ParserState::File,
            ParserState::Hash => {
                let result = (|| {
                    self.builder.checksum_set_hash(text.trim())?;
                    self.builder.commit_checksum()
                })();
                self.transition(result, ParserState::Verification);
            }
            ParserState::Pieces => {
                let result = self.builder.commit_chunk_checksum();
                self.transition(result, ParserState::Verification);
            }
            ParserState::PieceHash => {
                let result = (|| {
                    self.builder.piece_hash_set_hash(text.trim())?;
                    self.builder.commit_piece_hash()
                })();
                self.transition(result, ParserState::Pieces);
            }
            ParserState::Skip => {
                self.skip_depth -= 1;
                if self.skip_depth == 0 {
                    self.state = self.resume;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(m: &mut StateMachine, name: &str) {
        m.on_element_start(name, &Attributes::new());
    }

    fn start_with(m: &mut StateMachine, name: &str, attrs: Attributes) {
        m.on_element_start(name, &attrs);
    }

    fn end(m: &mut StateMachine, name: &str) {
        m.on_element_end(name, "");
    }

    fn end_with(m: &mut StateMachine, name: &str, text: &str) {
        m.on_element_end(name, text);
    }

    #[test]
    fn test_happy_path_states() {
        let mut m = StateMachine::new();
        start(&mut m, "metalink");
        assert_eq!(m.state(), ParserState::Metalink);
        start(&mut m, "files");
        assert_eq!(m.state(), ParserState::Files);
        start_with(&mut m, "file", Attributes::from([("name", "a.bin")]));
        assert_eq!(m.state(), ParserState::File);
        end(&mut m, "file");
        assert_eq!(m.state(), ParserState::Files);
        end(&mut m, "files");
        assert_eq!(m.state(), ParserState::Metalink);
        end(&mut m, "metalink");
        assert_eq!(m.state(), ParserState::Fin);

        let doc = m.finish().unwrap();
        assert_eq!(doc.files.len(), 1);
        assert_eq!(doc.files[0].name, "a.bin");
    }

    #[test]
    fn test_file_without_name_is_skipped() {
        let mut m = StateMachine::new();
        start(&mut m, "metalink");
        start(&mut m, "files");
        start(&mut m, "file"); // no name attribute
        assert_eq!(m.state(), ParserState::Skip);
        end(&mut m, "file");
        assert_eq!(m.state(), ParserState::Files);
        end(&mut m, "files");
        end(&mut m, "metalink");

        assert!(m.finish().unwrap().files.is_empty());
    }

    #[test]
    fn test_skip_counts_nested_unknown_elements() {
        let mut m = StateMachine::new();
        start(&mut m, "metalink");
        start(&mut m, "files");
        start_with(&mut m, "file", Attributes::from([("name", "a.bin")]));

        // Unknown subtree three levels deep; control must return to the
        // file state untouched.
        start(&mut m, "publisher");
        assert_eq!(m.state(), ParserState::Skip);
        start(&mut m, "nested");
        start(&mut m, "deeper");
        end(&mut m, "deeper");
        end(&mut m, "nested");
        assert_eq!(m.state(), ParserState::Skip);
        end(&mut m, "publisher");
        assert_eq!(m.state(), ParserState::File);

        end(&mut m, "file");
        end(&mut m, "files");
        end(&mut m, "metalink");

        let doc = m.finish().unwrap();
        assert_eq!(doc.files.len(), 1);
        assert!(doc.files[0].resources.is_empty());
        assert!(doc.files[0].checksums.is_empty());
    }

    #[test]
    fn test_size_text_parses_with_default() {
        let mut m = StateMachine::new();
        start(&mut m, "metalink");
        start(&mut m, "files");
        start_with(&mut m, "file", Attributes::from([("name", "a.bin")]));
        start(&mut m, "size");
        end_with(&mut m, "size", "4294967296");
        end(&mut m, "file");
        end(&mut m, "files");
        end(&mut m, "metalink");

        assert_eq!(m.finish().unwrap().files[0].size, 4294967296);
    }

    #[test]
    fn test_pieces_without_length_skips_block() {
        let mut m = StateMachine::new();
        start(&mut m, "metalink");
        start(&mut m, "files");
        start_with(&mut m, "file", Attributes::from([("name", "a.bin")]));
        start(&mut m, "verification");
        start_with(&mut m, "pieces", Attributes::from([("type", "sha1")]));
        assert_eq!(m.state(), ParserState::Skip);
        start_with(&mut m, "hash", Attributes::from([("piece", "0")]));
        end_with(&mut m, "hash", "aaaa");
        end(&mut m, "pieces");
        assert_eq!(m.state(), ParserState::Verification);
        end(&mut m, "verification");
        end(&mut m, "file");
        end(&mut m, "files");
        end(&mut m, "metalink");

        assert!(m.finish().unwrap().files[0].chunk_checksum.is_none());
    }

    #[test]
    fn test_error_state_absorbs_events() {
        let mut m = StateMachine::new();
        start(&mut m, "metalink");
        m.fail(ErrorCode::OutOfMemory);
        assert_eq!(m.state(), ParserState::Error);

        // Everything afterwards is a no-op and the first code sticks.
        start(&mut m, "files");
        start_with(&mut m, "file", Attributes::from([("name", "a.bin")]));
        end(&mut m, "file");
        m.fail(ErrorCode::InvalidState);
        assert_eq!(m.state(), ParserState::Error);
        assert_eq!(m.error(), Some(ErrorCode::OutOfMemory));
        assert_eq!(m.finish().unwrap_err(), ErrorCode::OutOfMemory);
    }

    #[test]
    fn test_non_metalink_root_is_skipped() {
        let mut m = StateMachine::new();
        start(&mut m, "rss");
        assert_eq!(m.state(), ParserState::Skip);
        start(&mut m, "channel");
        end(&mut m, "channel");
        end(&mut m, "rss");
        assert_eq!(m.state(), ParserState::Initial);

        assert!(m.finish().unwrap().files.is_empty());
    }

    #[test]
    fn test_events_after_fin_are_ignored() {
        let mut m = StateMachine::new();
        start(&mut m, "metalink");
        end(&mut m, "metalink");
        assert_eq!(m.state(), ParserState::Fin);
        start(&mut m, "metalink");
        start(&mut m, "files");
        assert_eq!(m.state(), ParserState::Fin);
    }
}
