//! Metalink Core Parser
//!
//! Event-driven parser for Metalink XML documents - manifests describing
//! downloadable files with mirror URLs, whole-file checksums, and optional
//! per-chunk piece hashes.
//!
//! # Architecture
//!
//! - **reader.rs** - quick-xml tokenizer adapter, `parse_*` entry points
//! - **state.rs** - parsing state machine with skip/error states
//! - **builder.rs** - transactional builder with per-kind staging slots
//! - **text.rs** - per-element character accumulation
//! - **model.rs** - document model types
//! - **error.rs** - fatal error codes
//!
//! Malformed entries degrade instead of failing: elements missing required
//! attributes are skipped, malformed numeric values fall back to 0, and
//! only allocation failures or internal invariant violations abort the
//! parse.
//!
//! # Example
//!
//! ```
//! let xml = r#"<metalink><files>
//!   <file name="a.bin">
//!     <verification><hash type="sha1">deadbeef</hash></verification>
//!   </file>
//! </files></metalink>"#;
//!
//! let doc = metalink_core::parse_str(xml).unwrap();
//! assert_eq!(doc.files[0].checksums[0].hash, "deadbeef");
//! ```

pub mod builder;
pub mod error;
pub mod event;
pub mod model;
pub mod reader;
pub mod state;
pub mod text;

pub use builder::DocumentBuilder;
pub use error::{ErrorCode, ParseError};
pub use event::{Attributes, ElementHandler};
pub use model::{Checksum, ChunkChecksum, FileEntry, Metalink, PieceHash, Resource};
pub use reader::{parse_file, parse_reader, parse_str};
pub use state::{ParserState, StateMachine};
pub use text::TextAccumulator;
