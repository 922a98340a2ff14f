//! Document model for parsed Metalink manifests.
//!
//! A Metalink document describes one or more downloadable files, each with
//! mirror URLs, whole-file checksums, and optional per-chunk piece hashes.
//! Every type here is plain owned data: once an entity is committed into its
//! parent collection by the builder it is never mutated again.

/// A parsed Metalink document.
///
/// Root of the result tree. Only ever handed to the caller fully formed;
/// a fatal parse error drops the partial document instead of exposing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metalink {
    /// Files in source-document order.
    pub files: Vec<FileEntry>,
}

/// One `<file>` entry inside `<files>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileEntry {
    /// File name, from the required `name` attribute. Never empty.
    pub name: String,
    /// Declared size in bytes. 0 when absent or malformed.
    pub size: u64,
    pub version: Option<String>,
    pub language: Option<String>,
    pub os: Option<String>,
    /// Connection cap from `<resources maxconnections="..">`. 0 when
    /// absent or malformed.
    pub maxconnections: u32,
    /// Whole-file checksums, in declaration order.
    pub checksums: Vec<Checksum>,
    /// Per-chunk hashes, absent when no valid `<pieces>` was declared.
    pub chunk_checksum: Option<ChunkChecksum>,
    /// Mirror URLs, in declaration order.
    pub resources: Vec<Resource>,
}

/// A mirror URL: one `<url>` inside `<resources>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    pub url: String,
    /// Transfer scheme from the required `type` attribute (`ftp`, `http`,
    /// `bittorrent`, ...). Entries without it are never constructed.
    pub mirror_type: String,
    /// Country code, e.g. `jp`.
    pub location: Option<String>,
    /// Mirror priority. 0 when absent or malformed.
    pub preference: u32,
    /// Per-mirror connection cap. 0 when absent or malformed.
    pub maxconnections: u32,
}

/// A whole-file checksum: one `<hash>` inside `<verification>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checksum {
    /// Digest algorithm name from the required `type` attribute.
    pub hash_type: String,
    /// Hex digest of the whole file.
    pub hash: String,
}

/// Chunked verification data: the `<pieces>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkChecksum {
    /// Digest algorithm name from the required `type` attribute.
    pub hash_type: String,
    /// Chunk length in bytes, from the required `length` attribute.
    pub length: u64,
    /// Piece hashes in declaration order.
    pub piece_hashes: Vec<PieceHash>,
}

/// Checksum of one fixed-size chunk: `<hash piece="N">` inside `<pieces>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieceHash {
    /// Zero-based chunk index from the required `piece` attribute.
    pub piece: u32,
    /// Hex digest of the chunk.
    pub hash: String,
}

impl Metalink {
    /// Look up a file entry by name.
    pub fn file(&self, name: &str) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.name == name)
    }
}

impl FileEntry {
    /// Look up a whole-file checksum by algorithm name.
    pub fn checksum(&self, hash_type: &str) -> Option<&Checksum> {
        self.checksums.iter().find(|c| c.hash_type == hash_type)
    }
}
