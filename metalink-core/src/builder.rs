//! Transactional document builder.
//!
//! The state machine never touches the document model directly; it stages
//! one in-progress entity per kind here, fills its fields, and commits it
//! into the parent collection once the enclosing element closes cleanly.
//! A transaction abandoned on the skip path is simply overwritten by the
//! next `begin_*` or dropped with the builder - nothing partial ever
//! reaches the document.
//!
//! The first fatal error sticks: later failures never overwrite it, and
//! the recorded code becomes the parse's final status.

use crate::error::ErrorCode;
use crate::model::{Checksum, ChunkChecksum, FileEntry, Metalink, PieceHash, Resource};

/// Staging slots plus the growing document.
///
/// One instance per parse; must not be shared across concurrent parses.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    error: Option<ErrorCode>,

    document: Metalink,
    /// Files committed under the current `<files>` scope, moved into the
    /// document when that scope closes.
    files: Vec<FileEntry>,

    file: Option<FileEntry>,
    resource: Option<Resource>,
    checksum: Option<Checksum>,
    chunk_checksum: Option<ChunkChecksum>,
    /// Piece hashes committed under the current `<pieces>` scope. Moved
    /// wholesale into the chunk checksum on commit, never copied.
    piece_hashes: Vec<PieceHash>,
    piece_hash: Option<PieceHash>,
}

type BuildResult = Result<(), ErrorCode>;

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- sticky error ----

    /// Record a fatal error. First failure wins; later calls are no-ops.
    pub fn set_error(&mut self, code: ErrorCode) {
        if self.error.is_none() {
            self.error = Some(code);
        }
    }

    pub fn error(&self) -> Option<ErrorCode> {
        self.error
    }

    // ---- whole-document ----

    /// Move every file committed under the closing `<files>` scope into
    /// the document, preserving order.
    pub fn accumulate_files(&mut self) -> BuildResult {
        reserve(&mut self.document.files, self.files.len())?;
        self.document.files.append(&mut self.files);
        Ok(())
    }

    /// Consume the builder and detach the finished document.
    pub fn finish(self) -> Metalink {
        self.document
    }

    // ---- file transaction ----

    pub fn begin_file(&mut self) {
        self.file = Some(FileEntry::default());
    }

    pub fn file_set_name(&mut self, name: &str) -> BuildResult {
        self.file_mut()?.name = name.to_owned();
        Ok(())
    }

    pub fn file_set_size(&mut self, size: u64) -> BuildResult {
        self.file_mut()?.size = size;
        Ok(())
    }

    pub fn file_set_version(&mut self, version: &str) -> BuildResult {
        self.file_mut()?.version = Some(version.to_owned());
        Ok(())
    }

    pub fn file_set_language(&mut self, language: &str) -> BuildResult {
        self.file_mut()?.language = Some(language.to_owned());
        Ok(())
    }

    pub fn file_set_os(&mut self, os: &str) -> BuildResult {
        self.file_mut()?.os = Some(os.to_owned());
        Ok(())
    }

    pub fn file_set_maxconnections(&mut self, maxconnections: u32) -> BuildResult {
        self.file_mut()?.maxconnections = maxconnections;
        Ok(())
    }

    pub fn commit_file(&mut self) -> BuildResult {
        let file = self.file.take().ok_or(ErrorCode::InvalidState)?;
        reserve(&mut self.files, 1)?;
        self.files.push(file);
        Ok(())
    }

    // ---- resource transaction ----

    pub fn begin_resource(&mut self) {
        self.resource = Some(Resource::default());
    }

    pub fn resource_set_type(&mut self, mirror_type: &str) -> BuildResult {
        self.resource_mut()?.mirror_type = mirror_type.to_owned();
        Ok(())
    }

    pub fn resource_set_location(&mut self, location: &str) -> BuildResult {
        self.resource_mut()?.location = Some(location.to_owned());
        Ok(())
    }

    pub fn resource_set_preference(&mut self, preference: u32) -> BuildResult {
        self.resource_mut()?.preference = preference;
        Ok(())
    }

    pub fn resource_set_maxconnections(&mut self, maxconnections: u32) -> BuildResult {
        self.resource_mut()?.maxconnections = maxconnections;
        Ok(())
    }

    pub fn resource_set_url(&mut self, url: &str) -> BuildResult {
        self.resource_mut()?.url = url.to_owned();
        Ok(())
    }

    pub fn commit_resource(&mut self) -> BuildResult {
        let resource = self.resource.take().ok_or(ErrorCode::InvalidState)?;
        let file = self.file.as_mut().ok_or(ErrorCode::InvalidState)?;
        reserve(&mut file.resources, 1)?;
        file.resources.push(resource);
        Ok(())
    }

    // ---- checksum transaction ----

    pub fn begin_checksum(&mut self) {
        self.checksum = Some(Checksum::default());
    }

    pub fn checksum_set_type(&mut self, hash_type: &str) -> BuildResult {
        self.checksum_mut()?.hash_type = hash_type.to_owned();
        Ok(())
    }

    pub fn checksum_set_hash(&mut self, hash: &str) -> BuildResult {
        self.checksum_mut()?.hash = hash.to_owned();
        Ok(())
    }

    pub fn commit_checksum(&mut self) -> BuildResult {
        let checksum = self.checksum.take().ok_or(ErrorCode::InvalidState)?;
        let file = self.file.as_mut().ok_or(ErrorCode::InvalidState)?;
        reserve(&mut file.checksums, 1)?;
        file.checksums.push(checksum);
        Ok(())
    }

    // ---- chunk checksum transaction ----

    pub fn begin_chunk_checksum(&mut self) {
        self.chunk_checksum = Some(ChunkChecksum::default());
        self.piece_hashes.clear();
    }

    pub fn chunk_checksum_set_type(&mut self, hash_type: &str) -> BuildResult {
        self.chunk_checksum_mut()?.hash_type = hash_type.to_owned();
        Ok(())
    }

    pub fn chunk_checksum_set_length(&mut self, length: u64) -> BuildResult {
        self.chunk_checksum_mut()?.length = length;
        Ok(())
    }

    /// Commit the chunk checksum, taking ownership of the piece-hash
    /// collection accumulated under its `<pieces>` scope.
    pub fn commit_chunk_checksum(&mut self) -> BuildResult {
        let mut chunk = self.chunk_checksum.take().ok_or(ErrorCode::InvalidState)?;
        chunk.piece_hashes = std::mem::take(&mut self.piece_hashes);
        let file = self.file.as_mut().ok_or(ErrorCode::InvalidState)?;
        file.chunk_checksum = Some(chunk);
        Ok(())
    }

    // ---- piece hash transaction ----

    pub fn begin_piece_hash(&mut self) {
        self.piece_hash = Some(PieceHash::default());
    }

    pub fn piece_hash_set_piece(&mut self, piece: u32) -> BuildResult {
        self.piece_hash_mut()?.piece = piece;
        Ok(())
    }

    pub fn piece_hash_set_hash(&mut self, hash: &str) -> BuildResult {
        self.piece_hash_mut()?.hash = hash.to_owned();
        Ok(())
    }

    pub fn commit_piece_hash(&mut self) -> BuildResult {
        let piece_hash = self.piece_hash.take().ok_or(ErrorCode::InvalidState)?;
        reserve(&mut self.piece_hashes, 1)?;
        self.piece_hashes.push(piece_hash);
        Ok(())
    }

    // ---- staged-slot access ----

    fn file_mut(&mut self) -> Result<&mut FileEntry, ErrorCode> {
        self.file.as_mut().ok_or(ErrorCode::InvalidState)
    }

    fn resource_mut(&mut self) -> Result<&mut Resource, ErrorCode> {
        self.resource.as_mut().ok_or(ErrorCode::InvalidState)
    }

    fn checksum_mut(&mut self) -> Result<&mut Checksum, ErrorCode> {
        self.checksum.as_mut().ok_or(ErrorCode::InvalidState)
    }

    fn chunk_checksum_mut(&mut self) -> Result<&mut ChunkChecksum, ErrorCode> {
        self.chunk_checksum.as_mut().ok_or(ErrorCode::InvalidState)
    }

    fn piece_hash_mut(&mut self) -> Result<&mut PieceHash, ErrorCode> {
        self.piece_hash.as_mut().ok_or(ErrorCode::InvalidState)
    }
}

/// Grow a collection before a commit, mapping allocation failure to
/// [`ErrorCode::OutOfMemory`] instead of aborting.
fn reserve<T>(vec: &mut Vec<T>, additional: usize) -> BuildResult {
    vec.try_reserve(additional).map_err(|_| ErrorCode::OutOfMemory)
}
