//! Random-access, read-only views of the input.

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::boundary::ByteRange;
use crate::error::{ChunkError, PipelineError};

/// Read-only input addressable by byte offset.
///
/// Shared by every worker of a run; implementations must not change their
/// contents while a run is in progress.
pub trait ByteSource: Sync {
    /// The whole input. Used for boundary planning.
    fn as_bytes(&self) -> &[u8];

    fn len(&self) -> usize {
        self.as_bytes().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes of `range`, or a chunk failure if they cannot be read.
    fn read_range(&self, range: ByteRange) -> Result<&[u8], ChunkError> {
        let bytes = self.as_bytes();
        bytes
            .get(range.as_range())
            .ok_or(ChunkError::OutOfBounds {
                range,
                len: bytes.len(),
            })
    }
}

impl ByteSource for [u8] {
    fn as_bytes(&self) -> &[u8] {
        self
    }
}

impl ByteSource for Vec<u8> {
    fn as_bytes(&self) -> &[u8] {
        self
    }
}

impl ByteSource for str {
    fn as_bytes(&self) -> &[u8] {
        str::as_bytes(self)
    }
}

/// A file mapped read-only into memory.
pub struct MappedFile {
    path: PathBuf,
    // `None` for zero-length files, which cannot be mapped on every platform.
    mmap: Option<Mmap>,
}

impl MappedFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| PipelineError::Open {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(open_err)?;
        let len = file.metadata().map_err(open_err)?.len();
        let mmap = if len == 0 {
            None
        } else {
            // SAFETY: the map is read-only and the input is not modified while
            // a run holds it.
            Some(unsafe { Mmap::map(&file) }.map_err(open_err)?)
        };
        Ok(Self { path, mmap })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for MappedFile {
    fn as_bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_range_rejects_out_of_bounds() {
        let data = b"A;1.0\n".to_vec();
        assert_eq!(data.read_range(ByteRange::new(0, 6)).unwrap(), b"A;1.0\n");
        let err = data.read_range(ByteRange::new(2, 9)).unwrap_err();
        assert!(matches!(err, ChunkError::OutOfBounds { len: 6, .. }));
    }

    #[test]
    fn mapped_file_exposes_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"A;1.0\nB;2.0\n").unwrap();
        file.flush().unwrap();

        let mapped = MappedFile::open(file.path()).unwrap();
        assert_eq!(mapped.len(), 12);
        assert_eq!(mapped.read_range(ByteRange::new(6, 12)).unwrap(), b"B;2.0\n");
    }

    #[test]
    fn mapped_file_handles_empty_input() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mapped = MappedFile::open(file.path()).unwrap();
        assert!(mapped.is_empty());
    }

    #[test]
    fn missing_file_is_open_error() {
        let err = MappedFile::open("/definitely/not/here.txt").err().unwrap();
        assert!(matches!(err, PipelineError::Open { .. }));
    }
}
