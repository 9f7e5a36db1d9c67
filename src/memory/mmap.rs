// Mon Oct 19 2026 - Alex

use crate::memory::MemoryError;
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Read-only file mapping backing a `ByteImage`.
pub struct MappedFile {
    mmap: Mmap,
    path: PathBuf,
}

impl MappedFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MemoryError> {
        let file = File::open(path.as_ref())?;
        // SAFETY: the mapping is never written through; callers accept that a
        // concurrent writer to the file would change the scanned bytes.
        let mmap = unsafe { Mmap::map(&file) }?;
        log::debug!("Mapped {} ({} bytes)", path.as_ref().display(), mmap.len());
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.mmap.as_ref()
    }
}
