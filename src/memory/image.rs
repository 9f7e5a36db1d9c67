// Mon Oct 19 2026 - Alex

use crate::memory::{Address, MappedFile, MemoryError, MemoryRange, MemoryReader};
use crate::pattern::Matcher;
use std::fmt;
use std::fs;
use std::path::Path;

pub const DEFAULT_VIRTUAL_BASE: u64 = 0x400000;

enum Storage<'a> {
    Borrowed(&'a [u8]),
    Owned(Vec<u8>),
    Mapped(MappedFile),
}

impl Storage<'_> {
    fn as_slice(&self) -> &[u8] {
        match self {
            Storage::Borrowed(bytes) => bytes,
            Storage::Owned(bytes) => bytes,
            Storage::Mapped(file) => file.as_slice(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Storage::Borrowed(_) => "borrowed",
            Storage::Owned(_) => "owned",
            Storage::Mapped(_) => "mapped",
        }
    }
}

/// Contiguous byte buffer that matchers scan. Addresses handed out by the
/// image are the addresses of the backing bytes themselves, so they stay
/// valid for as long as the image lives.
pub struct ByteImage<'a> {
    storage: Storage<'a>,
    virtual_base: u64,
}

impl<'a> ByteImage<'a> {
    pub fn from_memory(bytes: &'a [u8]) -> Self {
        Self {
            storage: Storage::Borrowed(bytes),
            virtual_base: DEFAULT_VIRTUAL_BASE,
        }
    }

    pub fn with_virtual_base(mut self, virtual_base: u64) -> Self {
        self.virtual_base = virtual_base;
        self
    }

    pub fn start(&self) -> Address {
        Address::from_ptr(self.as_slice().as_ptr())
    }

    pub fn end(&self) -> Address {
        self.bounds().end()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn virtual_base(&self) -> u64 {
        self.virtual_base
    }

    pub fn as_slice(&self) -> &[u8] {
        self.storage.as_slice()
    }

    pub fn contains(&self, addr: Address) -> bool {
        self.bounds().contains(addr)
    }

    /// Buffer-relative offset of `addr`.
    pub fn offset_of(&self, addr: Address) -> Result<usize, MemoryError> {
        self.check_span(addr, 1)?;
        Ok((addr.as_u64() - self.start().as_u64()) as usize)
    }

    pub fn address_at(&self, raw_offset: usize) -> Result<Address, MemoryError> {
        let start = self.start();
        let addr = start
            .checked_add(raw_offset as u64)
            .ok_or(MemoryError::AddressOverflow(start))?;
        self.check_span(addr, 1)?;
        Ok(addr)
    }

    pub fn byte_at(&self, addr: Address) -> Result<u8, MemoryError> {
        self.read_bytes(addr, 1).map(|bytes| bytes[0])
    }

    pub fn check_span(&self, addr: Address, len: u64) -> Result<(), MemoryError> {
        let bounds = self.bounds();
        if bounds.contains_span(addr, len) {
            Ok(())
        } else {
            Err(MemoryError::OutOfBounds {
                address: addr,
                len,
                start: bounds.start(),
                end: bounds.end(),
            })
        }
    }

    pub fn matcher(&self) -> Matcher<'_> {
        Matcher::new(self)
    }

    pub fn matcher_at(&self, start: Address) -> Result<Matcher<'_>, MemoryError> {
        self.check_span(start, 1)?;
        Ok(Matcher::with_start(self, start))
    }
}

impl ByteImage<'static> {
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            storage: Storage::Owned(bytes),
            virtual_base: DEFAULT_VIRTUAL_BASE,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MemoryError> {
        let bytes = fs::read(path.as_ref())?;
        log::debug!("Loaded {} ({} bytes)", path.as_ref().display(), bytes.len());
        Ok(Self::from_vec(bytes))
    }

    pub fn map_file<P: AsRef<Path>>(path: P) -> Result<Self, MemoryError> {
        let mapped = MappedFile::open(path)?;
        Ok(Self {
            storage: Storage::Mapped(mapped),
            virtual_base: DEFAULT_VIRTUAL_BASE,
        })
    }
}

impl MemoryReader for ByteImage<'_> {
    fn bounds(&self) -> MemoryRange {
        MemoryRange::spanning(self.start(), self.len())
    }

    fn read_bytes(&self, addr: Address, len: usize) -> Result<&[u8], MemoryError> {
        self.check_span(addr, len as u64)?;
        let offset = (addr.as_u64() - self.start().as_u64()) as usize;
        Ok(&self.as_slice()[offset..offset + len])
    }
}

impl fmt::Debug for ByteImage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteImage")
            .field("storage", &self.storage.kind())
            .field("start", &self.start())
            .field("len", &self.len())
            .field("virtual_base", &format_args!("{:#x}", self.virtual_base))
            .finish()
    }
}
