// Mon Oct 19 2026 - Alex

pub mod address;
pub mod error;
pub mod image;
pub mod mmap;
pub mod range;
pub mod segment;
pub mod traits;

pub use address::Address;
pub use error::MemoryError;
pub use image::{ByteImage, DEFAULT_VIRTUAL_BASE};
pub use mmap::MappedFile;
pub use range::MemoryRange;
pub use segment::Segment;
pub use traits::{MemoryReader, Scalar};
