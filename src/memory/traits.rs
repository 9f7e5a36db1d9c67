// Mon Oct 19 2026 - Alex

use crate::memory::{Address, MemoryError, MemoryRange};

/// Fixed-width value that can be decoded from little-endian image bytes.
pub trait Scalar: Sized + Copy {
    const SIZE: usize;

    /// `bytes` is exactly `SIZE` long.
    fn from_le_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_scalar!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

pub trait MemoryReader {
    fn bounds(&self) -> MemoryRange;
    fn read_bytes(&self, addr: Address, len: usize) -> Result<&[u8], MemoryError>;

    fn read<T: Scalar>(&self, addr: Address) -> Result<T, MemoryError> {
        self.read_bytes(addr, T::SIZE).map(T::from_le_slice)
    }

    fn read_u8(&self, addr: Address) -> Result<u8, MemoryError> {
        self.read(addr)
    }

    fn read_u16(&self, addr: Address) -> Result<u16, MemoryError> {
        self.read(addr)
    }

    fn read_u32(&self, addr: Address) -> Result<u32, MemoryError> {
        self.read(addr)
    }

    fn read_u64(&self, addr: Address) -> Result<u64, MemoryError> {
        self.read(addr)
    }

    fn read_i8(&self, addr: Address) -> Result<i8, MemoryError> {
        self.read(addr)
    }

    fn read_i16(&self, addr: Address) -> Result<i16, MemoryError> {
        self.read(addr)
    }

    fn read_i32(&self, addr: Address) -> Result<i32, MemoryError> {
        self.read(addr)
    }

    fn read_i64(&self, addr: Address) -> Result<i64, MemoryError> {
        self.read(addr)
    }

    fn read_c_string(&self, addr: Address, max_len: usize) -> Result<String, MemoryError> {
        let bounds = self.bounds();
        if !bounds.contains(addr) {
            return Err(MemoryError::OutOfBounds {
                address: addr,
                len: 1,
                start: bounds.start(),
                end: bounds.end(),
            });
        }
        let available = (bounds.end().as_u64() - addr.as_u64()) as usize;
        let bytes = self.read_bytes(addr, max_len.min(available))?;
        let null_pos = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..null_pos]).into_owned())
    }
}
