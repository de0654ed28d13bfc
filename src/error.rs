use std::{error, fmt};

/// An error that terminated a decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    inner: ErrorInner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ErrorInner {
    /// The first four bytes of the region are not a recognized magic value.
    Magic { offset: u64, found: u32 },
    /// A read ran past the end of the region.
    Exhausted { offset: u64, wanted: u64, len: u64 },
    /// A byte-granular read was attempted at a position that is not byte aligned.
    Unaligned { offset: u64 },
    /// A declared size or offset is structurally impossible.
    Malformed { offset: u64, reason: &'static str },
}

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The region is not a Mach-O thin object or fat container.
    FormatMismatch,
    /// A read exceeded the remaining bytes of the region.
    Exhausted,
    /// A byte read at a bit position that is not a byte boundary.
    Unaligned,
    /// A declared size or offset cannot be satisfied.
    Malformed,
}

/// The result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            ErrorInner::Magic { offset, found } => write!(
                f,
                "unrecognized magic {:#010x} at byte offset {:#x}, expected a Mach-O thin or fat magic",
                found,
                offset / 8,
            ),
            ErrorInner::Exhausted { offset, wanted, len } => write!(
                f,
                "read of {} bits at {} exceeds region end at bit {}",
                wanted,
                BitPos(*offset),
                len,
            ),
            ErrorInner::Unaligned { offset } => {
                write!(f, "byte read at unaligned position {}", BitPos(*offset))
            }
            ErrorInner::Malformed { offset, reason } => {
                write!(f, "{} at {}", reason, BitPos(*offset))
            }
        }
    }
}

impl error::Error for Error {}

impl Error {
    /// Get the kind of error.
    pub fn kind(&self) -> ErrorKind {
        match self.inner {
            ErrorInner::Magic { .. } => ErrorKind::FormatMismatch,
            ErrorInner::Exhausted { .. } => ErrorKind::Exhausted,
            ErrorInner::Unaligned { .. } => ErrorKind::Unaligned,
            ErrorInner::Malformed { .. } => ErrorKind::Malformed,
        }
    }

    /// The bit offset within the decoded region at which the error was raised.
    pub fn bit_offset(&self) -> u64 {
        match self.inner {
            ErrorInner::Magic { offset, .. }
            | ErrorInner::Exhausted { offset, .. }
            | ErrorInner::Unaligned { offset }
            | ErrorInner::Malformed { offset, .. } => offset,
        }
    }

    pub(crate) fn magic(offset: u64, found: u32) -> Self {
        Self {
            inner: ErrorInner::Magic { offset, found },
        }
    }

    pub(crate) fn exhausted(offset: u64, wanted: u64, len: u64) -> Self {
        Self {
            inner: ErrorInner::Exhausted {
                offset,
                wanted,
                len,
            },
        }
    }

    pub(crate) fn unaligned(offset: u64) -> Self {
        Self {
            inner: ErrorInner::Unaligned { offset },
        }
    }

    pub(crate) fn malformed(offset: u64, reason: &'static str) -> Self {
        Self {
            inner: ErrorInner::Malformed { offset, reason },
        }
    }
}

/// A bit position displayed as a byte offset plus a bit remainder.
struct BitPos(u64);

impl fmt::Display for BitPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 8 == 0 {
            write!(f, "byte offset {:#x}", self.0 / 8)
        } else {
            write!(f, "byte offset {:#x}+{}bit", self.0 / 8, self.0 % 8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offset_and_discriminant() {
        let err = Error::magic(0, 0x1234_5678);
        assert_eq!(err.kind(), ErrorKind::FormatMismatch);
        let text = err.to_string();
        assert!(text.contains("0x12345678"));
        assert!(text.contains("0x0"));

        let err = Error::exhausted(100, 32, 104);
        assert_eq!(err.kind(), ErrorKind::Exhausted);
        assert!(err.to_string().contains("0xc+4bit"));
    }
}
