//! # `macho-dissect`
//!
//! A structural decoder for the Mach-O family: thin objects, fat (universal)
//! containers, the load-command stream, and per-architecture thread-state
//! blocks.
//!
//! Decoding produces an ordered field tree rather than typed views. Every
//! field carries its name, raw value, optional symbolic label, and the exact
//! bit range it was read from, so the tree can be rendered, queried by path,
//! or re-serialized back to the source bytes.
//!
//! ```no_run
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let data = std::fs::read("a.out")?;
//!     let tree = macho_dissect::decode(&data)?;
//!     println!("{}", tree.get("header.cputype").unwrap());
//!     print!("{}", tree);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod dec;
mod error;
mod fat;
mod load_command;
pub mod macho;
mod ofile;
mod segment;
mod thread_state;

pub use dec::{BitWriter, Dec, Endian, Field, Reader, Value};
pub use error::{Error, ErrorKind, Result};

/// Options controlling a decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Continue past a fat slice that fails to decode.
    ///
    /// By default the first fatal error anywhere aborts the whole decode.
    /// With `keep_going` a failed slice is kept in the tree as a field
    /// flagged unrecognized and carrying the error text, and decoding moves
    /// on to the next slice.
    pub keep_going: bool,
}

/// Decode a Mach-O thin object or fat container with default options.
pub fn decode(data: &[u8]) -> Result<Field> {
    decode_with(data, DecodeOptions::default())
}

/// Decode a Mach-O thin object or fat container.
pub fn decode_with(data: &[u8], options: DecodeOptions) -> Result<Field> {
    let mut d = Dec::new(data);
    ofile::decode_file(&mut d, &options)?;
    Ok(d.finish("macho"))
}
