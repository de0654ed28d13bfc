//! The decode engine: a bit-addressable cursor over a borrowed byte region,
//! and the field tree it produces.
//!
//! Every decoded field carries its name, typed raw value, optional symbolic
//! label, and exact source bit range, so a consumer can render the tree,
//! query it by path, or re-extract any sub-region of the input.

use std::borrow::Cow;
use std::fmt;
use std::mem;

use crate::{Error, Result};

/// Byte order of a decoded scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

impl Endian {
    /// The name used for the synthesized `endian` header field.
    pub fn name(self) -> &'static str {
        match self {
            Endian::Little => "little_endian",
            Endian::Big => "big_endian",
        }
    }
}

/// A bit-addressable cursor over a borrowed byte region.
///
/// Reads are MSB-first within the byte stream; multi-byte little-endian
/// scalars are read as whole bytes and then byte-reversed.
#[derive(Debug, Clone)]
pub struct Reader<'data> {
    data: &'data [u8],
    pos: u64,
}

impl<'data> Reader<'data> {
    /// Create a cursor positioned at bit 0.
    pub fn new(data: &'data [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    /// The underlying region.
    pub fn data(&self) -> &'data [u8] {
        self.data
    }

    /// Current position in bits.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Total region length in bits.
    pub fn bit_len(&self) -> u64 {
        self.data.len() as u64 * 8
    }

    /// Seek to an absolute bit position.
    pub fn seek_abs(&mut self, bit: u64) -> Result<()> {
        if bit > self.bit_len() {
            return Err(Error::exhausted(bit, 0, self.bit_len()));
        }
        self.pos = bit;
        Ok(())
    }

    /// Seek relative to the current bit position. Negative deltas seek backward.
    pub fn seek_rel(&mut self, delta: i64) -> Result<()> {
        let target = self.pos as i64 + delta;
        if target < 0 || target as u64 > self.bit_len() {
            return Err(Error::exhausted(self.pos, delta.unsigned_abs(), self.bit_len()));
        }
        self.pos = target as u64;
        Ok(())
    }

    /// Read `n` bits (`n <= 64`), MSB-first.
    pub fn read_bits(&mut self, n: u32) -> Result<u64> {
        debug_assert!(n <= 64);
        if n == 0 {
            return Ok(0);
        }
        let end = self.pos + n as u64;
        if end > self.bit_len() {
            return Err(Error::exhausted(self.pos, n as u64, self.bit_len()));
        }
        let mut value = 0u64;
        let mut pos = self.pos;
        let mut left = n;
        while left > 0 {
            let byte = self.data[(pos / 8) as usize] as u64;
            let avail = 8 - (pos % 8) as u32;
            let take = left.min(avail);
            let chunk = (byte >> (avail - take)) & ((1 << take) - 1);
            value = (value << take) | chunk;
            pos += take as u64;
            left -= take;
        }
        self.pos = pos;
        Ok(value)
    }

    /// Read an unsigned integer of `bytes` bytes (`1..=8`) in the given byte order.
    pub fn read_uint(&mut self, bytes: u32, endian: Endian) -> Result<u64> {
        let value = self.read_bits(bytes * 8)?;
        Ok(match endian {
            Endian::Big => value,
            Endian::Little if bytes == 1 => value,
            Endian::Little => value.swap_bytes() >> (8 * (8 - bytes)),
        })
    }

    /// Read `n` whole bytes. The cursor must be byte aligned.
    pub fn read_bytes(&mut self, n: u64) -> Result<&'data [u8]> {
        if self.pos % 8 != 0 {
            return Err(Error::unaligned(self.pos));
        }
        let end = self.pos + n * 8;
        if end > self.bit_len() {
            return Err(Error::exhausted(self.pos, n * 8, self.bit_len()));
        }
        let start = (self.pos / 8) as usize;
        self.pos = end;
        Ok(&self.data[start..start + n as usize])
    }

    /// Read bytes up to and including the next null terminator.
    ///
    /// The cursor must be byte aligned. Fails with an exhaustion error if no
    /// terminator exists before the end of the region.
    pub fn read_null_terminated(&mut self) -> Result<&'data [u8]> {
        if self.pos % 8 != 0 {
            return Err(Error::unaligned(self.pos));
        }
        let start = (self.pos / 8) as usize;
        match memchr::memchr(0, &self.data[start..]) {
            Some(idx) => {
                self.pos += (idx as u64 + 1) * 8;
                Ok(&self.data[start..start + idx + 1])
            }
            None => Err(Error::exhausted(
                self.pos,
                (self.data.len() - start) as u64 * 8,
                self.bit_len(),
            )),
        }
    }
}

/// The typed raw value of a decoded field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// An unsigned integer, up to 64 bits.
    U(u64),
    /// A signed integer.
    S(i64),
    /// A single bit.
    Bool(bool),
    /// An opaque bit/byte region.
    Bytes(Vec<u8>),
    /// A string span. The full span is kept, including any bytes after an
    /// embedded null terminator.
    Str(Vec<u8>),
    /// An ordered sequence of named sub-fields.
    Struct(Vec<Field>),
    /// An ordered sequence of repeated sub-fields.
    Array(Vec<Field>),
}

/// One node of the decoded field tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name.
    pub name: Cow<'static, str>,
    /// Typed raw value.
    pub value: Value,
    /// Optional symbolic label attached to the raw value.
    pub sym: Option<Cow<'static, str>>,
    /// Bit offset of the field within the decoded input.
    pub start: u64,
    /// Bit length of the field. Zero for synthesized fields.
    pub bits: u64,
    /// Byte order the scalar was read with. Used for re-serialization.
    pub endian: Endian,
    /// Render the value in hexadecimal.
    pub hex: bool,
    /// The field was synthesized and consumed no input bits.
    pub synthetic: bool,
    /// The region was consumed without being understood.
    pub unrecognized: bool,
    /// A soft inconsistency observed while decoding, e.g. non-zero reserved
    /// bits. The value is still decoded as-is.
    pub note: Option<Cow<'static, str>>,
}

impl Field {
    fn new(name: Cow<'static, str>, value: Value, start: u64, bits: u64, endian: Endian) -> Self {
        Field {
            name,
            value,
            sym: None,
            start,
            bits,
            endian,
            hex: false,
            synthetic: false,
            unrecognized: false,
            note: None,
        }
    }

    /// Create a struct field owning `children`.
    pub fn strukt(
        name: impl Into<Cow<'static, str>>,
        children: Vec<Field>,
        start: u64,
        bits: u64,
    ) -> Self {
        Field::new(name.into(), Value::Struct(children), start, bits, Endian::Big)
    }

    /// Create an array field owning `children`.
    pub fn array(
        name: impl Into<Cow<'static, str>>,
        children: Vec<Field>,
        start: u64,
        bits: u64,
    ) -> Self {
        Field::new(name.into(), Value::Array(children), start, bits, Endian::Big)
    }

    /// Create a synthesized string leaf that consumed no input bits.
    pub fn synthetic_str(
        name: impl Into<Cow<'static, str>>,
        text: impl Into<String>,
        start: u64,
    ) -> Self {
        let mut field = Field::new(
            name.into(),
            Value::Str(text.into().into_bytes()),
            start,
            0,
            Endian::Big,
        );
        field.synthetic = true;
        field
    }

    /// The ordered children of a struct or array field.
    pub fn children(&self) -> &[Field] {
        match &self.value {
            Value::Struct(children) | Value::Array(children) => children,
            _ => &[],
        }
    }

    /// The first child with the given name.
    pub fn child(&self, name: &str) -> Option<&Field> {
        self.children().iter().find(|f| f.name == name)
    }

    /// Look up a descendant by dotted path.
    ///
    /// Each component is a child name, or a numeric index into the children
    /// of an array: `"load_commands.1.cmdsize"`.
    pub fn get(&self, path: &str) -> Option<&Field> {
        let mut field = self;
        for part in path.split('.') {
            field = match part.parse::<usize>() {
                Ok(index) => field.children().get(index)?,
                Err(_) => field.child(part)?,
            };
        }
        Some(field)
    }

    /// The value as an unsigned integer.
    pub fn as_u(&self) -> Option<u64> {
        match self.value {
            Value::U(v) => Some(v),
            Value::Bool(v) => Some(v as u64),
            _ => None,
        }
    }

    /// The value as a signed integer.
    pub fn as_s(&self) -> Option<i64> {
        match self.value {
            Value::S(v) => Some(v),
            _ => None,
        }
    }

    /// The raw bytes of a string or opaque field.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Bytes(b) | Value::Str(b) => Some(b),
            _ => None,
        }
    }

    /// The string value, truncated at the first null terminator.
    pub fn string(&self) -> Option<Cow<'_, str>> {
        match &self.value {
            Value::Str(b) => {
                let end = memchr::memchr(0, b).unwrap_or(b.len());
                Some(String::from_utf8_lossy(&b[..end]))
            }
            _ => None,
        }
    }

    /// Re-serialize this subtree using the recorded field widths and byte
    /// orders.
    ///
    /// For a subtree decoded without seeks this reproduces the source bytes
    /// exactly. Synthesized fields are skipped.
    pub fn reencode(&self) -> Vec<u8> {
        let mut w = BitWriter::new();
        self.write_to(&mut w);
        w.finish()
    }

    fn write_to(&self, w: &mut BitWriter) {
        if self.synthetic {
            return;
        }
        match &self.value {
            Value::Struct(children) | Value::Array(children) => {
                for child in children {
                    child.write_to(w);
                }
            }
            Value::U(v) => w.write_uint(*v, self.bits as u32, self.endian),
            Value::S(v) => w.write_uint(*v as u64, self.bits as u32, self.endian),
            Value::Bool(v) => w.write_bits(*v as u64, 1),
            Value::Bytes(b) | Value::Str(b) => w.write_bytes(b),
        }
    }

    fn fmt_indent(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = indent * 4;
        match &self.value {
            Value::Struct(children) | Value::Array(children) => {
                writeln!(f, "{:pad$}{} {{", "", self.name, pad = pad)?;
                for child in children {
                    child.fmt_indent(f, indent + 1)?;
                }
                writeln!(f, "{:pad$}}}", "", pad = pad)
            }
            _ => {
                write!(f, "{:pad$}{}: ", "", self.name, pad = pad)?;
                match &self.value {
                    Value::U(v) if self.hex => write!(f, "{:#x}", v)?,
                    Value::U(v) => write!(f, "{}", v)?,
                    Value::S(v) => write!(f, "{}", v)?,
                    Value::Bool(v) => write!(f, "{}", v)?,
                    Value::Bytes(b) => write!(f, "{:02x?}", b)?,
                    Value::Str(_) => write!(f, "\"{}\"", self.string().unwrap_or_default())?,
                    Value::Struct(_) | Value::Array(_) => unreachable!(),
                }
                if let Some(sym) = &self.sym {
                    write!(f, " ({})", sym)?;
                }
                if self.unrecognized {
                    write!(f, " <unrecognized>")?;
                }
                if let Some(note) = &self.note {
                    write!(f, " [{}]", note)?;
                }
                writeln!(f)
            }
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indent(f, 0)
    }
}

/// Accumulates bits MSB-first for structural re-serialization.
#[derive(Debug, Default)]
pub struct BitWriter {
    out: Vec<u8>,
    cur: u8,
    used: u32,
}

impl BitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the low `n` bits of `value`, MSB-first.
    pub fn write_bits(&mut self, value: u64, n: u32) {
        for i in (0..n).rev() {
            let bit = ((value >> i) & 1) as u8;
            self.cur = (self.cur << 1) | bit;
            self.used += 1;
            if self.used == 8 {
                self.out.push(self.cur);
                self.cur = 0;
                self.used = 0;
            }
        }
    }

    /// Append an unsigned integer of `bits` width in the given byte order.
    pub fn write_uint(&mut self, value: u64, bits: u32, endian: Endian) {
        if endian == Endian::Little && bits > 8 && bits % 8 == 0 {
            self.write_bits(value.swap_bytes() >> (64 - bits), bits);
        } else {
            self.write_bits(value, bits);
        }
    }

    /// Append whole bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if self.used == 0 {
            self.out.extend_from_slice(bytes);
        } else {
            for &b in bytes {
                self.write_bits(b as u64, 8);
            }
        }
    }

    /// Flush and return the accumulated bytes. A trailing partial byte is
    /// padded with zero bits.
    pub fn finish(mut self) -> Vec<u8> {
        if self.used > 0 {
            self.out.push(self.cur << (8 - self.used));
        }
        self.out
    }
}

/// Builds one region's field tree while driving a [`Reader`].
///
/// A `Dec` owns the cursor state (position, byte order) for exactly one
/// decode invocation. Nested decodes, such as the thin objects inside a fat
/// container, each construct their own `Dec` from their own magic; cursor
/// state never crosses that boundary.
#[derive(Debug)]
pub struct Dec<'data> {
    r: Reader<'data>,
    /// Byte order for scalar reads. Fixed once the magic is classified.
    pub endian: Endian,
    root_start: u64,
    fields: Vec<Field>,
}

impl<'data> Dec<'data> {
    /// Create a decoder positioned at bit 0 of `data`.
    pub fn new(data: &'data [u8]) -> Self {
        Dec {
            r: Reader::new(data),
            endian: Endian::Little,
            root_start: 0,
            fields: Vec::new(),
        }
    }

    /// Create a decoder positioned at an absolute byte offset of `data`.
    pub fn new_at(data: &'data [u8], byte_offset: u64) -> Result<Self> {
        let mut d = Dec::new(data);
        d.r.seek_abs(byte_offset * 8)?;
        d.root_start = byte_offset * 8;
        Ok(d)
    }

    /// The underlying region.
    pub fn data(&self) -> &'data [u8] {
        self.r.data()
    }

    /// Current position in bits.
    pub fn pos(&self) -> u64 {
        self.r.pos()
    }

    /// Total region length in bits.
    pub fn bit_len(&self) -> u64 {
        self.r.bit_len()
    }

    /// Seek to an absolute bit position.
    pub fn seek_abs(&mut self, bit: u64) -> Result<()> {
        self.r.seek_abs(bit)
    }

    /// Seek relative to the current bit position.
    pub fn seek_rel(&mut self, delta: i64) -> Result<()> {
        self.r.seek_rel(delta)
    }

    /// A fatal error at the current position.
    pub fn fatal(&self, reason: &'static str) -> Error {
        Error::malformed(self.pos(), reason)
    }

    fn leaf(&mut self, name: Cow<'static, str>, value: Value, start: u64) -> &mut Field {
        let bits = self.r.pos() - start;
        let endian = self.endian;
        self.fields.push(Field::new(name, value, start, bits, endian));
        self.fields.last_mut().unwrap()
    }

    fn uint(&mut self, name: Cow<'static, str>, bytes: u32) -> Result<(u64, &mut Field)> {
        let start = self.r.pos();
        let endian = self.endian;
        let value = self.r.read_uint(bytes, endian)?;
        Ok((value, self.leaf(name, Value::U(value), start)))
    }

    /// Read an unsigned 8-bit field.
    pub fn u8(&mut self, name: impl Into<Cow<'static, str>>) -> Result<u64> {
        Ok(self.uint(name.into(), 1)?.0)
    }

    /// Read an unsigned 16-bit field.
    pub fn u16(&mut self, name: impl Into<Cow<'static, str>>) -> Result<u64> {
        Ok(self.uint(name.into(), 2)?.0)
    }

    /// Read an unsigned 32-bit field.
    pub fn u32(&mut self, name: impl Into<Cow<'static, str>>) -> Result<u64> {
        Ok(self.uint(name.into(), 4)?.0)
    }

    /// Read an unsigned 64-bit field.
    pub fn u64(&mut self, name: impl Into<Cow<'static, str>>) -> Result<u64> {
        Ok(self.uint(name.into(), 8)?.0)
    }

    /// Read an unsigned 32-bit field rendered in hexadecimal.
    pub fn u32_hex(&mut self, name: impl Into<Cow<'static, str>>) -> Result<u64> {
        let (value, field) = self.uint(name.into(), 4)?;
        field.hex = true;
        Ok(value)
    }

    /// Read an unsigned 64-bit field rendered in hexadecimal.
    pub fn u64_hex(&mut self, name: impl Into<Cow<'static, str>>) -> Result<u64> {
        let (value, field) = self.uint(name.into(), 8)?;
        field.hex = true;
        Ok(value)
    }

    /// Read an unsigned 8-bit field, attaching a symbolic label derived from
    /// the value.
    pub fn u8_with(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        sym: impl FnOnce(u64) -> Option<Cow<'static, str>>,
    ) -> Result<u64> {
        let (value, field) = self.uint(name.into(), 1)?;
        field.sym = sym(value);
        Ok(value)
    }

    /// Read an unsigned 32-bit field, attaching a symbolic label derived from
    /// the value. The stored raw value is not mutated.
    pub fn u32_with(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        sym: impl FnOnce(u64) -> Option<Cow<'static, str>>,
    ) -> Result<u64> {
        let (value, field) = self.uint(name.into(), 4)?;
        field.sym = sym(value);
        Ok(value)
    }

    /// Like [`Dec::u32_with`], rendered in hexadecimal.
    pub fn u32_hex_with(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        sym: impl FnOnce(u64) -> Option<Cow<'static, str>>,
    ) -> Result<u64> {
        let (value, field) = self.uint(name.into(), 4)?;
        field.hex = true;
        field.sym = sym(value);
        Ok(value)
    }

    /// Read a signed 32-bit field.
    pub fn s32(&mut self, name: impl Into<Cow<'static, str>>) -> Result<i64> {
        let start = self.r.pos();
        let endian = self.endian;
        let value = self.r.read_uint(4, endian)? as u32 as i32 as i64;
        self.leaf(name.into(), Value::S(value), start);
        Ok(value)
    }

    /// Read a single bit as a boolean field.
    pub fn bit(&mut self, name: impl Into<Cow<'static, str>>) -> Result<bool> {
        let start = self.r.pos();
        let value = self.r.read_bits(1)? != 0;
        self.leaf(name.into(), Value::Bool(value), start);
        Ok(value)
    }

    /// Read an opaque region of `bits` bits.
    pub fn raw(&mut self, name: impl Into<Cow<'static, str>>, bits: u64) -> Result<()> {
        self.raw_field(name.into(), bits)?;
        Ok(())
    }

    /// Read an opaque region and mark it unrecognized.
    pub fn raw_unknown(&mut self, name: impl Into<Cow<'static, str>>, bits: u64) -> Result<()> {
        let field = self.raw_field(name.into(), bits)?;
        field.unrecognized = true;
        Ok(())
    }

    /// Read an opaque region that is expected to be all zero.
    ///
    /// A violation is recorded as a note on the field but never aborts the
    /// decode.
    pub fn raw_expect_zero(&mut self, name: impl Into<Cow<'static, str>>, bits: u64) -> Result<()> {
        let start = self.r.pos();
        let field = self.raw_field(name.into(), bits)?;
        let zero = match &field.value {
            Value::Bytes(b) => b.iter().all(|&b| b == 0),
            Value::U(v) => *v == 0,
            _ => true,
        };
        if !zero {
            field.note = Some(Cow::Borrowed("expected all zero bits"));
            log::debug!("non-zero reserved bits at bit offset {}", start);
        }
        Ok(())
    }

    /// Read `len` whole bytes, attaching a symbolic label derived from them.
    pub fn bytes_with(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        len: u64,
        sym: impl FnOnce(&[u8]) -> Option<Cow<'static, str>>,
    ) -> Result<()> {
        let start = self.r.pos();
        let bytes = self.r.read_bytes(len)?.to_vec();
        let label = sym(&bytes);
        let field = self.leaf(name.into(), Value::Bytes(bytes), start);
        field.sym = label;
        Ok(())
    }

    fn raw_field(&mut self, name: Cow<'static, str>, bits: u64) -> Result<&mut Field> {
        let start = self.r.pos();
        let value = if bits % 8 == 0 {
            Value::Bytes(self.r.read_bytes(bits / 8)?.to_vec())
        } else {
            Value::U(self.r.read_bits(bits as u32)?)
        };
        Ok(self.leaf(name, value, start))
    }

    /// Read a fixed-length string span.
    ///
    /// The whole span is consumed and kept, including bytes after any
    /// embedded null terminator. [`Field::string`] truncates at the
    /// terminator for display.
    pub fn utf8_null_fixed(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        len: u64,
    ) -> Result<String> {
        let start = self.r.pos();
        let bytes = self.r.read_bytes(len)?.to_vec();
        let field = self.leaf(name.into(), Value::Str(bytes), start);
        Ok(field.string().unwrap_or_default().into_owned())
    }

    /// Read a null-terminated string, consuming the terminator.
    pub fn utf8_null(&mut self, name: impl Into<Cow<'static, str>>) -> Result<String> {
        let start = self.r.pos();
        let bytes = self.r.read_null_terminated()?.to_vec();
        let field = self.leaf(name.into(), Value::Str(bytes), start);
        Ok(field.string().unwrap_or_default().into_owned())
    }

    /// Record a synthesized unsigned value that consumed no input bits.
    pub fn value_u(&mut self, name: impl Into<Cow<'static, str>>, value: u64) {
        let start = self.r.pos();
        let field = self.leaf(name.into(), Value::U(value), start);
        field.synthetic = true;
    }

    /// Record a synthesized string value that consumed no input bits.
    pub fn value_str(&mut self, name: impl Into<Cow<'static, str>>, value: impl Into<String>) {
        let start = self.r.pos();
        let field = self.leaf(name.into(), Value::Str(value.into().into_bytes()), start);
        field.synthetic = true;
    }

    /// Push a prebuilt field into the current scope.
    pub fn push_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Decode a named sub-struct. Fields produced by `body` become its
    /// children.
    pub fn strukt(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        let start = self.r.pos();
        let saved = mem::take(&mut self.fields);
        let result = body(self);
        let children = mem::replace(&mut self.fields, saved);
        result?;
        let bits = self.r.pos().saturating_sub(start);
        self.fields.push(Field::strukt(name.into(), children, start, bits));
        Ok(())
    }

    /// Decode a named repeated sub-tree.
    ///
    /// `more` decides, given the element index, whether another element
    /// follows; the repetition count is supplied by the caller, not by the
    /// engine. Each element is a struct named `elem`.
    pub fn array(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        elem: &'static str,
        mut more: impl FnMut(usize) -> bool,
        mut body: impl FnMut(&mut Self) -> Result<()>,
    ) -> Result<()> {
        let start = self.r.pos();
        let saved = mem::take(&mut self.fields);
        let result = (|| {
            let mut index = 0;
            while more(index) {
                self.strukt(elem, &mut body)?;
                index += 1;
            }
            Ok(())
        })();
        let children = mem::replace(&mut self.fields, saved);
        result?;
        let bits = self.r.pos().saturating_sub(start);
        self.fields.push(Field::array(name.into(), children, start, bits));
        Ok(())
    }

    /// Consume the decoder, wrapping all produced fields in a root struct.
    pub fn finish(self, name: impl Into<Cow<'static, str>>) -> Field {
        let bits = self.r.pos().saturating_sub(self.root_start);
        Field::strukt(name.into(), self.fields, self.root_start, bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_reads_are_msb_first() {
        let mut r = Reader::new(&[0b1011_0001, 0xff]);
        assert_eq!(r.read_bits(3).unwrap(), 0b101);
        assert_eq!(r.read_bits(5).unwrap(), 0b1_0001);
        assert_eq!(r.pos(), 8);
        assert_eq!(r.read_bits(8).unwrap(), 0xff);
        assert_eq!(r.read_bits(1).unwrap_err().kind(), crate::ErrorKind::Exhausted);
    }

    #[test]
    fn uint_endianness() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut r = Reader::new(&data);
        assert_eq!(r.read_uint(4, Endian::Big).unwrap(), 0x0102_0304);
        r.seek_abs(0).unwrap();
        assert_eq!(r.read_uint(4, Endian::Little).unwrap(), 0x0403_0201);
    }

    #[test]
    fn unaligned_byte_read_fails() {
        let mut r = Reader::new(&[0xaa, 0xbb]);
        r.read_bits(3).unwrap();
        assert_eq!(r.read_bytes(1).unwrap_err().kind(), crate::ErrorKind::Unaligned);
    }

    #[test]
    fn null_terminated_read() {
        let mut r = Reader::new(b"abc\0def");
        assert_eq!(r.read_null_terminated().unwrap(), b"abc\0");
        assert_eq!(r.pos(), 32);
        assert!(r.read_null_terminated().is_err());
    }

    #[test]
    fn writer_round_trips_reader() {
        let data = [0xde, 0xad, 0xbe, 0xef, 0x12, 0x34];
        let mut r = Reader::new(&data);
        let mut w = BitWriter::new();
        w.write_bits(r.read_bits(5).unwrap(), 5);
        w.write_bits(r.read_bits(11).unwrap(), 11);
        w.write_uint(r.read_uint(4, Endian::Little).unwrap(), 32, Endian::Little);
        assert_eq!(w.finish(), data);
    }

    #[test]
    fn tree_scope_and_path_lookup() {
        let data = [0x01, 0x00, 0x02, 0x00];
        let mut d = Dec::new(&data);
        d.endian = Endian::Little;
        d.strukt("outer", |d| {
            d.u16("a")?;
            d.array("items", "item", |i| i < 1, |d| {
                d.u16("b")?;
                Ok(())
            })
        })
        .unwrap();
        let root = d.finish("root");
        assert_eq!(root.get("outer.a").unwrap().as_u(), Some(1));
        assert_eq!(root.get("outer.items.0.b").unwrap().as_u(), Some(2));
        assert_eq!(root.get("outer.items.0.b").unwrap().start, 16);
        assert_eq!(root.reencode(), data);
    }

    #[test]
    fn string_span_keeps_trailing_bytes() {
        let data = b"hi\0xx";
        let mut d = Dec::new(data);
        d.utf8_null_fixed("name", 5).unwrap();
        let root = d.finish("root");
        let name = root.get("name").unwrap();
        assert_eq!(name.string().unwrap(), "hi");
        assert_eq!(name.as_bytes().unwrap(), b"hi\0xx");
        assert_eq!(name.bits, 40);
    }
}
