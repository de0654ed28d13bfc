//! Segment and section decoding.
//!
//! The width comes from the command id (`LC_SEGMENT` vs `LC_SEGMENT_64`),
//! not from the file header, and widens `vmaddr`/`vmsize`/`fileoff`/
//! `filesize` plus each section's `address`/`size` and a third reserved word.

use crate::dec::Dec;
use crate::ofile::Width;
use crate::{macho, Result};

pub(crate) fn decode(d: &mut Dec, width: Width) -> Result<()> {
    let mut nsects = 0;
    d.strukt("segment_command", |d| {
        d.utf8_null_fixed("segname", 16)?;
        width.word_hex(d, "vmaddr")?;
        width.word(d, "vmsize")?;
        width.word(d, "fileoff")?;
        width.word(d, "filesize")?;
        d.s32("maxprot")?;
        d.s32("initprot")?;
        nsects = d.u32("nsects")?;
        d.strukt("flags", |d| {
            d.raw("reserved", 28)?;
            d.bit("protected_version_1")?;
            d.bit("noreloc")?;
            d.bit("fvmlib")?;
            d.bit("highvm")?;
            Ok(())
        })
    })?;
    d.array(
        "sections",
        "section",
        |i| (i as u64) < nsects,
        |d| {
            d.utf8_null_fixed("sectname", 16)?;
            d.utf8_null_fixed("segname", 16)?;
            width.word_hex(d, "address")?;
            width.word(d, "size")?;
            d.u32("offset")?;
            d.u32("align")?;
            d.u32("reloff")?;
            d.u32("nreloc")?;
            d.strukt("flags", section_flags)?;
            d.u32("reserved1")?;
            d.u32("reserved2")?;
            if width == Width::W64 {
                d.u32("reserved3")?;
            }
            Ok(())
        },
    )
}

// 24 attribute bits followed by the 8-bit section type, in raw stream bit
// order.
fn section_flags(d: &mut Dec) -> Result<()> {
    d.bit("pure_instructions")?;
    d.bit("no_toc")?;
    d.bit("strip_static_syms")?;
    d.bit("no_dead_strip")?;
    d.bit("live_support")?;
    d.bit("self_modifying_code")?;
    d.bit("debug")?;
    d.raw("reserved", 14)?;
    d.bit("some_instructions")?;
    d.bit("ext_reloc")?;
    d.bit("loc_reloc")?;
    d.u8_with("type", |v| {
        macho::section_type_name(v).map(std::borrow::Cow::Borrowed)
    })?;
    Ok(())
}
