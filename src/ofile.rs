//! Magic classification and thin-object decoding.

use std::borrow::Cow;

use crate::dec::{Dec, Endian, Reader};
use crate::{fat, load_command, macho, DecodeOptions, Error, Result};

/// Pointer width of a thin object, fixed by its magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Width {
    W32,
    W64,
}

impl Width {
    pub(crate) fn bits(self) -> u64 {
        match self {
            Width::W32 => 32,
            Width::W64 => 64,
        }
    }

    /// Read a natural-width word field.
    pub(crate) fn word(self, d: &mut Dec, name: &'static str) -> Result<u64> {
        match self {
            Width::W32 => d.u32(name),
            Width::W64 => d.u64(name),
        }
    }

    /// Read a natural-width word field rendered in hexadecimal.
    pub(crate) fn word_hex(self, d: &mut Dec, name: &'static str) -> Result<u64> {
        match self {
            Width::W32 => d.u32_hex(name),
            Width::W64 => d.u64_hex(name),
        }
    }
}

/// Classify the magic at the current position and decode one file, thin or
/// fat.
///
/// The magic is probed with a separate cursor so the field is recorded inside
/// `header` (or `fat_header`) once the byte order is known. Fat slices
/// re-enter here with a fresh decoder.
pub(crate) fn decode_file(d: &mut Dec, options: &DecodeOptions) -> Result<()> {
    let mut probe = Reader::new(d.data());
    probe.seek_abs(d.pos())?;
    let magic = probe.read_uint(4, Endian::Little)?;
    match magic {
        macho::MH_MAGIC => thin(d, Endian::Little, Width::W32),
        macho::MH_CIGAM => thin(d, Endian::Big, Width::W32),
        macho::MH_MAGIC_64 => thin(d, Endian::Little, Width::W64),
        macho::MH_CIGAM_64 => thin(d, Endian::Big, Width::W64),
        macho::FAT_MAGIC => {
            d.endian = Endian::Little;
            fat::decode(d, options)
        }
        macho::FAT_CIGAM => {
            d.endian = Endian::Big;
            fat::decode(d, options)
        }
        _ => Err(Error::magic(d.pos(), magic as u32)),
    }
}

fn thin(d: &mut Dec, endian: Endian, width: Width) -> Result<()> {
    d.endian = endian;
    let mut cputype = 0;
    let mut ncmds = 0;
    d.strukt("header", |d| {
        d.u32_hex_with("magic", |m| macho::magic_description(m).map(Cow::Borrowed))?;
        d.value_u("bits", width.bits());
        d.value_str("endian", endian.name());
        cputype = d.u32_with("cputype", |v| macho::cpu_type_name(v).map(Cow::Borrowed))?;
        d.u32_with("cpusubtype", |v| {
            macho::cpu_subtype_name(cputype, v).map(Cow::Borrowed)
        })?;
        d.u32_with("filetype", |v| macho::file_type_name(v).map(Cow::Borrowed))?;
        ncmds = d.u32("ncmds")?;
        d.u32("sizeofcmds")?;
        d.strukt("flags", header_flags)?;
        if width == Width::W64 {
            d.raw_expect_zero("reserved", 32)?;
        }
        Ok(())
    })?;
    load_command::decode_commands(d, width, cputype, ncmds)
}

// Decoded in raw stream bit order regardless of the declared byte order,
// starting from the most significant bit of the first byte.
fn header_flags(d: &mut Dec) -> Result<()> {
    d.raw("reserved", 6)?;
    for name in [
        "app_extension_safe",
        "no_heap_execution",
        "has_tlv_descriptors",
        "dead_strippable_dylib",
        "pie",
        "no_reexported_dylibs",
        "setuid_safe",
        "root_safe",
        "allow_stack_execution",
        "binds_to_weak",
        "weak_defines",
        "canonical",
        "subsections_via_symbols",
        "allmodsbound",
        "prebindable",
        "nofixprebinding",
        "nomultidefs",
        "force_flat",
        "twolevel",
        "lazy_init",
        "split_segs",
        "prebound",
        "bindatload",
        "dyldlink",
        "incrlink",
        "noundefs",
    ] {
        d.bit(name)?;
    }
    Ok(())
}
