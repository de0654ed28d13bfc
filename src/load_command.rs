//! The load-command dispatcher.
//!
//! Commands are decoded in a count-driven loop. Each command declares its own
//! total size, and the loop holds every decoder to it: bytes a recognized
//! payload leaves before the boundary become a raw `unparsed` field, unknown
//! or structurally opaque payloads are consumed whole, and a decoder running
//! past the boundary is a fatal error. The stream therefore never
//! desynchronizes on a command the dispatcher does not understand.

use std::borrow::Cow;

use chrono::DateTime;

use crate::dec::Dec;
use crate::ofile::Width;
use crate::{macho, segment, thread_state, Error, Result};

/// A packed 16.8.8 version number rendered as `X.Y.Z`.
fn version_label(v: u64) -> Option<Cow<'static, str>> {
    Some(format!("{}.{}.{}", v >> 16, (v >> 8) & 0xff, v & 0xff).into())
}

/// A Unix timestamp rendered as a UTC datetime.
fn timestamp_label(secs: u64) -> Option<Cow<'static, str>> {
    let dt = DateTime::from_timestamp(secs as i64, 0)?;
    Some(dt.format("%Y-%m-%dT%H:%M:%SZ").to_string().into())
}

fn uuid_label(bytes: &[u8]) -> Option<Cow<'static, str>> {
    uuid::Uuid::from_slice(bytes).ok().map(|u| u.to_string().into())
}

pub(crate) fn decode_commands(
    d: &mut Dec,
    width: Width,
    cputype: u64,
    ncmds: u64,
) -> Result<()> {
    d.array(
        "load_commands",
        "load_command",
        |i| (i as u64) < ncmds,
        |d| {
            let start = d.pos();
            let cmd = d.u32_hex_with("cmd", |v| macho::load_command_name(v).map(Cow::Borrowed))?;
            let cmdsize = d.u32("cmdsize")?;
            if cmdsize < 8 {
                return Err(Error::malformed(
                    start,
                    "load command size smaller than its fixed prefix",
                ));
            }
            let end = start + cmdsize * 8;
            if end > d.bit_len() {
                return Err(Error::exhausted(start, cmdsize * 8, d.bit_len()));
            }

            match cmd {
                macho::LC_SEGMENT => segment::decode(d, Width::W32)?,
                macho::LC_SEGMENT_64 => segment::decode(d, Width::W64)?,
                macho::LC_SYMTAB => {
                    d.u32("symoff")?;
                    d.u32("nsyms")?;
                    d.u32("stroff")?;
                    d.u32("strsize")?;
                }
                macho::LC_DYSYMTAB => {
                    for name in [
                        "ilocalsym",
                        "nlocalsym",
                        "iextdefsym",
                        "nextdefsym",
                        "iundefsym",
                        "nundefsym",
                        "tocoff",
                        "ntoc",
                        "modtaboff",
                        "nmodtab",
                        "extrefsymoff",
                        "nextrefsyms",
                        "indirectsymoff",
                        "nindirectsyms",
                        "extreloff",
                        "nextrel",
                        "locreloff",
                        "nlocrel",
                    ] {
                        d.u32(name)?;
                    }
                }
                macho::LC_THREAD | macho::LC_UNIXTHREAD => {
                    d.u32("flavor")?;
                    let count = d.u32("count")?;
                    thread_state::decode(d, cputype, count)?;
                }
                macho::LC_LOADFVMLIB | macho::LC_IDFVMLIB => {
                    d.strukt("fvmlib", |d| {
                        let offset = d.u32("offset")?;
                        d.u32("minor_version")?;
                        d.u32("header_addr")?;
                        let len = cmdsize
                            .checked_sub(offset)
                            .ok_or_else(|| d.fatal("name offset beyond its load command"))?;
                        d.utf8_null_fixed("name", len)?;
                        Ok(())
                    })?;
                }
                macho::LC_ID_DYLIB
                | macho::LC_LOAD_DYLIB
                | macho::LC_LOAD_WEAK_DYLIB
                | macho::LC_REEXPORT_DYLIB
                | macho::LC_LAZY_LOAD_DYLIB
                | macho::LC_LOAD_UPWARD_DYLIB => {
                    d.strukt("dylib_command", |d| {
                        let offset = d.u32("offset")?;
                        d.u32_with("timestamp", timestamp_label)?;
                        d.u32_with("current_version", version_label)?;
                        d.u32_with("compatibility_version", version_label)?;
                        let len = cmdsize
                            .checked_sub(offset)
                            .ok_or_else(|| d.fatal("name offset beyond its load command"))?;
                        d.utf8_null_fixed("name", len)?;
                        Ok(())
                    })?;
                }
                macho::LC_ID_DYLINKER
                | macho::LC_LOAD_DYLINKER
                | macho::LC_DYLD_ENVIRONMENT
                | macho::LC_RPATH
                | macho::LC_SUB_FRAMEWORK
                | macho::LC_SUB_UMBRELLA
                | macho::LC_SUB_CLIENT
                | macho::LC_SUB_LIBRARY => {
                    let offset = d.u32("offset")?;
                    let len = cmdsize
                        .checked_sub(offset)
                        .ok_or_else(|| d.fatal("name offset beyond its load command"))?;
                    d.utf8_null_fixed("name", len)?;
                }
                macho::LC_PREBOUND_DYLIB => {
                    d.u32("name_offset")?;
                    let nmodules = d.u32("nmodules")?;
                    d.u32("linked_modules_offset")?;
                    d.utf8_null("name")?;
                    // one bit per module, rounded up to whole bytes
                    d.raw("linked_modules", nmodules.div_ceil(8) * 8)?;
                }
                macho::LC_ROUTINES | macho::LC_ROUTINES_64 => {
                    let w = if cmd == macho::LC_ROUTINES {
                        Width::W32
                    } else {
                        Width::W64
                    };
                    w.word_hex(d, "init_address")?;
                    w.word(d, "init_module")?;
                    for name in [
                        "reserved1",
                        "reserved2",
                        "reserved3",
                        "reserved4",
                        "reserved5",
                        "reserved6",
                    ] {
                        w.word(d, name)?;
                    }
                }
                macho::LC_TWOLEVEL_HINTS => {
                    d.u32("offset")?;
                    d.u32("nhints")?;
                }
                macho::LC_MAIN => {
                    d.strukt("entrypoint", |d| {
                        d.u64("entryoff")?;
                        d.u64("stacksize")?;
                        Ok(())
                    })?;
                }
                macho::LC_SOURCE_VERSION => {
                    d.strukt("source_version_tag", |d| {
                        d.u64("tag")?;
                        Ok(())
                    })?;
                }
                macho::LC_ENCRYPTION_INFO | macho::LC_ENCRYPTION_INFO_64 => {
                    d.strukt("encryption_info", |d| {
                        d.u32("offset")?;
                        d.u32("size")?;
                        d.u32("id")?;
                        Ok(())
                    })?;
                }
                macho::LC_CODE_SIGNATURE
                | macho::LC_SEGMENT_SPLIT_INFO
                | macho::LC_FUNCTION_STARTS
                | macho::LC_DATA_IN_CODE
                | macho::LC_DYLIB_CODE_SIGN_DRS
                | macho::LC_LINKER_OPTIMIZATION_HINT => {
                    d.strukt("linkedit_data", |d| {
                        d.u32("off")?;
                        d.u32("size")?;
                        Ok(())
                    })?;
                }
                macho::LC_DYLD_INFO | macho::LC_DYLD_INFO_ONLY => {
                    d.strukt("dyld_info", |d| {
                        for name in [
                            "rebase_off",
                            "rebase_size",
                            "bind_off",
                            "bind_size",
                            "weak_bind_off",
                            "weak_bind_size",
                            "lazy_bind_off",
                            "lazy_bind_size",
                            "export_off",
                            "export_size",
                        ] {
                            d.u32(name)?;
                        }
                        Ok(())
                    })?;
                }
                macho::LC_UUID => {
                    d.strukt("uuid_command", |d| d.bytes_with("uuid", 16, uuid_label))?;
                }
                macho::LC_BUILD_VERSION => {
                    d.u32_with("platform", |v| macho::platform_name(v).map(Cow::Borrowed))?;
                    d.u32_with("minos", version_label)?;
                    d.u32_with("sdk", version_label)?;
                    let ntools = d.u32("ntools")?;
                    d.array(
                        "tools",
                        "tool",
                        |i| (i as u64) < ntools,
                        |d| {
                            d.u32("tool")?;
                            d.u32_with("version", version_label)?;
                            Ok(())
                        },
                    )?;
                }
                macho::LC_VERSION_MIN_MACOSX
                | macho::LC_VERSION_MIN_IPHONEOS
                | macho::LC_VERSION_MIN_TVOS
                | macho::LC_VERSION_MIN_WATCHOS => {
                    d.u32_with("version", version_label)?;
                    d.u32_with("sdk", version_label)?;
                }
                macho::LC_LINKER_OPTION => {
                    d.strukt("linker_option", |d| {
                        let count = d.u32("count")?;
                        d.utf8_null_fixed("option", count)?;
                        Ok(())
                    })?;
                }
                unknown => {
                    // known commands without a fixed payload structure, e.g.
                    // ident or prepage, are skipped the same way as unknown ids
                    if macho::load_command_name(unknown).is_none() {
                        log::debug!("unknown load command {:#x}", unknown);
                    }
                    let rest = end - d.pos();
                    if rest > 0 {
                        d.raw_unknown("payload", rest)?;
                    }
                }
            }

            let pos = d.pos();
            if pos > end {
                return Err(Error::malformed(
                    pos,
                    "load command payload overruns its declared size",
                ));
            }
            if pos < end {
                d.raw("unparsed", end - pos)?;
            }
            Ok(())
        },
    )
}
