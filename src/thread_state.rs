//! Thread-state register blocks for `LC_THREAD` / `LC_UNIXTHREAD`.
//!
//! The register layout is selected by the header's cpu type. Unknown cpu
//! types fall back to an opaque block of `count` 32-bit words, so the command
//! boundary is always respected.

use crate::dec::Dec;
use crate::{macho, Result};

pub(crate) fn decode(d: &mut Dec, cputype: u64, count: u64) -> Result<()> {
    match cputype {
        macho::CPU_TYPE_X86 => d.strukt("thread_state", |d| {
            for name in [
                "eax", "ebx", "ecx", "edx", "edi", "esi", "ebp", "esp", "ss", "eflags", "eip",
                "cs", "ds", "es", "fs", "gs",
            ] {
                d.u32(name)?;
            }
            Ok(())
        }),
        macho::CPU_TYPE_X86_64 => d.strukt("thread_state", |d| {
            for name in [
                "rax", "rbx", "rcx", "rdx", "rdi", "rsi", "rbp", "rsp", "r8", "r9", "r10", "r11",
                "r12", "r13", "r14", "r15", "rip", "rflags", "cs", "fs", "gs",
            ] {
                d.u64(name)?;
            }
            Ok(())
        }),
        macho::CPU_TYPE_ARM => d.strukt("thread_state", |d| {
            d.array("r", "reg", |i| i < 13, |d| {
                d.u32("value")?;
                Ok(())
            })?;
            d.u32("sp")?;
            d.u32("lr")?;
            d.u32("pc")?;
            d.u32("cpsr")?;
            Ok(())
        }),
        macho::CPU_TYPE_ARM64 => d.strukt("thread_state", |d| {
            d.array("r", "reg", |i| i < 29, |d| {
                d.u64("value")?;
                Ok(())
            })?;
            d.u64("fp")?;
            d.u64("lr")?;
            d.u64("sp")?;
            d.u64("pc")?;
            d.u32("cpsr")?;
            d.u32("pad")?;
            Ok(())
        }),
        macho::CPU_TYPE_POWERPC => d.strukt("thread_state", |d| {
            d.array("srr", "reg", |i| i < 2, |d| {
                d.u32("value")?;
                Ok(())
            })?;
            d.array("r", "reg", |i| i < 32, |d| {
                d.u32("value")?;
                Ok(())
            })?;
            d.u32("ct")?;
            d.u32("xer")?;
            d.u32("lr")?;
            d.u32("ctr")?;
            d.u32("mq")?;
            d.u32("vrsave")?;
            Ok(())
        }),
        macho::CPU_TYPE_POWERPC64 => d.strukt("thread_state", |d| {
            d.array("srr", "reg", |i| i < 2, |d| {
                d.u64("value")?;
                Ok(())
            })?;
            d.array("r", "reg", |i| i < 32, |d| {
                d.u64("value")?;
                Ok(())
            })?;
            // ct stays 32-bit even in the 64-bit layout
            d.u32("ct")?;
            d.u64("xer")?;
            d.u64("lr")?;
            d.u64("ctr")?;
            d.u32("vrsave")?;
            Ok(())
        }),
        _ => d.raw("state", count * 32),
    }
}
