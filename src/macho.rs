//! Mach-O constants and symbol tables.
//!
//! Numeric codes found in Mach-O files mapped to human-readable labels:
//! magic values, cpu types and subtypes, load command ids, file types,
//! section types and build platforms.

#![allow(missing_docs)]

pub const MH_MAGIC: u64 = 0xfeed_face;
pub const MH_CIGAM: u64 = 0xcefa_edfe;
pub const MH_MAGIC_64: u64 = 0xfeed_facf;
pub const MH_CIGAM_64: u64 = 0xcffa_edfe;
pub const FAT_MAGIC: u64 = 0xcafe_babe;
pub const FAT_CIGAM: u64 = 0xbeba_feca;

/// The label attached to a recognized thin-object magic.
pub fn magic_description(magic: u64) -> Option<&'static str> {
    match magic {
        MH_MAGIC => Some("32-bit little endian"),
        MH_CIGAM => Some("32-bit big endian"),
        MH_MAGIC_64 => Some("64-bit little endian"),
        MH_CIGAM_64 => Some("64-bit big endian"),
        _ => None,
    }
}

pub const CPU_TYPE_ANY: u64 = 0xffff_ffff;
pub const CPU_TYPE_VAX: u64 = 1;
pub const CPU_TYPE_ROMP: u64 = 2;
pub const CPU_TYPE_NS32032: u64 = 4;
pub const CPU_TYPE_NS32332: u64 = 5;
pub const CPU_TYPE_MC680X0: u64 = 6;
pub const CPU_TYPE_X86: u64 = 7;
pub const CPU_TYPE_MIPS: u64 = 8;
pub const CPU_TYPE_NS32532: u64 = 9;
pub const CPU_TYPE_MC98000: u64 = 10;
pub const CPU_TYPE_HPPA: u64 = 11;
pub const CPU_TYPE_ARM: u64 = 12;
pub const CPU_TYPE_MC88000: u64 = 13;
pub const CPU_TYPE_SPARC: u64 = 14;
pub const CPU_TYPE_I860: u64 = 15;
pub const CPU_TYPE_I860_LITTLE: u64 = 16;
pub const CPU_TYPE_RS6000: u64 = 17;
pub const CPU_TYPE_POWERPC: u64 = 18;
pub const CPU_TYPE_VEO: u64 = 255;
pub const CPU_TYPE_X86_64: u64 = 0x0100_0007;
pub const CPU_TYPE_ARM64: u64 = 0x0100_000c;
pub const CPU_TYPE_POWERPC64: u64 = 0x0100_0013;

pub fn cpu_type_name(cputype: u64) -> Option<&'static str> {
    Some(match cputype {
        CPU_TYPE_ANY => "CPU_TYPE_ANY",
        CPU_TYPE_VAX => "CPU_TYPE_VAX",
        CPU_TYPE_ROMP => "CPU_TYPE_ROMP",
        CPU_TYPE_NS32032 => "CPU_TYPE_NS32032",
        CPU_TYPE_NS32332 => "CPU_TYPE_NS32332",
        CPU_TYPE_MC680X0 => "CPU_TYPE_MC680x0",
        CPU_TYPE_X86 => "CPU_TYPE_X86",
        CPU_TYPE_MIPS => "CPU_TYPE_MIPS",
        CPU_TYPE_NS32532 => "CPU_TYPE_NS32532",
        CPU_TYPE_MC98000 => "CPU_TYPE_MC98000",
        CPU_TYPE_HPPA => "CPU_TYPE_HPPA",
        CPU_TYPE_ARM => "CPU_TYPE_ARM",
        CPU_TYPE_MC88000 => "CPU_TYPE_MC88000",
        CPU_TYPE_SPARC => "CPU_TYPE_SPARC",
        CPU_TYPE_I860 => "CPU_TYPE_I860",
        CPU_TYPE_I860_LITTLE => "CPU_TYPE_I860_LITTLE",
        CPU_TYPE_RS6000 => "CPU_TYPE_RS6000",
        CPU_TYPE_POWERPC => "CPU_TYPE_POWERPC",
        CPU_TYPE_VEO => "CPU_TYPE_VEO",
        CPU_TYPE_X86_64 => "CPU_TYPE_X86_64",
        CPU_TYPE_ARM64 => "CPU_TYPE_ARM64",
        CPU_TYPE_POWERPC64 => "CPU_TYPE_POWERPC64",
        _ => return None,
    })
}

/// Intel cpu subtypes encode a family in the low nibble and a model above it.
const fn intel_subtype(family: u64, model: u64) -> u64 {
    family + (model << 4)
}

const CPU_SUBTYPE_I386_ALL: u64 = intel_subtype(3, 0);
const CPU_SUBTYPE_I486: u64 = intel_subtype(4, 0);
const CPU_SUBTYPE_486SX: u64 = intel_subtype(4, 8);
const CPU_SUBTYPE_PENT: u64 = intel_subtype(5, 0);
const CPU_SUBTYPE_PENTPRO: u64 = intel_subtype(6, 1);
const CPU_SUBTYPE_PENTII_M3: u64 = intel_subtype(6, 3);
const CPU_SUBTYPE_PENTII_M5: u64 = intel_subtype(6, 5);
const CPU_SUBTYPE_CELERON: u64 = intel_subtype(7, 6);
const CPU_SUBTYPE_CELERON_MOBILE: u64 = intel_subtype(7, 7);
const CPU_SUBTYPE_PENTIUM_3: u64 = intel_subtype(8, 0);
const CPU_SUBTYPE_PENTIUM_3_M: u64 = intel_subtype(8, 1);
const CPU_SUBTYPE_PENTIUM_3_XEON: u64 = intel_subtype(8, 2);
const CPU_SUBTYPE_PENTIUM_M: u64 = intel_subtype(9, 0);
const CPU_SUBTYPE_PENTIUM_4: u64 = intel_subtype(10, 0);
const CPU_SUBTYPE_PENTIUM_4_M: u64 = intel_subtype(10, 1);
const CPU_SUBTYPE_ITANIUM: u64 = intel_subtype(11, 0);
const CPU_SUBTYPE_ITANIUM_2: u64 = intel_subtype(11, 1);
const CPU_SUBTYPE_XEON: u64 = intel_subtype(12, 0);
const CPU_SUBTYPE_XEON_2: u64 = intel_subtype(12, 1);

/// The label for a cpu subtype, which is only meaningful relative to its
/// cpu type.
pub fn cpu_subtype_name(cputype: u64, cpusubtype: u64) -> Option<&'static str> {
    if cpusubtype == 0xffff_ffff {
        return Some("CPU_SUBTYPE_MULTIPLE");
    }
    Some(match cputype {
        CPU_TYPE_VAX => match cpusubtype {
            0 => "CPU_SUBTYPE_VAX_ALL",
            1 => "CPU_SUBTYPE_VAX780",
            2 => "CPU_SUBTYPE_VAX785",
            3 => "CPU_SUBTYPE_VAX750",
            4 => "CPU_SUBTYPE_VAX730",
            5 => "CPU_SUBTYPE_UVAXI",
            6 => "CPU_SUBTYPE_UVAXII",
            7 => "CPU_SUBTYPE_VAX8200",
            8 => "CPU_SUBTYPE_VAX8500",
            9 => "CPU_SUBTYPE_VAX8600",
            10 => "CPU_SUBTYPE_VAX8650",
            11 => "CPU_SUBTYPE_VAX8800",
            12 => "CPU_SUBTYPE_UVAXIII",
            _ => return None,
        },
        CPU_TYPE_MC680X0 => match cpusubtype {
            1 => "CPU_SUBTYPE_MC680X0_ALL",
            2 => "CPU_SUBTYPE_MC68040",
            3 => "CPU_SUBTYPE_MC68030_ONLY",
            _ => return None,
        },
        CPU_TYPE_X86 | CPU_TYPE_X86_64 => match cpusubtype {
            CPU_SUBTYPE_I386_ALL => "CPU_SUBTYPE_I386_ALL",
            CPU_SUBTYPE_I486 => "CPU_SUBTYPE_I486",
            CPU_SUBTYPE_486SX => "CPU_SUBTYPE_486SX",
            CPU_SUBTYPE_PENT => "CPU_SUBTYPE_PENT",
            CPU_SUBTYPE_PENTPRO => "CPU_SUBTYPE_PENTPRO",
            CPU_SUBTYPE_PENTII_M3 => "CPU_SUBTYPE_PENTII_M3",
            CPU_SUBTYPE_PENTII_M5 => "CPU_SUBTYPE_PENTII_M5",
            CPU_SUBTYPE_CELERON => "CPU_SUBTYPE_CELERON",
            CPU_SUBTYPE_CELERON_MOBILE => "CPU_SUBTYPE_CELERON_MOBILE",
            CPU_SUBTYPE_PENTIUM_3 => "CPU_SUBTYPE_PENTIUM_3",
            CPU_SUBTYPE_PENTIUM_3_M => "CPU_SUBTYPE_PENTIUM_3_M",
            CPU_SUBTYPE_PENTIUM_3_XEON => "CPU_SUBTYPE_PENTIUM_3_XEON",
            CPU_SUBTYPE_PENTIUM_M => "CPU_SUBTYPE_PENTIUM_M",
            CPU_SUBTYPE_PENTIUM_4 => "CPU_SUBTYPE_PENTIUM_4",
            CPU_SUBTYPE_PENTIUM_4_M => "CPU_SUBTYPE_PENTIUM_4_M",
            CPU_SUBTYPE_ITANIUM => "CPU_SUBTYPE_ITANIUM",
            CPU_SUBTYPE_ITANIUM_2 => "CPU_SUBTYPE_ITANIUM_2",
            CPU_SUBTYPE_XEON => "CPU_SUBTYPE_XEON",
            CPU_SUBTYPE_XEON_2 => "CPU_SUBTYPE_XEON_2",
            _ => return None,
        },
        CPU_TYPE_MIPS => match cpusubtype {
            0 => "CPU_SUBTYPE_MIPS_ALL",
            1 => "CPU_SUBTYPE_MIPS_R2300",
            2 => "CPU_SUBTYPE_MIPS_R2600",
            3 => "CPU_SUBTYPE_MIPS_R2800",
            4 => "CPU_SUBTYPE_MIPS_R2000A",
            5 => "CPU_SUBTYPE_MIPS_R2000",
            6 => "CPU_SUBTYPE_MIPS_R3000A",
            7 => "CPU_SUBTYPE_MIPS_R3000",
            _ => return None,
        },
        CPU_TYPE_MC98000 => match cpusubtype {
            0 => "CPU_SUBTYPE_MC98000_ALL",
            1 => "CPU_SUBTYPE_MC98001",
            _ => return None,
        },
        CPU_TYPE_HPPA => match cpusubtype {
            0 => "CPU_SUBTYPE_HPPA_ALL",
            1 => "CPU_SUBTYPE_HPPA_7100",
            2 => "CPU_SUBTYPE_HPPA_7100_LC",
            _ => return None,
        },
        CPU_TYPE_ARM => match cpusubtype {
            0 => "CPU_SUBTYPE_ARM_ALL",
            5 => "CPU_SUBTYPE_ARM_V4T",
            6 => "CPU_SUBTYPE_ARM_V6",
            7 => "CPU_SUBTYPE_ARM_V5TEJ",
            8 => "CPU_SUBTYPE_ARM_XSCALE",
            9 => "CPU_SUBTYPE_ARM_V7",
            10 => "CPU_SUBTYPE_ARM_V7F",
            11 => "CPU_SUBTYPE_ARM_V7S",
            12 => "CPU_SUBTYPE_ARM_V7K",
            13 => "CPU_SUBTYPE_ARM_V8",
            14 => "CPU_SUBTYPE_ARM_V6M",
            15 => "CPU_SUBTYPE_ARM_V7M",
            16 => "CPU_SUBTYPE_ARM_V7EM",
            _ => return None,
        },
        CPU_TYPE_MC88000 => match cpusubtype {
            0 => "CPU_SUBTYPE_MC88000_ALL",
            1 => "CPU_SUBTYPE_MC88100",
            2 => "CPU_SUBTYPE_MC88110",
            _ => return None,
        },
        CPU_TYPE_SPARC => match cpusubtype {
            0 => "CPU_SUBTYPE_SPARC_ALL",
            _ => return None,
        },
        CPU_TYPE_I860 => match cpusubtype {
            0 => "CPU_SUBTYPE_I860_ALL",
            1 => "CPU_SUBTYPE_I860_A860",
            _ => return None,
        },
        CPU_TYPE_POWERPC | CPU_TYPE_POWERPC64 => match cpusubtype {
            0 => "CPU_SUBTYPE_POWERPC_ALL",
            1 => "CPU_SUBTYPE_POWERPC_601",
            2 => "CPU_SUBTYPE_POWERPC_602",
            3 => "CPU_SUBTYPE_POWERPC_603",
            4 => "CPU_SUBTYPE_POWERPC_603E",
            5 => "CPU_SUBTYPE_POWERPC_603EV",
            6 => "CPU_SUBTYPE_POWERPC_604",
            7 => "CPU_SUBTYPE_POWERPC_604E",
            8 => "CPU_SUBTYPE_POWERPC_620",
            9 => "CPU_SUBTYPE_POWERPC_750",
            10 => "CPU_SUBTYPE_POWERPC_7400",
            11 => "CPU_SUBTYPE_POWERPC_7450",
            100 => "CPU_SUBTYPE_POWERPC_970",
            _ => return None,
        },
        CPU_TYPE_ARM64 => match cpusubtype {
            0 => "CPU_SUBTYPE_ARM64_ALL",
            1 => "CPU_SUBTYPE_ARM64_V8",
            2 => "CPU_SUBTYPE_ARM64E",
            _ => return None,
        },
        _ => return None,
    })
}

pub const LC_REQ_DYLD: u64 = 0x8000_0000;
pub const LC_SEGMENT: u64 = 0x1;
pub const LC_SYMTAB: u64 = 0x2;
pub const LC_SYMSEG: u64 = 0x3;
pub const LC_THREAD: u64 = 0x4;
pub const LC_UNIXTHREAD: u64 = 0x5;
pub const LC_LOADFVMLIB: u64 = 0x6;
pub const LC_IDFVMLIB: u64 = 0x7;
pub const LC_IDENT: u64 = 0x8;
pub const LC_FVMFILE: u64 = 0x9;
pub const LC_PREPAGE: u64 = 0xa;
pub const LC_DYSYMTAB: u64 = 0xb;
pub const LC_LOAD_DYLIB: u64 = 0xc;
pub const LC_ID_DYLIB: u64 = 0xd;
pub const LC_LOAD_DYLINKER: u64 = 0xe;
pub const LC_ID_DYLINKER: u64 = 0xf;
pub const LC_PREBOUND_DYLIB: u64 = 0x10;
pub const LC_ROUTINES: u64 = 0x11;
pub const LC_SUB_FRAMEWORK: u64 = 0x12;
pub const LC_SUB_UMBRELLA: u64 = 0x13;
pub const LC_SUB_CLIENT: u64 = 0x14;
pub const LC_SUB_LIBRARY: u64 = 0x15;
pub const LC_TWOLEVEL_HINTS: u64 = 0x16;
pub const LC_PREBIND_CKSUM: u64 = 0x17;
pub const LC_LOAD_WEAK_DYLIB: u64 = 0x18 | LC_REQ_DYLD;
pub const LC_SEGMENT_64: u64 = 0x19;
pub const LC_ROUTINES_64: u64 = 0x1a;
pub const LC_UUID: u64 = 0x1b;
pub const LC_RPATH: u64 = 0x1c | LC_REQ_DYLD;
pub const LC_CODE_SIGNATURE: u64 = 0x1d;
pub const LC_SEGMENT_SPLIT_INFO: u64 = 0x1e;
pub const LC_REEXPORT_DYLIB: u64 = 0x1f | LC_REQ_DYLD;
pub const LC_LAZY_LOAD_DYLIB: u64 = 0x20;
pub const LC_ENCRYPTION_INFO: u64 = 0x21;
pub const LC_DYLD_INFO: u64 = 0x22;
pub const LC_DYLD_INFO_ONLY: u64 = 0x22 | LC_REQ_DYLD;
pub const LC_LOAD_UPWARD_DYLIB: u64 = 0x23 | LC_REQ_DYLD;
pub const LC_VERSION_MIN_MACOSX: u64 = 0x24;
pub const LC_VERSION_MIN_IPHONEOS: u64 = 0x25;
pub const LC_FUNCTION_STARTS: u64 = 0x26;
pub const LC_DYLD_ENVIRONMENT: u64 = 0x27;
pub const LC_MAIN: u64 = 0x28 | LC_REQ_DYLD;
pub const LC_DATA_IN_CODE: u64 = 0x29;
pub const LC_SOURCE_VERSION: u64 = 0x2a;
pub const LC_DYLIB_CODE_SIGN_DRS: u64 = 0x2b;
pub const LC_ENCRYPTION_INFO_64: u64 = 0x2c;
pub const LC_LINKER_OPTION: u64 = 0x2d;
pub const LC_LINKER_OPTIMIZATION_HINT: u64 = 0x2e;
pub const LC_VERSION_MIN_TVOS: u64 = 0x2f;
pub const LC_VERSION_MIN_WATCHOS: u64 = 0x30;
pub const LC_NOTE: u64 = 0x31;
pub const LC_BUILD_VERSION: u64 = 0x32;

pub fn load_command_name(cmd: u64) -> Option<&'static str> {
    Some(match cmd {
        LC_SEGMENT => "segment",
        LC_SYMTAB => "symtab",
        LC_SYMSEG => "symseg",
        LC_THREAD => "thread",
        LC_UNIXTHREAD => "unixthread",
        LC_LOADFVMLIB => "loadfvmlib",
        LC_IDFVMLIB => "idfvmlib",
        LC_IDENT => "ident",
        LC_FVMFILE => "fvmfile",
        LC_PREPAGE => "prepage",
        LC_DYSYMTAB => "dysymtab",
        LC_LOAD_DYLIB => "load_dylib",
        LC_ID_DYLIB => "id_dylib",
        LC_LOAD_DYLINKER => "load_dylinker",
        LC_ID_DYLINKER => "id_dylinker",
        LC_PREBOUND_DYLIB => "prebound_dylib",
        LC_ROUTINES => "routines",
        LC_SUB_FRAMEWORK => "sub_framework",
        LC_SUB_UMBRELLA => "sub_umbrella",
        LC_SUB_CLIENT => "sub_client",
        LC_SUB_LIBRARY => "sub_library",
        LC_TWOLEVEL_HINTS => "twolevel_hints",
        LC_PREBIND_CKSUM => "prebind_cksum",
        LC_LOAD_WEAK_DYLIB => "load_weak_dylib",
        LC_SEGMENT_64 => "segment_64",
        LC_ROUTINES_64 => "routines_64",
        LC_UUID => "uuid",
        LC_RPATH => "rpath",
        LC_CODE_SIGNATURE => "code_signature",
        LC_SEGMENT_SPLIT_INFO => "segment_split_info",
        LC_REEXPORT_DYLIB => "reexport_dylib",
        LC_LAZY_LOAD_DYLIB => "lazy_load_dylib",
        LC_ENCRYPTION_INFO => "encryption_info",
        LC_DYLD_INFO => "dyld_info",
        LC_DYLD_INFO_ONLY => "dyld_info_only",
        LC_LOAD_UPWARD_DYLIB => "load_upward_dylib",
        LC_VERSION_MIN_MACOSX => "version_min_macosx",
        LC_VERSION_MIN_IPHONEOS => "version_min_iphoneos",
        LC_FUNCTION_STARTS => "function_starts",
        LC_DYLD_ENVIRONMENT => "dyld_environment",
        LC_MAIN => "main",
        LC_DATA_IN_CODE => "data_in_code",
        LC_SOURCE_VERSION => "source_version",
        LC_DYLIB_CODE_SIGN_DRS => "dylib_code_sign_drs",
        LC_ENCRYPTION_INFO_64 => "encryption_info_64",
        LC_LINKER_OPTION => "linker_option",
        LC_LINKER_OPTIMIZATION_HINT => "linker_optimization_hint",
        LC_VERSION_MIN_TVOS => "version_min_tvos",
        LC_VERSION_MIN_WATCHOS => "version_min_watchos",
        LC_NOTE => "note",
        LC_BUILD_VERSION => "build_version",
        _ => return None,
    })
}

pub const MH_OBJECT: u64 = 0x1;
pub const MH_EXECUTE: u64 = 0x2;
pub const MH_FVMLIB: u64 = 0x3;
pub const MH_CORE: u64 = 0x4;
pub const MH_PRELOAD: u64 = 0x5;
pub const MH_DYLIB: u64 = 0x6;
pub const MH_DYLINKER: u64 = 0x7;
pub const MH_BUNDLE: u64 = 0x8;
pub const MH_DYLIB_STUB: u64 = 0x9;
pub const MH_DSYM: u64 = 0xa;
pub const MH_KEXT_BUNDLE: u64 = 0xb;

pub fn file_type_name(filetype: u64) -> Option<&'static str> {
    Some(match filetype {
        MH_OBJECT => "MH_OBJECT",
        MH_EXECUTE => "MH_EXECUTE",
        MH_FVMLIB => "MH_FVMLIB",
        MH_CORE => "MH_CORE",
        MH_PRELOAD => "MH_PRELOAD",
        MH_DYLIB => "MH_DYLIB",
        MH_DYLINKER => "MH_DYLINKER",
        MH_BUNDLE => "MH_BUNDLE",
        MH_DYLIB_STUB => "MH_DYLIB_STUB",
        MH_DSYM => "MH_DSYM",
        MH_KEXT_BUNDLE => "MH_KEXT_BUNDLE",
        _ => return None,
    })
}

pub fn section_type_name(section_type: u64) -> Option<&'static str> {
    Some(match section_type {
        0x0 => "S_REGULAR",
        0x1 => "S_ZEROFILL",
        0x2 => "S_CSTRING_LITERALS",
        0x3 => "S_4BYTE_LITERALS",
        0x4 => "S_8BYTE_LITERALS",
        0x5 => "S_LITERAL_POINTERS",
        0x6 => "S_NON_LAZY_SYMBOL_POINTERS",
        0x7 => "S_LAZY_SYMBOL_POINTERS",
        0x8 => "S_SYMBOL_STUBS",
        0x9 => "S_MOD_INIT_FUNC_POINTERS",
        0xa => "S_MOD_TERM_FUNC_POINTERS",
        0xb => "S_COALESCED",
        0xc => "S_GB_ZEROFILL",
        0xd => "S_INTERPOSING",
        0xe => "S_16BYTE_LITERALS",
        0xf => "S_DTRACE_DOF",
        0x10 => "S_LAZY_DYLIB_SYMBOL_POINTERS",
        0x11 => "S_THREAD_LOCAL_REGULAR",
        0x12 => "S_THREAD_LOCAL_ZEROFILL",
        0x13 => "S_THREAD_LOCAL_VARIABLES",
        0x14 => "S_THREAD_LOCAL_VARIABLE_POINTERS",
        0x15 => "S_THREAD_LOCAL_INIT_FUNCTION_POINTERS",
        _ => return None,
    })
}

pub fn platform_name(platform: u64) -> Option<&'static str> {
    Some(match platform {
        1 => "PLATFORM_MACOS",
        2 => "PLATFORM_IOS",
        3 => "PLATFORM_TVOS",
        4 => "PLATFORM_WATCHOS",
        5 => "PLATFORM_BRIDGEOS",
        6 => "PLATFORM_MACCATALYST",
        7 => "PLATFORM_IOSSIMULATOR",
        8 => "PLATFORM_TVOSSIMULATOR",
        9 => "PLATFORM_WATCHOSSIMULATOR",
        10 => "PLATFORM_DRIVERKIT",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtype_names_depend_on_cpu_type() {
        assert_eq!(
            cpu_subtype_name(CPU_TYPE_X86, 3),
            Some("CPU_SUBTYPE_I386_ALL")
        );
        assert_eq!(cpu_subtype_name(CPU_TYPE_ARM, 9), Some("CPU_SUBTYPE_ARM_V7"));
        assert_eq!(cpu_subtype_name(CPU_TYPE_ARM64, 9), None);
        assert_eq!(
            cpu_subtype_name(CPU_TYPE_VAX, 0xffff_ffff),
            Some("CPU_SUBTYPE_MULTIPLE")
        );
    }

    #[test]
    fn command_names() {
        assert_eq!(load_command_name(LC_SEGMENT_64), Some("segment_64"));
        assert_eq!(load_command_name(LC_MAIN), Some("main"));
        assert_eq!(load_command_name(0x77), None);
    }
}
