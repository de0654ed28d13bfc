//! Integration tests over synthetic in-memory images.

use macho_dissect::{decode, decode_with, DecodeOptions, ErrorKind};

fn u32le(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn u64le(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn u32be(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn name16(out: &mut Vec<u8>, name: &str) {
    let mut buf = [0u8; 16];
    buf[..name.len()].copy_from_slice(name.as_bytes());
    out.extend_from_slice(&buf);
}

/// A 64-bit little-endian thin header. `flags` and `reserved` are zero.
fn thin64_le(cputype: u32, cpusubtype: u32, filetype: u32, ncmds: u32, sizeofcmds: u32) -> Vec<u8> {
    let mut out = Vec::new();
    for v in [
        0xfeed_facf,
        cputype,
        cpusubtype,
        filetype,
        ncmds,
        sizeofcmds,
        0,
        0,
    ] {
        u32le(&mut out, v);
    }
    out
}

/// A 32-bit big-endian thin header with zero flags.
fn thin32_be(cputype: u32, cpusubtype: u32, filetype: u32, ncmds: u32, sizeofcmds: u32) -> Vec<u8> {
    let mut out = Vec::new();
    for v in [
        0xfeed_face,
        cputype,
        cpusubtype,
        filetype,
        ncmds,
        sizeofcmds,
        0,
    ] {
        u32be(&mut out, v);
    }
    out
}

#[test]
fn rejects_unknown_magic() {
    let err = decode(&[0u8; 32]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FormatMismatch);
    assert_eq!(err.bit_offset(), 0);

    let err = decode(b"\x7fELF\x02\x01\x01\x00").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FormatMismatch);
}

#[test]
fn thin_64_header() {
    let data = thin64_le(0x0100_0007, 3, 2, 0, 0);
    let root = decode(&data).unwrap();

    let magic = root.get("header.magic").unwrap();
    assert_eq!(magic.as_u(), Some(0xfeed_facf));
    assert_eq!(magic.sym.as_deref(), Some("64-bit little endian"));

    let bits = root.get("header.bits").unwrap();
    assert!(bits.synthetic);
    assert_eq!(bits.as_u(), Some(64));
    assert_eq!(
        root.get("header.endian").unwrap().string().unwrap(),
        "little_endian"
    );

    assert_eq!(
        root.get("header.cputype").unwrap().sym.as_deref(),
        Some("CPU_TYPE_X86_64")
    );
    assert_eq!(
        root.get("header.filetype").unwrap().sym.as_deref(),
        Some("MH_EXECUTE")
    );
    assert!(root.get("load_commands").unwrap().children().is_empty());

    assert_eq!(root.reencode(), data);
}

#[test]
fn thin_32_big_endian_header() {
    let data = thin32_be(18, 0, 1, 0, 0);
    let root = decode(&data).unwrap();

    assert_eq!(
        root.get("header.magic").unwrap().sym.as_deref(),
        Some("32-bit big endian")
    );
    assert_eq!(root.get("header.bits").unwrap().as_u(), Some(32));
    assert_eq!(
        root.get("header.endian").unwrap().string().unwrap(),
        "big_endian"
    );
    let cputype = root.get("header.cputype").unwrap();
    assert_eq!(cputype.as_u(), Some(18));
    assert_eq!(cputype.sym.as_deref(), Some("CPU_TYPE_POWERPC"));
    assert!(root.get("header.reserved").is_none());

    assert_eq!(root.reencode(), data);
}

#[test]
fn thin_32_little_endian_header() {
    let mut data = Vec::new();
    for v in [0xfeed_face, 12, 9, 2, 0, 0, 0] {
        u32le(&mut data, v);
    }
    let root = decode(&data).unwrap();

    assert_eq!(
        root.get("header.magic").unwrap().sym.as_deref(),
        Some("32-bit little endian")
    );
    assert_eq!(root.get("header.bits").unwrap().as_u(), Some(32));
    assert_eq!(
        root.get("header.endian").unwrap().string().unwrap(),
        "little_endian"
    );
    assert_eq!(
        root.get("header.cputype").unwrap().sym.as_deref(),
        Some("CPU_TYPE_ARM")
    );
    assert_eq!(
        root.get("header.cpusubtype").unwrap().sym.as_deref(),
        Some("CPU_SUBTYPE_ARM_V7")
    );
    assert!(root.get("header.reserved").is_none());

    assert_eq!(root.reencode(), data);
}

#[test]
fn thin_64_big_endian_header() {
    let mut data = Vec::new();
    for v in [0xfeed_facf, 0x0100_000c, 0, 2, 0, 0, 0, 0] {
        u32be(&mut data, v);
    }
    let root = decode(&data).unwrap();

    assert_eq!(
        root.get("header.magic").unwrap().sym.as_deref(),
        Some("64-bit big endian")
    );
    assert_eq!(root.get("header.bits").unwrap().as_u(), Some(64));
    assert_eq!(
        root.get("header.endian").unwrap().string().unwrap(),
        "big_endian"
    );
    assert_eq!(
        root.get("header.cputype").unwrap().sym.as_deref(),
        Some("CPU_TYPE_ARM64")
    );
    assert!(root.get("header.reserved").is_some());

    assert_eq!(root.reencode(), data);
}

#[test]
fn nonzero_reserved_is_a_note_not_an_error() {
    let mut data = thin64_le(0x0100_000c, 0, 2, 0, 0);
    data[28] = 1;
    let root = decode(&data).unwrap();
    let reserved = root.get("header.reserved").unwrap();
    assert!(reserved.note.is_some());
}

#[test]
fn header_flag_bits() {
    let mut data = thin64_le(0x0100_0007, 3, 2, 0, 0);
    // first stream byte bit 6, last stream byte bit 7
    data[24] = 0b0000_0010;
    data[27] = 0b0000_0001;
    let root = decode(&data).unwrap();
    let flags = root.get("header.flags").unwrap();
    assert_eq!(flags.bits, 32);
    assert_eq!(
        flags.child("app_extension_safe").unwrap().as_u(),
        Some(1)
    );
    assert_eq!(flags.child("noundefs").unwrap().as_u(), Some(1));
    assert_eq!(flags.child("pie").unwrap().as_u(), Some(0));
}

#[test]
fn every_command_consumes_its_declared_size() {
    let mut cmds = Vec::new();

    // symtab, exact size
    u32le(&mut cmds, 0x2);
    u32le(&mut cmds, 24);
    for v in [0x1000, 10, 0x2000, 0x100] {
        u32le(&mut cmds, v);
    }

    // symtab with four trailing bytes
    u32le(&mut cmds, 0x2);
    u32le(&mut cmds, 28);
    for v in [0x1000, 10, 0x2000, 0x100, 0xdead_beef] {
        u32le(&mut cmds, v);
    }

    // unknown command id
    u32le(&mut cmds, 0x99);
    u32le(&mut cmds, 16);
    u32le(&mut cmds, 0x1111_1111);
    u32le(&mut cmds, 0x2222_2222);

    // main
    u32le(&mut cmds, 0x8000_0028);
    u32le(&mut cmds, 24);
    u64le(&mut cmds, 0x4000);
    u64le(&mut cmds, 0);

    // source version
    u32le(&mut cmds, 0x2a);
    u32le(&mut cmds, 16);
    u64le(&mut cmds, 0x1234);

    // uuid
    u32le(&mut cmds, 0x1b);
    u32le(&mut cmds, 24);
    cmds.extend_from_slice(&[
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
        0xee, 0xff,
    ]);

    // version min macosx
    u32le(&mut cmds, 0x24);
    u32le(&mut cmds, 16);
    u32le(&mut cmds, 0x000a_0f06);
    u32le(&mut cmds, 0x000a_0f00);

    // rpath
    u32le(&mut cmds, 0x8000_001c);
    u32le(&mut cmds, 20);
    u32le(&mut cmds, 12);
    cmds.extend_from_slice(b"@rpath\0\0");

    let mut data = thin64_le(0x0100_0007, 3, 2, 8, cmds.len() as u32);
    data.extend_from_slice(&cmds);
    let root = decode(&data).unwrap();

    let commands = root.get("load_commands").unwrap();
    assert_eq!(commands.children().len(), 8);
    for command in commands.children() {
        let cmdsize = command.child("cmdsize").unwrap().as_u().unwrap();
        assert_eq!(command.bits, cmdsize * 8, "command {:?}", command.name);
    }

    let unparsed = root.get("load_commands.1.unparsed").unwrap();
    assert_eq!(unparsed.bits, 32);

    let payload = root.get("load_commands.2.payload").unwrap();
    assert!(payload.unrecognized);

    assert_eq!(
        root.get("load_commands.5.uuid_command.uuid")
            .unwrap()
            .sym
            .as_deref(),
        Some("00112233-4455-6677-8899-aabbccddeeff")
    );
    assert_eq!(
        root.get("load_commands.6.version").unwrap().sym.as_deref(),
        Some("10.15.6")
    );
    assert_eq!(
        root.get("load_commands.7.name").unwrap().string().unwrap(),
        "@rpath"
    );

    assert_eq!(root.reencode(), data);
}

#[test]
fn dylib_name_keeps_full_span() {
    let mut cmds = Vec::new();
    u32le(&mut cmds, 0xc);
    u32le(&mut cmds, 32);
    u32le(&mut cmds, 24);
    u32le(&mut cmds, 0);
    u32le(&mut cmds, 0x0001_0203);
    u32le(&mut cmds, 0);
    cmds.extend_from_slice(b"lib\0zzz\0");

    let mut data = thin64_le(0x0100_0007, 3, 2, 1, cmds.len() as u32);
    data.extend_from_slice(&cmds);
    let root = decode(&data).unwrap();

    let dylib = root.get("load_commands.0.dylib_command").unwrap();
    let name = dylib.child("name").unwrap();
    assert_eq!(name.string().unwrap(), "lib");
    assert_eq!(name.as_bytes().unwrap(), b"lib\0zzz\0");

    let timestamp = dylib.child("timestamp").unwrap();
    assert!(timestamp.sym.as_deref().unwrap().starts_with("1970-01-01"));
    assert_eq!(
        dylib.child("current_version").unwrap().sym.as_deref(),
        Some("1.2.3")
    );
    assert_eq!(root.get("load_commands.0").unwrap().bits, 32 * 8);
    assert_eq!(root.reencode(), data);
}

#[test]
fn segment_64_with_one_section() {
    let mut cmds = Vec::new();
    u32le(&mut cmds, 0x19);
    u32le(&mut cmds, 152);
    name16(&mut cmds, "__TEXT");
    u64le(&mut cmds, 0x1_0000_0000);
    u64le(&mut cmds, 0x4000);
    u64le(&mut cmds, 0);
    u64le(&mut cmds, 0x4000);
    u32le(&mut cmds, 0xffff_ffff); // maxprot
    u32le(&mut cmds, 5); // initprot
    u32le(&mut cmds, 1); // nsects
    u32le(&mut cmds, 0); // flags
    name16(&mut cmds, "__cstring");
    name16(&mut cmds, "__TEXT");
    u64le(&mut cmds, 0x1_0000_1000);
    u64le(&mut cmds, 0x80);
    u32le(&mut cmds, 0x1000); // offset
    u32le(&mut cmds, 4); // align
    u32le(&mut cmds, 0); // reloff
    u32le(&mut cmds, 0); // nreloc
    u32le(&mut cmds, 0x0200_0000); // flags, type byte in the last stream byte
    u32le(&mut cmds, 0);
    u32le(&mut cmds, 0);
    u32le(&mut cmds, 0);

    let mut data = thin64_le(0x0100_0007, 3, 2, 1, cmds.len() as u32);
    data.extend_from_slice(&cmds);
    let root = decode(&data).unwrap();

    let segment = root.get("load_commands.0.segment_command").unwrap();
    assert_eq!(segment.child("segname").unwrap().string().unwrap(), "__TEXT");
    assert_eq!(segment.child("vmaddr").unwrap().as_u(), Some(0x1_0000_0000));
    assert_eq!(segment.child("maxprot").unwrap().as_s(), Some(-1));
    assert_eq!(segment.child("initprot").unwrap().as_s(), Some(5));

    let sections = root.get("load_commands.0.sections").unwrap();
    assert_eq!(sections.children().len(), 1);
    let section = &sections.children()[0];
    assert_eq!(section.child("sectname").unwrap().string().unwrap(), "__cstring");
    assert_eq!(section.child("size").unwrap().as_u(), Some(0x80));
    let section_type = section.get("flags.type").unwrap();
    assert_eq!(section_type.as_u(), Some(2));
    assert_eq!(section_type.sym.as_deref(), Some("S_CSTRING_LITERALS"));

    assert_eq!(root.get("load_commands.0").unwrap().bits, 152 * 8);
    assert_eq!(root.reencode(), data);
}

#[test]
fn segment_64_without_sections_advances_to_the_next_command() {
    let mut cmds = Vec::new();
    u32le(&mut cmds, 0x19);
    u32le(&mut cmds, 72);
    name16(&mut cmds, "__LINKEDIT");
    u64le(&mut cmds, 0x1_0001_0000);
    u64le(&mut cmds, 0x1000);
    u64le(&mut cmds, 0x8000);
    u64le(&mut cmds, 0x1000);
    u32le(&mut cmds, 1);
    u32le(&mut cmds, 1);
    u32le(&mut cmds, 0); // nsects
    u32le(&mut cmds, 0);
    // symtab directly after
    u32le(&mut cmds, 0x2);
    u32le(&mut cmds, 24);
    for v in [0x1000, 10, 0x2000, 0x100] {
        u32le(&mut cmds, v);
    }

    let mut data = thin64_le(0x0100_0007, 3, 2, 2, cmds.len() as u32);
    data.extend_from_slice(&cmds);
    let root = decode(&data).unwrap();

    assert!(root.get("load_commands.0.sections").unwrap().children().is_empty());
    assert_eq!(root.get("load_commands.0").unwrap().bits, 72 * 8);
    assert_eq!(
        root.get("load_commands.1.cmd").unwrap().sym.as_deref(),
        Some("symtab")
    );
}

#[test]
fn unixthread_x86_64_registers() {
    let mut cmds = Vec::new();
    u32le(&mut cmds, 0x5);
    u32le(&mut cmds, 184);
    u32le(&mut cmds, 4); // flavor
    u32le(&mut cmds, 42); // count, in 32-bit words
    for i in 0..21u64 {
        u64le(&mut cmds, 0x1000 + i);
    }

    let mut data = thin64_le(0x0100_0007, 3, 2, 1, cmds.len() as u32);
    data.extend_from_slice(&cmds);
    let root = decode(&data).unwrap();

    let state = root.get("load_commands.0.thread_state").unwrap();
    assert_eq!(state.children().len(), 21);
    assert_eq!(state.child("rax").unwrap().as_u(), Some(0x1000));
    assert_eq!(state.child("rip").unwrap().as_u(), Some(0x1000 + 16));
    assert_eq!(root.get("load_commands.0").unwrap().bits, 184 * 8);
}

#[test]
fn thread_state_falls_back_to_raw_words() {
    let mut cmds = Vec::new();
    u32le(&mut cmds, 0x4);
    u32le(&mut cmds, 24);
    u32le(&mut cmds, 1); // flavor
    u32le(&mut cmds, 2); // count
    u32le(&mut cmds, 0xaaaa_aaaa);
    u32le(&mut cmds, 0xbbbb_bbbb);

    // sparc has no register layout
    let mut data = thin64_le(14, 0, 2, 1, cmds.len() as u32);
    data.extend_from_slice(&cmds);
    let root = decode(&data).unwrap();

    let state = root.get("load_commands.0.state").unwrap();
    assert_eq!(state.bits, 64);
    assert!(root.get("load_commands.0.thread_state").is_none());
}

#[test]
fn prebound_bitmap_rounds_up_to_whole_bytes() {
    let mut cmds = Vec::new();
    u32le(&mut cmds, 0x10);
    u32le(&mut cmds, 24);
    u32le(&mut cmds, 20); // name_offset
    u32le(&mut cmds, 9); // nmodules
    u32le(&mut cmds, 22); // linked_modules_offset
    cmds.extend_from_slice(b"a\0");
    cmds.extend_from_slice(&[0xff, 0x01]);

    let mut data = thin64_le(0x0100_0007, 3, 2, 1, cmds.len() as u32);
    data.extend_from_slice(&cmds);
    let root = decode(&data).unwrap();

    let bitmap = root.get("load_commands.0.linked_modules").unwrap();
    assert_eq!(bitmap.as_bytes().unwrap(), &[0xff, 0x01]);
    assert_eq!(root.get("load_commands.0").unwrap().bits, 24 * 8);
}

#[test]
fn opaque_known_commands_are_flagged_unrecognized() {
    let mut cmds = Vec::new();
    // ident
    u32le(&mut cmds, 0x8);
    u32le(&mut cmds, 16);
    cmds.extend_from_slice(b"cc 1.0\0\0");
    // prepage
    u32le(&mut cmds, 0xa);
    u32le(&mut cmds, 12);
    u32le(&mut cmds, 0x1234);

    let mut data = thin64_le(0x0100_0007, 3, 2, 2, cmds.len() as u32);
    data.extend_from_slice(&cmds);
    let root = decode(&data).unwrap();

    let ident = root.get("load_commands.0.payload").unwrap();
    assert!(ident.unrecognized);
    assert_eq!(ident.as_bytes().unwrap(), b"cc 1.0\0\0");
    assert!(root.get("load_commands.1.payload").unwrap().unrecognized);
    for command in root.get("load_commands").unwrap().children() {
        let cmdsize = command.child("cmdsize").unwrap().as_u().unwrap();
        assert_eq!(command.bits, cmdsize * 8);
    }
}

fn fat_be(archs: &[(u32, u32, u32, u32)]) -> Vec<u8> {
    let mut out = Vec::new();
    u32be(&mut out, 0xcafe_babe);
    u32be(&mut out, archs.len() as u32);
    for &(cputype, cpusubtype, offset, size) in archs {
        u32be(&mut out, cputype);
        u32be(&mut out, cpusubtype);
        u32be(&mut out, offset);
        u32be(&mut out, size);
        u32be(&mut out, 0); // align
    }
    out
}

#[test]
fn fat_slices_decode_in_descriptor_order() {
    // descriptor order is the reverse of file order
    let mut data = fat_be(&[(0x0100_0007, 3, 80, 32), (18, 0, 48, 28)]);
    data.resize(48, 0);
    data.extend_from_slice(&thin32_be(18, 0, 1, 0, 0));
    data.resize(80, 0);
    data.extend_from_slice(&thin64_le(0x0100_0007, 3, 2, 0, 0));

    let root = decode(&data).unwrap();

    assert_eq!(
        root.get("fat_header.archs.0.offset").unwrap().as_u(),
        Some(80)
    );
    let files = root.get("files").unwrap();
    assert_eq!(files.children().len(), 2);
    assert_eq!(files.children()[0].start, 80 * 8);
    assert_eq!(
        root.get("files.0.header.cputype").unwrap().as_u(),
        Some(0x0100_0007)
    );
    assert_eq!(root.get("files.1.header.cputype").unwrap().as_u(), Some(18));
    assert_eq!(
        root.get("files.1.header.endian").unwrap().string().unwrap(),
        "big_endian"
    );
}

#[test]
fn fat_little_endian_container() {
    let mut data = Vec::new();
    u32le(&mut data, 0xcafe_babe);
    u32le(&mut data, 1); // narchs
    u32le(&mut data, 0x0100_0007);
    u32le(&mut data, 3);
    u32le(&mut data, 32); // offset
    u32le(&mut data, 32); // size
    u32le(&mut data, 0); // align
    data.resize(32, 0);
    data.extend_from_slice(&thin64_le(0x0100_0007, 3, 2, 0, 0));

    let root = decode(&data).unwrap();

    assert_eq!(root.get("fat_header.narchs").unwrap().as_u(), Some(1));
    let arch = root.get("fat_header.archs.0").unwrap();
    assert_eq!(arch.child("cputype").unwrap().as_u(), Some(0x0100_0007));
    assert_eq!(arch.child("offset").unwrap().as_u(), Some(32));
    assert!(root.get("files.0.header").is_some());
}

#[test]
fn failed_fat_slice_aborts_by_default() {
    let mut data = fat_be(&[(12, 0, 48, 16), (0x0100_0007, 3, 80, 32)]);
    data.resize(80, 0); // first slice is all zeros
    data.extend_from_slice(&thin64_le(0x0100_0007, 3, 2, 0, 0));

    let err = decode(&data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FormatMismatch);
    assert_eq!(err.bit_offset(), 48 * 8);
}

#[test]
fn keep_going_keeps_a_flagged_placeholder() {
    let mut data = fat_be(&[(12, 0, 48, 16), (0x0100_0007, 3, 80, 32)]);
    data.resize(80, 0);
    data.extend_from_slice(&thin64_le(0x0100_0007, 3, 2, 0, 0));

    let options = DecodeOptions { keep_going: true };
    let root = decode_with(&data, options).unwrap();

    let files = root.get("files").unwrap();
    assert_eq!(files.children().len(), 2);
    let failed = &files.children()[0];
    assert!(failed.unrecognized);
    assert!(failed.note.is_some());
    assert!(root.get("files.1.header").is_some());
}
