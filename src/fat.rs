//! Fat (universal) container decoding.
//!
//! Two passes: the descriptor array is decoded first, then each recorded
//! slice offset is visited in descriptor order. Every slice gets a fresh
//! decoder seeded by its own magic, so byte order and width never leak
//! across slices.

use std::borrow::Cow;

use crate::dec::{Dec, Field};
use crate::{macho, ofile, DecodeOptions, Result};

pub(crate) fn decode(d: &mut Dec, options: &DecodeOptions) -> Result<()> {
    let mut narchs = 0;
    let mut offsets = Vec::new();
    d.strukt("fat_header", |d| {
        d.raw("magic", 32)?;
        narchs = d.u32("narchs")?;
        d.array(
            "archs",
            "fat_arch",
            |i| (i as u64) < narchs,
            |d| {
                let cputype =
                    d.u32_with("cputype", |v| macho::cpu_type_name(v).map(Cow::Borrowed))?;
                d.u32_with("cpusubtype", |v| {
                    macho::cpu_subtype_name(cputype, v).map(Cow::Borrowed)
                })?;
                offsets.push(d.u32("offset")?);
                d.u32("size")?;
                d.u32("align")?;
                Ok(())
            },
        )
    })?;

    let data = d.data();
    let mut files = Vec::new();
    for (index, &offset) in offsets.iter().enumerate() {
        log::debug!("fat slice {} at byte offset {:#x}", index, offset);
        let result = (|| -> Result<Field> {
            let mut slice = Dec::new_at(data, offset.into())?;
            ofile::decode_file(&mut slice, options)?;
            Ok(slice.finish("file"))
        })();
        match result {
            Ok(file) => files.push(file),
            Err(err) if options.keep_going => {
                log::warn!("fat slice {} failed to decode: {}", index, err);
                let mut file =
                    Field::synthetic_str("file", err.to_string(), u64::from(offset) * 8);
                file.unrecognized = true;
                file.note = Some(Cow::Borrowed("slice failed to decode"));
                files.push(file);
            }
            Err(err) => return Err(err),
        }
    }

    let start = files.iter().map(|f| f.start).min().unwrap_or_else(|| d.pos());
    let end = files
        .iter()
        .map(|f| f.start + f.bits)
        .max()
        .unwrap_or(start);
    d.push_field(Field::array("files", files, start, end - start));
    Ok(())
}
