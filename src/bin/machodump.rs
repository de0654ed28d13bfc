use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{command, Arg, ArgAction};

fn main() -> Result<()> {
    let matches = command!()
        .max_term_width(100)
        .args(&[
            Arg::new("input")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("The Mach-O file to decode"),
            Arg::new("keep-going")
                .short('k')
                .long("keep-going")
                .action(ArgAction::SetTrue)
                .help("Keep decoding the remaining slices of a fat file when one slice fails"),
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable verbose output"),
        ])
        .get_matches();

    if matches.get_flag("verbose") {
        env_logger::builder()
            .format_level(false)
            .format_target(false)
            .filter_module("macho_dissect", log::LevelFilter::Debug)
            .init();
    }

    let in_path = matches.get_one::<PathBuf>("input").unwrap();

    let in_file = fs::File::open(in_path)
        .with_context(|| format!("Failed to open input file '{}'", in_path.display()))?;
    let in_data = unsafe { memmap2::Mmap::map(&in_file) }
        .with_context(|| format!("Failed to map input file '{}'", in_path.display()))?;

    let options = macho_dissect::DecodeOptions {
        keep_going: matches.get_flag("keep-going"),
    };
    let tree = macho_dissect::decode_with(&in_data, options)
        .with_context(|| format!("Failed to decode input file '{}'", in_path.display()))?;
    print!("{}", tree);
    Ok(())
}
