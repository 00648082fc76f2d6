extern crate p2asm;

use std::fs::File;
use std::io::prelude::*;
use std::path::PathBuf;

use byteorder::{LittleEndian, WriteBytesExt};
use clap::Parser;
use log::{error, info, LevelFilter};

use p2asm::Assembler;

/// Propeller2 assembler, writes a raw binary image
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Source file
    input: PathBuf,

    /// Binary image, defaults to the input with a .bin extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the listing
    #[arg(short, long)]
    listing: bool,

    /// Print the symbol table
    #[arg(short, long)]
    symbols: bool,

    /// More logging, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let mut asm = Assembler::new();
    asm.assemble_file(&args.input);

    if args.listing {
        print!("{}", asm.listing());
    }

    if args.symbols {
        for sym in asm.symbols().iter() {
            let value = sym.value();
            println!("{:<24} {:<7} {:<12} {:?}", sym.name(), value.kind(), value.to_string(), sym.references());
        }
    }

    for (line, err) in asm.diagnostics() {
        error!("{}:{}: {}", args.input.display(), line, err);
    }
    if asm.error_count() > 0 {
        std::process::exit(1);
    }

    // Whole longs, the tail is zero padded
    let binary_code = {
        let bytes = asm.binary();
        let mut wtr = Vec::with_capacity(bytes.len() + 3);

        for i in (0..bytes.len()).step_by(4) {
            wtr.write_u32::<LittleEndian>(asm.image().read_long(i))?;
        }
        wtr
    };

    let output = args.output.unwrap_or_else(|| args.input.with_extension("bin"));
    info!("{} bytes, last pc ${:05x}, writing {}", binary_code.len(), asm.last_pc(), output.display());

    let mut file = File::create(&output)?;
    file.write_all(&binary_code[..])
}
