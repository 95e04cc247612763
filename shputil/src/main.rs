use clap::{Parser, ValueEnum};
use memmap2::Mmap;
use shapebuf::{csv, DbfTable, ShpFile, Strictness};
use std::fs::File;
use std::io::{BufWriter, Write};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input path (.shp for svg, .dbf for csv)
    #[arg(short, long)]
    input: String,

    /// Output path; stdout when omitted
    #[arg(short, long)]
    output: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Svg)]
    format: Format,

    /// Emit raw file coordinates instead of projecting to Web Mercator
    #[arg(long)]
    raw: bool,

    /// Fail on truncated trailers instead of best-effort recovery
    #[arg(long)]
    strict: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    Svg,
    Csv,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let file = File::open(&args.input)?;
    // the mapping outlives every view the readers derive from it
    let mmap = unsafe { Mmap::map(&file)? };

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };

    let strictness = if args.strict {
        Strictness::Strict
    } else {
        Strictness::Lenient
    };

    match args.format {
        Format::Svg => {
            let shp = ShpFile::read(&mmap)?;
            shp.to_svg(&mut out, !args.raw)?;
        }
        Format::Csv => {
            let table = DbfTable::read_with(&mmap, strictness)?;
            csv::write_table(&table, &mut out)?;
        }
    }
    out.flush()?;
    Ok(())
}
