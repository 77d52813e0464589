use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ansiart2png::{font, options::FileType, render, sauce, Options, RenderMode, Result};

/// Renders ANSi and BBS-era art files (ANS, PCB, BIN, ADF, IDF, XB, TND)
/// to PNG images. The decoder is chosen by file extension.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Art file to render
    input: PathBuf,

    /// Cell width in pixels (9 enables the VGA 9-dot mode)
    #[arg(short, long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(8..=9))]
    bits: u32,

    /// Column count for .bin and .tnd files
    #[arg(short, long, default_value_t = 160, value_parser = clap::value_parser!(u32).range(1..=8192))]
    columns: u32,

    /// Font name (80x25, 80x50, ...) or path to a raw glyph table
    #[arg(short, long, default_value = font::DEFAULT_FONT)]
    font: String,

    /// Treat the blink attribute as bright background (iCE colors)
    #[arg(short, long)]
    ice_colors: bool,

    /// Rendering mode: ced, transparent or workbench
    #[arg(short, long, default_value = "")]
    mode: RenderMode,

    /// Output path (defaults to the input path plus .png)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Render at 2x for high-density displays (writes <input>@2x.png)
    #[arg(short, long)]
    retina: bool,

    /// Print the SAUCE record and exit without rendering
    #[arg(short, long)]
    sauce: bool,
}

fn print_sauce(data: &[u8]) {
    match sauce::read(data) {
        None => println!("no SAUCE record"),
        Some(rec) => {
            println!("title:  {}", rec.title);
            println!("author: {}", rec.author);
            println!("group:  {}", rec.group);
            println!("date:   {}", rec.date);
            println!(
                "type:   {}/{}  tinfo: {:?}",
                rec.data_type, rec.file_type, rec.tinfo
            );
            for line in &rec.comment_lines {
                println!("        {line}");
            }
        }
    }
}

fn output_path(args: &Args) -> PathBuf {
    if let Some(out) = &args.out {
        return out.clone();
    }
    let mut name = args.input.as_os_str().to_os_string();
    name.push(if args.retina { "@2x.png" } else { ".png" });
    PathBuf::from(name)
}

fn run(args: &Args) -> Result<()> {
    let data = std::fs::read(&args.input)?;
    if args.sauce {
        print_sauce(&data);
        return Ok(());
    }

    let options = Options {
        font: font::select(&args.font)?,
        bits: args.bits,
        columns: args.columns,
        mode: args.mode,
        ice_colors: args.ice_colors,
        file_type: FileType::from_path(&args.input),
        scale: if args.retina { 2.0 } else { 1.0 },
    };

    let image = render(&data, &options)?;
    let out = output_path(args);
    image.save(&out)?;
    info!(out = %out.display(), width = image.width(), height = image.height(), "wrote image");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}: {err}", args.input.display());
            ExitCode::FAILURE
        }
    }
}
