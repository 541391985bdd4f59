//! binary subset tool
//!
//! Takes a TrueType font file and some text, code points or glyph ids, and
//! writes a new font file containing only the glyphs they need.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use ttf_subset::{
    parse_gids, parse_unicodes, SubsetError, SubsetOptions, SubsetRequest, Subsetter,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["text", "unicodes", "gids", "list_unicodes"]),
))]
struct Args {
    /// The input font file.
    #[arg(short, long)]
    path: PathBuf,

    /// Text to keep
    #[arg(short, long)]
    text: Option<String>,

    /// List of unicode codepoints, or '*' for everything the font maps
    #[arg(short, long)]
    unicodes: Option<String>,

    /// List of glyph ids
    #[arg(short, long)]
    gids: Option<String>,

    /// The output font file
    #[arg(short, long, required_unless_present = "list_unicodes")]
    output_file: Option<PathBuf>,

    /// The cmap platform used to map characters to glyphs
    #[arg(long, default_value_t = 3)]
    platform_id: u16,

    /// Log the tables, cmap and glyphs as they are processed
    #[arg(long)]
    debug: bool,

    /// Rebuild hmtx for the retained glyphs instead of copying it
    #[arg(long)]
    remap_metrics: bool,

    /// Print every character the font maps, then exit
    #[arg(long)]
    list_unicodes: bool,
}

fn main() {
    let args = Args::parse();
    let default_filter = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), SubsetError> {
    let options = SubsetOptions::default()
        .with_platform_id(args.platform_id)
        .with_debug(args.debug)
        .with_remap_metrics(args.remap_metrics);
    let subsetter = Subsetter::open(&args.path, options)?;

    if args.list_unicodes {
        println!("{}", subsetter.supported_text()?);
        return Ok(());
    }

    let request = if let Some(text) = args.text {
        SubsetRequest::from(text)
    } else if let Some(gids) = args.gids {
        SubsetRequest::Glyphs(parse_gids(&gids)?)
    } else {
        match args.unicodes.as_deref().map(str::trim) {
            Some("*") => SubsetRequest::from(subsetter.supported_code_points()?),
            unicodes => SubsetRequest::from(parse_unicodes(unicodes.unwrap_or_default())?),
        }
    };

    let output = subsetter.subset(request)?;
    if let Some(output_file) = args.output_file {
        std::fs::write(output_file, output)?;
    }
    Ok(())
}
