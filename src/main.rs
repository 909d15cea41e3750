use clap::Parser;
use epsclean::CleanConfig;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "epsclean", about = "Clean up fragmented EPS output from plotting tools")]
struct Cli {
    /// Input EPS file
    input: PathBuf,

    /// Output path (defaults to rewriting the input in place)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Discard blocks containing rectangle (re) operators
    #[arg(long)]
    remove_boxes: bool,

    /// Flush grouping on state changes to preserve Z-order
    #[arg(long)]
    group_soft: bool,

    /// Merge adjacent filled polygons that share edges
    #[arg(long)]
    combine_areas: bool,

    /// Insert the synthetic linecap even for dashed blocks
    #[arg(long)]
    dash_linecap: bool,

    /// Print a run summary to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let config = CleanConfig {
        remove_boxes: cli.remove_boxes,
        group_soft: cli.group_soft,
        combine_areas: cli.combine_areas,
        dash_linecap: cli.dash_linecap,
    };

    let stats = match epsclean::clean_file(&cli.input, cli.output.as_deref(), &config) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("epsclean: {e}");
            process::exit(1);
        }
    };

    if cli.verbose {
        eprintln!();
        eprintln!("  epsclean \u{00b7} {}", cli.input.display());
        eprintln!();
        eprintln!("  Read        {} lines, {} blocks", stats.lines, stats.blocks_in);
        eprintln!(
            "  Group       {} blocks \u{2192} {}",
            stats.blocks_in, stats.blocks_out,
        );
        eprintln!(
            "  Strokes     {} segments \u{2192} {} polylines",
            stats.segments_in, stats.polylines_out,
        );
        if config.combine_areas {
            eprintln!(
                "  Fills       {} polygons, {} merged",
                stats.polygons_in, stats.polygons_merged,
            );
        }
        let dest = cli.output.unwrap_or(cli.input);
        eprintln!();
        eprintln!("  \u{2713} {}", dest.display());
        eprintln!();
    }
}
