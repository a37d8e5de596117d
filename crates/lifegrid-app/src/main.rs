use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use lifegrid_core::{
    Board, BoardConfig, BoardSize, CatalogError, FrameBatch, FrameSink, PatternCatalog,
};
use owo_colors::OwoColorize;
use tracing::{info, warn};

mod terminal;

#[derive(Parser, Debug)]
#[command(
    name = "lifegrid",
    version,
    about = "Animate Conway's Game of Life patterns in the terminal"
)]
struct Cli {
    /// Print the available patterns and exit.
    #[arg(long)]
    list_patterns: bool,

    /// Board side length category.
    #[arg(long, value_enum, default_value_t = SizeArg::Medium)]
    board_size: SizeArg,

    /// Starting pattern (see --list-patterns). Some patterns do not fit on
    /// smaller boards.
    #[arg(long, default_value = "pulsar")]
    pattern: String,

    /// Number of generations to animate.
    #[arg(long, default_value_t = 30)]
    frames: u32,

    /// Playback speed preset; 1-4 map to 2, 2.5, 3, or 5 frames per second.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=4))]
    speed: u8,

    /// RNG seed for reproducible soups.
    #[arg(long, env = "LIFEGRID_SEED")]
    seed: Option<u64>,

    /// Start from a random soup with the given live-cell density in [0, 1]
    /// instead of a catalog pattern.
    #[arg(long, value_name = "DENSITY", conflicts_with = "pattern")]
    soup: Option<f64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SizeArg {
    Small,
    Medium,
    Large,
}

impl From<SizeArg> for BoardSize {
    fn from(size: SizeArg) -> Self {
        match size {
            SizeArg::Small => Self::Small,
            SizeArg::Medium => Self::Medium,
            SizeArg::Large => Self::Large,
        }
    }
}

const fn frames_per_second(speed: u8) -> f64 {
    match speed {
        1 => 2.0,
        2 => 2.5,
        3 => 3.0,
        _ => 5.0,
    }
}

/// Logs each step's summary as structured fields.
#[derive(Debug, Default)]
struct SummarySink;

impl FrameSink for SummarySink {
    fn on_frame(&mut self, frame: &FrameBatch) {
        tracing::debug!(
            generation = frame.summary.generation.0,
            population = frame.summary.population,
            births = frame.summary.births,
            deaths = frame.summary.deaths,
            "advanced board",
        );
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let catalog = PatternCatalog::builtin();

    if cli.list_patterns {
        print_patterns(&catalog);
        return Ok(());
    }

    let size = BoardSize::from(cli.board_size);
    let config = BoardConfig {
        rng_seed: cli.seed,
        ..BoardConfig::for_size(size)
    };
    let mut board = Board::with_sink(config, Box::new(SummarySink))?;

    if let Some(density) = cli.soup {
        board.initialize_soup(density)?;
    } else {
        let cells = match catalog.resolve(&cli.pattern, size) {
            Ok(cells) => cells,
            Err(err @ CatalogError::UnknownPattern(_)) => {
                let names: Vec<&str> = catalog.names().collect();
                bail!("{err}; available patterns: {}", names.join(", "));
            }
            Err(err @ CatalogError::UnsupportedSize { .. }) => {
                bail!("{err}; try --board-size large");
            }
        };
        board.initialize(&cells)?;
    }

    match cli.soup {
        Some(density) => info!(
            size = %size,
            density,
            frames = cli.frames,
            fps = frames_per_second(cli.speed),
            "starting soup animation",
        ),
        None => info!(
            size = %size,
            pattern = %cli.pattern,
            frames = cli.frames,
            fps = frames_per_second(cli.speed),
            "starting animation",
        ),
    }
    terminal::animate(&mut board, cli.frames, frames_per_second(cli.speed))?;

    if let Some(summary) = board.history().last() {
        info!(
            generation = summary.generation.0,
            population = summary.population,
            births = summary.births,
            deaths = summary.deaths,
            "animation completed",
        );
        println!(
            "Animated {} generations on a {size} board; final population {}.",
            summary.generation, summary.population,
        );
    } else {
        warn!("animation completed without stepping the board");
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_patterns(catalog: &PatternCatalog) {
    println!("Patterns:\n");
    for (name, description) in catalog.describe_all() {
        println!("  {}", name.bold());
        println!("      {description}");
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_declaration_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn speed_presets_map_to_frame_rates() {
        assert_eq!(frames_per_second(1), 2.0);
        assert_eq!(frames_per_second(2), 2.5);
        assert_eq!(frames_per_second(3), 3.0);
        assert_eq!(frames_per_second(4), 5.0);
    }

    #[test]
    fn size_args_convert_to_board_sizes() {
        assert_eq!(BoardSize::from(SizeArg::Small), BoardSize::Small);
        assert_eq!(BoardSize::from(SizeArg::Medium), BoardSize::Medium);
        assert_eq!(BoardSize::from(SizeArg::Large), BoardSize::Large);
    }
}
