//! flashdeck - Notion export to Anki deck converter

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};

use flashdeck::{Config, EmptySubdeckPolicy, MediaStatus, TagPolicy};

#[derive(Parser)]
#[command(name = "flashdeck")]
#[command(version, about = "Convert Notion HTML exports into Anki flashcard decks", long_about = None)]
#[command(after_help = "EXAMPLES:
    flashdeck Export.zip deck.apkg            Build an Anki package
    flashdeck Page.html cards.csv             Write a CSV for inspection
    flashdeck -f Export.zip -o deck.apkg      Same, with flags
    flashdeck --remove-tags Page.html d.apkg  Strip #hashtags from card text
    flashdeck -i Export.zip                   Show the deck tree only")]
struct Cli {
    /// Input ZIP export, export directory, or HTML file
    #[arg(value_name = "INPUT", required_unless_present = "file", conflicts_with = "file")]
    input: Option<String>,

    /// Output file (.apkg or .csv)
    #[arg(value_name = "OUTPUT", conflicts_with = "output_flag")]
    output: Option<PathBuf>,

    /// Input file (alternative to INPUT)
    #[arg(short = 'f', long = "file", value_name = "INPUT")]
    file: Option<String>,

    /// Output file (alternative to OUTPUT)
    #[arg(short = 'o', long = "output", id = "output_flag", value_name = "OUTPUT")]
    output_flag: Option<PathBuf>,

    /// Keep hashtags in card text (default)
    #[arg(long, conflicts_with = "remove_tags")]
    keep_tags: bool,

    /// Remove hashtags from card text
    #[arg(long)]
    remove_tags: bool,

    /// Leave out toggles that contain no cards
    #[arg(long)]
    drop_empty_subdecks: bool,

    /// Deck name to use instead of the page title
    #[arg(long, value_name = "NAME")]
    deck_name: Option<String>,

    /// Show the deck tree without writing output
    #[arg(short, long)]
    info: bool,

    /// Suppress output messages
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::new()
            .with_tag_policy(if self.remove_tags && !self.keep_tags {
                TagPolicy::Remove
            } else {
                TagPolicy::Keep
            })
            .with_empty_subdecks(if self.drop_empty_subdecks {
                EmptySubdeckPolicy::Drop
            } else {
                EmptySubdeckPolicy::Keep
            });
        if let Some(name) = &self.deck_name {
            config = config.with_deck_name(name);
        }
        config
    }

    fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let Some(input) = cli.input.clone().or_else(|| cli.file.clone()) else {
        eprintln!("error: no input given");
        return ExitCode::FAILURE;
    };
    let config = cli.config();

    let result = if cli.info {
        show_info(&input, &config)
    } else {
        match cli.output.clone().or_else(|| cli.output_flag.clone()) {
            Some(output) => convert(&input, output, &config, cli.quiet),
            None => Err("no output file given (expected .apkg or .csv)".to_string()),
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn show_info(input: &str, config: &Config) -> Result<(), String> {
    let (doc, assembly) = flashdeck::load_deck(input, config).map_err(|e| e.to_string())?;
    let deck = &assembly.deck;

    println!("File: {}", doc.source_path.display());
    println!("Deck: {}", deck.name);
    for subdeck in deck.subdecks() {
        println!("  {} ({} cards)", subdeck.name, subdeck.cards.len());
    }
    println!("Cards: {}", deck.card_count());
    if assembly.skipped_callouts > 0 {
        println!("Skipped callouts: {}", assembly.skipped_callouts);
    }

    let remote = deck
        .cards()
        .flat_map(|(_, card)| card.media.iter())
        .filter(|m| m.status == MediaStatus::Remote)
        .count();
    println!(
        "Media: {} bundled, {} missing, {} remote",
        deck.media_files().len(),
        deck.missing_media_count(),
        remote
    );

    Ok(())
}

fn convert(input: &str, output: PathBuf, config: &Config, quiet: bool) -> Result<(), String> {
    let report = flashdeck::convert(input, &output, config).map_err(|e| e.to_string())?;
    if !quiet {
        println!("{report}");
    }
    Ok(())
}
