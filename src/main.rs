//! Zyzzyva lexicon engine - CLI
//!
//! Search, look up, quiz and build side stores for word-game lexicons.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use zyzzyva::{
    commands::{
        BuildConfig, SearchRequest, build_store, compile_graph, list_quiz, lookup_word,
        read_quiz_spec, run_search,
    },
    config::EngineConfig,
    engine::WordEngine,
    output::{
        print_build_result, print_compile_result, print_lookup_result, print_quiz_listing,
        print_search_result,
    },
};

#[derive(Parser)]
#[command(
    name = "zyzzyva",
    about = "Lexicon search, scoring and quizzing for word-game study",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Name of the lexicon to load and query
    #[arg(short, long, global = true, default_value = "OWL2+LWL")]
    lexicon: String,

    /// Word list (one word per line, optional definition after it)
    #[arg(short = 'f', long, global = true)]
    lexicon_file: Option<PathBuf>,

    /// Treat --lexicon-file as a compiled word graph
    #[arg(long, global = true)]
    compiled: bool,

    /// Expected checksum of a compiled word graph
    #[arg(long, global = true, requires = "compiled")]
    checksum: Option<String>,

    /// Keep definitions from the word list
    #[arg(long, global = true)]
    definitions: bool,

    /// Side store to attach to the lexicon
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    /// Stem list files, one word length per file
    #[arg(long, global = true)]
    stems: Vec<PathBuf>,

    /// Further lexicons as NAME=PATH, for comparison symbols and In Lexicon
    #[arg(long = "also", global = true, value_name = "NAME=PATH")]
    also: Vec<String>,

    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a search specification
    Search {
        /// Search specification file (JSON)
        spec: Option<PathBuf>,

        /// Add a Pattern Match condition
        #[arg(short, long)]
        pattern: Option<String>,

        /// Add an Anagram Match condition
        #[arg(short, long)]
        anagram: Option<String>,

        /// Add a Subanagram Match condition
        #[arg(long)]
        subanagram: Option<String>,

        /// Show probability order next to each word
        #[arg(long)]
        probability: bool,
    },

    /// Show everything known about a word
    Lookup {
        word: String,
    },

    /// Build a side store for the lexicon
    Build {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Playability values file (VALUE WORD per line)
        #[arg(long)]
        playability: Option<PathBuf>,

        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Compile the lexicon's word graph to a file
    Compile {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List a quiz's questions and answers
    Quiz {
        /// Quiz specification file (JSON)
        spec: PathBuf,

        /// List at most this many questions
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Shuffle seed for random order
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if let Commands::InitConfig { output } = &cli.command {
        EngineConfig::default().save(output)?;
        println!("Wrote default configuration to {}", output.display());
        return Ok(());
    }

    let engine = load_engine(&cli)?;
    if engine.lexicon(&cli.lexicon).is_none() {
        bail!(
            "Lexicon {} is not loaded; pass --lexicon-file or --also {}=PATH",
            cli.lexicon,
            cli.lexicon
        );
    }

    match cli.command {
        Commands::Search {
            spec,
            pattern,
            anagram,
            subanagram,
            probability,
        } => {
            let request = SearchRequest {
                spec_file: spec.as_deref(),
                pattern: pattern.as_deref(),
                anagram: anagram.as_deref(),
                subanagram: subanagram.as_deref(),
            };
            let spec = request.to_spec()?;
            if spec.conditions.is_empty() {
                bail!("Nothing to search for; give a spec file or --pattern/--anagram/--subanagram");
            }
            let result = run_search(&engine, &cli.lexicon, &spec);
            print_search_result(&result, probability);
        }
        Commands::Lookup { word } => {
            let result = lookup_word(&engine, &cli.lexicon, &word)?;
            print_lookup_result(&result);
        }
        Commands::Build {
            output,
            playability,
            quiet,
        } => {
            let config = BuildConfig {
                output: &output,
                playability: playability.as_deref(),
                show_progress: !quiet,
            };
            let result = build_store(&engine, &cli.lexicon, &config)?;
            print_build_result(&result);
        }
        Commands::Compile { output } => {
            let result = compile_graph(&engine, &cli.lexicon, &output)?;
            print_compile_result(&result);
        }
        Commands::Quiz { spec, limit, seed } => {
            let mut quiz_spec = read_quiz_spec(&spec)?;
            if quiz_spec.lexicon.is_empty() {
                quiz_spec.lexicon.clone_from(&cli.lexicon);
            }
            if let Some(seed) = seed {
                quiz_spec.random_seed = seed;
            }
            match list_quiz(&engine, quiz_spec, limit) {
                Some(listing) => print_quiz_listing(&listing),
                None => println!("The quiz has no questions"),
            }
        }
        Commands::InitConfig { .. } => {}
    }

    Ok(())
}

/// Load the configured lexicons, stems and side store
fn load_engine(cli: &Cli) -> Result<WordEngine> {
    let config = cli
        .config
        .as_deref()
        .map(EngineConfig::load)
        .unwrap_or_default();
    let mut engine = WordEngine::new(config);

    for entry in &cli.also {
        let (name, path) = entry
            .split_once('=')
            .with_context(|| format!("Expected NAME=PATH, got '{entry}'"))?;
        engine.import_text_file(name, Path::new(path), false)?;
    }

    if let Some(file) = &cli.lexicon_file {
        if cli.compiled {
            engine.import_compiled_graph(&cli.lexicon, file, cli.checksum.as_deref())?;
        } else {
            engine.import_text_file(&cli.lexicon, file, cli.definitions)?;
        }
    }

    for stems in &cli.stems {
        engine.import_stems(&cli.lexicon, stems)?;
    }

    if let Some(store) = &cli.store {
        engine
            .load_store(&cli.lexicon, store)
            .with_context(|| format!("Loading side store {}", store.display()))?;
    }

    Ok(engine)
}
