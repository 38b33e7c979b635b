use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ragchunk_cli::logging;
use ragchunk_cli::runner::{self, collaborators_for, ChunkJob};
use ragchunk_core::config::Config;
use ragchunk_core::sections::SectionDetector;
use ragchunk_core::StrategyKind;

#[derive(Parser)]
#[command(name = "ragchunk", version, about = "Chunk extracted papers for retrieval")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk every .txt file under INPUT with one or more strategies.
    Chunk {
        /// Defaults to `data.input_dir`.
        input: Option<PathBuf>,
        /// Defaults to `data.output_dir`.
        #[arg(long)]
        out: Option<PathBuf>,
        /// `all` or a comma-separated list: recursive, semantic, token, section, hybrid.
        #[arg(long, default_value = "all", value_delimiter = ',')]
        strategy: Vec<String>,
        /// Only process the first N files.
        #[arg(long)]
        limit: Option<usize>,
        /// Find headings in documents whose sidecar has no section markers.
        #[arg(long)]
        detect_sections: bool,
        #[arg(long, default_value_t = 4)]
        workers: usize,
        #[arg(long)]
        no_progress: bool,
    },
    /// Print the section headings detected in FILE.
    Sections { file: PathBuf },
}

fn parse_strategies(names: &[String]) -> Result<Vec<StrategyKind>> {
    if names.iter().any(|n| n.trim().eq_ignore_ascii_case("all")) {
        return Ok(StrategyKind::ALL.to_vec());
    }
    let mut kinds = Vec::new();
    for name in names {
        let kind: StrategyKind = name.parse()?;
        if !kinds.contains(&kind) { kinds.push(kind); }
    }
    Ok(kinds)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    logging::init_with_config(&settings.logging);

    match cli.command {
        Command::Chunk { input, out, strategy, limit, detect_sections, workers, no_progress } => {
            let strategies = parse_strategies(&strategy)?;
            let job = ChunkJob {
                input_dir: input.unwrap_or_else(|| config.resolve_path(&settings.data.input_dir)),
                output_dir: out.unwrap_or_else(|| config.resolve_path(&settings.data.output_dir)),
                strategies,
                limit,
                detect_sections,
                workers,
                show_progress: !no_progress,
            };
            println!("Chunking {} -> {}", job.input_dir.display(), job.output_dir.display());
            let with = collaborators_for(&job.strategies, &settings)?;
            let stats = runner::run(&job, &settings, &with).await?;

            println!("\n✅ Processed {} documents ({} failed)", stats.documents_processed, stats.documents_failed);
            for (kind, count) in &stats.chunks {
                let fallbacks = stats.fallbacks.get(kind).copied().unwrap_or(0);
                println!("  {kind:<10} {count:>6} chunks  {fallbacks} fell back to recursive");
            }
            if stats.oversized_chunks > 0 {
                println!("⚠️  {} oversized chunks kept whole", stats.oversized_chunks);
            }
        }
        Command::Sections { file } => {
            let text = fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
            let detector = SectionDetector::new()?;
            let markers = detector.detect(&text);
            if markers.is_empty() {
                println!("No section headings found in {}", file.display());
            }
            for marker in markers {
                let heading: String = text.chars().skip(marker.start).take_while(|c| *c != '\n').collect();
                println!("{:>8}  {:<14} {}", marker.start, marker.label.as_str(), heading.trim());
            }
        }
    }
    Ok(())
}
