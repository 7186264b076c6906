use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use brc_stats::{report, ExecutorKind, LineFormat, Pipeline, PipelineConfig};

#[derive(Parser)]
#[command(name = "brc-stats")]
#[command(version, about = "Per-key min/mean/max over a large `key;value` file")]
struct Cli {
    /// Input file, one `<key><delimiter><value>` per line.
    path: PathBuf,

    /// Number of chunks and workers (0 = number of CPU cores).
    #[arg(short, long, default_value_t = 0)]
    workers: usize,

    /// How chunks are executed.
    #[arg(short, long, value_enum, default_value_t = ExecutorKind::Rayon)]
    executor: ExecutorKind,

    /// Field delimiter between key and value.
    #[arg(long, default_value_t = ';')]
    delimiter: char,

    /// Lines starting with this character are ignored.
    #[arg(long, default_value_t = '#', conflicts_with = "no_comments")]
    comment: char,

    /// Treat every non-empty line as data.
    #[arg(long)]
    no_comments: bool,

    /// Extra attempts for a chunk that failed to read.
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Only log the summary, do not print results.
    #[arg(short, long)]
    quiet: bool,
}

fn ascii_byte(c: char, what: &str) -> Result<u8> {
    if !c.is_ascii() || c == '\n' {
        bail!("{what} must be a single ASCII character other than newline, got {c:?}");
    }
    Ok(c as u8)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let comment = if cli.no_comments {
        None
    } else {
        Some(ascii_byte(cli.comment, "comment marker")?)
    };
    let format = LineFormat::default()
        .with_delimiter(ascii_byte(cli.delimiter, "delimiter")?)
        .with_comment_marker(comment);
    let config = PipelineConfig::new()
        .with_workers(cli.workers)
        .with_executor(cli.executor)
        .with_format(format)
        .with_chunk_retries(cli.retries);

    let report = Pipeline::new(config)
        .run_path(&cli.path)
        .with_context(|| format!("processing {}", cli.path.display()))?;

    for failure in &report.failures {
        warn!(
            chunk = failure.index,
            range = %failure.range,
            attempts = failure.attempts,
            "Chunk missing from results: {}",
            failure.error
        );
    }
    info!("{}", report::summary(&report));

    if !cli.quiet {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        out.write_all(report::render(&report.results).as_bytes())?;
        out.flush()?;
    }
    Ok(())
}
