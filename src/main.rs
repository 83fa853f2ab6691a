use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use esa_rust::config::{ChildTabAlgorithm, IndexConfig, IndexMeta, LcpAlgorithm, SaAlgorithm};
use esa_rust::find::{FindAlgorithm, Finder};
use esa_rust::index::{Fibre, Index};
use esa_rust::io::fasta::read_sequence_set;
use esa_rust::stree::EmptyEdges;
use esa_rust::util::alphabet::printable;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(
    name = "esa-rust",
    author,
    version,
    about = "Enhanced suffix array index: build, search and repeat finding",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Number of worker threads (default: all cores)
    #[arg(short = 't', long = "threads", global = true)]
    threads: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build all fibres for the sequences of a FASTA file and save them
    Index {
        /// Input FASTA file
        fasta: PathBuf,
        /// Output prefix for index files
        #[arg(short, long, default_value = "ref")]
        output: PathBuf,
        #[arg(long = "sa-algo", value_enum, default_value_t = SaAlgorithm::default())]
        sa_algo: SaAlgorithm,
        #[arg(long = "lcp-algo", value_enum, default_value_t = LcpAlgorithm::default())]
        lcp_algo: LcpAlgorithm,
        #[arg(long = "child-algo", value_enum, default_value_t = ChildTabAlgorithm::default())]
        child_algo: ChildTabAlgorithm,
        /// Normalise sequences as DNA (upper case, U→T, other symbols → N)
        #[arg(long)]
        dna: bool,
    },
    /// Report every exact occurrence of the given patterns
    Find {
        /// Index prefix
        #[arg(short = 'i', long = "index")]
        index: PathBuf,
        #[arg(long = "algo", value_enum, default_value_t = FindAlgorithm::default())]
        algo: FindAlgorithm,
        /// Patterns to search for
        #[arg(required = true)]
        patterns: Vec<String>,
    },
    /// List maximal repeats
    Repeats {
        /// Index prefix
        #[arg(short = 'i', long = "index")]
        index: PathBuf,
        /// Minimum repeat length
        #[arg(long = "min-len", default_value_t = 10)]
        min_len: usize,
        /// Only report supermaximal repeats
        #[arg(long)]
        supermaximal: bool,
    },
    /// Print index statistics
    Stats {
        /// Index prefix
        #[arg(short = 'i', long = "index")]
        index: PathBuf,
    },
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    // RUST_LOG 优先于命令行
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .build_global()
            .context("failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Index {
            fasta,
            output,
            sa_algo,
            lcp_algo,
            child_algo,
            dna,
        } => {
            let config = IndexConfig::default()
                .with_sa(sa_algo)
                .with_lcp(lcp_algo)
                .with_child_tab(child_algo);
            run_index(&fasta, &output, config, dna)
        }
        Commands::Find { index, algo, patterns } => run_find(&index, algo, &patterns),
        Commands::Repeats {
            index,
            min_len,
            supermaximal,
        } => run_repeats(&index, min_len, supermaximal),
        Commands::Stats { index } => run_stats(&index),
    }
}

fn open_index(prefix: &Path) -> Result<Index<'static>> {
    Index::open(prefix).with_context(|| format!("cannot open index '{}'", prefix.display()))
}

fn run_index(fasta: &Path, output: &Path, config: IndexConfig, dna: bool) -> Result<()> {
    let set = read_sequence_set(fasta, dna)?;
    if set.text.is_empty() {
        warn!("'{}' contains only empty sequences", fasta.display());
    }
    info!(
        "read {} sequences, {} symbols from {}",
        set.text.seq_count(),
        set.text.len(),
        fasta.display()
    );

    let mut index = Index::with_config(set.text, config);
    let start = Instant::now();
    index
        .require_all(&[Fibre::ChildTab, Fibre::Bwt])
        .context("index construction failed")?;
    info!(
        "built fibres (sa={}, lcp={}, child={}) in {:.2?}",
        config.sa,
        config.lcp,
        config.child_tab,
        start.elapsed()
    );

    index.set_meta(IndexMeta {
        source: Some(fasta.display().to_string()),
        sequence_names: set.names,
        build_args: Some(std::env::args().collect::<Vec<_>>().join(" ")),
        build_timestamp: Some(chrono::Utc::now().to_rfc3339()),
    });
    index
        .save(output)
        .with_context(|| format!("cannot write index to '{}'", output.display()))?;
    println!("index saved: {}.*", output.display());
    Ok(())
}

fn run_find(prefix: &Path, algo: FindAlgorithm, patterns: &[String]) -> Result<()> {
    let mut index = open_index(prefix)?;
    let needed = match algo {
        FindAlgorithm::TopDown => Fibre::ChildTab,
        FindAlgorithm::BinarySearch => Fibre::Lcp,
    };
    if !index.supplied(needed) {
        warn!("{} missing from '{}', rebuilding it", needed, prefix.display());
        index.require(needed).context("index construction failed")?;
    }

    let finder = Finder::with_algorithm(&index, algo)?;
    let ranges = finder.sa_ranges(patterns);
    let meta = index.meta().cloned().unwrap_or_default();

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for (pattern, range) in patterns.iter().zip(ranges) {
        let sa = index.sa()?;
        let mut hits: Vec<(usize, usize)> = sa[range]
            .iter()
            .map(|&p| index.text().to_local(p as usize))
            .collect();
        hits.sort_unstable();
        writeln!(out, "{}\t{}", pattern, hits.len())?;
        for (seq, offset) in hits {
            writeln!(out, "  {}:{}", meta.sequence_name(seq), offset)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn run_repeats(prefix: &Path, min_len: usize, supermaximal: bool) -> Result<()> {
    let mut index = open_index(prefix)?;
    index
        .require_all(&[Fibre::Lcp, Fibre::Bwt])
        .context("index construction failed")?;
    let meta = index.meta().cloned().unwrap_or_default();

    let repeats: Vec<_> = if supermaximal {
        index.super_max_repeats(min_len)?.collect()
    } else {
        index.max_repeats(min_len)?.collect()
    };
    info!("{} repeats of length >= {}", repeats.len(), min_len);

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for rep in &repeats {
        let mut occ = rep.local_occurrences();
        occ.sort_unstable();
        let positions: Vec<String> = occ
            .iter()
            .map(|&(seq, offset)| format!("{}:{}", meta.sequence_name(seq), offset))
            .collect();
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            rep.length(),
            rep.count(),
            printable(rep.representative()),
            positions.join(",")
        )?;
    }
    out.flush()?;
    Ok(())
}

fn run_stats(prefix: &Path) -> Result<()> {
    let index = open_index(prefix)?;
    let text = index.text();
    println!("prefix: {}", prefix.display());
    println!("sequences: {}", text.seq_count());
    println!("symbols: {}", text.len());
    for fibre in Fibre::ALL {
        println!(
            "{}: {}",
            fibre,
            if index.supplied(fibre) { "present" } else { "missing" }
        );
    }
    if let Some(meta) = index.meta() {
        if let Some(source) = &meta.source {
            println!("source: {}", source);
        }
        if let Some(ts) = &meta.build_timestamp {
            println!("built: {}", ts);
        }
    }

    if index.supplied(Fibre::Lcp) {
        let mut leaves = 0usize;
        let mut internal = 0usize;
        let mut longest_repeat = 0usize;
        // 每个后缀都计为一个叶子
        for node in index.bottom_up_with(EmptyEdges::Show)? {
            if node.is_leaf() {
                leaves += 1;
            } else {
                internal += 1;
                longest_repeat = longest_repeat.max(node.rep_length);
            }
        }
        println!("leaves: {}", leaves);
        println!("internal nodes: {}", internal);
        println!("longest repeat: {}", longest_repeat);
    }
    Ok(())
}
