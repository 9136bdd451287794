//! News Cleaner CLI
//!
//! Tools for checking keyword patterns, scanning saved pages and evaluating
//! the domain gate without a browser.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use nc_cli::{load_config, logging, match_verdict, scan_html};
use nc_compiler::{CompileError, InflectionCompiler};
use nc_core::config::parse_lines;
use nc_core::{is_disabled, normalize_host, Config, Mode, PatternCompiler, SiteStatus};

#[derive(Parser)]
#[command(name = "nc-cli")]
#[command(about = "News Cleaner keyword compiler and page tools")]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Reject configuration files with unknown or mistyped fields
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile keywords and print the resulting patterns
    Compile {
        /// Keyword to compile (repeatable); overrides the config keywords
        #[arg(short, long)]
        keyword: Vec<String>,

        /// Configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// File with one keyword per line
        #[arg(long)]
        keywords_file: Option<PathBuf>,
    },

    /// Test a piece of text against the keywords
    Match {
        /// Text to test
        #[arg(short, long)]
        text: String,

        /// Keyword to use (repeatable); overrides the config keywords
        #[arg(short, long)]
        keyword: Vec<String>,

        /// Configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Scan a saved HTML page and list the regions that would be treated
    Scan {
        /// HTML file
        #[arg(short, long)]
        input: PathBuf,

        /// Hostname the page was served from
        #[arg(long)]
        host: String,

        /// Configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Treatment: hide or blur
        #[arg(short, long)]
        mode: Option<String>,

        /// Include list items and tiles as containers
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        aggressive: Option<bool>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the domain gate decision for a host
    Gate {
        /// Hostname or URL
        #[arg(long)]
        host: String,

        /// Configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Compile {
            keyword,
            config,
            keywords_file,
        } => cmd_compile(keyword, config, keywords_file, cli.strict),
        Commands::Match {
            text,
            keyword,
            config,
        } => cmd_match(&text, keyword, config, cli.strict),
        Commands::Scan {
            input,
            host,
            config,
            mode,
            aggressive,
            json,
        } => cmd_scan(&input, &host, config, cli.strict, mode.as_deref(), aggressive, json),
        Commands::Gate { host, config } => cmd_gate(&host, config, cli.strict),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn resolve_keywords(
    keywords: Vec<String>,
    config: Option<PathBuf>,
    strict: bool,
) -> Result<Vec<String>, String> {
    if !keywords.is_empty() {
        return Ok(keywords);
    }
    Ok(load_config(config.as_deref(), strict)?.keywords)
}

fn cmd_compile(
    keywords: Vec<String>,
    config: Option<PathBuf>,
    keywords_file: Option<PathBuf>,
    strict: bool,
) -> Result<(), String> {
    let keywords = match keywords_file {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
            parse_lines(&text)
        }
        None => resolve_keywords(keywords, config, strict)?,
    };
    if keywords.is_empty() {
        return Err("No keywords to compile".to_string());
    }

    let compiler = InflectionCompiler::default();
    let mut compiled = 0usize;
    let mut dropped = 0usize;

    for keyword in &keywords {
        match compiler.compile_keyword(keyword) {
            Ok(pattern) => {
                compiled += 1;
                println!("{:<22} {:<24} {}", pattern.strategy(), pattern.keyword(), pattern.source());
            }
            Err(CompileError::EmptyKeyword) => {}
            Err(e) => {
                dropped += 1;
                eprintln!("  dropped: {}", e);
            }
        }
    }

    println!();
    println!("Compiled: {} pattern(s), {} dropped", compiled, dropped);
    Ok(())
}

fn cmd_match(
    text: &str,
    keywords: Vec<String>,
    config: Option<PathBuf>,
    strict: bool,
) -> Result<(), String> {
    let keywords = resolve_keywords(keywords, config, strict)?;
    let patterns = InflectionCompiler::default().compile_all(&keywords);
    println!("{}", match_verdict(text, &patterns));
    Ok(())
}

fn cmd_scan(
    input: &Path,
    host: &str,
    config: Option<PathBuf>,
    strict: bool,
    mode: Option<&str>,
    aggressive: Option<bool>,
    json: bool,
) -> Result<(), String> {
    let source = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read '{}': {}", input.display(), e))?;

    let mut config = load_config(config.as_deref(), strict)?;
    if let Some(mode) = mode {
        config.mode = Mode::parse(mode).ok_or_else(|| format!("Unknown mode '{}'", mode))?;
    }
    if let Some(aggressive) = aggressive {
        config.aggressive = aggressive;
    }

    let summary = scan_html(&source, host, config);

    if json {
        let out = serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("Failed to serialize result: {}", e))?;
        println!("{}", out);
        return Ok(());
    }

    if summary.gated {
        println!("Filtering is off on {} ({})", summary.status.host, summary.status.label());
        return Ok(());
    }

    for region in &summary.regions {
        println!(
            "  [{}] <{}> {:<6} class=\"{}\" {}",
            region.node, region.tag, region.treatment, region.classes, region.snippet
        );
    }
    println!();
    println!("Host:       {}", summary.status.host);
    println!("Candidates: {}", summary.candidates);
    println!("Tested:     {}", summary.tested);
    println!("Marked:     {}", summary.status.hidden_count);
    if summary.errors > 0 {
        println!("Errors:     {}", summary.errors);
    }
    Ok(())
}

fn cmd_gate(host: &str, config: Option<PathBuf>, strict: bool) -> Result<(), String> {
    let config: Config = load_config(config.as_deref(), strict)?;
    let host = normalize_host(host);
    if host.is_empty() {
        return Err("Host is empty".to_string());
    }

    let domains = config.domain_lists();
    let status = SiteStatus {
        site_disabled: domains.is_site_disabled(&host),
        host: host.clone(),
        enabled: config.enabled,
        hidden_count: 0,
    };

    let decision = if is_disabled(&host, &domains, config.enabled) {
        "disabled"
    } else {
        "enabled"
    };
    println!("{}: {} ({})", host, decision, status.label());
    if !status.badge_text().is_empty() {
        println!("badge: {}", status.badge_text());
    }
    Ok(())
}
