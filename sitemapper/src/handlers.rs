use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use sitemapper_core::crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl, generate_crawl_summary};
use sitemapper_core::print_banner;
use sitemapper_core::report::{ReportFormat, generate_report, save_report};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;
use url::Url;

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(line)
        && url.has_host()
    {
        return Some(line.to_string());
    }

    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    None
}

/// Turn the URL the user typed into a file stem.
///
/// The scheme is dropped, characters other than word characters, whitespace
/// and `-` are removed, whitespace runs become `_`.
pub fn sanitize_filename(url: &str) -> String {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    let kept: String = without_scheme
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let name = kept
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .trim_matches('_')
        .to_string();

    if name.is_empty() {
        "sitemap".to_string()
    } else {
        name
    }
}

/// `<dir>/<stem>.<ext>` for every export format requested.
pub fn output_paths(dir: &Path, stem: &str, formats: &[ReportFormat]) -> Vec<(ReportFormat, PathBuf)> {
    formats
        .iter()
        .map(|format| (*format, dir.join(format!("{}.{}", stem, format.extension()))))
        .collect()
}

/// Read the seed URL from `input`, showing `prompt` on `output` first.
pub fn prompt_seed_url<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<String> {
    write!(output, "{} ", prompt)?;
    output.flush()?;

    let mut response = String::new();
    input.read_line(&mut response)?;
    Ok(response.trim().to_string())
}

/// WARN by default so per-URL failures still reach stderr in quiet mode.
pub fn log_level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::WARN }
}

pub fn init_tracing(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(log_level(verbose))
        .with_writer(io::stderr)
        .try_init();
}

pub async fn handle_crawl(args: &ArgMatches) -> Result<()> {
    let quiet = args.get_flag("quiet");
    init_tracing(args.get_flag("verbose"));

    if !quiet {
        print_banner();
    }

    let input = match args.get_one::<String>("url") {
        Some(url) => url.trim().to_string(),
        None => {
            let stdin = io::stdin();
            prompt_seed_url(
                &mut stdin.lock(),
                &mut io::stdout(),
                &"Enter the URL to crawl:".bright_cyan().bold().to_string(),
            )
            .context("Failed to read the URL")?
        }
    };

    if input.is_empty() {
        println!("{} No URL entered.", "✗".red().bold());
        return Ok(());
    }

    let Some(seed_url) = parse_url_line(&input) else {
        bail!("'{}' is not a valid URL", input);
    };

    let output_dir = args
        .get_one::<String>("output-dir")
        .map(String::as_str)
        .unwrap_or(".");
    let output_dir = PathBuf::from(shellexpand::tilde(output_dir).as_ref());
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let delay_ms = *args.get_one::<u64>("delay-ms").unwrap_or(&500);
    let timeout_secs = *args.get_one::<u64>("timeout").unwrap_or(&10);

    let mut formats = vec![ReportFormat::Csv, ReportFormat::Html];
    if args.get_flag("json") {
        formats.push(ReportFormat::Json);
    }

    println!("{} Starting crawl: {}", "→".blue(), seed_url.bright_white());
    println!("{} Delay: {} ms, timeout: {} s\n", "→".blue(), delay_ms, timeout_secs);

    let options = CrawlOptions {
        url: seed_url,
        delay_ms,
        timeout_secs,
        show_progress_bars: !quiet,
    };

    let progress_callback: Option<CrawlProgressCallback> = if quiet {
        None
    } else {
        Some(Arc::new(|msg: String| {
            println!("{}", msg.yellow());
        }))
    };

    let site = execute_crawl(options, progress_callback)
        .await
        .context("Crawl failed")?;

    println!("\n{} Crawl complete!\n", "✓".green().bold());
    print!("{}", generate_crawl_summary(&site));
    println!();

    let stem = sanitize_filename(&input);
    for (format, path) in output_paths(&output_dir, &stem, &formats) {
        let content = generate_report(&site, format)
            .with_context(|| format!("Failed to render {} export", format.extension()))?;
        save_report(&content, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!(
            "{} Wrote {}",
            "✓".green().bold(),
            path.display().to_string().bright_white()
        );
    }

    if !site.failed.is_empty() {
        println!(
            "  {} {} URL(s) could not be fetched",
            "⚠".yellow(),
            site.failed.len()
        );
    }

    Ok(())
}
