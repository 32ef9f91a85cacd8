pub mod crawl;
pub mod report;
pub mod tree;

use colored::Colorize;

pub fn print_banner() {
    println!(
        "{} {}",
        "sitemapper".bright_green().bold(),
        env!("CARGO_PKG_VERSION").bright_black()
    );
    println!("{}", "Maps a website into a hierarchical page tree".bright_black());
    println!();
}
