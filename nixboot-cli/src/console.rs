//! Console rendering
//!
//! Everything the operator reads goes through here. Diagnostic logging goes
//! to stderr through `tracing` instead.

use colored::*;
use nixboot_core::Stage;
use std::io::Write;

use crate::pipeline::BootstrapReport;

/// Prints the `[n/N] Title` header of a stage
pub fn step(stage: Stage) {
    println!();
    println!(
        "{} {}",
        format!("[{}/{}]", stage.number(), Stage::COUNT).cyan().bold(),
        stage.title().bold()
    );
}

pub fn info(message: &str) {
    println!("  {}", message);
}

pub fn warning(message: &str) {
    println!("  {} {}", "!".yellow().bold(), message.yellow());
}

pub fn success(message: &str) {
    println!("  {} {}", "✓".green().bold(), message.green());
}

/// Prints a fatal failure labelled with where it happened
pub fn fatal(label: &str, message: &str) {
    eprintln!();
    eprintln!(
        "{} {}",
        format!("✗ {} failed:", label).red().bold(),
        message.red()
    );
}

/// Prints a prompt without a trailing newline
pub fn prompt(text: &str) {
    print!("{} {} ", "?".cyan().bold(), text.bold());
    let _ = std::io::stdout().flush();
}

/// Shows the public key and where to register it
pub fn registration(repository: &str, public_key: &str, link: &str) {
    println!("  Add this public key as a deploy key of {}:", repository.cyan());
    println!();
    println!("    {}", public_key.bold());
    println!();
    println!("  Open: {}", link.cyan().underline());
    println!(
        "  Leave {} unchecked; this key only needs read access.",
        "Allow write access".bold()
    );
}

/// Prints the closing summary after a successful install
pub fn summary(report: &BootstrapReport) {
    println!();
    println!("{}", "✓ Bootstrap complete!".green().bold());
    println!();
    println!("  Repository:     {}", report.repository.to_string().cyan());
    println!("  Target:         {}", report.target.to_string().cyan());
    println!(
        "  Persisted key:  {}",
        report.persisted_key.display().to_string().dimmed()
    );
    println!();
    println!("{}", "Next steps:".bold());
    println!("  1. Reboot into the installed system");
    println!("  2. The system pulls further changes with the persisted key");
}
