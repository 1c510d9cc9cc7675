//! docpage CLI - DOCX to self-contained HTML conversion
//!
//! Converts a DOCX file into a single mobile-friendly HTML page with the
//! stylesheet and every image embedded.

use clap::{Parser, Subcommand};
use colored::*;
use docpage::PageOptions;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// DOCX to standalone HTML conversion
#[derive(Parser)]
#[command(
    name = "docpage",
    version,
    about = "Convert DOCX documents to self-contained HTML pages",
    long_about = "docpage - DOCX to HTML conversion.\n\n\
                  Produces a single HTML file with styles and images embedded,\n\
                  readable offline on any screen size."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document to a standalone HTML page
    #[command(visible_alias = "html")]
    Convert {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: input name with .html)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Page title (default: document metadata, then file name)
        #[arg(short, long)]
        title: Option<String>,

        /// Skip the web-font stylesheet link (system fonts only)
        #[arg(long)]
        no_remote_fonts: bool,

        /// Skip the generated table of contents
        #[arg(long)]
        no_toc: bool,

        /// Maximum heading level (1-6)
        #[arg(long, default_value = "6")]
        max_heading: u8,
    },

    /// Dump the parsed document model as JSON
    Json {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show document information and metadata
    Info {
        /// Input file path
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Convert {
            input,
            output,
            title,
            no_remote_fonts,
            no_toc,
            max_heading,
        } => {
            let mut options = PageOptions::new()
                .with_remote_fonts(!no_remote_fonts)
                .with_table_of_contents(!no_toc)
                .with_max_heading_level(max_heading);

            if let Some(title) = title {
                options = options.with_title(title);
            } else if let Some(stem) = title_from_path(&input) {
                options = options.with_title(stem);
            }

            let data = fs::read(&input)?;
            let conversion = docpage::convert_bytes_with_options(&data, &options)?;

            report_warnings(&conversion.warnings);

            let output = output.unwrap_or_else(|| input.with_extension("html"));
            fs::write(&output, &conversion.html)?;
            println!(
                "{} Converted to HTML: {}",
                "✓".green().bold(),
                output.display()
            );
        }

        Commands::Json { input, output } => {
            let data = fs::read(&input)?;
            let (doc, warnings) = docpage::parse_bytes(&data)?;

            report_warnings(&warnings);

            let json = doc.to_json()?;
            write_output(output.as_ref(), &json)?;

            if let Some(path) = output {
                println!(
                    "{} Converted to JSON: {}",
                    "✓".green().bold(),
                    path.display()
                );
            }
        }

        Commands::Info { input } => {
            let data = fs::read(&input)?;
            let (doc, warnings) = docpage::parse_bytes(&data)?;

            println!("{}", "Document Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            println!("{}: {}", "Blocks".bold(), doc.blocks.len());
            println!("{}: {}", "Images".bold(), doc.resources.len());

            if let Some(ref title) = doc.metadata.title {
                println!("{}: {}", "Title".bold(), title);
            }
            if let Some(ref author) = doc.metadata.author {
                println!("{}: {}", "Author".bold(), author);
            }
            if let Some(ref created) = doc.metadata.created {
                println!("{}: {}", "Created".bold(), created);
            }
            if let Some(ref modified) = doc.metadata.modified {
                println!("{}: {}", "Modified".bold(), modified);
            }

            let text = doc.plain_text();
            println!("\n{}", "Content Statistics".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Words".bold(), text.split_whitespace().count());
            println!("{}: {}", "Characters".bold(), text.len());

            if !warnings.is_empty() {
                println!("\n{}", "Warnings".yellow().bold());
                println!("{}", "─".repeat(40));
                for warning in &warnings {
                    println!("{}", warning);
                }
            }
        }
    }

    Ok(())
}

/// File stem with separators spaced out, the way people title documents.
fn title_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let title = stem.replace(['_', '-'], " ").trim().to_string();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

fn report_warnings(warnings: &[docpage::Warning]) {
    for warning in warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_title_from_path() {
        assert_eq!(
            title_from_path(Path::new("q3_site-review.docx")).as_deref(),
            Some("q3 site review")
        );
        assert_eq!(title_from_path(Path::new("___.docx")), None);
    }
}
