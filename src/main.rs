//! prorata - royalty distribution from publisher spreadsheets

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use prorata::{FundPool, distribute, export, formula, import};

#[derive(Parser)]
#[command(name = "prorata")]
#[command(version, about = "Pro-rata royalty distribution from publisher spreadsheets", long_about = None)]
#[command(after_help = "EXAMPLES:
    prorata ./submissions --funds 25000    Distribute 25000 across all submissions
    prorata                                Prompt for folder and amount interactively")]
struct Cli {
    /// Folder containing the publisher submission spreadsheets
    #[arg(value_name = "FOLDER")]
    folder: Option<PathBuf>,

    /// Total funds to distribute (total amount minus administrative expenses)
    #[arg(short, long)]
    funds: Option<f64>,

    /// Fraction of each licence amount paid to the publisher
    #[arg(long, default_value_t = distribute::DEFAULT_PUBLISHER_SHARE)]
    ratio: f64,

    /// Suppress progress messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> prorata::Result<()> {
    if !cli.quiet {
        let banner = "REPROGRAPHIC RIGHTS ROYALTY DISTRIBUTION";
        println!("\n{banner}");
        println!("{}", "-".repeat(banner.len()));
    }

    let folder = match cli.folder {
        Some(folder) => folder,
        None => PathBuf::from(prompt("Enter full path of the folder with submissions:")?),
    };

    let mut records = import::read_directory(&folder)?;
    if !cli.quiet {
        println!("Parsed {} book(s) from {}", records.len(), folder.display());
    }

    records.iter_mut().for_each(formula::annotate);

    let funds = match cli.funds {
        Some(funds) => funds,
        None => prompt_funds()?,
    };

    let pool = FundPool::allocate(&mut records, funds)?;
    let ledger = distribute::settle(&records, cli.ratio);

    let paths = export::write_outputs(&folder, &records, &pool, &ledger)?;
    if !cli.quiet {
        println!("Spreadsheet with all publishers' books created");
        println!("Spreadsheet with all publishers' payments created");
        println!("Spreadsheet with all authors' payments created");
        println!("Output written to {}", paths.all_books.parent().unwrap_or(&folder).display());
    }

    Ok(())
}

fn prompt(message: &str) -> std::io::Result<String> {
    println!("{message}");
    print!("-> ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Ask for the fund amount until a positive number is entered.
fn prompt_funds() -> std::io::Result<f64> {
    loop {
        let input = prompt(
            "\nEnter amount of funds to be distributed\n\
             (total amount minus administrative expenses)\n\
             [enter a number without currency symbols or thousands separators]:",
        )?;
        match input.parse::<f64>() {
            Ok(funds) if funds > 0.0 && funds.is_finite() => return Ok(funds),
            _ => eprintln!("Not a positive amount: {input:?}"),
        }
    }
}
