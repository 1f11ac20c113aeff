//! CLI: конвертирует XML-выписку (или каталог выписок) в CSV.

use anyhow::{Context, Result, bail};
use clap::Parser;
use galgo_balance_csv::{
    CsvOptions, PositionRecord, RawStatement, StatementSet, StatementTree, write_csv,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Конвертация выписок остатков Galgo в CSV.
#[derive(Debug, Parser)]
#[command(name = "galgo-balance-csv", version, about, long_about = None)]
struct Cli {
    /// XML-файл выписки или каталог с выписками
    input: PathBuf,

    /// Выходной CSV-файл (по умолчанию stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Разделитель полей
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Не писать строку заголовков
    #[arg(long)]
    no_header: bool,

    /// Подробность логов (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let delimiter = match u8::try_from(cli.delimiter) {
        Ok(byte) if byte.is_ascii() => byte,
        _ => bail!("delimiter must be a single ASCII character"),
    };
    let options = CsvOptions::new()
        .delimiter(delimiter)
        .header(!cli.no_header);

    let records = load_records(&cli.input)?;

    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    write_csv(BufWriter::new(writer), &records, &options).context("writing CSV")?;

    tracing::info!(rows = records.len(), "conversion finished");
    Ok(())
}

fn load_records(input: &Path) -> Result<Vec<PositionRecord>> {
    if input.is_dir() {
        let set = StatementSet::from_dir(input)
            .with_context(|| format!("reading statements from {}", input.display()))?;
        return Ok(set.records().cloned().collect());
    }

    let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    let raw = RawStatement::from_reader(file)?;
    let tree = StatementTree::parse(&raw)
        .with_context(|| format!("parsing XML {}", input.display()))?;
    Ok(tree.records())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}
