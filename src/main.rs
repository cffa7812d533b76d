use std::io;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser as ClapParser};
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_subscriber::EnvFilter;

use typegraft::convert::{convert, ConversionOptions};
use typegraft::report::{ConversionReport, JsonFormatter, ReportFormatter, TextFormatter};

#[derive(ClapParser, Debug)]
#[command(
    name = "typegraft",
    version,
    about = "Convert JavaScript files to TypeScript using sibling .d.ts declarations"
)]
struct Cli {
    /// Input file or directory.
    input: PathBuf,

    /// Output directory (defaults to `ts-output` inside the input directory).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing files.
    #[arg(long)]
    overwrite: bool,

    /// Disable strict mode.
    #[arg(long = "no-strict", action = ArgAction::SetFalse)]
    strict: bool,

    /// File patterns to ignore (e.g. "**/*.min.js").
    #[arg(short, long, num_args = 1..)]
    ignore: Vec<String>,

    /// Delete each original file after it has been converted.
    #[arg(long = "no-keep-original", action = ArgAction::SetFalse)]
    keep_original: bool,

    /// Print progress and list failed files.
    #[arg(short, long)]
    verbose: bool,

    /// Print the per-file results as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir().wrap_err("cannot determine current directory")?;
    let input = resolve(&cwd, &cli.input);

    let mut options = ConversionOptions::new(&input)
        .with_overwrite(cli.overwrite)
        .with_strict(cli.strict)
        .with_ignore(cli.ignore)
        .with_keep_original(cli.keep_original)
        .with_verbose(cli.verbose);
    if let Some(output) = &cli.output {
        options = options.with_output(resolve(&cwd, output));
    }
    info!(?options, "options");

    if !cli.json {
        println!("Converting JavaScript to TypeScript from: {}", input.display());
    }
    let results = convert(options)
        .await
        .wrap_err_with(|| format!("failed to convert {}", input.display()))?;

    let report = ConversionReport::new(results);
    let output = if cli.json {
        JsonFormatter.format(&report)
    } else {
        let formatter = TextFormatter {
            list_failures: cli.verbose,
        };
        format!("\n{}", formatter.format(&report))
    };
    print!("{output}");

    Ok(())
}

fn resolve(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// `RUST_LOG` wins; otherwise `info` with `--verbose` and `warn` without.
fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
