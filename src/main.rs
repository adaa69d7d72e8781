//! `expfile`: list, extract and carve EXP archives.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use expfile::extract::ExtractOptions;
use expfile::result::ExpResult;
use expfile::{Config, ExpArchive, extract_archive};

#[repr(i32)]
enum ExitCode {
    Success = 0,
    InvalidFile = 1,
}

#[derive(Debug, Parser)]
#[command(version, about = "Extract assets from CSPUD (.exp) archives")]
struct Cli {
    /// More log output; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract every entry of each archive into OUT_DIR/<archive name>/.
    Extract {
        #[arg(required = true)]
        archives: Vec<PathBuf>,

        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Suffix removed from an archive's file name to name its output directory.
        #[arg(long, default_value = ".exp")]
        suffix: String,

        /// Memory limit for the LZMA decoder, in KiB.
        #[arg(long)]
        memory_limit: Option<u32>,
    },
    /// Show the entry table and payload records of an archive.
    List { archive: PathBuf },
    /// Copy an entry's stored payload body, undecoded, to a file.
    Carve {
        archive: PathBuf,

        #[arg(long)]
        id: u16,

        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => log::LevelFilter::Error,
        (false, 0) => log::LevelFilter::Warn,
        (false, 1) => log::LevelFilter::Info,
        (false, _) => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let code = match cli.command {
        Command::Extract {
            archives,
            out_dir,
            suffix,
            memory_limit,
        } => {
            let mut config = Config::default();
            if let Some(limit) = memory_limit {
                config = config.memory_limit_kib(limit);
            }
            let options = ExtractOptions::default()
                .config(config)
                .archive_suffix(suffix);
            extract(&archives, &out_dir, &options)
        }
        Command::List { archive } => report(list(&archive)),
        Command::Carve {
            archive,
            id,
            output,
        } => report(carve(&archive, id, &output)),
    };
    process::exit(code as i32)
}

fn report(result: ExpResult<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::InvalidFile
        }
    }
}

fn extract(archives: &[PathBuf], out_dir: &Path, options: &ExtractOptions) -> ExitCode {
    let mut code = ExitCode::Success;
    for archive in archives {
        match extract_archive(archive, out_dir, options) {
            Ok(report) => {
                let skipped = report.skipped().count();
                println!(
                    "{}: {} written, {skipped} skipped -> {}",
                    archive.display(),
                    report.written().count(),
                    report.out_dir.display()
                );
            }
            Err(e) => {
                /* This archive is done for, but the next one may be fine. */
                eprintln!("error extracting {}: {e}", archive.display());
                code = ExitCode::InvalidFile;
            }
        }
    }
    code
}

fn list(path: &Path) -> ExpResult<()> {
    let mut exp = ExpArchive::open(path)?;
    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "{}: {} entries",
        path.display(),
        exp.header().entry_count
    )?;
    writeln!(
        stdout,
        "{:>5}  {:>10}  {:>10}  {:>10}  mode",
        "id", "offset", "stored", "size"
    )?;
    for entry in exp.entries().to_vec() {
        match exp.read_payload(entry) {
            Ok(record) => writeln!(
                stdout,
                "{:>5}  {:>#10X}  {:>10}  {:>10}  {}",
                entry.file_id,
                entry.payload_offset,
                record.compressed_size,
                record.raw_size,
                record.storage_mode()
            )?,
            Err(e) => writeln!(
                stdout,
                "{:>5}  {:>#10X}  unreadable: {e}",
                entry.file_id, entry.payload_offset
            )?,
        }
    }
    stdout.flush()?;
    Ok(())
}

fn carve(path: &Path, file_id: u16, output: &Path) -> ExpResult<()> {
    let mut exp = ExpArchive::open(path)?;
    let entry = exp.by_id(file_id)?;
    let mut out = io::BufWriter::new(fs::File::create(output)?);
    let copied = exp.copy_raw(entry, &mut out)?;
    out.flush()?;
    log::info!(
        "copied {copied} bytes of file id {file_id} to {}",
        output.display()
    );
    Ok(())
}
