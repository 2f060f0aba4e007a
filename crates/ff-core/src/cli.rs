//! Command-line interface for `fitframe`.
//!
//! Every command resolves configuration first, lets flags override it, and
//! returns an [`ExitCode`]. Results go to stdout in the selected
//! [`OutputFormat`]; logs go to stderr.

use std::io;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use ff_common::{Error, OutputFormat, Result, RunId, SCHEMA_VERSION};
use ff_config::{
    resolve_config, ColumnOrder, CompressionKind, FrameConfig, ResolvedConfig, UnrecognizedPolicy,
};
use ff_telemetry::{pretty_preview, ParquetTableWriter, WriteError, WriterConfig};
use serde::Serialize;
use tracing::{debug, info};

use crate::assemble::Assembly;
use crate::exit_codes::ExitCode;
use crate::logging::LogConfig;
use crate::pipeline::{check_file, decode_file, DecodeOptions};
use crate::report::{CheckReport, DecodeReport, ErrorReport, ExportReport, SegmentInfo};

/// Decode Garmin FIT files into column-oriented tables.
#[derive(Parser, Debug)]
#[command(name = "fitframe", version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Path to a config file (overrides FITFRAME_CONFIG and the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            verbose: self.verbose,
            quiet: self.quiet,
            json: self.log_json,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a FIT file and print every table
    Decode(DecodeArgs),
    /// Decode a FIT file and write one Parquet file per table
    Export(ExportArgs),
    /// Print the first rows of one table as a text grid
    Show(ShowArgs),
    /// Verify headers and CRCs without decoding records
    Check {
        /// FIT file to verify
        file: PathBuf,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the resolved configuration and where it came from
    Show,
}

/// Flags shared by every command that builds tables.
#[derive(Args, Debug, Clone, Default)]
pub struct FrameArgs {
    /// Column ordering within each table
    #[arg(long, value_enum)]
    pub column_order: Option<ColumnOrder>,

    /// What to store for values of unsupported base types
    #[arg(long, value_enum)]
    pub unrecognized: Option<UnrecognizedPolicy>,

    /// Only keep these tables (repeatable)
    #[arg(long = "table", value_name = "NAME")]
    pub tables: Vec<String>,
}

impl FrameArgs {
    fn apply(&self, config: &mut FrameConfig) {
        if let Some(order) = self.column_order {
            config.column_order = order;
        }
        if let Some(policy) = self.unrecognized {
            config.unrecognized_values = policy;
        }
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// FIT file to decode
    pub file: PathBuf,

    #[command(flatten)]
    pub frame: FrameArgs,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// FIT file to decode
    pub file: PathBuf,

    /// Directory receiving `<table>.parquet` files
    #[arg(long, value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Parquet compression codec
    #[arg(long, value_enum)]
    pub compression: Option<CompressionKind>,

    #[command(flatten)]
    pub frame: FrameArgs,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// FIT file to decode
    pub file: PathBuf,

    /// Table to preview
    pub table: String,

    /// Maximum number of rows to print
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    #[command(flatten)]
    pub frame: FrameArgs,
}

/// Run the parsed command line and report any error in the chosen format.
pub fn run(cli: &Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::Clean,
        Err(err) => {
            report_error(cli.format, &err);
            ExitCode::from(&err)
        }
    }
}

fn execute(cli: &Cli) -> Result<()> {
    let resolved = load_config(cli.config.as_deref())?;
    debug!(source = ?resolved.source, "configuration resolved");

    match &cli.command {
        Commands::Decode(args) => run_decode(cli.format, resolved.config, args),
        Commands::Export(args) => run_export(cli.format, resolved.config, args),
        Commands::Show(args) => run_show(resolved.config, args),
        Commands::Check { file } => run_check(cli.format, file),
        Commands::Config {
            command: ConfigCommands::Show,
        } => run_config_show(cli.format, &resolved),
    }
}

fn load_config(path: Option<&Path>) -> Result<ResolvedConfig> {
    resolve_config(path).map_err(|e| Error::Config(e.to_string()))
}

fn decode_tables(
    file: &Path,
    mut config: FrameConfig,
    frame: &FrameArgs,
) -> Result<(Assembly, u64, FrameConfig)> {
    frame.apply(&mut config);
    let outcome = decode_file(file, &DecodeOptions::from(&config))?;
    let mut assembly = outcome.assembly;
    select_tables(&mut assembly, &frame.tables)?;
    Ok((assembly, outcome.records, config))
}

/// Keep only the requested tables; asking for one the file lacks is an error.
fn select_tables(assembly: &mut Assembly, wanted: &[String]) -> Result<()> {
    if wanted.is_empty() {
        return Ok(());
    }
    if let Some(missing) = wanted.iter().find(|name| assembly.get(name).is_none()) {
        return Err(Error::Config(format!("no table named '{missing}' in file")));
    }
    assembly.retain_keys(wanted);
    Ok(())
}

fn run_decode(format: OutputFormat, config: FrameConfig, args: &DecodeArgs) -> Result<()> {
    let (assembly, records, _) = decode_tables(&args.file, config, &args.frame)?;
    let report = DecodeReport::new(args.file.clone(), records, assembly);
    emit(format, &report, || report.summary())
}

fn run_export(format: OutputFormat, config: FrameConfig, args: &ExportArgs) -> Result<()> {
    let (assembly, _, config) = decode_tables(&args.file, config, &args.frame)?;
    let compression = args.compression.unwrap_or(config.export.compression);

    let writer = ParquetTableWriter::new(
        WriterConfig::new(&args.out_dir).with_compression(compression),
    )
    .map_err(export_error)?;
    let written = writer.write_all(assembly.iter()).map_err(export_error)?;
    let skipped = assembly
        .iter()
        .filter(|(_, table)| table.columns.is_empty())
        .map(|(key, _)| key.to_string())
        .collect();

    let report = ExportReport {
        schema_version: SCHEMA_VERSION,
        run_id: RunId::new(),
        source: args.file.clone(),
        out_dir: args.out_dir.clone(),
        written,
        skipped,
    };
    emit(format, &report, || report.summary())
}

/// Always prints a text grid; `--format` does not apply.
fn run_show(config: FrameConfig, args: &ShowArgs) -> Result<()> {
    let (assembly, _, _) = decode_tables(&args.file, config, &args.frame)?;
    let table = assembly
        .get(&args.table)
        .ok_or_else(|| Error::Config(format!("no table named '{}' in file", args.table)))?;

    let grid = pretty_preview(table, args.limit).map_err(|e| Error::Io(io::Error::other(e)))?;
    println!("{grid}");
    if table.row_count > args.limit {
        println!("({} of {} rows)", args.limit, table.row_count);
    }
    Ok(())
}

fn run_check(format: OutputFormat, file: &Path) -> Result<()> {
    let headers = check_file(file)?;
    info!(segments = headers.len(), "integrity check passed");

    let report = CheckReport {
        source: file.to_path_buf(),
        status: "ok",
        segments: headers
            .iter()
            .map(|h| SegmentInfo {
                protocol_version: h.protocol_version,
                profile_version: h.profile_version,
                data_size: h.data_size,
            })
            .collect(),
    };
    emit(format, &report, || report.summary())
}

fn run_config_show(format: OutputFormat, resolved: &ResolvedConfig) -> Result<()> {
    emit(format, resolved, || {
        let body = resolved
            .config
            .to_json()
            .unwrap_or_else(|e| format!("<unprintable: {e}>"));
        format!("source: {:?}\n{body}\n", resolved.source)
    })
}

fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    summary: impl FnOnce() -> String,
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Summary => print!("{}", summary()),
    }
    Ok(())
}

fn export_error(err: WriteError) -> Error {
    match err {
        WriteError::Io(e) => Error::Io(e),
        other => Error::Io(io::Error::other(other)),
    }
}

fn report_error(format: OutputFormat, err: &Error) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&ErrorReport::from(err)) {
            Ok(body) => println!("{body}"),
            Err(_) => eprintln!("error: {err}"),
        },
        OutputFormat::Summary => eprintln!("error: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn frame_flags_override_config() {
        let cli = Cli::parse_from([
            "fitframe",
            "decode",
            "ride.fit",
            "--column-order",
            "discovery",
            "--unrecognized",
            "sentinel",
            "--table",
            "record",
            "--table",
            "lap",
        ]);
        let Commands::Decode(args) = cli.command else {
            panic!("expected decode");
        };
        let mut config = FrameConfig::default();
        args.frame.apply(&mut config);
        assert_eq!(config.column_order, ColumnOrder::Discovery);
        assert_eq!(config.unrecognized_values, UnrecognizedPolicy::Sentinel);
        assert_eq!(args.frame.tables, vec!["record", "lap"]);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["fitframe", "check", "a.fit", "--format", "summary", "-vv"]);
        assert_eq!(cli.format, OutputFormat::Summary);
        assert_eq!(cli.log_config().default_directive(), "debug");
    }

    #[test]
    fn selecting_missing_table_is_config_error() {
        let mut assembly = Assembly::default();
        let err = select_tables(&mut assembly, &["lap".to_string()]).unwrap_err();
        assert_eq!(err.kind(), "config");
    }
}
