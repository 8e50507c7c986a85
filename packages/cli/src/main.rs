#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the PDF statement converter.
//!
//! Uses `indicatif-log-bridge` (via [`extracto_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the page progress bar never fight for the terminal.

mod interactive;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use extracto_cli_utils::{IndicatifProgress, MultiProgress};
use extracto_convert::profile::{Profile, load_profile};
use extracto_convert::registry::{self, DEFAULT_PROFILE};
use extracto_convert::{Converter, builtin_profile};
use extracto_statement_models::DecimalConvention;

/// Input path that means "read the PDF from stdin".
const STDIN: &str = "-";

/// Output file name used when the PDF comes from stdin.
const STDIN_OUTPUT: &str = "statement.xlsx";

#[derive(Parser)]
#[command(name = "extracto", about = "Convert PDF statements into styled spreadsheets")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF statement into an `.xlsx` workbook
    Convert {
        /// PDF file, or `-` to read it from stdin
        input: String,
        /// Output path (default: the input path with an `.xlsx` extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        profile: ProfileArgs,
        /// Name of the output sheet (overrides the profile)
        #[arg(long)]
        sheet_name: Option<String>,
        /// Amount separator convention: `strip_all`, `comma`, `dot` or `auto`
        #[arg(long, value_parser = parse_decimal)]
        decimal: Option<DecimalConvention>,
    },
    /// Print the parsed statement lines as JSON lines without writing a file
    Inspect {
        /// PDF file, or `-` to read it from stdin
        input: String,
        #[command(flatten)]
        profile: ProfileArgs,
        /// Amount separator convention: `strip_all`, `comma`, `dot` or `auto`
        #[arg(long, value_parser = parse_decimal)]
        decimal: Option<DecimalConvention>,
    },
    /// List the built-in conversion profiles
    Profiles,
}

#[derive(Args)]
struct ProfileArgs {
    /// Built-in profile id (see `extracto profiles`)
    #[arg(long, conflicts_with = "config")]
    profile: Option<String>,
    /// Profile TOML file
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ProfileArgs {
    fn resolve(&self) -> Result<Profile, Box<dyn std::error::Error>> {
        let profile = match (&self.config, &self.profile) {
            (Some(path), _) => load_profile(path)?,
            (None, Some(id)) => builtin_profile(id)?,
            (None, None) => builtin_profile(DEFAULT_PROFILE)?,
        };
        log::debug!("Using profile '{}' ({})", profile.id, profile.name);
        Ok(profile)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = extracto_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Some(command) => run(command, &multi),
        None => interactive::run(&multi),
    }
    .inspect_err(|e| log::error!("{e}"))
}

fn run(command: Commands, multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Convert {
            input,
            output,
            profile,
            sheet_name,
            decimal,
        } => {
            let mut profile = profile.resolve()?;
            if let Some(sheet_name) = sheet_name {
                profile = profile.with_sheet_name(&sheet_name);
            }
            if let Some(decimal) = decimal {
                profile = profile.with_decimal(decimal);
            }
            let output = output.unwrap_or_else(|| default_output(&input));
            convert_file(&input, &output, profile, multi)?;
        }
        Commands::Inspect {
            input,
            profile,
            decimal,
        } => {
            let mut profile = profile.resolve()?;
            if let Some(decimal) = decimal {
                profile = profile.with_decimal(decimal);
            }
            let converter = Converter::new(profile)?;
            let pdf = read_input(&input)?;
            let progress = IndicatifProgress::pages_bar(multi, &format!("Reading {input}"));
            let lines = converter.extract_lines(&pdf, &progress)?;

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for line in &lines {
                writeln!(out, "{}", serde_json::to_string(line)?)?;
            }
        }
        Commands::Profiles => list_profiles(),
    }

    Ok(())
}

/// Converts `input` with `profile` and writes the workbook to `output`.
///
/// Writes nothing when no statement lines were found.
pub(crate) fn convert_file(
    input: &str,
    output: &Path,
    profile: Profile,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let converter = Converter::new(profile)?;
    let pdf = read_input(input)?;
    let progress = IndicatifProgress::pages_bar(multi, &format!("Reading {input}"));

    let Some(bytes) = converter.convert(&pdf, &progress)? else {
        log::warn!("No statement lines found in {input}; {} not written", output.display());
        return Ok(());
    };

    std::fs::write(output, &bytes)?;
    log::info!("Wrote {}", output.display());

    Ok(())
}

fn parse_decimal(s: &str) -> Result<DecimalConvention, String> {
    s.parse()
        .map_err(|_| format!("'{s}' is not one of strip_all, comma, dot, auto"))
}

/// Reads the PDF bytes from a path, or from stdin for `-`.
fn read_input(input: &str) -> std::io::Result<Vec<u8>> {
    if input == STDIN {
        let mut buf = Vec::new();
        std::io::stdin().lock().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read(input)
    }
}

/// The input path with an `.xlsx` extension.
pub(crate) fn default_output(input: &str) -> PathBuf {
    if input == STDIN {
        PathBuf::from(STDIN_OUTPUT)
    } else {
        Path::new(input).with_extension("xlsx")
    }
}

/// Prints a table of the built-in profiles.
pub(crate) fn list_profiles() {
    println!("{:<16} {:<8} {:<8} NAME", "ID", "SOURCE", "PARSER");
    println!("{}", "-".repeat(60));
    for profile in registry::all_profiles() {
        let marker = if profile.id == DEFAULT_PROFILE { " (default)" } else { "" };
        println!(
            "{:<16} {:<8} {:<8} {}{marker}",
            profile.id,
            profile.source.text,
            profile.parser.strategy(),
            profile.name,
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_output_swaps_extension() {
        assert_eq!(
            default_output("statements/march.pdf"),
            PathBuf::from("statements/march.xlsx")
        );
        assert_eq!(default_output("-"), PathBuf::from(STDIN_OUTPUT));
    }

    #[test]
    fn convert_flags_parse() {
        let cli = Cli::try_parse_from([
            "extracto",
            "convert",
            "in.pdf",
            "--profile",
            "native_table",
            "--decimal",
            "dot",
            "--sheet-name",
            "Marzo",
        ])
        .unwrap();

        let Some(Commands::Convert {
            input,
            output,
            profile,
            sheet_name,
            decimal,
        }) = cli.command
        else {
            panic!("expected convert");
        };
        assert_eq!(input, "in.pdf");
        assert!(output.is_none());
        assert_eq!(profile.profile.as_deref(), Some("native_table"));
        assert_eq!(sheet_name.as_deref(), Some("Marzo"));
        assert_eq!(decimal, Some(DecimalConvention::Dot));
    }

    #[test]
    fn unknown_decimal_convention_is_rejected() {
        assert!(Cli::try_parse_from(["extracto", "convert", "in.pdf", "--decimal", "x"]).is_err());
    }

    #[test]
    fn profile_and_config_conflict() {
        let res = Cli::try_parse_from([
            "extracto",
            "inspect",
            "in.pdf",
            "--profile",
            "krona_ocr",
            "--config",
            "p.toml",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn unknown_profile_fails_the_run() {
        let multi = MultiProgress::new();
        let command = Commands::Convert {
            input: "in.pdf".to_owned(),
            output: None,
            profile: ProfileArgs {
                profile: Some("missing".to_owned()),
                config: None,
            },
            sheet_name: None,
            decimal: None,
        };
        let err = run(command, &multi).unwrap_err();
        assert!(err.to_string().contains("missing"), "{err}");
    }

    #[test]
    fn missing_profile_defaults() {
        let args = ProfileArgs {
            profile: None,
            config: None,
        };
        assert_eq!(args.resolve().unwrap().id, DEFAULT_PROFILE);
    }
}
