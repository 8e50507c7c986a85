//! Interactive mode, used when no subcommand is given.
//!
//! Provides a menu-driven interface using `dialoguer` for converting a
//! statement without memorizing CLI flags.

use std::path::{Path, PathBuf};

use dialoguer::{Input, Select};
use extracto_cli_utils::MultiProgress;
use extracto_convert::profile::{Profile, load_profile};
use extracto_convert::registry::{self, DEFAULT_PROFILE};

/// Top-level actions available in the interactive menu.
enum Action {
    Convert,
    ListProfiles,
}

impl Action {
    const ALL: &[Self] = &[Self::Convert, Self::ListProfiles];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Convert => "Convert a PDF statement",
            Self::ListProfiles => "List profiles",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected conversion fails.
pub fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("Extracto: PDF statements to spreadsheets");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Convert => convert(multi)?,
        Action::ListProfiles => crate::list_profiles(),
    }

    Ok(())
}

/// Prompts for an input file, a profile and an output path, then converts.
fn convert(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt("PDF file")
        .validate_with(|path: &String| -> Result<(), String> {
            if Path::new(path).is_file() {
                Ok(())
            } else {
                Err(format!("{path} is not a file"))
            }
        })
        .interact_text()?;

    let profile = select_profile()?;

    let default_output = crate::default_output(&input);
    let output: String = Input::new()
        .with_prompt("Output file")
        .default(default_output.display().to_string())
        .interact_text()?;

    let sheet_name: String = Input::new()
        .with_prompt("Sheet name")
        .default(profile.sheet_name.clone())
        .interact_text()?;
    let profile = profile.with_sheet_name(&sheet_name);

    crate::convert_file(&input, &PathBuf::from(output), profile, multi)
}

/// Lets the user pick a built-in profile or load one from a TOML file.
fn select_profile() -> Result<Profile, Box<dyn std::error::Error>> {
    let profiles = registry::all_profiles();

    let mut labels: Vec<String> = profiles
        .iter()
        .map(|p| format!("{}: {}", p.id, p.name))
        .collect();
    labels.push("Load a profile file...".to_owned());

    let default = profiles
        .iter()
        .position(|p| p.id == DEFAULT_PROFILE)
        .unwrap_or(0);

    let idx = Select::new()
        .with_prompt("Statement layout")
        .items(&labels)
        .default(default)
        .interact()?;

    if let Some(profile) = profiles.into_iter().nth(idx) {
        return Ok(profile);
    }

    let path: String = Input::new()
        .with_prompt("Profile TOML file")
        .interact_text()?;
    Ok(load_profile(Path::new(&path))?)
}
