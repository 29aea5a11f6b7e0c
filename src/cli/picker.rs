//! Interactive CSV picker.
//!
//! Used when `dcfit fit` is started without the files its analysis needs.
//! Lists `*.csv` files under the working directory and reads a choice
//! (number or explicit path) from stdin.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Directory recursion depth when looking for CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Ask for the `kind` file (e.g. "charge") from the current directory tree.
pub fn prompt_for_csv_path(kind: &str) -> Result<PathBuf, AppError> {
    let files = discover_csv_files(Path::new("."));
    if files.is_empty() {
        return Err(AppError::Config(format!(
            "no {kind} file given and no .csv files found; pass one with --{kind} <file.csv>"
        )));
    }

    println!("Found {} CSV file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, pretty_path(path));
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        print!("Select the {kind} file (1-{}), type a path, or q to quit: ", files.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::io("failed to write prompt", e))?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::io("failed to read selection", e))?;
        if bytes == 0 {
            return Err(AppError::Config(format!(
                "no {kind} file selected; pass one with --{kind} <file.csv>"
            )));
        }

        match parse_choice(line.trim(), &files) {
            Choice::Quit => return Err(AppError::Config("canceled".to_string())),
            Choice::Path(path) => match validate_csv_path(&path) {
                Ok(path) => return Ok(path),
                Err(err) => println!("{err}"),
            },
            Choice::OutOfRange(n) => {
                println!("Invalid choice: {n}. Enter a number between 1 and {}.", files.len());
            }
        }
    }
}

#[derive(Debug, PartialEq)]
enum Choice {
    Quit,
    Path(PathBuf),
    OutOfRange(usize),
}

fn parse_choice(input: &str, files: &[PathBuf]) -> Choice {
    if input.eq_ignore_ascii_case("q") {
        return Choice::Quit;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=files.len()).contains(&n) => Choice::Path(files[n - 1].clone()),
        Ok(n) => Choice::OutOfRange(n),
        Err(_) => Choice::Path(PathBuf::from(input)),
    }
}

/// Check that `path` is an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::Config(format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::Config(format!(
            "expected a file, got a directory: {}",
            path.display()
        )));
    }
    if !has_csv_extension(path) {
        return Err(AppError::Config(format!("expected a .csv file, got: {}", path.display())));
    }
    Ok(path.to_path_buf())
}

/// `*.csv` files under `root`, sorted by display path.
pub fn discover_csv_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_csv_files(root, 0, DEFAULT_SEARCH_DEPTH, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_csv_files(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_csv_files(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "debug")
}

fn pretty_path(path: &Path) -> String {
    path.strip_prefix("./").unwrap_or(path).display().to_string()
}
