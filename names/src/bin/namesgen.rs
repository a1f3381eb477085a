//! Generates `src/consts_gen.rs` from `names_data.csv`.
//!
//! One `pub const` per qualifying service, keyed by the provider display name
//! and resolving to the provider package name. Output is deterministic: rows
//! are stably sorted by display name and the file is fully rendered in memory
//! before a truncate-and-write, so regeneration from the same CSV is
//! byte-identical and repeated runs never accumulate duplicates.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

// Column indices of names_data.csv. The 20-column layout is a fixed external
// contract; the header row is required and skipped.
//
//   0  aws_cli_v2_command          10 sdk_version
//   1  aws_cli_v2_command_no_dashes 11 resource_prefix_actual
//   2  go_v1_package               12 resource_prefix_correct
//   3  go_v2_package               13 human_friendly
//   4  provider_package_actual     14 brand
//   5  provider_package_correct    15 exclude
//   6  aliases                     16 allowed_subcategory
//   7  provider_name_upper         17 deprecated_env_var
//   8  go_v1_client_name           18 env_var
//   9  skip_client_generate        19 note
const PROVIDER_PACKAGE_ACTUAL: usize = 4;
const PROVIDER_PACKAGE_CORRECT: usize = 5;
const PROVIDER_NAME_UPPER: usize = 7;
const EXCLUDE: usize = 15;
const COLUMN_COUNT: usize = 20;

const HEADER: &str = "// Code generated by namesgen from names_data.csv. DO NOT EDIT.";

#[derive(Parser)]
#[command(name = "namesgen", about = "Generate service name constants from names_data.csv")]
struct Args {
    /// Path to the service metadata CSV
    #[arg(long, default_value = "names_data.csv")]
    input: PathBuf,

    /// Path of the generated constants file
    #[arg(long, default_value = "src/consts_gen.rs")]
    output: PathBuf,
}

#[derive(Debug, PartialEq)]
struct ServiceDatum {
    provider_name_upper: String,
    provider_package: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    run(&args.input, &args.output)
}

fn run(input: &Path, output: &Path) -> Result<()> {
    let data = fs::read_to_string(input)
        .with_context(|| format!("error reading {}", input.display()))?;

    let services = collect_services(&data)?;
    tracing::info!(count = services.len(), "rendering service constants");

    let contents = render(&services)?;
    fs::write(output, contents)
        .with_context(|| format!("error writing {}", output.display()))?;

    tracing::info!(output = %output.display(), "wrote generated constants");
    Ok(())
}

/// Parses and filters the CSV into sorted service data.
///
/// Rows with a non-empty exclude column, or with both package-name columns
/// empty, are omitted. The "actual" package name wins over the "correct" one.
fn collect_services(data: &str) -> Result<Vec<ServiceDatum>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_bytes());

    let mut services = Vec::new();

    for (i, record) in reader.records().enumerate() {
        // Line numbers are 1-based and the header occupies line 1.
        let line = i + 2;
        let record = record.with_context(|| format!("malformed CSV at line {}", line))?;

        if record.len() != COLUMN_COUNT {
            bail!(
                "line {}: expected {} columns, found {}",
                line,
                COLUMN_COUNT,
                record.len()
            );
        }

        if !record[EXCLUDE].is_empty() {
            continue;
        }

        if record[PROVIDER_PACKAGE_ACTUAL].is_empty()
            && record[PROVIDER_PACKAGE_CORRECT].is_empty()
        {
            continue;
        }

        let package = if record[PROVIDER_PACKAGE_ACTUAL].is_empty() {
            &record[PROVIDER_PACKAGE_CORRECT]
        } else {
            &record[PROVIDER_PACKAGE_ACTUAL]
        };

        services.push(ServiceDatum {
            provider_name_upper: record[PROVIDER_NAME_UPPER].to_string(),
            provider_package: package.to_string(),
        });
    }

    // Stable sort keeps output reproducible for equal display names.
    services.sort_by(|a, b| a.provider_name_upper.cmp(&b.provider_name_upper));

    Ok(services)
}

/// Renders the constants file and runs it through the source formatter.
///
/// A CSV value that does not form a valid constant (bad identifier, stray
/// quote) fails the parse here, aborting the run before anything is written.
fn render(services: &[ServiceDatum]) -> Result<String> {
    let mut body = String::from("#![allow(non_upper_case_globals)]\n");

    for service in services {
        writeln!(
            body,
            "pub const {}: &str = \"{}\";",
            service.provider_name_upper, service.provider_package
        )?;
    }

    let file = syn::parse_file(&body).context("generated constants are not valid Rust")?;
    Ok(format!("{}\n{}", HEADER, prettyplease::unparse(&file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV_HEADER: &str = "aws_cli_v2_command,aws_cli_v2_command_no_dashes,go_v1_package,go_v2_package,provider_package_actual,provider_package_correct,aliases,provider_name_upper,go_v1_client_name,skip_client_generate,sdk_version,resource_prefix_actual,resource_prefix_correct,human_friendly,brand,exclude,allowed_subcategory,deprecated_env_var,env_var,note\n";

    fn row(actual: &str, correct: &str, name_upper: &str, exclude: &str) -> String {
        format!(
            "cmd,cmd,pkg,pkg,{},{},,{},Client,,1,,prefix_,Friendly,AWS,{},,,,\n",
            actual, correct, name_upper, exclude
        )
    }

    #[test]
    fn excluded_rows_are_omitted() {
        let data = format!(
            "{}{}{}",
            CSV_HEADER,
            row("", "efs", "EFS", ""),
            row("", "honeycode", "Honeycode", "x"),
        );

        let services = collect_services(&data).unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].provider_name_upper, "EFS");
    }

    #[test]
    fn rows_without_any_package_are_omitted() {
        let data = format!(
            "{}{}{}",
            CSV_HEADER,
            row("", "", "Example", ""),
            row("", "backup", "Backup", ""),
        );

        let services = collect_services(&data).unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].provider_package, "backup");
    }

    #[test]
    fn actual_package_wins_over_correct() {
        let data = format!(
            "{}{}",
            CSV_HEADER,
            row("appautoscaling", "applicationautoscaling", "AppAutoScaling", ""),
        );

        let services = collect_services(&data).unwrap();
        assert_eq!(services[0].provider_package, "appautoscaling");
    }

    #[test]
    fn output_is_sorted_by_display_name() {
        let data = format!(
            "{}{}{}",
            CSV_HEADER,
            row("", "bbb", "B", ""),
            row("", "aaa", "A", ""),
        );

        let services = collect_services(&data).unwrap();
        let rendered = render(&services).unwrap();

        let a = rendered.find("pub const A:").unwrap();
        let b = rendered.find("pub const B:").unwrap();
        assert!(a < b);
    }

    #[test]
    fn wrong_column_count_is_fatal() {
        let data = format!("{}too,few,columns\n", CSV_HEADER);
        assert!(collect_services(&data).is_err());
    }

    #[test]
    fn malformed_quoting_is_fatal() {
        let data = format!("{}cmd,cmd,\"unterminated\n", CSV_HEADER);
        assert!(collect_services(&data).is_err());
    }

    #[test]
    fn invalid_identifier_fails_formatting() {
        let services = vec![ServiceDatum {
            provider_name_upper: "not an ident".to_string(),
            provider_package: "pkg".to_string(),
        }];
        assert!(render(&services).is_err());
    }

    #[test]
    fn regeneration_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("names_data.csv");
        let output = dir.path().join("consts_gen.rs");

        std::fs::write(
            &input,
            format!(
                "{}{}{}",
                CSV_HEADER,
                row("", "efs", "EFS", ""),
                row("", "backup", "Backup", ""),
            ),
        )
        .unwrap();

        run(&input, &output).unwrap();
        let first = std::fs::read_to_string(&output).unwrap();

        // A second run truncates and rewrites rather than appending.
        run(&input, &output).unwrap();
        let second = std::fs::read_to_string(&output).unwrap();

        assert_eq!(first, second);
        assert!(first.starts_with("// Code generated by namesgen"));
        assert!(first.contains("pub const Backup: &str = \"backup\";"));
        assert!(first.contains("pub const EFS: &str = \"efs\";"));
    }
}
