//! launch_config_validator CLI

use clap::{Parser, ValueEnum};
use launch_config_validator::{validate_files, Report, ValidateOptions};
use std::{path::PathBuf, process};

#[derive(Parser)]
#[command(name = "launch_config_validator")]
#[command(
    about = "Validate ROS 2 YAML launch and config files using JSON Schema and reference checks",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// YAML files or directories containing YAML files
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Tolerate missing packages and missing referenced files
    #[arg(long)]
    isolated_ci: bool,

    /// Launch arguments (key:=value)
    #[arg(short = 'a', long = "arg", value_parser = parse_launch_arg)]
    args: Vec<(String, String)>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[arg(short, long)]
    verbose: bool,

    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_launch_arg(s: &str) -> Result<(String, String), String> {
    match s.split_once(":=") {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("Invalid launch argument format: {}", s)),
    }
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let options = ValidateOptions {
        isolated: cli.isolated_ci,
        launch_args: cli.args,
    };
    if options.isolated {
        log::info!("Isolated mode: missing packages and referenced files are not errors");
    }

    let report = match validate_files(&cli.paths, &options) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = print_report(&report, cli.format) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    process::exit(report.exit_code());
}

fn print_report(report: &Report, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Text => {
            for node in &report.nodes {
                log::debug!(
                    "node {}/{} name={} ns={} ({})",
                    node.package.as_deref().unwrap_or("?"),
                    node.executable.as_deref().unwrap_or("?"),
                    node.name.as_deref().unwrap_or("-"),
                    node.namespace.as_deref().unwrap_or("?"),
                    node.document.display()
                );
            }
            for diagnostic in &report.diagnostics {
                eprintln!("{}", diagnostic);
            }
            if report.passed() {
                log::info!("All files passed");
            } else {
                log::info!("{} files with errors", report.error_files().len());
            }
        }
        OutputFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_launch_arg() {
        assert_eq!(
            parse_launch_arg("ns:=/robot"),
            Ok(("ns".to_string(), "/robot".to_string()))
        );
        assert_eq!(
            parse_launch_arg("expr:=a:=b"),
            Ok(("expr".to_string(), "a:=b".to_string()))
        );
        assert!(parse_launch_arg("novalue").is_err());
        assert!(parse_launch_arg(":=x").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::parse_from([
            "launch_config_validator",
            "--isolated-ci",
            "-a",
            "ns:=/a",
            "--format",
            "json",
            "src/pkg",
        ]);
        assert!(cli.isolated_ci);
        assert_eq!(cli.args, vec![("ns".to_string(), "/a".to_string())]);
        assert!(cli.format == OutputFormat::Json);
        assert_eq!(cli.paths, vec![PathBuf::from("src/pkg")]);
    }
}
