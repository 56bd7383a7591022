//! Command-line arguments

use clap::{ArgAction, Args, Parser, Subcommand};
use dmnx_sdk::{ExecutorConfig, RunOptions};
use std::io::{self, Read};
use std::path::PathBuf;

const EXAMPLES: &str = r#"Examples:
  # Execute all decisions
  dmnx execute model.dmn '{"x": 10}'

  # Execute a specific decision service
  dmnx service model.dmn '{"x": 10}' --service "Pricing Service"

  # Show model info including decision services
  dmnx info model.dmn

  # Read input from stdin
  echo '{"age": 25}' | dmnx execute model.dmn -"#;

#[derive(Debug, Parser)]
#[command(name = "dmnx", version)]
#[command(about = "Execute DMN decision models", long_about = None)]
#[command(after_help = EXAMPLES, arg_required_else_help = true)]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Execute a model (all decisions, one decision, or a decision service)
    Execute(RunArgs),
    /// Execute a decision service (requires --service)
    Service(RunArgs),
    /// Show inputs, decisions, services, types and BKMs of the loaded models
    Info(RunArgs),
}

impl Commands {
    pub fn args(&self) -> &RunArgs {
        match self {
            Commands::Execute(args) | Commands::Service(args) | Commands::Info(args) => args,
        }
    }
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Path to the main DMN file
    pub model_path: PathBuf,

    /// JSON object with input values ("-" reads stdin)
    pub input: Option<String>,

    /// Decision to evaluate when neither --decision nor --service is given
    #[arg(value_name = "DECISION")]
    pub decision_name: Option<String>,

    /// Execute a decision service by name
    #[arg(short, long, value_name = "NAME")]
    pub service: Option<String>,

    /// Execute only this decision
    #[arg(short, long, value_name = "NAME")]
    pub decision: Option<String>,

    /// Select the model by name when several are loaded
    #[arg(short, long = "model", value_name = "NAME")]
    pub model: Option<String>,

    /// Add a DMN file or directory to the model set
    #[arg(short, long = "import", value_name = "PATH")]
    pub imports: Vec<PathBuf>,

    /// Do not load sibling DMN files of the main model
    #[arg(long)]
    pub no_auto_import: bool,

    /// Do not check inputs and results against declared types
    #[arg(long)]
    pub no_typecheck: bool,
}

impl RunArgs {
    /// Build run options on top of the configured defaults, reading stdin for `-`
    pub fn to_options(&self, config: &ExecutorConfig) -> io::Result<RunOptions> {
        let mut options = config.run_options(&self.model_path);
        options.imports = self.imports.clone();
        options.auto_import = options.auto_import && !self.no_auto_import;
        options.typecheck = options.typecheck && !self.no_typecheck;
        options.model_name = self.model.clone();
        options.service = self.service.clone();
        options.decision = self.decision.clone();
        if options.decision.is_none() && options.service.is_none() {
            options.decision = self.decision_name.clone();
        }
        options.input = match self.input.as_deref() {
            Some("-") => {
                let mut text = String::new();
                io::stdin().read_to_string(&mut text)?;
                Some(text)
            }
            other => other.map(str::to_string),
        };
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("dmnx").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_execute_with_options() {
        let cli = parse(&[
            "execute",
            "model.dmn",
            r#"{"age": 25}"#,
            "-i",
            "lib",
            "--import",
            "extra.dmn",
            "--no-typecheck",
            "-vv",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Execute(args) = &cli.command else {
            panic!("expected execute");
        };

        let options = args.to_options(&ExecutorConfig::default()).unwrap();
        assert_eq!(options.model_path, PathBuf::from("model.dmn"));
        assert_eq!(options.input.as_deref(), Some(r#"{"age": 25}"#));
        assert_eq!(options.imports, vec![PathBuf::from("lib"), PathBuf::from("extra.dmn")]);
        assert!(options.auto_import);
        assert!(!options.typecheck);
    }

    #[test]
    fn test_third_positional_is_decision() {
        let cli = parse(&["execute", "model.dmn", "{}", "Eligible"]);
        let options = cli.command.args().to_options(&ExecutorConfig::default()).unwrap();
        assert_eq!(options.decision.as_deref(), Some("Eligible"));

        let cli = parse(&["execute", "model.dmn", "{}", "Eligible", "-s", "Svc"]);
        let options = cli.command.args().to_options(&ExecutorConfig::default()).unwrap();
        assert_eq!(options.decision, None);
        assert_eq!(options.service.as_deref(), Some("Svc"));
    }

    #[test]
    fn test_config_defaults_and_flags() {
        let config = ExecutorConfig {
            auto_import: false,
            ..ExecutorConfig::default()
        };
        let cli = parse(&["info", "model.dmn", "-m", "Loan", "--no-auto-import"]);
        let options = cli.command.args().to_options(&config).unwrap();
        assert!(!options.auto_import);
        assert!(options.typecheck);
        assert_eq!(options.model_name.as_deref(), Some("Loan"));
        assert!(options.input.is_none());
    }

    #[test]
    fn test_missing_model_path_is_an_error() {
        let err = Cli::try_parse_from(["dmnx", "execute"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
