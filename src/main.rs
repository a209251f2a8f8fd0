//! `destripe-config`: inspect and check `acs_destripe` parameter sets.
//!
//! ```text
//! destripe-config show --format cfg
//! destripe-config --config acs_destripe.cfg --set stat=median check
//! destripe-config params dqbits
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use destripe_config::config::{
    validate_schema, ConfigError, ConfigLoader, DestripeConfig, PARAMETERS,
};
use destripe_config::{help, observability, TASK_NAME};

#[derive(Parser)]
#[command(name = "destripe-config")]
#[command(about = "Inspect and check acs_destripe parameter sets", long_about = None)]
struct Cli {
    /// Parameter file (.toml, or TEAL-style .cfg)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override a parameter, e.g. `--set stat=median`
    #[arg(short, long = "set", value_name = "NAME=VALUE", global = true)]
    set: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved parameter set
    Show {
        #[arg(short, long, value_enum, default_value_t = Format::Toml)]
        format: Format,
    },
    /// Check the declarations and the resolved parameter set
    Check,
    /// Describe all parameters, or one by name
    Params { name: Option<String> },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Toml,
    Json,
    Cfg,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Params { name } => print_params(name.as_deref()),
        Commands::Show { format } => with_config(&cli.config, &cli.set, |config| {
            let text = match format {
                Format::Toml => config.to_toml().map_err(|e| e.to_string())?,
                Format::Json => config.to_json().map_err(|e| e.to_string())? + "\n",
                Format::Cfg => config.to_parfile(),
            };
            print!("{text}");
            Ok(())
        }),
        Commands::Check => with_config(&cli.config, &cli.set, |config| {
            if let Err(errors) = validate_schema(PARAMETERS) {
                for err in &errors {
                    tracing::error!(%err, "Schema check failed");
                }
                return Err(format!("{} schema error(s)", errors.len()));
            }
            let dq = config.dq_bits().map_err(|e| e.to_string())?;
            tracing::info!(input = ?config.input_spec(), dqbits = ?dq, "Parameters resolved");
            println!("{TASK_NAME}: parameter set is valid");
            Ok(())
        }),
    }
}

fn resolve(file: &Option<PathBuf>, overrides: &[String]) -> Result<DestripeConfig, ConfigError> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = file {
        loader = loader.file(path);
    }
    for assignment in overrides {
        loader = loader.assignment(assignment)?;
    }
    loader.load()
}

fn with_config<F>(file: &Option<PathBuf>, overrides: &[String], run: F) -> ExitCode
where
    F: FnOnce(&DestripeConfig) -> Result<(), String>,
{
    // Loader events are logged at the declared default level until `verbose` is known.
    let logging = observability::logging::init_logging(DestripeConfig::default().verbose);

    let config = match resolve(file, overrides) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(1);
        }
    };

    logging.set_verbose(config.verbose);
    tracing::info!(
        stat = %config.stat,
        maxiter = config.maxiter,
        rpt_clean = config.rpt_clean,
        "Parameters loaded"
    );

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

fn print_params(name: Option<&str>) -> ExitCode {
    match name {
        None => {
            print!("{}", help::render_help());
            ExitCode::SUCCESS
        }
        Some(name) => match help::help_for(name) {
            Some(text) => {
                print!("{text}");
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("error: unknown parameter `{name}`");
                ExitCode::from(2)
            }
        },
    }
}
