use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Keith T. Butler, Daniel W. Davies, Adam J. Jackson",
    version,
    about = "SMACT CLI - Semiconducting Materials from Analogy and Chemical Theory: enumerate charge-neutral compositions and symmetry-distinct substitutions for materials screening.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel enumeration.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enumerate the charge-neutral compositions of a site template.
    Stoichiometry(StoichiometryArgs),
    /// Enumerate symmetry-distinct substitution patterns on a sub-lattice.
    Substitute(SubstituteArgs),
    /// Count neutral stoichiometries over all species combinations of a set of elements.
    Count(CountArgs),
}

/// Options shared by every subcommand that writes a result document.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Write the JSON result to this file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON result.
    #[arg(long)]
    pub pretty: bool,

    /// Stop the search after this many seconds and report the partial result.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<f64>,
}

/// Arguments for the `stoichiometry` subcommand.
#[derive(Args, Debug)]
pub struct StoichiometryArgs {
    /// Path to the job file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Override the species table (CSV or TOML) named in the job file.
    #[arg(short = 't', long, value_name = "PATH")]
    pub species_table: Option<PathBuf>,

    /// Override `screening.pauling-test` from the job file.
    #[command(flatten)]
    pub pauling: PaulingSwitch,

    /// Attach a compound electronegativity estimate to every composition.
    #[arg(short, long, value_enum, value_name = "SCALE")]
    pub electronegativity: Option<ElectronegativityArg>,

    /// Fail instead of returning an empty result when a site has no candidates.
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Set a specific configuration value, overriding the job file.
    /// Can be used multiple times. Example: -S pauling.threshold=0.1
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `substitute` subcommand.
#[derive(Args, Debug)]
pub struct SubstituteArgs {
    /// Path to the job file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Override the supercell repetitions of a prototype job, e.g. `2,2,2`.
    #[arg(short, long, value_delimiter = ',', value_name = "NA,NB,NC")]
    pub repetitions: Option<Vec<u32>>,

    /// Build the full supercell structure of every pattern (prototype jobs only).
    #[arg(short, long)]
    pub build_structures: bool,

    /// Override `substitution.incremental-threshold` from the job file.
    #[arg(long, value_name = "SITES")]
    pub incremental_threshold: Option<usize>,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Set a specific configuration value, overriding the job file.
    /// Can be used multiple times. Example: -S substitution.group-order-limit=1000
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `count` subcommand.
#[derive(Args, Debug)]
pub struct CountArgs {
    /// Optional job file in TOML format; every value can also be given on the command line.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Species table (CSV or TOML).
    #[arg(short = 't', long, value_name = "PATH")]
    pub species_table: Option<PathBuf>,

    /// Elements to combine, e.g. `Na,Cl,O`.
    #[arg(short, long, value_delimiter = ',', value_name = "SYMBOLS")]
    pub elements: Vec<String>,

    /// Largest number of distinct species per combination.
    #[arg(short, long, value_name = "INT")]
    pub max_ions: Option<usize>,

    /// Largest stoichiometric coefficient tried for any species.
    #[arg(long, value_name = "INT")]
    pub threshold: Option<u32>,

    /// Count only ratios without a common factor.
    #[arg(long)]
    pub primitive_only: bool,

    /// Override `count.pauling-test` from the job file.
    #[command(flatten)]
    pub pauling: PaulingSwitch,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Set a specific configuration value, overriding the job file.
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Mutually exclusive flags toggling the Pauling electronegativity test.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct PaulingSwitch {
    /// Keep only compositions whose cations are less electronegative than their anions.
    #[arg(long)]
    pub pauling_test: bool,
    /// Disable the Pauling test even if the job file enables it.
    #[arg(long)]
    pub no_pauling_test: bool,
}

impl PaulingSwitch {
    /// The command-line decision, if any flag was given.
    pub fn resolve(self) -> Option<bool> {
        match (self.pauling_test, self.no_pauling_test) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectronegativityArg {
    Mulliken,
    Pauling,
}
