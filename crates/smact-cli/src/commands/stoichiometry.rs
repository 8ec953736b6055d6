use crate::cli::StoichiometryArgs;
use crate::config::build_stoichiometry_job;
use crate::error::Result;
use crate::utils::output::{cancellation, write_json};
use crate::utils::progress::ProgressDisplay;
use smact::engine::outcome::EnumerationStatus;
use smact::engine::progress::ProgressReporter;
use smact::workflows;
use tracing::{info, warn};

pub fn run(args: StoichiometryArgs, quiet: bool) -> Result<()> {
    info!("Building stoichiometry job from {:?}", &args.config);
    let job = build_stoichiometry_job(&args)?;
    let cancel = cancellation(args.output.timeout)?;

    let display = ProgressDisplay::new(quiet);
    let reporter = ProgressReporter::with_callback(display.callback());

    info!("Invoking the screening workflow...");
    let result = workflows::screen::run(
        &job.table,
        &job.template,
        &job.pools,
        &job.screening,
        &*cancel,
        &reporter,
    )?;

    if result.status == EnumerationStatus::Cancelled {
        warn!("Search stopped early; the result is partial.");
    }
    if result.candidates.is_empty() {
        warn!("No charge-neutral composition found.");
    }
    if !quiet {
        eprintln!(
            "Found {} composition(s) ({} rejected by the Pauling test).",
            result.candidates.len(),
            result.rejected
        );
    }

    write_json(&result, &args.output)
}
