use crate::cli::CountArgs;
use crate::config::build_count_job;
use crate::error::Result;
use crate::utils::output::{cancellation, write_json};
use crate::utils::progress::ProgressDisplay;
use smact::engine::outcome::EnumerationStatus;
use smact::engine::progress::ProgressReporter;
use smact::workflows;
use tracing::{info, warn};

pub fn run(args: CountArgs, quiet: bool) -> Result<()> {
    let job = build_count_job(&args)?;
    let cancel = cancellation(args.output.timeout)?;

    let display = ProgressDisplay::new(quiet);
    let reporter = ProgressReporter::with_callback(display.callback());

    let elements: Vec<&str> = job.elements.iter().map(String::as_str).collect();
    info!(elements = ?elements, "Invoking the counting workflow...");
    let result = workflows::count::run(&job.table, &elements, &job.config, &*cancel, &reporter)?;

    if result.status == EnumerationStatus::Cancelled {
        warn!("Counting stopped early; the totals are partial.");
    }
    if !quiet {
        for (size, entry) in &result.by_size {
            eprintln!(
                "{size} species: {} combinations, {} plausible, {} neutral, {} ratios",
                entry.combinations, entry.plausible, entry.neutral, entry.ratios
            );
        }
    }

    write_json(&result, &args.output)
}
