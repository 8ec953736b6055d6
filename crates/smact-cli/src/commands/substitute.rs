use crate::cli::SubstituteArgs;
use crate::config::{SubstitutionTarget, build_substitution_job};
use crate::error::Result;
use crate::utils::output::{cancellation, write_json};
use crate::utils::progress::ProgressDisplay;
use serde::Serialize;
use smact::core::models::pattern::SubstitutionPattern;
use smact::engine::outcome::{EnumerationStatus, SearchStats};
use smact::engine::progress::ProgressReporter;
use smact::workflows::substitute::{self, PrototypeSubstitution};
use tracing::{info, warn};

/// Result document for a substitution on an explicit sub-lattice.
#[derive(Debug, Serialize)]
struct PatternReport {
    sites: usize,
    patterns: Vec<SubstitutionPattern>,
    status: EnumerationStatus,
    stats: SearchStats,
}

pub fn run(args: SubstituteArgs, quiet: bool) -> Result<()> {
    info!("Building substitution job from {:?}", &args.config);
    let job = build_substitution_job(&args)?;
    let cancel = cancellation(args.output.timeout)?;

    let display = ProgressDisplay::new(quiet);
    let reporter = ProgressReporter::with_callback(display.callback());

    let (found, status) = match &job.target {
        SubstitutionTarget::Prototype {
            prototype,
            sublattice,
            hosts,
            build_structures,
        } => {
            let request = PrototypeSubstitution {
                prototype,
                sublattice,
                pool: &job.pool,
                hosts,
                build_structures: *build_structures,
            };
            let result = substitute::run_on_prototype(&request, &job.config, &*cancel, &reporter)?;
            let summary = (result.cells.len(), result.status);
            write_json(&result, &args.output)?;
            summary
        }
        SubstitutionTarget::Template(template) => {
            let enumeration = substitute::run(template, &job.pool, &job.config, &*cancel, &reporter)?;
            let report = PatternReport {
                sites: template.len(),
                status: enumeration.status,
                stats: enumeration.stats,
                patterns: enumeration.into_items().into_iter().collect(),
            };
            let summary = (report.patterns.len(), report.status);
            write_json(&report, &args.output)?;
            summary
        }
    };

    if status == EnumerationStatus::Cancelled {
        warn!("Search stopped early; the result is partial.");
    }
    if !quiet {
        eprintln!("Found {found} symmetry-distinct pattern(s).");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use tempfile::tempdir;

    fn run_job(job: &str, extra: &[&str]) -> serde_json::Value {
        let dir = tempdir().unwrap();
        let job_path = dir.path().join("job.toml");
        let output = dir.path().join("result.json");
        std::fs::write(&job_path, job).unwrap();
        let mut argv = vec![
            "smact",
            "substitute",
            "-c",
            job_path.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ];
        argv.extend_from_slice(extra);
        let Commands::Substitute(args) = Cli::parse_from(argv).command else {
            panic!("expected substitute");
        };
        run(args, true).unwrap();
        serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap()
    }

    #[test]
    fn prototype_job_writes_cells() {
        let result = run_job(
            r#"
[substitution]
prototype = "cubic-perovskite"
sublattice = "A"
cell = [4.0, 4.0, 4.0, 90.0, 90.0, 90.0]
hosts = { B = "Ti", X = "O" }
substituents = [{ label = "Ba" }, { label = "Sr", exactly = 2 }]
"#,
            &["-r", "2,2,2"],
        );
        assert_eq!(result["cells"].as_array().unwrap().len(), 3);
        assert_eq!(result["sites"], 8);
        assert_eq!(result["status"], "complete");
    }

    #[test]
    fn explicit_ring_job_writes_patterns() {
        let result = run_job(
            r#"
[substitution]
sites = [{ id = "a" }, { id = "b" }, { id = "c" }, { id = "d" }]
generators = [["b", "c", "d", "a"]]
substituents = [{ label = "Ga" }, { label = "In" }]
"#,
            &[],
        );
        assert_eq!(result["patterns"].as_array().unwrap().len(), 6);
        assert_eq!(result["sites"], 4);
    }
}
