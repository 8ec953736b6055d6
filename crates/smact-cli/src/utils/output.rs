use crate::cli::OutputArgs;
use crate::error::{CliError, Result};
use serde::Serialize;
use smact::engine::cancel::{Cancellation, Deadline, NeverCancel};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::{Duration, Instant};
use tracing::info;

/// Writes `value` as JSON to `--output`, or to standard output when no file is given.
pub fn write_json<T: Serialize>(value: &T, args: &OutputArgs) -> Result<()> {
    match &args.output {
        Some(path) => {
            info!("Writing result to {:?}", path);
            let mut writer = BufWriter::new(File::create(path)?);
            to_writer(&mut writer, value, args.pretty)?;
            writer.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            to_writer(&mut writer, value, args.pretty)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn to_writer<W: Write, T: Serialize>(writer: W, value: &T, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(writer, value)?;
    } else {
        serde_json::to_writer(writer, value)?;
    }
    Ok(())
}

/// The cancellation source for `--timeout`.
pub fn cancellation(timeout: Option<f64>) -> Result<Box<dyn Cancellation>> {
    match timeout {
        None => Ok(Box::new(NeverCancel)),
        Some(seconds) if seconds.is_finite() && seconds >= 0.0 => {
            info!("Search will stop after {:.1} s.", seconds);
            Ok(Box::new(Deadline(
                Instant::now() + Duration::from_secs_f64(seconds),
            )))
        }
        Some(seconds) => Err(CliError::Argument(format!(
            "--timeout must be a non-negative number of seconds, got {seconds}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn json_is_written_to_the_requested_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("result.json");
        let args = OutputArgs {
            output: Some(path.clone()),
            pretty: true,
            timeout: None,
        };
        let value = BTreeMap::from([("found", 3)]);
        write_json(&value, &args).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["found"], 3);
    }

    #[test]
    fn unwritable_output_is_an_io_error() {
        let args = OutputArgs {
            output: Some(PathBuf::from("/nonexistent/dir/result.json")),
            ..Default::default()
        };
        assert!(matches!(write_json(&1, &args), Err(CliError::Io(_))));
    }

    #[test]
    fn timeouts_are_validated() {
        assert!(!cancellation(None).unwrap().is_cancelled());
        assert!(cancellation(Some(0.0)).unwrap().is_cancelled());
        assert!(!cancellation(Some(3600.0)).unwrap().is_cancelled());
        assert!(matches!(cancellation(Some(-1.0)), Err(CliError::Argument(_))));
        assert!(matches!(
            cancellation(Some(f64::NAN)),
            Err(CliError::Argument(_))
        ));
    }
}
