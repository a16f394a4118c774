use std::path::{
    Path,
    PathBuf,
};
use std::process::Command;

use log::info;


/// Result of one acpype invocation. The batch never aborts on a single
/// failure; every input path maps to exactly one outcome, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Success,

    /// The tool ran but returned a nonzero exit code; carries its stderr
    /// (or stdout when stderr is empty).
    ToolError(String),

    /// The input path does not point to a regular file; the tool was not invoked.
    NotFound,

    /// Spawning the tool itself failed, e.g. the executable is not installed.
    SpawnError(String),
}


/// Runs `<exe> -i <file>` for each path, sequentially, one at a time.
///
/// No timeout is applied: a hung tool blocks the batch, matching the manual
/// workflow this replaces. Any files the tool writes into the working
/// directory are its own business and are not tracked here.
pub fn run_batch(paths: &[PathBuf], exe: &Path) -> Vec<BatchOutcome> {
    paths.iter()
         .map(|p| run_single(p, exe))
         .collect()
}


fn run_single(path: &Path, exe: &Path) -> BatchOutcome {
    if !path.is_file() {
        return BatchOutcome::NotFound;
    }

    info!("Processing {:?} with {:?} ...", path, exe);

    match Command::new(exe).arg("-i").arg(path).output() {
        Ok(output) => {
            if output.status.success() {
                BatchOutcome::Success
            } else {
                let mut msg = String::from_utf8_lossy(&output.stderr).trim().to_string();
                if msg.is_empty() {
                    msg = String::from_utf8_lossy(&output.stdout).trim().to_string();
                }
                BatchOutcome::ToolError(msg)
            }
        },
        Err(e) => BatchOutcome::SpawnError(e.to_string()),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_invoked() {
        let paths = vec![PathBuf::from("definitely_not_here.mol2")];
        // A bogus executable would fail to spawn; NotFound must win without
        // ever reaching the spawn.
        let outcomes = run_batch(&paths, Path::new("/no/such/tool"));
        assert_eq!(outcomes, vec![BatchOutcome::NotFound]);
    }

    #[test]
    fn test_outcomes_keep_input_order() {
        let missing = PathBuf::from("nope.pdb");
        let present = PathBuf::from(file!());
        let outcomes = run_batch(&[missing, present], Path::new("true"));
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0], BatchOutcome::NotFound);
        assert_eq!(outcomes[1], BatchOutcome::Success);
    }

    #[test]
    fn test_spawn_failure_is_caught() {
        let present = PathBuf::from(file!());
        let outcomes = run_batch(&[present], Path::new("/no/such/tool"));
        assert!(matches!(outcomes[0], BatchOutcome::SpawnError(_)));
    }
}
