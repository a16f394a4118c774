use std::fs;
use std::path::Path;

use anyhow::{
    bail,
    Context,
};

use crate::types::Result;


/// Converts a duration in ns to an integration step count.
///
/// Truncating on purpose: the historical workflow always floored here, and
/// downstream restart scripts compare nsteps values byte-for-byte.
pub fn nsteps_for_duration(time_ns: f64, dt_ps: f64) -> i64 {
    (time_ns * 1000.0 / dt_ps) as i64
}


pub fn format_nsteps_line(steps: i64, time_ns: f64) -> String {
    // {:?} keeps the trailing .0 on whole durations, so a 10 ns request
    // reads "10.0 ns" and stays grep-compatible with older comments
    format!("nsteps                  = {}    ;  {:?} ns", steps, time_ns)
}


/// Rewrites the `nsteps` line of an .mdp template for the requested duration.
///
/// Every line whose first token is `nsteps` is replaced wholesale; all other
/// lines are copied byte-identically. Returns the computed step count.
pub fn patch_nsteps(template: &Path, time_ns: f64, dt_ps: f64, output: &Path) -> Result<i64> {
    if !template.is_file() {
        bail!("MDP file {:?} not found.", template);
    }
    if time_ns < 0.0 {
        bail!("Simulation time must be non-negative, got {} ns.", time_ns);
    }

    let steps = nsteps_for_duration(time_ns, dt_ps);

    let content = fs::read_to_string(template)
        .context(format!("Failed to read MDP template {:?}.", template))?;

    let mut out = String::with_capacity(content.len());
    for line in content.lines() {
        if line.split_whitespace().next() == Some("nsteps") {
            out.push_str(&format_nsteps_line(steps, time_ns));
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }

    fs::write(output, out)
        .context(format!("Failed to write output MDP file {:?}.", output))?;

    Ok(steps)
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempdir::TempDir;

    const TEMPLATE: &str = "\
; Run control
integrator              = md
nsteps                  = 500000    ; will be overwritten
dt                      = 0.002
nstxout                 = 0
";

    #[test]
    fn test_nsteps_truncates() {
        assert_eq!(nsteps_for_duration(100.0, 0.002), 50_000_000);
        assert_eq!(nsteps_for_duration(0.0, 0.002), 0);
        // 0.0000019 ns -> 0.95 steps, floored
        assert_eq!(nsteps_for_duration(0.0000019, 0.002), 0);
    }

    #[test]
    fn test_patch_replaces_only_nsteps_line() {
        let tmpdir = TempDir::new("mdkit_test").unwrap();
        let template = tmpdir.path().join("md.mdp");
        let output = tmpdir.path().join("md_10ns.mdp");
        fs::write(&template, TEMPLATE).unwrap();

        let steps = patch_nsteps(&template, 10.0, 0.002, &output).unwrap();
        assert_eq!(steps, 5_000_000);

        let patched = fs::read_to_string(&output).unwrap();
        let old_lines = TEMPLATE.lines().collect::<Vec<_>>();
        let new_lines = patched.lines().collect::<Vec<_>>();
        assert_eq!(old_lines.len(), new_lines.len());

        for (old, new) in old_lines.iter().zip(new_lines.iter()) {
            if old.starts_with("nsteps") {
                assert_eq!(*new, "nsteps                  = 5000000    ;  10.0 ns");
            } else {
                assert_eq!(old, new);
            }
        }
    }

    #[test]
    fn test_nsteps_line_formatting() {
        assert_eq!(format_nsteps_line(5_000_000, 10.0),
                   "nsteps                  = 5000000    ;  10.0 ns");
        assert_eq!(format_nsteps_line(750_000, 1.5),
                   "nsteps                  = 750000    ;  1.5 ns");
    }

    #[test]
    fn test_missing_template_fails_before_write() {
        let tmpdir = TempDir::new("mdkit_test").unwrap();
        let output = tmpdir.path().join("out.mdp");
        let ret = patch_nsteps(&tmpdir.path().join("absent.mdp"), 1.0, 0.002, &output);
        assert!(ret.is_err());
        assert!(!output.exists());
    }
}
