use std::path::PathBuf;

use clap::Args;
use log::info;

use crate::{
    types::Result,
    cli::OptProcess,
    gromacs::mdp::patch_nsteps,
    settings::Settings,
};


#[derive(Debug, Args)]
/// Write a copy of an .mdp template with nsteps set for a given duration.
///
/// The step count is computed from the configured integration time step
/// (0.002 ps unless overridden in mdkit.toml) and truncated to an integer.
/// Only the nsteps line is rewritten; every other line is copied as is.
pub struct Mdp {
    /// Path of the template .mdp file.
    mdp_file: PathBuf,

    #[arg(short = 't', long)]
    /// Simulation time in ns.
    time: f64,

    #[arg(short = 'o', long)]
    /// Output .mdp file name.
    output: PathBuf,
}


impl OptProcess for Mdp {
    fn process(&self) -> Result<()> {
        let settings = Settings::from_default_location()?;
        info!("Patching {:?} for a {} ns run (dt = {} ps) ...",
              &self.mdp_file, self.time, settings.time_step);

        let steps = patch_nsteps(&self.mdp_file, self.time, settings.time_step, &self.output)?;

        println!("nsteps has been set to: {} for {:?} ns in {}",
                 steps, self.time, self.output.display());
        Ok(())
    }
}
