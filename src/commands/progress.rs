use std::path::PathBuf;

use chrono::Local;
use clap::Args;
use log::info;

use crate::{
    types::Result,
    cli::OptProcess,
    gromacs::mdlog::MdLog,
};


#[derive(Debug, Args)]
/// Estimate the completion time of a running MD job from its md.log.
///
/// Reads dt, nsteps and the mdrun start timestamp from the head of the log
/// and the latest Step/Time sample from its tail, then projects the
/// remaining wall-clock time at the observed ns/day rate.
pub struct Progress {
    /// md.log (GROMACS) file path.
    log_file: PathBuf,
}


impl OptProcess for Progress {
    fn process(&self) -> Result<()> {
        info!("Parsing log file {:?} ...", &self.log_file);

        let log = MdLog::from_file(&self.log_file)?;
        let report = log.report_at(Local::now().naive_local());

        print!("{}", report);
        Ok(())
    }
}
