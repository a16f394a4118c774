use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use log::info;

use crate::{
    types::Result,
    cli::OptProcess,
    acpype::{
        run_batch,
        BatchOutcome,
    },
    settings::Settings,
};


#[derive(Debug, Args)]
/// Run acpype over a batch of molecule files, one file at a time.
///
/// Each file is passed to `acpype -i <file>`; per-file failures are reported
/// and the batch carries on. Whatever acpype writes into the working
/// directory is left untouched.
pub struct Acpype {
    #[arg(required = true)]
    /// Molecule files (.mol2, .pdb, .mol) to parameterize, in order.
    files: Vec<PathBuf>,

    #[arg(short = 'e', long)]
    /// Acpype executable, overriding the configured one.
    exe: Option<PathBuf>,
}


impl OptProcess for Acpype {
    fn process(&self) -> Result<()> {
        let settings = Settings::from_default_location()?;
        let exe = self.exe.as_ref()
                          .unwrap_or(&settings.acpype_path);

        info!("Processing {} file(s) with {:?} ...", self.files.len(), exe);

        let outcomes = run_batch(&self.files, exe);
        let mut nsucceeded = 0usize;

        for (path, outcome) in self.files.iter().zip(outcomes.iter()) {
            match outcome {
                BatchOutcome::Success => {
                    nsucceeded += 1;
                    println!("{} {} processed successfully.",
                             "[ OK ]".green().bold(), path.display());
                },
                BatchOutcome::ToolError(msg) => {
                    println!("{} Error processing {}: {}",
                             "[FAIL]".red().bold(), path.display(), msg);
                },
                BatchOutcome::NotFound => {
                    println!("{} File not found: {}",
                             "[FAIL]".red().bold(), path.display());
                },
                BatchOutcome::SpawnError(msg) => {
                    println!("{} Could not run {:?} for {}: {}",
                             "[FAIL]".red().bold(), exe, path.display(), msg);
                },
            }
        }

        println!("All files processed. {}/{} succeeded.", nsucceeded, self.files.len());
        Ok(())
    }
}
