pub mod cli;
pub mod commands;
pub mod types;
pub mod settings;
pub mod acpype;
pub mod gromacs;
pub mod pdb;
pub mod selection;
pub mod table;

pub use types::Result;

pub use cli::OptProcess;

pub use settings::Settings;

pub use acpype::{
    BatchOutcome,
    run_batch,
};

pub use gromacs::mdlog::{
    MdLog,
    ProgressReport,
};

pub use pdb::{
    AtomRecord,
    HetatmGroups,
};
