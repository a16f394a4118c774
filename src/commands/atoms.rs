use std::io::{
    self,
    BufRead,
    Write,
};
use std::path::PathBuf;

use clap::Args;
use log::info;

use crate::{
    types::Result,
    cli::OptProcess,
    pdb::load_atoms,
    selection::{
        Action,
        QueryState,
        HELP_TEXT,
    },
};


#[derive(Debug, Args)]
/// Interactive shell for querying ATOM records of a structure file.
///
/// `range` and `pick` select residues from the full file, `type` narrows the
/// current selection by atom name, `list` prints the selected atom serial
/// numbers, and `save` writes the selection to a new .pdb file.
pub struct Atoms {
    /// Input structure (.pdb) file path.
    pdb_file: PathBuf,
}


impl OptProcess for Atoms {
    fn process(&self) -> Result<()> {
        let records = load_atoms(&self.pdb_file)?;
        info!("Loaded {} ATOM record(s) from {:?}.", records.len(), &self.pdb_file);

        let mut state = QueryState::new(records);
        let stdin = io::stdin();

        println!("{}", HELP_TEXT);

        loop {
            println!("{}", HELP_TEXT);
            print!("Command: ");
            io::stdout().flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }

            match state.apply(&line) {
                Action::Show(lines) => {
                    for l in lines {
                        println!("{}", l);
                    }
                },
                Action::Help => println!("{}", HELP_TEXT),
                Action::Quit => {
                    println!("Exiting...");
                    break;
                },
                Action::Nothing => {},
            }
        }

        Ok(())
    }
}
