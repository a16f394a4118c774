use std::fs;
use std::io::{
    self,
    BufRead,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};

use clap::Args;
use colored::Colorize;
use log::{
    info,
    warn,
};

use crate::{
    types::Result,
    cli::OptProcess,
    pdb::HetatmGroups,
};


#[derive(Debug, Args)]
/// Interactively extract HETATM residues from a structure file.
///
/// Each selected residue is written verbatim to `<residue>.pdb` in the
/// working directory; on finish, the remaining heteroatom groups are kept in
/// a `<input>_split.pdb` copy of the structure. Cancelling deletes every
/// file written in the session and leaves the source untouched.
pub struct Hetatm {
    /// Input structure (.pdb) file path.
    pdb_file: PathBuf,
}


impl OptProcess for Hetatm {
    fn process(&self) -> Result<()> {
        let mut groups = HetatmGroups::from_file(&self.pdb_file)?;

        if groups.is_empty() {
            println!("No heteroatom residues found in {}.", self.pdb_file.display());
            return Ok(());
        }

        info!("Found {} heteroatom residue group(s).", groups.len());

        let stdin = io::stdin();
        let mut extracted: Vec<PathBuf> = Vec::new();

        while !groups.is_empty() {
            println!("\nSelect a residue to extract ({}: close without saving, {}: exit with save):",
                     "c".bold(), "e".bold());
            println!("{}. close without saving", "c".bold());
            println!("{}. exit with save", "e".bold());
            for (i, key) in groups.keys().iter().enumerate() {
                println!("{}. {}", i + 1, key);
            }

            print!("Enter a number: ");
            io::stdout().flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                // EOF behaves like finishing
                break;
            }

            match line.trim() {
                "c" | "C" => {
                    rollback(&extracted);
                    println!("All extracted files deleted. Exiting without saving.");
                    return Ok(());
                },
                "e" | "E" => break,
                choice => {
                    let taken = choice.parse::<usize>()
                                      .ok()
                                      .filter(|&n| n >= 1)
                                      .and_then(|n| groups.take_index(n - 1));
                    let Some((key, lines)) = taken else {
                        println!("{}", "Invalid selection. Try again.".red());
                        continue;
                    };

                    let out_path = PathBuf::from(format!("{}.pdb", key));
                    HetatmGroups::write_group(&lines, &out_path)?;
                    extracted.push(out_path.clone());
                    println!("{} written.", out_path.display());
                },
            }
        }

        let dest = split_path(&self.pdb_file);
        groups.write_remainder(&self.pdb_file, &dest)?;
        println!("{} saved. Exiting.", dest.display());
        Ok(())
    }
}


fn rollback(files: &[PathBuf]) {
    for path in files {
        if let Err(e) = fs::remove_file(path) {
            warn!("Failed to delete {:?}: {}", path, e);
        }
    }
}


fn split_path(input: &Path) -> PathBuf {
    let stem = input.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "structure".to_string());
    input.with_file_name(format!("{}_split.pdb", stem))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        assert_eq!(split_path(Path::new("complex.pdb")),
                   PathBuf::from("complex_split.pdb"));
        assert_eq!(split_path(Path::new("/data/run1/complex.pdb")),
                   PathBuf::from("/data/run1/complex_split.pdb"));
    }
}
