use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{
    bail,
    Context,
};
use indexmap::IndexMap;
use log::warn;

use crate::types::Result;


/// Line-leading record tags of the fixed-column structure format. Only the
/// tags the tools care about are distinguished; everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Atom,
    Hetatm,

    /// TER / CONECT / END records; never copied to any output.
    Skip,

    Other,
}


pub fn classify(line: &str) -> RecordKind {
    if line.starts_with("ATOM") {
        RecordKind::Atom
    } else if line.starts_with("HETATM") {
        RecordKind::Hetatm
    } else if line.starts_with("TER") || line.starts_with("CONECT") || line.starts_with("END") {
        RecordKind::Skip
    } else {
        RecordKind::Other
    }
}


/// One ATOM record, extracted by fixed character offsets:
/// serial cols 7-11, atom name 13-16, residue name 18-20, residue
/// sequence number 23-26 (all 1-based, as the format documents them).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomRecord {
    pub serial: i64,
    pub name: String,
    pub resname: String,
    pub resid: i64,

    /// The line as read, trailing whitespace removed.
    pub raw: String,
}


impl AtomRecord {
    pub fn parse(line: &str) -> Option<Self> {
        let serial = line.get(6..11)?.trim().parse::<i64>().ok()?;
        let name = line.get(12..16)?.trim().to_string();
        let resname = line.get(17..20)?.trim().to_string();
        let resid = line.get(22..26)?.trim().parse::<i64>().ok()?;
        Some(Self {
            serial,
            name,
            resname,
            resid,
            raw: line.trim_end().to_string(),
        })
    }
}


/// Reads every ATOM record of a structure file. Short or otherwise
/// unparsable ATOM lines are warned about and skipped instead of failing
/// the whole scan.
pub fn load_atoms(path: &(impl AsRef<Path> + ?Sized)) -> Result<Vec<AtomRecord>> {
    let path = path.as_ref();
    if !path.is_file() {
        bail!("Structure file {:?} not found.", path);
    }

    let content = fs::read_to_string(path)
        .context(format!("Failed to read structure file {:?}.", path))?;

    let mut records = Vec::new();
    for line in content.lines() {
        if classify(line) != RecordKind::Atom {
            continue;
        }
        match AtomRecord::parse(line) {
            Some(rec) => records.push(rec),
            None => warn!("Skipping unparsable ATOM line: {}", line.trim_end()),
        }
    }
    Ok(records)
}


/// Minimum length a heteroatom line needs so the residue sequence number
/// (cols 23-26) can be extracted.
const MIN_HETATM_LEN: usize = 26;


/// Builds the group key `{resname}{resseq}_{chain}` for a heteroatom line,
/// or None when the line is too short to carry a residue sequence number.
pub fn residue_key(line: &str) -> Option<String> {
    if line.len() < MIN_HETATM_LEN {
        return None;
    }
    let resname = line.get(17..20)?.trim();
    let chain = line.get(21..22).unwrap_or("").trim();
    let resid = line.get(22..26)?.trim();
    Some(format!("{}{}_{}", resname, resid, chain))
}


/// Heteroatom lines of a structure file, grouped by residue and kept in
/// file order so interactive menus number them stably.
///
/// The group key (name + number + chain) is assumed collision-free across
/// distinct physical residues; this is not verified.
#[derive(Debug, Clone, Default)]
pub struct HetatmGroups {
    groups: IndexMap<String, Vec<String>>,
}


impl HetatmGroups {
    pub fn from_file(path: &(impl AsRef<Path> + ?Sized)) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("Structure file {:?} not found.", path);
        }

        let content = fs::read_to_string(path)
            .context(format!("Failed to read structure file {:?}.", path))?;

        let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
        for line in content.lines() {
            match classify(line) {
                RecordKind::Skip => continue,
                RecordKind::Hetatm => {
                    match residue_key(line) {
                        Some(key) => groups.entry(key)
                                           .or_default()
                                           .push(line.trim_end().to_string()),
                        None => warn!("Skipping short line: {}", line.trim_end()),
                    }
                },
                _ => {},
            }
        }

        Ok(Self { groups })
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Pending group keys, in file order.
    pub fn keys(&self) -> Vec<&str> {
        self.groups.keys().map(|k| k.as_str()).collect()
    }

    /// Removes a group from the pending set, returning its lines. Later
    /// groups keep their relative order.
    pub fn take(&mut self, key: &str) -> Option<Vec<String>> {
        self.groups.shift_remove(key)
    }

    /// Removes the group at a menu position (0-based, file order),
    /// returning its key and lines. Later groups keep their relative order.
    pub fn take_index(&mut self, index: usize) -> Option<(String, Vec<String>)> {
        self.groups.shift_remove_index(index)
    }

    /// Writes one extracted group verbatim to `path`.
    pub fn write_group(lines: &[String], path: &Path) -> Result<()> {
        let mut file = fs::File::create(path)
            .context(format!("Failed to create {:?}.", path))?;
        for line in lines {
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    /// Second pass over the original file: copies every line except TER /
    /// CONECT / END records, heteroatom lines too short to group, and
    /// heteroatom lines belonging to groups no longer pending (i.e. the
    /// extracted ones). The remainder therefore keeps exactly the
    /// unselected heteroatom groups.
    pub fn write_remainder(&self, source: &Path, dest: &Path) -> Result<()> {
        let content = fs::read_to_string(source)
            .context(format!("Failed to re-read structure file {:?}.", source))?;

        let mut out = String::with_capacity(content.len());
        for line in content.lines() {
            match classify(line) {
                RecordKind::Skip => continue,
                RecordKind::Hetatm => {
                    match residue_key(line) {
                        Some(key) if self.groups.contains_key(&key) => {
                            out.push_str(line);
                            out.push('\n');
                        },
                        _ => continue,
                    }
                },
                _ => {
                    out.push_str(line);
                    out.push('\n');
                },
            }
        }

        fs::write(dest, out)
            .context(format!("Failed to write {:?}.", dest))?;
        Ok(())
    }
}
