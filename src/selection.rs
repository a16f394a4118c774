use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use itertools::Itertools;

use crate::pdb::AtomRecord;


pub const HELP_TEXT: &str = "\
Available commands:
  all            - Reload all data from the structure file
  range 1 10     - Select residues 1~10
  pick 1 10 20   - Select residues 1, 10, 20
  type CA CB     - Select specific atom types
  save test.pdb  - Save selected information
  list           - List atom numbers
  help           - Print help text
  exit           - Exit the shell
";


/// What the shell should do with the outcome of one command. Keeping the
/// dispatch free of I/O lets the state machine be driven directly by
/// strings under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print these lines.
    Show(Vec<String>),

    Help,

    Quit,

    /// Blank input; just re-prompt.
    Nothing,
}


/// The query shell's state: the full record list as loaded, plus the
/// current selection.
///
/// `range` and `pick` always filter the full list, while `type` narrows
/// the current selection. The asymmetry is deliberate and relied upon by
/// operators chaining `range`/`pick` with `type`.
#[derive(Debug, Clone)]
pub struct QueryState {
    all: Vec<AtomRecord>,
    selected: Vec<AtomRecord>,
}


impl QueryState {
    pub fn new(records: Vec<AtomRecord>) -> Self {
        let selected = records.clone();
        Self { all: records, selected }
    }

    pub fn selected(&self) -> &[AtomRecord] {
        &self.selected
    }

    pub fn apply(&mut self, input: &str) -> Action {
        let tokens = input.split_whitespace().collect::<Vec<_>>();
        let Some(&cmd) = tokens.first() else {
            return Action::Nothing;
        };

        match cmd.to_lowercase().as_str() {
            "all"   => self.cmd_all(),
            "range" => self.cmd_range(&tokens[1..]),
            "pick"  => self.cmd_pick(&tokens[1..]),
            "type"  => self.cmd_type(&tokens[1..]),
            "save"  => self.cmd_save(&tokens[1..]),
            "list"  => self.cmd_list(),
            "help"  => Action::Help,
            "exit"  => Action::Quit,
            other   => Action::Show(vec![format!("Unknown command: {}", other)]),
        }
    }

    fn cmd_all(&mut self) -> Action {
        self.selected = self.all.clone();
        Action::Show(self.raw_lines())
    }

    fn cmd_range(&mut self, args: &[&str]) -> Action {
        if args.len() != 2 {
            return Action::Show(vec!["Usage: range start end".to_string()]);
        }
        let (Ok(start), Ok(end)) = (args[0].parse::<i64>(), args[1].parse::<i64>()) else {
            return Action::Show(vec!["Invalid input. Please enter integers.".to_string()]);
        };
        if start > end {
            return Action::Show(vec![
                format!("Error: Inverted range {}..{}.", start, end)
            ]);
        }

        self.selected = self.all.iter()
                                .filter(|x| start <= x.resid && x.resid <= end)
                                .cloned()
                                .collect();
        if self.selected.is_empty() {
            Action::Show(vec!["Error: No residues in the specified range.".to_string()])
        } else {
            Action::Show(self.raw_lines())
        }
    }

    fn cmd_pick(&mut self, args: &[&str]) -> Action {
        if args.is_empty() {
            return Action::Show(vec!["Usage: pick res1 res2 ...".to_string()]);
        }
        let picks = match args.iter().map(|x| x.parse::<i64>()).collect::<Result<BTreeSet<_>, _>>() {
            Ok(p) => p,
            Err(_) => return Action::Show(vec!["Invalid input. Please enter integers.".to_string()]),
        };

        self.selected = self.all.iter()
                                .filter(|x| picks.contains(&x.resid))
                                .cloned()
                                .collect();

        let found = self.selected.iter().map(|x| x.resid).collect::<BTreeSet<_>>();
        let missing = picks.difference(&found).collect::<Vec<_>>();

        let mut lines = Vec::new();
        if !missing.is_empty() {
            lines.push(format!("Warning: Missing residues: {}",
                               missing.iter().map(|x| x.to_string()).join(", ")));
        }
        lines.extend(self.raw_lines());
        Action::Show(lines)
    }

    fn cmd_type(&mut self, args: &[&str]) -> Action {
        if args.is_empty() {
            return Action::Show(vec!["Usage: type ATOM1 ATOM2 ...".to_string()]);
        }
        let types = args.iter().map(|x| x.to_string()).collect::<BTreeSet<_>>();

        // Narrows the current selection, unlike range/pick.
        self.selected.retain(|x| types.contains(&x.name));

        if self.selected.is_empty() {
            Action::Show(vec!["Error: No matching atom types found.".to_string()])
        } else {
            Action::Show(self.raw_lines())
        }
    }

    fn cmd_save(&mut self, args: &[&str]) -> Action {
        if args.len() != 1 {
            return Action::Show(vec!["Usage: save filename.pdb".to_string()]);
        }
        let path = Path::new(args[0]);
        if path.extension().map(|e| e != "pdb").unwrap_or(true) {
            return Action::Show(vec!["Error: Filename must end with .pdb".to_string()]);
        }

        match self.write_selected(path) {
            Ok(()) => Action::Show(vec![format!("Saved to {}", args[0])]),
            Err(e) => Action::Show(vec![format!("Error: {}", e)]),
        }
    }

    fn cmd_list(&self) -> Action {
        let joined = self.selected.iter()
                                  .map(|x| x.serial.to_string())
                                  .join(",");
        Action::Show(vec![joined])
    }

    fn raw_lines(&self) -> Vec<String> {
        self.selected.iter().map(|x| x.raw.clone()).collect()
    }

    fn write_selected(&self, path: &Path) -> std::io::Result<()> {
        let mut file = fs::File::create(path)?;
        for rec in &self.selected {
            writeln!(file, "{}", rec.raw)?;
        }
        Ok(())
    }
}
