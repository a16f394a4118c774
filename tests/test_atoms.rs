use std::fs;

use mdkit::pdb::load_atoms;
use mdkit::selection::{
    Action,
    QueryState,
};
use tempdir::TempDir;

const STRUCTURE: &str = "\
REMARK query shell fixture
ATOM      1  N   MET A   1      27.340  24.430   2.614  1.00  9.67           N
ATOM      2  CA  MET A   1      26.266  25.413   2.842  1.00 10.38           C
ATOM      3  N   ALA A   2      26.335  27.770   3.258  1.00  9.27           N
ATOM      4  CA  ALA A   2      27.770  27.234   3.898  1.00 10.00           C
ATOM   bogus  CA  ALA A   2      27.770  27.234   3.898  1.00 10.00          C
HETATM    5  O   HOH A 305      10.000  11.000  12.000  1.00 20.00           O
END
";

#[test]
fn test_load_and_query() {
    let tmpdir = TempDir::new("mdkit_test").unwrap();
    let path = tmpdir.path().join("protein.pdb");
    fs::write(&path, STRUCTURE).unwrap();

    // the bogus serial is skipped, the HETATM line is not an ATOM record
    let records = load_atoms(&path).unwrap();
    assert_eq!(records.len(), 4);

    let mut state = QueryState::new(records);
    state.apply("range 2 2");
    assert_eq!(state.apply("list"), Action::Show(vec!["3,4".to_string()]));

    state.apply("all");
    state.apply("type CA");
    assert_eq!(state.apply("list"), Action::Show(vec!["2,4".to_string()]));

    // save round-trips the raw lines of the selection
    let out = tmpdir.path().join("ca.pdb");
    let action = state.apply(&format!("save {}", out.display()));
    assert_eq!(action, Action::Show(vec![format!("Saved to {}", out.display())]));

    let saved = fs::read_to_string(&out).unwrap();
    let lines = saved.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.starts_with("ATOM") && l.contains(" CA ")));
}
