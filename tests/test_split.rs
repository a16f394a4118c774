use std::collections::BTreeSet;
use std::fs;

use mdkit::HetatmGroups;
use tempdir::TempDir;

fn atom_line(serial: i64, name: &str, resname: &str, chain: &str, resid: i64) -> String {
    format!("ATOM  {:>5} {:<4} {:<3} {}{:>4}      28.000  30.000  32.000  1.00  0.00",
            serial, name, resname, chain, resid)
}

fn hetatm_line(serial: i64, name: &str, resname: &str, chain: &str, resid: i64) -> String {
    format!("HETATM{:>5} {:<4} {:<3} {}{:>4}      28.000  30.000  32.000  1.00  0.00",
            serial, name, resname, chain, resid)
}

fn sample_structure() -> String {
    let mut lines = vec![
        "REMARK test structure".to_string(),
        atom_line(1, "N", "MET", "A", 1),
        atom_line(2, "CA", "MET", "A", 1),
        "TER       3      MET A   1".to_string(),
        hetatm_line(4, "ZN", "ZN", "A", 101),
        hetatm_line(5, "O", "HOH", "A", 201),
        hetatm_line(6, "H1", "HOH", "A", 201),
        hetatm_line(7, "O", "HOH", "A", 202),
        "HETATM    8  O   HOH".to_string(), // too short to carry a residue number
        "CONECT    4    5".to_string(),
        "END".to_string(),
    ];
    lines.push(String::new());
    lines.join("\n")
}

fn hetatm_lines_of(content: &str) -> BTreeSet<String> {
    content.lines()
           .filter(|l| l.starts_with("HETATM") && l.len() >= 26)
           .map(|l| l.to_string())
           .collect()
}

#[test]
fn test_groups_are_in_file_order() {
    let tmpdir = TempDir::new("mdkit_test").unwrap();
    let path = tmpdir.path().join("complex.pdb");
    fs::write(&path, sample_structure()).unwrap();

    let groups = HetatmGroups::from_file(&path).unwrap();
    assert_eq!(groups.keys(), vec!["ZN101_A", "HOH201_A", "HOH202_A"]);
}

#[test]
fn test_take_by_menu_index() {
    let tmpdir = TempDir::new("mdkit_test").unwrap();
    let path = tmpdir.path().join("complex.pdb");
    fs::write(&path, sample_structure()).unwrap();

    let mut groups = HetatmGroups::from_file(&path).unwrap();

    // menu position 2 is HOH201_A; later groups keep their order
    let (key, lines) = groups.take_index(1).unwrap();
    assert_eq!(key, "HOH201_A");
    assert_eq!(lines.len(), 2);
    assert_eq!(groups.keys(), vec!["ZN101_A", "HOH202_A"]);

    // out-of-range positions simply yield nothing
    assert!(groups.take_index(2).is_none());
    assert_eq!(groups.len(), 2);
}

#[test]
fn test_extraction_partitions_hetatm_lines() {
    let tmpdir = TempDir::new("mdkit_test").unwrap();
    let source = tmpdir.path().join("complex.pdb");
    let content = sample_structure();
    fs::write(&source, &content).unwrap();

    let mut groups = HetatmGroups::from_file(&source).unwrap();

    // extract one group the way the interactive loop does
    let taken = groups.take("HOH201_A").unwrap();
    let extracted = tmpdir.path().join("HOH201_A.pdb");
    HetatmGroups::write_group(&taken, &extracted).unwrap();

    let remainder = tmpdir.path().join("complex_split.pdb");
    groups.write_remainder(&source, &remainder).unwrap();

    let extracted_content = fs::read_to_string(&extracted).unwrap();
    let remainder_content = fs::read_to_string(&remainder).unwrap();

    // extracted + remainder heteroatom lines == original groupable heteroatom lines
    let mut union = hetatm_lines_of(&extracted_content);
    union.extend(hetatm_lines_of(&remainder_content));
    assert_eq!(union, hetatm_lines_of(&content));
    assert_eq!(extracted_content.lines().count(), 2);

    // the remainder drops TER/CONECT/END, the short line, and the taken group
    assert!(!remainder_content.contains("TER"));
    assert!(!remainder_content.contains("CONECT"));
    assert!(!remainder_content.lines().any(|l| l == "END"));
    assert!(!remainder_content.contains("HETATM    8"));
    assert!(!remainder_content.contains(" 201"));

    // everything else survives untouched
    assert!(remainder_content.contains("REMARK test structure"));
    assert!(remainder_content.contains(&atom_line(1, "N", "MET", "A", 1)));
    assert!(remainder_content.contains(&hetatm_line(4, "ZN", "ZN", "A", 101)));
    assert!(remainder_content.contains(&hetatm_line(7, "O", "HOH", "A", 202)));
}

#[test]
fn test_extracting_everything_empties_the_remainder_groups() {
    let tmpdir = TempDir::new("mdkit_test").unwrap();
    let source = tmpdir.path().join("complex.pdb");
    fs::write(&source, sample_structure()).unwrap();

    let mut groups = HetatmGroups::from_file(&source).unwrap();
    for key in groups.keys().iter().map(|k| k.to_string()).collect::<Vec<_>>() {
        groups.take(&key).unwrap();
    }
    assert!(groups.is_empty());

    let remainder = tmpdir.path().join("complex_split.pdb");
    groups.write_remainder(&source, &remainder).unwrap();

    let remainder_content = fs::read_to_string(&remainder).unwrap();
    assert!(!remainder_content.contains("HETATM"));
    assert!(remainder_content.contains("REMARK test structure"));
}
