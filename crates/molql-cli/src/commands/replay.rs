use super::{format_boundary, format_elements, read_selection};
use crate::cli::ReplayArgs;
use crate::error::Result;
use crate::structure_file::StructureReader;
use molql::engine::script::to_script_expression;
use molql::workflows;
use tracing::{info, warn};

pub fn run(args: ReplayArgs) -> Result<()> {
    let structure = StructureReader::new()
        .read(&args.structure.input, args.structure.bonds.as_deref())?;

    info!("Reading selection from {:?}", &args.selection);
    let mut query = read_selection(&args.selection)?;
    if args.ignore_hash {
        warn!("Skipping the structure compatibility check.");
        query = query.for_any_structure();
    }

    let result = workflows::replay::run(&structure, &query)?;
    println!("Replayed {} element(s).", result.loci.size());
    if !result.loci.is_empty() {
        println!("Boundary: {}", format_boundary(&result.boundary));
    }
    println!("Script: {}", to_script_expression(&result.loci));
    if args.list {
        for line in format_elements(&result.loci) {
            println!("  {}", line);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StructureInput;
    use crate::commands::write_selection;
    use crate::error::CliError;
    use crate::structure_file::testing::ATOMS_CSV;
    use molql::core::element::query::{Query, ReplayError};
    use molql::engine::error::EngineError;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_atoms(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn save_first_residue(dir: &TempDir, atoms: PathBuf) -> PathBuf {
        let structure = StructureReader::new().read(&atoms, None).unwrap();
        let result = workflows::select::run(
            &structure,
            "(atom-groups :residue-test (= (label_seq_id) 1))",
            &Default::default(),
        )
        .unwrap();
        let path = dir.path().join("sel.json");
        write_selection(&path, &result.query).unwrap();
        path
    }

    fn args(input: PathBuf, selection: PathBuf, ignore_hash: bool) -> ReplayArgs {
        ReplayArgs {
            structure: StructureInput { input, bonds: None },
            selection,
            ignore_hash,
            list: true,
        }
    }

    #[test]
    fn replays_against_the_same_structure() {
        let dir = tempfile::tempdir().unwrap();
        let atoms = write_atoms(&dir, "atoms.csv", ATOMS_CSV);
        let selection = save_first_residue(&dir, atoms.clone());
        run(args(atoms, selection, false)).unwrap();
    }

    #[test]
    fn different_structures_are_rejected_unless_told_otherwise() {
        let dir = tempfile::tempdir().unwrap();
        let atoms = write_atoms(&dir, "atoms.csv", ATOMS_CSV);
        let selection = save_first_residue(&dir, atoms);

        let trimmed: String = ATOMS_CSV.lines().take(8).map(|l| format!("{l}\n")).collect();
        let other = write_atoms(&dir, "other.csv", &trimmed);

        let err = run(args(other.clone(), selection.clone(), false)).unwrap_err();
        assert!(matches!(
            err,
            CliError::Engine(EngineError::Replay(ReplayError::IncompatibleStructure { .. }))
        ));
        run(args(other, selection, true)).unwrap();
    }

    #[test]
    fn saved_selections_are_plain_json() {
        let dir = tempfile::tempdir().unwrap();
        let atoms = write_atoms(&dir, "atoms.csv", ATOMS_CSV);
        let selection = save_first_residue(&dir, atoms);
        let text = fs::read_to_string(&selection).unwrap();
        let query: Query = serde_json::from_str(&text).unwrap();
        assert_eq!(query.elements.len(), 1);
        assert!(text.contains("\"hash\""));
    }
}
