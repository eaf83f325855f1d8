use super::{format_elements, read_query_text, write_selection};
use crate::cli::SelectArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use crate::structure_file::StructureReader;
use molql::workflows;
use tracing::{info, warn};

pub fn run(args: SelectArgs) -> Result<()> {
    let config = PartialConfig::load(&args.options)?;
    let source = read_query_text(&args.query)?;
    let structure = StructureReader::new()
        .read(&args.structure.input, args.structure.bonds.as_deref())?;

    info!("Invoking the select workflow...");
    let result = workflows::select::run(&structure, &source, &config)?;

    if result.loci.is_empty() {
        warn!("Query matched no elements.");
    }
    println!(
        "Selected {} element(s) in {} structure(s).",
        result.loci.size(),
        result.selection.len()
    );
    println!("Script: {}", result.script);
    if args.list {
        for line in format_elements(&result.loci) {
            println!("  {}", line);
        }
    }

    if let Some(path) = &args.output {
        let query = if args.any_structure {
            result.query.for_any_structure()
        } else {
            result.query
        };
        info!("Writing selection to {:?}", path);
        write_selection(path, &query)?;
        println!("Selection written to: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{QueryOptions, QuerySource, StructureInput};
    use crate::commands::read_selection;
    use crate::error::CliError;
    use crate::structure_file::testing::{ATOMS_CSV, BONDS_CSV};
    use molql::core::element::query::Query;
    use molql::engine::error::{EngineError, ParseError};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn write_inputs(dir: &TempDir) -> StructureInput {
        let input = dir.path().join("atoms.csv");
        let bonds = dir.path().join("bonds.csv");
        fs::write(&input, ATOMS_CSV).unwrap();
        fs::write(&bonds, BONDS_CSV).unwrap();
        StructureInput {
            input,
            bonds: Some(bonds),
        }
    }

    fn args(structure: StructureInput, query: &str, output: Option<PathBuf>) -> SelectArgs {
        SelectArgs {
            structure,
            query: QuerySource {
                text: Some(query.to_string()),
                query_file: None,
            },
            options: QueryOptions::default(),
            output,
            any_structure: false,
            list: true,
        }
    }

    fn saved(path: &Path) -> Query {
        read_selection(path).unwrap()
    }

    #[test]
    fn selection_is_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("sel.json");
        let structure = write_inputs(&dir);
        run(args(
            structure,
            "(atom-groups :residue-test (= (label_comp_id) HOH))",
            Some(output.clone()),
        ))
        .unwrap();

        let query = saved(&output);
        assert_ne!(query.hash, Query::ANY_STRUCTURE);
        assert_eq!(query.elements.len(), 1);
    }

    #[test]
    fn any_structure_drops_the_hash() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("sel.json");
        let mut select = args(write_inputs(&dir), "(all)", Some(output.clone()));
        select.any_structure = true;
        run(select).unwrap();
        assert_eq!(saved(&output).hash, Query::ANY_STRUCTURE);
    }

    #[test]
    fn bonds_from_the_table_are_queryable() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("sel.json");
        run(args(
            write_inputs(&dir),
            "(include-connected :0 (atom-groups :atom-test (= (structure-query.atom-property.macromolecular.id) 1)) :fixed-point true)",
            Some(output.clone()),
        ))
        .unwrap();
        let query = saved(&output);
        let selected: usize = query
            .elements
            .iter()
            .map(|e| e.set.len() + e.ranges.size())
            .sum();
        assert_eq!(selected, 6);
    }

    #[test]
    fn syntax_errors_surface_as_engine_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(args(write_inputs(&dir), "(all", None)).unwrap_err();
        assert!(matches!(
            err,
            CliError::Engine(EngineError::Parse(ParseError::UnexpectedEnd))
        ));
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let structure = StructureInput {
            input: dir.path().join("absent.csv"),
            bonds: None,
        };
        let err = run(args(structure, "(all)", None)).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
