pub mod check;
pub mod replay;
pub mod select;

use crate::cli::QuerySource;
use crate::error::{CliError, Result};
use molql::core::element::{Boundary, Loci};
use molql::core::element::query::Query;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

pub(crate) fn read_query_text(source: &QuerySource) -> Result<String> {
    match (&source.text, &source.query_file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => {
            debug!("Reading query text from {:?}", path);
            Ok(std::fs::read_to_string(path)?)
        }
        (None, None) => Err(CliError::Argument(
            "Either --query or --query-file must be given.".to_string(),
        )),
    }
}

pub(crate) fn write_selection(path: &Path, query: &Query) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, query)?;
    Ok(())
}

pub(crate) fn read_selection(path: &Path) -> Result<Query> {
    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

/// One line per selected element: operator, chain, residue, atom name and
/// the atom id from the input table.
pub(crate) fn format_elements(loci: &Loci) -> Vec<String> {
    let mut lines = Vec::with_capacity(loci.size());
    for element in loci.elements() {
        let unit = &element.unit;
        let source = unit.elements();
        let operator = &unit.operator().name;
        for i in element.indices.iter() {
            let e = source[i as usize];
            if unit.kind().is_coarse() {
                lines.push(format!("{} {} element {}", operator, unit.kind(), e));
                continue;
            }
            let atomic = unit.model().atomic();
            let atom = &atomic.atoms[e as usize];
            let residue = &atomic.residues[atomic.residue_index(e) as usize];
            let chain = &atomic.chains[atomic.chain_index(e) as usize];
            lines.push(format!(
                "{} {} {} {}{} {} [{}]",
                operator,
                chain.label_asym_id,
                residue.label_comp_id,
                residue.label_seq_id,
                residue.ins_code,
                atom.label_atom_id,
                atom.id
            ));
        }
    }
    lines
}

pub(crate) fn format_boundary(boundary: &Boundary) -> String {
    let c = boundary.sphere.center;
    format!(
        "center ({:.3}, {:.3}, {:.3}), radius {:.3}",
        c.x, c.y, c.z, boundary.sphere.radius
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure_file::testing::{ATOMS_CSV, read_model};
    use molql::core::structure::Structure;
    use std::sync::Arc;

    #[test]
    fn elements_are_listed_with_their_hierarchy() {
        let model = read_model(ATOMS_CSV);
        let structure = Structure::from_model(Arc::new(model));
        let loci = Loci::all(&structure);
        let lines = format_elements(&loci);
        assert_eq!(lines.len(), 8);
        assert!(lines[1].ends_with("A ALA 1 CA [2]"), "{}", lines[1]);
        assert!(lines[7].ends_with("W HOH 102 O [8]"), "{}", lines[7]);
    }

    #[test]
    fn query_text_comes_from_a_file_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.txt");
        std::fs::write(&path, "(all)").unwrap();
        let source = QuerySource {
            text: None,
            query_file: Some(path),
        };
        assert_eq!(read_query_text(&source).unwrap(), "(all)");
    }

    #[test]
    fn unreadable_selection_files_report_their_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sel.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            read_selection(&path),
            Err(CliError::FileParsing { .. })
        ));
    }
}
