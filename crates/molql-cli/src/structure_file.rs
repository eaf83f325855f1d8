//! Reading structures from CSV atom and bond tables.
//!
//! The atom table needs a header row. Required columns are `id`,
//! `atom_name`, `type_symbol`, `comp_id`, `seq_id`, `asym_id`, `entity_id`,
//! `x`, `y` and `z`; `model_num`, `entity_type`, `ins_code`, `auth_asym_id`,
//! `auth_seq_id`, `alt_id`, `occupancy`, `b_iso` and `formal_charge` are
//! optional. Rows must be grouped by model, within a model by chain, and
//! within a chain by residue. Atom ids are unique across the whole table.
//!
//! The bond table references atoms by their `id` serial and has the columns
//! `a`, `b` and optionally `order` and `flags` (link type keywords separated
//! by `|`).

use crate::error::{CliError, Result};
use molql::core::structure::model::{AtomRecord, EntityType, Model, ModelError};
use molql::core::structure::properties::{ComponentNameCache, TableId};
use molql::core::structure::{BondOrder, LinkFlags, ModelBuilder, Structure};
use molql::engine::symbols::link_flag;
use nalgebra::Point3;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StructureFileError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("Line {line}: invalid bond order '{value}'")]
    BondOrder { line: u64, value: String },
    #[error("Line {line}: bond references unknown atom id {id}")]
    UnknownAtom { line: u64, id: i32 },
    #[error("Line {line}: bond joins atoms {a} and {b} from different models")]
    CrossModelBond { line: u64, a: i32, b: i32 },
    #[error("Duplicate atom id {0}")]
    DuplicateAtom(i32),
    #[error("Line {line}: rows of model {model_num} are not contiguous")]
    ModelOrder { line: u64, model_num: i32 },
    #[error("The atom table has no rows")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct AtomRow {
    id: i32,
    #[serde(default)]
    model_num: Option<i32>,
    atom_name: String,
    type_symbol: String,
    comp_id: String,
    seq_id: i32,
    #[serde(default)]
    ins_code: Option<String>,
    asym_id: String,
    #[serde(default)]
    auth_asym_id: Option<String>,
    #[serde(default)]
    auth_seq_id: Option<i32>,
    entity_id: String,
    #[serde(default)]
    entity_type: Option<String>,
    x: f64,
    y: f64,
    z: f64,
    #[serde(default)]
    alt_id: Option<String>,
    #[serde(default)]
    occupancy: Option<f64>,
    #[serde(default)]
    b_iso: Option<f64>,
    #[serde(default)]
    formal_charge: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct BondRow {
    a: i32,
    b: i32,
    #[serde(default)]
    order: Option<String>,
    #[serde(default)]
    flags: Option<String>,
}

#[derive(PartialEq)]
struct ResidueKey<'a> {
    seq_id: i32,
    ins_code: &'a str,
    comp_id: &'a str,
}

fn record_line(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Hierarchy state for the model currently being read.
struct ModelRows {
    model_num: i32,
    builder: ModelBuilder,
    entities: HashMap<String, u32>,
    current_chain: Option<String>,
    current_residue: Option<(i32, String, String)>,
}

impl ModelRows {
    fn new(label: &str, model_num: i32) -> Self {
        Self {
            model_num,
            builder: ModelBuilder::new(label, model_num),
            entities: HashMap::new(),
            current_chain: None,
            current_residue: None,
        }
    }

    fn push(&mut self, row: AtomRow) -> std::result::Result<u32, StructureFileError> {
        if self.current_chain.as_deref() != Some(row.asym_id.as_str()) {
            let entity_index = match self.entities.get(&row.entity_id) {
                Some(&index) => index,
                None => {
                    let entity_type = row
                        .entity_type
                        .as_deref()
                        .and_then(|value| value.parse::<EntityType>().ok())
                        .unwrap_or(EntityType::Unknown);
                    let index = self.builder.add_entity(&row.entity_id, entity_type, "");
                    self.entities.insert(row.entity_id.clone(), index);
                    index
                }
            };
            let auth_asym_id = row.auth_asym_id.as_deref().unwrap_or(&row.asym_id);
            self.builder
                .start_chain(&row.asym_id, auth_asym_id, entity_index)?;
            self.current_chain = Some(row.asym_id.clone());
            self.current_residue = None;
        }

        let ins_code = row.ins_code.as_deref().unwrap_or("");
        let key = ResidueKey {
            seq_id: row.seq_id,
            ins_code,
            comp_id: &row.comp_id,
        };
        let same_residue = self.current_residue.as_ref().is_some_and(|(seq, ins, comp)| {
            key == ResidueKey {
                seq_id: *seq,
                ins_code: ins,
                comp_id: comp,
            }
        });
        if !same_residue {
            self.builder.start_residue(
                &row.comp_id,
                row.seq_id,
                row.auth_seq_id.unwrap_or(row.seq_id),
                ins_code,
            )?;
            self.current_residue = Some((row.seq_id, ins_code.to_string(), row.comp_id.clone()));
        }

        let mut atom = AtomRecord::new(
            row.id,
            &row.atom_name,
            &row.type_symbol,
            Point3::new(row.x, row.y, row.z),
        );
        atom.label_alt_id = row.alt_id.unwrap_or_default();
        atom.occupancy = row.occupancy.unwrap_or(1.0);
        atom.b_iso = row.b_iso.unwrap_or(0.0);
        atom.formal_charge = row.formal_charge.unwrap_or(0);
        Ok(self.builder.add_atom(atom)?)
    }
}

/// Builds every model in the CSV tables. Atom ids are mapped to element
/// indices so the bond table can refer to them. All models of one atom table
/// share the component-name set stored in `names` under `table`.
pub fn parse_models<A: Read, B: Read>(
    label: &str,
    atoms: A,
    bonds: Option<B>,
    names: &mut ComponentNameCache,
    table: TableId,
) -> std::result::Result<Vec<Model>, StructureFileError> {
    let mut models: Vec<ModelRows> = Vec::new();
    let mut serials: HashMap<i32, (usize, u32)> = HashMap::new();
    let mut comp_ids: BTreeSet<String> = BTreeSet::new();

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(atoms);
    let headers = reader.headers()?.clone();
    for result in reader.records() {
        let record = result?;
        let line = record_line(&record);
        let row: AtomRow = record.deserialize(Some(&headers))?;
        let model_num = row.model_num.unwrap_or(1);

        if models.last().is_none_or(|m| m.model_num != model_num) {
            if models.iter().any(|m| m.model_num == model_num) {
                return Err(StructureFileError::ModelOrder { line, model_num });
            }
            models.push(ModelRows::new(label, model_num));
        }
        let slot = models.len() - 1;
        let id = row.id;
        if !comp_ids.contains(&row.comp_id) {
            comp_ids.insert(row.comp_id.clone());
        }
        let index = models[slot].push(row)?;
        if serials.insert(id, (slot, index)).is_some() {
            return Err(StructureFileError::DuplicateAtom(id));
        }
    }
    if models.is_empty() {
        return Err(StructureFileError::Empty);
    }
    debug!(
        models = models.len(),
        atoms = serials.len(),
        components = comp_ids.len(),
        "Read atom table"
    );

    if let Some(bonds) = bonds {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(bonds);
        let headers = reader.headers()?.clone();
        let mut count = 0usize;
        for result in reader.records() {
            let record = result?;
            let line = record_line(&record);
            let row: BondRow = record.deserialize(Some(&headers))?;
            let resolve = |id: i32| {
                serials
                    .get(&id)
                    .copied()
                    .ok_or(StructureFileError::UnknownAtom { line, id })
            };
            let ((model_a, a), (model_b, b)) = (resolve(row.a)?, resolve(row.b)?);
            if model_a != model_b {
                return Err(StructureFileError::CrossModelBond {
                    line,
                    a: row.a,
                    b: row.b,
                });
            }
            let order = match row.order.as_deref() {
                Some(value) => value
                    .parse::<BondOrder>()
                    .map_err(|_| StructureFileError::BondOrder {
                        line,
                        value: value.to_string(),
                    })?,
                None => BondOrder::Single,
            };
            let flags = match row.flags.as_deref() {
                Some(value) => value
                    .split('|')
                    .fold(LinkFlags::NONE, |acc, name| acc | link_flag(name)),
                None => LinkFlags::COVALENT,
            };
            models[model_a].builder.add_bond(a, b, order, flags);
            count += 1;
        }
        debug!(bonds = count, "Read bond table");
    }

    let shared = names.get_or_compute(table, || comp_ids);
    models
        .into_iter()
        .map(|mut rows| -> std::result::Result<Model, StructureFileError> {
            rows.builder.component_names(shared.clone());
            Ok(rows.builder.build()?)
        })
        .collect()
}

/// Identity of an atom table, derived from its contents.
pub fn table_id(contents: &[u8]) -> TableId {
    let mut hasher = DefaultHasher::new();
    contents.hash(&mut hasher);
    hasher.finish()
}

/// Loads structures from table files. Owns the component-name cache for the
/// tables it has read; [`StructureReader::forget`] drops a table's entry.
#[derive(Debug, Default)]
pub struct StructureReader {
    component_names: ComponentNameCache,
}

impl StructureReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a structure (identity operator only, one set of units per
    /// model) from an atom table and an optional bond table.
    pub fn read(&mut self, atoms_path: &Path, bonds_path: Option<&Path>) -> Result<Arc<Structure>> {
        info!("Loading input structure from {:?}", atoms_path);
        let label = atoms_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model");
        let atoms = std::fs::read(atoms_path)?;
        let bonds = bonds_path.map(std::fs::File::open).transpose()?;

        let models = parse_models(
            label,
            atoms.as_slice(),
            bonds,
            &mut self.component_names,
            table_id(&atoms),
        )
        .map_err(|e| CliError::FileParsing {
            path: match (&e, bonds_path) {
                (
                    StructureFileError::BondOrder { .. }
                    | StructureFileError::UnknownAtom { .. }
                    | StructureFileError::CrossModelBond { .. },
                    Some(path),
                ) => path.to_path_buf(),
                _ => atoms_path.to_path_buf(),
            },
            source: e.into(),
        })?;
        let models: Vec<Arc<Model>> = models.into_iter().map(Arc::new).collect();
        let structure = Structure::from_models(&models);
        info!(
            models = models.len(),
            units = structure.units().len(),
            elements = structure.element_count(),
            "Structure ready."
        );
        Ok(structure)
    }

    /// Drops the cached component names of an atom table read earlier.
    pub fn forget(&mut self, atoms_path: &Path) -> Result<bool> {
        let contents = std::fs::read(atoms_path)?;
        Ok(self.component_names.invalidate(table_id(&contents)))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    pub const ATOMS_CSV: &str = "\
id,atom_name,type_symbol,comp_id,seq_id,asym_id,entity_id,entity_type,x,y,z
1,N,N,ALA,1,A,1,polymer,0.0,0.0,0.0
2,CA,C,ALA,1,A,1,polymer,1.5,0.0,0.0
3,C,C,ALA,1,A,1,polymer,2.0,1.4,0.0
4,N,N,GLY,2,A,1,polymer,3.3,1.6,0.0
5,CA,C,GLY,2,A,1,polymer,3.9,2.9,0.0
6,C,C,GLY,2,A,1,polymer,5.4,2.9,0.0
7,O,O,HOH,101,W,2,water,20.0,0.0,0.0
8,O,O,HOH,102,W,2,water,22.0,0.0,0.0
";

    pub const BONDS_CSV: &str = "\
a,b,order,flags
1,2,single,covalent
2,3,,
3,4,single,covalent
4,5,,
5,6,,
";

    pub const TWO_MODELS_CSV: &str = "\
id,model_num,atom_name,type_symbol,comp_id,seq_id,asym_id,entity_id,x,y,z
1,1,CA,C,ALA,1,A,1,0,0,0
2,1,CB,C,ALA,1,A,1,1.5,0,0
3,2,CA,C,ALA,1,A,1,0,0.2,0
4,2,CB,C,ALA,1,A,1,1.5,0.2,0
5,2,O,O,HOH,101,W,2,9,0,0
";

    /// First model of an atom table, without bonds.
    pub fn read_model(atoms: &str) -> super::Model {
        let mut names = super::ComponentNameCache::new();
        super::parse_models("t", atoms.as_bytes(), None::<&[u8]>, &mut names, 0)
            .unwrap()
            .remove(0)
    }
}
