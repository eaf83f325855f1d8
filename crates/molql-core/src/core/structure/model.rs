use super::bonds::{Bond, BondGraph, BondOrder, LinkFlags};
use super::ids::ElementIndex;
use super::properties::{
    ChemicalComponent, ChemicalComponentMap, MissingResidue, ModelProperties, ModifiedResidue,
    ModifiedResidues, SaccharideComponentMap,
};
use crate::core::sets::Segmentation;
use nalgebra::Point3;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Polymer,
    NonPolymer,
    Branched,
    Macrolide,
    Water,
    Unknown,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Polymer => "polymer",
            EntityType::NonPolymer => "non-polymer",
            EntityType::Branched => "branched",
            EntityType::Macrolide => "macrolide",
            EntityType::Water => "water",
            EntityType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid entity type string")]
pub struct ParseEntityTypeError;

impl FromStr for EntityType {
    type Err = ParseEntityTypeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "polymer" => Ok(EntityType::Polymer),
            "non-polymer" | "nonpolymer" => Ok(EntityType::NonPolymer),
            "branched" => Ok(EntityType::Branched),
            "macrolide" => Ok(EntityType::Macrolide),
            "water" => Ok(EntityType::Water),
            _ => Ok(EntityType::Unknown),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: String,
    pub entity_type: EntityType,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub id: i32, // Serial number from the source file
    pub label_atom_id: String,
    pub auth_atom_id: String,
    pub type_symbol: String,
    pub label_alt_id: String,
    pub occupancy: f64,
    pub b_iso: f64,
    pub formal_charge: i32,
    pub position: Point3<f64>,
}

impl AtomRecord {
    pub fn new(id: i32, name: &str, type_symbol: &str, position: Point3<f64>) -> Self {
        Self {
            id,
            label_atom_id: name.to_string(),
            auth_atom_id: name.to_string(),
            type_symbol: type_symbol.to_string(),
            label_alt_id: String::new(),
            occupancy: 1.0,
            b_iso: 0.0,
            formal_charge: 0,
            position,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResidueRecord {
    pub label_comp_id: String,
    pub auth_comp_id: String,
    pub label_seq_id: i32,
    pub auth_seq_id: i32,
    pub ins_code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainRecord {
    pub label_asym_id: String,
    pub auth_asym_id: String,
    pub entity_index: u32,
}

/// Atoms grouped into residues and chains. Residue and chain segmentations
/// partition the atom index range.
#[derive(Debug, Clone, Default)]
pub struct AtomicHierarchy {
    pub atoms: Vec<AtomRecord>,
    pub residues: Vec<ResidueRecord>,
    pub chains: Vec<ChainRecord>,
    pub residue_segments: Segmentation,
    pub chain_segments: Segmentation,
    /// Chain of every residue.
    pub residue_chain: Vec<u32>,
}

impl AtomicHierarchy {
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn residue_index(&self, atom: ElementIndex) -> u32 {
        self.residue_segments.segment_of(atom)
    }

    pub fn chain_index(&self, atom: ElementIndex) -> u32 {
        self.chain_segments.segment_of(atom)
    }
}

/// One coarse-grained element: a sphere or gaussian standing for a residue
/// range of a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct CoarseElement {
    pub entity_index: u32,
    pub asym_id: String,
    pub seq_id_begin: i32,
    pub seq_id_end: i32,
    pub position: Point3<f64>,
    pub radius: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CoarseHierarchy {
    pub spheres: Vec<CoarseElement>,
    pub gaussians: Vec<CoarseElement>,
}

/// One model of a macromolecular entry: hierarchy, coordinates, bonds and the
/// property tables supplied by ingestion.
#[derive(Debug)]
pub struct Model {
    id: u64,
    label: String,
    model_num: i32,
    entities: Vec<Entity>,
    atomic: AtomicHierarchy,
    coarse: CoarseHierarchy,
    bonds: BondGraph,
    properties: ModelProperties,
}

impl Model {
    /// Process-unique identity of this model instance.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn model_num(&self) -> i32 {
        self.model_num
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, index: u32) -> Option<&Entity> {
        self.entities.get(index as usize)
    }

    pub fn atomic(&self) -> &AtomicHierarchy {
        &self.atomic
    }

    pub fn coarse(&self) -> &CoarseHierarchy {
        &self.coarse
    }

    pub fn bonds(&self) -> &BondGraph {
        &self.bonds
    }

    pub fn properties(&self) -> &ModelProperties {
        &self.properties
    }

    /// Unique residue names in atom order.
    pub fn component_names(&self) -> BTreeSet<String> {
        unique_component_names(&self.atomic.residues)
    }
}

pub fn unique_component_names(residues: &[ResidueRecord]) -> BTreeSet<String> {
    residues.iter().map(|r| r.label_comp_id.clone()).collect()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("A chain must be started before adding residues")]
    NoActiveChain,
    #[error("A residue must be started before adding atoms")]
    NoActiveResidue,
    #[error("Entity index {0} does not exist")]
    UnknownEntity(u32),
    #[error("Bond references atom {atom} but the model has {count} atoms")]
    BondOutOfRange { atom: ElementIndex, count: usize },
}

/// Incremental constructor for [`Model`], used by ingestion and tests.
///
/// Atoms must arrive grouped: chains contiguous, residues contiguous within a
/// chain.
pub struct ModelBuilder {
    label: String,
    model_num: i32,
    entities: Vec<Entity>,
    atoms: Vec<AtomRecord>,
    residues: Vec<ResidueRecord>,
    chains: Vec<ChainRecord>,
    atom_residue: Vec<u32>,
    residue_chain: Vec<u32>,
    coarse: CoarseHierarchy,
    bonds: Vec<Bond>,
    modified: Vec<ModifiedResidue>,
    missing: Vec<(String, i32, MissingResidue)>,
    chemical_components: Option<Vec<ChemicalComponent>>,
    branch_saccharides: Vec<(String, String)>,
    component_names: Option<Arc<BTreeSet<String>>>,
}

impl ModelBuilder {
    pub fn new(label: &str, model_num: i32) -> Self {
        Self {
            label: label.to_string(),
            model_num,
            entities: Vec::new(),
            atoms: Vec::new(),
            residues: Vec::new(),
            chains: Vec::new(),
            atom_residue: Vec::new(),
            residue_chain: Vec::new(),
            coarse: CoarseHierarchy::default(),
            bonds: Vec::new(),
            modified: Vec::new(),
            missing: Vec::new(),
            chemical_components: None,
            branch_saccharides: Vec::new(),
            component_names: None,
        }
    }

    pub fn add_entity(&mut self, id: &str, entity_type: EntityType, description: &str) -> u32 {
        self.entities.push(Entity {
            id: id.to_string(),
            entity_type,
            description: description.to_string(),
        });
        (self.entities.len() - 1) as u32
    }

    pub fn start_chain(
        &mut self,
        label_asym_id: &str,
        auth_asym_id: &str,
        entity_index: u32,
    ) -> Result<&mut Self, ModelError> {
        if entity_index as usize >= self.entities.len() {
            return Err(ModelError::UnknownEntity(entity_index));
        }
        self.chains.push(ChainRecord {
            label_asym_id: label_asym_id.to_string(),
            auth_asym_id: auth_asym_id.to_string(),
            entity_index,
        });
        Ok(self)
    }

    pub fn start_residue(
        &mut self,
        comp_id: &str,
        label_seq_id: i32,
        auth_seq_id: i32,
        ins_code: &str,
    ) -> Result<&mut Self, ModelError> {
        if self.chains.is_empty() {
            return Err(ModelError::NoActiveChain);
        }
        self.residues.push(ResidueRecord {
            label_comp_id: comp_id.to_string(),
            auth_comp_id: comp_id.to_string(),
            label_seq_id,
            auth_seq_id,
            ins_code: ins_code.to_string(),
        });
        self.residue_chain.push((self.chains.len() - 1) as u32);
        Ok(self)
    }

    /// Appends an atom to the current residue and returns its element index.
    pub fn add_atom(&mut self, atom: AtomRecord) -> Result<ElementIndex, ModelError> {
        if self.residues.is_empty() {
            return Err(ModelError::NoActiveResidue);
        }
        self.atoms.push(atom);
        self.atom_residue.push((self.residues.len() - 1) as u32);
        Ok((self.atoms.len() - 1) as ElementIndex)
    }

    pub fn add_bond(
        &mut self,
        a: ElementIndex,
        b: ElementIndex,
        order: BondOrder,
        flags: LinkFlags,
    ) -> &mut Self {
        self.bonds.push(Bond { a, b, order, flags });
        self
    }

    pub fn add_sphere(&mut self, element: CoarseElement) -> &mut Self {
        self.coarse.spheres.push(element);
        self
    }

    pub fn add_gaussian(&mut self, element: CoarseElement) -> &mut Self {
        self.coarse.gaussians.push(element);
        self
    }

    pub fn add_modified_residue(&mut self, id: &str, parent_id: &str, details: &str) -> &mut Self {
        self.modified.push(ModifiedResidue {
            id: id.to_string(),
            parent_id: parent_id.to_string(),
            details: details.to_string(),
        });
        self
    }

    pub fn add_missing_residue(
        &mut self,
        asym_id: &str,
        seq_id: i32,
        residue: MissingResidue,
    ) -> &mut Self {
        self.missing.push((asym_id.to_string(), seq_id, residue));
        self
    }

    pub fn chemical_components(&mut self, table: Vec<ChemicalComponent>) -> &mut Self {
        self.chemical_components = Some(table);
        self
    }

    pub fn add_branch_saccharide(&mut self, comp_id: &str, name: &str) -> &mut Self {
        self.branch_saccharides
            .push((comp_id.to_string(), name.to_string()));
        self
    }

    /// Supplies precomputed unique component names, typically from a
    /// [`ComponentNameCache`](super::properties::ComponentNameCache) shared by
    /// models of one source table.
    pub fn component_names(&mut self, names: Arc<BTreeSet<String>>) -> &mut Self {
        self.component_names = Some(names);
        self
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn build(self) -> Result<Model, ModelError> {
        let atom_count = self.atoms.len();
        for bond in &self.bonds {
            for atom in [bond.a, bond.b] {
                if atom as usize >= atom_count {
                    return Err(ModelError::BondOutOfRange {
                        atom,
                        count: atom_count,
                    });
                }
            }
        }

        let residue_segments = Segmentation::from_membership(&self.atom_residue, self.residues.len());
        let atom_chain: Vec<u32> = self
            .atom_residue
            .iter()
            .map(|&r| self.residue_chain[r as usize])
            .collect();
        let chain_segments = Segmentation::from_membership(&atom_chain, self.chains.len());

        let chemical_component_map = match self.chemical_components {
            Some(table) => ChemicalComponentMap::from_table(table),
            None => match &self.component_names {
                Some(names) => ChemicalComponentMap::derived(names.iter()),
                None => ChemicalComponentMap::derived(unique_component_names(&self.residues).iter()),
            },
        };
        let saccharide_component_map = SaccharideComponentMap::build(
            self.branch_saccharides
                .iter()
                .map(|(id, name)| (id.as_str(), name.as_str())),
            &chemical_component_map,
        );
        let mut properties = ModelProperties {
            modified_residues: ModifiedResidues::new(self.modified),
            chemical_component_map,
            saccharide_component_map,
            ..ModelProperties::default()
        };
        for (asym_id, seq_id, residue) in self.missing {
            properties
                .missing_residues
                .insert(self.model_num, &asym_id, seq_id, residue);
        }

        Ok(Model {
            id: NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed),
            label: self.label,
            model_num: self.model_num,
            entities: self.entities,
            bonds: BondGraph::from_bonds(atom_count, &self.bonds),
            atomic: AtomicHierarchy {
                atoms: self.atoms,
                residues: self.residues,
                chains: self.chains,
                residue_segments,
                chain_segments,
                residue_chain: self.residue_chain,
            },
            coarse: self.coarse,
            properties,
        })
    }
}
