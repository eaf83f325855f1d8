use phf::{phf_map, phf_set};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

static AMINO_ACID_NAMES: phf::Set<&'static str> = phf_set! {
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE",
    "LEU", "LYS", "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL",
    "SEC", "PYL", "MSE", "HSD", "HSE", "HSP",
};

static RNA_BASE_NAMES: phf::Set<&'static str> = phf_set! { "A", "C", "G", "U", "I", "N" };

static DNA_BASE_NAMES: phf::Set<&'static str> = phf_set! { "DA", "DC", "DG", "DT", "DU", "DI", "DN" };

static WATER_NAMES: phf::Set<&'static str> = phf_set! { "HOH", "WAT", "H2O", "DOD", "SOL" };

/// Well-known monosaccharides keyed by component id.
static SACCHARIDE_NAMES: phf::Map<&'static str, (&'static str, SaccharideType)> = phf_map! {
    "GLC" => ("alpha-D-glucopyranose", SaccharideType::Hexose),
    "BGC" => ("beta-D-glucopyranose", SaccharideType::Hexose),
    "MAN" => ("alpha-D-mannopyranose", SaccharideType::Hexose),
    "BMA" => ("beta-D-mannopyranose", SaccharideType::Hexose),
    "GAL" => ("beta-D-galactopyranose", SaccharideType::Hexose),
    "GLA" => ("alpha-D-galactopyranose", SaccharideType::Hexose),
    "NAG" => ("N-acetyl-beta-D-glucosamine", SaccharideType::HexNAc),
    "NDG" => ("N-acetyl-alpha-D-glucosamine", SaccharideType::HexNAc),
    "NGA" => ("N-acetyl-beta-D-galactosamine", SaccharideType::HexNAc),
    "A2G" => ("N-acetyl-alpha-D-galactosamine", SaccharideType::HexNAc),
    "FUC" => ("alpha-L-fucopyranose", SaccharideType::Deoxyhexose),
    "FUL" => ("beta-L-fucopyranose", SaccharideType::Deoxyhexose),
    "XYS" => ("alpha-D-xylopyranose", SaccharideType::Pentose),
    "XYP" => ("beta-D-xylopyranose", SaccharideType::Pentose),
    "SIA" => ("N-acetyl-alpha-neuraminic acid", SaccharideType::SialicAcid),
    "SLB" => ("N-acetyl-beta-neuraminic acid", SaccharideType::SialicAcid),
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifiedResidue {
    pub id: String,
    pub parent_id: String,
    pub details: String,
}

/// Modified residue names and the standard residue each derives from.
#[derive(Debug, Clone, Default)]
pub struct ModifiedResidues {
    entries: HashMap<String, ModifiedResidue>,
}

impl ModifiedResidues {
    pub fn new(entries: impl IntoIterator<Item = ModifiedResidue>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }

    pub fn get(&self, comp_id: &str) -> Option<&ModifiedResidue> {
        self.entries.get(comp_id)
    }

    pub fn parent_of(&self, comp_id: &str) -> Option<&str> {
        self.entries.get(comp_id).map(|e| e.parent_id.as_str())
    }

    pub fn is_modified(&self, comp_id: &str) -> bool {
        self.entries.contains_key(comp_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingResidue {
    pub comp_id: String,
    pub auth_seq_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MissingResidueKey {
    model_num: i32,
    asym_id: String,
    seq_id: i32,
}

/// Residues present in the sequence but unobserved in the coordinates, keyed
/// by model number, chain and sequence id.
#[derive(Debug, Clone, Default)]
pub struct MissingResidues {
    entries: HashMap<MissingResidueKey, MissingResidue>,
}

impl MissingResidues {
    pub fn insert(&mut self, model_num: i32, asym_id: &str, seq_id: i32, residue: MissingResidue) {
        let key = MissingResidueKey {
            model_num,
            asym_id: asym_id.to_string(),
            seq_id,
        };
        self.entries.insert(key, residue);
    }

    pub fn has(&self, model_num: i32, asym_id: &str, seq_id: i32) -> bool {
        self.get(model_num, asym_id, seq_id).is_some()
    }

    pub fn get(&self, model_num: i32, asym_id: &str, seq_id: i32) -> Option<&MissingResidue> {
        let key = MissingResidueKey {
            model_num,
            asym_id: asym_id.to_string(),
            seq_id,
        };
        self.entries.get(&key)
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChemicalComponent {
    pub id: String,
    pub name: String,
    /// mmCIF-style component type, e.g. `L-peptide linking` or `non-polymer`.
    pub comp_type: String,
}

impl ChemicalComponent {
    /// Default record for a component with no explicit table entry, typed by
    /// recognizing standard residue names.
    pub fn derived(id: &str) -> Self {
        let comp_type = if AMINO_ACID_NAMES.contains(id) {
            "L-peptide linking"
        } else if RNA_BASE_NAMES.contains(id) {
            "RNA linking"
        } else if DNA_BASE_NAMES.contains(id) {
            "DNA linking"
        } else if SACCHARIDE_NAMES.contains_key(id) {
            "D-saccharide"
        } else if WATER_NAMES.contains(id) {
            "non-polymer"
        } else {
            "other"
        };
        Self {
            id: id.to_string(),
            name: id.to_string(),
            comp_type: comp_type.to_string(),
        }
    }

    pub fn is_saccharide(&self) -> bool {
        self.comp_type.to_ascii_lowercase().contains("saccharide")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChemicalComponentMap {
    entries: HashMap<String, ChemicalComponent>,
    derived: bool,
}

impl ChemicalComponentMap {
    pub fn from_table(components: impl IntoIterator<Item = ChemicalComponent>) -> Self {
        Self {
            entries: components.into_iter().map(|c| (c.id.clone(), c)).collect(),
            derived: false,
        }
    }

    /// Builds default records for every component name in use when the
    /// source provides no chemical component table.
    pub fn derived<'a>(names: impl IntoIterator<Item = &'a String>) -> Self {
        Self {
            entries: names
                .into_iter()
                .map(|name| (name.clone(), ChemicalComponent::derived(name)))
                .collect(),
            derived: true,
        }
    }

    pub fn get(&self, comp_id: &str) -> Option<&ChemicalComponent> {
        self.entries.get(comp_id)
    }

    pub fn is_derived(&self) -> bool {
        self.derived
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChemicalComponent> {
        self.entries.values()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaccharideType {
    Hexose,
    HexNAc,
    Deoxyhexose,
    Pentose,
    SialicAcid,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaccharideComponent {
    pub id: String,
    pub name: String,
    pub kind: SaccharideType,
}

impl SaccharideComponent {
    fn classify(id: &str, fallback_name: &str) -> Self {
        match SACCHARIDE_NAMES.get(id) {
            Some((name, kind)) => Self {
                id: id.to_string(),
                name: name.to_string(),
                kind: *kind,
            },
            None => Self {
                id: id.to_string(),
                name: fallback_name.to_string(),
                kind: SaccharideType::Unknown,
            },
        }
    }
}

/// Saccharide classification per component id.
#[derive(Debug, Clone, Default)]
pub struct SaccharideComponentMap {
    entries: HashMap<String, SaccharideComponent>,
}

impl SaccharideComponentMap {
    /// Merges two passes: identifiers listed by branched entities first, then
    /// any chemical component typed as a saccharide that the first pass missed.
    pub fn build<'a>(
        branch_identifiers: impl IntoIterator<Item = (&'a str, &'a str)>,
        chemical_components: &ChemicalComponentMap,
    ) -> Self {
        let mut entries = HashMap::new();
        for (comp_id, name) in branch_identifiers {
            entries
                .entry(comp_id.to_string())
                .or_insert_with(|| SaccharideComponent::classify(comp_id, name));
        }
        for component in chemical_components.iter().filter(|c| c.is_saccharide()) {
            entries
                .entry(component.id.clone())
                .or_insert_with(|| SaccharideComponent::classify(&component.id, &component.name));
        }
        Self { entries }
    }

    pub fn get(&self, comp_id: &str) -> Option<&SaccharideComponent> {
        self.entries.get(comp_id)
    }

    pub fn has(&self, comp_id: &str) -> bool {
        self.entries.contains_key(comp_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read-only lookup tables attached to a model by ingestion.
#[derive(Debug, Clone, Default)]
pub struct ModelProperties {
    pub modified_residues: ModifiedResidues,
    pub missing_residues: MissingResidues,
    pub chemical_component_map: ChemicalComponentMap,
    pub saccharide_component_map: SaccharideComponentMap,
}

/// Identity of an ingested source table.
pub type TableId = u64;

/// Unique component names per source table, computed once and shared by every
/// model built from that table.
///
/// Owned by the ingestion side; entries live until invalidated.
#[derive(Debug, Default)]
pub struct ComponentNameCache {
    names: HashMap<TableId, Arc<BTreeSet<String>>>,
}

impl ComponentNameCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute<F>(&mut self, table: TableId, compute: F) -> Arc<BTreeSet<String>>
    where
        F: FnOnce() -> BTreeSet<String>,
    {
        self.names
            .entry(table)
            .or_insert_with(|| Arc::new(compute()))
            .clone()
    }

    pub fn invalidate(&mut self, table: TableId) -> bool {
        self.names.remove(&table).is_some()
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod chemical_components {
        use super::*;

        #[test]
        fn derived_records_recognize_standard_names() {
            assert_eq!(ChemicalComponent::derived("ALA").comp_type, "L-peptide linking");
            assert_eq!(ChemicalComponent::derived("DA").comp_type, "DNA linking");
            assert_eq!(ChemicalComponent::derived("U").comp_type, "RNA linking");
            assert_eq!(ChemicalComponent::derived("NAG").comp_type, "D-saccharide");
            assert_eq!(ChemicalComponent::derived("HOH").comp_type, "non-polymer");
            assert_eq!(ChemicalComponent::derived("XYZ").comp_type, "other");
        }

        #[test]
        fn derived_map_covers_every_name() {
            let names: BTreeSet<String> = ["ALA", "HOH"].iter().map(|s| s.to_string()).collect();
            let map = ChemicalComponentMap::derived(&names);
            assert!(map.is_derived());
            assert_eq!(map.len(), 2);
            assert!(map.get("ALA").is_some());
            assert!(map.get("GLY").is_none());
        }
    }

    mod saccharides {
        use super::*;

        #[test]
        fn both_passes_are_merged() {
            let chem = ChemicalComponentMap::from_table(vec![
                ChemicalComponent {
                    id: "MAN".into(),
                    name: "alpha-D-mannose".into(),
                    comp_type: "D-saccharide, alpha linking".into(),
                },
                ChemicalComponent {
                    id: "ZZZ".into(),
                    name: "exotic sugar".into(),
                    comp_type: "saccharide".into(),
                },
                ChemicalComponent {
                    id: "ALA".into(),
                    name: "alanine".into(),
                    comp_type: "L-peptide linking".into(),
                },
            ]);
            let map = SaccharideComponentMap::build([("NAG", "GlcNAc")], &chem);
            assert_eq!(map.len(), 3);
            assert_eq!(map.get("NAG").map(|s| s.kind), Some(SaccharideType::HexNAc));
            assert_eq!(map.get("MAN").map(|s| s.kind), Some(SaccharideType::Hexose));
            let exotic = map.get("ZZZ").unwrap();
            assert_eq!(exotic.kind, SaccharideType::Unknown);
            assert_eq!(exotic.name, "exotic sugar");
            assert!(!map.has("ALA"));
        }

        #[test]
        fn identifier_pass_takes_precedence() {
            let chem = ChemicalComponentMap::from_table(vec![ChemicalComponent {
                id: "QQQ".into(),
                name: "from chem comp".into(),
                comp_type: "saccharide".into(),
            }]);
            let map = SaccharideComponentMap::build([("QQQ", "from branch table")], &chem);
            assert_eq!(map.get("QQQ").unwrap().name, "from branch table");
        }
    }

    #[test]
    fn missing_residues_are_keyed_by_model_chain_and_seq() {
        let mut missing = MissingResidues::default();
        missing.insert(
            1,
            "A",
            7,
            MissingResidue {
                comp_id: "LYS".into(),
                auth_seq_id: 7,
            },
        );
        assert!(missing.has(1, "A", 7));
        assert!(!missing.has(2, "A", 7));
        assert!(missing.get(1, "B", 7).is_none());
        assert_eq!(missing.size(), 1);
    }

    #[test]
    fn modified_residues_report_parent() {
        let modified = ModifiedResidues::new(vec![ModifiedResidue {
            id: "MSE".into(),
            parent_id: "MET".into(),
            details: "selenomethionine".into(),
        }]);
        assert!(modified.is_modified("MSE"));
        assert_eq!(modified.parent_of("MSE"), Some("MET"));
        assert_eq!(modified.parent_of("MET"), None);
    }

    #[test]
    fn component_name_cache_computes_once_per_table() {
        let mut cache = ComponentNameCache::new();
        let mut calls = 0;
        let first = cache.get_or_compute(7, || {
            calls += 1;
            ["ALA".to_string()].into_iter().collect()
        });
        let second = cache.get_or_compute(7, || unreachable!("cached"));
        assert_eq!(calls, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.invalidate(7));
        assert!(!cache.invalidate(7));
        assert!(cache.is_empty());
    }
}
