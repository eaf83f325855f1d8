use super::ids::ElementIndex;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;
use thiserror::Error;

/// Bit set classifying a link between two atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LinkFlags(u32);

impl LinkFlags {
    pub const NONE: Self = Self(0);
    pub const COVALENT: Self = Self(0x1);
    pub const METALLIC_COORDINATION: Self = Self(0x2);
    pub const HYDROGEN_BOND: Self = Self(0x4);
    pub const DISULFIDE: Self = Self(0x8);
    pub const AROMATIC: Self = Self(0x10);
    pub const COMPUTED: Self = Self(0x20);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for LinkFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LinkFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Single = 1,
    Double = 2,
    Triple = 3,
    Quadruple = 4,
    Aromatic = 5,
}

impl BondOrder {
    pub fn as_number(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "s" | "sing" | "single" => Ok(Self::Single),
            "2" | "d" | "doub" | "double" => Ok(Self::Double),
            "3" | "t" | "trip" | "triple" => Ok(Self::Triple),
            "4" | "quad" | "quadruple" => Ok(Self::Quadruple),
            "ar" | "arom" | "aromatic" => Ok(Self::Aromatic),
            _ => Err(ParseBondOrderError),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Quadruple => "Quadruple",
                Self::Aromatic => "Aromatic",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub a: ElementIndex,
    pub b: ElementIndex,
    pub order: BondOrder,
    pub flags: LinkFlags,
}

/// One half-edge of the bond graph as seen from an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BondEdge {
    pub partner: ElementIndex,
    pub order: BondOrder,
    pub flags: LinkFlags,
}

/// Undirected bond graph over a model's atoms in compressed adjacency form.
///
/// Every bond is stored twice, once from each end, so neighbor lookup is a
/// slice into `edges`.
#[derive(Debug, Clone, Default)]
pub struct BondGraph {
    offsets: Vec<u32>,
    edges: Vec<BondEdge>,
    bond_count: usize,
}

impl BondGraph {
    pub fn from_bonds(atom_count: usize, bonds: &[Bond]) -> Self {
        let mut degree = vec![0u32; atom_count + 1];
        for bond in bonds {
            degree[bond.a as usize + 1] += 1;
            degree[bond.b as usize + 1] += 1;
        }
        for i in 0..atom_count {
            degree[i + 1] += degree[i];
        }
        let offsets = degree;

        let mut fill = offsets.clone();
        let placeholder = BondEdge {
            partner: 0,
            order: BondOrder::Single,
            flags: LinkFlags::NONE,
        };
        let mut edges = vec![placeholder; bonds.len() * 2];
        for bond in bonds {
            for (from, to) in [(bond.a, bond.b), (bond.b, bond.a)] {
                let slot = &mut fill[from as usize];
                edges[*slot as usize] = BondEdge {
                    partner: to,
                    order: bond.order,
                    flags: bond.flags,
                };
                *slot += 1;
            }
        }
        for atom in 0..atom_count {
            let range = offsets[atom] as usize..offsets[atom + 1] as usize;
            edges[range].sort_by_key(|edge| edge.partner);
        }

        Self {
            offsets,
            edges,
            bond_count: bonds.len(),
        }
    }

    pub fn bond_count(&self) -> usize {
        self.bond_count
    }

    pub fn neighbors(&self, atom: ElementIndex) -> &[BondEdge] {
        let atom = atom as usize;
        if atom + 1 >= self.offsets.len() {
            return &[];
        }
        &self.edges[self.offsets[atom] as usize..self.offsets[atom + 1] as usize]
    }

    pub fn edge(&self, a: ElementIndex, b: ElementIndex) -> Option<&BondEdge> {
        let neighbors = self.neighbors(a);
        neighbors
            .binary_search_by_key(&b, |edge| edge.partner)
            .ok()
            .map(|i| &neighbors[i])
    }
}
