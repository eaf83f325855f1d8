/// Index of an element (atom, coarse sphere or coarse gaussian) within its model.
pub type ElementIndex = u32;

/// Position within a unit's element array.
pub type UnitIndex = u32;

/// Identifier of a unit, unique within one structure family.
pub type UnitId = u32;
