use phf::phf_map;

/// Radius used for elements missing from the table.
pub const DEFAULT_VDW_RADIUS: f64 = 2.0;

/// Van der Waals radii in Angstroms keyed by upper-case element symbol.
static VDW_RADII: phf::Map<&'static str, f64> = phf_map! {
    "H" => 1.1,
    "HE" => 1.4,
    "LI" => 1.81,
    "BE" => 1.53,
    "B" => 1.92,
    "C" => 1.7,
    "N" => 1.55,
    "O" => 1.52,
    "F" => 1.47,
    "NE" => 1.54,
    "NA" => 2.27,
    "MG" => 1.73,
    "AL" => 1.84,
    "SI" => 2.1,
    "P" => 1.8,
    "S" => 1.8,
    "CL" => 1.75,
    "AR" => 1.88,
    "K" => 2.75,
    "CA" => 2.31,
    "MN" => 2.0,
    "FE" => 2.0,
    "CO" => 2.0,
    "NI" => 1.63,
    "CU" => 1.4,
    "ZN" => 1.39,
    "SE" => 1.9,
    "BR" => 1.85,
    "I" => 1.98,
};

/// Looks up the van der Waals radius of an element symbol (case-insensitive),
/// falling back to [`DEFAULT_VDW_RADIUS`].
pub fn vdw_radius(type_symbol: &str) -> f64 {
    let upper = type_symbol.trim().to_ascii_uppercase();
    VDW_RADII.get(upper.as_str()).copied().unwrap_or(DEFAULT_VDW_RADIUS)
}
