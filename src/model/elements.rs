// src/model/elements.rs

/// Element symbols indexed by Z - 1.
const SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
    "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga",
    "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd",
    "Ag", "Cd", "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm",
    "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os",
    "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa",
    "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg",
    "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Pauling electronegativity indexed by Z - 1, NaN where undefined.
const PAULING_X: [f64; 118] = [
    2.20, f64::NAN, 0.98, 1.57, 2.04, 2.55, 3.04, 3.44, 3.98, f64::NAN, // H..Ne
    0.93, 1.31, 1.61, 1.90, 2.19, 2.58, 3.16, f64::NAN, // Na..Ar
    0.82, 1.00, 1.36, 1.54, 1.63, 1.66, 1.55, 1.83, 1.88, 1.91, 1.90, 1.65, 1.81, 2.01, 2.18,
    2.55, 2.96, 3.00, // K..Kr
    0.82, 0.95, 1.22, 1.33, 1.60, 2.16, 1.90, 2.20, 2.28, 2.20, 1.93, 1.69, 1.78, 1.96, 2.05,
    2.10, 2.66, 2.60, // Rb..Xe
    0.79, 0.89, 1.10, 1.12, 1.13, 1.14, 1.13, 1.17, 1.20, 1.20, 1.10, 1.22, 1.23, 1.24, 1.25,
    1.10, 1.27, 1.30, 1.50, 2.36, 1.90, 2.20, 2.20, 2.28, 2.54, 2.00, 1.62, 2.33, 2.02, 2.00,
    2.20, 2.20, // Cs..Rn
    0.70, 0.90, 1.10, 1.30, 1.50, 1.38, 1.36, 1.28, 1.30, 1.30, 1.30, 1.30, 1.30, 1.30, 1.30,
    1.30, 1.30, // Fr..Lr
    f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN,
    f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, // Rf..Og
];

/// Returns the element symbol for atomic number `z`, None outside 1..=118.
pub fn symbol_from_z(z: u32) -> Option<&'static str> {
    if z == 0 {
        return None;
    }
    SYMBOLS.get(z as usize - 1).copied()
}

/// Atomic number of `symbol`, 0 for unknown/dummy symbols.
pub fn get_atomic_number(symbol: &str) -> u32 {
    SYMBOLS
        .iter()
        .position(|s| *s == symbol)
        .map(|i| i as u32 + 1)
        .unwrap_or(0)
}

/// ABINIT stores znucl as a double; pseudo-atoms may carry fractional charges.
pub fn symbol_from_znucl(znucl: f64) -> Option<&'static str> {
    if !znucl.is_finite() || znucl < 0.5 {
        return None;
    }
    symbol_from_z(znucl.round() as u32)
}

/// Pauling electronegativity of `symbol`; None for noble gases, superheavy and unknown elements.
pub fn electronegativity(symbol: &str) -> Option<f64> {
    let z = get_atomic_number(symbol);
    if z == 0 {
        return None;
    }
    let x = PAULING_X[z as usize - 1];
    (!x.is_nan()).then_some(x)
}

/// CPK-like color used when drawing atoms.
pub fn element_color(symbol: &str) -> (f64, f64, f64) {
    match symbol {
        "H" => (1.00, 1.00, 1.00),
        "Li" | "Na" | "K" | "Rb" | "Cs" => (0.67, 0.36, 0.95),
        "Be" | "Mg" | "Ca" | "Sr" | "Ba" => (0.54, 1.00, 0.00),
        "B" => (1.00, 0.70, 0.70),
        "C" => (0.20, 0.20, 0.20),
        "N" => (0.19, 0.31, 0.97),
        "O" => (1.00, 0.05, 0.05),
        "F" | "Cl" => (0.12, 0.94, 0.12),
        "Al" => (0.75, 0.65, 0.65),
        "Si" => (0.94, 0.78, 0.63),
        "P" => (1.00, 0.50, 0.00),
        "S" | "Se" => (1.00, 1.00, 0.19),
        "Ti" | "V" | "Cr" => (0.75, 0.76, 0.78),
        "Fe" => (0.88, 0.40, 0.20),
        "Co" => (0.94, 0.56, 0.63),
        "Ni" => (0.31, 0.82, 0.31),
        "Cu" => (0.78, 0.50, 0.20),
        "Zn" | "Ga" => (0.49, 0.50, 0.69),
        "Ge" | "Sn" | "Pb" => (0.40, 0.56, 0.56),
        "As" | "Sb" | "Bi" => (0.74, 0.50, 0.89),
        "Br" | "I" => (0.65, 0.16, 0.16),
        "Ag" => (0.75, 0.75, 0.75),
        "Au" => (1.00, 0.82, 0.14),
        _ => (1.00, 0.08, 0.58),
    }
}
