//! Element table, indexed by atomic number

/// Per-element information
#[derive(Debug, Clone, Copy)]
pub struct ElementData {
    pub name: &'static str,
    pub sym: &'static str,
    /// Default valence for the SMILES organic subset, 0 otherwise
    pub valence: u8,
}
impl ElementData {
    pub const fn new(name: &'static str, sym: &'static str, valence: u8) -> Self {
        Self { name, sym, valence }
    }
}

/// All of the data, just index the array by the atomic number
#[rustfmt::skip]
pub static ATOM_DATA: &[ElementData] = &[
    ElementData::new("unknown",    "*",  0),
    ElementData::new("hydrogen",   "H",  0),
    ElementData::new("helium",     "He", 0),
    ElementData::new("lithium",    "Li", 0),
    ElementData::new("beryllium",  "Be", 0),
    ElementData::new("boron",      "B",  3),
    ElementData::new("carbon",     "C",  4),
    ElementData::new("nitrogen",   "N",  3),
    ElementData::new("oxygen",     "O",  2),
    ElementData::new("fluorine",   "F",  1),
    ElementData::new("neon",       "Ne", 0),
    ElementData::new("sodium",     "Na", 0),
    ElementData::new("magnesium",  "Mg", 0),
    ElementData::new("aluminum",   "Al", 0),
    ElementData::new("silicon",    "Si", 0),
    ElementData::new("phosphorus", "P",  3),
    ElementData::new("sulfur",     "S",  2),
    ElementData::new("chlorine",   "Cl", 1),
    ElementData::new("argon",      "Ar", 0),
    ElementData::new("potassium",  "K",  0),
    ElementData::new("calcium",    "Ca", 0),
    ElementData::new("scandium",   "Sc", 0),
    ElementData::new("titanium",   "Ti", 0),
    ElementData::new("vanadium",   "V",  0),
    ElementData::new("chromium",   "Cr", 0),
    ElementData::new("manganese",  "Mn", 0),
    ElementData::new("iron",       "Fe", 0),
    ElementData::new("cobalt",     "Co", 0),
    ElementData::new("nickel",     "Ni", 0),
    ElementData::new("copper",     "Cu", 0),
    ElementData::new("zinc",       "Zn", 0),
    ElementData::new("gallium",    "Ga", 0),
    ElementData::new("germanium",  "Ge", 0),
    ElementData::new("arsenic",    "As", 0),
    ElementData::new("selenium",   "Se", 0),
    ElementData::new("bromine",    "Br", 1),
    ElementData::new("krypton",    "Kr", 0),
    ElementData::new("rubidium",   "Rb", 0),
    ElementData::new("strontium",  "Sr", 0),
    ElementData::new("yttrium",    "Y",  0),
    ElementData::new("zirconium",  "Zr", 0),
    ElementData::new("niobium",    "Nb", 0),
    ElementData::new("molybdenum", "Mo", 0),
    ElementData::new("technetium", "Tc", 0),
    ElementData::new("ruthenium",  "Ru", 0),
    ElementData::new("rhodium",    "Rh", 0),
    ElementData::new("palladium",  "Pd", 0),
    ElementData::new("silver",     "Ag", 0),
    ElementData::new("cadmium",    "Cd", 0),
    ElementData::new("indium",     "In", 0),
    ElementData::new("tin",        "Sn", 0),
    ElementData::new("antimony",   "Sb", 0),
    ElementData::new("tellurium",  "Te", 0),
    ElementData::new("iodine",     "I",  1),
    ElementData::new("xenon",      "Xe", 0),
];

/// Look up an atomic number by its (case-sensitive) symbol.
pub fn protons_for_symbol(sym: &str) -> Option<u8> {
    ATOM_DATA
        .iter()
        .skip(1)
        .position(|e| e.sym == sym)
        .map(|p| (p + 1) as u8)
}

/// Elements that can be written without brackets in SMILES.
pub fn is_organic(protons: u8) -> bool {
    ATOM_DATA
        .get(protons as usize)
        .map_or(false, |e| e.valence != 0)
}

/// Valence used to fill implicit hydrogens, following the isoelectronic element for charged atoms.
pub fn default_valence(protons: u8, charge: i8) -> Option<u8> {
    if !is_organic(protons) {
        return None;
    }
    let iso = protons as i16 - charge as i16;
    usize::try_from(iso)
        .ok()
        .and_then(|i| ATOM_DATA.get(i))
        .and_then(|e| (e.valence != 0).then_some(e.valence))
}
