use phf::{Map, phf_map};

/// Static element properties needed by the trajectory analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub atomic_number: u8,
    pub symbol: &'static str,
    /// Standard atomic weight in daltons.
    pub mass_da: f64,
}

const fn element(atomic_number: u8, symbol: &'static str, mass_da: f64) -> Element {
    Element {
        atomic_number,
        symbol,
        mass_da,
    }
}

// Standard atomic weights; elements without stable isotopes use the longest-lived mass number.
static ELEMENTS: Map<u8, Element> = phf_map! {
    1u8 => element(1, "H", 1.008),
    2u8 => element(2, "He", 4.002_602),
    3u8 => element(3, "Li", 6.94),
    4u8 => element(4, "Be", 9.012_183),
    5u8 => element(5, "B", 10.81),
    6u8 => element(6, "C", 12.011),
    7u8 => element(7, "N", 14.007),
    8u8 => element(8, "O", 15.999),
    9u8 => element(9, "F", 18.998_403),
    10u8 => element(10, "Ne", 20.1797),
    11u8 => element(11, "Na", 22.989_769),
    12u8 => element(12, "Mg", 24.305),
    13u8 => element(13, "Al", 26.981_538),
    14u8 => element(14, "Si", 28.085),
    15u8 => element(15, "P", 30.973_762),
    16u8 => element(16, "S", 32.06),
    17u8 => element(17, "Cl", 35.45),
    18u8 => element(18, "Ar", 39.948),
    19u8 => element(19, "K", 39.0983),
    20u8 => element(20, "Ca", 40.078),
    21u8 => element(21, "Sc", 44.955_908),
    22u8 => element(22, "Ti", 47.867),
    23u8 => element(23, "V", 50.9415),
    24u8 => element(24, "Cr", 51.9961),
    25u8 => element(25, "Mn", 54.938_043),
    26u8 => element(26, "Fe", 55.845),
    27u8 => element(27, "Co", 58.933_194),
    28u8 => element(28, "Ni", 58.6934),
    29u8 => element(29, "Cu", 63.546),
    30u8 => element(30, "Zn", 65.38),
    31u8 => element(31, "Ga", 69.723),
    32u8 => element(32, "Ge", 72.630),
    33u8 => element(33, "As", 74.921_595),
    34u8 => element(34, "Se", 78.971),
    35u8 => element(35, "Br", 79.904),
    36u8 => element(36, "Kr", 83.798),
    37u8 => element(37, "Rb", 85.4678),
    38u8 => element(38, "Sr", 87.62),
    39u8 => element(39, "Y", 88.905_84),
    40u8 => element(40, "Zr", 91.224),
    41u8 => element(41, "Nb", 92.906_37),
    42u8 => element(42, "Mo", 95.95),
    43u8 => element(43, "Tc", 98.0),
    44u8 => element(44, "Ru", 101.07),
    45u8 => element(45, "Rh", 102.905_49),
    46u8 => element(46, "Pd", 106.42),
    47u8 => element(47, "Ag", 107.8682),
    48u8 => element(48, "Cd", 112.414),
    49u8 => element(49, "In", 114.818),
    50u8 => element(50, "Sn", 118.710),
    51u8 => element(51, "Sb", 121.760),
    52u8 => element(52, "Te", 127.60),
    53u8 => element(53, "I", 126.904_47),
    54u8 => element(54, "Xe", 131.293),
    55u8 => element(55, "Cs", 132.905_452),
    56u8 => element(56, "Ba", 137.327),
    57u8 => element(57, "La", 138.905_47),
    58u8 => element(58, "Ce", 140.116),
    59u8 => element(59, "Pr", 140.907_66),
    60u8 => element(60, "Nd", 144.242),
    61u8 => element(61, "Pm", 145.0),
    62u8 => element(62, "Sm", 150.36),
    63u8 => element(63, "Eu", 151.964),
    64u8 => element(64, "Gd", 157.25),
    65u8 => element(65, "Tb", 158.925_35),
    66u8 => element(66, "Dy", 162.500),
    67u8 => element(67, "Ho", 164.930_33),
    68u8 => element(68, "Er", 167.259),
    69u8 => element(69, "Tm", 168.934_22),
    70u8 => element(70, "Yb", 173.045),
    71u8 => element(71, "Lu", 174.9668),
    72u8 => element(72, "Hf", 178.49),
    73u8 => element(73, "Ta", 180.947_88),
    74u8 => element(74, "W", 183.84),
    75u8 => element(75, "Re", 186.207),
    76u8 => element(76, "Os", 190.23),
    77u8 => element(77, "Ir", 192.217),
    78u8 => element(78, "Pt", 195.084),
    79u8 => element(79, "Au", 196.966_570),
    80u8 => element(80, "Hg", 200.592),
    81u8 => element(81, "Tl", 204.38),
    82u8 => element(82, "Pb", 207.2),
    83u8 => element(83, "Bi", 208.980_40),
    84u8 => element(84, "Po", 209.0),
    85u8 => element(85, "At", 210.0),
    86u8 => element(86, "Rn", 222.0),
    87u8 => element(87, "Fr", 223.0),
    88u8 => element(88, "Ra", 226.0),
    89u8 => element(89, "Ac", 227.0),
    90u8 => element(90, "Th", 232.0377),
    91u8 => element(91, "Pa", 231.035_88),
    92u8 => element(92, "U", 238.028_91),
};

pub fn lookup(atomic_number: u8) -> Option<&'static Element> {
    ELEMENTS.get(&atomic_number)
}

pub fn mass_of(atomic_number: u8) -> Option<f64> {
    lookup(atomic_number).map(|e| e.mass_da)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_stored_atomic_numbers() {
        for (key, element) in ELEMENTS.entries() {
            assert_eq!(*key, element.atomic_number);
        }
    }

    #[test]
    fn common_elements_have_expected_masses() {
        assert_eq!(mass_of(1), Some(1.008));
        assert_eq!(mass_of(8), Some(15.999));
        assert_eq!(lookup(18).map(|e| e.symbol), Some("Ar"));
    }

    #[test]
    fn table_is_contiguous_through_uranium() {
        for z in 1..=92u8 {
            assert!(lookup(z).is_some(), "missing element {z}");
        }
    }

    #[test]
    fn transition_metals_are_present() {
        assert_eq!(lookup(22).map(|e| e.symbol), Some("Ti"));
        assert_eq!(lookup(24).map(|e| e.symbol), Some("Cr"));
        assert_eq!(lookup(28).map(|e| e.symbol), Some("Ni"));
        assert_eq!(mass_of(47), Some(107.8682));
        assert_eq!(mass_of(79), Some(196.966_570));
    }

    #[test]
    fn unknown_atomic_number_is_none() {
        assert!(lookup(0).is_none());
        assert!(lookup(119).is_none());
    }
}
