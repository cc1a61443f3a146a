use crate::parse::smiles::SmilesErrorKind::*;
use crate::prelude::*;
use petgraph::graph::NodeIndex;

#[test]
fn simple() {
    // methane
    smiles!("C");
    // methylene
    smiles!("[CH2]");
    // acetylene
    smiles!("C#C");
    // benzene
    smiles!("c1ccccc1");
    // carbon monoxide
    smiles!("[C-]#[O+]");
    // chlorobenzene
    smiles!("Clc1ccccc1");
}

#[test]
fn counts() {
    for (input, atoms, bonds) in [
        ("CCO", 3, 2),
        ("CC(=O)O", 4, 3),
        ("C1CC1.O", 4, 3),
        ("c1ccc2ccccc2c1", 10, 11),
        ("C(C)(C)(C)C", 5, 4),
        ("C%12CC%12", 3, 3),
    ] {
        let graph = SmilesParser::new(input).parse().unwrap();
        assert_eq!(graph.node_count(), atoms, "{input}");
        assert_eq!(graph.edge_count(), bonds, "{input}");
    }
}

#[test]
fn bracket_atoms() {
    let ammonium = smiles!("[NH4+]");
    let n = ammonium[NodeIndex::new(0)];
    assert_eq!(n.protons, 7);
    assert_eq!(n.charge, 1);
    assert_eq!(n.explicit_hydrogens(), 4);
    assert!(n.data.no_implicit());

    let carbon = smiles!("[13CH4]");
    assert_eq!(carbon[NodeIndex::new(0)].isotope, 13);

    let chloride = smiles!("[Cl-]");
    assert_eq!(chloride[NodeIndex::new(0)].protons, 17);
    assert_eq!(chloride[NodeIndex::new(0)].charge, -1);

    let oxide = smiles!("[O--]");
    assert_eq!(oxide[NodeIndex::new(0)].charge, -2);

    let pyrrole = smiles!("c1cc[nH]c1");
    let n = pyrrole[NodeIndex::new(3)];
    assert!(n.data.aromatic());
    assert_eq!(n.explicit_hydrogens(), 1);
}

#[test]
fn bonds() {
    let graph = smiles!("C=CC#N");
    assert_eq!(
        graph.edge_weights().copied().collect::<Vec<_>>(),
        [Bond::Double, Bond::Single, Bond::Triple]
    );
    let benzene = smiles!("c1ccccc1");
    assert!(benzene.edge_weights().all(|&b| b == Bond::Aromatic));
    let biphenyl = smiles!("c1ccccc1-c1ccccc1");
    assert_eq!(
        biphenyl.edge_weights().filter(|&&b| b == Bond::Single).count(),
        1
    );
    let ez = smiles!("C/C=C\\C");
    assert_eq!(ez.edge_weights().filter(|&&b| b == Bond::Single).count(), 2);
}

#[test]
fn errors() {
    for (input, kind) in [
        ("C1CC", UnclosedLoop(1)),
        ("[Xx]", UnknownElement("Xx".to_string())),
        ("C(C", ExpectedClosingParen),
        ("[CH3", ExpectedClosingBracket),
        ("C=1CC#1", LoopBondMismatch(Bond::Triple, Bond::Double)),
        ("CC)", ExpectedAtom(Some(b')'))),
        ("C11", DuplicateBond),
    ] {
        let err = SmilesParser::new(input).parse().unwrap_err();
        assert_eq!(err.kind, kind, "{input}");
    }
}

#[test]
fn oversized_numbers() {
    let long_ring = format!("C%{0}CC%{0}", "9".repeat(25));
    let long_charge = format!("[C{}]", "+".repeat(200));
    for (input, kind) in [
        ("[C+999]", NumberTooLarge("i8")),
        ("[CH999]", NumberTooLarge("u8")),
        ("[99999C]", NumberTooLarge("u16")),
        (long_ring.as_str(), NumberTooLarge("usize")),
        (long_charge.as_str(), NumberTooLarge("i8")),
        (
            "[CH16]",
            crate::parse::smiles::SmilesErrorKind::TooManyHydrogens(
                crate::structure::TooManyHydrogens(16),
            ),
        ),
    ] {
        let err = SmilesParser::new(input).parse().unwrap_err();
        assert_eq!(err.kind, kind, "{input}");
    }
    let err = SmilesParser::new("[C+999]").parse().unwrap_err();
    assert_eq!(err.index, 3);
    assert_eq!(smiles!("[C+127]")[NodeIndex::new(0)].charge, 127);
}
