use super::super::macros::*;
use crate::prelude::*;

fn canon(input: &str) -> String {
    let graph = SmilesParser::new(input).parse().unwrap();
    generate_smiles(&graph, SmilesConfig::new())
}

#[test]
fn canonical_forms() {
    trace_capture!();
    for (input, output) in [
        ("C", "C"),
        ("CCO", "CCO"),
        ("OCC", "CCO"),
        ("OC(=O)C", "CC(=O)O"),
        ("CC(=O)O", "CC(=O)O"),
        ("c1ccccc1", "c1ccccc1"),
        ("n1ccccc1", "c1ccncc1"),
        ("C1CC1.O", "O.C1CC1"),
        ("[NH4+]", "[NH4+]"),
        ("[13CH4]", "[13CH4]"),
        ("c1ccccc1-c1ccccc1", "c1ccc(cc1)-c1ccccc1"),
    ] {
        assert_eq!(canon(input), output, "{input}");
    }
}

#[test]
fn equal_molecules_agree() {
    for group in [
        &["CCO", "OCC", "C(O)C"][..],
        &["CC(=O)O", "OC(C)=O", "O=C(O)C"],
        &["c1ccncc1", "n1ccccc1", "c1cnccc1"],
        &["Oc1ccccc1", "c1ccc(O)cc1", "c1cc(O)ccc1"],
        &["CC(C)CC", "CCC(C)C", "C(C)(C)CC"],
    ] {
        let first = canon(group[0]);
        for input in &group[1..] {
            assert_eq!(canon(input), first, "{input}");
        }
    }
}

#[test]
fn reparse_is_stable() {
    trace_capture!();
    for input in [
        "CC(=O)Oc1ccccc1C(=O)O",
        "c1ccc2ccccc2c1",
        "C1CCC2CCCCC2C1",
        "c1cc[nH]c1",
        "C[N+](C)(C)C",
        "CC(C)[O-]",
        "C#CC=CC1CC1",
        "C1CC1.C1CC1.O",
    ] {
        let once = canon(input);
        assert_eq!(canon(&once), once, "{input}");
    }
}

#[test]
fn input_order() {
    let graph = smiles!("OCC");
    assert_eq!(generate_smiles(&graph, SmilesConfig::fast_roundtrip()), "OCC");
}

#[test]
fn isotopes_optional() {
    let graph = smiles!("[13CH4]");
    let cfg = SmilesConfig {
        isotopes: false,
        ..SmilesConfig::new()
    };
    assert_eq!(generate_smiles(&graph, cfg), "C");
}

#[test]
fn ring_digits_reused() {
    let graph = smiles!("C1CC1C1CC1");
    let out = generate_smiles(&graph, SmilesConfig::new());
    assert!(!out.contains('2'), "{out}");
    assert_eq!(canon(&out), out);
}
