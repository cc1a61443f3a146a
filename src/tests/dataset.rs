use super::macros::*;
use crate::dataset::*;
use crate::prelude::*;

/// Write records and dictionaries for a tiny dataset, returning the records
fn populate(config: &DatasetConfig) -> Vec<MoleculeRecord> {
    let mut atoms = Dictionary::new();
    let mut bonds = Dictionary::new();
    let records = ["CCO", "CC(=O)O", "c1ccccc1", "C#N", "OC1CC1"]
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mut r = MoleculeRecord::from_smiles(s, &mut atoms, &mut bonds).unwrap();
            r.logp_sa_cycle_normalized = i as f32;
            r
        })
        .collect::<Vec<_>>();
    save_records(config, Split::Train, &records[..3]).unwrap();
    save_records(config, Split::Val, &records[3..4]).unwrap();
    save_records(config, Split::Test, &records[4..]).unwrap();
    save_dictionaries(config, &atoms, &bonds).unwrap();
    records
}

fn words(dict: &Dictionary) -> Vec<(usize, String, usize)> {
    dict.iter().map(|(i, w, n)| (i, w.to_string(), n)).collect()
}

#[test]
fn paths() {
    let config = DatasetConfig::new("/data/zinc").with_graphs_suffix(".graphs");
    assert_eq!(
        config.records_path(Split::Val),
        std::path::Path::new("/data/zinc/val_records.bin")
    );
    assert_eq!(
        config.graphs_path(Split::Test),
        std::path::Path::new("/data/zinc/test.graphs")
    );
    assert_eq!(
        config.atom_dict_path(),
        std::path::Path::new("/data/zinc/atom_dict.bin")
    );
}

#[test]
fn prepare_save_load() {
    trace_capture!();
    let dir = tempfile::tempdir().unwrap();
    let config = DatasetConfig::new(dir.path());
    let records = populate(&config);

    let dataset = MoleculeDataset::prepare(&config).unwrap();
    assert_eq!(dataset.train.len(), 3);
    assert_eq!(dataset.val.len(), 1);
    assert_eq!(dataset.test.len(), 1);
    assert_eq!(dataset.split(Split::Val).split(), Split::Val);
    assert_eq!(dataset.num_bond_type(), 5);

    for (i, (graph, label)) in dataset.train.iter().enumerate() {
        assert_eq!(label, &[i as f32]);
        assert_eq!(graph.node_count(), records[i].num_atom);
        assert_eq!(graph.edge_count(), records[i].bond_entries());
    }
    let (benzene, _) = dataset.train.get(2).unwrap();
    assert_eq!(benzene.edge_count(), 12);
    assert!(dataset.train.get(3).is_none());

    dataset.save(&config).unwrap();
    let loaded = MoleculeDataset::load(&config).unwrap();
    assert_eq!(loaded.train, dataset.train);
    assert_eq!(loaded.val, dataset.val);
    assert_eq!(loaded.test, dataset.test);
    assert_eq!(words(&loaded.atom_dict), words(&dataset.atom_dict));
    assert_eq!(words(&loaded.bond_dict), words(&dataset.bond_dict));

    let batch = MoleculeDataset::collate(loaded.train.as_slice()).unwrap();
    assert_eq!(batch.labels.data, [0.0, 1.0, 2.0]);
    assert_eq!(batch.norm_n.len(), 3 + 4 + 6);
}

#[test]
fn records_survive_storage() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatasetConfig::new(dir.path()).with_records_suffix(".rec");
    let records = populate(&config);
    assert!(dir.path().join("train.rec").exists());
    assert_eq!(load_records(&config, Split::Train).unwrap(), &records[..3]);
    let (atoms, bonds) = load_dictionaries(&config).unwrap();
    assert_eq!(
        crate::convert::record_to_smiles(&records[2], &atoms, &bonds, false).unwrap(),
        "c1ccccc1"
    );
}

#[test]
fn missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatasetConfig::new(dir.path().join("nowhere"));
    assert!(matches!(
        MoleculeDataset::load(&config),
        Err(StorageError::Io { .. })
    ));
    assert!(matches!(
        MoleculeSplit::load(&config, Split::Train),
        Err(StorageError::Io { .. })
    ));
}

#[test]
fn corrupt_blob() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatasetConfig::new(dir.path());
    std::fs::write(config.records_path(Split::Train), b"garbage").unwrap();
    let err = MoleculeSplit::load(&config, Split::Train).unwrap_err();
    assert!(matches!(err, StorageError::Corrupt { .. }), "{err}");
}

#[test]
fn malformed_record_blob() {
    trace_capture!();
    let dir = tempfile::tempdir().unwrap();
    let config = DatasetConfig::new(dir.path());
    let good = MoleculeRecord::new(2, 1);
    let mut short = MoleculeRecord::new(3, 1);
    short.bond_type = nalgebra::DMatrix::zeros(2, 2);
    save_records(&config, Split::Train, &[good.clone(), short.clone()]).unwrap();

    let err = MoleculeSplit::load(&config, Split::Train).unwrap_err();
    assert!(
        matches!(err, StorageError::Malformed { record: 1, .. }),
        "{err}"
    );
    assert!(matches!(
        MoleculeSplit::from_records(Split::Val, &[short, good]),
        Err((0, MalformedInput::Length { .. }))
    ));
}
