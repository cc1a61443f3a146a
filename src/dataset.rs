//! Train/val/test splits of converted molecules, and their on-disk blobs
//!
//! Every blob is a single `bincode` value that is read or written whole. A data directory
//! holds, for each split, a record blob and a graph blob, plus the two dictionaries:
//!
//! ```text
//! <data_dir>/train_records.bin   Vec<MoleculeRecord>
//! <data_dir>/train_graphs.bin    MoleculeSplit
//! <data_dir>/atom_dict.bin       Dictionary
//! <data_dir>/bond_dict.bin       Dictionary
//! ```

use crate::batch::{collate, Batch};
use crate::dictionary::Dictionary;
use crate::record::{MalformedInput, MoleculeRecord};
use crate::sparse::SparseGraph;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::*;

/// A converted molecule and its regression target
pub type Sample = (SparseGraph, Vec<f32>);

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("couldn't access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} isn't a valid blob: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: bincode::Error,
    },
    #[error("record {record} in {} is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        record: usize,
        source: MalformedInput,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli-feats", derive(clap::ValueEnum))]
pub enum Split {
    Train,
    Val,
    Test,
}
impl Split {
    pub const ALL: [Self; 3] = [Self::Train, Self::Val, Self::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Val => "val",
            Self::Test => "test",
        }
    }
}
impl Display for Split {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a dataset lives and how its files are named
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    pub data_dir: PathBuf,
    pub records_suffix: String,
    pub graphs_suffix: String,
}
impl DatasetConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            records_suffix: "_records.bin".to_string(),
            graphs_suffix: "_graphs.bin".to_string(),
        }
    }
    pub fn with_records_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.records_suffix = suffix.into();
        self
    }
    pub fn with_graphs_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.graphs_suffix = suffix.into();
        self
    }

    pub fn records_path(&self, split: Split) -> PathBuf {
        self.data_dir.join(format!("{split}{}", self.records_suffix))
    }
    pub fn graphs_path(&self, split: Split) -> PathBuf {
        self.data_dir.join(format!("{split}{}", self.graphs_suffix))
    }
    pub fn atom_dict_path(&self) -> PathBuf {
        self.data_dir.join("atom_dict.bin")
    }
    pub fn bond_dict_path(&self) -> PathBuf {
        self.data_dir.join("bond_dict.bin")
    }
}

pub fn read_blob<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let bytes = std::fs::read(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    bincode::deserialize(&bytes).map_err(|source| StorageError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_blob<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let bytes = bincode::serialize(value).map_err(|source| StorageError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, bytes).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_records(
    config: &DatasetConfig,
    split: Split,
) -> Result<Vec<MoleculeRecord>, StorageError> {
    read_blob(&config.records_path(split))
}
pub fn save_records(
    config: &DatasetConfig,
    split: Split,
    records: &[MoleculeRecord],
) -> Result<(), StorageError> {
    write_blob(&config.records_path(split), records)
}

/// Read the atom and bond dictionaries, in that order.
pub fn load_dictionaries(config: &DatasetConfig) -> Result<(Dictionary, Dictionary), StorageError> {
    Ok((
        read_blob(&config.atom_dict_path())?,
        read_blob(&config.bond_dict_path())?,
    ))
}
pub fn save_dictionaries(
    config: &DatasetConfig,
    atom_dict: &Dictionary,
    bond_dict: &Dictionary,
) -> Result<(), StorageError> {
    write_blob(&config.atom_dict_path(), atom_dict)?;
    write_blob(&config.bond_dict_path(), bond_dict)
}

/// One split's samples, in load order. Nothing can be added or removed after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoleculeSplit {
    split: Split,
    samples: Vec<Sample>,
}
impl MoleculeSplit {
    /// Convert each record, labelling it with its normalized property.
    ///
    /// Fails on the first malformed record, returning its position along with the error.
    #[instrument(level = "debug", skip(records), fields(records = records.len()))]
    pub fn from_records(
        split: Split,
        records: &[MoleculeRecord],
    ) -> Result<Self, (usize, MalformedInput)> {
        let samples = records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                SparseGraph::from_record(r)
                    .map(|graph| (graph, vec![r.logp_sa_cycle_normalized]))
                    .map_err(|err| (i, err))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { split, samples })
    }

    /// Load and convert the record blob for `split`.
    pub fn load(config: &DatasetConfig, split: Split) -> Result<Self, StorageError> {
        let records = load_records(config, split)?;
        Self::from_records(split, &records).map_err(|(record, source)| {
            warn!(%split, record, "malformed record");
            StorageError::Malformed {
                path: config.records_path(split),
                record,
                source,
            }
        })
    }

    pub fn split(&self) -> Split {
        self.split
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }
}
impl<'a> IntoIterator for &'a MoleculeSplit {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;
    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// All three splits with the dictionaries their features index into
#[derive(Debug, Clone)]
pub struct MoleculeDataset {
    pub train: MoleculeSplit,
    pub val: MoleculeSplit,
    pub test: MoleculeSplit,
    pub atom_dict: Dictionary,
    pub bond_dict: Dictionary,
}
impl MoleculeDataset {
    /// Load previously converted graph blobs.
    #[instrument(level = "info", skip_all, fields(data_dir = %config.data_dir.display()))]
    pub fn load(config: &DatasetConfig) -> Result<Self, StorageError> {
        let start = Instant::now();
        let [train, val, test] = Split::ALL.map(|s| read_blob(&config.graphs_path(s)));
        let (atom_dict, bond_dict) = load_dictionaries(config)?;
        let this = Self {
            train: train?,
            val: val?,
            test: test?,
            atom_dict,
            bond_dict,
        };
        this.log_sizes(start);
        Ok(this)
    }

    /// Build every split from its record blob.
    #[instrument(level = "info", skip_all, fields(data_dir = %config.data_dir.display()))]
    pub fn prepare(config: &DatasetConfig) -> Result<Self, StorageError> {
        let start = Instant::now();
        let [train, val, test] = Split::ALL.map(|s| MoleculeSplit::load(config, s));
        let (atom_dict, bond_dict) = load_dictionaries(config)?;
        let this = Self {
            train: train?,
            val: val?,
            test: test?,
            atom_dict,
            bond_dict,
        };
        this.log_sizes(start);
        Ok(this)
    }

    /// Write the graph blobs and dictionaries that [`Self::load`] reads.
    pub fn save(&self, config: &DatasetConfig) -> Result<(), StorageError> {
        for split in [&self.train, &self.val, &self.test] {
            write_blob(&config.graphs_path(split.split()), split)?;
        }
        save_dictionaries(config, &self.atom_dict, &self.bond_dict)?;
        debug!(data_dir = %config.data_dir.display(), "saved dataset");
        Ok(())
    }

    pub fn split(&self, split: Split) -> &MoleculeSplit {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }
    pub fn num_atom_type(&self) -> usize {
        self.atom_dict.len()
    }
    pub fn num_bond_type(&self) -> usize {
        self.bond_dict.len()
    }

    /// Merge samples into a training batch.
    pub fn collate(samples: &[Sample]) -> Result<Batch, MalformedInput> {
        collate(samples)
    }

    fn log_sizes(&self, start: Instant) {
        info!(
            train = self.train.len(),
            val = self.val.len(),
            test = self.test.len(),
            atom_types = self.num_atom_type(),
            bond_types = self.num_bond_type(),
            elapsed = ?start.elapsed(),
            "loaded dataset"
        );
    }
}
