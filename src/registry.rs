//! Scan-scoped dataset registry
//!
//! Holds the canonical copy of every dataset produced by the most recent
//! scan. Starting a scan wipes the previous generation, so identities never
//! outlive the scan that minted them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::dataset::{Dataset, DatasetId};
use crate::error::ScanError;
use crate::identity::resalt;

/// Capability naming one scan generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanToken(pub u64);

#[derive(Debug, Default)]
pub struct DatasetRegistry {
    datasets: HashMap<DatasetId, Dataset>,
    generation: u64,
}

impl DatasetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every dataset and open a new generation
    pub fn begin_scan(&mut self) -> ScanToken {
        self.clear();
        self.generation += 1;
        ScanToken(self.generation)
    }

    pub fn clear(&mut self) {
        self.datasets.clear();
    }

    pub fn current(&self) -> ScanToken {
        ScanToken(self.generation)
    }

    pub fn put(&mut self, dataset: Dataset) {
        self.datasets.insert(dataset.id.clone(), dataset);
    }

    /// Register a dataset, re-salting its id while it collides with one
    /// already minted in this scan
    pub fn put_unique(&mut self, dataset: &mut Dataset) {
        while self.datasets.contains_key(&dataset.id) {
            dataset.id = resalt(&dataset.id);
        }
        self.put(dataset.clone());
    }

    pub fn get(&self, id: &DatasetId) -> Result<&Dataset, ScanError> {
        self.datasets
            .get(id)
            .ok_or_else(|| ScanError::DatasetNotFound(id.clone()))
    }

    pub fn get_mut(&mut self, id: &DatasetId) -> Result<&mut Dataset, ScanError> {
        self.datasets
            .get_mut(id)
            .ok_or_else(|| ScanError::DatasetNotFound(id.clone()))
    }

    /// Reject tokens from any scan but the current one
    pub fn check_token(&self, id: &DatasetId, token: Option<ScanToken>) -> Result<(), ScanError> {
        match token {
            Some(ScanToken(requested)) if requested != self.generation => Err(ScanError::StaleScan {
                id: id.clone(),
                requested,
                current: self.generation,
            }),
            _ => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}
