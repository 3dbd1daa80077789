//! Catalog and association merging.
//!
//! Both mergers work on a `ProductIndex` owned by the caller for the duration of
//! one run. Identity defects and unmatched feed entries are absorbed here and
//! reported through `EngineMetrics`; nothing in this module fails a run.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use prodintel_core::{Entity, SourceRecord, fields};
use prodintel_observability::{AssociatedSource, EngineMetrics};

use crate::product::{CatalogEntry, MasterProduct};

/// Entities in insertion order, indexed by their identity.
#[derive(Debug, Clone)]
pub struct EntityIndex<E: Entity> {
    items: Vec<E>,
    positions: HashMap<E::Id, usize>,
}

/// Master products in catalog order.
pub type ProductIndex = EntityIndex<MasterProduct>;

impl<E: Entity> Default for EntityIndex<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<E: Entity> EntityIndex<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &E::Id) -> Option<&E> {
        self.positions.get(id).map(|&i| &self.items[i])
    }

    pub fn get_mut(&mut self, id: &E::Id) -> Option<&mut E> {
        self.positions.get(id).map(|&i| &mut self.items[i])
    }

    pub fn contains(&self, id: &E::Id) -> bool {
        self.positions.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[E] {
        &self.items
    }

    pub fn as_mut_slice(&mut self) -> &mut [E] {
        &mut self.items
    }

    /// Insert or overwrite (last write wins).
    ///
    /// An overwrite keeps the slot of the first occurrence so insertion order stays stable.
    /// Returns `true` when an existing entity was replaced.
    pub fn upsert(&mut self, entity: E) -> bool {
        match self.positions.get(entity.id()) {
            Some(&i) => {
                self.items[i] = entity;
                true
            }
            None => {
                self.positions.insert(entity.id().clone(), self.items.len());
                self.items.push(entity);
                false
            }
        }
    }

    pub fn into_vec(self) -> Vec<E> {
        self.items
    }
}

impl ProductIndex {
    pub fn into_products(self) -> Vec<MasterProduct> {
        self.into_vec()
    }
}

/// Records from the three associated feeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Associations {
    pub movements: Vec<SourceRecord>,
    pub metrics: Vec<SourceRecord>,
    pub snapshots: Vec<SourceRecord>,
}

/// Outcome counts of one association merge.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct AssociationSummary {
    pub movements_attached: usize,
    pub metrics_attached: usize,
    pub snapshots_attached: usize,
    pub dropped: usize,
}

/// Build the master product set from normalized catalog records.
///
/// - Records without a usable `product_id` are rejected (never indexed under a placeholder).
/// - Duplicate ids overwrite the earlier record and are flagged as a data-integrity warning.
pub fn merge_catalog<I>(records: I, metrics: &EngineMetrics) -> ProductIndex
where
    I: IntoIterator<Item = SourceRecord>,
{
    let mut index = ProductIndex::new();

    for (row, record) in records.into_iter().enumerate() {
        let entry = match CatalogEntry::from_record(record) {
            Ok(entry) => entry,
            Err(e) => {
                metrics.record_missing_id();
                warn!(row, error = %e, "catalog record rejected: missing product_id");
                continue;
            }
        };

        let product_id = entry.product_id.clone();
        if index.upsert(MasterProduct::from_entry(entry)) {
            metrics.record_duplicate_overwrite();
            warn!(row, product_id = %product_id, "duplicate product_id in catalog; later record wins");
        }
    }

    info!(products = index.len(), "catalog merged");
    index
}

/// Fold the associated feeds onto their master products.
///
/// Movements are appended in feed order; metrics and snapshots are set, a later
/// record replacing an earlier one. Records whose id matches no product are
/// dropped and counted per source.
pub fn merge_associations(
    index: &mut ProductIndex,
    associations: Associations,
    metrics: &EngineMetrics,
) -> AssociationSummary {
    let mut summary = AssociationSummary::default();

    for record in associations.movements {
        match lookup(index, &record, AssociatedSource::Movements, metrics) {
            Some(product) => {
                product.push_movement(record);
                summary.movements_attached += 1;
            }
            None => summary.dropped += 1,
        }
    }

    for record in associations.metrics {
        match lookup(index, &record, AssociatedSource::Metrics, metrics) {
            Some(product) => {
                if product.set_performance_metrics(record).is_some() {
                    debug!(product_id = %product.product_id(), "performance metrics replaced by later record");
                }
                summary.metrics_attached += 1;
            }
            None => summary.dropped += 1,
        }
    }

    for record in associations.snapshots {
        match lookup(index, &record, AssociatedSource::Snapshots, metrics) {
            Some(product) => {
                if product.set_marketplace_snapshot(record).is_some() {
                    debug!(product_id = %product.product_id(), "marketplace snapshot replaced by later record");
                }
                summary.snapshots_attached += 1;
            }
            None => summary.dropped += 1,
        }
    }

    info!(
        movements = summary.movements_attached,
        metrics = summary.metrics_attached,
        snapshots = summary.snapshots_attached,
        dropped = summary.dropped,
        "associations merged"
    );
    summary
}

fn lookup<'a>(
    index: &'a mut ProductIndex,
    record: &SourceRecord,
    source: AssociatedSource,
    metrics: &EngineMetrics,
) -> Option<&'a mut MasterProduct> {
    let found = match record.product_id() {
        Ok(id) => index.get_mut(&id),
        Err(_) => None,
    };
    if found.is_none() {
        metrics.record_unmatched(source);
        debug!(
            source = source.as_str(),
            product_id = record.get(fields::PRODUCT_ID).unwrap_or("<none>"),
            "associated record dropped: no matching product"
        );
    }
    found
}
