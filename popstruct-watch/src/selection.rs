//! Dataset selection and bulk deletion
//!
//! Selection is scoped to the page on screen. Deleting goes through an
//! explicit confirmation step: only a [`ConfirmedDeletion`] can be executed,
//! and it can only be obtained from [`DeletionRequest::confirm`].

use popstruct_client::Result;
use popstruct_core::domain::dataset::DatasetId;
use popstruct_core::domain::page::DatasetPage;
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::source::DatasetStore;
use crate::state::WatchFailure;

/// Datasets ticked on the current page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSelection {
    ids: BTreeSet<DatasetId>,
}

impl DatasetSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `id`, or deselects it when already selected
    pub fn toggle(&mut self, id: DatasetId) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    /// Selects every dataset of `page`, or clears the selection when all of
    /// them are already selected
    pub fn toggle_all(&mut self, page: &DatasetPage) {
        let page_ids: BTreeSet<DatasetId> = page.ids().into_iter().collect();

        if !page_ids.is_empty() && self.ids == page_ids {
            self.ids.clear();
        } else {
            self.ids = page_ids;
        }
    }

    /// Drops ids that are not on `page`
    pub fn retain_page(&mut self, page: &DatasetPage) {
        self.ids.retain(|id| page.contains(*id));
    }

    pub fn contains(&self, id: DatasetId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> Vec<DatasetId> {
        self.ids.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Pending bulk deletion awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRequest {
    ids: Vec<DatasetId>,
}

impl DeletionRequest {
    /// Returns `None` when nothing is selected
    pub fn new(selection: &DatasetSelection) -> Option<Self> {
        if selection.is_empty() {
            return None;
        }
        Some(Self {
            ids: selection.ids(),
        })
    }

    pub fn ids(&self) -> &[DatasetId] {
        &self.ids
    }

    /// Question to show before confirming
    pub fn prompt(&self) -> String {
        match self.ids.len() {
            1 => "Are you sure you want to delete this dataset? This cannot be undone."
                .to_string(),
            n => format!(
                "Are you sure you want to delete {} datasets? This cannot be undone.",
                n
            ),
        }
    }

    pub fn confirm(self) -> ConfirmedDeletion {
        ConfirmedDeletion { ids: self.ids }
    }
}

/// Bulk deletion the user agreed to
#[derive(Debug)]
pub struct ConfirmedDeletion {
    ids: Vec<DatasetId>,
}

impl ConfirmedDeletion {
    /// Deletes every dataset, then refetches `page`
    ///
    /// Every id is attempted even after a failure. The listing is refetched
    /// whatever happened, so the caller never shows an optimistic result.
    pub async fn execute(
        self,
        store: &dyn DatasetStore,
        page: u32,
        page_size: u32,
    ) -> BulkDeleteOutcome {
        info!("Deleting {} dataset(s)", self.ids.len());

        let mut deleted = Vec::new();
        let mut failures = Vec::new();

        for id in self.ids {
            match store.delete_dataset(id).await {
                Ok(()) => deleted.push(id),
                Err(e) => {
                    warn!("Failed to delete dataset {}: {}", id, e);
                    failures.push((id, WatchFailure::from(&e)));
                }
            }
        }

        let listing = store.list_datasets(page, page_size).await;
        if let Err(e) = &listing {
            warn!("Failed to refresh datasets after deletion: {}", e);
        }

        BulkDeleteOutcome {
            deleted,
            failures,
            listing,
        }
    }
}

/// Result of a bulk deletion
#[derive(Debug)]
pub struct BulkDeleteOutcome {
    pub deleted: Vec<DatasetId>,
    pub failures: Vec<(DatasetId, WatchFailure)>,
    /// Listing fetched after the deletions
    pub listing: Result<DatasetPage>,
}

impl BulkDeleteOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Summary line for the user
    pub fn summary(&self) -> String {
        if self.is_success() {
            format!("Deleted {} dataset(s)", self.deleted.len())
        } else {
            format!(
                "Deleted {} dataset(s), {} failed",
                self.deleted.len(),
                self.failures.len()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockDatasets, dataset};
    use std::sync::atomic::Ordering;

    fn page(ids: &[DatasetId]) -> DatasetPage {
        DatasetPage {
            datasets: ids.iter().copied().map(dataset).collect(),
            total: ids.len() as u64,
            page: 1,
            page_size: 10,
        }
    }

    #[test]
    fn test_toggle() {
        let mut selection = DatasetSelection::new();
        selection.toggle(3);
        selection.toggle(1);
        assert_eq!(selection.ids(), vec![1, 3]);

        selection.toggle(3);
        assert_eq!(selection.ids(), vec![1]);
        assert!(!selection.contains(3));
    }

    #[test]
    fn test_toggle_all_is_page_scoped() {
        let current = page(&[1, 2, 3]);
        let mut selection = DatasetSelection::new();

        selection.toggle(2);
        selection.toggle_all(&current);
        assert_eq!(selection.ids(), vec![1, 2, 3]);

        selection.toggle_all(&current);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_retain_page_drops_stale_ids() {
        let mut selection = DatasetSelection::new();
        selection.toggle_all(&page(&[1, 2, 3]));

        selection.retain_page(&page(&[2, 3, 4]));
        assert_eq!(selection.ids(), vec![2, 3]);
    }

    #[test]
    fn test_empty_selection_has_no_request() {
        assert!(DeletionRequest::new(&DatasetSelection::new()).is_none());
    }

    #[test]
    fn test_prompt_mentions_count() {
        let mut selection = DatasetSelection::new();
        selection.toggle(1);
        let single = DeletionRequest::new(&selection).unwrap();
        assert!(single.prompt().contains("this dataset"));

        selection.toggle(2);
        let multiple = DeletionRequest::new(&selection).unwrap();
        assert!(multiple.prompt().contains("2 datasets"));
    }

    #[tokio::test]
    async fn test_bulk_delete_issues_one_call_per_id() {
        let store = MockDatasets::new([1, 2, 3, 4], &[]);
        let mut selection = DatasetSelection::new();
        selection.toggle(1);
        selection.toggle(2);
        selection.toggle(4);

        let outcome = DeletionRequest::new(&selection)
            .unwrap()
            .confirm()
            .execute(&*store, 1, 10)
            .await;

        assert!(outcome.is_success());
        assert_eq!(*store.deletes.lock().unwrap(), vec![1, 2, 4]);
        assert_eq!(outcome.deleted, vec![1, 2, 4]);
        assert_eq!(outcome.listing.unwrap().ids(), vec![3]);
        assert_eq!(store.list_fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_still_attempts_all_and_refetches() {
        let store = MockDatasets::new([1, 2, 3], &[2]);
        let mut selection = DatasetSelection::new();
        selection.toggle_all(&page(&[1, 2, 3]));

        let outcome = DeletionRequest::new(&selection)
            .unwrap()
            .confirm()
            .execute(&*store, 1, 10)
            .await;

        assert!(!outcome.is_success());
        assert_eq!(store.deletes.lock().unwrap().len(), 3);
        assert_eq!(outcome.deleted, vec![1, 3]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, 2);
        assert_eq!(outcome.summary(), "Deleted 2 dataset(s), 1 failed");

        // The refetched listing, not the selection, says what is left
        let listing = outcome.listing.unwrap();
        assert_eq!(listing.ids(), vec![2]);
        assert_eq!(store.remaining(), vec![2]);

        selection.retain_page(&listing);
        assert_eq!(selection.ids(), vec![2]);
    }
}
