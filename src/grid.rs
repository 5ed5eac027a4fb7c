//! Client-side grid controller.
//!
//! Maintains the editable mirror of the product collection, the per-row
//! edit-mode state machine, and local validation. The mirror is only mutated
//! here, either by a user action or by reconciling a settled server response,
//! so a row can never be half-applied: every commit either swaps in the
//! server's canonical record or leaves the mirror as it was.

use crate::client::ProductApi;
use crate::error::{GridError, ValidationError};
use crate::model::{NewProduct, Product};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const TOAST_DURATION: Duration = Duration::from_secs(3);

/// User-facing notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
    Warning,
}

/// A notification for the UI shell to display and auto-dismiss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub severity: Severity,
    pub duration: Duration,
}

impl Toast {
    fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            duration: TOAST_DURATION,
        }
    }
}

/// Identity of a grid row. Unsaved drafts and persisted records are distinct
/// lifecycle states, so they are distinct variants rather than a sign
/// convention on one integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKey {
    /// Local-only placeholder, strictly negative, never sent as an update.
    Draft(i64),
    /// Committed record id, positive, assigned by the store.
    Persisted(i64),
}

impl RowKey {
    pub fn raw(self) -> i64 {
        match self {
            RowKey::Draft(n) | RowKey::Persisted(n) => n,
        }
    }

    pub fn is_draft(self) -> bool {
        matches!(self, RowKey::Draft(_))
    }
}

/// Editable fields of a row, id excluded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFields {
    pub name: String,
    pub reference: String,
    pub price: f64,
    pub rating: u8,
}

impl From<&Product> for RowFields {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            reference: product.reference.clone(),
            price: product.price,
            rating: product.rating,
        }
    }
}

impl RowFields {
    fn as_candidate(&self) -> NewProduct {
        NewProduct {
            id: None,
            name: self.name.clone(),
            reference: self.reference.clone(),
            price: self.price,
            rating: self.rating,
        }
    }

    fn as_product(&self, id: i64) -> Product {
        Product {
            id,
            name: self.name.clone(),
            reference: self.reference.clone(),
            price: self.price,
            rating: self.rating,
        }
    }
}

/// One entry in the mirror.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub key: RowKey,
    pub fields: RowFields,
}

impl From<&Product> for GridRow {
    fn from(product: &Product) -> Self {
        Self {
            key: RowKey::Persisted(product.id),
            fields: RowFields::from(product),
        }
    }
}

/// Per-row edit mode. `View` is the rest state; at most one `Editing`
/// session exists per row at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMode {
    View,
    Editing,
}

/// The grid controller: mirror, edit-mode map, validation, and the
/// commit/delete/add protocols. Single-owner; all mutation goes through
/// `&mut self`.
pub struct GridController<C> {
    client: C,
    rows: Vec<GridRow>,
    editing: HashMap<RowKey, RowMode>,
    toasts: Vec<Toast>,
}

impl<C: ProductApi> GridController<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            rows: Vec::new(),
            editing: HashMap::new(),
            toasts: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn row(&self, key: RowKey) -> Option<&GridRow> {
        self.rows.iter().find(|row| row.key == key)
    }

    /// Current mode of a row, `None` if the key is not in the mirror.
    pub fn mode(&self, key: RowKey) -> Option<RowMode> {
        self.row(key)?;
        Some(*self.editing.get(&key).unwrap_or(&RowMode::View))
    }

    /// Drain pending notifications, oldest first.
    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    fn toast(&mut self, message: impl Into<String>, severity: Severity) {
        self.toasts.push(Toast::new(message, severity));
    }

    /// Replace the mirror with the server's collection.
    pub async fn load(&mut self) -> Result<(), GridError> {
        let fetched = self.client.fetch_all().await;
        match fetched {
            Ok(products) => {
                self.rows = products.iter().map(GridRow::from).collect();
                self.editing.clear();
                debug!(count = self.rows.len(), "catalog loaded into grid");
                self.toast("Products loaded", Severity::Info);
                Ok(())
            }
            Err(error) => {
                warn!(%error, "failed to load products");
                self.toast("Failed to load products", Severity::Error);
                Err(error.into())
            }
        }
    }

    /// Prepend a fresh draft row and open its edit session. The placeholder
    /// is strictly more negative than every existing key, so simultaneous
    /// unsaved drafts never collide.
    pub fn add_row(&mut self) -> RowKey {
        let floor = self
            .rows
            .iter()
            .map(|row| row.key.raw())
            .min()
            .unwrap_or(0)
            .min(0);
        let key = RowKey::Draft(floor - 1);
        self.rows.insert(
            0,
            GridRow {
                key,
                fields: RowFields::default(),
            },
        );
        self.editing.insert(key, RowMode::Editing);
        key
    }

    /// `View -> Editing`. Fails if the row is unknown or already has an open
    /// edit session.
    pub fn begin_edit(&mut self, key: RowKey) -> Result<(), GridError> {
        if self.row(key).is_none() {
            return Err(GridError::UnknownRow);
        }
        if self.editing.get(&key) == Some(&RowMode::Editing) {
            return Err(GridError::AlreadyEditing);
        }
        self.editing.insert(key, RowMode::Editing);
        Ok(())
    }

    /// `Editing -> View`, discarding pending editor values. The mirror keeps
    /// its last known-good value; nothing reaches the store.
    pub fn cancel_edit(&mut self, key: RowKey) -> Result<(), GridError> {
        if self.row(key).is_none() {
            return Err(GridError::UnknownRow);
        }
        if self.editing.remove(&key).is_none() {
            return Err(GridError::NotEditing);
        }
        Ok(())
    }

    fn validate(&self, key: RowKey, fields: &RowFields) -> Result<(), ValidationError> {
        if fields.price < 0.0 {
            return Err(ValidationError::NegativePrice);
        }
        let duplicate = self
            .rows
            .iter()
            .any(|row| row.key != key && row.fields.reference == fields.reference);
        if duplicate {
            return Err(ValidationError::DuplicateReference);
        }
        Ok(())
    }

    /// Commit the edited values of a row.
    ///
    /// Validation runs before any network call; a validation failure keeps
    /// the row in edit mode. Drafts become create requests and are swapped
    /// for the canonical record on success; persisted rows become update
    /// requests and are reconciled by key. Returns the (possibly new) key of
    /// the committed row.
    pub async fn commit(&mut self, key: RowKey, edited: RowFields) -> Result<RowKey, GridError> {
        if self.row(key).is_none() {
            return Err(GridError::UnknownRow);
        }
        if self.editing.get(&key) != Some(&RowMode::Editing) {
            return Err(GridError::NotEditing);
        }
        if let Err(error) = self.validate(key, &edited) {
            self.toast(error.to_string(), Severity::Error);
            return Err(error.into());
        }

        match key {
            RowKey::Draft(_) => {
                let created = self.client.create(&edited.as_candidate()).await;
                match created {
                    Ok(created) => {
                        let canonical = GridRow::from(&created);
                        let new_key = canonical.key;
                        self.replace_row(key, canonical);
                        self.editing.remove(&key);
                        self.toast("Product added successfully", Severity::Success);
                        Ok(new_key)
                    }
                    Err(error) => {
                        // Keep the user's data as a local-only draft.
                        warn!(%error, "create failed, keeping draft locally");
                        self.replace_row(key, GridRow { key, fields: edited });
                        self.editing.remove(&key);
                        self.toast("Failed to save product", Severity::Error);
                        Err(error.into())
                    }
                }
            }
            RowKey::Persisted(id) => {
                let updated = self.client.update(&edited.as_product(id)).await;
                match updated {
                    Ok(updated) => {
                        self.replace_row(key, GridRow::from(&updated));
                        self.editing.remove(&key);
                        self.toast("Product updated successfully", Severity::Success);
                        Ok(RowKey::Persisted(updated.id))
                    }
                    Err(error) => {
                        // Mirror unchanged; the row stays in edit mode so the
                        // user can retry or cancel back to the known-good value.
                        warn!(%error, id, "update failed, mirror unchanged");
                        self.toast("Failed to save product", Severity::Error);
                        Err(error.into())
                    }
                }
            }
        }
    }

    /// Remove a row. Drafts vanish locally without a network call; persisted
    /// rows are deleted on the server first and kept in the mirror if that
    /// fails.
    pub async fn delete_row(&mut self, key: RowKey) -> Result<(), GridError> {
        if self.row(key).is_none() {
            return Err(GridError::UnknownRow);
        }
        match key {
            RowKey::Draft(_) => {
                self.remove_row(key);
                Ok(())
            }
            RowKey::Persisted(id) => {
                let deleted = self.client.delete(id).await;
                match deleted {
                    Ok(()) => {
                        self.remove_row(key);
                        self.toast("Product deleted successfully", Severity::Success);
                        Ok(())
                    }
                    Err(error) => {
                        warn!(%error, id, "delete failed, mirror unchanged");
                        self.toast("Product deletion failed", Severity::Error);
                        Err(error.into())
                    }
                }
            }
        }
    }

    fn replace_row(&mut self, key: RowKey, replacement: GridRow) {
        if let Some(row) = self.rows.iter_mut().find(|row| row.key == key) {
            *row = replacement;
        }
    }

    fn remove_row(&mut self, key: RowKey) {
        self.rows.retain(|row| row.key != key);
        self.editing.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use async_trait::async_trait;

    /// A client that must never be reached; placeholder assignment is a
    /// purely local concern.
    struct UnreachableClient;

    #[async_trait]
    impl ProductApi for UnreachableClient {
        async fn fetch_all(&self) -> Result<Vec<Product>, ClientError> {
            unreachable!("no network call expected")
        }
        async fn create(&self, _: &NewProduct) -> Result<Product, ClientError> {
            unreachable!("no network call expected")
        }
        async fn update(&self, _: &Product) -> Result<Product, ClientError> {
            unreachable!("no network call expected")
        }
        async fn delete(&self, _: i64) -> Result<(), ClientError> {
            unreachable!("no network call expected")
        }
    }

    #[test]
    fn drafts_get_strictly_decreasing_placeholders() {
        let mut grid = GridController::new(UnreachableClient);
        assert_eq!(grid.add_row(), RowKey::Draft(-1));
        assert_eq!(grid.add_row(), RowKey::Draft(-2));
        assert_eq!(grid.add_row(), RowKey::Draft(-3));
    }

    #[test]
    fn placeholder_clears_existing_persisted_ids() {
        let mut grid = GridController::new(UnreachableClient);
        grid.rows = vec![GridRow {
            key: RowKey::Persisted(5),
            fields: RowFields::default(),
        }];
        // Positive ids never drag the placeholder above -1.
        assert_eq!(grid.add_row(), RowKey::Draft(-1));
    }

    #[test]
    fn new_draft_opens_in_edit_mode_at_top() {
        let mut grid = GridController::new(UnreachableClient);
        let key = grid.add_row();
        assert_eq!(grid.mode(key), Some(RowMode::Editing));
        assert_eq!(grid.rows()[0].key, key);
    }

    #[tokio::test]
    async fn draft_delete_is_local_only() {
        let mut grid = GridController::new(UnreachableClient);
        let key = grid.add_row();
        grid.delete_row(key).await.unwrap();
        assert!(grid.rows().is_empty());
        assert!(grid.take_toasts().is_empty());
    }

    #[test]
    fn double_begin_edit_is_rejected() {
        let mut grid = GridController::new(UnreachableClient);
        grid.rows = vec![GridRow {
            key: RowKey::Persisted(1),
            fields: RowFields::default(),
        }];
        grid.begin_edit(RowKey::Persisted(1)).unwrap();
        assert!(matches!(
            grid.begin_edit(RowKey::Persisted(1)),
            Err(GridError::AlreadyEditing)
        ));
    }
}
