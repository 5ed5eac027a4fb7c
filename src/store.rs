//! JSON-file-backed product repository.
//!
//! The catalog is a single JSON array document rewritten in full on every
//! mutation. All mutations run under one lock so read-modify-write cycles
//! cannot interleave, and the document is replaced atomically (write to a
//! temp file in the same directory, then rename) so a concurrent reader never
//! observes a torn file.

use crate::error::StoreError;
use crate::model::{NewProduct, Product, ProductPatch};
use parking_lot::Mutex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Repository interface over the product collection.
///
/// The HTTP layer and tests depend on this trait rather than the concrete
/// store, so an in-memory or database-backed implementation can stand in.
pub trait ProductRepository: Send + Sync {
    fn list(&self) -> Result<Vec<Product>, StoreError>;
    fn create(&self, candidate: NewProduct) -> Result<Product, StoreError>;
    fn update(&self, id: i64, patch: ProductPatch) -> Result<Product, StoreError>;
    fn delete(&self, id: i64) -> Result<(), StoreError>;
}

/// The durable store: an in-memory collection mirroring a JSON document on
/// disk. Writes happen before the mutating call returns success; a failed
/// write rolls the in-memory collection back and propagates the error.
pub struct JsonFileStore {
    path: PathBuf,
    products: Mutex<Vec<Product>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing document yields an empty catalog;
    /// the file is created on the first mutation.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let products = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Vec::new()
        };
        info!(path = %path.display(), count = products.len(), "catalog opened");
        Ok(Self {
            path,
            products: Mutex::new(products),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the whole document. The temp file lands in the document's own
    /// directory so the final rename stays on one filesystem.
    fn persist(&self, products: &[Product]) -> Result<(), StoreError> {
        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = match dir {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new_in(".")?,
        };
        serde_json::to_writer_pretty(&mut tmp, products)?;
        tmp.as_file_mut().write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!(path = %self.path.display(), count = products.len(), "catalog persisted");
        Ok(())
    }

    fn next_id(products: &[Product]) -> i64 {
        // max+1, so deleting the highest id frees that id for reuse.
        1 + products.iter().map(|p| p.id).max().unwrap_or(0)
    }

    fn reference_taken(products: &[Product], reference: &str, except_id: Option<i64>) -> bool {
        products
            .iter()
            .any(|p| Some(p.id) != except_id && p.reference == reference)
    }
}

impl ProductRepository for JsonFileStore {
    fn list(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.lock().clone())
    }

    fn create(&self, candidate: NewProduct) -> Result<Product, StoreError> {
        let mut products = self.products.lock();
        if Self::reference_taken(&products, &candidate.reference, None) {
            return Err(StoreError::ReferenceInUse(candidate.reference));
        }
        let product = Product {
            id: Self::next_id(&products),
            name: candidate.name,
            reference: candidate.reference,
            price: candidate.price,
            rating: candidate.rating,
        };
        products.push(product.clone());
        if let Err(error) = self.persist(&products) {
            products.pop();
            return Err(error);
        }
        debug!(id = product.id, reference = %product.reference, "product created");
        Ok(product)
    }

    fn update(&self, id: i64, patch: ProductPatch) -> Result<Product, StoreError> {
        let mut products = self.products.lock();
        let position = products
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let merged = patch.apply_to(&products[position]);
        if Self::reference_taken(&products, &merged.reference, Some(id)) {
            return Err(StoreError::ReferenceInUse(merged.reference));
        }
        let previous = std::mem::replace(&mut products[position], merged.clone());
        if let Err(error) = self.persist(&products) {
            products[position] = previous;
            return Err(error);
        }
        debug!(id, "product updated");
        Ok(merged)
    }

    fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut products = self.products.lock();
        let Some(position) = products.iter().position(|p| p.id == id) else {
            // Absent id is a successful no-op; nothing to rewrite.
            return Ok(());
        };
        let removed = products.remove(position);
        if let Err(error) = self.persist(&products) {
            products.insert(position, removed);
            return Err(error);
        }
        debug!(id, "product deleted");
        Ok(())
    }
}
