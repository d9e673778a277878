// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Storage client over the embedded key-value store.
//!
//! Every [`Record`] type lives in its own sled tree named after
//! [`Record::COLLECTION`], keyed by id, holding the JSON-encoded record.
//!
//! # Consistency
//!
//! - `create` inserts with a compare-and-swap against an absent key, so of
//!   several concurrent creates for one id exactly one succeeds.
//! - `update` only ever replaces an existing value; it never inserts.
//! - Every mutation is flushed before returning, so a successful call is on disk.
//!
//! Nothing is cached between calls.

use crate::base::Record;
use crate::error::StoreError;
use sled::{Db, Tree};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Storage client owning the embedded database.
///
/// Cheap to share: wrap it in an `Arc` and hand it to each handler.
#[derive(Debug)]
pub struct Client {
    path: PathBuf,
    db: Db,
}

impl Client {
    /// Opens (or creates) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the database cannot be opened,
    /// e.g. because another process holds its lock.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let db = sled::open(&path)?;
        debug!(path = %path.display(), "opened store");
        Ok(Client { path, db })
    }

    /// Location of the store on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes any buffered state to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    fn tree<R: Record>(&self) -> Result<Tree, StoreError> {
        Ok(self.db.open_tree(R::COLLECTION)?)
    }

    /// Fetches a single record by id.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] - No record has that id.
    pub fn fetch_one<R: Record>(&self, id: &str) -> Result<R, StoreError> {
        let value = self.tree::<R>()?.get(id.as_bytes())?.ok_or(StoreError::NotFound)?;
        Ok(serde_json::from_slice(&value)?)
    }

    /// Fetches every record of type `R` in key order.
    ///
    /// An empty collection yields an empty vector.
    pub fn fetch_all<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        self.tree::<R>()?
            .iter()
            .values()
            .map(|value| -> Result<R, StoreError> { Ok(serde_json::from_slice(&value?)?) })
            .collect()
    }

    /// Persists a new record.
    ///
    /// # Errors
    ///
    /// - [`StoreError::AlreadyExists`] - A record with the same id is present.
    pub fn create<R: Record>(&self, record: &R) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec(record)?;
        let tree = self.tree::<R>()?;

        // Atomic insert-if-absent.
        if tree
            .compare_and_swap(record.id().as_bytes(), None::<&[u8]>, Some(encoded))?
            .is_err()
        {
            return Err(StoreError::AlreadyExists);
        }

        self.flush()?;
        debug!(collection = R::COLLECTION, id = record.id(), "created record");
        Ok(())
    }

    /// Replaces the record with the same id.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] - No record has that id; nothing is written.
    pub fn update<R: Record>(&self, record: &R) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec(record)?;
        let previous = self
            .tree::<R>()?
            .fetch_and_update(record.id().as_bytes(), |current| {
                current.map(|_| encoded.clone())
            })?;

        if previous.is_none() {
            return Err(StoreError::NotFound);
        }

        self.flush()?;
        debug!(collection = R::COLLECTION, id = record.id(), "updated record");
        Ok(())
    }

    /// Removes the record with the given id.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] - No record has that id.
    pub fn delete<R: Record>(&self, id: &str) -> Result<(), StoreError> {
        if self.tree::<R>()?.remove(id.as_bytes())?.is_none() {
            return Err(StoreError::NotFound);
        }

        self.flush()?;
        debug!(collection = R::COLLECTION, id, "deleted record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Payment;

    fn open_temp() -> (tempfile::TempDir, Client) {
        let dir = tempfile::tempdir().unwrap();
        let client = Client::open(dir.path().join("test.db")).unwrap();
        (dir, client)
    }

    #[test]
    fn path_is_remembered() {
        let (dir, client) = open_temp();
        assert_eq!(client.path(), dir.path().join("test.db"));
    }

    #[test]
    fn stored_value_is_plain_json() {
        let (_dir, client) = open_temp();
        client.create(&Payment::new("p-1")).unwrap();

        let raw = client.db.open_tree("payments").unwrap().get("p-1").unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(json["id"], "p-1");
        assert_eq!(json["type"], "Payment");
    }

    #[test]
    fn corrupt_value_is_a_storage_failure() {
        let (_dir, client) = open_temp();
        client.db.open_tree("payments").unwrap().insert("bad", &b"not json"[..]).unwrap();

        let err = client.fetch_one::<Payment>("bad").unwrap_err();
        assert!(err.is_storage_failure());
        assert!(client.fetch_all::<Payment>().unwrap_err().is_storage_failure());
    }
}
