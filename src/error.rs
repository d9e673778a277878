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

//! Error types for the storage client.

use thiserror::Error;

/// Storage client errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record has the requested id
    #[error("not found")]
    NotFound,

    /// A record with the same id is already present
    #[error("resource exists")]
    AlreadyExists,

    /// The embedded store failed
    #[error("storage backend: {0}")]
    Backend(#[from] sled::Error),

    /// A record could not be encoded or a stored value could not be decoded
    #[error("record encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether this is an internal failure rather than a lookup outcome.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, StoreError::Backend(_) | StoreError::Encoding(_))
    }
}

#[cfg(test)]
mod tests {
    use super::StoreError;

    #[test]
    fn error_display_messages() {
        assert_eq!(StoreError::NotFound.to_string(), "not found");
        assert_eq!(StoreError::AlreadyExists.to_string(), "resource exists");

        let decode = serde_json::from_str::<u8>("x").unwrap_err();
        assert!(StoreError::from(decode).to_string().starts_with("record encoding: "));
    }

    #[test]
    fn lookup_outcomes_are_not_storage_failures() {
        assert!(!StoreError::NotFound.is_storage_failure());
        assert!(!StoreError::AlreadyExists.is_storage_failure());

        let decode = serde_json::from_str::<u8>("x").unwrap_err();
        assert!(StoreError::Encoding(decode).is_storage_failure());
        assert!(StoreError::Backend(sled::Error::Unsupported("test".into())).is_storage_failure());
    }
}
