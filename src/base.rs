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

//! Core resource envelope shared by every record type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base attributes carried by every resource.
///
/// The `id` is supplied by the caller and is the only lookup key. `version`
/// is stored and returned verbatim; nothing validates or increments it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub version: i64,
    pub organisation_id: String,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// A record the storage client can persist.
///
/// Each record type lives in its own collection, which also names the
/// URL segment it is served under.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection (store tree and path segment) holding records of this type.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);
}

#[cfg(test)]
mod tests {
    use super::Resource;

    #[test]
    fn missing_fields_decode_to_defaults() {
        let resource: Resource = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(resource.id, "abc");
        assert_eq!(resource.kind, "");
        assert_eq!(resource.version, 0);
        assert_eq!(resource.organisation_id, "");
    }

    #[test]
    fn type_field_is_renamed() {
        let resource = Resource {
            kind: "Payment".to_string(),
            id: "p-1".to_string(),
            version: 3,
            organisation_id: "org".to_string(),
        };
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["type"], "Payment");
        assert_eq!(json["version"], 3);
        assert_eq!(resource.to_string(), "Payment/p-1");
    }
}
