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

//! # Payments Service
//!
//! This library provides a resource-oriented HTTP API for payment records,
//! persisted in an embedded, file-based key-value store.
//!
//! ## Core Components
//!
//! - [`Client`]: Storage client with fetch-one, fetch-all, create, update and delete
//! - [`Payment`]: The payment resource and its nested party, charge and FX details
//! - [`ResourceHandler`]: Capability set mapping HTTP requests onto the storage client
//! - [`server`]: Route table, listener and graceful shutdown
//!
//! ## Example
//!
//! ```
//! use payments_service::{Client, Payment, StoreError};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let client = Client::open(dir.path().join("data.db")).unwrap();
//!
//! // Ids are supplied by the caller and must be unique
//! client.create(&Payment::new("4ee3a8d8")).unwrap();
//! assert!(matches!(client.create(&Payment::new("4ee3a8d8")), Err(StoreError::AlreadyExists)));
//!
//! let payment: Payment = client.fetch_one("4ee3a8d8").unwrap();
//! assert_eq!(payment.resource.id, "4ee3a8d8");
//! ```
//!
//! ## Thread Safety
//!
//! The storage client is shared between request handlers through an `Arc`.
//! Creates of the same id race safely: exactly one of them succeeds.

mod base;
pub mod config;
pub mod error;
pub mod handlers;
pub mod payment;
pub mod server;
mod store;

pub use base::{Record, Resource};
pub use config::Config;
pub use error::StoreError;
pub use handlers::{ApiError, Payments, ResourceHandler};
pub use payment::{Payment, PaymentAttributes, PaymentCharges, PaymentFx, PaymentParty, SenderCharge};
pub use store::Client;
