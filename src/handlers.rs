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

//! HTTP handlers for resources.
//!
//! A [`ResourceHandler`] is the capability set {list, get-one, create,
//! update, delete} for one resource type. Each call is stateless: path id
//! and raw body in, response out.
//!
//! | Operation | Success | Failures |
//! |-----------|---------|----------|
//! | `get_all` | 200 + JSON array | 500 |
//! | `get_one` | 200 + JSON record | 404, 500 |
//! | `create`  | 201 | 400 (malformed body, missing id, duplicate id), 500 |
//! | `update`  | 200 | 400 (malformed body), 404, 500 |
//! | `delete`  | 200 | 404, 500 |
//!
//! Failure responses have empty bodies. Storage failures are logged here and
//! never described to the client.

use crate::base::Record;
use crate::error::StoreError;
use crate::payment::Payment;
use crate::store::Client;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};

/// Request handling errors, each mapping to one status code.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body is not a valid resource document
    #[error("malformed request body: {0}")]
    Malformed(#[source] serde_json::Error),

    /// No id was supplied for the resource
    #[error("no id supplied")]
    MissingId,

    /// Storage client failure or lookup outcome
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The blocking task running the handler panicked or was cancelled
    #[error("handler task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Malformed(_) | ApiError::MissingId => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::AlreadyExists) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        status.into_response()
    }
}

/// Capability set for serving one resource type.
///
/// Methods are synchronous; the router runs them on the blocking pool.
pub trait ResourceHandler: Send + Sync + 'static {
    /// Path segment the resource is served under.
    const COLLECTION: &'static str;

    fn get_all(&self) -> Result<Response, ApiError>;

    fn get_one(&self, id: &str) -> Result<Response, ApiError>;

    /// Creates a resource. The path `id` wins over any id in the body.
    fn create(&self, id: String, body: &[u8]) -> Result<Response, ApiError>;

    /// Replaces a resource wholesale. The path `id` wins over any id in the body.
    fn update(&self, id: String, body: &[u8]) -> Result<Response, ApiError>;

    fn delete(&self, id: &str) -> Result<Response, ApiError>;
}

/// Handlers for payment resources.
#[derive(Debug, Clone)]
pub struct Payments {
    client: Arc<Client>,
}

impl Payments {
    pub fn new(client: Arc<Client>) -> Self {
        Payments { client }
    }

    fn decode(body: &[u8]) -> Result<Payment, ApiError> {
        serde_json::from_slice(body).map_err(|e| {
            warn!(error = %e, "error decoding payment request");
            ApiError::Malformed(e)
        })
    }
}

impl ResourceHandler for Payments {
    const COLLECTION: &'static str = Payment::COLLECTION;

    fn get_all(&self) -> Result<Response, ApiError> {
        let payments = self.client.fetch_all::<Payment>()?;
        Ok(Json(payments).into_response())
    }

    fn get_one(&self, id: &str) -> Result<Response, ApiError> {
        let payment = self.client.fetch_one::<Payment>(id)?;
        Ok(Json(payment).into_response())
    }

    fn create(&self, id: String, body: &[u8]) -> Result<Response, ApiError> {
        let mut payment = Self::decode(body)?;
        payment.set_id(id);
        if payment.id().is_empty() {
            return Err(ApiError::MissingId);
        }

        self.client.create(&payment)?;
        Ok(StatusCode::CREATED.into_response())
    }

    fn update(&self, id: String, body: &[u8]) -> Result<Response, ApiError> {
        let mut payment = Self::decode(body)?;
        payment.set_id(id);

        self.client.update(&payment)?;
        Ok(StatusCode::OK.into_response())
    }

    fn delete(&self, id: &str) -> Result<Response, ApiError> {
        self.client.delete::<Payment>(id)?;
        Ok(StatusCode::OK.into_response())
    }
}
