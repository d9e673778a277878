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

//! Service configuration from command line flags and environment.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Payments Service - HTTP API for payment records
///
/// Serves `/payments` from an embedded store file. Every flag can also be
/// set through the environment variable shown in `--help`.
#[derive(Parser, Debug, Clone)]
#[command(name = "payments-service")]
#[command(about = "Resource API for payment records", long_about = None)]
pub struct Config {
    /// Path to the embedded store
    #[arg(long, env = "PAYMENTS_DB_PATH", value_name = "PATH", default_value = "data.db")]
    pub db_path: PathBuf,

    /// Address to listen on
    #[arg(long, env = "PAYMENTS_LISTEN", value_name = "ADDR", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Time in-flight requests get to finish after a shutdown signal
    #[arg(long, env = "PAYMENTS_SHUTDOWN_GRACE_MS", value_name = "MILLIS", default_value_t = 500)]
    pub shutdown_grace_ms: u64,
}

impl Config {
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}
