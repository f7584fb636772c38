/* This file is part of HostRank (https://hostrank.net)
 *
 * Copyright (C) 2023-2026 HostRank developers
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::fmt;

/// Main result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// General crate errors. Protocol and store implementations map their
/// internal failures onto these variants; the scanner only ever inspects
/// `ServiceStopped`, everything else is recorded as text.
#[derive(Debug, Clone)]
pub enum Error {
    Io(std::io::ErrorKind),

    /// Host address could not be resolved to any IP address
    AddrResolveFailed(String),

    /// TCP dial or session establishment failed
    ConnectFailed(String),

    /// Dial finished but the protocol exchange did not
    RpcFailed(String),

    /// The adaptive per-scan deadline expired
    ScanTimeout,

    /// The benchmark did not finish within its allotted time
    BenchmarkTimeout,

    /// Backing store rejected or failed a read/write
    StoreFailed(String),

    /// The subsystem is shutting down
    ServiceStopped,
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(ref err) => write!(f, "io error: {:?}", err),
            Error::AddrResolveFailed(ref err) => write!(f, "address resolution failed: {}", err),
            Error::ConnectFailed(ref err) => write!(f, "connection failed: {}", err),
            Error::RpcFailed(ref err) => write!(f, "RPC failed: {}", err),
            Error::ScanTimeout => f.write_str("scan timed out"),
            Error::BenchmarkTimeout => f.write_str("benchmark timed out"),
            Error::StoreFailed(ref err) => write!(f, "store error: {}", err),
            Error::ServiceStopped => f.write_str("service stopped"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.kind())
    }
}
