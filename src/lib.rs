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

/// Crate error types
pub mod error;

/// Host database: entries, scanner, benchmark engine
pub mod hostdb;

/// Renter-host protocol surface consumed by the scanner
pub mod rhp;

/// Async lifecycle utilities
pub mod system;

/// Various utilities
pub mod util;

pub use error::{Error, Result};
pub use hostdb::{HostDb, HostDbPtr};
