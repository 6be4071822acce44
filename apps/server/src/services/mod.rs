// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Service modules: upstream catalog, response cache and usage ledger.

pub mod cache;
pub mod catalog;
pub mod usage;

pub use cache::{CachePolicy, DiskCache};
pub use catalog::SketchfabCatalog;
pub use usage::{UsageAction, UsageLedger};
