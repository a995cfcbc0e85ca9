// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

use super::{Episode, Subscription};

/// One incremental update fetch from the catalog.
///
/// Every field is optional on the wire. An absent list means "no changes of
/// that kind", never "remove everything"; removal references are
/// subscription titles. The timestamp is the cursor to use as `since` on the
/// next fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBatch {
    #[serde(default)]
    pub add: Vec<Subscription>,
    #[serde(default)]
    pub remove: Vec<String>,
    #[serde(default)]
    pub updates: Vec<Episode>,
    #[serde(default)]
    pub timestamp: i64,
}
