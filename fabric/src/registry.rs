// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashSet;

use crate::network::RouterRank;

/// Normalize a router pair so that both orders map to one key.
pub(crate) fn edge_key(a: RouterRank, b: RouterRank) -> (RouterRank, RouterRank) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// The set of logical edges accepted so far.
///
/// (a, b) and (b, a) are the same edge. Builders visit the same pair from
/// both ends, so a repeated insertion is a no-op rather than an error.
#[derive(Debug, Default)]
pub struct EdgeRegistry {
    edges: HashSet<(RouterRank, RouterRank)>,
}

impl EdgeRegistry {
    pub fn new() -> Self {
        Self {
            edges: HashSet::new(),
        }
    }

    /// Record the edge; returns false if it was already present.
    pub fn insert(&mut self, a: RouterRank, b: RouterRank) -> bool {
        debug_assert_ne!(a, b, "routers cannot link to themselves");
        let inserted = self.edges.insert(edge_key(a, b));
        if !inserted {
            log::trace!("edge {} -- {} already present", a, b);
        }
        inserted
    }
}
