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

//! Link weights for dimension-order routing.
//!
//! The consuming router picks among candidate output links by weight, lowest
//! first, so the dimension with weight 1 is always exhausted before the one
//! with weight 2.

use serde::{Deserialize, Serialize};

/// Routing priority of a link; lower is traversed first.
pub type Weight = u32;

pub const PRIMARY: Weight = 1;
pub const SECONDARY: Weight = 2;

/// The dimension a link runs in, as far as routing priority goes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    /// Along a grid row.
    Row,
    /// Along a grid column.
    Column,
    /// Single hop between any two routers.
    Direct,
    /// Around a single ring.
    Ring,
    /// Around one of the independent half-rings of a hierarchical ring.
    HalfRing,
    /// Along the central ring of a hierarchical ring.
    Spine,
}

impl Dimension {
    pub fn weight(&self) -> Weight {
        match self {
            Self::Row | Self::Direct | Self::Ring | Self::Spine => PRIMARY,
            Self::Column | Self::HalfRing => SECONDARY,
        }
    }
}

#[cfg(test)]
mod weight_tests {
    use super::*;

    #[test]
    fn test_rows_before_columns() {
        assert!(Dimension::Row.weight() < Dimension::Column.weight());
        assert!(Dimension::Spine.weight() < Dimension::HalfRing.weight());
        assert_eq!(Dimension::Direct.weight(), Dimension::Ring.weight());
    }
}
