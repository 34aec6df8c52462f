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

use serde::Serialize;

use crate::network::RouterRank;

/// Interface for a 2D projection of the topology
pub trait Layout2D {
    /// The X extent in a virtual canvas
    fn get_max_x(&self) -> usize;
    /// The Y extent in a virtual canvas
    fn get_max_y(&self) -> usize;
    /// Router coordinates in the virtual canvas
    fn get_node_coordinates(&self, rank: RouterRank) -> Coordinates;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Coordinates {
    pub x: usize,
    pub y: usize,
}

impl Coordinates {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Straight-line distance, in grid units.
    pub fn distance(&self, other: &Coordinates) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}
