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

//! Topology family builders.
//!
//! Each family is one variant of a closed enum and one module with a
//! `synthesize` function of the same shape. A builder first validates the
//! configuration and places the endpoints, then opens a synthesis context,
//! proposes its edges and hands the context back as a finished `Topology`.
//! Nothing is created before validation succeeds.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::config::SynthesisConfiguration;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::layout::Coordinates;
use crate::network::RouterRank;
use crate::topology::Topology;

mod flattened_butterfly;
mod full;
mod hierarchical_ring;
mod mesh;
mod ring;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Family {
    Mesh,
    Ring,
    FullyConnected,
    FlattenedButterfly,
    HierarchicalRing,
}

impl Family {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mesh => "Mesh",
            Self::Ring => "Ring",
            Self::FullyConnected => "FullyConnected",
            Self::FlattenedButterfly => "FlattenedButterfly",
            Self::HierarchicalRing => "HierarchicalRing",
        }
    }

    pub fn synthesize(
        &self,
        config: &SynthesisConfiguration,
        endpoints: &[Endpoint],
    ) -> Result<Topology> {
        log::debug!(
            "synthesizing {} for {} endpoints: {:?}",
            self.name(),
            endpoints.len(),
            config
        );
        match self {
            Self::Mesh => mesh::synthesize(config, endpoints),
            Self::Ring => ring::synthesize(config, endpoints),
            Self::FullyConnected => full::synthesize(config, endpoints),
            Self::FlattenedButterfly => flattened_butterfly::synthesize(config, endpoints),
            Self::HierarchicalRing => hierarchical_ring::synthesize(config, endpoints),
        }
    }

    /// Where a router is drawn, and which way its ports face.
    ///
    /// Rings fold their second row back so that the cycle closes on the
    /// left-hand side.
    pub fn coordinates(&self, grid: &Grid, rank: RouterRank) -> Coordinates {
        let (row, col) = (grid.row(rank), grid.col(rank));
        match self {
            Self::Ring if row % 2 == 1 => Coordinates::new(grid.cols - 1 - col, row),
            _ => Coordinates::new(col, row),
        }
    }
}

/// Row-major arrangement of routers: rank = col + row * cols.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
}

impl Grid {
    pub fn new(rows: usize, routers: usize) -> Result<Self> {
        if routers == 0 {
            return Err(Error::NoRouters);
        }
        if rows == 0 || rows > routers {
            return Err(Error::InvalidRowCount { rows, routers });
        }
        if routers % rows != 0 {
            return Err(Error::UnevenGrid { rows, routers });
        }
        Ok(Self {
            rows,
            cols: routers / rows,
        })
    }

    pub fn size(&self) -> usize {
        self.rows * self.cols
    }

    pub fn rank(&self, row: usize, col: usize) -> RouterRank {
        col + row * self.cols
    }

    pub fn row(&self, rank: RouterRank) -> usize {
        rank / self.cols
    }

    pub fn col(&self, rank: RouterRank) -> usize {
        rank % self.cols
    }

    /// All (row, col) positions in rank order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        (0..self.rows).cartesian_product(0..self.cols)
    }
}

/// Router count for the families that put several cpus on one router.
fn concentrated_routers(config: &SynthesisConfiguration) -> Result<usize> {
    let (cpus, concentration) = (config.num_cpus, config.concentration_factor);
    if concentration == 0 || cpus % concentration != 0 {
        return Err(Error::ConcentrationMismatch {
            cpus,
            concentration,
        });
    }
    match cpus / concentration {
        0 => Err(Error::NoRouters),
        routers => Ok(routers),
    }
}

/// Synthesize the topology selected by the configuration.
pub fn synthesize(config: &SynthesisConfiguration, endpoints: &[Endpoint]) -> Result<Topology> {
    config.topology.synthesize(config, endpoints)
}
