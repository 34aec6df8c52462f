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

use crate::config::SynthesisConfiguration;
use crate::context::SynthesisContext;
use crate::endpoint::{AssignmentPolicy, Endpoint};
use crate::error::Result;
use crate::families::{concentrated_routers, Family, Grid};
use crate::topology::Topology;
use crate::weight::Dimension;

/// A 2D flattened butterfly.
///
/// Every row is fully connected with weight 1 links and every column is
/// fully connected with weight 2 links. Any router reaches any other in at
/// most one row hop followed by one column hop.
pub(crate) fn synthesize(
    config: &SynthesisConfiguration,
    endpoints: &[Endpoint],
) -> Result<Topology> {
    let routers = concentrated_routers(config)?;
    let grid = Grid::new(config.mesh_rows, routers)?;
    let placements = AssignmentPolicy::TypedConcentration {
        num_dirs: config.num_dirs,
    }
    .assign(endpoints, routers)?;

    let mut ctx = SynthesisContext::new(Family::FlattenedButterfly, grid, config, &placements);
    for (row, col) in grid.cells() {
        let src = grid.rank(row, col);
        // both passes visit each pair from either end; the registry keeps
        // the first proposal
        for x in 1..grid.cols {
            ctx.link(src, grid.rank(row, (col + x) % grid.cols), Dimension::Row);
        }
        for y in 1..grid.rows {
            ctx.link(src, grid.rank((row + y) % grid.rows, col), Dimension::Column);
        }
    }
    Ok(ctx.finish(None))
}
