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
use crate::families::{Family, Grid};
use crate::topology::Topology;
use crate::weight::Dimension;

/// A 2D mesh with one router per cpu.
///
/// Row links have weight 1 and column links weight 2, so the consuming
/// router resolves the row offset before the column offset (XY routing).
/// There is no wraparound.
///
/// <pre>
/// 8 --- 9 --- 10 -- 11   ^
/// |     |     |     |    |
/// 4 --- 5 --- 6 --- 7    columns, weight 2
/// |     |     |     |    |
/// 0 --- 1 --- 2 --- 3    v
/// < -- rows, weight 1 -->
/// </pre>
pub(crate) fn synthesize(
    config: &SynthesisConfiguration,
    endpoints: &[Endpoint],
) -> Result<Topology> {
    let grid = Grid::new(config.mesh_rows, config.num_cpus)?;
    let placements = AssignmentPolicy::UniformStripe.assign(endpoints, grid.size())?;

    let mut ctx = SynthesisContext::new(Family::Mesh, grid, config, &placements);
    for (row, col) in grid.cells() {
        let src = grid.rank(row, col);
        if col + 1 < grid.cols {
            ctx.link(src, grid.rank(row, col + 1), Dimension::Row);
        }
        if row + 1 < grid.rows {
            ctx.link(src, grid.rank(row + 1, col), Dimension::Column);
        }
    }
    Ok(ctx.finish(None))
}
