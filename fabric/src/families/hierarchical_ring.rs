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

//! Hierarchical ring.
//!
//! Rows are paired, (0, 1), (2, 3), ..., and each pair carries two
//! independent half-rings: one snaking through the left half of the
//! columns and its mirror image on the right half. Half-ring links have
//! weight 2. On top of them a central ring runs through the two spine
//! columns (mid - 1, mid) of every row but the first and the last; its links
//! have weight 1 and form the escape channel.
//!
//! A 4x4 grid, with the central ring marked `==`/`#`:
//!
//! <pre>
//! 12 -- 13    14 -- 15
//! |      |    |      |
//! 8 --- 9 ==== 10 -- 11
//!       #      #
//! 4 --- 5 ==== 6 --- 7
//! |      |    |      |
//! 0 --- 1     2 --- 3
//! </pre>
//!
//! On taller grids some spine links are also half-ring links. They are
//! inserted once, with weight 1, and belong to the central ring.

use std::collections::HashSet;

use crate::config::SynthesisConfiguration;
use crate::context::SynthesisContext;
use crate::endpoint::{AssignmentPolicy, Endpoint};
use crate::error::{Error, Result};
use crate::escape::{EscapePlan, RingSegment, Segment, Side};
use crate::families::{Family, Grid};
use crate::registry::edge_key;
use crate::topology::Topology;
use crate::weight::Dimension;

/// The smallest grid extent with two independent halves per row pair and
/// two interior rows for the central ring.
const MIN_EXTENT: usize = 4;

pub(crate) fn synthesize(
    config: &SynthesisConfiguration,
    endpoints: &[Endpoint],
) -> Result<Topology> {
    let grid = Grid::new(config.mesh_rows, config.num_cpus)?;
    if grid.rows % 2 != 0 || grid.cols % 2 != 0 {
        return Err(Error::OddGrid {
            rows: grid.rows,
            cols: grid.cols,
        });
    }
    if grid.rows < MIN_EXTENT || grid.cols < MIN_EXTENT {
        return Err(Error::GridTooSmall {
            rows: grid.rows,
            cols: grid.cols,
        });
    }
    let placements = AssignmentPolicy::UniformStripe.assign(endpoints, grid.size())?;
    let half_rings = half_rings(&grid)?;
    let central = central_ring(&grid)?;
    let spine = central
        .edges()
        .map(|(a, b)| edge_key(a, b))
        .collect::<HashSet<_>>();

    let mut ctx = SynthesisContext::new(Family::HierarchicalRing, grid, config, &placements);
    for segment in half_rings.iter() {
        for (a, b) in segment.edges() {
            let edge = edge_key(a, b);
            let dim = if spine.contains(&edge) {
                Dimension::Spine
            } else {
                Dimension::HalfRing
            };
            ctx.link(edge.0, edge.1, dim);
        }
    }
    for (a, b) in central.edges() {
        let (src, dst) = edge_key(a, b);
        ctx.link(src, dst, Dimension::Spine);
    }

    let mut plan = EscapePlan::new(config.escape_rank_policy);
    for segment in half_rings {
        plan.add_segment(segment);
    }
    plan.add_segment(central);
    Ok(ctx.finish(Some(plan)))
}

/// Left half-rings for every row pair, then the right ones.
///
/// Each runs east along the first row of its pair and back west along the
/// second.
fn half_rings(grid: &Grid) -> Result<Vec<Segment>> {
    let mid = grid.cols / 2;
    let mut rings = Vec::with_capacity(grid.rows);
    for &side in [Side::Left, Side::Right].iter() {
        let cols = match side {
            Side::Left => 0..mid,
            Side::Right => mid..grid.cols,
        };
        for row_pair in 0..grid.rows / 2 {
            let (first, second) = (2 * row_pair, 2 * row_pair + 1);
            let routers = cols
                .clone()
                .map(|col| grid.rank(first, col))
                .chain(cols.clone().rev().map(|col| grid.rank(second, col)))
                .collect();
            rings.push(Segment::new(
                RingSegment::HalfRing { row_pair, side },
                routers,
            )?);
        }
    }
    Ok(rings)
}

/// The spine: up the left spine column, back down the right one.
fn central_ring(grid: &Grid) -> Result<Segment> {
    let mid = grid.cols / 2;
    let interior = 1..grid.rows - 1;
    let routers = interior
        .clone()
        .map(|row| grid.rank(row, mid - 1))
        .chain(interior.rev().map(|row| grid.rank(row, mid)))
        .collect();
    Segment::new(RingSegment::Central, routers)
}
