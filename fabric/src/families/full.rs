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

/// Every router is linked to every other router.
///
/// All links have weight 1: with single-hop reachability there is no cyclic
/// channel dependency to break. Links carry no port direction.
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

    let mut ctx = SynthesisContext::new(Family::FullyConnected, grid, config, &placements);
    for src in 0..routers {
        for dst in (0..routers).filter(|&dst| dst != src) {
            ctx.link(src, dst, Dimension::Direct);
        }
    }
    let topo = ctx.finish(None);
    if log::log_enabled!(log::Level::Debug) {
        for link in topo.logical_edges() {
            log::debug!(
                "{} -- {} spans {:.2}",
                link.src,
                link.dst,
                topo.distance(link.src, link.dst)
            );
        }
    }
    Ok(topo)
}
