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
use crate::error::{Error, Result};
use crate::escape::{EscapePlan, RingSegment, Segment};
use crate::families::{concentrated_routers, Family, Grid};
use crate::topology::Topology;
use crate::weight::Dimension;

/// Rings are always laid out over two rows.
const RING_ROWS: usize = 2;

/// A single bidirectional ring over all routers.
///
/// Router i links to router (i + 1) mod N. The routers are drawn over two
/// rows, the second one folded back, so the cycle runs east along the
/// first row, up, west along the second row and down again:
///
/// <pre>
/// 7 <-- 6 <-- 5 <-- 4
/// |                 ^
/// v                 |
/// 0 --> 1 --> 2 --> 3
/// </pre>
///
/// All links have weight 1. The ring itself is the escape segment, and its
/// traversal order is the rank order, so each edge's escape rank is the rank
/// of the router it leaves.
pub(crate) fn synthesize(
    config: &SynthesisConfiguration,
    endpoints: &[Endpoint],
) -> Result<Topology> {
    let routers = concentrated_routers(config)?;
    if routers % 2 != 0 {
        return Err(Error::OddRouterCount(routers));
    }
    if routers < 4 {
        return Err(Error::RingTooSmall(routers));
    }
    if config.mesh_rows != RING_ROWS {
        log::debug!(
            "ring ignores mesh_rows = {}, using {}",
            config.mesh_rows,
            RING_ROWS
        );
    }
    let grid = Grid::new(RING_ROWS, routers)?;
    let placements = AssignmentPolicy::TypedConcentration {
        num_dirs: config.num_dirs,
    }
    .assign(endpoints, routers)?;
    let segment = Segment::new(RingSegment::Ring, (0..routers).collect())?;

    let mut ctx = SynthesisContext::new(Family::Ring, grid, config, &placements);
    for (src, dst) in segment.edges() {
        ctx.link(src, dst, Dimension::Ring);
    }
    let mut plan = EscapePlan::new(config.escape_rank_policy);
    plan.add_segment(segment);
    Ok(ctx.finish(Some(plan)))
}

#[cfg(test)]
mod topology_tests {
    use super::*;
    use crate::endpoint::standard_endpoints;
    use crate::escape::EscapeRankPolicy;
    use crate::network::Port;
    use crate::tests::{check_well_formed, config};
    use std::collections::HashSet;

    #[test]
    fn test_ring_cycle() {
        let _logger = env_logger::builder().is_test(true).try_init();
        let endpoints = standard_endpoints(16, 8, 1);
        let topo = synthesize(&config(Family::Ring, 16, 4, 2), &endpoints).unwrap();
        check_well_formed(&topo, &endpoints);
        assert_eq!(topo.grid().rows, 2);
        assert_eq!(topo.routers().len(), 8);
        assert_eq!(topo.logical_edge_count(), 8);
        assert!(topo.internal_links().iter().all(|l| l.weight == 1));

        // following successor links from router 0 visits every router once
        let mut visited = HashSet::new();
        let mut current = 0;
        loop {
            assert!(visited.insert(current));
            assert_eq!(topo.degree(current), 2);
            current = topo
                .logical_edges()
                .find(|l| l.src == current)
                .map(|l| l.dst)
                .unwrap();
            if current == 0 {
                break;
            }
        }
        assert_eq!(visited.len(), 8);
    }

    #[test]
    fn test_ring_escape_ranks() {
        let endpoints = standard_endpoints(8, 4, 0);
        let topo = synthesize(&config(Family::Ring, 8, 2, 1), &endpoints).unwrap();
        for link in topo.logical_edges() {
            let rank = link.escape.unwrap();
            assert_eq!(rank.segment, RingSegment::Ring);
            assert_eq!(rank.ordinal, link.src);
            assert!(link.is_escape());
        }
        for router in topo.routers() {
            assert_eq!(router.escape_rank, Some(router.rank));
        }

        // the identity policy agrees on a single ring
        let mut legacy = config(Family::Ring, 8, 2, 1);
        legacy.escape_rank_policy = EscapeRankPolicy::RouterRank;
        let legacy = synthesize(&legacy, &endpoints).unwrap();
        assert_eq!(
            legacy
                .internal_links()
                .iter()
                .map(|l| l.escape)
                .collect::<Vec<_>>(),
            topo.internal_links()
                .iter()
                .map(|l| l.escape)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_ring_ports() {
        let endpoints = standard_endpoints(8, 0, 0);
        let topo = synthesize(&config(Family::Ring, 8, 2, 1), &endpoints).unwrap();
        let ports = topo
            .logical_edges()
            .map(|l| (l.src, l.src_port.unwrap(), l.dst_port.unwrap()))
            .collect::<Vec<_>>();
        assert_eq!(
            ports,
            vec![
                (0, Port::East, Port::West),
                (1, Port::East, Port::West),
                (2, Port::East, Port::West),
                (3, Port::North, Port::South),
                (4, Port::West, Port::East),
                (5, Port::West, Port::East),
                (6, Port::West, Port::East),
                (7, Port::South, Port::North),
            ]
        );
    }

    #[test]
    fn test_ring_invalid() {
        let endpoints = standard_endpoints(6, 0, 0);
        assert_eq!(
            synthesize(&config(Family::Ring, 6, 2, 2), &endpoints).unwrap_err(),
            Error::OddRouterCount(3)
        );
        let endpoints = standard_endpoints(2, 0, 0);
        assert_eq!(
            synthesize(&config(Family::Ring, 2, 2, 1), &endpoints).unwrap_err(),
            Error::RingTooSmall(2)
        );
        let endpoints = standard_endpoints(8, 0, 0);
        assert_eq!(
            synthesize(&config(Family::Ring, 8, 2, 3), &endpoints).unwrap_err(),
            Error::ConcentrationMismatch {
                cpus: 8,
                concentration: 3
            }
        );
    }
}
