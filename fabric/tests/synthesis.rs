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

//! Properties every synthesized topology has, whatever its family.

use mktemp::Temp;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::io;

use fabric::{
    standard_endpoints, synthesize, synthesize_with, Coordinates, DiagramSink, EdgeStyle,
    Endpoint, EndpointKind, Error, Family, InternalLink, RingSegment, Router,
    SynthesisConfiguration, Topology,
};

const TRIALS: usize = 50;

/// A random configuration that satisfies every structural precondition,
/// with a matching endpoint list.
fn random_config(rng: &mut StdRng) -> (SynthesisConfiguration, Vec<Endpoint>) {
    let family = match rng.gen_range(0..5) {
        0 => Family::Mesh,
        1 => Family::Ring,
        2 => Family::FullyConnected,
        3 => Family::FlattenedButterfly,
        _ => Family::HierarchicalRing,
    };
    let (rows, routers, concentration) = match family {
        Family::Mesh => {
            let rows = rng.gen_range(1..=6);
            (rows, rows * rng.gen_range(1..=6), 1)
        }
        Family::Ring => (2, 2 * rng.gen_range(2..=8), rng.gen_range(1..=2)),
        Family::FullyConnected => (1, rng.gen_range(2..=8), rng.gen_range(1..=4)),
        Family::FlattenedButterfly => {
            let rows = rng.gen_range(1..=4);
            (rows, rows * rng.gen_range(1..=4), rng.gen_range(1..=2))
        }
        Family::HierarchicalRing => {
            let rows = 2 * rng.gen_range(2..=3);
            (rows, rows * 2 * rng.gen_range(2..=4), 1)
        }
    };
    let cpus = routers * concentration;
    let config = SynthesisConfiguration {
        topology: family,
        num_cpus: cpus,
        mesh_rows: rows,
        concentration_factor: concentration,
        num_dirs: routers,
        link_latency: rng.gen_range(1..=3),
        ..Default::default()
    };
    // leftover DMA controllers must fit on a single pass over the routers
    let dmas = rng.gen_range(0..routers);
    (config, standard_endpoints(cpus, routers, dmas))
}

fn check_topology(topo: &Topology, endpoints: &[Endpoint]) {
    let routers = topo.routers().len();
    for endpoint in endpoints {
        assert!(topo.router_of(endpoint.id).unwrap() < routers);
    }
    assert_eq!(topo.external_links().len(), endpoints.len());

    let mut ids = HashSet::new();
    for link in topo.external_links() {
        assert!(ids.insert(link.id));
    }
    for link in topo.internal_links() {
        assert!(ids.insert(link.id));
        let reverse = topo.reverse_link(link.id).unwrap();
        assert_eq!((reverse.src, reverse.dst), (link.dst, link.src));
        assert_eq!(reverse.weight, link.weight);
        assert_eq!(topo.reverse_link(reverse.id).unwrap().id, link.id);
    }

    let edges = topo
        .logical_edges()
        .map(|l| l.edge())
        .collect::<HashSet<_>>();
    assert_eq!(edges.len(), topo.logical_edge_count());
    assert_eq!(2 * edges.len(), topo.internal_links().len());
    let degrees = (0..routers).map(|r| topo.degree(r)).sum::<usize>();
    assert_eq!(degrees, 2 * edges.len());

    match topo.family() {
        Family::Ring | Family::HierarchicalRing => {
            let plan = topo.escape_plan().unwrap();
            assert!(topo.internal_links().iter().all(|l| l.escape.is_some()));
            for segment in plan.segments() {
                if !segment.kind().is_escape_channel() {
                    continue;
                }
                // routers on the escape channel are ranked along it, once each
                let ranks = segment
                    .routers()
                    .iter()
                    .map(|&r| topo.router(r).unwrap().escape_rank)
                    .collect::<Vec<_>>();
                assert_eq!(
                    ranks,
                    (0..segment.len()).map(Some).collect::<Vec<_>>()
                );
                // the escape channel is a simple cycle, numbered along it
                let ordinals = topo
                    .logical_edges()
                    .filter_map(|l| l.escape)
                    .filter(|rank| rank.segment == segment.kind())
                    .map(|rank| rank.ordinal)
                    .collect::<HashSet<_>>();
                assert_eq!(ordinals, (0..segment.len()).collect::<HashSet<_>>());
            }
        }
        _ => {
            assert!(topo.escape_plan().is_none());
            assert!(topo.internal_links().iter().all(|l| l.escape.is_none()));
        }
    }
}

#[test]
fn test_random_configurations() {
    let _logger = env_logger::builder().is_test(true).try_init();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..TRIALS {
        let (config, endpoints) = random_config(&mut rng);
        let topo = synthesize(&config, &endpoints)
            .unwrap_or_else(|e| panic!("{:?} failed: {}", config, e));
        check_topology(&topo, &endpoints);
        // DMA controllers either share router 0 or are left over onto it
        for dma in endpoints.iter().filter(|e| e.kind == EndpointKind::Dma) {
            assert_eq!(topo.router_of(dma.id), Some(0));
        }
    }
}

#[test]
fn test_idempotent() {
    let _logger = env_logger::builder().is_test(true).try_init();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..TRIALS {
        let (config, endpoints) = random_config(&mut rng);
        let first = synthesize(&config, &endpoints).unwrap();
        let second = synthesize(&config, &endpoints).unwrap();
        assert_eq!(first.to_string(), second.to_string());
        assert_eq!(
            serde_yaml::to_string(&first).unwrap(),
            serde_yaml::to_string(&second).unwrap()
        );
    }
}

#[test]
fn test_invalid_configurations() {
    let endpoints = standard_endpoints(16, 16, 0);
    let bad = |family, cpus, rows, concentration| SynthesisConfiguration {
        topology: family,
        num_cpus: cpus,
        mesh_rows: rows,
        concentration_factor: concentration,
        num_dirs: 4,
        ..Default::default()
    };
    assert_eq!(
        synthesize(&bad(Family::Mesh, 16, 3, 1), &endpoints).unwrap_err(),
        Error::UnevenGrid {
            rows: 3,
            routers: 16
        }
    );
    assert_eq!(
        synthesize(&bad(Family::Ring, 12, 2, 4), &endpoints).unwrap_err(),
        Error::OddRouterCount(3)
    );
    assert_eq!(
        synthesize(&bad(Family::FlattenedButterfly, 16, 4, 3), &endpoints).unwrap_err(),
        Error::ConcentrationMismatch {
            cpus: 16,
            concentration: 3
        }
    );
    assert_eq!(
        synthesize(&bad(Family::HierarchicalRing, 16, 2, 1), &endpoints).unwrap_err(),
        Error::GridTooSmall { rows: 2, cols: 8 }
    );
    // more directories than caches
    assert_eq!(
        synthesize(
            &bad(Family::FullyConnected, 4, 1, 1),
            &standard_endpoints(4, 5, 0)
        )
        .unwrap_err(),
        Error::TooManyDirectories { dirs: 5, caches: 4 }
    );
}

#[test]
fn test_yaml_configuration() {
    let _logger = env_logger::builder().is_test(true).try_init();
    let config = SynthesisConfiguration::from_str(
        "---
topology: FlattenedButterfly
num_cpus: 32
mesh_rows: 4
concentration_factor: 2
num_dirs: 4
",
    )
    .unwrap();
    let topo = synthesize(&config, &standard_endpoints(32, 4, 2)).unwrap();
    assert_eq!(topo.name(), "FlattenedButterfly (4 x 4)");
    // each router reaches its row and its column directly
    assert!((0..16).all(|r| topo.degree(r) == 6));
    // directories every 4th router, DMA on router 0
    assert_eq!(topo.router_of(32), Some(0));
    assert_eq!(topo.router_of(35), Some(12));
    assert_eq!(topo.router_of(37), Some(0));
}

/// Fails on the first node.
struct FailingSink;

impl DiagramSink for FailingSink {
    fn begin(&mut self, _topology: &Topology) -> io::Result<()> {
        Ok(())
    }
    fn node(&mut self, _router: &Router, _at: Coordinates) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }
    fn edge(&mut self, _link: &InternalLink, _style: EdgeStyle) -> io::Result<()> {
        Ok(())
    }
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_emitters() {
    let _logger = env_logger::builder().is_test(true).try_init();
    let temp_dir = Temp::new_dir().unwrap();
    let mut config = SynthesisConfiguration {
        topology: Family::HierarchicalRing,
        num_cpus: 16,
        mesh_rows: 4,
        ..Default::default()
    };
    config.diagram.enabled = true;
    config.diagram.output_dir = temp_dir.to_path_buf().join("diagram");
    config.power_model.enabled = true;
    config.power_model.output_dir = temp_dir.to_path_buf().join("power");
    let endpoints = standard_endpoints(16, 16, 1);

    let topo = synthesize_with(&config, &endpoints, None).unwrap();
    assert!(config.diagram.output_dir.join("topo.tex").exists());
    assert!(config.power_model.output_dir.join("router.cfg").exists());
    assert!(config
        .power_model
        .output_dir
        .join("electrical-link.cfg")
        .exists());

    // a failing sink leaves the result alone
    let mut sink = FailingSink;
    let again = synthesize_with(&config, &endpoints, Some(&mut sink)).unwrap();
    assert_eq!(topo.to_string(), again.to_string());
    assert_eq!(
        again
            .escape_plan()
            .unwrap()
            .segment(RingSegment::Central)
            .unwrap()
            .len(),
        4
    );
}
