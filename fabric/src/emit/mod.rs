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

//! Diagnostic outputs derived from a finished topology.
//!
//! Emitters never feed back into synthesis: they run on the immutable
//! `Topology` after it has been built, and a failing emitter only logs.

pub mod dsent;
pub mod tikz;

use std::io;

use crate::config::{DiagramConfiguration, PowerModelConfiguration};
use crate::families::Family;
use crate::layout::{Coordinates, Layout2D};
use crate::network::{InternalLink, Router};
use crate::topology::Topology;
use crate::weight::PRIMARY;

/// Receiver of a topology drawing.
///
/// `begin` is called once, then `node` for every router in rank order,
/// `edge` for every logical edge in link id order, and `finish` last. The
/// first error stops the drawing.
pub trait DiagramSink {
    fn begin(&mut self, topology: &Topology) -> io::Result<()>;
    fn node(&mut self, router: &Router, at: Coordinates) -> io::Result<()>;
    fn edge(&mut self, link: &InternalLink, style: EdgeStyle) -> io::Result<()>;
    fn finish(&mut self) -> io::Result<()>;
}

/// How an edge stands out from the family's default path style.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeStyle {
    /// Line width in mm.
    pub line_width: Option<f64>,
    pub bend_right: bool,
}

impl EdgeStyle {
    pub fn for_link(topology: &Topology, link: &InternalLink) -> Self {
        let primary = link.weight == PRIMARY;
        match topology.family() {
            Family::Mesh | Family::Ring | Family::HierarchicalRing => Self {
                line_width: if primary { Some(1.0) } else { None },
                bend_right: false,
            },
            Family::FullyConnected => Self {
                line_width: Some(0.2),
                bend_right: false,
            },
            Family::FlattenedButterfly => {
                let grid = topology.grid();
                // row links in the lower half and column links in the right
                // half bend the other way, so parallel links stay apart
                let bend_right = if grid.row(link.src) == grid.row(link.dst) {
                    grid.row(link.src) < grid.rows / 2
                } else {
                    grid.col(link.src) >= grid.cols / 2
                };
                Self {
                    line_width: if primary { Some(0.6) } else { None },
                    bend_right,
                }
            }
        }
    }
}

fn feed(topology: &Topology, sink: &mut dyn DiagramSink) -> io::Result<()> {
    sink.begin(topology)?;
    for router in topology.routers() {
        sink.node(router, topology.get_node_coordinates(router.rank))?;
    }
    for link in topology.logical_edges() {
        sink.edge(link, EdgeStyle::for_link(topology, link))?;
    }
    sink.finish()
}

/// Draw `topology` into `sink`.
///
/// Returns false if the sink failed. The failure is logged, once.
pub fn draw(topology: &Topology, sink: &mut dyn DiagramSink) -> bool {
    match feed(topology, sink) {
        Ok(()) => true,
        Err(err) => {
            log::error!("drawing {} failed with error {:?}", topology.name(), err);
            false
        }
    }
}

/// Write `topo.tex` into the configured directory, and render it if asked.
pub fn emit_diagram(topology: &Topology, config: &DiagramConfiguration) -> bool {
    let mut writer = match tikz::TikzWriter::create(&config.output_dir) {
        Ok(writer) => writer,
        Err(err) => {
            log::error!("{:#}", err);
            return false;
        }
    };
    if !draw(topology, &mut writer) {
        return false;
    }
    drop(writer);
    if config.render {
        if let Err(err) = tikz::render_pdf(&config.output_dir) {
            log::error!("{:#}", err);
            return false;
        }
    }
    true
}

/// Write the router and link power model files.
pub fn emit_power_model(config: &PowerModelConfiguration) -> bool {
    match dsent::write_power_model(&config.output_dir, config) {
        Ok(()) => true,
        Err(err) => {
            log::error!("{:#}", err);
            false
        }
    }
}

#[cfg(test)]
mod emit_tests {
    use super::*;
    use crate::endpoint::standard_endpoints;
    use crate::network::LinkId;
    use crate::tests::config;
    use crate::weight::SECONDARY;

    /// Records what it is fed, and fails on request.
    #[derive(Default)]
    struct Recorder {
        nodes: Vec<(usize, Coordinates)>,
        edges: Vec<(LinkId, EdgeStyle)>,
        finished: bool,
        fail_after: Option<usize>,
    }

    impl DiagramSink for Recorder {
        fn begin(&mut self, _topology: &Topology) -> io::Result<()> {
            Ok(())
        }
        fn node(&mut self, router: &Router, at: Coordinates) -> io::Result<()> {
            self.nodes.push((router.rank, at));
            Ok(())
        }
        fn edge(&mut self, link: &InternalLink, style: EdgeStyle) -> io::Result<()> {
            if self.fail_after == Some(self.edges.len()) {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.edges.push((link.id, style));
            Ok(())
        }
        fn finish(&mut self) -> io::Result<()> {
            self.finished = true;
            Ok(())
        }
    }

    fn topology(family: Family, cpus: usize, rows: usize) -> Topology {
        let endpoints = standard_endpoints(cpus, 0, 0);
        crate::synthesize(&config(family, cpus, rows, 1), &endpoints).unwrap()
    }

    #[test]
    fn test_draw() {
        let _logger = env_logger::builder().is_test(true).try_init();
        let topo = topology(Family::Ring, 8, 2);
        let mut sink = Recorder::default();
        assert!(draw(&topo, &mut sink));
        assert!(sink.finished);
        assert_eq!(sink.nodes.len(), 8);
        // the second row of a ring is drawn right to left
        assert_eq!(sink.nodes[4], (4, Coordinates::new(3, 1)));
        assert_eq!(sink.edges.len(), 8);
        assert!(sink
            .edges
            .iter()
            .all(|(_, style)| style.line_width == Some(1.0)));
    }

    #[test]
    fn test_draw_failure() {
        let _logger = env_logger::builder().is_test(true).try_init();
        let topo = topology(Family::Mesh, 4, 2);
        let mut sink = Recorder {
            fail_after: Some(1),
            ..Default::default()
        };
        assert!(!draw(&topo, &mut sink));
        assert_eq!(sink.edges.len(), 1);
        assert!(!sink.finished);
        // the topology is untouched
        assert_eq!(topo.logical_edge_count(), 4);
    }

    #[test]
    fn test_edge_styles() {
        let topo = topology(Family::Mesh, 4, 2);
        for link in topo.logical_edges() {
            let style = EdgeStyle::for_link(&topo, link);
            assert_eq!(style.line_width.is_some(), link.weight == PRIMARY);
            assert!(!style.bend_right);
        }

        let topo = topology(Family::FlattenedButterfly, 16, 4);
        let styles = topo
            .logical_edges()
            .map(|l| (l.edge(), l.weight, EdgeStyle::for_link(&topo, l)))
            .collect::<Vec<_>>();
        let style_of = |edge| styles.iter().find(|(e, _, _)| *e == edge).unwrap();
        // row 0 is in the lower half
        assert_eq!(
            style_of((0, 2)).2,
            EdgeStyle {
                line_width: Some(0.6),
                bend_right: true
            }
        );
        assert!(!style_of((8, 10)).2.bend_right);
        // column 3 is in the right half
        assert_eq!(style_of((3, 11)).1, SECONDARY);
        assert_eq!(
            style_of((3, 11)).2,
            EdgeStyle {
                line_width: None,
                bend_right: true
            }
        );
        assert!(!style_of((1, 9)).2.bend_right);

        let topo = topology(Family::FullyConnected, 4, 1);
        assert!(topo
            .logical_edges()
            .all(|l| EdgeStyle::for_link(&topo, l).line_width == Some(0.2)));
    }

    #[test]
    fn test_emit_power_model_failure() {
        let _logger = env_logger::builder().is_test(true).try_init();
        let file = mktemp::Temp::new_file().unwrap();
        let config = PowerModelConfiguration {
            enabled: true,
            // a file is in the way of the directory
            output_dir: file.to_path_buf().join("power"),
            ..Default::default()
        };
        assert!(!emit_power_model(&config));
    }
}
