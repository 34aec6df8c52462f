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

use itertools::Itertools;
use petgraph::graph::{node_index, UnGraph};
use serde::Serialize;
use std::fmt;

use crate::endpoint::EndpointId;
use crate::escape::EscapePlan;
use crate::families::{Family, Grid};
use crate::layout::{Coordinates, Layout2D};
use crate::network::{ExternalLink, InternalLink, LinkId, Router, RouterRank};
use crate::weight::Weight;

/// The synthesized router graph.
///
/// Produced once per synthesis and never mutated afterwards. Routers are
/// ordered by rank, external links by id, and internal links come in
/// forward/reverse pairs with consecutive ids.
#[derive(Debug, Serialize)]
pub struct Topology {
    family: Family,
    grid: Grid,
    routers: Vec<Router>,
    external_links: Vec<ExternalLink>,
    internal_links: Vec<InternalLink>,
    escape_plan: Option<EscapePlan>,
    /// logical edges, weighted by the id of their forward link
    #[serde(skip)]
    graph: UnGraph<RouterRank, LinkId>,
}

impl Topology {
    pub(crate) fn new(
        family: Family,
        grid: Grid,
        routers: Vec<Router>,
        external_links: Vec<ExternalLink>,
        internal_links: Vec<InternalLink>,
        escape_plan: Option<EscapePlan>,
    ) -> Self {
        let mut graph = UnGraph::with_capacity(routers.len(), internal_links.len() / 2);
        for router in routers.iter() {
            graph.add_node(router.rank);
        }
        for link in internal_links.iter().step_by(2) {
            graph.add_edge(node_index(link.src), node_index(link.dst), link.id);
        }
        Self {
            family,
            grid,
            routers,
            external_links,
            internal_links,
            escape_plan,
            graph,
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns a printable name for the topology
    pub fn name(&self) -> String {
        format!(
            "{} ({} x {})",
            self.family.name(),
            self.grid.rows,
            self.grid.cols
        )
    }

    pub fn routers(&self) -> &[Router] {
        &self.routers
    }

    pub fn router(&self, rank: RouterRank) -> Option<&Router> {
        self.routers.get(rank)
    }

    pub fn external_links(&self) -> &[ExternalLink] {
        &self.external_links
    }

    pub fn internal_links(&self) -> &[InternalLink] {
        &self.internal_links
    }

    pub fn escape_plan(&self) -> Option<&EscapePlan> {
        self.escape_plan.as_ref()
    }

    /// The petgraph view of the logical edges.
    pub fn graph(&self) -> &UnGraph<RouterRank, LinkId> {
        &self.graph
    }

    fn first_internal_id(&self) -> LinkId {
        self.external_links.len()
    }

    /// Retrieve an internal link by its id
    pub fn link(&self, id: LinkId) -> Option<&InternalLink> {
        id.checked_sub(self.first_internal_id())
            .and_then(|offset| self.internal_links.get(offset))
    }

    /// The opposite direction of internal link `id`.
    pub fn reverse_link(&self, id: LinkId) -> Option<&InternalLink> {
        let offset = id.checked_sub(self.first_internal_id())?;
        self.internal_links.get(offset ^ 1)
    }

    /// One link per logical edge: the forward direction of each pair.
    pub fn logical_edges(&self) -> impl Iterator<Item = &InternalLink> {
        self.internal_links.iter().step_by(2)
    }

    pub fn logical_edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn neighbors(&self, rank: RouterRank) -> impl Iterator<Item = RouterRank> + '_ {
        self.graph
            .neighbors(node_index(rank))
            .map(move |n| self.graph[n])
    }

    pub fn degree(&self, rank: RouterRank) -> usize {
        self.neighbors(rank).count()
    }

    /// The router an endpoint is attached to.
    pub fn router_of(&self, endpoint: EndpointId) -> Option<RouterRank> {
        self.external_links
            .iter()
            .find(|l| l.endpoint == endpoint)
            .map(|l| l.router)
    }

    /// Euclidean distance between two routers on the layout grid.
    ///
    /// Diagnostic only: no routing decision depends on it.
    pub fn distance(&self, a: RouterRank, b: RouterRank) -> f64 {
        self.get_node_coordinates(a)
            .distance(&self.get_node_coordinates(b))
    }

    /// Sorted (weight, is-escape) labels of the logical edges.
    pub fn edge_labels(&self) -> Vec<(Weight, bool)> {
        self.logical_edges()
            .map(|l| (l.weight, l.is_escape()))
            .sorted()
            .collect()
    }
}

impl Layout2D for Topology {
    fn get_max_x(&self) -> usize {
        self.grid.cols
    }
    fn get_max_y(&self) -> usize {
        self.grid.rows
    }
    fn get_node_coordinates(&self, rank: RouterRank) -> Coordinates {
        self.family.coordinates(&self.grid, rank)
    }
}

/// Topologies are displayed by generating a dot format string.
///
/// Each logical edge is drawn once; its label is the id of the forward link.
impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const INDENT: &str = "  ";
        writeln!(f, "graph \"{}\" {{", self.name())?;
        for link in self.logical_edges() {
            writeln!(
                f,
                "{} {} -- {} [label=\"{}\", weight={}{}]",
                INDENT,
                link.src,
                link.dst,
                link.id,
                link.weight,
                if link.is_escape() { ", style=bold" } else { "" }
            )?;
        }
        writeln!(f, "}}")
    }
}
