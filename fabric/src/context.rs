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
use crate::endpoint::Placement;
use crate::escape::EscapePlan;
use crate::families::{Family, Grid};
use crate::network::{ExternalLink, InternalLink, Latency, LinkId, Port, Router, RouterRank};
use crate::registry::EdgeRegistry;
use crate::topology::Topology;
use crate::weight::Dimension;

/// Private state of one synthesis pass.
///
/// The context owns everything built so far. It is only turned into a
/// `Topology` by `finish`, so a builder that bails out with an error drops
/// it without publishing anything.
pub(crate) struct SynthesisContext {
    family: Family,
    grid: Grid,
    link_latency: Latency,
    routers: Vec<Router>,
    external_links: Vec<ExternalLink>,
    internal_links: Vec<InternalLink>,
    registry: EdgeRegistry,
    // external and internal links draw from the same id space
    next_link_id: LinkId,
}

impl SynthesisContext {
    /// Create the routers and attach the endpoints to them.
    pub fn new(
        family: Family,
        grid: Grid,
        config: &SynthesisConfiguration,
        placements: &[Placement],
    ) -> Self {
        let routers = (0..grid.size())
            .map(|rank| Router {
                rank,
                latency: config.router_latency,
                escape_rank: None,
            })
            .collect();
        let external_links = placements
            .iter()
            .enumerate()
            .map(|(id, p)| ExternalLink {
                id,
                endpoint: p.endpoint.id,
                router: p.router,
                latency: config.link_latency,
            })
            .collect::<Vec<_>>();
        Self {
            family,
            grid,
            link_latency: config.link_latency,
            routers,
            next_link_id: external_links.len(),
            external_links,
            internal_links: Vec::new(),
            registry: EdgeRegistry::new(),
        }
    }

    /// Propose the edge src -- dst running in `dim`.
    ///
    /// An accepted edge becomes two internal links with consecutive ids.
    /// Returns false when the edge already exists.
    pub fn link(&mut self, src: RouterRank, dst: RouterRank, dim: Dimension) -> bool {
        if !self.registry.insert(src, dst) {
            return false;
        }
        let ports = match dim {
            Dimension::Direct => None,
            _ => Port::between(
                &self.family.coordinates(&self.grid, src),
                &self.family.coordinates(&self.grid, dst),
            ),
        };
        let forward = InternalLink {
            id: self.next_link_id,
            src,
            dst,
            src_port: ports.map(|(outport, _)| outport),
            dst_port: ports.map(|(_, inport)| inport),
            latency: self.link_latency,
            weight: dim.weight(),
            escape: None,
        };
        log::debug!(
            "link {}: {} -> {} {:?} weight {}",
            forward.id,
            src,
            dst,
            dim,
            forward.weight
        );
        let reverse = forward.reversed(forward.id + 1);
        self.internal_links.push(forward);
        self.internal_links.push(reverse);
        self.next_link_id += 2;
        true
    }

    /// Overlay the escape plan, if any, and publish the topology.
    pub fn finish(self, plan: Option<EscapePlan>) -> Topology {
        let mut routers = self.routers;
        let mut internal_links = self.internal_links;
        if let Some(plan) = &plan {
            for pair in internal_links.chunks_mut(2) {
                let escape = plan.edge_rank(pair[0].src, pair[0].dst);
                pair.iter_mut().for_each(|link| link.escape = escape);
            }
            for router in routers.iter_mut() {
                router.escape_rank = plan.router_rank(router.rank);
            }
        }
        log::info!(
            "{} {}x{}: {} routers, {} external links, {} internal links",
            self.family.name(),
            self.grid.rows,
            self.grid.cols,
            routers.len(),
            self.external_links.len(),
            internal_links.len()
        );
        Topology::new(
            self.family,
            self.grid,
            routers,
            self.external_links,
            internal_links,
            plan,
        )
    }
}
