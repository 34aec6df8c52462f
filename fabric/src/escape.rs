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

//! Escape channel planning for ring-based families.
//!
//! A ring segment is a simple cycle of routers listed in traversal order.
//! Every router in a segment gets its position in that order as an ordinal,
//! and every edge of the segment gets the ordinal of the router it leaves
//! when walking the cycle. Within a segment ordinals never repeat, so a
//! packet that only ever moves to a higher ordinal cannot come back to a
//! router it has already visited. That is what makes the escape channel
//! deadlock free: adaptive routing may use any link, and falls back to the
//! increasing-rank walk whenever it would block.
//!
//! Some engines expect the router's own rank in place of the segment
//! ordinal. That mapping is available as `EscapeRankPolicy::RouterRank`, but
//! nothing guarantees the walk it describes is acyclic for hierarchical
//! rings, so it is only used on request.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::network::RouterRank;
use crate::registry::edge_key;

/// Which half of the columns a half-ring covers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum RingSegment {
    /// The single cycle of the Ring family.
    Ring,
    /// A half-ring over rows (2 * row_pair, 2 * row_pair + 1).
    HalfRing { row_pair: usize, side: Side },
    /// The spine of a hierarchical ring.
    Central,
}

impl RingSegment {
    /// Whether the segment is the deadlock-free escape channel, as opposed
    /// to a fast non-escape ring.
    pub fn is_escape_channel(&self) -> bool {
        !matches!(self, Self::HalfRing { .. })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum EscapeRankPolicy {
    /// Position along the segment's traversal order.
    SegmentOrdinal,
    /// The rank of the link's source router.
    RouterRank,
}

impl Default for EscapeRankPolicy {
    fn default() -> Self {
        Self::SegmentOrdinal
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct EscapeRank {
    pub segment: RingSegment,
    pub ordinal: usize,
}

/// A simple cycle of routers, in traversal order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Segment {
    kind: RingSegment,
    routers: Vec<RouterRank>,
}

impl Segment {
    pub fn new(kind: RingSegment, routers: Vec<RouterRank>) -> Result<Self> {
        if routers.len() < 3 {
            return Err(Error::RingTooSmall(routers.len()));
        }
        let mut seen = HashSet::new();
        if let Some(&dup) = routers.iter().find(|&&r| !seen.insert(r)) {
            return Err(Error::DuplicateSegmentRouter(dup));
        }
        Ok(Self { kind, routers })
    }

    pub fn kind(&self) -> RingSegment {
        self.kind
    }

    pub fn routers(&self) -> &[RouterRank] {
        &self.routers
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }

    pub fn contains(&self, rank: RouterRank) -> bool {
        self.routers.contains(&rank)
    }

    pub fn ordinal(&self, rank: RouterRank) -> Option<usize> {
        self.routers.iter().position(|&r| r == rank)
    }

    /// Consecutive router pairs, including the pair that closes the cycle.
    pub fn edges(&self) -> impl Iterator<Item = (RouterRank, RouterRank)> + '_ {
        self.routers
            .iter()
            .copied()
            .zip(self.routers.iter().copied().cycle().skip(1))
    }
}

/// Escape ranks for every segment of a topology.
#[derive(Clone, Debug, Serialize)]
pub struct EscapePlan {
    policy: EscapeRankPolicy,
    segments: Vec<Segment>,
    #[serde(skip)]
    edges: HashMap<(RouterRank, RouterRank), EscapeRank>,
    #[serde(skip)]
    routers: HashMap<RouterRank, usize>,
}

impl EscapePlan {
    pub fn new(policy: EscapeRankPolicy) -> Self {
        if policy == EscapeRankPolicy::RouterRank {
            log::warn!(
                "escape ranks follow router ranks; the increasing-rank walk is not \
                 guaranteed to be acyclic within a segment"
            );
        }
        Self {
            policy,
            segments: Vec::new(),
            edges: HashMap::new(),
            routers: HashMap::new(),
        }
    }

    pub fn policy(&self) -> EscapeRankPolicy {
        self.policy
    }

    /// Add a segment. Edges shared with earlier segments take the ranks of
    /// the segment added last.
    ///
    /// Only escape channel segments give routers a router-level ordinal. A
    /// router sits on at most one of them, so that ordinal is unique within
    /// its segment. Half-ring ordinals stay with the segment itself.
    pub fn add_segment(&mut self, segment: Segment) {
        for (ordinal, (a, b)) in segment.edges().enumerate() {
            log::debug!("{:?}: {} -- {} rank {}", segment.kind, a, b, ordinal);
            self.edges.insert(
                edge_key(a, b),
                EscapeRank {
                    segment: segment.kind,
                    ordinal,
                },
            );
        }
        if segment.kind.is_escape_channel() {
            for (ordinal, &r) in segment.routers.iter().enumerate() {
                self.routers.insert(r, ordinal);
            }
        }
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, kind: RingSegment) -> Option<&Segment> {
        self.segments.iter().find(|s| s.kind == kind)
    }

    /// The escape rank of the link from `src` to `dst`, if the edge belongs
    /// to a segment.
    pub fn edge_rank(&self, src: RouterRank, dst: RouterRank) -> Option<EscapeRank> {
        let rank = self.edges.get(&edge_key(src, dst))?;
        Some(match self.policy {
            EscapeRankPolicy::SegmentOrdinal => *rank,
            EscapeRankPolicy::RouterRank => EscapeRank {
                segment: rank.segment,
                ordinal: src,
            },
        })
    }

    /// The router-level ordinal, if the router is on the escape channel.
    pub fn router_rank(&self, rank: RouterRank) -> Option<usize> {
        let ordinal = self.routers.get(&rank)?;
        Some(match self.policy {
            EscapeRankPolicy::SegmentOrdinal => *ordinal,
            EscapeRankPolicy::RouterRank => rank,
        })
    }
}
