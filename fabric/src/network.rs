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

//! Routers and the links that attach them to endpoints and to each other.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::endpoint::EndpointId;
use crate::escape::EscapeRank;
use crate::layout::Coordinates;
use crate::weight::Weight;

/// Position of a router in the synthesized topology, 0..N-1.
pub type RouterRank = usize;

/// Unique id shared by external and internal links.
pub type LinkId = usize;

/// Latency, in cycles of the consuming engine.
pub type Latency = usize;

/// Router port a link leaves from or arrives at.
///
/// Rows grow northwards and columns grow eastwards, matching the order in
/// which ranks are laid out.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Port {
    North,
    South,
    East,
    West,
}

impl Port {
    /// The (outport, inport) pair for a hop from `from` to `to`.
    ///
    /// Returns None when the two positions are not on a common row or
    /// column.
    pub fn between(from: &Coordinates, to: &Coordinates) -> Option<(Port, Port)> {
        if from.y == to.y && from.x < to.x {
            Some((Port::East, Port::West))
        } else if from.y == to.y && from.x > to.x {
            Some((Port::West, Port::East))
        } else if from.x == to.x && from.y < to.y {
            Some((Port::North, Port::South))
        } else if from.x == to.x && from.y > to.y {
            Some((Port::South, Port::North))
        } else {
            None
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Router {
    pub rank: RouterRank,
    pub latency: Latency,
    /// Position on the escape channel ring, for routers that are on it.
    pub escape_rank: Option<usize>,
}

/// Attachment of one endpoint controller to its router.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ExternalLink {
    pub id: LinkId,
    pub endpoint: EndpointId,
    pub router: RouterRank,
    pub latency: Latency,
}

/// One direction of a router-to-router link.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct InternalLink {
    pub id: LinkId,
    pub src: RouterRank,
    pub dst: RouterRank,
    pub src_port: Option<Port>,
    pub dst_port: Option<Port>,
    pub latency: Latency,
    pub weight: Weight,
    pub escape: Option<EscapeRank>,
}

impl InternalLink {
    /// The opposite direction of this link, with swapped ports.
    pub(crate) fn reversed(&self, id: LinkId) -> Self {
        Self {
            id,
            src: self.dst,
            dst: self.src,
            src_port: self.dst_port,
            dst_port: self.src_port,
            latency: self.latency,
            weight: self.weight,
            escape: self.escape,
        }
    }

    /// Whether the link carries the deadlock-free escape channel.
    pub fn is_escape(&self) -> bool {
        self.escape
            .map_or(false, |rank| rank.segment.is_escape_channel())
    }

    /// The logical edge as an ordered pair.
    pub fn edge(&self) -> (RouterRank, RouterRank) {
        if self.src < self.dst {
            (self.src, self.dst)
        } else {
            (self.dst, self.src)
        }
    }
}
