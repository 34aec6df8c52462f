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

//! Endpoint controllers and their placement onto routers.
//!
//! Two placement policies are supported. The uniform stripe deals the
//! endpoint list out over the routers like cards, leaving the remainder
//! (DMA controllers) on router 0. Typed concentration groups caches on
//! consecutive routers, spreads directories at a fixed stride and puts
//! every DMA controller on router 0.
//!
//! Placement is computed and validated before any router exists, so a
//! rejected endpoint list never produces a partial topology.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::network::RouterRank;

/// The type of ids for endpoints.
pub type EndpointId = usize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum EndpointKind {
    L1Cache,
    L2Cache,
    Directory,
    Dma,
}

impl EndpointKind {
    pub fn is_cache(&self) -> bool {
        matches!(self, Self::L1Cache | Self::L2Cache)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: EndpointId,
    pub kind: EndpointKind,
}

impl Endpoint {
    pub fn new(id: EndpointId, kind: EndpointKind) -> Self {
        Self { id, kind }
    }
}

/// Build the conventional controller list: L1 caches, then directories,
/// then DMA controllers, numbered consecutively.
pub fn standard_endpoints(caches: usize, dirs: usize, dmas: usize) -> Vec<Endpoint> {
    std::iter::repeat(EndpointKind::L1Cache)
        .take(caches)
        .chain(std::iter::repeat(EndpointKind::Directory).take(dirs))
        .chain(std::iter::repeat(EndpointKind::Dma).take(dmas))
        .enumerate()
        .map(|(id, kind)| Endpoint::new(id, kind))
        .collect()
}

/// The router an endpoint is attached to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Placement {
    pub endpoint: Endpoint,
    pub router: RouterRank,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum AssignmentPolicy {
    UniformStripe,
    /// `num_dirs` is the configured directory count, which sets the stride.
    TypedConcentration { num_dirs: usize },
}

impl AssignmentPolicy {
    /// Place every endpoint on exactly one of `routers` routers.
    ///
    /// Placements are returned in the order the external links are numbered.
    pub fn assign(&self, endpoints: &[Endpoint], routers: usize) -> Result<Vec<Placement>> {
        if routers == 0 {
            return Err(Error::NoRouters);
        }
        match *self {
            Self::UniformStripe => uniform_stripe(endpoints, routers),
            Self::TypedConcentration { num_dirs } => {
                typed_concentration(endpoints, routers, num_dirs)
            }
        }
    }
}

fn uniform_stripe(endpoints: &[Endpoint], routers: usize) -> Result<Vec<Placement>> {
    let striped = endpoints.len() / routers * routers;
    if let Some(leftover) = endpoints[striped..]
        .iter()
        .find(|e| e.kind != EndpointKind::Dma)
    {
        return Err(Error::UnexpectedLeftover {
            endpoint: leftover.id,
            kind: leftover.kind,
        });
    }

    Ok(endpoints
        .iter()
        .enumerate()
        .map(|(i, &endpoint)| {
            let router = if i < striped { i % routers } else { 0 };
            log::debug!("endpoint {} ({:?}) -> router {}", endpoint.id, endpoint.kind, router);
            Placement { endpoint, router }
        })
        .collect())
}

fn typed_concentration(
    endpoints: &[Endpoint],
    routers: usize,
    num_dirs: usize,
) -> Result<Vec<Placement>> {
    let caches = endpoints.iter().filter(|e| e.kind.is_cache());
    let dirs = endpoints
        .iter()
        .filter(|e| e.kind == EndpointKind::Directory);
    let dmas = endpoints.iter().filter(|e| e.kind == EndpointKind::Dma);
    let (ncaches, ndirs) = (caches.clone().count(), dirs.clone().count());

    if ncaches % routers != 0 {
        return Err(Error::UnevenCaches {
            caches: ncaches,
            routers,
        });
    }
    if ndirs > ncaches {
        return Err(Error::TooManyDirectories {
            dirs: ndirs,
            caches: ncaches,
        });
    }
    let stride = if num_dirs == 0 { 0 } else { routers / num_dirs };
    if ndirs > 0 && (stride == 0 || (ndirs - 1) * stride >= routers) {
        return Err(Error::InvalidDirectoryStride {
            dirs: ndirs.max(num_dirs),
            routers,
        });
    }

    let caches_per_router = ncaches / routers;
    let mut placements = Vec::with_capacity(endpoints.len());
    placements.extend(caches.enumerate().map(|(i, &endpoint)| Placement {
        endpoint,
        router: i / caches_per_router,
    }));
    placements.extend(dirs.enumerate().map(|(i, &endpoint)| Placement {
        endpoint,
        router: i * stride,
    }));
    placements.extend(dmas.map(|&endpoint| Placement {
        endpoint,
        router: 0,
    }));
    for p in placements.iter() {
        log::debug!(
            "endpoint {} ({:?}) -> router {}",
            p.endpoint.id,
            p.endpoint.kind,
            p.router
        );
    }
    Ok(placements)
}
