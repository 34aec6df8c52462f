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

//! Interconnect topology synthesis for on-chip networks.
//!
//! Given the endpoint controllers of a chip (caches, directories, DMA) and a
//! `SynthesisConfiguration`, `synthesize` builds the router graph a network
//! simulator consumes: the routers, the attachment of each endpoint to one
//! router, and the weighted bidirectional links between routers. Ring based
//! families also carry escape-channel ranks for deadlock-free fallback
//! routing.
//!
//! ```
//! use fabric::{standard_endpoints, synthesize, Family, SynthesisConfiguration};
//!
//! let config = SynthesisConfiguration {
//!     topology: Family::Mesh,
//!     num_cpus: 16,
//!     mesh_rows: 4,
//!     ..Default::default()
//! };
//! let topology = synthesize(&config, &standard_endpoints(16, 16, 1)).unwrap();
//! assert_eq!(topology.logical_edge_count(), 24);
//! ```

mod config;
mod context;
pub mod emit;
mod endpoint;
mod error;
mod escape;
mod families;
mod layout;
mod network;
mod registry;
mod topology;
mod weight;


pub use crate::config::{
    DiagramConfiguration, PowerModelConfiguration, SynthesisConfiguration, DEFAULT_OUTPUT_DIR,
};
pub use crate::emit::tikz::TikzWriter;
pub use crate::emit::{DiagramSink, EdgeStyle};
pub use crate::endpoint::{
    standard_endpoints, AssignmentPolicy, Endpoint, EndpointId, EndpointKind, Placement,
};
pub use crate::error::{Error, Result};
pub use crate::escape::{EscapePlan, EscapeRank, EscapeRankPolicy, RingSegment, Segment, Side};
pub use crate::families::{synthesize, Family, Grid};
pub use crate::layout::{Coordinates, Layout2D};
pub use crate::network::{ExternalLink, InternalLink, Latency, LinkId, Port, Router, RouterRank};
pub use crate::topology::Topology;
pub use crate::weight::{Dimension, Weight};

/// Synthesize, then run the diagnostic emitters.
///
/// A supplied `diagram` sink is drawn into; otherwise a Tikz diagram is
/// written when `config.diagram` enables it. The power model is written when
/// `config.power_model` enables it. Emitter failures are logged and do not
/// affect the returned topology.
pub fn synthesize_with(
    config: &SynthesisConfiguration,
    endpoints: &[Endpoint],
    diagram: Option<&mut dyn DiagramSink>,
) -> Result<Topology> {
    let topology = synthesize(config, endpoints)?;
    match diagram {
        Some(sink) => {
            emit::draw(&topology, sink);
        }
        None if config.diagram.enabled => {
            emit::emit_diagram(&topology, &config.diagram);
        }
        None => {}
    }
    if config.power_model.enabled {
        emit::emit_power_model(&config.power_model);
    }
    Ok(topology)
}
