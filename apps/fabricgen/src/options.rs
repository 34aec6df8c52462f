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

use fabric::{Family, SynthesisConfiguration};
use structopt::StructOpt;

/// The topology families and their sizing.
#[derive(Debug, StructOpt, Clone, PartialEq)]
pub enum Shape {
    /// A 2D mesh, one router per cpu
    Mesh {
        #[structopt(short, long, default_value = "16")]
        cpus: usize,
        #[structopt(short, long, default_value = "4")]
        rows: usize,
    },
    /// A ring, drawn over two rows
    Ring {
        #[structopt(short, long, default_value = "16")]
        cpus: usize,
        #[structopt(name = "concentration", short = "k", long, default_value = "1")]
        concentration: usize,
    },
    /// Every router linked to every other
    Full {
        #[structopt(short, long, default_value = "16")]
        cpus: usize,
        #[structopt(short, long, default_value = "4")]
        rows: usize,
        #[structopt(name = "concentration", short = "k", long, default_value = "1")]
        concentration: usize,
    },
    /// Rows and columns fully connected
    FlattenedButterfly {
        #[structopt(short, long, default_value = "16")]
        cpus: usize,
        #[structopt(short, long, default_value = "4")]
        rows: usize,
        #[structopt(name = "concentration", short = "k", long, default_value = "1")]
        concentration: usize,
    },
    /// Half-rings per row pair, joined by a central ring
    HierarchicalRing {
        #[structopt(short, long, default_value = "16")]
        cpus: usize,
        #[structopt(short, long, default_value = "4")]
        rows: usize,
    },
}

impl Shape {
    /// Overwrite the family and sizing of `config`.
    ///
    /// Directories default to one per router.
    pub fn apply(&self, config: &mut SynthesisConfiguration) {
        let (family, cpus, rows, concentration) = match *self {
            Self::Mesh { cpus, rows } => (Family::Mesh, cpus, rows, 1),
            Self::Ring {
                cpus,
                concentration,
            } => (Family::Ring, cpus, 2, concentration),
            Self::Full {
                cpus,
                rows,
                concentration,
            } => (Family::FullyConnected, cpus, rows, concentration),
            Self::FlattenedButterfly {
                cpus,
                rows,
                concentration,
            } => (Family::FlattenedButterfly, cpus, rows, concentration),
            Self::HierarchicalRing { cpus, rows } => (Family::HierarchicalRing, cpus, rows, 1),
        };
        config.topology = family;
        config.num_cpus = cpus;
        config.mesh_rows = rows;
        config.concentration_factor = concentration;
        config.num_dirs = if concentration == 0 {
            cpus
        } else {
            cpus / concentration
        };
    }
}
