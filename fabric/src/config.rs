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

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::escape::EscapeRankPolicy;
use crate::families::Family;
use crate::network::Latency;

/// Default directory for diagnostic output.
pub const DEFAULT_OUTPUT_DIR: &str = "fabric-out";

/// Parameters of one synthesis run.
///
/// Constructed programmatically or read from a YAML file. Keys missing from
/// the file take their default values.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SynthesisConfiguration {
    pub topology: Family,
    pub num_cpus: usize,
    pub mesh_rows: usize,
    pub concentration_factor: usize,
    pub num_dirs: usize,
    pub link_latency: Latency,
    pub router_latency: Latency,
    pub escape_rank_policy: EscapeRankPolicy,
    pub diagram: DiagramConfiguration,
    pub power_model: PowerModelConfiguration,
}

impl Default for SynthesisConfiguration {
    fn default() -> Self {
        Self {
            topology: Family::Mesh,
            num_cpus: 16,
            mesh_rows: 4,
            concentration_factor: 1,
            num_dirs: 16,
            link_latency: 1,
            router_latency: 1,
            escape_rank_policy: EscapeRankPolicy::default(),
            diagram: DiagramConfiguration::default(),
            power_model: PowerModelConfiguration::default(),
        }
    }
}

impl SynthesisConfiguration {
    pub fn from_file<P: AsRef<Path>>(file_name: P) -> Result<Self> {
        let path = file_name.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::InvalidConfiguration(format!("cannot open {}: {}", path.display(), e))
        })?;
        serde_yaml::from_reader(BufReader::new(file))
            .map_err(|e| Error::InvalidConfiguration(format!("{}: {}", path.display(), e)))
    }

    pub fn from_str(config: &str) -> Result<Self> {
        serde_yaml::from_str(config).map_err(|e| Error::InvalidConfiguration(e.to_string()))
    }
}

/// Tikz diagram output.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct DiagramConfiguration {
    pub enabled: bool,
    pub output_dir: PathBuf,
    /// Also run pdflatex on the generated file, when available.
    pub render: bool,
}

impl Default for DiagramConfiguration {
    fn default() -> Self {
        Self {
            enabled: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            render: false,
        }
    }
}

/// Router and link power/area model parameters.
///
/// These feed the model configuration files only; they have no bearing on
/// the topology itself.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PowerModelConfiguration {
    pub enabled: bool,
    pub output_dir: PathBuf,
    pub link_width_bits: usize,
    pub vcs_per_vnet: usize,
    pub buffers_per_ctrl_vc: usize,
    pub buffers_per_data_vc: usize,
}

impl Default for PowerModelConfiguration {
    fn default() -> Self {
        Self {
            enabled: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            link_width_bits: 128,
            vcs_per_vnet: 4,
            buffers_per_ctrl_vc: 1,
            buffers_per_data_vc: 4,
        }
    }
}
