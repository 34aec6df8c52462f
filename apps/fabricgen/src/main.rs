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

//! Synthesize an on-chip network topology and write it out.

use anyhow::{bail, Context};
use std::fs;
use std::path::PathBuf;
use structopt::StructOpt;

use fabric::{standard_endpoints, EscapeRankPolicy, SynthesisConfiguration, Topology};

mod options;

use options::Shape;

#[derive(StructOpt)]
#[structopt(name = "fabricgen", about = "On-chip interconnect topology synthesis")]
struct Arguments {
    /// YAML synthesis configuration; a subcommand overrides its topology
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,
    /// cache controllers, one per cpu by default
    #[structopt(long)]
    caches: Option<usize>,
    /// directory controllers, num_dirs by default
    #[structopt(long)]
    dirs: Option<usize>,
    /// DMA controllers
    #[structopt(long, default_value = "0")]
    dmas: usize,
    /// escape ranks follow router ranks
    #[structopt(long)]
    router_rank_escape: bool,
    /// write the topology as YAML
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
    /// write the topology in dot format
    #[structopt(long, parse(from_os_str))]
    dot: Option<PathBuf>,
    /// write a Tikz diagram into this directory
    #[structopt(long, parse(from_os_str))]
    tikz: Option<PathBuf>,
    /// run pdflatex on the Tikz diagram
    #[structopt(long)]
    render: bool,
    /// write DSENT router and link models into this directory
    #[structopt(long, parse(from_os_str))]
    power_model: Option<PathBuf>,
    #[structopt(subcommand)]
    shape: Option<Shape>,
}

impl Arguments {
    fn configuration(&self) -> anyhow::Result<SynthesisConfiguration> {
        let mut config = match &self.config {
            Some(path) => SynthesisConfiguration::from_file(path)?,
            None => SynthesisConfiguration::default(),
        };
        match &self.shape {
            Some(shape) => shape.apply(&mut config),
            None if self.config.is_none() => {
                bail!("either --config or a topology subcommand is required")
            }
            None => {}
        }
        if self.router_rank_escape {
            config.escape_rank_policy = EscapeRankPolicy::RouterRank;
        }
        if let Some(dir) = &self.tikz {
            config.diagram.enabled = true;
            config.diagram.output_dir = dir.clone();
        }
        config.diagram.render |= self.render;
        if let Some(dir) = &self.power_model {
            config.power_model.enabled = true;
            config.power_model.output_dir = dir.clone();
        }
        Ok(config)
    }
}

fn write_outputs(args: &Arguments, topology: &Topology) -> anyhow::Result<()> {
    if let Some(path) = &args.output {
        let yaml = serde_yaml::to_string(topology)?;
        fs::write(path, yaml).with_context(|| format!("cannot write {}", path.display()))?;
        log::info!("topology written to {}", path.display());
    }
    if let Some(path) = &args.dot {
        fs::write(path, topology.to_string())
            .with_context(|| format!("cannot write {}", path.display()))?;
        log::info!("dot written to {}", path.display());
    }
    if args.output.is_none() && args.dot.is_none() {
        print!("{}", topology);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Arguments::from_args();
    let config = args.configuration()?;
    let endpoints = standard_endpoints(
        args.caches.unwrap_or(config.num_cpus),
        args.dirs.unwrap_or(config.num_dirs),
        args.dmas,
    );

    let topology = fabric::synthesize_with(&config, &endpoints, None)
        .with_context(|| format!("synthesis of {} failed", config.topology.name()))?;
    log::info!(
        "{}: {} routers, {} endpoints, {} links",
        topology.name(),
        topology.routers().len(),
        topology.external_links().len(),
        topology.logical_edge_count()
    );
    write_outputs(&args, &topology)
}
