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

//! DSENT router and link model configuration.
//!
//! The files depend only on the power model parameters, never on the
//! synthesized graph.

use anyhow::Context;
use std::fs;
use std::path::Path;

use crate::config::PowerModelConfiguration;

pub const ROUTER_CFG: &str = "router.cfg";
pub const LINK_CFG: &str = "electrical-link.cfg";

const TECH_MODEL: &str = "ext/dsent/tech/tech_models/TG11LVT.model";
const FREQUENCY_HZ: f64 = 1.0e9;
const WIRE_LENGTH_M: f64 = 1.0e-3;
const WIRE_DELAY_S: f64 = 1.0e-9;

/// Two control networks and one data network.
const VIRTUAL_NETWORKS: usize = 3;

pub fn router_config(config: &PowerModelConfiguration) -> String {
    let vcs = vec![config.vcs_per_vnet.to_string(); VIRTUAL_NETWORKS];
    let buffers = [
        config.buffers_per_ctrl_vc,
        config.buffers_per_ctrl_vc,
        config.buffers_per_data_vc,
    ];
    format!(
        r#"# Name of model to be built and evaluated
ModelName                               = Router

QueryString                             = \
    Energy>>Router:WriteBuffer@0 \
    Energy>>Router:ReadBuffer@0 \
    Energy>>Router:TraverseCrossbar->Multicast1@0 \
    Energy>>Router:ArbitrateSwitch->ArbitrateStage1@0 \
    Energy>>Router:ArbitrateSwitch->ArbitrateStage2@0 \
    Energy>>Router:DistributeClock@0 \
    NddPower>>Router:Leakage@1 \
    Area>>Router:Active@1 \

ElectricalTechModelFilename             = {tech}

IsPerformTimingOptimization             = true
TimingOptimization->StartNetNames       = [*]
Frequency                               = {frequency:e}

# Port counts are overwritten per router by the power/area script
NumberInputPorts                        = 1
NumberOutputPorts                       = 1
NumberBitsPerFlit                       = {bits}

NumberVirtualNetworks                   = {vnets}
NumberVirtualChannelsPerVirtualNetwork  = [{vcs}]
NumberBuffersPerVirtualChannel          = [{buffers}]

InputPort->BufferModel                  = DFFRAM
CrossbarModel                           = MultiplexerCrossbar
SwitchAllocator->ArbiterModel           = MatrixArbiter
ClockTreeModel                          = BroadcastHTree
ClockTree->NumberLevels                 = 5
ClockTree->WireLayer                    = Global
ClockTree->WireWidthMultiplier          = 1.0

BufRdInjectionRate                      = 1.0
BufWrInjectionRate                      = 1.0
XbarInjectionRate                       = 1.0
SAInjectionRate                         = 1.0

EvaluateString                          = \
    buf_rd_ejection_rate   = $(NumberInputPorts) * $(BufRdInjectionRate) / $(NumberOutputPorts); \
    buf_wr_ejection_rate   = $(NumberInputPorts) * $(BufWrInjectionRate) / $(NumberOutputPorts); \
    xbar_ejection_rate     = $(NumberInputPorts) * $(XbarInjectionRate) / $(NumberOutputPorts); \
    sa_ejection_rate       = $(NumberInputPorts) * $(SAInjectionRate) / $(NumberOutputPorts); \
    buf_rd_dynamic         = $(Energy>>Router:ReadBuffer) * $(Frequency); \
    buf_wr_dynamic         = $(Energy>>Router:WriteBuffer) * $(Frequency); \
    buf_static             = $(NddPower>>Router->InputPort:Leakage) * $(NumberInputPorts) + ($(NddPower>>Router->PipelineReg0:Leakage) + $(NddPower>>Router->PipelineReg1:Leakage)) * $(NumberInputPorts) * $(NumberBitsPerFlit); \
    xbar_o_dynamic         = $(Energy>>Router:TraverseCrossbar->Multicast1) * $(Frequency); \
    xbar_static            = $(NddPower>>Router->Crossbar:Leakage) + $(NddPower>>Router->PipelineReg2_0:Leakage) * $(NumberOutputPorts) * $(NumberBitsPerFlit); \
    sa_o_dynamic           = ($(Energy>>Router:ArbitrateSwitch->ArbitrateStage1) + $(Energy>>Router:ArbitrateSwitch->ArbitrateStage2)) * $(Frequency); \
    sa_static              = $(NddPower>>Router->SwitchAllocator:Leakage); \
    clock_o_dynamic        = $(Energy>>Router:DistributeClock) * $(Frequency); \
    clock_static           = $(NddPower>>Router->ClockTree:Leakage); \
    buffer_dynamic         = buf_wr_dynamic * $(BufRdInjectionRate) * $(NumberInputPorts) + buf_rd_dynamic * buf_wr_ejection_rate * $(NumberOutputPorts); \
    buffer_leakage         = buf_static; \
    xbar_dynamic           = xbar_o_dynamic * xbar_ejection_rate * $(NumberOutputPorts); \
    xbar_leakage           = xbar_static; \
    sa_dynamic             = sa_o_dynamic * sa_ejection_rate * $(NumberOutputPorts); \
    sa_leakage             = sa_static; \
    clock_dynamic          = clock_o_dynamic; \
    clock_leakage          = clock_static; \
    total_dynamic          = buffer_dynamic + xbar_dynamic + sa_dynamic + clock_dynamic; \
    total_leakage          = buffer_leakage + xbar_leakage + sa_leakage + clock_leakage; \
    buf_area               = ($(Area>>Router->InputPort:Active) + ($(Area>>Router->PipelineReg0:Active) + $(Area>>Router->PipelineReg1:Active)) * $(NumberBitsPerFlit)) * $(NumberInputPorts); \
    xbar_area              = $(Area>>Router->Crossbar:Active) + $(Area>>Router->Crossbar_Sel_DFF:Active) + $(Area>>Router->PipelineReg2_0:Active) * $(NumberBitsPerFlit) * $(NumberOutputPorts); \
    sa_area                = $(Area>>Router->SwitchAllocator:Active); \
    other_area             = $(Area>>Router->ClockTree:Active); \
    total_area             = 1.1 * (buf_area + xbar_area + sa_area + other_area); \
    print "Buffer/Dynamic power: " buffer_dynamic; \
    print "Buffer/Leakage power: " buffer_leakage; \
    print "Crossbar/Dynamic power: " xbar_dynamic; \
    print "Crossbar/Leakage power: " xbar_leakage; \
    print "Switch allocator/Dynamic power: " sa_dynamic; \
    print "Switch allocator/Leakage power: " sa_leakage; \
    print "Clock/Dynamic power: " clock_dynamic; \
    print "Clock/Leakage power: " clock_leakage; \
    print "Area/Buffer: " buf_area; \
    print "Area/Crossbar: " xbar_area; \
    print "Area/Switch allocator: " sa_area; \
    print "Area/Other: " other_area; \
    print "Area/Total: " total_area; \
    print "Total/Dynamic power: " total_dynamic; \
    print "Total/Leakage power: " $(NddPower>>Router:Leakage); \
"#,
        tech = TECH_MODEL,
        frequency = FREQUENCY_HZ,
        bits = config.link_width_bits,
        vnets = VIRTUAL_NETWORKS,
        vcs = vcs.join(", "),
        buffers = buffers.iter().map(|b| b.to_string()).collect::<Vec<_>>().join(", "),
    )
}

pub fn link_config(config: &PowerModelConfiguration) -> String {
    format!(
        r#"# Name of model to be built and evaluated
ModelName                               = RepeatedLink

QueryString                             = \
    Energy>>RepeatedLink:Send@0 \
    NddPower>>RepeatedLink:Leakage@0 \
    Area>>RepeatedLink:Active@0 \

InjectionRate                           = 1
EvaluateString                          = \
    link_dynamic    = $(Energy>>RepeatedLink:Send) * $(Frequency); \
    link_static     = $(NddPower>>RepeatedLink:Leakage); \
    print "    Dynamic power: " link_dynamic * $(InjectionRate); \
    print "    Leakage power: " link_static; \

ElectricalTechModelFilename             = {tech}

# Links insert their own repeaters from Delay; never optimize them
IsPerformTimingOptimization             = false
TimingOptimization->StartNetNames       = []
Frequency                               = {frequency:e}

NumberBits                              = {bits}
WireLayer                               = Global
WireWidthMultiplier                     = 1.0
WireSpacingMultiplier                   = 1.0

WireLength                              = {length:e}
Delay                                   = {delay:e}
"#,
        tech = TECH_MODEL,
        frequency = FREQUENCY_HZ,
        bits = config.link_width_bits,
        length = WIRE_LENGTH_M,
        delay = WIRE_DELAY_S,
    )
}

/// Write `router.cfg` and `electrical-link.cfg` into `dir`.
pub fn write_power_model<P: AsRef<Path>>(
    dir: P,
    config: &PowerModelConfiguration,
) -> anyhow::Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    let files = [
        (ROUTER_CFG, router_config(config)),
        (LINK_CFG, link_config(config)),
    ];
    for (name, contents) in files.iter() {
        let path = dir.join(name);
        fs::write(&path, contents).with_context(|| format!("cannot write {}", path.display()))?;
        log::info!("wrote power model {}", path.display());
    }
    Ok(())
}
