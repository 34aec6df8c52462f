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

use std::fmt;

use crate::endpoint::{EndpointId, EndpointKind};
use crate::network::RouterRank;

/// Errors raised while validating a synthesis request.
///
/// All of them are configuration errors: synthesis is a deterministic
/// function of its inputs, so nothing can be retried without changing the
/// configuration or the endpoint list.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    NoRouters,
    InvalidRowCount { rows: usize, routers: usize },
    UnevenGrid { rows: usize, routers: usize },
    ConcentrationMismatch { cpus: usize, concentration: usize },
    UnevenCaches { caches: usize, routers: usize },
    TooManyDirectories { dirs: usize, caches: usize },
    InvalidDirectoryStride { dirs: usize, routers: usize },
    UnexpectedLeftover { endpoint: EndpointId, kind: EndpointKind },
    OddRouterCount(usize),
    RingTooSmall(usize),
    OddGrid { rows: usize, cols: usize },
    GridTooSmall { rows: usize, cols: usize },
    DuplicateSegmentRouter(RouterRank),
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NoRouters => write!(f, "ERROR: topology has no routers"),
            Self::InvalidRowCount { rows, routers } => {
                write!(
                    f,
                    "ERROR: {} rows is not valid for {} routers",
                    rows, routers
                )
            }
            Self::UnevenGrid { rows, routers } => {
                write!(
                    f,
                    "ERROR: {} routers do not divide evenly into {} rows",
                    routers, rows
                )
            }
            Self::ConcentrationMismatch { cpus, concentration } => {
                write!(
                    f,
                    "ERROR: {} cpus cannot be concentrated by a factor of {}",
                    cpus, concentration
                )
            }
            Self::UnevenCaches { caches, routers } => {
                write!(
                    f,
                    "ERROR: {} caches are not a multiple of {} routers",
                    caches, routers
                )
            }
            Self::TooManyDirectories { dirs, caches } => {
                write!(
                    f,
                    "ERROR: {} directories exceed {} caches",
                    dirs, caches
                )
            }
            Self::InvalidDirectoryStride { dirs, routers } => {
                write!(
                    f,
                    "ERROR: {} directories cannot be strided over {} routers",
                    dirs, routers
                )
            }
            Self::UnexpectedLeftover { endpoint, kind } => {
                write!(
                    f,
                    "ERROR: leftover endpoint {} is {:?}, only DMA may be left over",
                    endpoint, kind
                )
            }
            Self::OddGrid { rows, cols } => {
                write!(
                    f,
                    "ERROR: a {}x{} grid needs an even number of rows and columns",
                    rows, cols
                )
            }
            Self::GridTooSmall { rows, cols } => {
                write!(f, "ERROR: a {}x{} grid is smaller than 4x4", rows, cols)
            }
            Self::InvalidConfiguration(msg) => write!(f, "ERROR: invalid configuration: {}", msg),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}
