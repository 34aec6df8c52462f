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

use anyhow::{bail, Context};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::emit::{DiagramSink, EdgeStyle};
use crate::families::Family;
use crate::layout::Coordinates;
use crate::network::{InternalLink, Router};
use crate::topology::Topology;

pub const TEX_FILE: &str = "topo.tex";
const PDF_FILE: &str = "topo.pdf";
// distance between neighbouring routers, in cm
const NODE_DISTANCE: f64 = 1.5;

/// Writes a topology as a standalone LaTeX/Tikz document.
pub struct TikzWriter<W: Write> {
    out: W,
    path_style: &'static str,
    in_path: bool,
}

impl TikzWriter<BufWriter<File>> {
    /// Create `topo.tex` in `dir`, creating the directory if needed.
    pub fn create<P: AsRef<Path>>(dir: P) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
        let path = dir.join(TEX_FILE);
        let file =
            File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
        log::info!("writing diagram to {}", path.display());
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TikzWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            path_style: "",
            in_path: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Paper size in inches. Square grids are drawn tighter.
fn paper_size(topology: &Topology) -> (usize, usize) {
    let grid = topology.grid();
    let scale = if grid.rows == grid.cols { 0.8 } else { 1.2 };
    let inches = |n: usize| (n as f64 * scale).ceil().max(1.0) as usize;
    (inches(grid.cols), inches(grid.rows))
}

fn path_style(family: Family) -> &'static str {
    match family {
        Family::FlattenedButterfly => "bend left=30,line width=0.2mm",
        _ => "line width=0.3mm",
    }
}

impl<W: Write> DiagramSink for TikzWriter<W> {
    fn begin(&mut self, topology: &Topology) -> io::Result<()> {
        let (width, height) = paper_size(topology);
        self.path_style = path_style(topology.family());
        self.in_path = false;
        writeln!(self.out, "% {}", topology.name())?;
        writeln!(self.out, "% generated {}", chrono::Utc::now())?;
        writeln!(self.out, "\\documentclass{{article}}")?;
        writeln!(self.out, "\\usepackage[utf8]{{inputenc}}")?;
        writeln!(self.out, "\\usepackage{{tikz}}")?;
        writeln!(
            self.out,
            "\\usepackage[paperwidth={}in,paperheight={}in]{{geometry}}",
            width, height
        )?;
        writeln!(self.out, "\\geometry{{margin=0.3in}}")?;
        writeln!(self.out, "\\begin{{document}}")?;
        writeln!(self.out, "\\pagenumbering{{gobble}}")?;
        writeln!(self.out, "\\begin{{figure}}[p]")?;
        writeln!(self.out, "\\centering")?;
        writeln!(
            self.out,
            "\\begin{{tikzpicture}}[shorten >=1pt,auto,align=center,thick,\
             main node/.style={{minimum size=25pt,fill=green!25,draw,\
             font=\\sffamily\\Large\\bfseries}}]"
        )
    }

    fn node(&mut self, router: &Router, at: Coordinates) -> io::Result<()> {
        writeln!(
            self.out,
            "    \\node[main node] ({0}) at ({1:.2},{2:.2}) {{{0}}};",
            router.rank,
            at.x as f64 * NODE_DISTANCE,
            at.y as f64 * NODE_DISTANCE
        )
    }

    fn edge(&mut self, link: &InternalLink, style: EdgeStyle) -> io::Result<()> {
        if !self.in_path {
            self.in_path = true;
            writeln!(
                self.out,
                "\n    \\path[every node/.style={{font=\\sffamily\\footnotesize}},\
                 every edge/.append style={{{}}}]",
                self.path_style
            )?;
        }
        let mut options = Vec::new();
        if style.bend_right {
            options.push("bend right=30".to_string());
        }
        if let Some(width) = style.line_width {
            options.push(format!("line width={}mm", width));
        }
        writeln!(
            self.out,
            "    ({}) edge [{}] node[] {{}} ({})",
            link.src,
            options.join(","),
            link.dst
        )
    }

    fn finish(&mut self) -> io::Result<()> {
        if self.in_path {
            writeln!(self.out, "    ;")?;
        }
        writeln!(self.out, "\\end{{tikzpicture}}")?;
        writeln!(self.out, "\\end{{figure}}")?;
        writeln!(self.out, "\\end{{document}}")?;
        self.out.flush()
    }
}

/// Run pdflatex on the `topo.tex` in `dir`.
pub fn render_pdf<P: AsRef<Path>>(dir: P) -> anyhow::Result<PathBuf> {
    let dir = dir.as_ref();
    let pdflatex = which::which("pdflatex").context("pdflatex not found in PATH")?;
    let output = Command::new(&pdflatex)
        .args(&["-halt-on-error", "-interaction=batchmode", TEX_FILE])
        .current_dir(dir)
        .output()
        .with_context(|| format!("failed to run {}", pdflatex.display()))?;
    if !output.status.success() {
        bail!(
            "pdflatex failed on {} with {}",
            dir.join(TEX_FILE).display(),
            output.status
        );
    }
    Ok(dir.join(PDF_FILE))
}

#[cfg(test)]
mod tikz_tests {
    use super::*;
    use crate::emit::draw;
    use crate::endpoint::standard_endpoints;
    use crate::tests::config;
    use mktemp::Temp;

    fn topology(family: Family, cpus: usize, rows: usize) -> Topology {
        let endpoints = standard_endpoints(cpus, 0, 0);
        crate::synthesize(&config(family, cpus, rows, 1), &endpoints).unwrap()
    }

    fn tikz(topo: &Topology) -> String {
        let mut writer = TikzWriter::new(Vec::new());
        assert!(draw(topo, &mut writer));
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_mesh_tikz() {
        let _logger = env_logger::builder().is_test(true).try_init();
        let tex = tikz(&topology(Family::Mesh, 4, 2));
        println!("{}", tex);
        assert!(tex.starts_with("% Mesh (2 x 2)\n"));
        assert!(tex.contains("paperwidth=2in,paperheight=2in"));
        assert!(tex.contains("\\node[main node] (3) at (1.50,1.50) {3};"));
        assert!(tex.contains("every edge/.append style={line width=0.3mm}"));
        assert!(tex.contains("    (0) edge [line width=1mm] node[] {} (1)\n"));
        assert!(tex.contains("    (0) edge [] node[] {} (2)\n"));
        assert_eq!(tex.matches(" edge [").count(), 4);
        assert!(tex.trim_end().ends_with("\\end{document}"));
    }

    #[test]
    fn test_flattened_butterfly_tikz() {
        let tex = tikz(&topology(Family::FlattenedButterfly, 8, 2));
        assert!(tex.contains("paperwidth=5in,paperheight=3in"));
        assert!(tex.contains("every edge/.append style={bend left=30,line width=0.2mm}"));
        assert!(tex.contains("    (0) edge [bend right=30,line width=0.6mm] node[] {} (1)\n"));
        assert!(tex.contains("    (3) edge [bend right=30] node[] {} (7)\n"));
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "broken pipe"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_broken_writer() {
        let _logger = env_logger::builder().is_test(true).try_init();
        let topo = topology(Family::Ring, 8, 2);
        let mut writer = TikzWriter::new(Broken);
        assert!(!draw(&topo, &mut writer));
        assert_eq!(topo.logical_edge_count(), 8);
    }

    #[test]
    fn test_create_and_render() {
        let _logger = env_logger::builder().is_test(true).try_init();
        let temp_dir = Temp::new_dir().unwrap();
        let dir = temp_dir.to_path_buf().join("diagram");
        let topo = topology(Family::HierarchicalRing, 16, 4);
        {
            let mut writer = TikzWriter::create(&dir).unwrap();
            assert!(draw(&topo, &mut writer));
        }
        let tex = fs::read_to_string(dir.join(TEX_FILE)).unwrap();
        assert_eq!(tex.matches("line width=1mm").count(), 4);
        if which::which("pdflatex").is_ok() {
            let pdf = render_pdf(&dir).unwrap();
            assert!(pdf.exists());
        }
    }
}
