/// ASCII STL parser
///
/// Lines containing the `vertex` marker are scanned for float literals; each
/// line with exactly three of them contributes one point and every three
/// accepted points form a triangle. Malformed lines are skipped and reported
/// as [`ParseWarning`]s, never as errors.
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::geometry::{Mesh, Triangle};
use crate::lexer::float_literals;

/// Case-sensitive token identifying a vertex declaration
pub const VERTEX_MARKER: &str = "vertex";

/// How accepted points are grouped into triangles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// Count accepted points and close a triangle every third one
    #[default]
    Sequential,
    /// Like `Sequential`, but `facet`/`endfacet` lines discard a partial group
    Facet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A vertex line did not hold exactly three float literals
    TokenCount(usize),
    /// A facet boundary was reached with this many points still pending
    IncompleteFacet(usize),
    /// The stream ended with this many points that never formed a triangle
    TrailingPoints(usize),
}

/// A recoverable problem found while parsing. The offending input is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based line number
    pub line: usize,
    pub kind: WarningKind,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WarningKind::TokenCount(count) => write!(
                f,
                "line {}: expected 3 coordinates on vertex line, found {}",
                self.line, count
            ),
            WarningKind::IncompleteFacet(count) => write!(
                f,
                "line {}: facet boundary with {} pending vertices, dropped",
                self.line, count
            ),
            WarningKind::TrailingPoints(count) => write!(
                f,
                "line {}: {} trailing vertices do not form a triangle, dropped",
                self.line, count
            ),
        }
    }
}

/// Failure to obtain the text stream at all. No mesh is produced.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl OpenError {
    pub fn path(&self) -> &Path {
        match self {
            OpenError::Open { path, .. } | OpenError::Read { path, .. } => path,
        }
    }
}

/// Result of a parse: the mesh plus everything that was skipped
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub mesh: Mesh,
    pub warnings: Vec<ParseWarning>,
    /// Number of lines read
    pub lines: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MeshParser {
    mode: GroupingMode,
}

impl MeshParser {
    pub fn new(mode: GroupingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> GroupingMode {
        self.mode
    }

    /// Parse a text stream line by line.
    ///
    /// Invalid UTF-8 is decoded lossily. Only I/O failures of the reader are
    /// returned as errors.
    pub fn parse_with_report<R: BufRead>(&self, mut reader: R) -> io::Result<ParseReport> {
        let mut builder = TriangleBuilder::new(self.mode);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            builder.feed_line(line.trim_end_matches(&['\n', '\r'][..]));
        }

        let report = builder.finish();
        log_warnings(&report.warnings);
        Ok(report)
    }

    pub fn parse<R: BufRead>(&self, reader: R) -> io::Result<Mesh> {
        self.parse_with_report(reader).map(|report| report.mesh)
    }

    /// Parse an in-memory string; cannot fail
    pub fn parse_str(&self, input: &str) -> ParseReport {
        let mut builder = TriangleBuilder::new(self.mode);
        for line in input.lines() {
            builder.feed_line(line);
        }
        let report = builder.finish();
        log_warnings(&report.warnings);
        report
    }

    /// Open and parse the file at `path`
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<ParseReport, OpenError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| OpenError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        self.parse_with_report(BufReader::new(file))
            .map_err(|source| OpenError::Read {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Parse a text stream with the default grouping mode
pub fn parse<R: BufRead>(reader: R) -> io::Result<Mesh> {
    MeshParser::default().parse(reader)
}

/// Parse a string with the default grouping mode
pub fn parse_str(input: &str) -> Mesh {
    MeshParser::default().parse_str(input).mesh
}

/// Load a file with the default grouping mode
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh, OpenError> {
    MeshParser::default().load(path).map(|report| report.mesh)
}

fn log_warnings(warnings: &[ParseWarning]) {
    if warnings.is_empty() {
        return;
    }
    for warning in warnings {
        log::debug!("{}", warning);
    }
    log::warn!("skipped {} malformed entries while parsing mesh", warnings.len());
}

/// Accumulates accepted points and closes triangles
struct TriangleBuilder {
    mode: GroupingMode,
    pending: Vec<Point3<f32>>,
    mesh: Mesh,
    warnings: Vec<ParseWarning>,
    line: usize,
}

impl TriangleBuilder {
    fn new(mode: GroupingMode) -> Self {
        Self {
            mode,
            pending: Vec::with_capacity(3),
            mesh: Mesh::new(),
            warnings: Vec::new(),
            line: 0,
        }
    }

    fn feed_line(&mut self, line: &str) {
        self.line += 1;

        if self.mode == GroupingMode::Facet && is_facet_boundary(line) {
            if !self.pending.is_empty() {
                self.warn(WarningKind::IncompleteFacet(self.pending.len()));
                self.pending.clear();
            }
            return;
        }

        if !line.contains(VERTEX_MARKER) {
            return;
        }

        let mut coords = [0.0f32; 3];
        let mut count = 0;
        for value in float_literals(line) {
            if count < 3 {
                coords[count] = value;
            }
            count += 1;
        }

        if count != 3 {
            self.warn(WarningKind::TokenCount(count));
            return;
        }

        self.pending.push(Point3::new(coords[0], coords[1], coords[2]));
        if self.pending.len() == 3 {
            self.mesh.add_triangle(Triangle::new(
                self.pending[0],
                self.pending[1],
                self.pending[2],
            ));
            self.pending.clear();
        }
    }

    fn finish(mut self) -> ParseReport {
        if !self.pending.is_empty() {
            self.warn(WarningKind::TrailingPoints(self.pending.len()));
        }
        ParseReport {
            mesh: self.mesh,
            warnings: self.warnings,
            lines: self.line,
        }
    }

    fn warn(&mut self, kind: WarningKind) {
        self.warnings.push(ParseWarning {
            line: self.line,
            kind,
        });
    }
}

fn is_facet_boundary(line: &str) -> bool {
    matches!(
        line.split_whitespace().next(),
        Some("facet") | Some("endfacet")
    )
}
