//! Read-only consumers of particle positions.
//!
//! A [`Renderer`] only ever sees a [`Frame`] borrowed between completed engine steps,
//! so it cannot observe a half-applied collision or mutate the engine.

use crate::core::Particle;
use tracing::trace;

/// Snapshot of the arena handed to renderers.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub time: f64,
    pub width: u32,
    pub particles: &'a [Particle],
}

pub trait Renderer {
    fn draw(&mut self, frame: &Frame<'_>);
}

impl<F: FnMut(&Frame<'_>)> Renderer for F {
    fn draw(&mut self, frame: &Frame<'_>) {
        self(frame)
    }
}

/// Logs every frame at `trace` level, one record per particle.
#[derive(Debug, Default)]
pub struct TraceRenderer {
    frames: u64,
}

impl TraceRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for TraceRenderer {
    fn draw(&mut self, frame: &Frame<'_>) {
        self.frames += 1;
        trace!(frame = self.frames, time = frame.time, "frame");
        for (i, p) in frame.particles.iter().enumerate() {
            trace!(particle = i, x = p.x(), y = p.y(), radius = p.radius);
        }
    }
}

/// Rasterises a frame into a `cols` x `rows` character grid.
///
/// Cells covered by a disk are drawn with `o`, the border with `+`, `-` and `|`.
/// Keeps only the most recent frame.
#[derive(Debug, Clone)]
pub struct AsciiRenderer {
    cols: usize,
    rows: usize,
    last: Option<String>,
}

impl AsciiRenderer {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
            last: None,
        }
    }

    /// The most recently drawn frame, if any.
    pub fn output(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// Render `frame` to a string without keeping it.
    pub fn render(&self, frame: &Frame<'_>) -> String {
        let w = f64::from(frame.width.max(1));
        let (cw, ch) = (w / self.cols as f64, w / self.rows as f64);
        let mut grid = vec![vec![' '; self.cols]; self.rows];

        for p in frame.particles {
            for (row, line) in grid.iter_mut().enumerate() {
                let cy = (row as f64 + 0.5) * ch;
                for (col, cell) in line.iter_mut().enumerate() {
                    let cx = (col as f64 + 0.5) * cw;
                    let (dx, dy) = (cx - p.x(), cy - p.y());
                    // A disk smaller than a cell still marks the cell holding its centre.
                    let inside = dx * dx + dy * dy <= p.radius * p.radius
                        || (dx.abs() <= cw / 2.0 && dy.abs() <= ch / 2.0);
                    if inside {
                        *cell = 'o';
                    }
                }
            }
        }

        let mut out = String::with_capacity((self.cols + 3) * (self.rows + 2));
        let border = format!("+{}+", "-".repeat(self.cols));
        out.push_str(&border);
        out.push('\n');
        for line in grid {
            out.push('|');
            out.extend(line);
            out.push_str("|\n");
        }
        out.push_str(&border);
        out.push('\n');
        out
    }
}

impl Renderer for AsciiRenderer {
    fn draw(&mut self, frame: &Frame<'_>) {
        self.last = Some(self.render(frame));
    }
}
