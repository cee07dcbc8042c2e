/// Presents the software canvas as coloured terminal cells
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use tw2d_core::{Canvas, RasterSurface};

/// Character ramp by coverage (empty to full)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Samples per cell along each axis
const SUBSAMPLES: u32 = 3;

/// Maps a canvas onto a fixed grid of terminal cells
pub struct TerminalRenderer {
    cols: usize,
    rows: usize,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl TerminalRenderer {
    pub fn new(cols: usize, rows: usize) -> Self {
        let size = cols * rows;
        Self {
            cols,
            rows,
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<(char, Color)> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        let idx = row * self.cols + col;
        Some((self.char_buffer[idx], self.color_buffer[idx]))
    }

    /// Resample the canvas into the cell buffers
    pub fn render(&mut self, canvas: &Canvas) {
        if self.cols == 0 || self.rows == 0 {
            return;
        }
        let cell_w = f64::from(canvas.width()) / self.cols as f64;
        let cell_h = f64::from(canvas.height()) / self.rows as f64;
        let n = f64::from(SUBSAMPLES * SUBSAMPLES);

        for row in 0..self.rows {
            for col in 0..self.cols {
                let mut coverage = 0.0;
                let (mut r, mut g, mut b) = (0.0, 0.0, 0.0);

                for sy in 0..SUBSAMPLES {
                    for sx in 0..SUBSAMPLES {
                        let fx = (f64::from(sx) + 0.5) / f64::from(SUBSAMPLES);
                        let fy = (f64::from(sy) + 0.5) / f64::from(SUBSAMPLES);
                        let x = (col as f64 + fx) * cell_w;
                        let y = (row as f64 + fy) * cell_h;
                        let px = canvas.sample(x, y);
                        let a = px.opacity();
                        coverage += a;
                        r += f64::from(px.r) * a;
                        g += f64::from(px.g) * a;
                        b += f64::from(px.b) * a;
                    }
                }

                let idx = row * self.cols + col;
                let level = coverage / n;
                let char_index = (level * (LUMINOSITY_RAMP.len() - 1) as f64).round() as usize;
                self.char_buffer[idx] = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];
                self.color_buffer[idx] = if coverage > 0.0 {
                    cell_color(r / coverage, g / coverage, b / coverage)
                } else {
                    Color::Reset
                };
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for row in 0..self.rows {
            writer.queue(cursor::MoveTo(0, row as u16))?;
            for col in 0..self.cols {
                let idx = row * self.cols + col;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Dark fills would vanish on a dark terminal background
fn cell_color(r: f64, g: f64, b: f64) -> Color {
    let luma = 0.299 * r + 0.587 * g + 0.114 * b;
    if luma < 48.0 {
        return Color::White;
    }
    Color::Rgb {
        r: r.round() as u8,
        g: g.round() as u8,
        b: b.round() as u8,
    }
}
