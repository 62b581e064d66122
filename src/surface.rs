use std::io::{self, Write};

pub type Rgb = (u8, u8, u8);

/// Size of one terminal cell in logical points.
pub const CELL_POINTS: (f32, f32) = (8.0, 16.0);

/// Backing pixels per logical point. A half-block pixel covers 8×8 points.
pub const PIXEL_DENSITY: f32 = 1.0 / 8.0;

/// 2D drawing target. All coordinates are logical points.
pub trait Surface {
    fn logical_size(&self) -> (f32, f32);

    /// Opaque fill of the whole surface.
    fn fill(&mut self, color: Rgb);

    /// Translucent fill of the whole surface, leaving fading trails behind.
    fn fade(&mut self, color: Rgb, alpha: f32);

    /// Disc of `radius` with a soft halo extending `blur` further out.
    fn glow(&mut self, x: f32, y: f32, radius: f32, blur: f32, color: Rgb, alpha: f32);
}

/// Logical size of a terminal of `cols` × `rows` cells.
pub fn logical_size(cols: u16, rows: u16) -> (f32, f32) {
    (cols as f32 * CELL_POINTS.0, rows as f32 * CELL_POINTS.1)
}

/// RGB pixel buffer presented with `▄` half blocks, two pixels per cell.
pub struct Canvas {
    cols: u16,
    rows: u16,
    width: usize,
    height: usize,
    pixels: Vec<[f32; 3]>,
    output_buf: Vec<u8>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16, base: Rgb) -> Self {
        let mut canvas = Self {
            cols: 0,
            rows: 0,
            width: 0,
            height: 0,
            pixels: Vec::new(),
            output_buf: Vec::new(),
        };
        canvas.resize(cols, rows, base);
        canvas
    }

    /// Recomputes the backing resolution from the logical size and pixel
    /// density. Pixel contents are reset to `base`.
    pub fn resize(&mut self, cols: u16, rows: u16, base: Rgb) {
        let (w, h) = logical_size(cols, rows);
        self.cols = cols;
        self.rows = rows;
        self.width = (w * PIXEL_DENSITY).round() as usize;
        self.height = (h * PIXEL_DENSITY).round() as usize;
        self.pixels = vec![to_f32(base); self.width * self.height];
        self.output_buf = Vec::with_capacity(self.width * self.height * 25);
        tracing::debug!(cols, rows, backing = ?self.backing_size(), "canvas sized");
    }

    pub fn cells(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    pub fn backing_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(to_u8(self.pixels[y * self.width + x]))
        } else {
            None
        }
    }

    fn blend(&mut self, x: usize, y: usize, color: [f32; 3], weight: f32) {
        let px = &mut self.pixels[y * self.width + x];
        for c in 0..3 {
            px[c] = px[c] * (1.0 - weight) + color[c] * weight;
        }
    }

    /// Writes the whole buffer as half-block cells starting at the home
    /// position. The caller flushes.
    pub fn render<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let mut prev_top: Option<Rgb> = None;
        let mut prev_bot: Option<Rgb> = None;

        for y in (0..self.height).step_by(2) {
            for x in 0..self.width {
                let top_idx = y * self.width + x;
                let bot_idx = if y + 1 < self.height {
                    (y + 1) * self.width + x
                } else {
                    top_idx
                };

                let top = to_u8(self.pixels[top_idx]);
                let bot = to_u8(self.pixels[bot_idx]);

                if prev_top != Some(top) {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top = Some(top);
                }
                if prev_bot != Some(bot) {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot = Some(bot);
                }

                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_top = None;
            prev_bot = None;
            if y + 2 < self.height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        out.write_all(&self.output_buf)
    }
}

impl Surface for Canvas {
    fn logical_size(&self) -> (f32, f32) {
        logical_size(self.cols, self.rows)
    }

    fn fill(&mut self, color: Rgb) {
        self.pixels.fill(to_f32(color));
    }

    fn fade(&mut self, color: Rgb, alpha: f32) {
        let color = to_f32(color);
        let alpha = alpha.clamp(0.0, 1.0);
        for px in &mut self.pixels {
            for c in 0..3 {
                px[c] = px[c] * (1.0 - alpha) + color[c] * alpha;
            }
        }
    }

    fn glow(&mut self, x: f32, y: f32, radius: f32, blur: f32, color: Rgb, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 || self.width == 0 || self.height == 0 {
            return;
        }

        let cx = x * PIXEL_DENSITY;
        let cy = y * PIXEL_DENSITY;
        let core = radius * PIXEL_DENSITY;
        let halo = (blur * PIXEL_DENSITY).max(f32::EPSILON);
        let reach = (core + halo).ceil() as isize;
        let color = to_f32(color);

        let (ix, iy) = (cx.floor() as isize, cy.floor() as isize);
        for py in iy - reach..=iy + reach {
            if py < 0 || py >= self.height as isize {
                continue;
            }
            for px in ix - reach..=ix + reach {
                if px < 0 || px >= self.width as isize {
                    continue;
                }

                // The pixel holding the centre is always fully lit.
                let weight = if px == ix && py == iy {
                    1.0
                } else {
                    let dx = px as f32 + 0.5 - cx;
                    let dy = py as f32 + 0.5 - cy;
                    let d = (dx * dx + dy * dy).sqrt();
                    if d <= core {
                        1.0
                    } else {
                        let falloff = (1.0 - (d - core) / halo).max(0.0);
                        falloff * falloff * 0.6
                    }
                };

                if weight > 0.0 {
                    self.blend(px as usize, py as usize, color, weight * alpha);
                }
            }
        }
    }
}

fn to_f32(c: Rgb) -> [f32; 3] {
    [c.0 as f32, c.1 as f32, c.2 as f32]
}

fn to_u8(c: [f32; 3]) -> Rgb {
    (
        c[0].round().clamp(0.0, 255.0) as u8,
        c[1].round().clamp(0.0, 255.0) as u8,
        c[2].round().clamp(0.0, 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb = (255, 255, 255);
    const BLACK: Rgb = (0, 0, 0);

    #[test]
    fn backing_size_follows_density() {
        let canvas = Canvas::new(80, 24, BLACK);
        assert_eq!(canvas.logical_size(), (640.0, 384.0));
        assert_eq!(canvas.backing_size(), (80, 48));
    }

    #[test]
    fn resize_recomputes_backing() {
        let mut canvas = Canvas::new(10, 5, BLACK);
        canvas.resize(20, 8, BLACK);
        assert_eq!(canvas.backing_size(), (20, 16));
        assert_eq!(canvas.cells(), (20, 8));
        assert_eq!(canvas.pixel(19, 15), Some(BLACK));
    }

    #[test]
    fn fade_moves_toward_color() {
        let mut canvas = Canvas::new(2, 1, BLACK);
        canvas.fade(WHITE, 0.5);
        assert_eq!(canvas.pixel(0, 0), Some((128, 128, 128)));
        canvas.fill(BLACK);
        assert_eq!(canvas.pixel(1, 1), Some(BLACK));
    }

    #[test]
    fn glow_lights_centre_and_falls_off() {
        let mut canvas = Canvas::new(10, 5, BLACK);
        canvas.glow(40.0, 40.0, 3.0, 25.0, WHITE, 1.0);
        assert_eq!(canvas.pixel(5, 5), Some(WHITE));
        let near = canvas.pixel(6, 5).unwrap().0;
        let far = canvas.pixel(8, 5).unwrap().0;
        assert!(near > far);
        assert_eq!(canvas.pixel(0, 0), Some(BLACK));
    }

    #[test]
    fn glow_off_surface_is_ignored() {
        let mut canvas = Canvas::new(4, 2, BLACK);
        canvas.glow(-500.0, 900.0, 3.0, 25.0, WHITE, 1.0);
        canvas.glow(10.0, 10.0, 3.0, 25.0, WHITE, 0.0);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(canvas.pixel(x, y), Some(BLACK));
            }
        }
    }

    #[test]
    fn render_emits_half_blocks_per_row() {
        let mut canvas = Canvas::new(3, 2, (1, 2, 3));
        let mut out = Vec::new();
        canvas.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\x1b[H"));
        assert_eq!(text.matches('▄').count(), 6);
        assert_eq!(text.matches("\r\n").count(), 1);
        assert!(text.contains("48;2;1;2;3m"));
    }
}
