use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use randomtree::{PixelBuffer, Rgb};
use std::io::{self, Write};

/// Upper half block: foreground paints the top pixel, background the bottom.
const HALF_BLOCK: char = '▀';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Reset,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }

    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }
}

/// Terminal cell rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Area {
    pub(crate) x: u16,
    pub(crate) y: u16,
    pub(crate) w: u16,
    pub(crate) h: u16,
}

pub(crate) struct Terminal {
    out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    force_full: bool,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            force_full: true,
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        self.force_full = true;
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    /// Flush changed cells.
    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if !self.force_full && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        self.force_full = false;
        Ok(())
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

fn term_color(c: Rgb) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Largest size with the image's aspect ratio that fits `avail`.
pub(crate) fn fit(img_w: u32, img_h: u32, avail_w: u32, avail_h: u32) -> (u32, u32) {
    if img_w == 0 || img_h == 0 || avail_w == 0 || avail_h == 0 {
        return (0, 0);
    }
    let scale = (avail_w as f64 / img_w as f64).min(avail_h as f64 / img_h as f64);
    let w = ((img_w as f64 * scale) as u32).clamp(1, avail_w);
    let h = ((img_h as f64 * scale) as u32).clamp(1, avail_h);
    (w, h)
}

/// Maps destination index `d` of `dst` onto a source of `src` samples.
fn scale_index(d: u32, src: u32, dst: u32) -> u32 {
    (d as u64 * src as u64 / dst as u64) as u32
}

/// Nearest-neighbour blit of `img` into `area`, two pixel rows per cell.
/// Undefined pixels of a stopped run are left as blank cells.
pub(crate) fn blit_image(buf: &mut CellBuffer, img: &PixelBuffer, area: Area) {
    let (dw, dh) = fit(img.width(), img.height(), area.w as u32, area.h as u32 * 2);
    if dw == 0 || dh == 0 {
        return;
    }
    let ox = area.x as u32 + (area.w as u32 - dw) / 2;
    let oy = area.y as u32 + (area.h as u32 - dh.div_ceil(2)) / 2;

    let sample = |dx: u32, dy: u32| -> Option<Rgb> {
        if dy >= dh {
            return None;
        }
        img.get(scale_index(dx, img.width(), dw), scale_index(dy, img.height(), dh))
    };

    for cy in 0..dh.div_ceil(2) {
        for cx in 0..dw {
            let top = sample(cx, cy * 2);
            let bottom = sample(cx, cy * 2 + 1);
            let cell = match (top, bottom) {
                (None, None) => Cell::default(),
                (top, bottom) => Cell {
                    ch: HALF_BLOCK,
                    fg: top.map(term_color).unwrap_or(Color::Reset),
                    bg: bottom.map(term_color).unwrap_or(Color::Reset),
                },
            };
            buf.set((ox + cx) as u16, (oy + cy) as u16, cell);
        }
    }
}
