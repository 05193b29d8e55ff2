//! Drawing rendered pages into a terminal area.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};

use crate::renderer::{Raster, RenderedPage};

/// One page in a titled frame, or a placeholder message.
pub(crate) struct PageView<'a> {
    pub title: String,
    pub content: PageContent<'a>,
}

pub(crate) enum PageContent<'a> {
    Page(&'a RenderedPage),
    Message(&'a str),
}

impl Widget for PageView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().dim())
            .title(self.title);
        let inner = block.inner(area);
        block.render(area, buf);

        match self.content {
            PageContent::Page(RenderedPage::Raster(raster)) => render_raster(raster, inner, buf),
            PageContent::Page(RenderedPage::Text(lines)) => {
                // Extracted text keeps blank lines, so wrap per source line.
                let width = usize::from(inner.width.max(1));
                let lines: Vec<Line> = lines
                    .iter()
                    .flat_map(|l| textwrap::wrap(l, width))
                    .map(|l| Line::from(l.into_owned()))
                    .collect();
                Paragraph::new(lines).render(inner, buf);
            }
            PageContent::Message(message) => {
                Paragraph::new(message.to_string().dim().italic())
                    .wrap(Wrap { trim: true })
                    .render(inner, buf);
            }
        }
    }
}

/// Half-block raster: each cell shows two vertically stacked pixels.
///
/// The raster is scaled to fit `area` with its aspect ratio kept, sampling
/// the nearest pixel.
fn render_raster(raster: &Raster, area: Rect, buf: &mut Buffer) {
    if area.width == 0 || area.height == 0 || raster.width == 0 || raster.height == 0 {
        return;
    }
    let target_w = u32::from(area.width);
    let target_h = u32::from(area.height) * 2;
    let scale = f64::min(
        f64::from(target_w) / f64::from(raster.width),
        f64::from(target_h) / f64::from(raster.height),
    );
    let out_w = ((f64::from(raster.width) * scale).floor() as u32).clamp(1, target_w);
    let out_h = ((f64::from(raster.height) * scale).floor() as u32).clamp(1, target_h);

    let sample = |x: u32, y: u32| {
        let sx = x * raster.width / out_w;
        let sy = y * raster.height / out_h;
        let [r, g, b] = raster.pixel(sx, sy);
        Color::Rgb(r, g, b)
    };

    for row in 0..out_h.div_ceil(2) {
        for col in 0..out_w {
            let top = sample(col, row * 2);
            let bottom = if row * 2 + 1 < out_h {
                sample(col, row * 2 + 1)
            } else {
                Color::Reset
            };
            let x = area.x + col as u16;
            let y = area.y + row as u16;
            buf[(x, y)].set_char('▀').set_fg(top).set_bg(bottom);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn raster_fills_half_blocks() {
        let raster = Raster {
            width: 2,
            height: 2,
            pixels: vec![[255, 0, 0], [255, 0, 0], [0, 0, 255], [0, 0, 255]],
        };
        let page = RenderedPage::Raster(raster);
        let area = Rect::new(0, 0, 4, 3);
        let mut buf = Buffer::empty(area);
        PageView {
            title: String::new(),
            content: PageContent::Page(&page),
        }
        .render(area, &mut buf);

        let cell = &buf[(1, 1)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn text_pages_wrap_on_words() {
        let page = RenderedPage::Text(vec!["gate looks fine".into(), String::new(), "end".into()]);
        let area = Rect::new(0, 0, 10, 7);
        let mut buf = Buffer::empty(area);
        PageView {
            title: String::new(),
            content: PageContent::Page(&page),
        }
        .render(area, &mut buf);

        let row = |y: u16| -> String {
            (1..9)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect::<String>()
                .trim_end()
                .to_string()
        };
        assert_eq!(row(1), "gate");
        assert_eq!(row(2), "looks");
        assert_eq!(row(3), "fine");
        assert_eq!(row(4), "");
        assert_eq!(row(5), "end");
    }

    #[test]
    fn message_is_rendered_inside_frame() {
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        PageView {
            title: "p1".into(),
            content: PageContent::Message("missing"),
        }
        .render(area, &mut buf);
        let row: String = (1..8).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert_eq!(row, "missing");
    }
}
