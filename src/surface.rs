use std::collections::BTreeMap;
use std::io::{self, Stdout};

use log::{debug, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    Terminal,
};

use crate::errors::{GraphError, Result};
use crate::terminal::TerminalSession;

const NAMED_COLORS: [(&str, Color); 8] = [
    ("red", Color::Red),
    ("green", Color::Green),
    ("yellow", Color::Yellow),
    ("blue", Color::Blue),
    ("cyan", Color::Cyan),
    ("magenta", Color::Magenta),
    ("black", Color::Black),
    ("white", Color::White),
];

// Semantic color name -> color actually drawn
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    colors: BTreeMap<&'static str, Color>,
}

impl ColorMap {
    pub fn full() -> Self {
        Self {
            colors: NAMED_COLORS.into_iter().collect(),
        }
    }

    // Same names, default foreground
    pub fn monochrome() -> Self {
        Self {
            colors: NAMED_COLORS
                .into_iter()
                .map(|(name, _)| (name, Color::Reset))
                .collect(),
        }
    }

    pub fn detect() -> Self {
        if std::env::var_os("NO_COLOR").is_some() {
            return Self::monochrome();
        }
        let available = crossterm::style::available_color_count();
        if available >= 8 {
            Self::full()
        } else {
            warn!("terminal reports {available} colors, drawing in monochrome");
            Self::monochrome()
        }
    }

    pub fn resolve(&self, name: &str) -> Result<Color> {
        self.colors
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::UnknownColor {
                name: name.to_string(),
                recognized: self.recognized(),
            })
    }

    pub fn recognized(&self) -> String {
        self.colors.keys().copied().collect::<Vec<_>>().join(", ")
    }
}

pub struct Surface<B: Backend> {
    terminal: Terminal<B>,
    frame: Buffer,
    colors: ColorMap,
    session: Option<TerminalSession>,
    restored: bool,
}

impl Surface<CrosstermBackend<Stdout>> {
    pub fn stdout(colors: ColorMap) -> Result<Self> {
        let session = TerminalSession::enter()?;
        let mut surface = Self::new(CrosstermBackend::new(io::stdout()), colors)?;
        surface.session = Some(session);
        Ok(surface)
    }
}

impl<B: Backend> Surface<B> {
    pub fn new(backend: B, colors: ColorMap) -> Result<Self> {
        let mut terminal = Terminal::new(backend)?;
        if let Err(err) = terminal.hide_cursor() {
            warn!("cursor can't be hidden, leaving it visible: {err}");
        }
        let frame = Buffer::empty(terminal.size()?);

        Ok(Self {
            terminal,
            frame,
            colors,
            session: None,
            restored: false,
        })
    }

    /// Writes `text` at (`row`, `col`), truncated at the right edge and dropped
    /// entirely if it starts off screen. Unknown colors fail before any write.
    pub fn add_text(
        &mut self,
        row: u16,
        col: u16,
        text: &str,
        color: Option<&str>,
        modifier: Modifier,
    ) -> Result<()> {
        let mut style = Style::default().add_modifier(modifier);
        if let Some(name) = color {
            style = style.fg(self.colors.resolve(name)?);
        }

        let area = self.frame.area;
        if col >= area.width || row >= area.height {
            return Ok(());
        }

        let remaining = usize::from(area.width - col);
        self.frame
            .set_stringn(area.x + col, area.y + row, text, remaining, style);
        Ok(())
    }

    pub fn erase(&mut self) {
        match self.terminal.size() {
            Ok(area) if area != self.frame.area => self.frame.resize(area),
            Ok(_) => {}
            Err(err) => debug!("terminal size unavailable, keeping {:?}: {err}", self.frame.area),
        }
        self.frame.reset();
    }

    // Draw failures are dropped, the next sample repaints everything
    pub fn present(&mut self) {
        let frame = &self.frame;
        let result = self.terminal.draw(|f| {
            let area = f.size().intersection(frame.area);
            let buf = f.buffer_mut();
            for y in area.top()..area.bottom() {
                for x in area.left()..area.right() {
                    *buf.get_mut(x, y) = frame.get(x, y).clone();
                }
            }
        });
        if let Err(err) = result {
            debug!("dropped frame: {err}");
        }
    }

    // Only the first call does anything
    pub fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;

        if let Err(err) = self.terminal.show_cursor() {
            debug!("cursor restore failed: {err}");
        }
        // Leaves the alternate screen and raw mode.
        drop(self.session.take());
    }

    pub fn is_restored(&self) -> bool {
        self.restored
    }

    pub fn viewport(&self) -> Rect {
        self.frame.area
    }

    pub fn colors(&self) -> &ColorMap {
        &self.colors
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }
}

impl<B: Backend> Drop for Surface<B> {
    fn drop(&mut self) {
        self.restore();
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;

    use super::*;

    fn surface(width: u16, height: u16) -> Surface<TestBackend> {
        Surface::new(TestBackend::new(width, height), ColorMap::full()).unwrap()
    }

    fn row_text(surface: &Surface<TestBackend>, row: u16) -> String {
        let buffer = surface.backend().buffer();
        (0..buffer.area.width)
            .map(|x| buffer.get(x, row).symbol())
            .collect()
    }

    #[test]
    fn writes_at_position() {
        let mut surface = surface(10, 2);
        surface.add_text(1, 2, "abc", None, Modifier::empty()).unwrap();
        surface.present();

        assert_eq!(row_text(&surface, 0), "          ");
        assert_eq!(row_text(&surface, 1), "  abc     ");
    }

    #[test]
    fn truncates_at_right_edge() {
        let mut surface = surface(6, 1);
        surface
            .add_text(0, 3, "overflowing", Some("red"), Modifier::BOLD)
            .unwrap();
        surface.present();

        assert_eq!(row_text(&surface, 0), "   ove");
        let cell = surface.backend().buffer().get(5, 0);
        assert_eq!(cell.fg, Color::Red);
        assert!(cell.modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn ignores_writes_outside_viewport() {
        let mut surface = surface(4, 2);
        surface.add_text(0, 4, "x", None, Modifier::empty()).unwrap();
        surface.add_text(2, 0, "x", None, Modifier::empty()).unwrap();
        surface
            .add_text(u16::MAX, u16::MAX, "x", None, Modifier::empty())
            .unwrap();
        surface.present();

        assert_eq!(row_text(&surface, 0), "    ");
        assert_eq!(row_text(&surface, 1), "    ");
    }

    #[test]
    fn unknown_color_fails_before_drawing() {
        let mut surface = surface(8, 1);
        let err = surface
            .add_text(0, 0, "text", Some("purple"), Modifier::empty())
            .unwrap_err();
        surface.present();

        assert!(matches!(err, GraphError::UnknownColor { ref name, .. } if name == "purple"));
        assert!(err.to_string().contains("green"));
        assert_eq!(row_text(&surface, 0), "        ");
    }

    #[test]
    fn erase_clears_pending_frame() {
        let mut surface = surface(5, 1);
        surface.add_text(0, 0, "abc", None, Modifier::empty()).unwrap();
        surface.present();
        surface.erase();
        surface.add_text(0, 3, "z", None, Modifier::empty()).unwrap();
        surface.present();

        assert_eq!(row_text(&surface, 0), "   z ");
    }

    #[test]
    fn monochrome_keeps_names_but_drops_color() {
        let colors = ColorMap::monochrome();
        assert_eq!(colors.resolve("blue").unwrap(), Color::Reset);
        assert!(colors.resolve("orange").is_err());
        assert_eq!(colors.recognized(), ColorMap::full().recognized());
    }

    #[test]
    fn restore_runs_once() {
        let mut surface = surface(2, 1);
        assert!(!surface.is_restored());
        surface.restore();
        surface.restore();
        assert!(surface.is_restored());
    }
}
