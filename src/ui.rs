//! Scaled, two-channel bar graph painted through a [`Surface`].
//!
//! Layout on an 8 row graph (`D` download bars, `U` upload bars):
//!
//! ```text
//!  Downloaded (1.2 MB/s):                        Uploaded (80.0 KB/s):
//!  1230 D                                          80      U
//!       D D                                                U U
//!  ...
//!     0 D D D D                                     0  U U U U
//! ```

use ratatui::{backend::Backend, style::Modifier};

use crate::constants::{
    DEFAULT_DOWNLOAD_COLOR, DEFAULT_UPLOAD_COLOR, DOWNLOAD_BAR_COL, DOWNLOAD_LABEL_COL,
    GRAPH_HEIGHT, GRAPH_WIDTH, UPLOAD_BAR_COL, UPLOAD_LABEL_COL,
};
use crate::errors::Result;
use crate::history::{BandwidthSample, SampleWindow};
use crate::surface::Surface;
use crate::util::{axis_label, size_label};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChannel {
    Download,
    Upload,
}

impl ColorChannel {
    pub const ALL: [ColorChannel; 2] = [ColorChannel::Download, ColorChannel::Upload];

    pub fn label_col(self) -> u16 {
        match self {
            ColorChannel::Download => DOWNLOAD_LABEL_COL,
            ColorChannel::Upload => UPLOAD_LABEL_COL,
        }
    }

    pub fn bar_col(self) -> u16 {
        match self {
            ColorChannel::Download => DOWNLOAD_BAR_COL,
            ColorChannel::Upload => UPLOAD_BAR_COL,
        }
    }

    fn title(self) -> &'static str {
        match self {
            ColorChannel::Download => "Downloaded",
            ColorChannel::Upload => "Uploaded",
        }
    }

    fn value(self, sample: &BandwidthSample) -> u64 {
        match self {
            ColorChannel::Download => sample.download_bytes,
            ColorChannel::Upload => sample.upload_bytes,
        }
    }
}

/// Largest value in the window, never below 1 so it is always a safe divisor.
pub fn scale_max(values: &[u64]) -> u64 {
    values.iter().copied().max().unwrap_or(0).max(1)
}

/// Rows a column fills, `floor(GRAPH_HEIGHT * value / max)` clamped to the graph.
pub fn bar_height(value: u64, max: u64) -> u16 {
    if max == 0 {
        return 0;
    }
    let rows = u128::from(GRAPH_HEIGHT) * u128::from(value) / u128::from(max);
    u16::try_from(rows).map_or(GRAPH_HEIGHT, |rows| rows.min(GRAPH_HEIGHT))
}

/// Height of every graph column. Columns past the end of `values` stay empty.
pub fn bar_heights(values: &[u64]) -> [u16; GRAPH_WIDTH] {
    let max = scale_max(values);
    let mut heights = [0; GRAPH_WIDTH];
    for (height, &value) in heights.iter_mut().zip(values) {
        *height = bar_height(value, max);
    }
    heights
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphRenderer {
    download_color: String,
    upload_color: String,
}

impl GraphRenderer {
    pub fn new(download_color: impl Into<String>, upload_color: impl Into<String>) -> Self {
        Self {
            download_color: download_color.into(),
            upload_color: upload_color.into(),
        }
    }

    pub fn color(&self, channel: ColorChannel) -> &str {
        match channel {
            ColorChannel::Download => &self.download_color,
            ColorChannel::Upload => &self.upload_color,
        }
    }

    /// Repaints the whole graph from `window` as a single frame.
    pub fn render<B: Backend>(&self, window: &SampleWindow, surface: &mut Surface<B>) -> Result<()> {
        // Fail on a bad color before the previous frame is wiped
        for channel in ColorChannel::ALL {
            surface.colors().resolve(self.color(channel))?;
        }

        surface.erase();
        for channel in ColorChannel::ALL {
            self.draw_channel(channel, window, surface)?;
        }
        surface.present();
        Ok(())
    }

    fn draw_channel<B: Backend>(
        &self,
        channel: ColorChannel,
        window: &SampleWindow,
        surface: &mut Surface<B>,
    ) -> Result<()> {
        let values: Vec<u64> = window.snapshot().iter().map(|s| channel.value(s)).collect();
        let color = Some(self.color(channel));
        let label_col = channel.label_col();

        let current = values.first().copied().unwrap_or(0);
        let header = format!("{} ({}/s):", channel.title(), size_label(current));
        surface.add_text(0, label_col, &header, color, Modifier::BOLD)?;

        surface.add_text(1, label_col, &axis_label(scale_max(&values)), color, Modifier::empty())?;
        surface.add_text(GRAPH_HEIGHT, label_col, &axis_label(0), color, Modifier::empty())?;

        for (col, height) in (channel.bar_col()..).zip(bar_heights(&values)) {
            for row in 0..height {
                surface.add_text(GRAPH_HEIGHT - row, col, " ", color, Modifier::REVERSED)?;
            }
        }
        Ok(())
    }
}

impl Default for GraphRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_DOWNLOAD_COLOR, DEFAULT_UPLOAD_COLOR)
    }
}
