//! Chart rendering
//!
//! Charts are drawn with `plotters` onto either a bitmap (PNG) or SVG
//! backend. Text needs a TrueType font registered with plotters; when none
//! can be found the charts are still drawn, without titles and labels.

mod bar;
mod polar;
mod swarm;

pub use swarm::swarm_offsets;

use crate::config::{OutputConfig, PlotFormat};
use crate::error::AnalysisError;
use crate::stats::{ButtonCount, GapSeries, HOURS_PER_DAY};
use plotters::prelude::*;
use plotters::style::FontStyle;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Font family charts are drawn with
pub(crate) const FONT_FAMILY: &str = "sans-serif";

/// Bar colour, matching the common default of scientific plotting tools
pub(crate) const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED_FONT: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Register the first usable font with plotters; runs once per process
fn ensure_font(preferred: Option<&Path>) -> bool {
    REGISTERED_FONT
        .get_or_init(|| {
            let candidates = preferred
                .map(Path::to_path_buf)
                .into_iter()
                .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

            for path in candidates {
                let Ok(bytes) = std::fs::read(&path) else {
                    continue;
                };
                let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
                match plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
                    Ok(()) => {
                        debug!("Registered chart font {}", path.display());
                        return Some(path);
                    }
                    Err(_) => debug!("Unusable font file {}", path.display()),
                }
            }
            None
        })
        .is_some()
}

pub(crate) fn render_err(e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::Render(e.to_string())
}

/// Draw `$draw(&root, ...)` on the backend matching `$self.format` and
/// write the result to `$path`
macro_rules! on_backend {
    ($self:ident, $path:expr, |$root:ident| $body:expr) => {{
        let path: &Path = $path;
        match $self.format {
            PlotFormat::Png => {
                let $root = BitMapBackend::new(path, $self.size).into_drawing_area();
                $body.map_err(render_err)?;
                $root.present().map_err(render_err)?;
            }
            PlotFormat::Svg => {
                let $root = SVGBackend::new(path, $self.size).into_drawing_area();
                $body.map_err(render_err)?;
                $root.present().map_err(render_err)?;
            }
        }
        debug!("Wrote chart {}", path.display());
        Ok(())
    }};
}

/// Draws the analysis charts to image files
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    format: PlotFormat,
    size: (u32, u32),
    text: bool,
}

impl ChartRenderer {
    /// Create a renderer for `config`.
    ///
    /// The chart font is registered with plotters once per process: the
    /// first renderer created picks it (from `config.font` or the system
    /// paths), and later renderers reuse it whatever their own `font` says.
    pub fn new(config: &OutputConfig) -> Self {
        let text = ensure_font(config.font.as_deref());
        if !text {
            warn!("No TrueType font found; charts will be drawn without text (set output.font)");
        }
        Self {
            format: config.format,
            size: (config.width.max(200), config.height.max(200)),
            text,
        }
    }

    /// Whether titles and labels are drawn
    pub fn has_text(&self) -> bool {
        self.text
    }

    /// Horizontal bar chart of button press counts, most frequent on top
    pub fn button_counts(&self, counts: &[ButtonCount], path: &Path) -> Result<(), AnalysisError> {
        on_backend!(self, path, |root| bar::draw(&root, counts, self.text))
    }

    /// Swarm plot of gap seconds per transition category
    pub fn gaps(&self, series: &[GapSeries], path: &Path) -> Result<(), AnalysisError> {
        on_backend!(self, path, |root| swarm::draw(&root, series, self.text))
    }

    /// Polar histogram of events per hour of day
    pub fn clock(&self, bins: &[usize; HOURS_PER_DAY], path: &Path) -> Result<(), AnalysisError> {
        on_backend!(self, path, |root| polar::draw(&root, bins, self.text))
    }
}
