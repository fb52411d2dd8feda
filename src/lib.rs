//! Live download/upload bar graph for a network interface.

pub mod app;
pub mod config;
pub mod constants;
pub mod errors;
pub mod history;
pub mod network;
pub mod source;
pub mod surface;
pub mod terminal;
pub mod ui;
pub mod util;

pub use app::{Dashboard, DashboardEvent, DashboardHandle, DashboardState};
pub use errors::{GraphError, Result};
pub use history::{BandwidthSample, SampleWindow};
pub use source::{BandwidthEvent, EventSource, Listener};
pub use surface::{ColorMap, Surface};
pub use ui::{ColorChannel, GraphRenderer};
