// Graph geometry, fixed for the lifetime of the process
pub const GRAPH_WIDTH: usize = 40; // one column per retained sample
pub const GRAPH_HEIGHT: u16 = 8;

// Screen layout: each channel gets a label column and a bar region
pub const DOWNLOAD_LABEL_COL: u16 = 1;
pub const DOWNLOAD_BAR_COL: u16 = 6;
pub const UPLOAD_LABEL_COL: u16 = GRAPH_WIDTH as u16 + 7;
pub const UPLOAD_BAR_COL: u16 = GRAPH_WIDTH as u16 + 12;

pub const DEFAULT_DOWNLOAD_COLOR: &str = "green";
pub const DEFAULT_UPLOAD_COLOR: &str = "blue";

pub const DEFAULT_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_CONFIG_FILE: &str = "bwgraph.toml";
