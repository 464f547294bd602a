mod format;
mod path;

pub use format::{format_duration, format_percent, format_timestamp};
pub use path::{extension_label, top_level_dir};
