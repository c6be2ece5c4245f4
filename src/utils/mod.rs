pub mod logs;

pub use logs::{log_error, log_flagged, log_init, log_standings, print_song_report};
