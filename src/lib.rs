//! Focus/rest interval timer for the terminal. While a focus session runs the foreground
//! application is sampled, and every completed session is logged with the time spent in each
//! application, so the day can be reviewed afterwards.

pub mod cli;
pub mod config;
pub mod monitor;
pub mod projects;
pub mod sessions;
pub mod timer;
pub mod utils;
pub mod window_api;
