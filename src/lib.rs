pub mod config;
pub mod error;
pub mod fetch;
pub mod flatten;
pub mod map;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod shapes;
pub mod stats;
pub mod time;

pub use error::{Error, Result};

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}
