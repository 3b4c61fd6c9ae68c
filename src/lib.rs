pub mod cli;
pub mod codec;
pub mod decoder;
pub mod error;
pub mod history;
pub mod input;
pub mod merge;
pub mod model;
pub mod output;
pub mod schema;

pub use error::{Result, RstatsError};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_IO_ERROR: i32 = 1;
pub const EXIT_FORMAT_ERROR: i32 = 2;
pub const EXIT_BUFFER_OVERRUN: i32 = 3;
