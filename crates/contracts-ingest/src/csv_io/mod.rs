//! CSV reading and writing.

mod reader;
mod writer;

pub use reader::read_csv_frame;
pub use writer::{publish_csv_frame, write_csv_frame, write_csv_rows};
