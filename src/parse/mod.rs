pub mod heading;
pub mod tags;

pub use heading::{HeadingBlock, parse_heading_block};
pub use tags::{extract_tags, normalize_tag, strip_tags};
