pub mod feed;
pub mod tags;

pub use feed::FeedService;
pub use tags::{SubstringMatcher, TagMatcher};
