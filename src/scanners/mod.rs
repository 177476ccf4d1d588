pub mod chapters;

pub use chapters::ChapterScanner;
