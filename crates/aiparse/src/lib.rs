pub mod error;
pub mod extractors;
pub mod parser;
pub mod traits;

pub use error::{AiParseError, Result};
pub use parser::{MAX_SCORE, ScoreParser};
pub use traits::ScoreReader;
