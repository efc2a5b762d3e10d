pub mod aggregation;
pub mod comparison;
pub mod cups;
pub mod grid;
pub mod roster;
pub mod score_import;
pub mod scoreboard;
pub mod sync;
pub mod teams;
pub mod tournament;

pub use aggregation::{Medal, PlayerScore, ProgressionSeries, ProgressionView, progression};
pub use comparison::ComparisonMode;
pub use cups::{CupManager, CupRejection, CupToggle, load_cups};
pub use grid::{ScoreGrid, build_score_grid};
pub use roster::{Confirmation, Removal, RosterManager};
pub use score_import::{MatchedScore, ScoreImportError, ScoreMatch};
pub use scoreboard::{Scoreboard, YearView, available_years, load_player_scores, load_year_view};
pub use tournament::Tournament;
