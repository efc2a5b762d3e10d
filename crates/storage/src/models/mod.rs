pub mod cup;
pub mod player;
pub mod score;

pub use cup::{CUPS, Cup, CupRound, StaticCup, find_cup, join_cups, max_round};
pub use player::{Player, PlayerAssignment, PlayerIdentity, roster_order, sort_roster};
pub use score::{ScopeSetting, Score, ScoreScope};
