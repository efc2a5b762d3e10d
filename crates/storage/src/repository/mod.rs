pub mod cup_round;
pub mod player;
pub mod score;

pub use cup_round::CupRoundRepository;
pub use player::PlayerRepository;
pub use score::ScoreRepository;
