pub mod cup;
pub mod player;
pub mod score;

pub use cup::{CupActionResponse, CupsResponse};
pub use player::{
    AddPlayerRequest, ConfirmRoundResponse, ImportScoresRequest, ImportScoresResponse,
    MAX_PARSED_SCORE, RandomizeTeamsRequest, RemovePlayerResponse, RosterResponse,
    UpdateScoreRequest,
};
pub use score::{
    LiveScoresResponse, ParsedScoresResponse, ProgressionParams, ProgressionResponse,
    StandingsParams, YearsResponse,
};
