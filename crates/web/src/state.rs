use std::sync::Arc;

use aiparse::ScoreReader;
use storage::services::Tournament;

#[derive(Clone)]
pub struct AppState {
    pub tournament: Arc<Tournament>,
    pub score_reader: Arc<dyn ScoreReader>,
}

impl AppState {
    pub fn new(tournament: Arc<Tournament>, score_reader: Arc<dyn ScoreReader>) -> Self {
        Self {
            tournament,
            score_reader,
        }
    }
}
