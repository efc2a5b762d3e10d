use serde_json::{Map, Value, json};

use crate::parser::MAX_SCORE;

pub struct PromptBuilder;

impl PromptBuilder {
    pub fn system_prompt() -> String {
        r#"You read end-of-race leaderboards from kart racing screenshots and output ONLY valid JSON.

Rules:
1. Use the on-screen point totals, not positions
2. Player names on screen may be abbreviated or styled; match them to the given names
3. Scores are whole numbers
4. Return ONLY the JSON object, no explanations"#
            .to_string()
    }

    pub fn user_prompt(players: &[String]) -> String {
        format!(
            "Parse the user scores from this leaderboard image. The players are: {}. Return the scores in a JSON object with the players as the keys and the scores as the values.",
            players.join(", ")
        )
    }

    /// Schema requiring exactly `players` as integer properties.
    pub fn response_schema(players: &[String]) -> Value {
        let properties: Map<String, Value> = players
            .iter()
            .map(|player| {
                (
                    player.clone(),
                    json!({ "type": "integer", "minimum": 0, "maximum": MAX_SCORE }),
                )
            })
            .collect();

        json!({
            "type": "object",
            "required": players,
            "properties": properties,
            "additionalProperties": false,
        })
    }
}
