use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::error::{AiParseError, Result};
use crate::extractors::{OllamaClient, PromptBuilder, sniff_file_type};
use crate::traits::ScoreReader;

/// Highest score a results screen can show.
pub const MAX_SCORE: u32 = 999;

/// Reads scores with a local vision model.
pub struct ScoreParser {
    client: OllamaClient,
}

impl ScoreParser {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ScoreReader for ScoreParser {
    async fn read_scores(&self, image: &[u8], players: &[String]) -> Result<BTreeMap<String, u32>> {
        let players = normalize_players(players)?;

        if image.is_empty() {
            return Err(AiParseError::EmptyImage);
        }
        let file_type = sniff_file_type(image).ok_or(AiParseError::UnknownFileType)?;
        tracing::info!(
            "Parsing scores for {} players from a {} image ({} bytes)",
            players.len(),
            file_type.ext,
            image.len()
        );

        let text = self
            .client
            .generate_json_from_image(
                &PromptBuilder::system_prompt(),
                &PromptBuilder::user_prompt(&players),
                STANDARD.encode(image),
                PromptBuilder::response_schema(&players),
            )
            .await?;

        let scores = parse_response(&text)?;
        let missing = players.iter().filter(|p| !scores.contains_key(*p)).count();
        if missing > 0 {
            tracing::debug!("Model response has no exact key for {} of {} players", missing, players.len());
        }
        Ok(scores)
    }
}

/// Trims names, drops blanks and duplicates, keeps the given order.
pub fn normalize_players(players: &[String]) -> Result<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(players.len());
    for player in players {
        let name = player.trim();
        if !name.is_empty() && !normalized.iter().any(|n| n == name) {
            normalized.push(name.to_string());
        }
    }

    if normalized.is_empty() {
        return Err(AiParseError::NoPlayers);
    }
    Ok(normalized)
}

/// Validates the model's JSON into a bounded `name -> score` mapping.
///
/// Each value must be an integer in `0..=MAX_SCORE`. Keys come back exactly as
/// the model wrote them, so missing, renamed or extra names are left to the
/// caller's matching.
pub fn parse_response(text: &str) -> Result<BTreeMap<String, u32>> {
    if text.trim().is_empty() {
        return Err(AiParseError::NoResponse);
    }

    let value: Value = serde_json::from_str(text)?;
    let Value::Object(object) = value else {
        return Err(AiParseError::NotAnObject);
    };

    object
        .into_iter()
        .map(|(name, raw)| {
            let score = raw
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n <= MAX_SCORE)
                .ok_or_else(|| AiParseError::InvalidScore {
                    player: name.clone(),
                    value: raw.to_string(),
                })?;
            Ok((name, score))
        })
        .collect()
}
