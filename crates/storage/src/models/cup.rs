use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticCup {
    pub name: &'static str,
    pub cup: &'static str,
    pub icon: &'static str,
}

const fn cup(name: &'static str, cup: &'static str, icon: &'static str) -> StaticCup {
    StaticCup { name, cup, icon }
}

pub const CUPS: [StaticCup; 24] = [
    cup("Mushroom Cup", "mushroom", "🍄"),
    cup("Flower Cup", "flower", "🌸"),
    cup("Star Cup", "star", "⭐"),
    cup("Special Cup", "special", "👑"),
    cup("Shell Cup", "shell", "🐢"),
    cup("Banana Cup", "banana", "🍌"),
    cup("Leaf Cup", "leaf", "🍃"),
    cup("Lightning Cup", "lightning", "⚡"),
    cup("Egg Cup", "egg", "🥚"),
    cup("Triforce Cup", "triforce", "🔺"),
    cup("Crossing Cup", "crossing", "🍃"),
    cup("Bell Cup", "bell", "🔔"),
    cup("Golden Dash Cup", "golden-dash", "🍄"),
    cup("Lucky Cat Cup", "lucky-cat", "🐱"),
    cup("Turnip Cup", "turnip", "🥕"),
    cup("Propeller Cup", "propeller", "✈️"),
    cup("Rock Cup", "rock", "🪨"),
    cup("Moon Cup", "moon", "🌙"),
    cup("Fruit Cup", "fruit", "🍑"),
    cup("Boomerang Cup", "boomerang", "🪃"),
    cup("Feather Cup", "feather", "🪶"),
    cup("Cherry Cup", "cherry", "🍒"),
    cup("Acorn Cup", "acorn", "🌰"),
    cup("Spiny Cup", "spiny", "🦔"),
];

pub fn find_cup(slug: &str) -> Option<&'static StaticCup> {
    CUPS.iter().find(|c| c.cup == slug)
}

/// Per-year assignment row from `cups_rounds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CupRound {
    pub year: i32,
    pub cup: String,
    pub round: i32,
}

/// Catalog entry joined with its round for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Cup {
    pub name: String,
    pub cup: String,
    pub icon: String,
    pub round: Option<i32>,
}

impl Cup {
    pub fn unplayed(static_cup: &StaticCup) -> Self {
        Self {
            name: static_cup.name.to_string(),
            cup: static_cup.cup.to_string(),
            icon: static_cup.icon.to_string(),
            round: None,
        }
    }

    pub fn is_played(&self) -> bool {
        self.round.is_some()
    }
}

/// Joins the catalog with one year's rows, keeping catalog order.
/// Rows for slugs that are not in the catalog are ignored.
pub fn join_cups(rows: &[CupRound]) -> Vec<Cup> {
    CUPS.iter()
        .map(|static_cup| Cup {
            round: rows
                .iter()
                .find(|row| row.cup == static_cup.cup)
                .map(|row| row.round),
            ..Cup::unplayed(static_cup)
        })
        .collect()
}

pub fn max_round(cups: &[Cup]) -> i32 {
    cups.iter().filter_map(|c| c.round).max().unwrap_or(0)
}
