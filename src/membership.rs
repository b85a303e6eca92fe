//! Membership tiers and the games they unlock

use serde::{Deserialize, Serialize};

/// Account membership level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Starter,
    Plus,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Starter => "starter",
            Tier::Plus => "plus",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "starter" | "free" => Some(Tier::Starter),
            "plus" | "premium" => Some(Tier::Plus),
            _ => None,
        }
    }

    /// Scalar applied to earned primary-credit rewards
    pub fn multiplier(&self) -> f64 {
        match self {
            Tier::Starter => 1.0,
            Tier::Plus => 1.5,
        }
    }

    /// Most secondary credit a player may earn from games per day
    pub fn daily_secondary_cap(&self) -> u64 {
        match self {
            Tier::Starter => 75,
            Tier::Plus => 150,
        }
    }

    pub fn unlocks(&self, game: GameKind) -> bool {
        match self {
            Tier::Starter => matches!(game, GameKind::Bricks | GameKind::Trivia),
            Tier::Plus => true,
        }
    }

    /// Games playable at this tier, in menu order
    pub fn unlocked_games(&self) -> impl Iterator<Item = GameKind> + '_ {
        GameKind::ALL.into_iter().filter(|game| self.unlocks(*game))
    }
}

/// Every game the play tab offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    #[serde(rename = "zbrickles")]
    Bricks,
    #[serde(rename = "ztrivia")]
    Trivia,
    #[serde(rename = "ztetris")]
    FallingBlocks,
    #[serde(rename = "zslots")]
    Slots,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [
        GameKind::Bricks,
        GameKind::Trivia,
        GameKind::FallingBlocks,
        GameKind::Slots,
    ];

    /// Identifier used in result payloads
    pub fn api_id(&self) -> &'static str {
        match self {
            GameKind::Bricks => "zbrickles",
            GameKind::Trivia => "ztrivia",
            GameKind::FallingBlocks => "ztetris",
            GameKind::Slots => "zslots",
        }
    }

    pub fn from_api_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|game| game.api_id() == id)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GameKind::Bricks => "zBrickles",
            GameKind::Trivia => "zTrivia",
            GameKind::FallingBlocks => "zTetris",
            GameKind::Slots => "zSlots",
        }
    }

    /// Lowest tier that can play this game
    pub fn required_tier(&self) -> Tier {
        if Tier::Starter.unlocks(*self) {
            Tier::Starter
        } else {
            Tier::Plus
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_values() {
        assert_eq!(Tier::Starter.multiplier(), 1.0);
        assert_eq!(Tier::Plus.multiplier(), 1.5);
        assert_eq!(Tier::Starter.daily_secondary_cap(), 75);
        assert_eq!(Tier::Plus.daily_secondary_cap(), 150);
        assert_eq!(Tier::parse(" PLUS "), Some(Tier::Plus));
        assert_eq!(Tier::parse("gold"), None);
    }

    #[test]
    fn test_unlocks() {
        let starter: Vec<_> = Tier::Starter.unlocked_games().collect();
        assert_eq!(starter, vec![GameKind::Bricks, GameKind::Trivia]);
        assert_eq!(Tier::Plus.unlocked_games().count(), 4);
        assert_eq!(GameKind::Slots.required_tier(), Tier::Plus);
        assert_eq!(GameKind::Trivia.required_tier(), Tier::Starter);
    }

    #[test]
    fn test_api_ids_match_serde() {
        for game in GameKind::ALL {
            let json = serde_json::to_string(&game).unwrap();
            assert_eq!(json, format!("\"{}\"", game.api_id()));
            assert_eq!(GameKind::from_api_id(game.api_id()), Some(game));
        }
        assert_eq!(serde_json::to_string(&Tier::Plus).unwrap(), "\"plus\"");
    }
}
