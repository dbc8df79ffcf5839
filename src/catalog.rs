use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use std::ops::RangeInclusive;

/// Named difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DifficultyKey {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl DifficultyKey {
    pub const ALL: [DifficultyKey; 3] = [DifficultyKey::Easy, DifficultyKey::Normal, DifficultyKey::Hard];

    /// Resolve a stored key; anything unrecognised maps to `Normal`
    pub fn resolve(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "easy" => DifficultyKey::Easy,
            "hard" => DifficultyKey::Hard,
            _ => DifficultyKey::Normal,
        }
    }

    pub fn next(self) -> Self {
        match self {
            DifficultyKey::Easy => DifficultyKey::Normal,
            DifficultyKey::Normal => DifficultyKey::Hard,
            DifficultyKey::Hard => DifficultyKey::Easy,
        }
    }

    pub fn config(self) -> Difficulty {
        difficulty(self)
    }
}

impl<'de> Deserialize<'de> for DifficultyKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(DifficultyKey::resolve(&raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hints {
    pub show_definition: bool,
    pub show_target_letters: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difficulty {
    pub key: DifficultyKey,
    pub label: &'static str,
    pub word_length: RangeInclusive<usize>,
    pub time_limit_secs: u32,
    pub hints: Hints,
}

pub fn difficulty(key: DifficultyKey) -> Difficulty {
    match key {
        DifficultyKey::Easy => Difficulty {
            key,
            label: "Easy",
            word_length: 3..=6,
            time_limit_secs: 12,
            hints: Hints {
                show_definition: true,
                show_target_letters: true,
            },
        },
        DifficultyKey::Normal => Difficulty {
            key,
            label: "Normal",
            word_length: 5..=8,
            time_limit_secs: 9,
            hints: Hints {
                show_definition: true,
                show_target_letters: true,
            },
        },
        DifficultyKey::Hard => Difficulty {
            key,
            label: "Hard",
            word_length: 8..=24,
            time_limit_secs: 6,
            hints: Hints {
                show_definition: false,
                show_target_letters: false,
            },
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reward {
    pub stars: u32,
    pub coins: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    pub id: u32,
    pub words_to_clear: u32,
    pub min_accuracy: f64,
    pub reward: Reward,
}

pub const STAGES: [Stage; 5] = [
    Stage {
        id: 1,
        words_to_clear: 5,
        min_accuracy: 0.85,
        reward: Reward { stars: 1, coins: 10 },
    },
    Stage {
        id: 2,
        words_to_clear: 7,
        min_accuracy: 0.88,
        reward: Reward { stars: 1, coins: 15 },
    },
    Stage {
        id: 3,
        words_to_clear: 9,
        min_accuracy: 0.9,
        reward: Reward { stars: 2, coins: 20 },
    },
    Stage {
        id: 4,
        words_to_clear: 12,
        min_accuracy: 0.92,
        reward: Reward { stars: 2, coins: 30 },
    },
    Stage {
        id: 5,
        words_to_clear: 15,
        min_accuracy: 0.94,
        reward: Reward { stars: 3, coins: 40 },
    },
];

pub const LAST_STAGE_INDEX: usize = STAGES.len() - 1;

/// Stage lookup; overrunning indices land on the final, endless stage
pub fn stage(index: usize) -> Stage {
    STAGES[clamp_stage_index(index)]
}

pub fn clamp_stage_index(index: usize) -> usize {
    index.min(LAST_STAGE_INDEX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_keys() {
        assert_eq!(DifficultyKey::resolve("easy"), DifficultyKey::Easy);
        assert_eq!(DifficultyKey::resolve("Normal"), DifficultyKey::Normal);
        assert_eq!(DifficultyKey::resolve(" HARD "), DifficultyKey::Hard);
    }

    #[test]
    fn test_resolve_unknown_falls_back_to_normal() {
        assert_eq!(DifficultyKey::resolve("nightmare"), DifficultyKey::Normal);
        assert_eq!(DifficultyKey::resolve(""), DifficultyKey::Normal);
    }

    #[test]
    fn test_difficulty_table() {
        let easy = difficulty(DifficultyKey::Easy);
        assert_eq!(easy.time_limit_secs, 12);
        assert_eq!(easy.word_length, 3..=6);
        assert!(easy.hints.show_definition);

        let hard = DifficultyKey::Hard.config();
        assert_eq!(hard.time_limit_secs, 6);
        assert!(!hard.hints.show_definition);
        assert!(!hard.hints.show_target_letters);
    }

    #[test]
    fn test_difficulty_cycle_wraps() {
        assert_eq!(DifficultyKey::Easy.next(), DifficultyKey::Normal);
        assert_eq!(DifficultyKey::Hard.next(), DifficultyKey::Easy);
    }

    #[test]
    fn test_display_is_lowercase_key() {
        assert_eq!(DifficultyKey::Hard.to_string(), "hard");
    }

    #[test]
    fn test_stage_lookup_clamps() {
        assert_eq!(stage(0).id, 1);
        assert_eq!(stage(4).id, 5);
        assert_eq!(stage(99).id, 5);
        assert_eq!(clamp_stage_index(usize::MAX), LAST_STAGE_INDEX);
    }

    #[test]
    fn test_stage_table_is_well_formed() {
        for (i, s) in STAGES.iter().enumerate() {
            assert_eq!(s.id as usize, i + 1);
            assert!(s.words_to_clear > 0);
            assert!((0.0..=1.0).contains(&s.min_accuracy));
        }
    }

    #[test]
    fn test_difficulty_key_deserialize_tolerates_unknown() {
        let key: DifficultyKey = serde_json::from_str("\"easy\"").unwrap();
        assert_eq!(key, DifficultyKey::Easy);
        let key: DifficultyKey = serde_json::from_str("\"legendary\"").unwrap();
        assert_eq!(key, DifficultyKey::Normal);
        assert_eq!(serde_json::to_string(&DifficultyKey::Hard).unwrap(), "\"hard\"");
    }
}
