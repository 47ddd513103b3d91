use crate::engine::tt::DEFAULT_TT_CAPACITY;
use crate::engine::SearchLimit;
use crate::logic::eval_constants::{
    CASTLING_RIGHTS_BONUS, CENTER_BONUS, DOUBLED_PAWN_PENALTY, ENDGAME_MATERIAL_THRESHOLD,
    ISOLATED_PAWN_PENALTY, KING_CENTRALITY_BONUS, KING_EXPOSURE_PENALTY, KING_SHIELD_BONUS,
    PASSED_PAWN_BONUS, VAL_BISHOP, VAL_KNIGHT, VAL_PAWN, VAL_QUEEN, VAL_ROOK,
};
use crate::logic::board::PieceType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Easy,
    Medium,
    Hard,
    Expert,
    Master,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Evaluation Parameters
    pub val_pawn: i32,
    pub val_knight: i32,
    pub val_bishop: i32,
    pub val_rook: i32,
    pub val_queen: i32,

    pub king_shield_bonus: i32,
    pub king_exposure_penalty: i32,
    pub castling_rights_bonus: i32,
    pub doubled_pawn_penalty: i32,
    pub isolated_pawn_penalty: i32,
    pub passed_pawn_bonus: i32,
    pub center_bonus: i32,
    pub king_centrality_bonus: i32,
    pub endgame_threshold: i32,

    // Move Ordering
    pub score_hash_move: i32,
    pub score_capture_base: i32,
    pub score_promotion: i32,
    pub score_castling: i32,
    pub score_center: i32,
    pub score_development: i32,

    // Search Parameters
    pub mate_score: i32,
    pub mate_threshold: i32,
    pub quiescence_depth: u8,
    pub check_penalty: i32,
    pub delta_margin: i32,
    pub tt_capacity: usize,
    /// Keep table entries between searches. Off by default so that equal
    /// inputs give equal outputs.
    pub persistent_tt: bool,
    pub max_depth: u8,
    pub time_limit_ms: u64,

    // Randomness
    pub random_top_moves: usize,
    pub random_margin: i32,
    pub seed: Option<u64>,

    // Opening Book
    pub use_opening_book: bool,
    pub book_variety: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            val_pawn: VAL_PAWN,
            val_knight: VAL_KNIGHT,
            val_bishop: VAL_BISHOP,
            val_rook: VAL_ROOK,
            val_queen: VAL_QUEEN,

            king_shield_bonus: KING_SHIELD_BONUS,
            king_exposure_penalty: KING_EXPOSURE_PENALTY,
            castling_rights_bonus: CASTLING_RIGHTS_BONUS,
            doubled_pawn_penalty: DOUBLED_PAWN_PENALTY,
            isolated_pawn_penalty: ISOLATED_PAWN_PENALTY,
            passed_pawn_bonus: PASSED_PAWN_BONUS,
            center_bonus: CENTER_BONUS,
            king_centrality_bonus: KING_CENTRALITY_BONUS,
            endgame_threshold: ENDGAME_MATERIAL_THRESHOLD,

            score_hash_move: 2_000_000,
            score_capture_base: 1_000_000,
            score_promotion: 900_000,
            score_castling: 500,
            score_center: 10,
            score_development: 30,

            mate_score: 10_000,
            mate_threshold: 9_000,
            quiescence_depth: 3,
            check_penalty: 50,
            delta_margin: 200,
            tt_capacity: DEFAULT_TT_CAPACITY,
            persistent_tt: false,
            max_depth: 4,
            time_limit_ms: 3_000,

            random_top_moves: 1,
            random_margin: 0,
            seed: None,

            use_opening_book: true,
            book_variety: 3,
        }
    }
}

#[derive(Deserialize)]
struct EngineConfigJson {
    val_pawn: Option<f32>,
    val_knight: Option<f32>,
    val_bishop: Option<f32>,
    val_rook: Option<f32>,
    val_queen: Option<f32>,

    king_shield_bonus: Option<f32>,
    king_exposure_penalty: Option<f32>,
    castling_rights_bonus: Option<f32>,
    doubled_pawn_penalty: Option<f32>,
    isolated_pawn_penalty: Option<f32>,
    passed_pawn_bonus: Option<f32>,
    center_bonus: Option<f32>,
    king_centrality_bonus: Option<f32>,
    endgame_threshold: Option<f32>,

    score_hash_move: Option<f32>,
    score_capture_base: Option<f32>,
    score_promotion: Option<f32>,
    score_castling: Option<f32>,
    score_center: Option<f32>,
    score_development: Option<f32>,

    quiescence_depth: Option<u8>,
    check_penalty: Option<i32>,
    tt_capacity: Option<usize>,
    persistent_tt: Option<bool>,
    max_depth: Option<u8>,
    time_limit_ms: Option<u64>,
    random_top_moves: Option<usize>,
    random_margin: Option<i32>,
    seed: Option<u64>,
    use_opening_book: Option<bool>,
    book_variety: Option<usize>,
}

impl EngineConfig {
    /// Loads a configuration where evaluation and ordering fields are scale
    /// factors relative to the defaults. Missing fields keep their defaults.
    pub fn load_from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        let json_config: EngineConfigJson = serde_json::from_str(json_str)?;
        let default = Self::default();

        Ok(Self {
            val_pawn: apply_scale(default.val_pawn, json_config.val_pawn),
            val_knight: apply_scale(default.val_knight, json_config.val_knight),
            val_bishop: apply_scale(default.val_bishop, json_config.val_bishop),
            val_rook: apply_scale(default.val_rook, json_config.val_rook),
            val_queen: apply_scale(default.val_queen, json_config.val_queen),

            king_shield_bonus: apply_scale(
                default.king_shield_bonus,
                json_config.king_shield_bonus,
            ),
            king_exposure_penalty: apply_scale(
                default.king_exposure_penalty,
                json_config.king_exposure_penalty,
            ),
            castling_rights_bonus: apply_scale(
                default.castling_rights_bonus,
                json_config.castling_rights_bonus,
            ),
            doubled_pawn_penalty: apply_scale(
                default.doubled_pawn_penalty,
                json_config.doubled_pawn_penalty,
            ),
            isolated_pawn_penalty: apply_scale(
                default.isolated_pawn_penalty,
                json_config.isolated_pawn_penalty,
            ),
            passed_pawn_bonus: apply_scale(
                default.passed_pawn_bonus,
                json_config.passed_pawn_bonus,
            ),
            center_bonus: apply_scale(default.center_bonus, json_config.center_bonus),
            king_centrality_bonus: apply_scale(
                default.king_centrality_bonus,
                json_config.king_centrality_bonus,
            ),
            endgame_threshold: apply_scale(
                default.endgame_threshold,
                json_config.endgame_threshold,
            ),

            score_hash_move: apply_scale(default.score_hash_move, json_config.score_hash_move),
            score_capture_base: apply_scale(
                default.score_capture_base,
                json_config.score_capture_base,
            ),
            score_promotion: apply_scale(default.score_promotion, json_config.score_promotion),
            score_castling: apply_scale(default.score_castling, json_config.score_castling),
            score_center: apply_scale(default.score_center, json_config.score_center),
            score_development: apply_scale(
                default.score_development,
                json_config.score_development,
            ),

            quiescence_depth: json_config
                .quiescence_depth
                .unwrap_or(default.quiescence_depth),
            check_penalty: json_config.check_penalty.unwrap_or(default.check_penalty),
            tt_capacity: json_config.tt_capacity.unwrap_or(default.tt_capacity),
            persistent_tt: json_config.persistent_tt.unwrap_or(default.persistent_tt),
            max_depth: json_config.max_depth.unwrap_or(default.max_depth),
            time_limit_ms: json_config.time_limit_ms.unwrap_or(default.time_limit_ms),
            random_top_moves: json_config
                .random_top_moves
                .unwrap_or(default.random_top_moves),
            random_margin: json_config.random_margin.unwrap_or(default.random_margin),
            seed: json_config.seed.or(default.seed),
            use_opening_book: json_config
                .use_opening_book
                .unwrap_or(default.use_opening_book),
            book_variety: json_config.book_variety.unwrap_or(default.book_variety),
            ..default
        })
    }

    /// Defaults with the depth, time budget and randomness of a preset.
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        Self::default().with_difficulty(difficulty)
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        let (depth, time_ms, top_moves, margin) = match difficulty {
            Difficulty::Beginner => (1, 500, 5, 300),
            Difficulty::Easy => (2, 1_000, 4, 150),
            Difficulty::Medium => (3, 2_000, 3, 60),
            Difficulty::Hard => (4, 3_000, 2, 20),
            Difficulty::Expert => (5, 5_000, 1, 0),
            Difficulty::Master => (6, 8_000, 1, 0),
        };
        self.max_depth = depth;
        self.time_limit_ms = time_ms;
        self.random_top_moves = top_moves;
        self.random_margin = margin;
        self
    }

    /// Randomness applies only with more than one candidate and a positive margin.
    pub const fn is_randomized(&self) -> bool {
        self.random_top_moves > 1 && self.random_margin > 0
    }

    pub const fn piece_value(&self, pt: PieceType) -> i32 {
        match pt {
            PieceType::Pawn => self.val_pawn,
            PieceType::Knight => self.val_knight,
            PieceType::Bishop => self.val_bishop,
            PieceType::Rook => self.val_rook,
            PieceType::Queen => self.val_queen,
            PieceType::King => 0,
        }
    }
}

/// The config's own depth and budget; a zero budget searches without a clock.
impl From<&EngineConfig> for SearchLimit {
    fn from(config: &EngineConfig) -> Self {
        if config.time_limit_ms == 0 {
            Self::Depth(config.max_depth)
        } else {
            Self::DepthAndTime {
                depth: config.max_depth,
                time_ms: config.time_limit_ms,
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn apply_scale(default_val: i32, scale: Option<f32>) -> i32 {
    scale.map_or(default_val, |s| (default_val as f32 * s) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_default() {
        let config = EngineConfig::load_from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.val_pawn, VAL_PAWN);
        assert_eq!(config.mate_score, 10_000);
    }

    #[test]
    fn test_load_config_scaled() {
        let json = r#"{
            "val_pawn": 1.5,
            "score_hash_move": 0.5,
            "max_depth": 6,
            "seed": 42
        }"#;
        let config = EngineConfig::load_from_json(json).unwrap();
        assert_eq!(config.val_pawn, 150);
        assert_eq!(config.score_hash_move, 1_000_000);
        assert_eq!(config.max_depth, 6);
        assert_eq!(config.seed, Some(42));
        // Others should be default
        assert_eq!(config.val_rook, VAL_ROOK);
    }

    #[test]
    fn test_load_config_invalid_json() {
        assert!(EngineConfig::load_from_json("{ invalid json }").is_err());
    }

    #[test]
    fn test_load_config_edge_cases() {
        let json = r#"{
            "val_pawn": 0.0,
            "val_rook": -1.0
        }"#;
        let config = EngineConfig::load_from_json(json).unwrap();
        assert_eq!(config.val_pawn, 0);
        assert_eq!(config.val_rook, -VAL_ROOK);
    }

    #[test]
    fn test_deserialize_absolute_config() {
        let json = r#"{
            "val_pawn": 123,
            "val_queen": 999
        }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.val_pawn, 123);
        assert_eq!(config.val_queen, 999);
        assert_eq!(config.val_rook, VAL_ROOK);
    }

    #[test]
    fn test_difficulty_presets() {
        let beginner = EngineConfig::for_difficulty(Difficulty::Beginner);
        assert_eq!(beginner.max_depth, 1);
        assert!(beginner.is_randomized());

        let expert = EngineConfig::for_difficulty(Difficulty::Expert);
        assert_eq!(expert.max_depth, 5);
        assert_eq!(expert.time_limit_ms, 5_000);
        assert!(!expert.is_randomized());

        let master = EngineConfig::for_difficulty(Difficulty::Master);
        assert!(master.max_depth > expert.max_depth);
        assert!(!master.is_randomized());
    }

    #[test]
    fn test_preset_search_limit() {
        let beginner = EngineConfig::for_difficulty(Difficulty::Beginner);
        assert_eq!(
            SearchLimit::from(&beginner),
            SearchLimit::DepthAndTime {
                depth: 1,
                time_ms: 500
            }
        );
        let untimed = EngineConfig {
            time_limit_ms: 0,
            ..beginner
        };
        assert_eq!(SearchLimit::from(&untimed), SearchLimit::Depth(1));
    }
}
