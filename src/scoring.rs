//! Score, level and gravity speed.

/// Points per cleared line, multiplied by the current level.
pub const POINTS_PER_LINE: u32 = 100;
/// Score needed per level: the next level starts at `level * LEVEL_THRESHOLD`.
pub const LEVEL_THRESHOLD: u32 = 1000;
/// Gravity period at level 1.
pub const BASE_DROP_MS: u64 = 1000;
/// Gravity never gets faster than this.
pub const MIN_DROP_MS: u64 = 50;
const SPEEDUP: f64 = 0.8;

/// Gravity period for a level: `max(50, floor(1000 * 0.8^(level - 1)))`.
pub fn drop_interval_ms(level: u32) -> u64 {
    let exp = f64::from(level.saturating_sub(1));
    let ms = (BASE_DROP_MS as f64 * SPEEDUP.powf(exp)).floor() as u64;
    ms.max(MIN_DROP_MS)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoring {
    score: u32,
    level: u32,
    lines: u32,
    drop_ms: u64,
}

impl Scoring {
    pub fn new(initial_level: u32) -> Self {
        let level = initial_level.max(1);
        Self {
            score: 0,
            level,
            lines: 0,
            drop_ms: drop_interval_ms(level),
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    /// Current gravity period in milliseconds.
    pub fn drop_ms(&self) -> u64 {
        self.drop_ms
    }

    /// Award a line clear at the pre-clear level, then level up as far as the score allows.
    /// Returns the points awarded.
    pub fn add_line_clear(&mut self, cleared: usize) -> u32 {
        if cleared == 0 {
            return 0;
        }
        let points = (cleared as u32)
            .saturating_mul(POINTS_PER_LINE)
            .saturating_mul(self.level);
        self.score = self.score.saturating_add(points);
        self.lines = self.lines.saturating_add(cleared as u32);

        let before = self.level;
        self.level = self.level.max(self.score / LEVEL_THRESHOLD + 1);
        if self.level != before {
            self.drop_ms = drop_interval_ms(self.level);
            log::info!("level {} -> {} (drop {} ms)", before, self.level, self.drop_ms);
        }
        points
    }

    /// One point per cell of hard-drop distance.
    pub fn add_drop(&mut self, cells: u32) {
        self.score = self.score.saturating_add(cells);
    }
}
