//! Running score counters.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub total: u32,
    pub correct: u32,
    pub streak: u32,
}

impl ScoreState {
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
            self.streak += 1;
        } else {
            self.streak = 0;
        }
    }

    /// A skip counts as an attempt and breaks the streak.
    pub fn skip(&mut self) {
        self.total += 1;
        self.streak = 0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Correct / total, 0 before the first attempt.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.total)
        }
    }

    /// Rounded percentage for display.
    pub fn percent(&self) -> u32 {
        (self.accuracy() * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streak_resets_on_miss_and_skip() {
        let mut s = ScoreState::default();
        s.record(true);
        s.record(true);
        assert_eq!(s.streak, 2);
        s.record(false);
        assert_eq!(s, ScoreState { total: 3, correct: 2, streak: 0 });
        s.record(true);
        s.skip();
        assert_eq!(s, ScoreState { total: 5, correct: 3, streak: 0 });
    }

    #[test]
    fn percent_rounds() {
        let mut s = ScoreState::default();
        assert_eq!(s.percent(), 0);
        s.record(true);
        s.record(true);
        s.record(false);
        assert_eq!(s.percent(), 67);
        s.reset();
        assert_eq!(s, ScoreState::default());
    }
}
