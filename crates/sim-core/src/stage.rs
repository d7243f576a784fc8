//! Pipeline stages and stage-indexed tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;
use thiserror::Error;

/// One step of the production line. Declaration order is pipeline order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Mixing raw dough; fed by automatic production and manual clicks.
    Dough,
    /// Steaming shaped cakes.
    Steam,
    /// Packing finished cakes.
    Pack,
    /// Loading packed boxes into the sell queue.
    Dispatch,
}

impl Stage {
    /// Number of stages in the pipeline.
    pub const COUNT: usize = 4;
    /// All stages in pipeline order.
    pub const ALL: [Stage; Stage::COUNT] = [Stage::Dough, Stage::Steam, Stage::Pack, Stage::Dispatch];
    /// Entry stage.
    pub const FIRST: Stage = Stage::Dough;
    /// Terminal stage; its output is the sell queue.
    pub const LAST: Stage = Stage::Dispatch;

    pub fn index(self) -> usize {
        self as usize
    }

    /// Stage whose output buffer this stage consumes, `None` for the entry stage.
    pub fn upstream(self) -> Option<Stage> {
        match self {
            Stage::Dough => None,
            Stage::Steam => Some(Stage::Dough),
            Stage::Pack => Some(Stage::Steam),
            Stage::Dispatch => Some(Stage::Pack),
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::LAST
    }

    /// Stable snake_case name, matching the serialized form.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Dough => "dough",
            Stage::Steam => "steam",
            Stage::Pack => "pack",
            Stage::Dispatch => "dispatch",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown stage name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown stage: {0}")]
pub struct ParseStageError(pub String);

impl FromStr for Stage {
    type Err = ParseStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name() == needle)
            .ok_or_else(|| ParseStageError(s.to_string()))
    }
}

/// A value per stage. Serializes as a map keyed by stage name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTable<T> {
    pub dough: T,
    pub steam: T,
    pub pack: T,
    pub dispatch: T,
}

impl<T> StageTable<T> {
    /// Build a table by evaluating `f` once per stage, in pipeline order.
    pub fn from_fn(mut f: impl FnMut(Stage) -> T) -> Self {
        StageTable {
            dough: f(Stage::Dough),
            steam: f(Stage::Steam),
            pack: f(Stage::Pack),
            dispatch: f(Stage::Dispatch),
        }
    }

    /// Iterate `(stage, &value)` in pipeline order.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, &T)> {
        Stage::ALL.into_iter().map(move |stage| (stage, &self[stage]))
    }

    pub fn map<U>(&self, mut f: impl FnMut(Stage, &T) -> U) -> StageTable<U> {
        StageTable::from_fn(|stage| f(stage, &self[stage]))
    }
}

impl<T: Clone> StageTable<T> {
    pub fn splat(value: T) -> Self {
        StageTable::from_fn(|_| value.clone())
    }
}

impl<T> Index<Stage> for StageTable<T> {
    type Output = T;

    fn index(&self, stage: Stage) -> &T {
        match stage {
            Stage::Dough => &self.dough,
            Stage::Steam => &self.steam,
            Stage::Pack => &self.pack,
            Stage::Dispatch => &self.dispatch,
        }
    }
}

impl<T> IndexMut<Stage> for StageTable<T> {
    fn index_mut(&mut self, stage: Stage) -> &mut T {
        match stage {
            Stage::Dough => &mut self.dough,
            Stage::Steam => &mut self.steam,
            Stage::Pack => &mut self.pack,
            Stage::Dispatch => &mut self.dispatch,
        }
    }
}

/// Output buffers of the non-terminal stages.
///
/// The terminal stage has no buffer of its own: what it moves lands in the
/// sell queue (see [`crate::EconomyState::output`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StageBuffers {
    pub dough: f64,
    pub steam: f64,
    pub pack: f64,
}

impl StageBuffers {
    pub fn get(&self, stage: Stage) -> Option<f64> {
        match stage {
            Stage::Dough => Some(self.dough),
            Stage::Steam => Some(self.steam),
            Stage::Pack => Some(self.pack),
            Stage::Dispatch => None,
        }
    }

    pub fn get_mut(&mut self, stage: Stage) -> Option<&mut f64> {
        match stage {
            Stage::Dough => Some(&mut self.dough),
            Stage::Steam => Some(&mut self.steam),
            Stage::Pack => Some(&mut self.pack),
            Stage::Dispatch => None,
        }
    }

    /// Total in-process material across all buffers.
    pub fn total(&self) -> f64 {
        self.dough + self.steam + self.pack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_order_is_declaration_order() {
        for pair in Stage::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[1].upstream(), Some(pair[0]));
        }
        assert_eq!(Stage::FIRST.upstream(), None);
        assert!(Stage::LAST.is_terminal());
        assert_eq!(Stage::ALL.iter().filter(|s| s.is_terminal()).count(), 1);
    }

    #[test]
    fn index_matches_position() {
        for (i, stage) in Stage::ALL.into_iter().enumerate() {
            assert_eq!(stage.index(), i);
        }
    }

    #[test]
    fn parse_stage_names() {
        assert_eq!("steam".parse::<Stage>(), Ok(Stage::Steam));
        assert_eq!(" Dispatch ".parse::<Stage>(), Ok(Stage::Dispatch));
        assert_eq!(
            "shape".parse::<Stage>(),
            Err(ParseStageError("shape".to_string()))
        );
    }

    #[test]
    fn table_index_and_map() {
        let mut t = StageTable::splat(1u32);
        t[Stage::Pack] = 7;
        assert_eq!(t.pack, 7);
        let doubled = t.map(|_, v| v * 2);
        assert_eq!(doubled[Stage::Pack], 14);
        assert_eq!(doubled[Stage::Dough], 2);
        let names: Vec<&str> = t.iter().map(|(s, _)| s.name()).collect();
        assert_eq!(names, ["dough", "steam", "pack", "dispatch"]);
    }

    #[test]
    fn table_serializes_by_stage_name() {
        let t = StageTable::from_fn(|s| s.index() as u32);
        let json = serde_json::to_value(t).unwrap();
        assert_eq!(json["dispatch"], 3);
        assert_eq!(json["dough"], 0);
    }

    #[test]
    fn buffers_have_no_terminal_slot() {
        let mut b = StageBuffers::default();
        *b.get_mut(Stage::Steam).unwrap() = 2.5;
        assert_eq!(b.get(Stage::Steam), Some(2.5));
        assert_eq!(b.get(Stage::Dispatch), None);
        assert!(b.get_mut(Stage::Dispatch).is_none());
        assert_eq!(b.total(), 2.5);
    }
}
