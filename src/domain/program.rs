//! Workout program aggregate: write-side inputs and read-side projection.

use crate::domain::validation::required_text;
use crate::domain::{ExerciseId, ProgramId, Reps, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A persisted workout program row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub title: String,
    pub goal: String,
}

/// A persisted exercise row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    pub program_id: ProgramId,
    pub name: String,
    pub reps: Reps,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Exercise as it appears nested inside a [`ProgramView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseView {
    pub id: ExerciseId,
    pub name: String,
    pub reps: Reps,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<Exercise> for ExerciseView {
    fn from(e: Exercise) -> Self {
        Self {
            id: e.id,
            name: e.name,
            reps: e.reps,
            kind: e.kind,
        }
    }
}

/// A program with its exercises inlined, in exercise insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramView {
    pub id: ProgramId,
    pub title: String,
    pub goal: String,
    pub exercises: Vec<ExerciseView>,
}

/// Validated exercise input, not yet attached to a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExercise {
    pub name: String,
    pub reps: Reps,
    pub kind: String,
}

impl NewExercise {
    pub fn new(
        name: Option<String>,
        reps: Option<Reps>,
        kind: Option<String>,
    ) -> Result<Self, ValidationError> {
        let name = required_text("name", name)?;
        let reps = match reps {
            Some(r) if !r.is_blank() => r,
            _ => return Err(ValidationError::MissingField("reps")),
        };
        let kind = required_text("type", kind)?;
        Ok(Self { name, reps, kind })
    }
}

/// Validated program input together with its exercises.
///
/// An empty exercise list is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProgram {
    pub title: String,
    pub goal: String,
    pub exercises: Vec<NewExercise>,
}

impl NewProgram {
    pub fn new(
        title: Option<String>,
        goal: Option<String>,
        exercises: Vec<NewExercise>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            title: required_text("title", title)?,
            goal: required_text("goal", goal)?,
            exercises,
        })
    }
}

/// One row of the programs-left-join-exercises query.
///
/// The exercise columns are all `None` for a program without exercises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramExerciseRow {
    pub program_id: ProgramId,
    pub title: String,
    pub goal: String,
    pub exercise_id: Option<ExerciseId>,
    pub exercise_name: Option<String>,
    pub reps: Option<Reps>,
    pub kind: Option<String>,
}

/// Fold flat join rows into nested views.
///
/// Programs keep first-seen order; exercises keep row order. Rows without an
/// exercise id only register their program.
pub fn group_program_rows(rows: impl IntoIterator<Item = ProgramExerciseRow>) -> Vec<ProgramView> {
    let mut views: Vec<ProgramView> = Vec::new();
    let mut index: HashMap<ProgramId, usize> = HashMap::new();

    for row in rows {
        let slot = *index.entry(row.program_id).or_insert_with(|| {
            views.push(ProgramView {
                id: row.program_id,
                title: row.title.clone(),
                goal: row.goal.clone(),
                exercises: Vec::new(),
            });
            views.len() - 1
        });

        if let Some(exercise_id) = row.exercise_id {
            views[slot].exercises.push(ExerciseView {
                id: exercise_id,
                name: row.exercise_name.unwrap_or_default(),
                reps: row.reps.unwrap_or(Reps::Text(String::new())),
                kind: row.kind.unwrap_or_default(),
            });
        }
    }

    views
}
