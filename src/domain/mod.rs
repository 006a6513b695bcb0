//! Domain types for the workout tracker.
//!
//! This module provides:
//! - Identifier newtypes and the `Reps` prescription value
//! - The program/exercise aggregate with write-side inputs and the read-side fold
//! - User accounts and credential hashing
//! - Validation errors raised before any store access

pub mod account;
pub mod credentials;
pub mod primitives;
pub mod program;
pub mod validation;

pub use account::{User, UserCredentials};
pub use primitives::{Email, ExerciseId, ProgramId, Reps, UserId};
pub use program::{
    group_program_rows, Exercise, ExerciseView, NewExercise, NewProgram, Program,
    ProgramExerciseRow, ProgramView,
};
pub use validation::ValidationError;
