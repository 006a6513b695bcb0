pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;

pub use config::Config;
pub use db::{init_db, RepoError, Repository};
pub use domain::{
    Exercise, ExerciseView, NewExercise, NewProgram, Program, ProgramId, ProgramView, Reps,
    ValidationError,
};
pub use error::AppError;
