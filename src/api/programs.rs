use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::auth::AuthUser;
use crate::api::{json_body, AppState};
use crate::db::RepoError;
use crate::domain::{
    Exercise, NewExercise, NewProgram, Program, ProgramId, ProgramView, Reps, ValidationError,
};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct ExerciseRequest {
    pub name: Option<String>,
    pub reps: Option<Reps>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl TryFrom<ExerciseRequest> for NewExercise {
    type Error = ValidationError;

    fn try_from(req: ExerciseRequest) -> Result<Self, Self::Error> {
        NewExercise::new(req.name, req.reps, req.kind)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProgramRequest {
    pub title: Option<String>,
    pub goal: Option<String>,
    pub exercises: Option<Vec<ExerciseRequest>>,
}

impl TryFrom<CreateProgramRequest> for NewProgram {
    type Error = ValidationError;

    fn try_from(req: CreateProgramRequest) -> Result<Self, Self::Error> {
        let exercises = req
            .exercises
            .ok_or(ValidationError::MissingField("exercises"))?
            .into_iter()
            .enumerate()
            .map(|(index, ex)| {
                NewExercise::try_from(ex).map_err(|e| ValidationError::Exercise {
                    index,
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        NewProgram::new(req.title, req.goal, exercises)
    }
}

#[derive(Debug, Serialize)]
pub struct CreateProgramResponse {
    pub message: &'static str,
    pub program: Program,
}

fn program_id(path: Result<Path<i64>, PathRejection>) -> Result<ProgramId, AppError> {
    path.map(|Path(id)| ProgramId::new(id))
        .map_err(|_| AppError::BadRequest("Program id must be an integer".into()))
}

pub async fn list_programs(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProgramView>>, AppError> {
    let programs = state
        .repo
        .list_programs()
        .await
        .map_err(|e| AppError::from_repo(e, "Failed to fetch programs"))?;
    Ok(Json(programs))
}

pub async fn get_program(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<ProgramView>, AppError> {
    let id = program_id(path)?;
    state
        .repo
        .get_program(id)
        .await
        .map_err(|e| AppError::from_repo(e, "Failed to fetch program"))?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Program not found".into()))
}

pub async fn create_program(
    State(state): State<AppState>,
    AuthUser { user, .. }: AuthUser,
    payload: Result<Json<CreateProgramRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateProgramResponse>), AppError> {
    let new = NewProgram::try_from(json_body(payload)?)?;

    let program = state
        .repo
        .create_program(&new)
        .await
        .map_err(|e| AppError::from_repo(e, "Failed to create program"))?;

    tracing::info!(
        program_id = %program.id,
        user_id = %user.id,
        exercises = new.exercises.len(),
        "Program created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateProgramResponse {
            message: "Program created successfully",
            program,
        }),
    ))
}

pub async fn delete_program(
    State(state): State<AppState>,
    AuthUser { user, .. }: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = program_id(path)?;

    let deleted = state
        .repo
        .delete_program(id)
        .await
        .map_err(|e| AppError::from_repo(e, "Failed to delete program"))?;

    if !deleted {
        return Err(AppError::NotFound("Program not found".into()));
    }

    tracing::info!(program_id = %id, user_id = %user.id, "Program deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_exercise(
    State(state): State<AppState>,
    AuthUser { user, .. }: AuthUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ExerciseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Exercise>), AppError> {
    let id = program_id(path)?;
    let new = NewExercise::try_from(json_body(payload)?)?;

    let exercise = state.repo.add_exercise(id, &new).await.map_err(|e| match e {
        RepoError::NotFound(_) => AppError::NotFound("Program not found".into()),
        other => AppError::from_repo(other, "Failed to add exercise"),
    })?;

    tracing::info!(
        program_id = %id,
        exercise_id = exercise.id.as_i64(),
        user_id = %user.id,
        "Exercise added"
    );

    Ok((StatusCode::CREATED, Json(exercise)))
}
