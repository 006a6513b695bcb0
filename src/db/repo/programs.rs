//! Program aggregate operations for the repository.

use crate::db::error::is_foreign_key_violation;
use crate::db::RepoError;
use crate::domain::{
    group_program_rows, Exercise, ExerciseId, NewExercise, NewProgram, Program, ProgramExerciseRow,
    ProgramId, ProgramView, Reps,
};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::Row;
use tracing::debug;

use super::Repository;

fn bind_reps<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    reps: &Reps,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match reps {
        Reps::Count(n) => query.bind(*n),
        Reps::Text(s) => query.bind(s.clone()),
    }
}

/// `reps` has no column affinity, so the value comes back as whatever storage
/// class it was written with.
fn decode_reps(row: &SqliteRow, column: &str) -> Result<Option<Reps>, sqlx::Error> {
    if let Ok(count) = row.try_get::<Option<i64>, _>(column) {
        return Ok(count.map(Reps::Count));
    }
    let text: Option<String> = row.try_get(column)?;
    Ok(text.map(Reps::Text))
}

fn program_from_row(row: &SqliteRow) -> Result<Program, sqlx::Error> {
    Ok(Program {
        id: ProgramId::new(row.try_get("id")?),
        title: row.try_get("title")?,
        goal: row.try_get("goal")?,
    })
}

fn exercise_from_row(row: &SqliteRow) -> Result<Exercise, sqlx::Error> {
    Ok(Exercise {
        id: ExerciseId::new(row.try_get("id")?),
        program_id: ProgramId::new(row.try_get("program_id")?),
        name: row.try_get("name")?,
        reps: decode_reps(row, "reps")?.unwrap_or(Reps::Text(String::new())),
        kind: row.try_get("type")?,
    })
}

fn joined_row(row: &SqliteRow) -> Result<ProgramExerciseRow, sqlx::Error> {
    Ok(ProgramExerciseRow {
        program_id: ProgramId::new(row.try_get("program_id")?),
        title: row.try_get("title")?,
        goal: row.try_get("goal")?,
        exercise_id: row
            .try_get::<Option<i64>, _>("exercise_id")?
            .map(ExerciseId::new),
        exercise_name: row.try_get("exercise_name")?,
        reps: decode_reps(row, "reps")?,
        kind: row.try_get("type")?,
    })
}

impl Repository {
    /// Create a program and all of its exercises in one transaction.
    ///
    /// Exercises are inserted in input order. If any insert fails the
    /// transaction is dropped uncommitted and nothing persists.
    ///
    /// # Errors
    /// Returns `RepoError::Store` or `RepoError::Timeout` if any statement fails.
    pub async fn create_program(&self, new: &NewProgram) -> Result<Program, RepoError> {
        let mut tx = self.bounded(self.pool.begin()).await?;

        let row = self
            .bounded(
                sqlx::query(
                    r#"
                    INSERT INTO workout_programs (title, goal)
                    VALUES (?, ?)
                    RETURNING id, title, goal
                    "#,
                )
                .bind(&new.title)
                .bind(&new.goal)
                .fetch_one(&mut *tx),
            )
            .await?;
        let program = program_from_row(&row)?;

        for exercise in &new.exercises {
            let query = sqlx::query(
                r#"
                INSERT INTO exercises (program_id, name, reps, type)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(program.id.as_i64())
            .bind(exercise.name.clone());
            let query = bind_reps(query, &exercise.reps).bind(exercise.kind.clone());

            self.bounded(query.execute(&mut *tx)).await?;
        }

        self.bounded(tx.commit()).await?;

        debug!(
            program_id = %program.id,
            exercise_count = new.exercises.len(),
            "Program created"
        );
        Ok(program)
    }

    /// List every program with its exercises nested, ordered by program id.
    ///
    /// # Errors
    /// Returns an error if the query fails; no partial result is produced.
    pub async fn list_programs(&self) -> Result<Vec<ProgramView>, RepoError> {
        let rows = self
            .bounded(
                sqlx::query(
                    r#"
                    SELECT
                        wp.id AS program_id,
                        wp.title,
                        wp.goal,
                        e.id AS exercise_id,
                        e.name AS exercise_name,
                        e.reps,
                        e.type
                    FROM workout_programs wp
                    LEFT JOIN exercises e ON e.program_id = wp.id
                    ORDER BY wp.id ASC, e.id ASC
                    "#,
                )
                .fetch_all(&self.pool),
            )
            .await?;

        let joined = rows
            .iter()
            .map(joined_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(group_program_rows(joined))
    }

    /// Get a single program with its exercises.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_program(&self, program_id: ProgramId) -> Result<Option<ProgramView>, RepoError> {
        let rows = self
            .bounded(
                sqlx::query(
                    r#"
                    SELECT
                        wp.id AS program_id,
                        wp.title,
                        wp.goal,
                        e.id AS exercise_id,
                        e.name AS exercise_name,
                        e.reps,
                        e.type
                    FROM workout_programs wp
                    LEFT JOIN exercises e ON e.program_id = wp.id
                    WHERE wp.id = ?
                    ORDER BY e.id ASC
                    "#,
                )
                .bind(program_id.as_i64())
                .fetch_all(&self.pool),
            )
            .await?;

        let joined = rows
            .iter()
            .map(joined_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(group_program_rows(joined).into_iter().next())
    }

    /// Delete a program by id. Its exercises go with it via `ON DELETE CASCADE`.
    ///
    /// Returns `false` if no program had that id.
    pub async fn delete_program(&self, program_id: ProgramId) -> Result<bool, RepoError> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM workout_programs WHERE id = ?")
                    .bind(program_id.as_i64())
                    .execute(&self.pool),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Append one exercise to an existing program.
    ///
    /// # Errors
    /// Returns `RepoError::NotFound` if the program does not exist.
    pub async fn add_exercise(
        &self,
        program_id: ProgramId,
        exercise: &NewExercise,
    ) -> Result<Exercise, RepoError> {
        let query = sqlx::query(
            r#"
            INSERT INTO exercises (program_id, name, reps, type)
            VALUES (?, ?, ?, ?)
            RETURNING id, program_id, name, reps, type
            "#,
        )
        .bind(program_id.as_i64())
        .bind(exercise.name.clone());
        let query = bind_reps(query, &exercise.reps).bind(exercise.kind.clone());

        let row = match self.bounded(query.fetch_one(&self.pool)).await {
            Ok(row) => row,
            Err(RepoError::Store(err)) if is_foreign_key_violation(&err) => {
                return Err(RepoError::NotFound(format!("program {}", program_id)));
            }
            Err(e) => return Err(e),
        };

        Ok(exercise_from_row(&row)?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::setup_test_db;
    use super::*;

    fn exercise(name: &str, reps: Reps, kind: &str) -> NewExercise {
        NewExercise {
            name: name.to_string(),
            reps,
            kind: kind.to_string(),
        }
    }

    async fn count_exercises(repo: &Repository, program_id: ProgramId) -> i64 {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM exercises WHERE program_id = ?")
            .bind(program_id.as_i64())
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        n
    }

    fn push_day() -> NewProgram {
        NewProgram {
            title: "Push Day".to_string(),
            goal: "hypertrophy".to_string(),
            exercises: vec![exercise("Bench Press", Reps::Count(10), "push")],
        }
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let (repo, _temp) = setup_test_db().await;

        let program = repo.create_program(&push_day()).await.unwrap();
        assert_eq!(program.id, ProgramId::new(1));
        assert_eq!(program.title, "Push Day");
        assert_eq!(program.goal, "hypertrophy");

        let views = repo.list_programs().await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].id, program.id);
        assert_eq!(views[0].exercises.len(), 1);
        assert_eq!(views[0].exercises[0].id, ExerciseId::new(1));
        assert_eq!(views[0].exercises[0].name, "Bench Press");
        assert_eq!(views[0].exercises[0].reps, Reps::Count(10));
        assert_eq!(views[0].exercises[0].kind, "push");
    }

    #[tokio::test]
    async fn test_text_fields_stored_verbatim() {
        let (repo, _temp) = setup_test_db().await;

        let new = NewProgram::new(
            Some("  Push Day ".to_string()),
            Some(" hypertrophy".to_string()),
            vec![NewExercise::new(
                Some(" Bench Press ".to_string()),
                Some(Reps::Count(10)),
                Some("push ".to_string()),
            )
            .unwrap()],
        )
        .unwrap();

        let created = repo.create_program(&new).await.unwrap();
        assert_eq!(created.title, "  Push Day ");
        assert_eq!(created.goal, " hypertrophy");

        let views = repo.list_programs().await.unwrap();
        assert_eq!(views[0].title, "  Push Day ");
        assert_eq!(views[0].goal, " hypertrophy");
        assert_eq!(views[0].exercises[0].name, " Bench Press ");
        assert_eq!(views[0].exercises[0].kind, "push ");
    }

    #[tokio::test]
    async fn test_exercise_order_and_reps_kind_preserved() {
        let (repo, _temp) = setup_test_db().await;

        let new = NewProgram {
            title: "Legs".to_string(),
            goal: "strength".to_string(),
            exercises: vec![
                exercise("Squat", Reps::Text("5x5".to_string()), "legs"),
                exercise("Lunge", Reps::Count(12), "legs"),
                exercise("Calf Raise", Reps::Text("AMRAP".to_string()), "legs"),
            ],
        };
        repo.create_program(&new).await.unwrap();

        let views = repo.list_programs().await.unwrap();
        let got: Vec<(String, Reps)> = views[0]
            .exercises
            .iter()
            .map(|e| (e.name.clone(), e.reps.clone()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Squat".to_string(), Reps::Text("5x5".to_string())),
                ("Lunge".to_string(), Reps::Count(12)),
                ("Calf Raise".to_string(), Reps::Text("AMRAP".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_exercise_rolls_back_program() {
        let (repo, _temp) = setup_test_db().await;

        // A blank name passes the struct but fails the schema CHECK.
        let new = NewProgram {
            title: "Broken".to_string(),
            goal: "none".to_string(),
            exercises: vec![
                exercise("Row", Reps::Count(8), "pull"),
                exercise("   ", Reps::Count(8), "pull"),
            ],
        };
        let result = repo.create_program(&new).await;
        assert!(matches!(result, Err(RepoError::Store(_))));

        assert!(repo.list_programs().await.unwrap().is_empty());
        let (exercises,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM exercises")
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(exercises, 0);

        // The pool is still usable after the rollback.
        repo.create_program(&push_day()).await.unwrap();
        assert_eq!(repo.list_programs().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_program_without_exercises_lists_empty() {
        let (repo, _temp) = setup_test_db().await;

        let new = NewProgram {
            title: "Rest".to_string(),
            goal: "recovery".to_string(),
            exercises: vec![],
        };
        repo.create_program(&new).await.unwrap();

        let views = repo.list_programs().await.unwrap();
        assert_eq!(views.len(), 1);
        assert!(views[0].exercises.is_empty());
    }

    #[tokio::test]
    async fn test_list_orders_by_program_id() {
        let (repo, _temp) = setup_test_db().await;

        for title in ["A", "B", "C"] {
            let mut new = push_day();
            new.title = title.to_string();
            repo.create_program(&new).await.unwrap();
        }

        let titles: Vec<String> = repo
            .list_programs()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.title)
            .collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_exercises() {
        let (repo, _temp) = setup_test_db().await;

        let program = repo.create_program(&push_day()).await.unwrap();
        assert_eq!(count_exercises(&repo, program.id).await, 1);

        assert!(repo.delete_program(program.id).await.unwrap());
        assert!(repo.list_programs().await.unwrap().is_empty());
        assert_eq!(count_exercises(&repo, program.id).await, 0);
    }

    #[tokio::test]
    async fn test_delete_missing_program_reports_false() {
        let (repo, _temp) = setup_test_db().await;

        let program = repo.create_program(&push_day()).await.unwrap();
        assert!(!repo.delete_program(ProgramId::new(42)).await.unwrap());
        assert_eq!(repo.list_programs().await.unwrap().len(), 1);

        assert!(repo.delete_program(program.id).await.unwrap());
        assert!(!repo.delete_program(program.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_add_exercise_appends_in_order() {
        let (repo, _temp) = setup_test_db().await;

        let program = repo.create_program(&push_day()).await.unwrap();
        let added = repo
            .add_exercise(program.id, &exercise("Dips", Reps::Text("to failure".to_string()), "push"))
            .await
            .unwrap();
        assert_eq!(added.program_id, program.id);
        assert_eq!(added.name, "Dips");
        assert_eq!(added.reps, Reps::Text("to failure".to_string()));

        let view = repo.get_program(program.id).await.unwrap().unwrap();
        let names: Vec<&str> = view.exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Bench Press", "Dips"]);
        assert_eq!(view.exercises[1].id, added.id);
    }

    #[tokio::test]
    async fn test_add_exercise_to_missing_program_is_not_found() {
        let (repo, _temp) = setup_test_db().await;

        let result = repo
            .add_exercise(ProgramId::new(7), &exercise("Squat", Reps::Count(5), "legs"))
            .await;
        assert!(matches!(result, Err(RepoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_missing_program() {
        let (repo, _temp) = setup_test_db().await;
        assert!(repo.get_program(ProgramId::new(1)).await.unwrap().is_none());
    }
}
