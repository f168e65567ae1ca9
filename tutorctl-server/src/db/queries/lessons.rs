//! Lesson queries

use crate::models::{Lesson, LessonParams, Pagination};

use super::{expect_row, DbError, Queries};

impl Queries<'_> {
    pub async fn create_lesson(&mut self, params: &LessonParams) -> Result<Lesson, DbError> {
        let lesson = sqlx::query_as::<_, Lesson>(
            r#"
            INSERT INTO lessons (lesson_datetime, duration, location_id, subject_id, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING lesson_id, lesson_datetime, duration, location_id, subject_id, notes
            "#,
        )
        .bind(params.lesson_datetime)
        .bind(params.duration)
        .bind(params.location_id)
        .bind(params.subject_id)
        .bind(params.notes.as_deref())
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(lesson)
    }

    pub async fn get_lesson(&mut self, lesson_id: i64) -> Result<Lesson, DbError> {
        sqlx::query_as::<_, Lesson>(
            r#"
            SELECT lesson_id, lesson_datetime, duration, location_id, subject_id, notes
            FROM lessons
            WHERE lesson_id = $1
            "#,
        )
        .bind(lesson_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| DbError::not_found("lesson", lesson_id))
    }

    pub async fn list_lessons(&mut self, page: Pagination) -> Result<Vec<Lesson>, DbError> {
        let rows = sqlx::query_as::<_, Lesson>(
            r#"
            SELECT lesson_id, lesson_datetime, duration, location_id, subject_id, notes
            FROM lessons
            ORDER BY lesson_datetime, lesson_id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows)
    }

    pub async fn update_lesson(
        &mut self,
        lesson_id: i64,
        params: &LessonParams,
    ) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            UPDATE lessons
            SET lesson_datetime = $2, duration = $3, location_id = $4, subject_id = $5, notes = $6
            WHERE lesson_id = $1
            "#,
        )
        .bind(lesson_id)
        .bind(params.lesson_datetime)
        .bind(params.duration)
        .bind(params.location_id)
        .bind(params.subject_id)
        .bind(params.notes.as_deref())
        .execute(&mut *self.conn)
        .await?;
        expect_row(result, "lesson", lesson_id)
    }

    pub async fn delete_lesson(&mut self, lesson_id: i64) -> Result<(), DbError> {
        sqlx::query("DELETE FROM lessons WHERE lesson_id = $1")
            .bind(lesson_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }
}
