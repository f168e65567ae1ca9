//! Student queries

use crate::models::{Pagination, Student, StudentParams};

use super::{expect_row, DbError, Queries};

const STUDENT_COLUMNS: &str = "student_id, first_name, last_name, email, phone_number, address, \
     college_id, funnel_id, hourly_fee, notes, created_at";

impl Queries<'_> {
    pub async fn create_student(&mut self, params: &StudentParams) -> Result<Student, DbError> {
        let sql = format!(
            r#"
            INSERT INTO students (
                first_name, last_name, email, phone_number, address,
                college_id, funnel_id, hourly_fee, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {STUDENT_COLUMNS}
            "#
        );

        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(params.first_name.as_str())
            .bind(params.last_name.as_str())
            .bind(params.email.as_deref())
            .bind(params.phone_number.as_deref())
            .bind(params.address.as_deref())
            .bind(params.college_id)
            .bind(params.funnel_id)
            .bind(params.hourly_fee)
            .bind(params.notes.as_deref())
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(student)
    }

    pub async fn get_student(&mut self, student_id: i64) -> Result<Student, DbError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE student_id = $1");

        sqlx::query_as::<_, Student>(&sql)
            .bind(student_id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| DbError::not_found("student", student_id))
    }

    /// List ordered by last name, first name, then id.
    pub async fn list_students(&mut self, page: Pagination) -> Result<Vec<Student>, DbError> {
        let sql = format!(
            r#"
            SELECT {STUDENT_COLUMNS}
            FROM students
            ORDER BY last_name, first_name, student_id
            LIMIT $1 OFFSET $2
            "#
        );

        let rows = sqlx::query_as::<_, Student>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows)
    }

    /// Full-row replace; `created_at` is kept.
    pub async fn update_student(
        &mut self,
        student_id: i64,
        params: &StudentParams,
    ) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            UPDATE students
            SET first_name = $2,
                last_name = $3,
                email = $4,
                phone_number = $5,
                address = $6,
                college_id = $7,
                funnel_id = $8,
                hourly_fee = $9,
                notes = $10
            WHERE student_id = $1
            "#,
        )
        .bind(student_id)
        .bind(params.first_name.as_str())
        .bind(params.last_name.as_str())
        .bind(params.email.as_deref())
        .bind(params.phone_number.as_deref())
        .bind(params.address.as_deref())
        .bind(params.college_id)
        .bind(params.funnel_id)
        .bind(params.hourly_fee)
        .bind(params.notes.as_deref())
        .execute(&mut *self.conn)
        .await?;
        expect_row(result, "student", student_id)
    }

    pub async fn delete_student(&mut self, student_id: i64) -> Result<(), DbError> {
        sqlx::query("DELETE FROM students WHERE student_id = $1")
            .bind(student_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }
}
