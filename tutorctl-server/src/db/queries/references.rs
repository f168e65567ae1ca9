//! Generic CRUD over the five reference tables

use crate::models::{Pagination, Reference, ReferenceName};

use super::{expect_row, DbError, Queries};

impl Queries<'_> {
    pub async fn create_reference<R: Reference>(
        &mut self,
        name: &ReferenceName,
    ) -> Result<R, DbError> {
        let kind = R::KIND;
        let sql = format!(
            "INSERT INTO {} (name) VALUES ($1) RETURNING {}, name",
            kind.table(),
            kind.id_column()
        );

        let reference = sqlx::query_as::<_, R>(&sql)
            .bind(name.as_str())
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(reference)
    }

    pub async fn get_reference<R: Reference>(&mut self, id: i64) -> Result<R, DbError> {
        let kind = R::KIND;
        let sql = format!(
            "SELECT {id}, name FROM {table} WHERE {id} = $1",
            id = kind.id_column(),
            table = kind.table()
        );

        sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| DbError::not_found(kind.resource(), id))
    }

    /// List ordered by name, then id.
    pub async fn list_references<R: Reference>(
        &mut self,
        page: Pagination,
    ) -> Result<Vec<R>, DbError> {
        let kind = R::KIND;
        let sql = format!(
            "SELECT {id}, name FROM {table} ORDER BY name, {id} LIMIT $1 OFFSET $2",
            id = kind.id_column(),
            table = kind.table()
        );

        let rows = sqlx::query_as::<_, R>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn update_reference<R: Reference>(
        &mut self,
        id: i64,
        name: &ReferenceName,
    ) -> Result<(), DbError> {
        let kind = R::KIND;
        let sql = format!(
            "UPDATE {} SET name = $2 WHERE {} = $1",
            kind.table(),
            kind.id_column()
        );

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(name.as_str())
            .execute(&mut *self.conn)
            .await?;
        expect_row(result, kind.resource(), id)
    }

    pub async fn delete_reference<R: Reference>(&mut self, id: i64) -> Result<(), DbError> {
        let kind = R::KIND;
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1",
            kind.table(),
            kind.id_column()
        );

        sqlx::query(&sql).bind(id).execute(&mut *self.conn).await?;
        Ok(())
    }
}
