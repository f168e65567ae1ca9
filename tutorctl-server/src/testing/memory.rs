//! In-memory store for handler tests

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::{DbError, Store};
use crate::models::{
    Pagination, Reference, ReferenceKind, ReferenceName, Student, StudentParams,
};

#[derive(Debug)]
struct Table<V> {
    next_id: i64,
    rows: BTreeMap<i64, V>,
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<V> Table<V> {
    /// Assign the next id and store the row built for it.
    fn insert(&mut self, row: impl FnOnce(i64) -> V) -> (i64, &V) {
        self.next_id += 1;
        let id = self.next_id;
        (id, self.rows.entry(id).or_insert(row(id)))
    }
}

#[derive(Debug, Default)]
struct Tables {
    references: HashMap<ReferenceKind, Table<String>>,
    students: Table<Student>,
}

impl Tables {
    fn references(&mut self, kind: ReferenceKind) -> &mut Table<String> {
        self.references.entry(kind).or_default()
    }

    fn has_reference(&self, kind: ReferenceKind, id: i64) -> bool {
        self.references
            .get(&kind)
            .is_some_and(|table| table.rows.contains_key(&id))
    }

    /// Mirror the students table's foreign keys.
    fn check_student_refs(&self, params: &StudentParams) -> Result<(), DbError> {
        let refs = [
            (ReferenceKind::College, params.college_id),
            (ReferenceKind::Funnel, params.funnel_id),
        ];
        for (kind, id) in refs {
            if let Some(id) = id {
                if !self.has_reference(kind, id) {
                    return Err(DbError::ConstraintViolation {
                        constraint: format!("students_{}_fkey", kind.id_column()),
                        message: format!("{} {} does not exist", kind.resource(), id),
                    });
                }
            }
        }
        Ok(())
    }
}

fn page_of<T: Clone>(rows: Vec<T>, page: Pagination) -> Vec<T> {
    rows.into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect()
}

fn student_row(student_id: i64, params: StudentParams, created_at: DateTime<Utc>) -> Student {
    Student {
        student_id,
        first_name: params.first_name.into_string(),
        last_name: params.last_name.into_string(),
        email: params.email,
        phone_number: params.phone_number,
        address: params.address,
        college_id: params.college_id,
        funnel_id: params.funnel_id,
        hourly_fee: params.hourly_fee,
        notes: params.notes,
        created_at,
    }
}

/// [`Store`] backed by in-process maps.
///
/// Ids are assigned from 1 per table, listings follow the same ordering as
/// the database queries, and student foreign keys are enforced. A store
/// built with [`MemoryStore::failing`] returns a datastore error from every
/// call.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails as if the pool were closed.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, DbError> {
        if self.failing {
            return Err(DbError::Sqlx(sqlx::Error::PoolClosed));
        }
        Ok(self.tables.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of rows currently held for a reference kind.
    pub fn reference_count(&self, kind: ReferenceKind) -> usize {
        self.tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .references
            .get(&kind)
            .map_or(0, |table| table.rows.len())
    }

    pub fn student_count(&self) -> usize {
        self.tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .students
            .rows
            .len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_reference<R: Reference>(&self, name: ReferenceName) -> Result<R, DbError> {
        let mut tables = self.tables()?;
        let (id, stored) = tables.references(R::KIND).insert(|_| name.into_string());
        Ok(R::from_parts(id, stored.clone()))
    }

    async fn get_reference<R: Reference>(&self, id: i64) -> Result<R, DbError> {
        let mut tables = self.tables()?;
        tables
            .references(R::KIND)
            .rows
            .get(&id)
            .map(|name| R::from_parts(id, name.clone()))
            .ok_or_else(|| DbError::not_found(R::KIND.resource(), id))
    }

    async fn list_references<R: Reference>(&self, page: Pagination) -> Result<Vec<R>, DbError> {
        let mut tables = self.tables()?;
        let mut rows: Vec<(i64, String)> = tables
            .references(R::KIND)
            .rows
            .iter()
            .map(|(id, name)| (*id, name.clone()))
            .collect();
        rows.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

        Ok(page_of(rows, page)
            .into_iter()
            .map(|(id, name)| R::from_parts(id, name))
            .collect())
    }

    async fn update_reference<R: Reference>(
        &self,
        id: i64,
        name: ReferenceName,
    ) -> Result<(), DbError> {
        let mut tables = self.tables()?;
        match tables.references(R::KIND).rows.get_mut(&id) {
            Some(row) => {
                *row = name.into_string();
                Ok(())
            }
            None => Err(DbError::not_found(R::KIND.resource(), id)),
        }
    }

    async fn delete_reference<R: Reference>(&self, id: i64) -> Result<(), DbError> {
        let mut tables = self.tables()?;
        let kind = R::KIND;
        let referenced = tables.students.rows.values().any(|s| match kind {
            ReferenceKind::College => s.college_id == Some(id),
            ReferenceKind::Funnel => s.funnel_id == Some(id),
            _ => false,
        });
        if referenced {
            return Err(DbError::ConstraintViolation {
                constraint: format!("students_{}_fkey", kind.id_column()),
                message: format!("{} {} is still referenced by a student", kind.resource(), id),
            });
        }
        tables.references(kind).rows.remove(&id);
        Ok(())
    }

    async fn create_student(&self, params: StudentParams) -> Result<Student, DbError> {
        let mut tables = self.tables()?;
        tables.check_student_refs(&params)?;
        let created_at = Utc::now();
        let (_, student) = tables
            .students
            .insert(|id| student_row(id, params, created_at));
        Ok(student.clone())
    }

    async fn get_student(&self, student_id: i64) -> Result<Student, DbError> {
        let tables = self.tables()?;
        tables
            .students
            .rows
            .get(&student_id)
            .cloned()
            .ok_or_else(|| DbError::not_found("student", student_id))
    }

    async fn list_students(&self, page: Pagination) -> Result<Vec<Student>, DbError> {
        let tables = self.tables()?;
        let mut rows: Vec<Student> = tables.students.rows.values().cloned().collect();
        rows.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
                .then(a.student_id.cmp(&b.student_id))
        });
        Ok(page_of(rows, page))
    }

    async fn update_student(
        &self,
        student_id: i64,
        params: StudentParams,
    ) -> Result<(), DbError> {
        let mut tables = self.tables()?;
        tables.check_student_refs(&params)?;
        match tables.students.rows.get_mut(&student_id) {
            Some(row) => {
                *row = student_row(student_id, params, row.created_at);
                Ok(())
            }
            None => Err(DbError::not_found("student", student_id)),
        }
    }

    async fn delete_student(&self, student_id: i64) -> Result<(), DbError> {
        let mut tables = self.tables()?;
        tables.students.rows.remove(&student_id);
        Ok(())
    }
}
