use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    errors::StoreError,
    rota::records::{FlatShiftRecord, UnreadableShift},
    structs::shifts::DbShift,
};

/// Postgres 每個查詢最多 65535 個參數，每列 8 個
const INSERT_CHUNK: usize = 1000;

/// Inclusive date range of one branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShiftRange {
    pub branch: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ShiftRange {
    pub fn new(branch: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            branch: branch.into(),
            start,
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn overlaps(&self, other: &ShiftRange) -> bool {
        self.branch == other.branch && self.start <= other.end && other.start <= self.end
    }
}

/// Rows of one range as read from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredShifts {
    pub records: Vec<FlatShiftRecord>,
    /// 班別無法辨識的紀錄
    pub unreadable: Vec<UnreadableShift>,
}

/// Backing store for saved shifts. Rows that exist are working shifts; a missing
/// row for an employee and date means off.
#[async_trait]
pub trait ShiftStore: Send + Sync {
    async fn list_shifts_in_range(
        &self,
        range: &ShiftRange,
    ) -> Result<StoredShifts, StoreError>;

    async fn delete_shifts_in_range(&self, range: &ShiftRange) -> Result<u64, StoreError>;

    async fn bulk_insert_shifts(&self, records: &[FlatShiftRecord]) -> Result<u64, StoreError>;
}

#[derive(Clone)]
pub struct PgShiftStore {
    pool: PgPool,
}

impl PgShiftStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShiftStore for PgShiftStore {
    async fn list_shifts_in_range(
        &self,
        range: &ShiftRange,
    ) -> Result<StoredShifts, StoreError> {
        let rows: Vec<DbShift> = sqlx::query_as(
            r#"
                SELECT
                    employee_id,
                    employee_name,
                    shift_date,
                    start_time,
                    end_time,
                    shift_type,
                    branch,
                    note
                FROM
                    shifts
                WHERE
                    branch = $1
                    AND shift_date BETWEEN $2 AND $3
                ORDER BY
                    shift_date, employee_id, start_time;
            "#,
        )
        .bind(&range.branch)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        let mut stored = StoredShifts::default();
        for row in rows {
            match row.into_record() {
                Ok(record) => stored.records.push(record),
                Err(unreadable) => {
                    tracing::warn!(
                        "stored shift of employee {} on {} has unknown type `{}`",
                        unreadable.employee_id,
                        unreadable.date,
                        unreadable.shift_type
                    );
                    stored.unreadable.push(unreadable);
                }
            }
        }

        Ok(stored)
    }

    async fn delete_shifts_in_range(&self, range: &ShiftRange) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
                DELETE FROM shifts
                WHERE branch = $1 AND shift_date BETWEEN $2 AND $3;
            "#,
        )
        .bind(&range.branch)
        .bind(range.start)
        .bind(range.end)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // bulk insert
    async fn bulk_insert_shifts(&self, records: &[FlatShiftRecord]) -> Result<u64, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for chunk in records.chunks(INSERT_CHUNK) {
            let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
                r#"
                INSERT INTO shifts (
                    employee_id, employee_name, shift_date, start_time,
                    end_time, shift_type, branch, note
                )
                "#,
            );

            query_builder.push_values(chunk, |mut b, record| {
                b.push_bind(record.employee_id.0)
                    .push_bind(&record.employee_name)
                    .push_bind(record.date)
                    .push_bind(record.start_time)
                    .push_bind(record.end_time)
                    .push_bind(record.shift_type.label())
                    .push_bind(&record.branch)
                    .push_bind(&record.note);
            });

            inserted += query_builder
                .build()
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
