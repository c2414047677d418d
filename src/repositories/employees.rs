use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    errors::StoreError,
    rota::model::Employee,
    structs::employees::{DbEmployee, NewEmployee},
};

/// Read side of the user directory used for scheduling, plus account creation
/// for imported rosters.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn schedulable_employees(
        &self,
        branch: &str,
        roles: &[String],
    ) -> Result<Vec<Employee>, StoreError>;

    /// Every user of `branch` whose name (case-insensitive) or numeric id is in
    /// `names`, whatever the role and including inactive accounts.
    async fn find_by_names(
        &self,
        branch: &str,
        names: &[String],
    ) -> Result<Vec<Employee>, StoreError>;

    async fn create_employee(&self, new_employee: NewEmployee) -> Result<Employee, StoreError>;
}

#[derive(Clone)]
pub struct PgEmployeeDirectory {
    pool: PgPool,
}

impl PgEmployeeDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeDirectory for PgEmployeeDirectory {
    /// 取某分店、指定職務且在職的員工，依 id 排序（決定夜班輪值的順序）
    async fn schedulable_employees(
        &self,
        branch: &str,
        roles: &[String],
    ) -> Result<Vec<Employee>, StoreError> {
        let rows: Vec<DbEmployee> = sqlx::query_as(
            r#"
                SELECT
                    id,
                    name,
                    role,
                    avatar,
                    branch
                FROM
                    users
                WHERE
                    branch = $1
                    AND role = ANY($2)
                    AND active
                ORDER BY
                    id;
            "#,
        )
        .bind(branch)
        .bind(roles)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn find_by_names(
        &self,
        branch: &str,
        names: &[String],
    ) -> Result<Vec<Employee>, StoreError> {
        let keys: Vec<String> = names.iter().map(|name| name.trim().to_lowercase()).collect();

        let rows: Vec<DbEmployee> = sqlx::query_as(
            r#"
                SELECT
                    id,
                    name,
                    role,
                    avatar,
                    branch
                FROM
                    users
                WHERE
                    branch = $1
                    AND (LOWER(TRIM(name)) = ANY($2) OR id::text = ANY($2))
                ORDER BY
                    id;
            "#,
        )
        .bind(branch)
        .bind(&keys)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn create_employee(&self, new_employee: NewEmployee) -> Result<Employee, StoreError> {
        let row: DbEmployee = sqlx::query_as(
            r#"
                INSERT INTO users (name, role, branch, password, active)
                VALUES ($1, $2, $3, $4, TRUE)
                RETURNING id, name, role, avatar, branch;
            "#,
        )
        .bind(&new_employee.name)
        .bind(&new_employee.role)
        .bind(&new_employee.branch)
        .bind(&new_employee.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
