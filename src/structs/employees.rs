use crate::rota::model::{Employee, EmployeeId};

#[derive(sqlx::FromRow)]
pub struct DbEmployee {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub avatar: Option<String>,
    pub branch: String,
}

impl From<DbEmployee> for Employee {
    fn from(row: DbEmployee) -> Self {
        Employee {
            id: EmployeeId(row.id),
            name: row.name,
            role: row.role,
            avatar: row.avatar,
        }
    }
}

/// 匯入班表時自動建立的帳號
#[derive(Debug)]
pub struct NewEmployee {
    pub name: String,
    pub role: String,
    pub branch: String,
    pub password_hash: String,
}
