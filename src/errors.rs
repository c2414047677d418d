use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

use crate::rota::model::EmployeeId;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    RosterError(#[from] RosterError),
    #[error(transparent)]
    SaveError(#[from] SaveError),
    #[error(transparent)]
    StoreError(#[from] StoreError),
    #[error(transparent)]
    RequestError(#[from] RequestError),
    #[error(transparent)]
    SystemError(#[from] SystemError),
    #[error("資料庫錯誤: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// 排班核心的輸入錯誤，覆蓋率與公平性問題不在這裡（那些是 warning）
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("day count must be positive, got {0}")]
    InvalidDayCount(u32),
    #[error("day count {0} exceeds the limit of {1}")]
    TooManyDays(u32, u32),
    #[error("{0} plus {1} days is outside the supported calendar")]
    DateOutOfRange(NaiveDate, u32),
    #[error("day index {0} is outside a roster of {1} days")]
    DayOutOfRange(usize, usize),
    #[error("unknown employee {0}")]
    UnknownEmployee(EmployeeId),
    #[error("no employee named `{0}`")]
    UnknownEmployeeName(String),
    #[error("unknown shift label `{0}`")]
    UnknownShiftLabel(String),
    #[error("malformed schedule: {0}")]
    MalformedSchedule(String),
    #[error("malformed import: {0}")]
    MalformedImport(String),
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("export failed: {0}")]
    Export(String),
}

/// Outcome of the delete-then-insert overwrite when it does not complete.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("overwriting {branch} {start}..={end} deletes saved shifts, confirm to continue")]
    NotConfirmed {
        branch: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("a save for {branch} {start}..={end} is already in progress")]
    InFlight {
        branch: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("invalid shift record: {0}")]
    InvalidRecord(String),
    /// 刪除失敗，原資料未變動，可整個重試
    #[error("deleting saved shifts failed, nothing was changed: {0}")]
    DeleteFailed(StoreError),
    /// 刪除成功但寫入失敗，區間目前是空的，需要重新寫入
    #[error("{deleted} saved shift(s) were deleted but inserting the new roster failed, the range is now empty and the insert must be retried: {source}")]
    PartialOverwrite { deleted: u64, source: StoreError },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("shift store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("無效的請求內容: {0}")]
    InvalidContent(String),
    #[error("multipart 讀取失敗: {0}")]
    Multipart(String),
    #[error("multipart 沒有檔案")]
    MissingFile,
}

#[derive(Error, Debug)]
pub enum SystemError {
    #[error("環境變數 {0} 未設定")]
    EnvVarMissing(String),
    #[error("環境變數 {0} 的值 `{1}` 無效")]
    InvalidEnvVar(String, String),
    #[error("內部錯誤: {0}")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::RosterError(RosterError::UnknownEmployee(_)) => StatusCode::NOT_FOUND,
            AppError::RosterError(_) => StatusCode::BAD_REQUEST,
            AppError::SaveError(err) => match err {
                SaveError::NotConfirmed { .. } => StatusCode::PRECONDITION_REQUIRED,
                SaveError::InFlight { .. } => StatusCode::CONFLICT,
                SaveError::InvalidRecord(_) => StatusCode::UNPROCESSABLE_ENTITY,
                SaveError::DeleteFailed(_) => StatusCode::BAD_GATEWAY,
                SaveError::PartialOverwrite { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::StoreError(_) => StatusCode::BAD_GATEWAY,
            AppError::RequestError(RequestError::InvalidContent(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::RequestError(_) => StatusCode::BAD_REQUEST,
            AppError::SystemError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 讓前端分辨要重試整個儲存還是只重試寫入
    fn kind(&self) -> &'static str {
        match self {
            AppError::SaveError(SaveError::DeleteFailed(_)) => "retry_save",
            AppError::SaveError(SaveError::PartialOverwrite { .. }) => "retry_insert",
            AppError::SaveError(SaveError::InFlight { .. }) => "save_in_progress",
            AppError::SaveError(SaveError::NotConfirmed { .. }) => "confirmation_required",
            AppError::RosterError(_) | AppError::RequestError(_) => "invalid_input",
            _ => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));
        (status_code, body).into_response()
    }
}
