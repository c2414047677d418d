use crate::{
    errors::{AppError, RequestError},
    repositories::shifts::ShiftRange,
    rota::{
        analyzer::{analyze, FairnessStats},
        editor::RosterEditor,
        export::to_csv,
        import::parse_table,
        records::StoredRange,
    },
    services::roster,
    state::AppState,
    structs::roster::{
        EditRequest, EditResponse, GenerateRequest, ImportQuery, ImportResponse, RangeQuery,
        RosterResponse, SaveReport, SaveRequest, SaveStatus, SaveStatusQuery, ScheduleBody,
    },
};
use axum::{
    extract::{Multipart, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

pub fn new() -> Router<AppState> {
    Router::new()
        .route("/", get(load_range))
        .route("/generate", post(generate))
        .route("/edit", post(edit))
        .route("/analyze", post(analyze_schedule))
        .route("/export", post(export))
        .route("/save", post(save))
        .route("/save/status", get(save_status))
        .route("/import", post(import))
}

/// 產生班表
async fn generate(
    State(state): State<AppState>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<RosterResponse>, AppError> {
    let directory = state.directory();
    let response = roster::generate_roster(&directory, state.config(), payload).await?;

    Ok(Json(response))
}

/// 手動切換單一格
async fn edit(Json(mut payload): Json<EditRequest>) -> Result<Json<EditResponse>, AppError> {
    payload.schedule.validate()?;
    payload.schedule.refresh_warnings();

    let mut editor = RosterEditor::new(payload.schedule);
    let shift = editor.cycle(payload.day_index, payload.employee_id)?;
    let (schedule, stats) = editor.into_parts();

    Ok(Json(EditResponse {
        shift,
        roster: RosterResponse::new(schedule, stats),
    }))
}

async fn analyze_schedule(
    Json(payload): Json<ScheduleBody>,
) -> Result<Json<FairnessStats>, AppError> {
    payload.schedule.validate()?;

    Ok(Json(analyze(&payload.schedule)))
}

async fn export(Json(payload): Json<ScheduleBody>) -> Result<impl IntoResponse, AppError> {
    payload.schedule.validate()?;
    let csv = to_csv(&payload.schedule)?;

    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv))
}

/// 讀取已儲存的區間
async fn load_range(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<StoredRange>, AppError> {
    let store = state.shift_store();
    let directory = state.directory();
    let stored = roster::load_range(&store, &directory, state.config(), &query).await?;

    Ok(Json(stored))
}

/// 覆寫儲存，先刪後寫
async fn save(
    State(state): State<AppState>,
    Json(payload): Json<SaveRequest>,
) -> Result<Json<SaveReport>, AppError> {
    let store = state.shift_store();
    let report = roster::save_schedule(
        &store,
        state.saves(),
        state.config(),
        &payload.branch,
        &payload.schedule,
        payload.confirm,
    )
    .await?;

    Ok(Json(report))
}

async fn save_status(
    State(state): State<AppState>,
    Query(query): Query<SaveStatusQuery>,
) -> Json<SaveStatus> {
    let range = ShiftRange::new(query.branch, query.start, query.end);

    Json(SaveStatus {
        in_flight: state.saves().is_in_flight(&range),
    })
}

/// 上傳 csv 匯入班表
async fn import(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|err| RequestError::Multipart(err.to_string()))?
        .ok_or(RequestError::MissingFile)?;
    let data = field
        .bytes()
        .await
        .map_err(|err| RequestError::Multipart(err.to_string()))?;
    if data.is_empty() {
        return Err(RequestError::InvalidContent("上傳的檔案是空的".to_string()).into());
    }

    let table = parse_table(&data)?;
    tracing::debug!(
        "import for {}: {} column(s), {} row(s)",
        query.branch,
        table.employee_names.len(),
        table.rows.len()
    );

    let store = state.shift_store();
    let directory = state.directory();
    let response = roster::import_table(
        &store,
        &directory,
        state.saves(),
        state.config(),
        &query.branch,
        &table,
        query.confirm,
    )
    .await?;

    Ok(Json(response))
}
