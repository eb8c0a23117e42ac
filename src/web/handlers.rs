use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{AppError, AppState, CurrentSession};
use crate::assessment::{generator, Question};
use crate::challenges::{self, ChallengeKind, DEBATE_TOPICS};
use crate::error::{AssessmentError, FeedbackError};
use crate::feedback::{self, FeedbackReport};
use crate::journal::{EntryOrder, JournalEntry};
use crate::literacy::{LiteracyModuleId, TASKS_PER_MODULE};
use crate::scoring::{self, ScoreResult};
use crate::session::ReflectionModule;

type ApiResult<T> = Result<T, AppError>;

pub(crate) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn session_snapshot(Extension(current): Extension<CurrentSession>) -> Json<Value> {
    let session = current.handle.lock().await;
    Json(json!({ "id": current.id, "session": session.snapshot() }))
}

/// Ends the caller's session and expires its cookie.
pub(crate) async fn end_session(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> impl IntoResponse {
    state.sessions.remove(current.id).await;
    let cookie = super::session::expired_cookie(state.config.server.secure_cookies);
    (
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "message": "Session ended" })),
    )
}

#[derive(Deserialize)]
pub(crate) struct SelectModuleBody {
    module: ReflectionModule,
}

pub(crate) async fn select_module(
    Extension(current): Extension<CurrentSession>,
    Json(body): Json<SelectModuleBody>,
) -> Json<Value> {
    let mut session = current.handle.lock().await;
    session.selected_module = Some(body.module);
    Json(json!({ "selected_module": body.module }))
}

// ---- Journal ----

#[derive(Deserialize)]
pub(crate) struct JournalBody {
    #[serde(default)]
    task: String,
    #[serde(default)]
    tool: String,
    #[serde(default)]
    usage: String,
}

#[derive(Serialize)]
struct NumberedEntry<'a> {
    number: usize,
    date: String,
    #[serde(flatten)]
    entry: &'a JournalEntry,
}

pub(crate) async fn submit_journal(
    Extension(current): Extension<CurrentSession>,
    Json(body): Json<JournalBody>,
) -> ApiResult<impl IntoResponse> {
    let mut session = current.handle.lock().await;
    let entry = session
        .submit_journal_entry(&body.task, &body.tool, &body.usage)?
        .clone();
    let saved = NumberedEntry {
        number: session.journal.len(),
        date: entry.date(),
        entry: &entry,
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Journal entry saved successfully!", "entry": saved })),
    ))
}

#[derive(Deserialize)]
pub(crate) struct JournalQuery {
    #[serde(default)]
    order: EntryOrder,
}

pub(crate) async fn list_journal(
    Extension(current): Extension<CurrentSession>,
    Query(query): Query<JournalQuery>,
) -> Json<Value> {
    let session = current.handle.lock().await;
    let total = session.journal.len();

    // entry numbers follow insertion order in both views
    let entries: Vec<NumberedEntry> = session
        .journal
        .list_entries(query.order)
        .enumerate()
        .map(|(i, entry)| NumberedEntry {
            number: match query.order {
                EntryOrder::Chronological => i + 1,
                EntryOrder::Recent => total - i,
            },
            date: entry.date(),
            entry,
        })
        .collect();

    Json(json!({ "order": query.order, "total": total, "entries": entries }))
}

// ---- Assessment ----

#[derive(Serialize)]
struct AssessmentView<'a> {
    questions: &'a [Question],
    answers: &'a std::collections::BTreeMap<usize, String>,
    unanswered: usize,
}

fn assessment_json(session: &crate::session::Session) -> Value {
    let assessment = &session.assessment;
    let view = AssessmentView {
        questions: assessment.questions(),
        answers: assessment.answers(),
        unanswered: assessment.unanswered_count(),
    };
    json!(view)
}

pub(crate) async fn assessment_state(Extension(current): Extension<CurrentSession>) -> Json<Value> {
    let session = current.handle.lock().await;
    Json(assessment_json(&session))
}

pub(crate) async fn load_questions(Extension(current): Extension<CurrentSession>) -> Json<Value> {
    let mut session = current.handle.lock().await;
    if session.assessment.questions().is_empty() {
        session.assessment.load_fixed_question_bank();
    }
    Json(assessment_json(&session))
}

pub(crate) async fn generate_questions(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> ApiResult<Json<Value>> {
    let mut session = current.handle.lock().await;
    if !session.assessment.questions().is_empty() {
        return Err(AssessmentError::BankAlreadyLoaded.into());
    }
    let questions = generator::generate_questions(state.completion.as_ref()).await?;
    session.assessment.replace_questions(questions);
    Ok(Json(assessment_json(&session)))
}

#[derive(Deserialize)]
pub(crate) struct AnswerBody {
    option: String,
}

pub(crate) async fn record_answer(
    Extension(current): Extension<CurrentSession>,
    Path(index): Path<usize>,
    Json(body): Json<AnswerBody>,
) -> ApiResult<Json<Value>> {
    let mut session = current.handle.lock().await;
    session.assessment.record_answer(index, &body.option)?;
    Ok(Json(assessment_json(&session)))
}

pub(crate) async fn submit_assessment(
    Extension(current): Extension<CurrentSession>,
) -> ApiResult<Json<Value>> {
    let session = current.handle.lock().await;
    let submission = session.assessment.submit()?;
    Ok(Json(json!({
        "message": "Assessment submitted successfully!",
        "responses": submission.responses,
    })))
}

pub(crate) async fn reset_assessment(Extension(current): Extension<CurrentSession>) -> Json<Value> {
    let mut session = current.handle.lock().await;
    session.assessment.reset();
    Json(assessment_json(&session))
}

// ---- Report ----

#[derive(Serialize)]
struct ScoreView {
    #[serde(flatten)]
    score: ScoreResult,
    tier: scoring::Tier,
    tier_label: &'static str,
    interpretation: &'static str,
    tip: Option<&'static str>,
}

pub(crate) async fn report(Extension(current): Extension<CurrentSession>) -> Json<Value> {
    let session = current.handle.lock().await;

    let score = scoring::aggregate(&session.assessment);
    let score = (score.answered_count() > 0).then(|| {
        let tier = score.tier();
        ScoreView {
            tier,
            tier_label: tier.label(),
            interpretation: tier.interpretation(),
            tip: scoring::tip(score.percentage),
            score,
        }
    });

    let latest = session.journal.latest().map(|entry| NumberedEntry {
        number: session.journal.len(),
        date: entry.date(),
        entry,
    });

    Json(json!({
        "journal": { "total": session.journal.len(), "latest": latest },
        "assessment": {
            "questions_loaded": session.assessment.questions().len(),
            "score": score,
        },
        "can_generate_feedback": !session.journal.is_empty() || session.assessment.has_answers(),
    }))
}

fn report_json(report: &FeedbackReport) -> Value {
    json!({
        "report": report,
        "download_filename": report.artifact_filename(),
    })
}

pub(crate) async fn generate_feedback(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> ApiResult<Json<Value>> {
    let mut session = current.handle.lock().await;
    let report = feedback::generate_feedback(
        state.completion.as_ref(),
        &session.journal,
        &session.assessment,
        state.config.feedback.journal_context_entries,
    )
    .await?;

    let body = report_json(&report);
    session.last_report = Some(report);
    Ok(Json(body))
}

pub(crate) async fn fallback_feedback(Extension(current): Extension<CurrentSession>) -> Json<Value> {
    let mut session = current.handle.lock().await;
    let report = feedback::fallback_report();
    let body = report_json(&report);
    session.last_report = Some(report);
    Json(body)
}

pub(crate) async fn download_report(
    Extension(current): Extension<CurrentSession>,
) -> ApiResult<impl IntoResponse> {
    let session = current.handle.lock().await;
    let report = session
        .last_report
        .as_ref()
        .ok_or(FeedbackError::NoReport)?;

    let disposition = format!("attachment; filename=\"{}\"", report.artifact_filename());
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.artifact(),
    ))
}

pub(crate) async fn clear_all(Extension(current): Extension<CurrentSession>) -> Json<Value> {
    let mut session = current.handle.lock().await;
    session.clear_all();
    Json(json!({
        "message": "All data cleared successfully!",
        "session": session.snapshot(),
    }))
}

// ---- Literacy ----

fn literacy_json(session: &crate::session::Session) -> Value {
    let modules: Vec<Value> = LiteracyModuleId::ALL
        .into_iter()
        .map(|id| {
            json!({
                "slug": id.slug(),
                "module": id.definition(),
                "tasks": session.literacy.tasks(id),
                "completion": session.literacy.completion(id),
            })
        })
        .collect();
    json!({
        "selected": session.selected_literacy_module,
        "modules": modules,
    })
}

pub(crate) async fn literacy_modules(Extension(current): Extension<CurrentSession>) -> Json<Value> {
    let session = current.handle.lock().await;
    Json(literacy_json(&session))
}

pub(crate) async fn select_literacy_module(
    Extension(current): Extension<CurrentSession>,
    Path(module): Path<String>,
) -> ApiResult<Json<Value>> {
    let module: LiteracyModuleId = module.parse()?;
    let mut session = current.handle.lock().await;
    session.selected_literacy_module = Some(module);
    Ok(Json(literacy_json(&session)))
}

#[derive(Deserialize)]
pub(crate) struct TaskBody {
    done: bool,
}

pub(crate) async fn set_literacy_task(
    Extension(current): Extension<CurrentSession>,
    Path((module, index)): Path<(String, usize)>,
    Json(body): Json<TaskBody>,
) -> ApiResult<Json<Value>> {
    let module: LiteracyModuleId = module.parse()?;
    let mut session = current.handle.lock().await;
    session.literacy.set_task(module, index, body.done)?;
    Ok(Json(json!({
        "module": module,
        "tasks": session.literacy.tasks(module),
        "completion": session.literacy.completion(module),
        "tasks_per_module": TASKS_PER_MODULE,
    })))
}

// ---- Challenges ----

pub(crate) async fn list_challenges(Extension(current): Extension<CurrentSession>) -> Json<Value> {
    let session = current.handle.lock().await;
    let challenges: Vec<_> = ChallengeKind::ALL.into_iter().map(|c| c.definition()).collect();
    Json(json!({
        "selected": session.selected_challenge,
        "challenges": challenges,
        "debate_topics": DEBATE_TOPICS,
    }))
}

pub(crate) async fn select_challenge(
    Extension(current): Extension<CurrentSession>,
    Path(kind): Path<String>,
) -> ApiResult<Json<Value>> {
    let kind: ChallengeKind = kind.parse()?;
    let mut session = current.handle.lock().await;
    session.selected_challenge = Some(kind);
    Ok(Json(json!({ "selected": kind, "challenge": kind.definition() })))
}

pub(crate) async fn submit_challenge(
    Extension(current): Extension<CurrentSession>,
    Path(kind): Path<String>,
    Json(fields): Json<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let kind: ChallengeKind = kind.parse()?;
    let message = challenges::submit(kind, &fields)?;
    current.handle.lock().await.selected_challenge = Some(kind);
    Ok(Json(json!({ "message": message })))
}
