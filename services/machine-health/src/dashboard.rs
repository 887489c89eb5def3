//! Web dashboard: server-rendered form, diagnostics and history, plus a JSON API

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::history::{HealthStatus, HistoryEntry};
use crate::predictor::{PredictionClient, PredictionResponse};
use crate::scenarios::{self, DEFAULT_VALUES, SCENARIOS};
use crate::schema::{field, FieldErrors, MachineType};
use crate::session::{submit, Session, SessionHandle, SessionPhase, SubmitError, FAILURE_NOTICE};

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub session: SessionHandle,
    pub predictor: Arc<PredictionClient>,
    pub result_delay: Duration,
}

/// Build the dashboard axum router
pub fn build_router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/predict", post(predict_form_handler))
        .route("/reset", post(reset_handler))
        .route("/api/predict", post(predict_api_handler))
        .route("/api/session", get(session_handler))
        .route("/api/history", get(history_handler))
        .route("/api/scenarios", get(scenarios_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct IndexQuery {
    scenario: Option<String>,
}

async fn index_handler(
    State(dashboard): State<DashboardState>,
    Query(query): Query<IndexQuery>,
) -> impl IntoResponse {
    let values = query
        .scenario
        .as_deref()
        .and_then(scenarios::find)
        .unwrap_or(&DEFAULT_VALUES)
        .raw();
    let session = dashboard.session.read().await;
    Html(render_page(&session, &values, None))
}

async fn predict_form_handler(
    State(dashboard): State<DashboardState>,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    let raw = form_to_raw(&form);
    let banner = match submit(
        &dashboard.session,
        &dashboard.predictor,
        &raw,
        dashboard.result_delay,
    )
    .await
    {
        Err(e @ SubmitError::Busy) => Some(e.to_string()),
        _ => None,
    };
    let session = dashboard.session.read().await;
    Html(render_page(&session, &raw, banner.as_deref()))
}

async fn reset_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    dashboard.session.write().await.reset();
    Redirect::to("/")
}

async fn predict_api_handler(
    State(dashboard): State<DashboardState>,
    Json(raw): Json<Value>,
) -> Response {
    match submit(
        &dashboard.session,
        &dashboard.predictor,
        &raw,
        dashboard.result_delay,
    )
    .await
    {
        Ok(prediction) => (StatusCode::OK, Json(prediction)).into_response(),
        Err(SubmitError::Invalid(errors)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": errors })),
        )
            .into_response(),
        Err(e @ SubmitError::Busy) => {
            (StatusCode::CONFLICT, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(SubmitError::Prediction(_)) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": FAILURE_NOTICE })),
        )
            .into_response(),
    }
}

async fn session_handler(State(dashboard): State<DashboardState>) -> Response {
    let session = dashboard.session.read().await;
    Json(&*session).into_response()
}

async fn history_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let session = dashboard.session.read().await;
    Json(session.history().to_vec())
}

async fn scenarios_handler() -> impl IntoResponse {
    Json(SCENARIOS)
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}

/// Turn submitted form text into a raw record for validation.
///
/// Blank fields are left out; numeric text becomes a JSON number and
/// anything else stays a string so validation can report it.
pub fn form_to_raw(form: &HashMap<String, String>) -> Value {
    let mut record = Map::new();
    for name in field::ALL {
        let Some(text) = form.get(name).map(|s| s.trim()) else {
            continue;
        };
        if text.is_empty() {
            continue;
        }
        let value = if name == field::MACHINE_TYPE {
            Value::String(text.to_string())
        } else if let Ok(n) = text.parse::<i64>() {
            Value::from(n)
        } else {
            text.parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(text.to_string()))
        };
        record.insert(name.to_string(), value);
    }
    Value::Object(record)
}

/// Probability as a percentage with one decimal
pub fn format_percent(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

/// Time of day of an epoch-milliseconds timestamp, as `HH:MM:SS UTC`
pub fn format_clock(epoch_ms: u64) -> String {
    let secs = (epoch_ms / 1000) % 86_400;
    format!(
        "{:02}:{:02}:{:02} UTC",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn value_text(values: &Value, name: &str) -> String {
    match values.get(name) {
        Some(Value::String(s)) => escape_html(s),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn status_colors(status: HealthStatus) -> (&'static str, &'static str) {
    match status {
        HealthStatus::Normal => ("#155724", "#d4edda"),
        HealthStatus::FailureImminent => ("#721c24", "#f8d7da"),
    }
}

fn render_page(session: &Session, values: &Value, banner: Option<&str>) -> String {
    let notice = banner
        .or(session.notice())
        .map(|text| {
            format!(
                r#"<div role="alert" style="padding: 0.75rem; margin-bottom: 1rem; border-radius: 0.25rem; color: #721c24; background-color: #f8d7da;">{}</div>"#,
                escape_html(text)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Predictive Maintenance AI</title>
</head>
<body style="font-family: system-ui, sans-serif; max-width: 1100px; margin: 0 auto; padding: 1rem;">
    <h1>Predictive Maintenance AI</h1>
    {notice}
    <div style="display: flex; flex-wrap: wrap; gap: 2rem;">
        <div style="flex: 1 1 320px;">
            {form}
            {history}
        </div>
        <div style="flex: 2 1 480px;">
            {diagnostics}
        </div>
    </div>
</body>
</html>"#,
        notice = notice,
        form = render_form(
            values,
            session.field_errors(),
            session.phase() == SessionPhase::Submitting
        ),
        history = render_history(session.history()),
        diagnostics = render_diagnostics(session.current_result()),
    )
}

fn render_form(values: &Value, errors: Option<&FieldErrors>, submitting: bool) -> String {
    let scenario_links: String = SCENARIOS
        .iter()
        .map(|s| {
            format!(
                r#"<a href="/?scenario={}" title="{}" style="display: inline-block; margin: 0 0.25rem 0.25rem 0; padding: 0.2em 0.5em; border: 1px solid #dee2e6; border-radius: 0.25rem; font-size: 0.8em; text-decoration: none;">{}</a>"#,
                s.id,
                escape_html(s.description),
                escape_html(s.label)
            )
        })
        .collect();

    let selected_type = value_text(values, field::MACHINE_TYPE);
    let type_options: String = MachineType::ALL
        .iter()
        .map(|t| {
            let selected = if t.as_str() == selected_type {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                t.as_str(),
                selected,
                t.label()
            )
        })
        .collect();

    let error_for = |name: &str| {
        errors
            .and_then(|e| e.get(name))
            .map(|message| {
                format!(
                    r#"<p style="margin: 0.25rem 0; font-size: 0.8em; color: #dc3545;">{}</p>"#,
                    escape_html(message)
                )
            })
            .unwrap_or_default()
    };

    let number_input = |name: &str, label: &str, step: &str| {
        format!(
            r#"<div style="margin-bottom: 0.75rem;">
                <label for="{name}">{label}</label><br>
                <input id="{name}" name="{name}" type="number" step="{step}" value="{value}" style="width: 100%;">
                {error}
            </div>"#,
            name = name,
            label = label,
            step = step,
            value = value_text(values, name),
            error = error_for(name),
        )
    };

    let disabled = if submitting { " disabled" } else { "" };

    format!(
        r#"<section>
        <h2>Sensor Controls</h2>
        <p>Enter real-time telemetry data for analysis.</p>
        <div style="margin-bottom: 1rem;">
            <strong style="font-size: 0.8em;">LOAD TEST DATA</strong><br>
            {scenario_links}
        </div>
        <form method="post" action="/predict">
            <div style="margin-bottom: 0.75rem;">
                <label for="type">Machine Quality Type</label><br>
                <select id="type" name="type" style="width: 100%;">{type_options}</select>
                {type_error}
            </div>
            {air}
            {process}
            {speed}
            {torque}
            {wear}
            <button type="submit"{disabled}>Run Diagnostics</button>
        </form>
    </section>"#,
        scenario_links = scenario_links,
        type_options = type_options,
        type_error = error_for(field::MACHINE_TYPE),
        air = number_input(field::AIR_TEMP, "Air Temp [K]", "0.1"),
        process = number_input(field::PROCESS_TEMP, "Process Temp [K]", "0.1"),
        speed = number_input(field::ROTATIONAL_SPEED, "Rotational Speed [rpm]", "1"),
        torque = number_input(field::TORQUE, "Torque [Nm]", "0.1"),
        wear = number_input(field::TOOL_WEAR, "Tool Wear [min]", "1"),
        disabled = disabled,
    )
}

fn render_diagnostics(result: Option<&PredictionResponse>) -> String {
    let Some(result) = result else {
        return r#"<section>
        <h2>Diagnostics Result</h2>
        <p>Awaiting sensor data inputs. Configure the control panel and click "Run Diagnostics" to analyze machine health.</p>
    </section>"#
            .to_string();
    };

    let status = result.status();
    let (color, bg) = status_colors(status);
    let (badge, headline, detail) = match status {
        HealthStatus::FailureImminent => (
            "Critical",
            "Failure Imminent",
            "Immediate maintenance action required. High probability of component failure.",
        ),
        HealthStatus::Normal => (
            "Healthy",
            "Normal Operation",
            "System is operating within nominal parameters. No immediate action required.",
        ),
    };
    let percentage = (result.failure_probability * 100.0).round();
    let failure_type = result
        .predicted_failure_type
        .as_deref()
        .map(|t| format!("<p>Predicted failure type: {}</p>", escape_html(t)))
        .unwrap_or_default();

    format!(
        r#"<section style="padding: 1rem; border-radius: 0.25rem; background-color: {bg};">
        <h2>Diagnostics Result <span style="display: inline-block; padding: 0.25em 0.6em; border-radius: 0.25rem; font-size: 0.6em; font-weight: 600; color: {color}; border: 1px solid {color};">{badge}</span></h2>
        <h3 style="color: {color};">{headline}</h3>
        <p>{detail}</p>
        {failure_type}
        <p>Safety Margin: <strong>{risk} Risk</strong></p>
        <progress max="100" value="{percentage}" style="width: 100%;"></progress>
        <form method="post" action="/reset"><button type="submit">Reset Analysis</button></form>
    </section>"#,
        bg = bg,
        color = color,
        badge = badge,
        headline = headline,
        detail = detail,
        failure_type = failure_type,
        risk = format_percent(result.failure_probability),
        percentage = percentage,
    )
}

fn render_history(history: &[HistoryEntry]) -> String {
    let rows: String = if history.is_empty() {
        "<p>No recent predictions.</p>".to_string()
    } else {
        history
            .iter()
            .map(|h| {
                let (color, bg) = status_colors(h.status);
                format!(
                    r#"<tr style="border-bottom: 1px solid #dee2e6;">
                    <td style="padding: 0.5rem;">{} - {}</td>
                    <td style="padding: 0.5rem;">{}</td>
                    <td style="padding: 0.5rem;">
                        <span style="display: inline-block; padding: 0.25em 0.6em; border-radius: 0.25rem; font-size: 0.85em; font-weight: 600; color: {}; background-color: {};">{}</span>
                    </td>
                </tr>"#,
                    h.machine_type,
                    h.status,
                    format_clock(h.timestamp_epoch_ms),
                    color,
                    bg,
                    format_percent(h.probability)
                )
            })
            .collect::<String>()
    };

    let body = if history.is_empty() {
        rows
    } else {
        format!(
            r#"<table style="width: 100%; border-collapse: collapse;"><tbody>{}</tbody></table>"#,
            rows
        )
    };

    format!(
        r#"<section>
        <h2>Recent History</h2>
        {}
    </section>"#,
        body
    )
}
