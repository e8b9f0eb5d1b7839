use crate::crawler::is_crawler;
use crate::errors::AppError;
use crate::export::{export_collection, file_name, ExportFormat};
use crate::messages;
use crate::models::{
    new_id, non_empty, timestamp_now, ClickEvent, DashboardStats, Lead, LeadKind, LeadResponse,
    TrackClickRequest, TrackResponse, TrackVisitorRequest, VisitorRecord,
};
use crate::state::AppState;
use crate::stats::{build_stats, Snapshot};
use crate::storage::Collection;
use crate::user_agent::BrowserInfo;
use axum::{
    extract::{ConnectInfo, Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use std::net::SocketAddr;
use tracing::info;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn track_visitor(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Option<Json<Map<String, Value>>>,
) -> Result<Json<TrackResponse>, AppError> {
    let ua = user_agent(&headers);
    if is_crawler(ua) {
        return Ok(Json(TrackResponse::filtered()));
    }
    let ua = ua.unwrap_or_default();
    let payload = TrackVisitorRequest::from(&json_body(body));

    let ip = client_ip(&headers, connect);
    let location = state.geo.resolve(&ip).await;
    let browser = BrowserInfo::from_user_agent(ua);

    let visitor = VisitorRecord {
        id: new_id(),
        timestamp: timestamp_now(),
        ip,
        user_agent: ua.to_string(),
        browser: browser.browser,
        browser_version: browser.browser_version,
        os: browser.os,
        platform: browser.platform,
        is_mobile: browser.is_mobile,
        is_desktop: browser.is_desktop,
        is_tablet: browser.is_tablet,
        page: non_empty(payload.page).unwrap_or_else(|| "Unknown".to_string()),
        referrer: non_empty(payload.referrer).unwrap_or_else(|| "Direct".to_string()),
        utm_source: non_empty(payload.utm_source),
        utm_medium: non_empty(payload.utm_medium),
        utm_campaign: non_empty(payload.utm_campaign),
        location,
    };
    let visitor = state.store.append(Collection::Visitors, visitor).await?;
    info!(visitor_id = %visitor.id, page = %visitor.page, "visitor tracked");

    state.notifier.notify_all(&messages::visitor(&visitor)).await;

    Ok(Json(TrackResponse {
        visitor_id: Some(visitor.id),
        ..TrackResponse::ok()
    }))
}

pub async fn track_click(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<Map<String, Value>>>,
) -> Result<Json<TrackResponse>, AppError> {
    if is_crawler(user_agent(&headers)) {
        return Ok(Json(TrackResponse::filtered()));
    }
    let payload = TrackClickRequest::from(&json_body(body));

    let event = ClickEvent {
        id: new_id(),
        kind: "click".to_string(),
        timestamp: timestamp_now(),
        button: payload.button,
        page: payload.page,
        visitor_id: payload.visitor_id,
    };
    let event = state.store.append(Collection::Events, event).await?;

    state.notifier.notify_all(&messages::click(&event)).await;

    Ok(Json(TrackResponse::ok()))
}

pub async fn submit_loan(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Option<Json<Map<String, Value>>>,
) -> Result<Json<LeadResponse>, AppError> {
    submit_lead(&state, LeadKind::Loan, client_ip(&headers, connect), json_body(body)).await
}

pub async fn submit_debt(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Option<Json<Map<String, Value>>>,
) -> Result<Json<LeadResponse>, AppError> {
    submit_lead(&state, LeadKind::Debt, client_ip(&headers, connect), json_body(body)).await
}

pub async fn submit_contact(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Option<Json<Map<String, Value>>>,
) -> Result<Json<LeadResponse>, AppError> {
    submit_lead(&state, LeadKind::Contact, client_ip(&headers, connect), json_body(body)).await
}

async fn submit_lead(
    state: &AppState,
    kind: LeadKind,
    ip: String,
    fields: Map<String, Value>,
) -> Result<Json<LeadResponse>, AppError> {
    let collection = kind.collection();
    let lead = state
        .store
        .append(collection, Lead::new(kind, fields, ip))
        .await?;
    info!(lead_id = %lead.id, kind = %lead.kind, "lead submitted");

    let message = match kind {
        LeadKind::Loan => messages::loan_lead(&lead, state.store.count(collection).await),
        LeadKind::Debt => messages::debt_lead(&lead, state.store.count(collection).await),
        LeadKind::Contact => messages::contact_lead(&lead),
    };
    state.notifier.notify_all(&message).await;

    Ok(Json(LeadResponse {
        success: true,
        lead_id: lead.id,
    }))
}

pub async fn dashboard_stats(State(state): State<AppState>) -> Json<DashboardStats> {
    let snapshot = Snapshot::load(&state.store).await;
    Json(build_stats(&snapshot))
}

pub async fn dashboard_visitors(State(state): State<AppState>) -> Json<Vec<Value>> {
    newest_first(&state, Collection::Visitors).await
}

pub async fn dashboard_loan_leads(State(state): State<AppState>) -> Json<Vec<Value>> {
    newest_first(&state, Collection::LoanLeads).await
}

pub async fn dashboard_debt_leads(State(state): State<AppState>) -> Json<Vec<Value>> {
    newest_first(&state, Collection::DebtLeads).await
}

pub async fn dashboard_contact_leads(State(state): State<AppState>) -> Json<Vec<Value>> {
    newest_first(&state, Collection::ContactLeads).await
}

pub async fn dashboard_events(State(state): State<AppState>) -> Json<Vec<Value>> {
    newest_first(&state, Collection::Events).await
}

async fn newest_first(state: &AppState, collection: Collection) -> Json<Vec<Value>> {
    let mut records: Vec<Value> = state.store.read_all(collection).await;
    records.reverse();
    Json(records)
}

pub async fn export_csv(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Response, AppError> {
    export(&state, &kind, ExportFormat::Csv).await
}

pub async fn export_txt(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Response, AppError> {
    export(&state, &kind, ExportFormat::Txt).await
}

async fn export(
    state: &AppState,
    kind: &str,
    format: ExportFormat,
) -> Result<Response, AppError> {
    let collection =
        export_collection(kind).ok_or_else(|| AppError::bad_request("Invalid export type"))?;
    let records: Vec<Value> = state.store.read_all(collection).await;
    if records.is_empty() {
        return Err(AppError::not_found("No data to export"));
    }

    let headers = [
        (header::CONTENT_TYPE, format.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", file_name(collection, format)),
        ),
    ];
    Ok((headers, format.render(&records)).into_response())
}

/// A missing, non-JSON or non-object body reads as `{}`.
fn json_body(body: Option<Json<Map<String, Value>>>) -> Map<String, Value> {
    body.map(|Json(fields)| fields).unwrap_or_default()
}

fn user_agent(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
}

/// First hop of `X-Forwarded-For`, else the peer address.
fn client_ip(headers: &HeaderMap, connect: Option<ConnectInfo<SocketAddr>>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| connect.map(|ConnectInfo(addr)| addr.ip().to_string()))
        .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        let peer = ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000)));
        assert_eq!(client_ip(&headers, Some(peer)), "203.0.113.9");
    }

    #[test]
    fn peer_address_then_unknown() {
        let headers = HeaderMap::new();
        let peer = ConnectInfo(SocketAddr::from(([192, 0, 2, 4], 4000)));
        assert_eq!(client_ip(&headers, Some(peer)), "192.0.2.4");
        assert_eq!(client_ip(&headers, None), "Unknown");
    }
}
