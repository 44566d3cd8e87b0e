use worker::*;

mod config;
mod db;
mod error;
mod models;
mod report;
mod service;
mod storage;
mod store;

use config::{Config, DB_BINDING, UPLOADS_BINDING};
use db::D1ReportStore;
use error::ReportError;
use models::{DisputeRaised, ErrorBody, HealthResponse, NewDispute, NewReport, ResolveReport};

const CREATE_FAILED: &str = "Failed to create report";
const LIST_FAILED: &str = "Failed to get reports";
const RESOLVE_FAILED: &str = "Failed to resolve report";
const DISPUTE_FAILED: &str = "Failed to raise dispute";
const UPLOAD_FAILED: &str = "Failed to get image";
const INTERNAL_FAILED: &str = "Internal server error";

#[event(fetch)]
pub async fn fetch(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    console_error_panic_hook::set_once();

    let config = Config::from_env(&env);
    let cors = cors_policy(&config);

    if req.method() == Method::Options {
        return Response::empty()?.with_status(204).with_cors(&cors);
    }

    let router = Router::with_data(config);

    let routed = router
        // health
        .get("/", |_, _| Response::ok("Backend is running!"))
        .get("/health", |_, _| {
            Response::from_json(&HealthResponse {
                service: "garbage-reports",
                status: "ok",
            })
        })
        // reports
        .post_async("/api/reports", create_report)
        .get_async("/api/reports", list_reports)
        .put_async("/api/reports/:id/resolve", resolve_report)
        .post_async("/api/reports/:id/dispute", raise_dispute)
        // uploaded images
        .get_async("/uploads/:name", serve_upload)
        .run(req, env)
        .await;

    // Errors escaping a handler still get a JSON body and CORS headers.
    let resp = match routed {
        Ok(resp) => resp,
        Err(err) => error_response(&ReportError::from(err), INTERNAL_FAILED)?,
    };
    resp.with_cors(&cors)
}

fn cors_policy(config: &Config) -> Cors {
    Cors::new()
        .with_origins(vec![config.cors_origin.clone()])
        .with_methods(vec![Method::Get, Method::Post, Method::Put, Method::Options])
        .with_allowed_headers(vec!["Content-Type"])
        .with_max_age(86_400)
}

// ── Handlers ────────────────────────────────────────────────────

async fn create_report(mut req: Request, ctx: RouteContext<Config>) -> Result<Response> {
    let form = match req.form_data().await {
        Ok(form) => form,
        Err(err) => return error_response(&ReportError::InvalidBody(err.to_string()), CREATE_FAILED),
    };
    let input = NewReport {
        location: text_field(&form, "location").unwrap_or_default(),
        description: text_field(&form, "description"),
        reporter_name: text_field(&form, "reporterName").unwrap_or_default(),
        reporter_contact: text_field(&form, "reporterContact").unwrap_or_default(),
    };
    // Reject before anything reaches R2 or D1.
    if let Err(err) = input.validate() {
        if let ReportError::Validation { field } = &err {
            console_log!("rejected report: missing {}", field.name());
        }
        return error_response(&err, CREATE_FAILED);
    }

    match try_create(&ctx, &form, input).await {
        Ok(report) => {
            console_log!("report {} filed for {:?}", report.id, report.location);
            Ok(Response::from_json(&report)?.with_status(201))
        }
        Err(err) => error_response(&err, CREATE_FAILED),
    }
}

async fn try_create(
    ctx: &RouteContext<Config>,
    form: &FormData,
    input: NewReport,
) -> std::result::Result<models::Report, ReportError> {
    let store = report_store(ctx)?;
    let image = upload_image(ctx, form).await?;
    let id = generate_id()?;
    service::create_report(&store, id, input, image, &now_iso()).await
}

async fn list_reports(_req: Request, ctx: RouteContext<Config>) -> Result<Response> {
    let listed = match report_store(&ctx) {
        Ok(store) => service::list_reports(&store).await,
        Err(err) => Err(err),
    };
    match listed {
        Ok(reports) => Response::from_json(&reports),
        Err(err) => error_response(&err, LIST_FAILED),
    }
}

async fn resolve_report(mut req: Request, ctx: RouteContext<Config>) -> Result<Response> {
    let Some(id) = ctx.param("id").cloned() else {
        return error_response(&ReportError::NotFound { id: String::new() }, RESOLVE_FAILED);
    };
    let raw = match req.text().await {
        Ok(raw) => raw,
        Err(err) => {
            return error_response(&ReportError::InvalidBody(err.to_string()), RESOLVE_FAILED)
        }
    };
    let body = match parse_resolve_body(&raw) {
        Ok(body) => body,
        Err(err) => return error_response(&err, RESOLVE_FAILED),
    };

    let resolved = match report_store(&ctx) {
        Ok(store) => {
            service::resolve_report(&store, &id, body.resolved_by.as_deref(), &now_iso()).await
        }
        Err(err) => Err(err),
    };
    match resolved {
        Ok(report) => {
            if let Some(resolution) = report.resolution() {
                console_log!("report {} resolved by {}", report.id, resolution.resolved_by);
            }
            Response::from_json(&report)
        }
        Err(err) => error_response(&err, RESOLVE_FAILED),
    }
}

async fn raise_dispute(mut req: Request, ctx: RouteContext<Config>) -> Result<Response> {
    let Some(id) = ctx.param("id").cloned() else {
        return error_response(&ReportError::NotFound { id: String::new() }, DISPUTE_FAILED);
    };
    let form = match req.form_data().await {
        Ok(form) => form,
        Err(err) => {
            return error_response(&ReportError::InvalidBody(err.to_string()), DISPUTE_FAILED)
        }
    };
    let input = NewDispute {
        raised_by: text_field(&form, "raisedBy"),
        reason: text_field(&form, "reason"),
    };

    match try_dispute(&ctx, &id, &form, input).await {
        Ok(dispute) => {
            console_log!("report {} disputed by {}", id, dispute.raised_by);
            Ok(Response::from_json(&DisputeRaised {
                message: "Dispute raised".into(),
                dispute,
            })?
            .with_status(201))
        }
        Err(err) => error_response(&err, DISPUTE_FAILED),
    }
}

async fn try_dispute(
    ctx: &RouteContext<Config>,
    id: &str,
    form: &FormData,
    input: NewDispute,
) -> std::result::Result<models::Dispute, ReportError> {
    let store = report_store(ctx)?;
    let image = upload_image(ctx, form).await?;
    let (_, dispute) = service::raise_dispute(&store, id, input, image, &now_iso()).await?;
    Ok(dispute)
}

async fn serve_upload(_req: Request, ctx: RouteContext<Config>) -> Result<Response> {
    let Some(key) = ctx.param("name").and_then(|name| storage::object_key(name)) else {
        return not_found();
    };
    match try_fetch_upload(&ctx, &key).await {
        Ok(Some((bytes, content_type))) => {
            let mut resp = Response::from_bytes(bytes)?;
            if let Some(content_type) = content_type {
                resp.headers_mut().set("content-type", &content_type)?;
            }
            Ok(resp)
        }
        Ok(None) => not_found(),
        Err(err) => error_response(&err, UPLOAD_FAILED),
    }
}

async fn try_fetch_upload(
    ctx: &RouteContext<Config>,
    key: &str,
) -> std::result::Result<Option<(Vec<u8>, Option<String>)>, ReportError> {
    let bucket = ctx.env.bucket(UPLOADS_BINDING)?;
    Ok(storage::get_blob(&bucket, key).await?)
}

// ── Helpers ─────────────────────────────────────────────────────

fn report_store(ctx: &RouteContext<Config>) -> std::result::Result<D1ReportStore, ReportError> {
    Ok(D1ReportStore::new(ctx.env.d1(DB_BINDING)?))
}

async fn upload_image(
    ctx: &RouteContext<Config>,
    form: &FormData,
) -> std::result::Result<Option<String>, ReportError> {
    let Some(file) = file_field(form, "image") else {
        return Ok(None);
    };
    let bucket = ctx.env.bucket(UPLOADS_BINDING)?;
    let path = storage::store_upload(&bucket, &file, ctx.data.max_upload_bytes, now_ms()).await?;
    console_log!("stored upload {path} ({} bytes)", file.size());
    Ok(Some(path))
}

fn text_field(form: &FormData, name: &str) -> Option<String> {
    match form.get(name) {
        Some(FormEntry::Field(value)) => Some(value),
        _ => None,
    }
}

/// A file input left empty still arrives as a zero-byte part.
fn file_field(form: &FormData, name: &str) -> Option<File> {
    match form.get(name) {
        Some(FormEntry::File(file)) if storage::has_content(file.size()) => Some(file),
        _ => None,
    }
}

/// An empty body means "no resolver named".
fn parse_resolve_body(raw: &str) -> std::result::Result<ResolveReport, ReportError> {
    if raw.trim().is_empty() {
        return Ok(ResolveReport::default());
    }
    serde_json::from_str(raw).map_err(|e| ReportError::InvalidBody(e.to_string()))
}

fn error_response(err: &ReportError, failure: &str) -> Result<Response> {
    if let ReportError::Storage(detail) = err {
        console_error!("{failure}: {detail}");
    }
    let (status, body) = error_body(err, failure);
    Ok(Response::from_json(&body)?.with_status(status))
}

fn error_body(err: &ReportError, failure: &str) -> (u16, ErrorBody) {
    let body = ErrorBody {
        message: err.public_message(failure),
    };
    (err.status_code(), body)
}

fn not_found() -> Result<Response> {
    Ok(Response::from_json(&ErrorBody {
        message: "Not found".into(),
    })?
    .with_status(404))
}

fn generate_id() -> std::result::Result<String, ReportError> {
    let mut buf = [0u8; 16];
    getrandom::getrandom(&mut buf)
        .map_err(|err| ReportError::Storage(format!("failed to generate id: {err}")))?;
    Ok(hex::encode(buf))
}

fn now_iso() -> String {
    js_sys::Date::new_0().to_iso_string().into()
}

fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}
