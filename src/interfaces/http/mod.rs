use crate::application::{DatasetQueryUseCase, UploadUseCase};
use crate::domain::credential::Credential;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::AppConfig;
use actix_cors::Cors;
use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::{dev::Server, get, post, web, App, HttpRequest, HttpResponse, HttpServer};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

const UPLOAD_LIMIT_BYTES: usize = 16 * 1024 * 1024;

pub struct HttpState {
    pub upload_use_case: UploadUseCase,
    pub query_use_case: DatasetQueryUseCase,
    pub api_tokens: Vec<String>,
}

impl HttpState {
    /// Resolve the caller's credential and check it against the accepted tokens.
    fn authorize(&self, req: &HttpRequest) -> Result<Credential> {
        let credential = credential_from_request(req).ok_or_else(|| {
            AppError::Unauthorized("Authentication credentials were not provided".to_string())
        })?;

        if self.api_tokens.iter().any(|t| t == credential.token()) {
            Ok(credential)
        } else {
            Err(AppError::Unauthorized("Invalid token".to_string()))
        }
    }
}

#[derive(Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Deserialize)]
pub struct DatasetQuery {
    #[serde(default)]
    pub dataset_id: Option<i64>,
}

pub fn credential_from_request(req: &HttpRequest) -> Option<Credential> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(Credential::from_header_value)
}

pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        e if e.is_rejection() => StatusCode::BAD_REQUEST,
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: &AppError) -> HttpResponse {
    let status = status_for(err);
    if status.is_server_error() {
        error!(error = %err, "Request failed");
    } else if status == StatusCode::UNAUTHORIZED {
        warn!(error = %err, "Rejected credential");
    }
    HttpResponse::build(status).json(json!({ "error": err.to_string() }))
}

/// `POST /api/upload?filename=<name>.csv` with the raw CSV as the request body.
/// Clients that post a multipart `file` field are not accepted; the name travels
/// in the query string instead.
#[post("/upload")]
async fn upload(
    data: web::Data<HttpState>,
    req: HttpRequest,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> HttpResponse {
    if let Err(e) = data.authorize(&req) {
        return error_response(&e);
    }

    let Some(filename) = query.filename.as_deref() else {
        return error_response(&AppError::ValidationError("No file provided".to_string()));
    };

    match data.upload_use_case.execute(filename, &body).await {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => error_response(&e),
    }
}

#[get("/summary")]
async fn summary(
    data: web::Data<HttpState>,
    req: HttpRequest,
    query: web::Query<DatasetQuery>,
) -> HttpResponse {
    if let Err(e) = data.authorize(&req) {
        return error_response(&e);
    }

    match data.query_use_case.summary(query.dataset_id).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => error_response(&e),
    }
}

#[get("/history")]
async fn history(data: web::Data<HttpState>, req: HttpRequest) -> HttpResponse {
    if let Err(e) = data.authorize(&req) {
        return error_response(&e);
    }

    match data.query_use_case.history().await {
        Ok(datasets) => HttpResponse::Ok().json(datasets),
        Err(e) => error_response(&e),
    }
}

#[get("/equipment")]
async fn equipment(
    data: web::Data<HttpState>,
    req: HttpRequest,
    query: web::Query<DatasetQuery>,
) -> HttpResponse {
    if let Err(e) = data.authorize(&req) {
        return error_response(&e);
    }

    match data.query_use_case.equipment(query.dataset_id).await {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(e) => error_response(&e),
    }
}

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = error_response(&AppError::ValidationError(format!(
        "Invalid query parameters: {}",
        err
    )));
    InternalError::from_response(err, response).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error_handler));
    cfg.service(
        web::scope("/api")
            .service(upload)
            .service(summary)
            .service(history)
            .service(equipment)
            .service(health),
    );
}

pub fn start_server(state: web::Data<HttpState>, config: &AppConfig) -> std::io::Result<Server> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(UPLOAD_LIMIT_BYTES))
            .configure(configure)
    })
    .bind(config.bind_addr())?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::equipment_validator::EquipmentValidator;
    use crate::application::use_cases::retention_store::RetentionStore;
    use crate::infrastructure::db::connection::init_memory_db;
    use crate::infrastructure::db::datasets::DatasetRepository;
    use actix_web::http::header::HeaderName;
    use actix_web::test;
    use std::sync::Arc;

    const TOKEN: &str = "test-token";
    const CSV: &str = "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
                       P-1,Pump,100,5,60\n\
                       R-1,Reactor,200,20,250\n";

    async fn state() -> web::Data<HttpState> {
        let pool = init_memory_db().await.unwrap();
        let repo = Arc::new(DatasetRepository::new(pool));
        let retention = Arc::new(RetentionStore::new(repo.clone(), 5));
        web::Data::new(HttpState {
            upload_use_case: UploadUseCase::new(EquipmentValidator::default(), retention),
            query_use_case: DatasetQueryUseCase::new(repo, 5),
            api_tokens: vec![TOKEN.to_string()],
        })
    }

    fn auth() -> (HeaderName, String) {
        (AUTHORIZATION, Credential::new(TOKEN).header_value())
    }

    #[actix_web::test]
    async fn test_health_needs_no_token() {
        let app = test::init_service(App::new().app_data(state().await).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }

    #[actix_web::test]
    async fn test_missing_or_wrong_token_is_unauthorized() {
        let app = test::init_service(App::new().app_data(state().await).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/history").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/history")
            .insert_header((AUTHORIZATION, "Token nope"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_upload_then_summary_and_equipment() {
        let app = test::init_service(App::new().app_data(state().await).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/upload?filename=plant.csv")
            .insert_header(auth())
            .set_payload(CSV)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Upload successful");
        assert_eq!(body["summary"]["total_count"], 2);
        assert_eq!(body["summary"]["avg_flowrate"], 150.0);

        let req = test::TestRequest::get()
            .uri("/api/summary")
            .insert_header(auth())
            .to_request();
        let totals: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(totals["type_distribution"]["Pump"], 1);
        assert_eq!(totals["type_distribution"]["Reactor"], 1);

        let req = test::TestRequest::get()
            .uri("/api/equipment")
            .insert_header(auth())
            .to_request();
        let records: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(records.as_array().map(|a| a.len()), Some(2));
        assert_eq!(records[1]["type"], "Reactor");
    }

    #[actix_web::test]
    async fn test_rejected_upload_is_bad_request_with_message() {
        let app = test::init_service(App::new().app_data(state().await).configure(configure)).await;

        let csv = "Equipment Name,Type,Flowrate,Pressure,Temperature\nP-1,Pump,9.9,5,60\n";
        let req = test::TestRequest::post()
            .uri("/api/upload?filename=low.csv")
            .insert_header(auth())
            .set_payload(csv)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        let message = body["error"].as_str().unwrap_or_default();
        assert!(message.contains("Flowrate"));
        assert!(message.contains("10.5"));
    }

    #[actix_web::test]
    async fn test_upload_without_filename_is_bad_request() {
        let app = test::init_service(App::new().app_data(state().await).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/upload")
            .insert_header(auth())
            .set_payload(CSV)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "No file provided");
    }

    #[actix_web::test]
    async fn test_unknown_dataset_is_not_found() {
        let app = test::init_service(App::new().app_data(state().await).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/summary?dataset_id=99")
            .insert_header(auth())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_malformed_dataset_id_gets_json_error() {
        let app = test::init_service(App::new().app_data(state().await).configure(configure)).await;

        for uri in ["/api/summary?dataset_id=abc", "/api/equipment?dataset_id=1.5"] {
            let req = test::TestRequest::get()
                .uri(uri)
                .insert_header(auth())
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: serde_json::Value = test::read_body_json(resp).await;
            let message = body["error"].as_str().unwrap_or_default();
            assert!(message.starts_with("Invalid query parameters"));
        }
    }

    #[actix_web::test]
    async fn test_empty_store_returns_zero_summary() {
        let app = test::init_service(App::new().app_data(state().await).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/summary")
            .insert_header(auth())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_count"], 0);
        assert_eq!(body["type_distribution"], json!({}));
    }

    #[actix_web::test]
    async fn test_status_mapping() {
        assert_eq!(
            status_for(&AppError::SchemaError {
                missing: vec!["Type".to_string()]
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AppError::PersistenceError("disk".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&AppError::NotFound("Dataset not found".to_string())),
            StatusCode::NOT_FOUND
        );
    }
}
