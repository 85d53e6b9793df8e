use axum::routing::{get, post, put};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{export_handlers, ops_handlers, record_handlers, staff_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/event-staff/", post(staff_handlers::register_staff))
        .route("/login", post(staff_handlers::login))
        .route("/token", post(staff_handlers::issue_token))
        .route(
            "/event-staff/me/",
            get(staff_handlers::get_profile).delete(staff_handlers::delete_account),
        )
        .route(
            "/event-staff/me/records/",
            get(staff_handlers::list_my_records),
        )
        .route(
            "/event-staff/me/password/",
            put(staff_handlers::change_password),
        )
        .route(
            "/records/",
            get(record_handlers::list_records).post(record_handlers::create_record),
        )
        .route(
            "/records/:event_name/",
            get(record_handlers::list_event_records).post(record_handlers::list_event_records),
        )
        .route("/record/id/:id/", get(record_handlers::get_record_by_id))
        .route(
            "/record/:code/",
            get(record_handlers::get_record)
                .put(record_handlers::update_record)
                .delete(record_handlers::delete_record),
        )
        .route(
            "/record/:code/update_status/",
            put(record_handlers::update_status),
        )
        .route("/update_codes/", put(record_handlers::update_codes))
        .route("/create_csv/", get(export_handlers::create_csv))
        .route("/download_csv/", get(export_handlers::download_csv))
        .route("/upload_csv/", post(export_handlers::upload_csv))
        .route("/ops/health/live", get(ops_handlers::health_live))
        .route("/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
