//! Create, list, get, update and delete for the owned-record resources
//!
//! All six resources share the same contract, so the handlers are generated
//! per resource by `record_handlers!` and differ only in types and paths.

macro_rules! record_handlers {
    (
        $module:ident,
        model = $model:ident,
        new = $new:ident,
        patch = $patch:ident,
        collection = $collection:literal,
        item = $item:literal,
        tag = $tag:literal,
        one = $one:ident,
        many = $many:ident $(,)?
    ) => {
        pub mod $module {
            use axum::{extract::State, routing, Json, Router};
            use tracing::{debug, instrument};

            use lifeline_data::models::{$model, $new, $patch};
            use lifeline_domain::services::RecordService;

            use crate::api::error::ApiError;
            use crate::api::extract::{ApiJson, CurrentUser, RecordId};
            use crate::api::state::AppState;
            use crate::entities::{DataResponse, DeletedResponse, ErrorResponse, $many, $one};

            /// Collection and item routes for this resource
            pub fn routes() -> Router<AppState> {
                Router::new()
                    .route($collection, routing::get(list).post(create))
                    .route(
                        concat!($collection, "/:id"),
                        routing::get(get).patch(update).delete(delete),
                    )
            }

            #[utoipa::path(
                post,
                path = $collection,
                request_body = $new,
                responses(
                    (status = 200, description = "Row created", body = $one),
                    (status = 400, description = "Malformed body", body = ErrorResponse),
                    (status = 401, description = "Not authenticated", body = ErrorResponse),
                    (status = 500, description = "Internal server error", body = ErrorResponse)
                ),
                security(("bearer" = [])),
                tag = $tag
            )]
            #[instrument(skip_all)]
            pub async fn create(
                State(service): State<RecordService<$model>>,
                CurrentUser(user): CurrentUser,
                ApiJson(new): ApiJson<$new>,
            ) -> Result<Json<$one>, ApiError> {
                let row = service.create(user.id, new).await?;
                Ok(Json(DataResponse::success(row)))
            }

            #[utoipa::path(
                get,
                path = $collection,
                responses(
                    (status = 200, description = "Rows owned by the caller", body = $many),
                    (status = 401, description = "Not authenticated", body = ErrorResponse)
                ),
                security(("bearer" = [])),
                tag = $tag
            )]
            #[instrument(skip_all)]
            pub async fn list(
                State(service): State<RecordService<$model>>,
                CurrentUser(user): CurrentUser,
            ) -> Result<Json<$many>, ApiError> {
                let rows = service.list(user.id).await?;
                debug!("Returning {} rows to user {}", rows.len(), user.id);
                Ok(Json(DataResponse::success(rows)))
            }

            #[utoipa::path(
                get,
                path = $item,
                params(("id" = i64, Path, description = "Row id")),
                responses(
                    (status = 200, description = "Row found", body = $one),
                    (status = 400, description = "Id is not an integer", body = ErrorResponse),
                    (status = 401, description = "Not authenticated", body = ErrorResponse),
                    (status = 404, description = "No such row owned by the caller", body = ErrorResponse)
                ),
                security(("bearer" = [])),
                tag = $tag
            )]
            #[instrument(skip_all)]
            pub async fn get(
                State(service): State<RecordService<$model>>,
                CurrentUser(user): CurrentUser,
                RecordId(id): RecordId,
            ) -> Result<Json<$one>, ApiError> {
                let row = service.get(user.id, id).await?;
                Ok(Json(DataResponse::success(row)))
            }

            #[utoipa::path(
                patch,
                path = $item,
                params(("id" = i64, Path, description = "Row id")),
                request_body = $patch,
                responses(
                    (status = 200, description = "Updated row", body = $one),
                    (status = 400, description = "Empty or malformed patch", body = ErrorResponse),
                    (status = 401, description = "Not authenticated", body = ErrorResponse),
                    (status = 404, description = "No such row owned by the caller", body = ErrorResponse)
                ),
                security(("bearer" = [])),
                tag = $tag
            )]
            #[instrument(skip_all)]
            pub async fn update(
                State(service): State<RecordService<$model>>,
                CurrentUser(user): CurrentUser,
                RecordId(id): RecordId,
                ApiJson(patch): ApiJson<$patch>,
            ) -> Result<Json<$one>, ApiError> {
                let row = service.update(user.id, id, patch).await?;
                Ok(Json(DataResponse::success(row)))
            }

            #[utoipa::path(
                delete,
                path = $item,
                params(("id" = i64, Path, description = "Row id")),
                responses(
                    (status = 200, description = "Deleted, or nothing to delete", body = DeletedResponse),
                    (status = 400, description = "Id is not an integer", body = ErrorResponse),
                    (status = 401, description = "Not authenticated", body = ErrorResponse)
                ),
                security(("bearer" = [])),
                tag = $tag
            )]
            #[instrument(skip_all)]
            pub async fn delete(
                State(service): State<RecordService<$model>>,
                CurrentUser(user): CurrentUser,
                RecordId(id): RecordId,
            ) -> Result<Json<DeletedResponse>, ApiError> {
                service.delete(user.id, id).await?;
                Ok(Json(DeletedResponse::success()))
            }
        }
    };
}

record_handlers!(
    health_records,
    model = HealthRecord,
    new = NewHealthRecord,
    patch = HealthRecordPatch,
    collection = "/api/health-records",
    item = "/api/health-records/{id}",
    tag = "health-records",
    one = HealthRecordResponse,
    many = HealthRecordListResponse,
);

record_handlers!(
    medicines,
    model = Medicine,
    new = NewMedicine,
    patch = MedicinePatch,
    collection = "/api/medicines",
    item = "/api/medicines/{id}",
    tag = "medicines",
    one = MedicineResponse,
    many = MedicineListResponse,
);

record_handlers!(
    appointments,
    model = Appointment,
    new = NewAppointment,
    patch = AppointmentPatch,
    collection = "/api/appointments",
    item = "/api/appointments/{id}",
    tag = "appointments",
    one = AppointmentResponse,
    many = AppointmentListResponse,
);

record_handlers!(
    reports,
    model = Report,
    new = NewReport,
    patch = ReportPatch,
    collection = "/api/reports",
    item = "/api/reports/{id}",
    tag = "reports",
    one = ReportResponse,
    many = ReportListResponse,
);

record_handlers!(
    blood_requests,
    model = BloodRequest,
    new = NewBloodRequest,
    patch = BloodRequestPatch,
    collection = "/api/blood-requests",
    item = "/api/blood-requests/{id}",
    tag = "blood-requests",
    one = BloodRequestResponse,
    many = BloodRequestListResponse,
);

record_handlers!(
    emergencies,
    model = Emergency,
    new = NewEmergency,
    patch = EmergencyPatch,
    collection = "/api/emergencies",
    item = "/api/emergencies/{id}",
    tag = "emergencies",
    one = EmergencyResponse,
    many = EmergencyListResponse,
);
