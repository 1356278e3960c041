use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::{RosterError, RosterResult};
use crate::model::{Assignment, Availability, YearMonth};
use crate::notify::{plan_notifications, plan_summary, Notification};
use crate::store::RosterStore;

pub const ADMIN_HEADER: &str = "X-Admin-Password";

pub struct AppState {
    pub store: Mutex<RosterStore>,
    /// Lives only as long as the process; never written to disk and never pruned
    pub notifications: Mutex<Vec<Notification>>,
    pub admin_password: String,
}

impl AppState {
    pub fn new(store: RosterStore, admin_password: String) -> Self {
        Self {
            store: Mutex::new(store),
            notifications: Mutex::new(Vec::new()),
            admin_password,
        }
    }

    fn store(&self) -> RosterResult<MutexGuard<'_, RosterStore>> {
        self.store.lock().map_err(|_| RosterError::StorePoisoned)
    }

    fn notifications(&self) -> RosterResult<MutexGuard<'_, Vec<Notification>>> {
        self.notifications.lock().map_err(|_| RosterError::StorePoisoned)
    }

    fn require_coordinator(&self, req: &HttpRequest) -> RosterResult<()> {
        let password = req
            .headers()
            .get(ADMIN_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if password == self.admin_password {
            Ok(())
        } else {
            Err(RosterError::Unauthorized)
        }
    }
}

#[derive(Deserialize)]
pub struct MonthQuery {
    month: Option<YearMonth>,
}

#[derive(Deserialize)]
pub struct PlanRequest {
    month: YearMonth,
}

#[derive(Serialize, Deserialize)]
pub struct PlanResponse {
    pub generated: usize,
    pub message: String,
    pub assignments: Vec<Assignment>,
}

#[derive(Deserialize)]
pub struct AssignRequest {
    volunteer_id: String,
    shift_id: String,
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

async fn list_volunteers(state: web::Data<AppState>) -> RosterResult<HttpResponse> {
    let store = state.store()?;
    Ok(HttpResponse::Ok().json(store.volunteers()))
}

async fn list_shifts(
    query: web::Query<MonthQuery>,
    state: web::Data<AppState>,
) -> RosterResult<HttpResponse> {
    let store = state.store()?;
    match query.month {
        Some(month) => Ok(HttpResponse::Ok().json(store.shifts_in(month))),
        None => Ok(HttpResponse::Ok().json(store.shifts())),
    }
}

async fn list_assignments(
    query: web::Query<MonthQuery>,
    state: web::Data<AppState>,
) -> RosterResult<HttpResponse> {
    let store = state.store()?;
    match query.month {
        Some(month) => Ok(HttpResponse::Ok().json(store.assignments_in(month))),
        None => Ok(HttpResponse::Ok().json(store.assignments())),
    }
}

// "Run Auto-Plan"
async fn run_plan(
    req: HttpRequest,
    body: web::Json<PlanRequest>,
    state: web::Data<AppState>,
) -> RosterResult<HttpResponse> {
    state.require_coordinator(&req)?;
    let month = body.month;

    // Held across plan and persist so the next run sees this one's assignments
    let mut store = state.store()?;
    let planned = store.plan_month(month)?;
    let notices = plan_notifications(month, &planned, store.shifts(), store.volunteers());
    drop(store);

    state.notifications()?.extend(notices);

    Ok(HttpResponse::Ok().json(PlanResponse {
        generated: planned.len(),
        message: plan_summary(month, planned.len()),
        assignments: planned,
    }))
}

async fn create_assignment(
    req: HttpRequest,
    body: web::Json<AssignRequest>,
    state: web::Data<AppState>,
) -> RosterResult<HttpResponse> {
    state.require_coordinator(&req)?;
    let assignment = state.store()?.assign(&body.volunteer_id, &body.shift_id)?;
    Ok(HttpResponse::Created().json(assignment))
}

async fn submit_availability(
    body: web::Json<Availability>,
    state: web::Data<AppState>,
) -> RosterResult<HttpResponse> {
    let availability = body.into_inner();
    tracing::debug!(
        volunteer = %availability.volunteer_id,
        month = %availability.month,
        week = availability.week,
        "availability submitted"
    );
    state.store()?.submit_availability(availability)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

async fn list_availability(
    volunteer_id: web::Path<String>,
    state: web::Data<AppState>,
) -> RosterResult<HttpResponse> {
    let store = state.store()?;
    let records: Vec<&Availability> = store
        .availabilities()
        .iter()
        .filter(|a| a.volunteer_id == *volunteer_id)
        .collect();
    Ok(HttpResponse::Ok().json(records))
}

async fn list_notifications(
    recipient_id: web::Path<String>,
    state: web::Data<AppState>,
) -> RosterResult<HttpResponse> {
    let notifications = state.notifications()?;
    let mine: Vec<&Notification> = notifications
        .iter()
        .filter(|n| n.recipient_id == *recipient_id)
        .collect();
    Ok(HttpResponse::Ok().json(mine))
}

// Open to anyone holding the notification id, like the listing above
async fn mark_notification_read(
    id: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> RosterResult<HttpResponse> {
    let mut notifications = state.notifications()?;
    let notification = notifications
        .iter_mut()
        .find(|n| n.id == *id)
        .ok_or_else(|| RosterError::NotFound(format!("notification {}", id)))?;
    notification.read = true;
    Ok(HttpResponse::Ok().json(&*notification))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/health", web::get().to(health))
        .route("/api/volunteers", web::get().to(list_volunteers))
        .route("/api/shifts", web::get().to(list_shifts))
        .route("/api/assignments", web::get().to(list_assignments))
        .route("/api/assignments", web::post().to(create_assignment))
        .route("/api/plan", web::post().to(run_plan))
        .route("/api/availability", web::put().to(submit_availability))
        .route("/api/availability/{volunteer_id}", web::get().to(list_availability))
        .route("/api/notifications/{recipient_id}", web::get().to(list_notifications))
        .route("/api/notifications/{id}/read", web::post().to(mark_notification_read));
}

pub async fn start_server(host: String, port: u16, app_state: AppState) -> std::io::Result<()> {
    let app_state = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind((host, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Role, Shift, Volunteer};
    use actix_web::{http::StatusCode, test};
    use chrono::{NaiveDate, NaiveTime};

    fn state() -> web::Data<AppState> {
        let volunteers = vec![
            Volunteer {
                id: "c1".to_string(),
                name: "Cole".to_string(),
                role: Role::Coordinator,
            },
            Volunteer {
                id: "v1".to_string(),
                name: "Ana".to_string(),
                role: Role::Volunteer,
            },
        ];
        let shifts = vec![Shift {
            id: "s1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            location_id: "pantry".to_string(),
            max_people: 1,
        }];
        let store = RosterStore::in_memory(volunteers, shifts, Vec::new(), Vec::new());
        web::Data::new(AppState::new(store, "pw".to_string()))
    }

    #[actix_web::test]
    async fn plan_requires_password() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/plan")
            .set_json(serde_json::json!({"month": "2024-03"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn plan_then_replan_and_notify() {
        let data = state();
        let app = test::init_service(App::new().app_data(data.clone()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/plan")
            .insert_header((ADMIN_HEADER, "pw"))
            .set_json(serde_json::json!({"month": "2024-03"}))
            .to_request();
        let body: PlanResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.generated, 1);
        assert_eq!(body.message, "1 assignment generated for 2024-03");
        assert_eq!(body.assignments[0].volunteer_id, "v1");

        let req = test::TestRequest::post()
            .uri("/api/plan")
            .insert_header((ADMIN_HEADER, "pw"))
            .set_json(serde_json::json!({"month": "2024-03"}))
            .to_request();
        let body: PlanResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.generated, 0);
        assert_eq!(body.message, "No assignments generated for 2024-03");

        let req = test::TestRequest::get().uri("/api/notifications/v1").to_request();
        let notes: Vec<Notification> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(notes.len(), 1);

        let req = test::TestRequest::post()
            .uri(&format!("/api/notifications/{}/read", notes[0].id))
            .to_request();
        let read: Notification = test::call_and_read_body_json(&app, req).await;
        assert!(read.read);

        let req = test::TestRequest::get().uri("/api/notifications/c1").to_request();
        let notes: Vec<Notification> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(notes.len(), 2);
    }

    #[actix_web::test]
    async fn manual_assignment_conflicts_when_full() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/assignments")
            .insert_header((ADMIN_HEADER, "pw"))
            .set_json(serde_json::json!({"volunteer_id": "v1", "shift_id": "s1"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/assignments")
            .insert_header((ADMIN_HEADER, "pw"))
            .set_json(serde_json::json!({"volunteer_id": "c1", "shift_id": "s1"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn availability_is_accepted_and_listed_per_volunteer() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

        let req = test::TestRequest::put()
            .uri("/api/availability")
            .set_json(serde_json::json!({
                "volunteer_id": "v1",
                "month": "2024-03",
                "week": 1,
                "slot": "afternoon",
                "saturday_available": false
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/availability/v1").to_request();
        let records: Vec<Availability> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].month, YearMonth { year: 2024, month: 3 });

        let req = test::TestRequest::get().uri("/api/shifts?month=2024-04").to_request();
        let shifts: Vec<Shift> = test::call_and_read_body_json(&app, req).await;
        assert!(shifts.is_empty());

        let req = test::TestRequest::get().uri("/api/shifts?month=2024-03").to_request();
        let shifts: Vec<Shift> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(shifts.len(), 1);
    }

    #[actix_web::test]
    async fn unknown_notification_is_not_found() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri(&format!("/api/notifications/{}/read", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn notifications_do_not_survive_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(crate::store::VOLUNTEERS_FILE),
            "id,name,role\nc1,Cole,coordinator\nv1,Ana,volunteer\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join(crate::store::SHIFTS_FILE),
            "id,date,start_time,end_time,location_id,max_people\ns1,2024-03-05,09:00,12:00,pantry,1\n",
        )
        .unwrap();

        let first = web::Data::new(AppState::new(
            RosterStore::load(dir.path()).unwrap(),
            "pw".to_string(),
        ));
        let app = test::init_service(App::new().app_data(first).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/plan")
            .insert_header((ADMIN_HEADER, "pw"))
            .set_json(serde_json::json!({"month": "2024-03"}))
            .to_request();
        let body: PlanResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.generated, 1);

        let restarted = web::Data::new(AppState::new(
            RosterStore::load(dir.path()).unwrap(),
            "pw".to_string(),
        ));
        let app = test::init_service(App::new().app_data(restarted).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/assignments?month=2024-03").to_request();
        let assignments: Vec<Assignment> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(assignments.len(), 1);

        let req = test::TestRequest::get().uri("/api/notifications/v1").to_request();
        let notes: Vec<Notification> = test::call_and_read_body_json(&app, req).await;
        assert!(notes.is_empty());
    }
}
