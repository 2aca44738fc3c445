use aero_api::middleware::auth::issue_token;
use aero_api::{app, AppState, AuthConfig, Repositories};
use aero_core::account::Role;
use aero_core::catalog::{Airline, AirlineRef, AirportRef, Schedule, ScheduleDetail};
use aero_core::repository::{
    AirlineRepository, AirportRepository, MockAirlineRepository, MockAirportRepository, MockOrderRepository,
    MockScheduleRepository, MockUserRepository, MockWhitelistRepository, ScheduleRepository,
};
use aero_core::whitelist::WhitelistedUser;
use aero_core::{DaysOfWeek, Sources};
use aero_search::SearchSettings;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

fn auth() -> AuthConfig {
    AuthConfig {
        secret: "integration-secret".into(),
        expiration: 3600,
    }
}

fn token(email: &str, role: Role) -> String {
    issue_token(&auth(), &format!("id-{}", email), email, role).unwrap().0
}

/// Repositories that fail the test if touched, to be overridden per test.
struct Mocks {
    staging_airlines: MockAirlineRepository,
    production_airlines: MockAirlineRepository,
    staging_schedules: MockScheduleRepository,
    production_schedules: MockScheduleRepository,
    whitelist: MockWhitelistRepository,
    orders: MockOrderRepository,
}

impl Default for Mocks {
    fn default() -> Self {
        Self {
            staging_airlines: MockAirlineRepository::new(),
            production_airlines: MockAirlineRepository::new(),
            staging_schedules: MockScheduleRepository::new(),
            production_schedules: MockScheduleRepository::new(),
            whitelist: MockWhitelistRepository::new(),
            orders: MockOrderRepository::new(),
        }
    }
}

fn router(mocks: Mocks) -> Router {
    let repos = Repositories {
        airlines: Sources::<dyn AirlineRepository>::new(
            Arc::new(mocks.staging_airlines),
            Arc::new(mocks.production_airlines),
        ),
        airports: Sources::<dyn AirportRepository>::new(
            Arc::new(MockAirportRepository::new()),
            Arc::new(MockAirportRepository::new()),
        ),
        schedules: Sources::<dyn ScheduleRepository>::new(
            Arc::new(mocks.staging_schedules),
            Arc::new(mocks.production_schedules),
        ),
        whitelist: Arc::new(mocks.whitelist),
        users: Arc::new(MockUserRepository::new()),
        orders: Arc::new(mocks.orders),
    };
    app(AppState::new(auth(), repos, SearchSettings::default()))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn schedule(airline_id: &str, flight_number: &str) -> ScheduleDetail {
    let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    ScheduleDetail {
        schedule: Schedule {
            id: format!("sched-{}", flight_number),
            airline_id: airline_id.into(),
            flight_number: flight_number.into(),
            departure_airport_id: "cgk".into(),
            departure_terminal: "3".into(),
            departure_time: "07:00".into(),
            arrival_airport_id: "dps".into(),
            arrival_terminal: "D".into(),
            arrival_time: "09:50".into(),
            duration_minutes: 110,
            aircraft: "Boeing 737-800".into(),
            days_of_week: DaysOfWeek::every_day(),
            economy_price: 1_200_000.0,
            business_price: 3_600_000.0,
            first_class_price: 7_200_000.0,
            economy_seats: 150,
            business_seats: 30,
            first_class_seats: 10,
            is_active: true,
            valid_from: day,
            valid_until: day,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        },
        airline: AirlineRef { id: airline_id.into(), code: "GA".into(), name: "Garuda Indonesia".into(), logo: None },
        departure_airport: AirportRef { id: "cgk".into(), code: "CGK".into(), city: "Jakarta".into(), name: "Soekarno-Hatta".into() },
        arrival_airport: AirportRef { id: "dps".into(), code: "DPS".into(), city: "Denpasar".into(), name: "Ngurah Rai".into() },
    }
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&router(Mocks::default()), get("/api/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_airline_then_duplicate_code() {
    let created: Arc<Mutex<Vec<Airline>>> = Arc::new(Mutex::new(Vec::new()));
    let mut mocks = Mocks::default();

    let lookup = Arc::clone(&created);
    mocks.staging_airlines.expect_find_by_code().returning(move |code| {
        Ok(lookup.lock().unwrap().iter().find(|a| a.code == code).cloned())
    });
    let store = Arc::clone(&created);
    mocks.staging_airlines.expect_create().times(1).returning(move |airline| {
        store.lock().unwrap().push(airline.clone());
        Ok(())
    });
    mocks.production_airlines.expect_create().times(1).returning(|_| Ok(()));

    let router = router(mocks);
    let admin = token("admin@aero.local", Role::Admin);
    let body = json!({ "code": "ZZ", "name": "Zeta Air" });

    let (status, airline) = send(&router, post_json("/api/airlines", Some(&admin), body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(airline["code"], "ZZ");
    assert!(!airline["id"].as_str().unwrap().is_empty());

    let (status, error) = send(&router, post_json("/api/airlines", Some(&admin), body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].as_str().unwrap().contains("code already exists"));
}

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let router = router(Mocks::default());
    let body = json!({ "code": "ZZ", "name": "Zeta Air" });

    let (status, _) = send(&router, post_json("/api/airlines", None, body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user = token("user@mail.com", Role::User);
    let (status, _) = send(&router, post_json("/api/airlines", Some(&user), body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&router, get("/api/admin/whitelist", Some(&user))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_orders_require_login() {
    let (status, body) = send(&router(Mocks::default()), get("/api/orders", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_whitelisted_search_reads_production() {
    let mut mocks = Mocks::default();
    mocks.whitelist.expect_find_by_email().returning(|email| {
        if email == "a@b.com" {
            Ok(Some(WhitelistedUser::new(email.to_string(), "A".into(), vec!["ga".into()])))
        } else {
            Ok(None)
        }
    });
    mocks
        .staging_schedules
        .expect_search()
        .returning(|_| Ok((vec![schedule("ga", "GA-STG")], 1)));
    mocks
        .production_schedules
        .expect_search()
        .returning(|_| Ok((vec![schedule("ga", "GA-PRD")], 1)));

    let router = router(mocks);
    let uri = "/api/flights/search?origin=CGK&destination=DPS&departure_date=2030-01-15&airlines=ga";

    let whitelisted = token("a@b.com", Role::User);
    let (status, body) = send(&router, get(uri, Some(&whitelisted))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["data_source"], "production");
    assert_eq!(body["data"][0]["flight_number"], "GA-PRD");
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["failed_airlines"], json!([]));

    let (status, body) = send(&router, get(uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["data_source"], "staging");

    let stranger = token("c@d.com", Role::User);
    let (_, body) = send(&router, get(uri, Some(&stranger))).await;
    assert_eq!(body["data"][0]["data_source"], "staging");
}

#[tokio::test]
async fn test_whitelisted_caller_books_other_airline_from_staging() {
    let mut mocks = Mocks::default();
    mocks.whitelist.expect_find_by_email().returning(|email| {
        Ok(Some(WhitelistedUser::new(email.to_string(), "A".into(), vec!["ga".into()])))
    });
    mocks
        .staging_schedules
        .expect_search()
        .returning(|_| Ok((vec![schedule("jt", "JT-610")], 1)));
    mocks
        .staging_schedules
        .expect_find_by_id()
        .returning(|_| Ok(Some(schedule("jt", "JT-610"))));
    mocks.production_schedules.expect_search().never();
    mocks.production_schedules.expect_find_by_id().never();
    mocks.orders.expect_create().times(1).returning(|_| Ok(()));

    let router = router(mocks);
    let caller = token("a@b.com", Role::User);

    let (status, found) = send(
        &router,
        get("/api/flights/search?origin=CGK&destination=DPS&departure_date=2030-01-15&airlines=jt", Some(&caller)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["data"][0]["data_source"], "staging");
    let schedule_id = found["data"][0]["id"].as_str().unwrap().to_string();

    let booking = json!({
        "schedule_id": schedule_id,
        "flight_date": "2030-01-15",
        "cabin_class": "economy",
        "contact_name": "Ana",
        "contact_email": "a@b.com",
        "contact_phone": "+62811000000",
        "passengers": [{ "title": "Ms", "full_name": "Ana Putri", "type": "adult" }]
    });
    let (status, order) = send(&router, post_json("/api/orders", Some(&caller), booking)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["schedule_id"], "sched-JT-610");
    assert_eq!(order["total_amount"], 1_200_000.0);
    assert_eq!(order["status"], "pending");
}

#[tokio::test]
async fn test_whitelist_check() {
    let mut mocks = Mocks::default();
    mocks.whitelist.expect_find_by_email().returning(|email| {
        Ok(Some(WhitelistedUser::new(email.to_string(), "A".into(), vec!["ga".into(), "jt".into()])))
    });

    let (status, body) = send(
        &router(mocks),
        get("/api/whitelist/check?email=a@b.com&airline_id=qg", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["whitelisted"], true);
    assert_eq!(body["enabled_airlines"], json!(["ga", "jt"]));
    assert_eq!(body["has_access"], false);
}

#[tokio::test]
async fn test_whitelist_check_unknown_email_omits_access() {
    let mut mocks = Mocks::default();
    mocks.whitelist.expect_find_by_email().returning(|_| Ok(None));

    let (status, body) = send(
        &router(mocks),
        get("/api/whitelist/check?email=ghost@b.com&airline_id=ga", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["whitelisted"], false);
    assert_eq!(body["enabled_airlines"], json!([]));
    assert!(body.get("has_access").is_none());
}

#[tokio::test]
async fn test_airline_schedules_follow_per_airline_policy() {
    let mut mocks = Mocks::default();
    mocks.whitelist.expect_find_by_email().returning(|email| {
        Ok(Some(WhitelistedUser::new(email.to_string(), "A".into(), vec!["ga".into()])))
    });
    mocks
        .staging_schedules
        .expect_list_by_airline()
        .returning(|airline_id, _| Ok((vec![schedule(airline_id, "STG")], 1)));
    mocks
        .production_schedules
        .expect_list_by_airline()
        .returning(|airline_id, _| Ok((vec![schedule(airline_id, "PRD")], 1)));

    let router = router(mocks);
    let caller = token("a@b.com", Role::User);

    let (status, enabled) = send(&router, get("/api/airlines/ga/schedules", Some(&caller))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(enabled["data"][0]["flight_number"], "PRD");

    let (_, other) = send(&router, get("/api/airlines/jt/schedules", Some(&caller))).await;
    assert_eq!(other["data"][0]["flight_number"], "STG");
}

#[tokio::test]
async fn test_invalid_env_rejected() {
    let admin = token("admin@aero.local", Role::Admin);
    let (status, _) = send(
        &router(Mocks::default()),
        post_json("/api/airlines?env=qa", Some(&admin), json!({ "code": "ZZ", "name": "Zeta Air" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
