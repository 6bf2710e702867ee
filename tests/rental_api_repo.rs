use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};
use axum::extract::{Path, RawQuery};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde_json::{json, Value};
use time::macros::date;
use car_rental_client::models::booking::{BookingRequest, BookingStatus};
use car_rental_client::models::car::CarPayload;
use car_rental_client::models::filter::DateFilter;
use car_rental_client::models::user::{LoginRequest, RegisterRequest, Role};
use car_rental_client::repositories::rental_api_repo::RentalApiRepo;
use car_rental_client::repositories::{RentalApi, IDENTITY_HEADER};

#[derive(Clone, Debug, PartialEq)]
struct Recorded {
    route: String,
    query: Option<String>,
    identity: Option<String>,
    body: Option<Value>,
}

type Recorder = Arc<Mutex<Vec<Recorded>>>;

fn identity(headers: &HeaderMap) -> Option<String> {
    headers
        .get(IDENTITY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn record(recorder: &Recorder, route: &str, query: Option<String>, headers: &HeaderMap, body: Option<Value>) {
    recorder.lock().unwrap().push(Recorded {
        route: route.to_string(),
        query,
        identity: identity(headers),
        body,
    });
}

fn car_json(id: i64) -> Value {
    json!({
        "id": id, "make": "Toyota", "model": "Innova", "year": 2022,
        "color": "White", "rentalPricePerDay": 2500.0
    })
}

async fn login(
    Extension(recorder): Extension<Recorder>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    record(&recorder, "POST /api/auth/login", None, &headers, Some(body.clone()));
    if body["password"] == "x" {
        (StatusCode::OK, Json(json!({"id": 1, "name": "A", "role": "CUSTOMER"}))).into_response()
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({"message": "Invalid credentials"}))).into_response()
    }
}

async fn register(
    Extension(recorder): Extension<Recorder>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    record(&recorder, "POST /api/auth/register", None, &headers, Some(body.clone()));
    Json(json!({"id": 5, "name": body["name"], "email": body["email"], "role": "CUSTOMER"}))
}

async fn list_cars(
    Extension(recorder): Extension<Recorder>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> impl IntoResponse {
    record(&recorder, "GET /api/cars", query, &headers, None);
    Json(json!([car_json(1), car_json(2)]))
}

async fn add_car(
    Extension(recorder): Extension<Recorder>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    record(&recorder, "POST /api/cars", None, &headers, Some(body));
    (StatusCode::CREATED, Json(car_json(3)))
}

async fn update_car(
    Extension(recorder): Extension<Recorder>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    record(&recorder, &format!("PUT /api/cars/{}", id), None, &headers, Some(body));
    Json(car_json(id))
}

async fn delete_car(
    Extension(recorder): Extension<Recorder>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> impl IntoResponse {
    record(&recorder, &format!("DELETE /api/cars/{}", id), None, &headers, None);
    StatusCode::NO_CONTENT
}

async fn create_booking(
    Extension(recorder): Extension<Recorder>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    record(&recorder, "POST /api/bookings", None, &headers, Some(body));
    (
        StatusCode::CONFLICT,
        Json(json!({"message": "Car already booked for selected dates"})),
    )
}

async fn all_bookings(
    Extension(recorder): Extension<Recorder>,
    headers: HeaderMap,
) -> impl IntoResponse {
    record(&recorder, "GET /api/bookings", None, &headers, None);
    (StatusCode::FORBIDDEN, "Admin access required")
}

async fn user_bookings(
    Extension(recorder): Extension<Recorder>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> impl IntoResponse {
    record(&recorder, &format!("GET /api/bookings/user/{}", id), None, &headers, None);
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn update_booking(
    Extension(recorder): Extension<Recorder>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    record(&recorder, &format!("PUT /api/bookings/{}", id), None, &headers, Some(body.clone()));
    Json(json!({
        "id": id, "userId": 1, "carId": 1,
        "startDate": "2024-01-01", "endDate": "2024-01-03",
        "totalPrice": 7500.0, "status": body["status"]
    }))
}

fn router(recorder: Recorder) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/cars", get(list_cars).post(add_car))
        .route("/api/cars/:id", put(update_car).delete(delete_car))
        .route("/api/bookings", get(all_bookings).post(create_booking))
        .route("/api/bookings/user/:id", get(user_bookings))
        .route("/api/bookings/:id", put(update_booking))
        .layer(Extension(recorder))
}

fn spawn_backend() -> (RentalApiRepo, Recorder) {
    let recorder: Recorder = Arc::new(Mutex::new(Vec::new()));
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = axum::Server::from_tcp(listener)
        .unwrap()
        .serve(router(recorder.clone()).into_make_service());
    tokio::spawn(server);

    (RentalApiRepo::new(&format!("http://{}", addr)), recorder)
}

fn last(recorder: &Recorder) -> Recorded {
    recorder.lock().unwrap().last().cloned().unwrap()
}

#[tokio::test]
async fn filtered_catalog_sends_both_dates() {
    let (api, recorder) = spawn_backend();
    let filter = DateFilter::new(Some(date!(2024 - 01 - 01)), Some(date!(2024 - 01 - 03)));

    let cars = api.get_cars(&filter).await.unwrap();

    assert_eq!(cars.len(), 2);
    assert_eq!(
        last(&recorder).query.as_deref(),
        Some("startDate=2024-01-01&endDate=2024-01-03")
    );
}

#[tokio::test]
async fn half_filter_sends_no_query() {
    let (api, recorder) = spawn_backend();
    let filter = DateFilter::new(None, Some(date!(2024 - 01 - 03)));

    api.get_cars(&filter).await.unwrap();

    assert_eq!(last(&recorder).query, None);
}

#[tokio::test]
async fn login_parses_identity_and_surfaces_backend_message() {
    let (api, recorder) = spawn_backend();

    let user = api
        .login(&LoginRequest { email: "a@b.com".to_string(), password: "x".to_string() })
        .await
        .unwrap();
    assert_eq!(user.id, 1);
    assert_eq!(user.role, Role::Customer);
    assert_eq!(
        last(&recorder).body,
        Some(json!({"email": "a@b.com", "password": "x"}))
    );
    assert_eq!(last(&recorder).identity, None);

    let err = api
        .login(&LoginRequest { email: "a@b.com".to_string(), password: "bad".to_string() })
        .await
        .unwrap_err();
    assert_eq!(err.message, "Invalid credentials");
}

#[tokio::test]
async fn register_posts_credentials_without_identity() {
    let (api, recorder) = spawn_backend();
    let request = RegisterRequest {
        name: "Jane Doe".to_string(),
        email: "jane@x.com".to_string(),
        password: "pw".to_string(),
    };

    let user = api.register(&request).await.unwrap();

    assert_eq!(user.id, 5);
    assert_eq!(user.name, "Jane Doe");
    assert_eq!(user.role, Role::Customer);
    let sent = last(&recorder);
    assert_eq!(sent.route, "POST /api/auth/register");
    assert_eq!(sent.identity, None);
    assert_eq!(
        sent.body,
        Some(json!({"name": "Jane Doe", "email": "jane@x.com", "password": "pw"}))
    );
}

#[tokio::test]
async fn update_car_puts_payload_with_identity() {
    let (api, recorder) = spawn_backend();
    let payload = CarPayload {
        make: "Toyota".to_string(),
        model: "Innova".to_string(),
        year: 2023,
        color: Some("Silver".to_string()),
        rental_price_per_day: 3100.0,
    };

    let car = api.update_car(4, &payload, 9).await.unwrap();

    assert_eq!(car.id, 4);
    let sent = last(&recorder);
    assert_eq!(sent.route, "PUT /api/cars/4");
    assert_eq!(sent.identity.as_deref(), Some("9"));
    assert_eq!(
        sent.body,
        Some(json!({
            "make": "Toyota", "model": "Innova", "year": 2023,
            "color": "Silver", "rentalPricePerDay": 3100.0
        }))
    );
}

#[tokio::test]
async fn privileged_car_calls_carry_identity_header() {
    let (api, recorder) = spawn_backend();
    let payload = CarPayload {
        make: "Toyota".to_string(),
        model: "Innova".to_string(),
        year: 2022,
        color: None,
        rental_price_per_day: 2500.0,
    };

    let car = api.add_car(&payload, 9).await.unwrap();
    assert_eq!(car.id, 3);
    let added = last(&recorder);
    assert_eq!(added.identity.as_deref(), Some("9"));
    assert_eq!(
        added.body,
        Some(json!({"make": "Toyota", "model": "Innova", "year": 2022, "rentalPricePerDay": 2500.0}))
    );

    api.delete_car(3, 9).await.unwrap();
    let deleted = last(&recorder);
    assert_eq!(deleted.route, "DELETE /api/cars/3");
    assert_eq!(deleted.identity.as_deref(), Some("9"));
}

#[tokio::test]
async fn booking_conflict_uses_structured_message() {
    let (api, recorder) = spawn_backend();
    let request = BookingRequest {
        user_id: 1,
        car_id: 1,
        start_date: date!(2024 - 01 - 01),
        end_date: date!(2024 - 01 - 03),
    };

    let err = api.create_booking(&request).await.unwrap_err();

    assert_eq!(err.message, "Car already booked for selected dates");
    let sent = last(&recorder);
    assert_eq!(sent.identity, None);
    assert_eq!(
        sent.body,
        Some(json!({"userId": 1, "carId": 1, "startDate": "2024-01-01", "endDate": "2024-01-03"}))
    );
}

#[tokio::test]
async fn plain_text_error_body_becomes_message() {
    let (api, recorder) = spawn_backend();

    let err = api.get_all_bookings(1).await.unwrap_err();

    assert_eq!(err.message, "Admin access required");
    assert_eq!(last(&recorder).identity.as_deref(), Some("1"));
}

#[tokio::test]
async fn empty_error_body_falls_back_to_status() {
    let (api, recorder) = spawn_backend();

    let err = api.get_bookings_by_user(1).await.unwrap_err();

    assert_eq!(err.message, "Request failed with status code 500");
    assert_eq!(last(&recorder).route, "GET /api/bookings/user/1");
}

#[tokio::test]
async fn status_update_carries_actor_in_body() {
    let (api, recorder) = spawn_backend();

    let booking = api
        .update_booking_status(7, BookingStatus::Cancelled, 1)
        .await
        .unwrap();

    assert_eq!(booking.status, BookingStatus::Cancelled);
    let sent = last(&recorder);
    assert_eq!(sent.route, "PUT /api/bookings/7");
    assert_eq!(sent.identity, None);
    assert_eq!(sent.body, Some(json!({"status": "CANCELLED", "actorUserId": 1})));
}

#[tokio::test]
async fn unreachable_backend_is_a_single_message_error() {
    let addr: SocketAddr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let api = RentalApiRepo::new(&format!("http://{}", addr));

    let err = api.get_cars(&DateFilter::default()).await.unwrap_err();

    assert!(!err.message.is_empty());
    assert!(!err.message.contains(&addr.to_string()));
}
