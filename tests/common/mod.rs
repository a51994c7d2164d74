//! Shared helpers for the storefront integration tests.
//!
//! [`spawn_backend`] starts an in-process stand-in for the bakery backend on
//! an ephemeral port; [`storefront`] wires the real router to it.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::http::Method;
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use bakery_storefront::backend::BackendClient;
use bakery_storefront::domain::pricing::PricingPolicy;
use bakery_storefront::publisher::EventPublisher;
use bakery_storefront::{router, AppState};

pub const TOKEN: &str = "customer-token";

// =============================================================================
// Mock Backend
// =============================================================================

#[derive(Debug, Default)]
pub struct BackendData {
    /// Requests received, in order, as "METHOD /path".
    pub requests: Vec<String>,
    pub cart: Vec<Value>,
    pub coupons: Vec<Value>,
    pub wishlist: Vec<String>,
    pub orders: Vec<Value>,
    pub addresses: Vec<Value>,
    pub reviews: Vec<Value>,
    pub profile: Option<Value>,
    /// Bodies of `POST /coupons/validate`, in order.
    pub coupon_checks: Vec<Value>,
    pub last_query: Option<Value>,
    /// When set, every request fails with a 500.
    pub failing: bool,
    next_line: u32,
    next_id: u32,
}

impl BackendData {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

pub type Shared = Arc<Mutex<BackendData>>;

pub struct MockBackend {
    pub url: String,
    pub data: Shared,
}

impl MockBackend {
    pub fn requests(&self) -> Vec<String> { self.data.lock().unwrap().requests.clone() }
    pub fn orders(&self) -> Vec<Value> { self.data.lock().unwrap().orders.clone() }

    pub fn coupon_checks(&self) -> Vec<Value> { self.data.lock().unwrap().coupon_checks.clone() }
    pub fn addresses(&self) -> Vec<Value> { self.data.lock().unwrap().addresses.clone() }
    pub fn cart(&self) -> Vec<Value> { self.data.lock().unwrap().cart.clone() }

    pub fn add_coupon(&self, coupon: Value) { self.data.lock().unwrap().coupons.push(coupon); }
    pub fn add_review(&self, review: Value) { self.data.lock().unwrap().reviews.push(review); }
    pub fn fail_everything(&self) { self.data.lock().unwrap().failing = true; }

    /// Puts a line straight into the backend cart, bypassing its own merging.
    pub fn seed_cart_line(&self, id: &str, product_id: &str, quantity: u64) {
        let product = find_product(product_id).unwrap();
        self.data.lock().unwrap().cart.push(json!({ "_id": id, "product": product, "quantity": quantity }));
    }
}

fn catalog() -> Vec<Value> {
    vec![
        json!({ "_id": "p1", "name": "Sourdough Loaf", "slug": "sourdough-loaf", "price": 12.5, "category": "Bread", "images": ["/img/sourdough.jpg"], "countInStock": 8 }),
        json!({ "_id": "p2", "name": "Butter Croissant", "price": 3.25, "category": { "_id": "c2", "name": "Pastry" }, "countInStock": 40 }),
    ]
}

fn find_product(id: &str) -> Option<Value> { catalog().into_iter().find(|p| p["_id"] == id) }

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("authorization").and_then(|v| v.to_str().ok()).is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn reject(status: StatusCode, message: &str) -> Response { (status, Json(json!({ "success": false, "message": message }))).into_response() }

fn cart_body(data: &BackendData) -> Value { json!({ "success": true, "cart": { "items": data.cart } }) }

async fn record(State(data): State<Shared>, request: Request, next: Next) -> Response {
    let path = request.uri().path().trim_start_matches("/api").to_string();
    let failing = {
        let mut data = data.lock().unwrap();
        data.requests.push(format!("{} {path}", request.method()));
        data.failing
    };
    if failing {
        return reject(StatusCode::INTERNAL_SERVER_ERROR, "database exploded");
    }
    let catalog_read = request.method() == Method::GET && (path.starts_with("/products") || path == "/coupons" || path == "/categories");
    if catalog_read || path.starts_with("/auth") {
        return next.run(request).await;
    }
    if !authorized(request.headers()) {
        return reject(StatusCode::UNAUTHORIZED, "Not authorized, token failed");
    }
    next.run(request).await
}

async fn list_products(State(data): State<Shared>, Query(query): Query<Value>) -> Json<Value> {
    data.lock().unwrap().last_query = Some(query);
    Json(json!({ "data": { "products": catalog(), "total": 42 } }))
}

async fn get_product(Path(id): Path<String>) -> Response {
    match find_product(&id) {
        Some(product) => Json(json!({ "product": product })).into_response(),
        None => reject(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn list_categories() -> Json<Value> {
    Json(json!({ "success": true, "categories": [{ "_id": "c1", "name": "Bread" }, { "_id": "c2", "name": "Viennoiserie", "slug": "pastry" }] }))
}

async fn get_cart(State(data): State<Shared>) -> Json<Value> { Json(cart_body(&data.lock().unwrap())) }

async fn add_to_cart(State(data): State<Shared>, Json(body): Json<Value>) -> Response {
    let product_id = body["productId"].as_str().unwrap_or_default().to_string();
    let Some(product) = find_product(&product_id) else { return reject(StatusCode::NOT_FOUND, "Product not found") };
    let quantity = body["quantity"].as_u64().unwrap_or(1);

    let mut data = data.lock().unwrap();
    match data.cart.iter().position(|l| l["product"]["_id"] == product_id.as_str()) {
        Some(i) => {
            let current = data.cart[i]["quantity"].as_u64().unwrap_or(0);
            data.cart[i]["quantity"] = json!(current + quantity);
        }
        None => {
            data.next_line += 1;
            let id = format!("line-{}", data.next_line);
            data.cart.push(json!({ "_id": id, "product": product, "quantity": quantity }));
        }
    }
    Json(cart_body(&data)).into_response()
}

/// Answers with an acknowledgement only, so the storefront has to re-read the cart.
async fn update_cart_line(State(data): State<Shared>, Path(line): Path<String>, Json(body): Json<Value>) -> Response {
    let mut data = data.lock().unwrap();
    match data.cart.iter_mut().find(|l| l["_id"] == line.as_str()) {
        Some(entry) => {
            entry["quantity"] = body["quantity"].clone();
            Json(json!({ "success": true, "message": "Cart updated" })).into_response()
        }
        None => reject(StatusCode::NOT_FOUND, "Cart item not found"),
    }
}

async fn remove_cart_line(State(data): State<Shared>, Path(line): Path<String>) -> Json<Value> {
    let mut data = data.lock().unwrap();
    data.cart.retain(|l| l["_id"] != line.as_str());
    Json(cart_body(&data))
}

async fn clear_cart(State(data): State<Shared>) -> Json<Value> {
    data.lock().unwrap().cart.clear();
    Json(json!({ "success": true, "message": "Cart cleared" }))
}

async fn list_coupons(State(data): State<Shared>) -> Json<Value> { Json(json!({ "coupons": data.lock().unwrap().coupons })) }

async fn validate_coupon(State(data): State<Shared>, Json(body): Json<Value>) -> Response {
    let code = body["code"].as_str().unwrap_or_default();
    let mut data = data.lock().unwrap();
    data.coupon_checks.push(body.clone());
    match data.coupons.iter().find(|c| c["code"] == code) {
        Some(coupon) => Json(json!({ "valid": true, "coupon": coupon })).into_response(),
        None => reject(StatusCode::NOT_FOUND, "Invalid coupon code"),
    }
}

async fn create_order(State(data): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut data = data.lock().unwrap();
    data.orders.push(body.clone());
    let order = json!({
        "_id": format!("order-{}", data.orders.len()),
        "orderNumber": 1000 + data.orders.len(),
        "status": "placed",
        "orderItems": body["items"].as_array().cloned().unwrap_or_default().iter()
            .map(|i| json!({ "product": i["productId"], "quantity": i["quantity"], "price": i["price"] }))
            .collect::<Vec<_>>(),
        "itemsPrice": body["subtotal"],
        "discount": body["discount"],
        "shippingPrice": body["shipping"],
        "totalPrice": body["total"],
        "couponCode": body["couponCode"],
        "paymentMethod": body["paymentMethod"],
        "createdAt": "2026-10-18T09:30:00Z",
    });
    data.cart.clear();
    (StatusCode::CREATED, Json(json!({ "success": true, "order": order }))).into_response()
}

fn delivered_order() -> Value {
    json!({
        "_id": "order-7", "status": "Delivered", "totalPrice": 18.75,
        "orderItems": [{ "product": "p1", "name": "Sourdough Loaf", "quantity": 1, "price": 12.5 }],
        "shippingPrice": 6.25,
        "shippingAddress": { "fullName": "Ada Baker", "addressLine1": "12 Rye Lane", "city": "Portland", "postalCode": "97201", "country": "US" },
    })
}

async fn list_orders() -> Json<Value> { Json(json!({ "orders": [delivered_order()] })) }

async fn get_order(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "order-7" => Json(json!({ "success": true, "data": { "order": delivered_order() } })).into_response(),
        _ => reject(StatusCode::NOT_FOUND, "Order not found"),
    }
}

async fn get_wishlist(State(data): State<Shared>) -> Json<Value> {
    let data = data.lock().unwrap();
    let items: Vec<Value> = data.wishlist.iter().filter_map(|id| find_product(id)).map(|p| json!({ "product": p })).collect();
    Json(json!({ "data": { "wishlist": items } }))
}

async fn add_to_wishlist(State(data): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let id = body["productId"].as_str().unwrap_or_default().to_string();
    data.lock().unwrap().wishlist.push(id);
    Json(json!({ "success": true }))
}

async fn remove_from_wishlist(State(data): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    data.lock().unwrap().wishlist.retain(|w| *w != id);
    Json(json!({ "success": true }))
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != "croissant" {
        return reject(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }
    Json(json!({ "token": TOKEN, "user": { "_id": "u1", "name": "Ada Baker", "email": body["email"] } })).into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == "ada@example.com" {
        return reject(StatusCode::CONFLICT, "User already exists");
    }
    let user = json!({ "_id": "u2", "name": body["name"], "email": body["email"] });
    (StatusCode::CREATED, Json(json!({ "success": true, "token": "fresh-token", "user": user }))).into_response()
}

fn current_profile(data: &BackendData) -> Value {
    data.profile.clone().unwrap_or_else(|| json!({ "_id": "u1", "name": "Ada Baker", "email": "ada@example.com", "phone": "" }))
}

async fn profile(State(data): State<Shared>) -> Json<Value> { Json(json!({ "user": current_profile(&data.lock().unwrap()) })) }

async fn update_profile(State(data): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut data = data.lock().unwrap();
    let mut user = current_profile(&data);
    for field in ["name", "phone"] {
        if let Some(value) = body.get(field) {
            user[field] = value.clone();
        }
    }
    data.profile = Some(user.clone());
    Json(json!({ "success": true, "user": user }))
}

async fn list_addresses(State(data): State<Shared>) -> Json<Value> { Json(json!({ "addresses": data.lock().unwrap().addresses })) }

fn make_default(addresses: &mut [Value], id: &str) {
    for address in addresses.iter_mut() {
        address["isDefault"] = json!(address["_id"] == id);
    }
}

async fn create_address(State(data): State<Shared>, Json(mut body): Json<Value>) -> Response {
    let mut data = data.lock().unwrap();
    let id = data.next_id("addr");
    body["_id"] = json!(id);
    let is_default = body["isDefault"] == true;
    data.addresses.push(body.clone());
    if is_default {
        make_default(&mut data.addresses, &id);
    }
    (StatusCode::CREATED, Json(json!({ "success": true, "address": body }))).into_response()
}

async fn update_address(State(data): State<Shared>, Path(id): Path<String>, Json(mut body): Json<Value>) -> Response {
    let mut data = data.lock().unwrap();
    let Some(i) = data.addresses.iter().position(|a| a["_id"] == id.as_str()) else { return reject(StatusCode::NOT_FOUND, "Address not found") };
    body["_id"] = json!(id);
    data.addresses[i] = body.clone();
    Json(json!({ "address": body })).into_response()
}

async fn delete_address(State(data): State<Shared>, Path(id): Path<String>) -> Response {
    let mut data = data.lock().unwrap();
    let before = data.addresses.len();
    data.addresses.retain(|a| a["_id"] != id.as_str());
    if data.addresses.len() == before {
        return reject(StatusCode::NOT_FOUND, "Address not found");
    }
    Json(json!({ "success": true, "message": "Address removed" })).into_response()
}

async fn set_default_address(State(data): State<Shared>, Path(id): Path<String>) -> Response {
    let mut data = data.lock().unwrap();
    if !data.addresses.iter().any(|a| a["_id"] == id.as_str()) {
        return reject(StatusCode::NOT_FOUND, "Address not found");
    }
    make_default(&mut data.addresses, &id);
    Json(json!({ "success": true })).into_response()
}

async fn list_reviews(State(data): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    let data = data.lock().unwrap();
    let reviews: Vec<&Value> = data.reviews.iter().filter(|r| r["product"] == id.as_str()).collect();
    Json(json!({ "success": true, "reviews": reviews }))
}

async fn create_review(State(data): State<Shared>, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    let mut data = data.lock().unwrap();
    let review = json!({
        "_id": data.next_id("rev"), "product": id, "user": { "_id": "u1", "name": "Ada Baker" },
        "rating": body["rating"], "comment": body["comment"], "createdAt": "2026-10-18T09:30:00Z",
    });
    data.reviews.push(review.clone());
    (StatusCode::CREATED, Json(json!({ "success": true, "review": review }))).into_response()
}

/// Starts the mock backend and returns its base URL (including `/api`).
pub async fn spawn_backend() -> MockBackend {
    let data: Shared = Arc::new(Mutex::new(BackendData::default()));
    let api = Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
        .route("/products/:id/reviews", get(list_reviews).post(create_review))
        .route("/categories", get(list_categories))
        .route("/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/cart/:line", put(update_cart_line).delete(remove_cart_line))
        .route("/coupons", get(list_coupons))
        .route("/coupons/validate", post(validate_coupon))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/:id", get(get_order))
        .route("/addresses", get(list_addresses).post(create_address))
        .route("/addresses/:id", put(update_address).delete(delete_address))
        .route("/addresses/:id/default", patch(set_default_address))
        .route("/wishlist", get(get_wishlist).post(add_to_wishlist))
        .route("/wishlist/:id", delete(remove_from_wishlist))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/users/profile", get(profile).put(update_profile))
        .layer(middleware::from_fn_with_state(data.clone(), record))
        .with_state(data.clone());
    let app = Router::new().nest("/api", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    MockBackend { url: format!("http://{address}/api"), data }
}

// =============================================================================
// Storefront
// =============================================================================

pub fn storefront_state(backend: &MockBackend) -> AppState {
    let client = BackendClient::new(&backend.url, Duration::from_secs(5), "USD").unwrap();
    AppState::new(client, PricingPolicy::default(), EventPublisher::local_only())
}

pub fn storefront(backend: &MockBackend) -> Router { router(storefront_state(backend)) }

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>, authed: bool) -> (StatusCode, Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if authed {
        builder = builder.header("authorization", format!("Bearer {TOKEN}"));
    }
    let request = match body {
        Some(body) => builder.header("content-type", "application/json").body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

/// Reads a serialized `Money` amount.
pub fn amount(money: &Value) -> rust_decimal::Decimal { money["amount"].as_str().unwrap().parse().unwrap() }

pub fn cents(value: i64) -> rust_decimal::Decimal { rust_decimal::Decimal::new(value, 2) }
