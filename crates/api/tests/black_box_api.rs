use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};
use storefront_api::config::AppConfig;
use storefront_auth::{JwtClaims, Role};
use storefront_core::UserId;

const SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = storefront_api::app::build_app(&AppConfig::in_memory(SECRET))
            .await
            .expect("in-memory stores never fail to build");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(user: UserId, role: Role) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user,
        role,
        issued_at: now - ChronoDuration::seconds(1),
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn customer() -> String {
    mint_jwt(UserId::new(), Role::Customer)
}

fn owner() -> String {
    mint_jwt(UserId::new(), Role::Owner)
}

async fn create_product(srv: &TestServer, client: &reqwest::Client, token: &str, name: &str, price: u64) -> String {
    let res = client
        .post(srv.url("/api/owner/products"))
        .bearer_auth(token)
        .json(&json!({
            "name": name,
            "description": "a thing for testing",
            "price": price,
            "category": "test",
            "image": { "publicId": name, "url": format!("https://img.example/{name}.png") },
            "stock": 10
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

async fn get_cart(srv: &TestServer, client: &reqwest::Client, token: &str) -> Value {
    let res = client
        .get(srv.url("/api/cart"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

async fn add(srv: &TestServer, client: &reqwest::Client, token: &str, body: Value) -> reqwest::Response {
    client
        .post(srv.url("/api/cart/add"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for path in ["/api/cart", "/api/whoami", "/api/owner/products"] {
        let res = client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
    }

    let res = client
        .get(srv.url("/api/cart"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");

    // Public endpoints stay open.
    assert_eq!(client.get(srv.url("/health")).send().await.unwrap().status(), StatusCode::OK);
    assert_eq!(
        client.get(srv.url("/api/products")).send().await.unwrap().status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn identity_is_derived_from_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let user = UserId::new();

    let res = client
        .get(srv.url("/api/whoami"))
        .bearer_auth(mint_jwt(user, Role::Owner))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["userId"].as_str().unwrap(), user.to_string());
    assert_eq!(body["role"], "owner");
}

#[tokio::test]
async fn new_user_sees_empty_cart() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let cart = get_cart(&srv, &client, &customer()).await;
    assert_eq!(cart, json!({ "items": [], "totalItems": 0, "totalPrice": 0 }));
}

#[tokio::test]
async fn cart_lifecycle_add_merge_update_remove() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let product_id = create_product(&srv, &client, &owner(), "Mug", 100).await;
    let token = customer();

    let res = add(&srv, &client, &token, json!({ "productId": product_id, "quantity": 2 })).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cart: Value = res.json().await.unwrap();
    assert_eq!(cart["totalPrice"], 200);

    let res = add(&srv, &client, &token, json!({ "productId": product_id, "quantity": 3 })).await;
    let cart: Value = res.json().await.unwrap();
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["quantity"], 5);
    assert_eq!(cart["items"][0]["product"]["name"], "Mug");
    assert_eq!(cart["totalItems"], 5);
    assert_eq!(cart["totalPrice"], 500);

    let item_id = cart["items"][0]["id"].as_str().unwrap().to_string();
    let res = client
        .put(srv.url(&format!("/api/cart/update/{item_id}")))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cart: Value = res.json().await.unwrap();
    assert_eq!(cart["totalItems"], 1);
    assert_eq!(cart["totalPrice"], 100);

    let res = client
        .delete(srv.url(&format!("/api/cart/remove/{item_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cart: Value = res.json().await.unwrap();
    assert_eq!(cart["items"], json!([]));
    assert_eq!(cart["totalPrice"], 0);
}

#[tokio::test]
async fn add_defaults_quantity_and_clear_empties_cart() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let owner = owner();
    let a = create_product(&srv, &client, &owner, "A", 250).await;
    let b = create_product(&srv, &client, &owner, "B", 40).await;
    let token = customer();

    add(&srv, &client, &token, json!({ "productId": a })).await;
    let cart: Value = add(&srv, &client, &token, json!({ "productId": b, "quantity": 2 }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(cart["totalItems"], 3);
    assert_eq!(cart["totalPrice"], 330);

    let res = client
        .delete(srv.url("/api/cart/clear"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let empty = json!({ "items": [], "totalItems": 0, "totalPrice": 0 });
    assert_eq!(res.json::<Value>().await.unwrap(), empty);
    assert_eq!(get_cart(&srv, &client, &token).await, empty);
}

#[tokio::test]
async fn inactive_or_unknown_product_is_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let owner = owner();
    let product_id = create_product(&srv, &client, &owner, "Lamp", 900).await;
    let token = customer();

    let res = client
        .put(srv.url(&format!("/api/owner/products/{product_id}")))
        .bearer_auth(&owner)
        .json(&json!({ "active": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = add(&srv, &client, &token, json!({ "productId": product_id })).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");

    let res = add(&srv, &client, &token, json!({ "productId": UserId::new().to_string() })).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    assert_eq!(get_cart(&srv, &client, &token).await["items"], json!([]));
}

#[tokio::test]
async fn invalid_quantities_and_bodies_are_bad_requests() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let product_id = create_product(&srv, &client, &owner(), "Pen", 30).await;
    let token = customer();

    for quantity in [json!(0), json!(-2), json!(1.5), json!("three")] {
        let res = add(&srv, &client, &token, json!({ "productId": product_id, "quantity": quantity })).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "quantity {quantity}");
    }

    let res = add(&srv, &client, &token, json!({ "productId": "not-a-uuid" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let cart: Value = add(&srv, &client, &token, json!({ "productId": product_id, "quantity": 2 }))
        .await
        .json()
        .await
        .unwrap();
    let item_id = cart["items"][0]["id"].as_str().unwrap().to_string();

    let res = client
        .put(srv.url(&format!("/api/cart/update/{item_id}")))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_cart(&srv, &client, &token).await["totalItems"], 2);
}

#[tokio::test]
async fn unknown_items_update_fails_but_remove_is_a_no_op() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let product_id = create_product(&srv, &client, &owner(), "Cup", 75).await;
    let token = customer();
    add(&srv, &client, &token, json!({ "productId": product_id })).await;
    let missing = UserId::new().to_string();

    let res = client
        .put(srv.url(&format!("/api/cart/update/{missing}")))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .delete(srv.url(&format!("/api/cart/remove/{missing}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cart: Value = res.json().await.unwrap();
    assert_eq!(cart["totalItems"], 1);
}

#[tokio::test]
async fn carts_keep_snapshot_prices_and_deleted_products() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let owner = owner();
    let product_id = create_product(&srv, &client, &owner, "Bowl", 100).await;
    let token = customer();
    add(&srv, &client, &token, json!({ "productId": product_id })).await;

    client
        .put(srv.url(&format!("/api/owner/products/{product_id}")))
        .bearer_auth(&owner)
        .json(&json!({ "price": 180 }))
        .send()
        .await
        .unwrap();

    let cart: Value = add(&srv, &client, &token, json!({ "productId": product_id }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(cart["items"][0]["unitPrice"], 100);
    assert_eq!(cart["totalPrice"], 200);

    let res = client
        .delete(srv.url(&format!("/api/owner/products/{product_id}")))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let cart = get_cart(&srv, &client, &token).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["product"], Value::Null);
    assert_eq!(cart["items"][0]["available"], false);
    assert_eq!(cart["totalPrice"], 200);
}

#[tokio::test]
async fn catalog_management_is_owner_only() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = customer();

    let res = client
        .get(srv.url("/api/owner/products"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(srv.url("/api/owner/products"))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Sneaky",
            "description": "should not exist",
            "price": 1,
            "category": "x",
            "image": { "publicId": "x", "url": "https://img.example/x.png" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let listed: Value = client
        .get(srv.url("/api/products"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn owner_lists_own_products_and_public_listing_hides_inactive() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let owner = owner();
    let first = create_product(&srv, &client, &owner, "First", 10).await;
    let second = create_product(&srv, &client, &owner, "Second", 20).await;

    client
        .put(srv.url(&format!("/api/owner/products/{first}")))
        .bearer_auth(&owner)
        .json(&json!({ "active": false }))
        .send()
        .await
        .unwrap();

    let mine: Value = client
        .get(srv.url("/api/owner/products"))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mine.as_array().unwrap().len(), 2);

    let public: Value = client
        .get(srv.url("/api/products"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<&str> = public
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![second.as_str()]);

    let res = client.get(srv.url(&format!("/api/products/{first}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = client.get(srv.url(&format!("/api/products/{second}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
