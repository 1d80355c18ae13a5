use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use petparadise_auth::HashCost;
use petparadise_infra::AppConfig;
use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: "test-secret".to_string(),
        password_hash: HashCost {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
        },
        revocation_sweep_interval: Duration::from_secs(60),
        ..AppConfig::default()
    }
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    async fn spawn_with(config: AppConfig) -> Self {
        petparadise_observability::init_for_tests();

        // Same router as prod, in-memory storage, ephemeral port.
        let app = petparadise_api::app::build_app(&config)
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn register(&self, name: &str, email: &str, password: &str, role: Option<&str>) -> Value {
        let mut body = json!({ "name": name, "email": email, "password": password });
        if let Some(role) = role {
            body["role"] = json!(role);
        }
        let res = self
            .client
            .post(self.url("/users/register"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }

    async fn login(&self, email: &str, password: &str) -> Value {
        let res = self
            .client
            .post(self.url("/users/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }

    /// Register and log in; returns (user id, access token, refresh token).
    async fn account(&self, email: &str, role: Option<&str>) -> (String, String, String) {
        let user = self.register("Test User", email, "pw12345", role).await;
        let session = self.login(email, "pw12345").await;
        (
            user["id"].as_str().unwrap().to_string(),
            session["tokens"]["access_token"].as_str().unwrap().to_string(),
            session["tokens"]["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    async fn refresh(&self, refresh_token: &str) -> reqwest::Response {
        self.client
            .post(self.url("/users/refresh"))
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .unwrap()
    }

    async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn error_of(res: reqwest::Response) -> Value {
    res.json::<Value>().await.unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Session scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_then_logout_retires_the_access_credential() {
    let srv = TestServer::spawn().await;
    srv.register("Alice", "alice@x.test", "pw12345", None).await;

    let session = srv.login("alice@x.test", "pw12345").await;
    let access = session["tokens"]["access_token"].as_str().unwrap().to_string();
    assert!(!access.is_empty());
    assert!(!session["tokens"]["refresh_token"].as_str().unwrap().is_empty());
    assert_eq!(session["tokens"]["expires_in"], 900);
    assert_eq!(session["user"]["email"], "alice@x.test");
    assert!(session["user"].get("password").is_none());
    assert!(session["user"].get("password_hash").is_none());

    let res = srv.get("/users/", &access).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv
        .client
        .post(srv.url("/users/logout"))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.get("/users/", &access).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await, json!({ "error": "Invalid token" }));
}

#[tokio::test]
async fn refresh_rotates_and_rejects_reuse() {
    let srv = TestServer::spawn().await;
    let (_, _, r0) = srv.account("bob@x.test", None).await;

    let res = srv.refresh(&r0).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let r1 = body["tokens"]["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(r1, r0);
    assert!(!body["tokens"]["access_token"].as_str().unwrap().is_empty());
    assert_eq!(body["tokens"]["expires_in"], 900);

    let res = srv.refresh(&r0).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await["code"], "refresh_token_invalid");

    let res = srv.refresh(&r1).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn inactive_user_cannot_refresh() {
    let srv = TestServer::spawn().await;
    let (_, admin, _) = srv.account("root@x.test", Some("admin")).await;
    let (user_id, _, refresh) = srv.account("carol@x.test", None).await;

    let res = srv
        .client
        .patch(srv.url(&format!("/users/{user_id}/status")))
        .bearer_auth(&admin)
        .json(&json!({ "status": "inactive" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.refresh(&refresh).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await["code"], "user_inactive");

    let res = srv.refresh(&refresh).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await["code"], "refresh_token_invalid");

    let res = srv
        .client
        .post(srv.url("/users/login"))
        .json(&json!({ "email": "carol@x.test", "password": "pw12345" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await["error"], "user account is not active");

    let res = srv
        .client
        .post(srv.url("/users/login"))
        .json(&json!({ "email": "carol@x.test", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await["error"], "user account is not active");
}

#[tokio::test]
async fn unsigned_token_claiming_admin_is_rejected() {
    let srv = TestServer::spawn().await;
    let admin = srv.register("Root", "root@x.test", "pw12345", Some("admin")).await;

    let now = Utc::now().timestamp();
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({
            "user_id": admin["id"],
            "email": "root@x.test",
            "role": "admin",
            "exp": now + 600,
            "iat": now,
            "sub": admin["id"],
        })
        .to_string(),
    );
    let forged = format!("{header}.{payload}.");

    let res = srv.get("/users/", &forged).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await, json!({ "error": "Invalid token" }));
}

#[tokio::test]
async fn staff_gate_admits_staff_and_admin_only() {
    let srv = TestServer::spawn().await;
    let (_, user, _) = srv.account("user@x.test", None).await;
    let (_, volunteer, _) = srv.account("vol@x.test", Some("volunteer")).await;
    let (_, admin, _) = srv.account("root@x.test", Some("admin")).await;

    let res = srv.get("/adoptions/", &user).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_of(res).await, json!({ "error": "Insufficient permissions" }));

    assert_eq!(srv.get("/adoptions/", &volunteer).await.status(), StatusCode::OK);
    assert_eq!(srv.get("/adoptions/", &admin).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn expired_access_credential_is_reported_as_expired() {
    let config = AppConfig {
        access_token_ttl: Duration::from_secs(1),
        ..test_config()
    };
    let srv = TestServer::spawn_with(config).await;
    let (_, access, _) = srv.account("dave@x.test", None).await;

    tokio::time::sleep(Duration::from_millis(2100)).await;

    let res = srv.get("/users/", &access).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await, json!({ "error": "Token has expired" }));
}

#[tokio::test]
async fn bearer_header_shape_is_enforced() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/users/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await["error"], "Missing authorization header");

    let res = srv
        .client
        .get(srv.url("/users/"))
        .header("Authorization", "Token abc")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await["error"], "Invalid authorization format");

    let res = srv.get("/users/", "not-a-token").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await["error"], "Invalid token");
}

#[tokio::test]
async fn logout_with_refresh_credential_retires_both() {
    let srv = TestServer::spawn().await;
    let (_, access, refresh) = srv.account("erin@x.test", None).await;

    let res = srv
        .client
        .post(srv.url("/users/logout"))
        .bearer_auth(&access)
        .json(&json!({ "refresh_token": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.refresh(&refresh).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await["code"], "refresh_token_invalid");
}

#[tokio::test]
async fn access_credential_is_not_accepted_for_refresh() {
    let srv = TestServer::spawn().await;
    let (_, access, _) = srv.account("frank@x.test", None).await;

    let res = srv.refresh(&access).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await["code"], "refresh_token_invalid");

    let res = srv
        .client
        .post(srv.url("/users/refresh"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn registration_validates_input() {
    let srv = TestServer::spawn().await;
    srv.register("Gina", "gina@x.test", "pw12345", None).await;

    let cases = [
        (json!({ "email": "a@x.test", "password": "pw" }), StatusCode::BAD_REQUEST, "Name is required"),
        (json!({ "name": "A", "password": "pw" }), StatusCode::BAD_REQUEST, "Email is required"),
        (json!({ "name": "A", "email": "a@x.test" }), StatusCode::BAD_REQUEST, "Password is required"),
        (
            json!({ "name": "A", "email": "a@x.test", "password": "pw", "role": "overlord" }),
            StatusCode::BAD_REQUEST,
            "Invalid role",
        ),
        (
            json!({ "name": "G", "email": "gina@x.test", "password": "pw" }),
            StatusCode::CONFLICT,
            "email already in use",
        ),
    ];

    for (body, status, message) in cases {
        let res = srv
            .client
            .post(srv.url("/users/register"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), status, "{body}");
        assert_eq!(error_of(res).await["error"], message);
    }

    let res = srv
        .client
        .post(srv.url("/users/register"))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await["error"], "Invalid request body");
}

#[tokio::test]
async fn new_users_default_to_active_user_role() {
    let srv = TestServer::spawn().await;
    let user = srv.register("Hank", "hank@x.test", "pw12345", None).await;
    assert_eq!(user["role"], "user");
    assert_eq!(user["status"], "active");
    assert!(user.get("password").is_none());
}

#[tokio::test]
async fn wrong_password_is_rejected_at_login() {
    let srv = TestServer::spawn().await;
    srv.register("Ivy", "ivy@x.test", "pw12345", None).await;

    for (email, password) in [("ivy@x.test", "nope"), ("ghost@x.test", "pw12345")] {
        let res = srv
            .client
            .post(srv.url("/users/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_of(res).await["error"], "invalid email or password");
    }
}

#[tokio::test]
async fn user_lookup_routes() {
    let srv = TestServer::spawn().await;
    let (id, access, _) = srv.account("jack@x.test", None).await;

    let res = srv.get(&format!("/users/{id}"), &access).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap()["email"], "jack@x.test");

    let res = srv.get("/users/email?email=jack@x.test", &access).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap()["id"], id.as_str());

    let res = srv.get("/users/email", &access).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv.get("/users/status?status=active", &access).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap().as_array().unwrap().len(), 1);

    let res = srv.get("/users/status?status=sleepy", &access).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await["error"], "Invalid status");

    let res = srv.get("/users/not-a-uuid", &access).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await["error"], "Invalid ID");

    let res = srv.get(&format!("/users/{}", petparadise_core::UserId::new()), &access).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(res).await["error"], "User not found");
}

#[tokio::test]
async fn profile_updates_are_self_or_admin() {
    let srv = TestServer::spawn().await;
    let (kim, kim_access, _) = srv.account("kim@x.test", None).await;
    let (_, lee_access, _) = srv.account("lee@x.test", None).await;
    let (_, admin, _) = srv.account("root@x.test", Some("admin")).await;

    let res = srv
        .client
        .put(srv.url(&format!("/users/{kim}")))
        .bearer_auth(&kim_access)
        .json(&json!({ "phone": "555-0100", "address": "1 Main St" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["phone"], "555-0100");
    assert_eq!(body["address"], "1 Main St");

    let res = srv
        .client
        .put(srv.url(&format!("/users/{kim}")))
        .bearer_auth(&lee_access)
        .json(&json!({ "name": "Mallory" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .put(srv.url(&format!("/users/{kim}")))
        .bearer_auth(&admin)
        .json(&json!({ "email": "lee@x.test" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn password_change_requires_the_old_password() {
    let srv = TestServer::spawn().await;
    let (id, access, _) = srv.account("max@x.test", None).await;
    let path = format!("/users/{id}/password");

    let res = srv
        .client
        .post(srv.url(&path))
        .bearer_auth(&access)
        .json(&json!({ "old_password": "wrong", "new_password": "newpw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(res).await["error"], "incorrect password");

    let res = srv
        .client
        .post(srv.url(&path))
        .bearer_auth(&access)
        .json(&json!({ "old_password": "pw12345", "new_password": "newpw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    srv.login("max@x.test", "newpw").await;
}

#[tokio::test]
async fn admin_routes_manage_roles_and_accounts() {
    let srv = TestServer::spawn().await;
    let (nia, nia_access, _) = srv.account("nia@x.test", None).await;
    let (_, admin, _) = srv.account("root@x.test", Some("admin")).await;

    let res = srv
        .client
        .patch(srv.url(&format!("/users/{nia}/role")))
        .bearer_auth(&nia_access)
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .patch(srv.url(&format!("/users/{nia}/role")))
        .bearer_auth(&admin)
        .json(&json!({ "role": "vet" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap()["role"], "vet");

    let res = srv
        .client
        .delete(srv.url(&format!("/users/{nia}")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = srv.get(&format!("/users/{nia}"), &admin).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn revoke_tokens_is_self_or_admin() {
    let srv = TestServer::spawn().await;
    let (olga, olga_access, _) = srv.account("olga@x.test", None).await;
    let (_, pat_access, _) = srv.account("pat@x.test", None).await;
    let (_, admin, _) = srv.account("root@x.test", Some("admin")).await;
    let path = format!("/users/{olga}/revoke-tokens");

    let res = srv.client.post(srv.url(&path)).bearer_auth(&olga_access).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.client.post(srv.url(&path)).bearer_auth(&pat_access).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_of(res).await["error"], "Insufficient permissions");

    let unknown = format!("/users/{}/revoke-tokens", petparadise_core::UserId::new());
    let res = srv.client.post(srv.url(&unknown)).bearer_auth(&admin).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(res).await["error"], "User not found");
}

// ─────────────────────────────────────────────────────────────────────────────
// Pets, adoptions, donations
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pet_lifecycle() {
    let srv = TestServer::spawn().await;
    let (_, user, _) = srv.account("quinn@x.test", None).await;
    let (_, vet, _) = srv.account("vet@x.test", Some("vet")).await;
    let new_pet = json!({ "name": "Rex", "species": "dog", "breed": "lab", "age": 3 });

    let res = srv.client.post(srv.url("/pets/")).bearer_auth(&user).json(&new_pet).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv.client.post(srv.url("/pets")).json(&new_pet).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv.client.post(srv.url("/pets/")).bearer_auth(&vet).json(&new_pet).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let pet: Value = res.json().await.unwrap();
    assert_eq!(pet["status"], "available");
    let id = pet["id"].as_str().unwrap().to_string();

    let res = srv.client.get(srv.url(&format!("/pets/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.client.get(srv.url("/pets/status?status=available")).send().await.unwrap();
    assert_eq!(res.json::<Value>().await.unwrap().as_array().unwrap().len(), 1);

    let res = srv
        .client
        .put(srv.url(&format!("/pets/{id}")))
        .bearer_auth(&vet)
        .json(&json!({ "age": -1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await["error"], "Age must be a positive number");

    let res = srv
        .client
        .patch(srv.url(&format!("/pets/{id}/status")))
        .bearer_auth(&vet)
        .json(&json!({ "status": "medical_care" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap()["status"], "medical_care");

    let res = srv.client.delete(srv.url(&format!("/pets/{id}"))).bearer_auth(&vet).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = srv.client.get(srv.url(&format!("/pets/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_of(res).await["error"], "Pet not found");

    let res = srv.client.get(srv.url("/pets/123")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await["error"], "Invalid ID");
}

#[tokio::test]
async fn adoption_requests_are_owner_or_staff() {
    let srv = TestServer::spawn().await;
    let (rita, rita_access, _) = srv.account("rita@x.test", None).await;
    let (_, sam_access, _) = srv.account("sam@x.test", None).await;
    let (_, volunteer, _) = srv.account("vol@x.test", Some("volunteer")).await;

    let res = srv
        .client
        .post(srv.url("/pets"))
        .bearer_auth(&volunteer)
        .json(&json!({ "name": "Tom", "species": "cat", "age": 2 }))
        .send()
        .await
        .unwrap();
    let pet_id = res.json::<Value>().await.unwrap()["id"].as_str().unwrap().to_string();

    let res = srv
        .client
        .post(srv.url("/adoptions/"))
        .bearer_auth(&rita_access)
        .json(&json!({ "pet_id": petparadise_core::PetId::new().to_string() }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv
        .client
        .post(srv.url("/adoptions/"))
        .bearer_auth(&rita_access)
        .json(&json!({ "pet_id": pet_id, "documents": ["id.pdf"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let adoption: Value = res.json().await.unwrap();
    assert_eq!(adoption["status"], "pending");
    assert_eq!(adoption["user_id"], rita.as_str());
    let id = adoption["id"].as_str().unwrap().to_string();

    assert_eq!(srv.get(&format!("/adoptions/{id}"), &rita_access).await.status(), StatusCode::OK);
    assert_eq!(srv.get(&format!("/adoptions/{id}"), &sam_access).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(srv.get(&format!("/adoptions/{id}"), &volunteer).await.status(), StatusCode::OK);

    let res = srv.get(&format!("/adoptions/user/{rita}"), &rita_access).await;
    assert_eq!(res.json::<Value>().await.unwrap().as_array().unwrap().len(), 1);
    assert_eq!(
        srv.get(&format!("/adoptions/user/{rita}"), &sam_access).await.status(),
        StatusCode::FORBIDDEN
    );

    let res = srv
        .client
        .put(srv.url(&format!("/adoptions/{id}")))
        .bearer_auth(&volunteer)
        .json(&json!({ "status": "approved" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["status"], "approved");
    assert_eq!(updated["documents"], json!(["id.pdf"]));

    let res = srv
        .client
        .put(srv.url(&format!("/adoptions/{id}")))
        .bearer_auth(&rita_access)
        .json(&json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn donations_are_owner_or_admin() {
    let srv = TestServer::spawn().await;
    let (tess, tess_access, _) = srv.account("tess@x.test", None).await;
    let (_, uma_access, _) = srv.account("uma@x.test", None).await;
    let (_, admin, _) = srv.account("root@x.test", Some("admin")).await;

    let res = srv
        .client
        .post(srv.url("/donations/"))
        .bearer_auth(&tess_access)
        .json(&json!({ "amount": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await["error"], "Amount must be greater than zero");

    let res = srv
        .client
        .post(srv.url("/donations"))
        .bearer_auth(&tess_access)
        .json(&json!({ "amount": 25.5, "comment": "for the cats", "anonymous": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let donation: Value = res.json().await.unwrap();
    assert_eq!(donation["status"], "pending");
    assert_eq!(donation["user_id"], tess.as_str());
    let id = donation["id"].as_str().unwrap().to_string();

    assert_eq!(srv.get(&format!("/donations/{id}"), &tess_access).await.status(), StatusCode::OK);
    assert_eq!(srv.get(&format!("/donations/{id}"), &uma_access).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(srv.get("/donations/", &tess_access).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(srv.get("/donations/", &admin).await.status(), StatusCode::OK);

    let res = srv
        .client
        .patch(srv.url(&format!("/donations/{id}/status")))
        .bearer_auth(&admin)
        .json(&json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap()["status"], "completed");

    let res = srv.get(&format!("/donations/user/{tess}"), &tess_access).await;
    assert_eq!(res.json::<Value>().await.unwrap().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn system_routes_are_public() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap()["status"], "ok");

    let res = srv.client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("Pet Paradise"));
}
