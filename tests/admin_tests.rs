// tests/admin_tests.rs

use avtotest_backend::{config::Config, routes, state::AppState};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "admin_test_secret".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_username: None,
        admin_password: None,
        sweep_interval_secs: 3600,
        single_session_policy: false,
    }
}

async fn spawn_app() -> (String, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let state = AppState {
        pool: pool.clone(),
        config: test_config(),
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

/// Registers a user, optionally promotes to admin directly in the database,
/// then logs in. Returns (token, user_id).
async fn login_as(
    address: &str,
    pool: &SqlitePool,
    client: &reqwest::Client,
    admin: bool,
) -> (String, i64) {
    let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    let created: serde_json::Value = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({"username": username, "password": "password123"}))
        .send()
        .await
        .expect("Register failed")
        .json()
        .await
        .expect("Failed to parse register json");
    let user_id = created["id"].as_i64().expect("id missing");

    if admin {
        sqlx::query("UPDATE users SET role = 'admin' WHERE id = ?")
            .bind(user_id)
            .execute(pool)
            .await
            .unwrap();
    }

    let login: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({"username": username, "password": "password123"}))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    (login["token"].as_str().unwrap().to_string(), user_id)
}

#[tokio::test]
async fn admin_routes_require_the_admin_role() {
    // Arrange
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_token, _) = login_as(&address, &pool, &client, false).await;

    // Act
    let response = client
        .post(format!("{}/api/admin/topics", address))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&serde_json::json!({"name_uzl": "Chorrahalar"}))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn question_crud_flow() {
    // Arrange
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (admin_token, _) = login_as(&address, &pool, &client, true).await;

    let topic: serde_json::Value = client
        .post(format!("{}/api/admin/topics", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({"name_uzl": "Chorrahalar", "name_ru": "Перекрёстки"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let topic_id = topic["id"].as_i64().unwrap();

    // Act: create a question with a hostile explanation.
    let question: serde_json::Value = client
        .post(format!("{}/api/admin/questions", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "topic_id": topic_id,
            "content_uzl": "Qaysi belgi to'xtashni taqiqlaydi?",
            "options_uzl": ["1-belgi", "2-belgi", "3-belgi"],
            "correct_option_index": 1,
            "explanation_uzl": "<b>2-belgi</b><script>alert(1)</script>",
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let question_id = question["id"].as_i64().unwrap();

    // Assert: the explanation was sanitized on the way in.
    let explanation: String =
        sqlx::query_scalar("SELECT explanation_uzl FROM questions WHERE id = ?")
            .bind(question_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(explanation.contains("<b>2-belgi</b>"));
    assert!(!explanation.contains("script"));

    // An out-of-bounds correct index is rejected.
    let response = client
        .post(format!("{}/api/admin/questions", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "topic_id": topic_id,
            "content_uzl": "Savol",
            "options_uzl": ["A", "B"],
            "correct_option_index": 5,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Update, then soft-delete.
    let response = client
        .put(format!("{}/api/admin/questions/{}", address, question_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({"content_ru": "Какой знак запрещает остановку?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = client
        .delete(format!("{}/api/admin/questions/{}", address, question_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    // Soft delete: the row survives for historical rendering.
    let is_deleted: bool = sqlx::query_scalar("SELECT is_deleted FROM questions WHERE id = ?")
        .bind(question_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(is_deleted);

    // Deleting again is NotFound.
    let response = client
        .delete(format!("{}/api/admin/questions/{}", address, question_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn package_creation_and_start_honors_declared_count() {
    // Arrange
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (admin_token, _) = login_as(&address, &pool, &client, true).await;
    let (user_token, _) = login_as(&address, &pool, &client, false).await;

    let topic: serde_json::Value = client
        .post(format!("{}/api/admin/topics", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({"name_uzl": "Umumiy"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let topic_id = topic["id"].as_i64().unwrap();

    let mut question_ids = Vec::new();
    for i in 0..5 {
        let question: serde_json::Value = client
            .post(format!("{}/api/admin/questions", address))
            .header("Authorization", format!("Bearer {}", admin_token))
            .json(&serde_json::json!({
                "topic_id": topic_id,
                "content_uzl": format!("Savol {}", i),
                "options_uzl": ["A", "B", "C", "D"],
                "correct_option_index": 0,
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        question_ids.push(question["id"].as_i64().unwrap());
    }

    let package: serde_json::Value = client
        .post(format!("{}/api/admin/packages", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "title_uzl": "Imtihon to'plami",
            "duration_minutes": 20,
            "passing_score": 80.0,
            "question_ids": question_ids,
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let package_id = package["id"].as_i64().unwrap();

    // Act: start it; order and parameters come from the package.
    let view: serde_json::Value = client
        .post(format!("{}/api/exam/package", address))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&serde_json::json!({"package_id": package_id}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let started_ids: Vec<i64> = view["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["question_id"].as_i64().unwrap())
        .collect();
    assert_eq!(started_ids, question_ids);
    assert_eq!(view["duration_minutes"].as_i64().unwrap(), 20);
    assert!((view["passing_score"].as_f64().unwrap() - 80.0).abs() < 1e-9);

    // A question vanishing under the declared count makes later starts fail
    // fast.
    sqlx::query("UPDATE questions SET is_deleted = 1 WHERE id = ?")
        .bind(question_ids[0])
        .execute(&pool)
        .await
        .unwrap();

    let response = client
        .post(format!("{}/api/exam/package", address))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&serde_json::json!({"package_id": package_id}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);

    // An unknown package is NotFound.
    let response = client
        .post(format!("{}/api/exam/package", address))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&serde_json::json!({"package_id": 424242}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn device_limit_is_claimed_atomically_at_login() {
    // Arrange: a user capped to 1 device.
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (admin_token, _) = login_as(&address, &pool, &client, true).await;

    let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let created: serde_json::Value = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({"username": username, "password": "password123"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let user_id = created["id"].as_i64().unwrap();

    let response = client
        .put(format!("{}/api/admin/users/{}/device-limit", address, user_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({"max_devices": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    // Act: first login takes the only slot, the second is refused.
    let login = |client: reqwest::Client, address: String, username: String| async move {
        client
            .post(format!("{}/api/auth/login", address))
            .json(&serde_json::json!({"username": username, "password": "password123"}))
            .send()
            .await
            .unwrap()
    };

    let first = login(client.clone(), address.clone(), username.clone()).await;
    assert_eq!(first.status().as_u16(), 200);
    let token = first.json::<serde_json::Value>().await.unwrap()["token"]
        .as_str()
        .unwrap()
        .to_string();

    let second = login(client.clone(), address.clone(), username.clone()).await;
    assert_eq!(second.status().as_u16(), 409);

    // Logout frees the slot.
    let response = client
        .post(format!("{}/api/auth/logout", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let third = login(client.clone(), address.clone(), username.clone()).await;
    assert_eq!(third.status().as_u16(), 200);
}

#[tokio::test]
async fn bulk_device_default_skips_customized_users() {
    // Arrange: one customized user, one on the default.
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (admin_token, _) = login_as(&address, &pool, &client, true).await;
    let (_, customized_id) = login_as(&address, &pool, &client, false).await;
    let (_, default_id) = login_as(&address, &pool, &client, false).await;

    client
        .put(format!("{}/api/admin/users/{}/device-limit", address, customized_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({"max_devices": 10}))
        .send()
        .await
        .unwrap();

    // Act: change the global default.
    let response = client
        .put(format!("{}/api/admin/device-limit", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({"max_devices": 2}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    // Assert: only the non-customized row moved.
    let customized_max: i64 = sqlx::query_scalar("SELECT max_devices FROM users WHERE id = ?")
        .bind(customized_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(customized_max, 10);

    let default_max: i64 = sqlx::query_scalar("SELECT max_devices FROM users WHERE id = ?")
        .bind(default_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(default_max, 2);
}

#[tokio::test]
async fn ticket_authoring_enforces_minimum_size() {
    // Arrange
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (admin_token, _) = login_as(&address, &pool, &client, true).await;

    let topic: serde_json::Value = client
        .post(format!("{}/api/admin/topics", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({"name_uzl": "Umumiy"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let topic_id = topic["id"].as_i64().unwrap();

    let mut question_ids = Vec::new();
    for i in 0..10 {
        let question: serde_json::Value = client
            .post(format!("{}/api/admin/questions", address))
            .header("Authorization", format!("Bearer {}", admin_token))
            .json(&serde_json::json!({
                "topic_id": topic_id,
                "content_uzl": format!("Savol {}", i),
                "options_uzl": ["A", "B"],
                "correct_option_index": 0,
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        question_ids.push(question["id"].as_i64().unwrap());
    }

    // Act: nine questions is below the fixed-form minimum.
    let response = client
        .post(format!("{}/api/admin/tickets", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({"number": 1, "question_ids": question_ids[..9]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Ten is accepted; the listing shows the live count.
    let response = client
        .post(format!("{}/api/admin/tickets", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({"number": 1, "question_ids": question_ids}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let tickets: serde_json::Value = client
        .get(format!("{}/api/content/tickets", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tickets[0]["number"].as_i64().unwrap(), 1);
    assert_eq!(tickets[0]["question_count"].as_i64().unwrap(), 10);
}

#[tokio::test]
async fn topic_listing_localizes_with_fallback() {
    // Arrange
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    sqlx::query(
        "INSERT INTO topics (name_uzl, name_ru, position) VALUES ('Yo`l belgilari', 'Дорожные знаки', 1)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO topics (name_uzl, position) VALUES ('Chorrahalar', 2)")
        .execute(&pool)
        .await
        .unwrap();

    // Act
    let topics: serde_json::Value = client
        .get(format!("{}/api/content/topics?lang=ru", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert: translated where available, base language otherwise.
    assert_eq!(topics[0]["name"], "Дорожные знаки");
    assert_eq!(topics[1]["name"], "Chorrahalar");
}
