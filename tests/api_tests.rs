// tests/api_tests.rs

mod common;

use common::spawn_app;

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn plan_catalog_is_served() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/api/plans", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let plans: Vec<serde_json::Value> = response.json().await.expect("Failed to parse body");
    assert_eq!(plans.len(), 3);
    assert_eq!(plans[0]["name"], "Basic");
    assert_eq!(plans[0]["max_house"], 2);
    assert_eq!(plans[2]["name"], "Premium");
    assert_eq!(plans[2]["max_house"], 12);
}

#[tokio::test]
async fn unknown_plan_is_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let ok = client
        .get(&format!("{}/api/plans/Premium", address))
        .send()
        .await
        .expect("Failed to execute request");
    let missing = client
        .get(&format!("{}/api/plans/Gold", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(ok.status().as_u16(), 200);
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn protected_routes_reject_missing_and_garbage_tokens() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: no Authorization header at all
    let missing = client
        .get(&format!("{}/api/users/me", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Act: a token that was never signed by us
    let garbage = client
        .get(&format!("{}/api/wishlist", address))
        .header("Authorization", "Bearer not.a.token")
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(missing.status().as_u16(), 401);
    assert_eq!(garbage.status().as_u16(), 401);
}

#[tokio::test]
async fn register_fails_validation() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: password has no uppercase letter or digit
    let response = client
        .post(&format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "weakpassword",
            "phone_number": "+2348012345678"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn register_rejects_malformed_email() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .post(&format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "name": "Ada",
            "email": "not-an-email",
            "password": "Passw0rd!",
            "phone_number": "+2348012345678"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn verify_email_rejects_invalid_token() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!(
            "{}/api/auth/verify-email?token=definitely-not-valid",
            address
        ))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn reset_password_rejects_weak_replacement() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: validation runs before the token is even inspected
    let response = client
        .post(&format!("{}/api/auth/reset-password", address))
        .json(&serde_json::json!({
            "token": "irrelevant",
            "new_password": "short"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}
