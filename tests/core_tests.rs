// tests/core_tests.rs

mod common;

use common::MemoryStore;
use homely::models::plan::{self, PlanName};
use homely::storage::{ObjectStore, PRESIGN_TTL_SECS, property_image_key};
use homely::utils::jwt::{TokenPurpose, sign_token, verify_token};

const SECRET: &str = "test_secret_for_integration_tests";

#[test]
fn a_verification_token_is_not_a_session() {
    // Arrange: the token a registration email would carry
    let token = sign_token("ada@example.com", TokenPurpose::Verify, 600, SECRET).unwrap();

    // Act / Assert: it opens the activation door and no other
    assert_eq!(
        verify_token(&token, TokenPurpose::Verify, SECRET).unwrap(),
        "ada@example.com"
    );
    assert!(verify_token(&token, TokenPurpose::Access, SECRET).is_err());
    assert!(verify_token(&token, TokenPurpose::Reset, SECRET).is_err());
}

#[test]
fn reset_tokens_expire_on_their_own_clock() {
    // Arrange: a reset token whose lifetime has already passed
    let stale = sign_token("ada@example.com", TokenPurpose::Reset, -3600, SECRET).unwrap();
    let fresh = sign_token("ada@example.com", TokenPurpose::Reset, 600, SECRET).unwrap();

    // Assert
    assert!(verify_token(&stale, TokenPurpose::Reset, SECRET).is_err());
    assert!(verify_token(&fresh, TokenPurpose::Reset, SECRET).is_ok());
}

#[test]
fn the_plan_staircase_walks_basic_to_premium() {
    // Arrange
    let mut current = PlanName::default();
    assert_eq!(current, PlanName::Basic);

    // Act: climb until the top
    let mut quotas = vec![plan::quota_for(current)];
    while let Some(next) = current.next() {
        current = next;
        quotas.push(plan::quota_for(current));
    }

    // Assert: two steps, strictly growing quotas, nowhere further to go
    assert_eq!(current, PlanName::Premium);
    assert_eq!(quotas, vec![2, 7, 12]);
    assert!(current.next().is_none());
}

#[tokio::test]
async fn deleting_a_listing_means_deleting_every_image_object() {
    // Arrange: a property with three stored images
    let store = MemoryStore::default();
    let owner = uuid::Uuid::new_v4().simple().to_string();
    let property = uuid::Uuid::new_v4().simple().to_string();

    let keys: Vec<String> = ["front.jpg", "kitchen.jpg", "garden.jpg"]
        .iter()
        .map(|f| property_image_key(&owner, &property, f))
        .collect();

    for key in &keys {
        store.put(key, vec![0u8; 16], "image/jpeg").await.unwrap();
    }
    assert_eq!(store.objects.lock().unwrap().len(), 3);

    // Act: the delete path attempts every key
    for key in &keys {
        store.delete(key).await.unwrap();
    }

    // Assert: one delete per key, store left empty
    let deletes = store.deletes.lock().unwrap();
    assert_eq!(deletes.len(), 3);
    for key in &keys {
        assert!(deletes.contains(key));
    }
    assert!(store.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn presigned_urls_are_generated_per_read() {
    // Arrange
    let store = MemoryStore::default();
    let key = property_image_key("owner", "prop", "front.jpg");
    store.put(&key, vec![1, 2, 3], "image/jpeg").await.unwrap();

    // Act: two reads, two fresh URLs
    let first = store.presign_get(&key, PRESIGN_TTL_SECS).await.unwrap();
    let second = store.presign_get(&key, PRESIGN_TTL_SECS).await.unwrap();

    // Assert
    assert!(first.contains(&key));
    assert!(first.contains("expires=3600"));
    assert_eq!(first, second);
    assert_eq!(store.presigns.lock().unwrap().len(), 2);
}

#[test]
fn image_keys_never_collide_across_owners() {
    // Two owners uploading the same filename for listings with the same name
    let key_a = property_image_key("owner-a", "prop-1", "front.jpg");
    let key_b = property_image_key("owner-b", "prop-1", "front.jpg");

    assert_ne!(key_a, key_b);
    assert!(key_a.starts_with("properties/owner-a/"));
    assert!(key_b.starts_with("properties/owner-b/"));
}
