//! API integration tests
//!
//! Run against a live server with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Unique suffix so repeated runs do not trip the full-name uniqueness rule
fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Clock before epoch")
        .as_nanos()
}

async fn create_book(client: &Client, title: &str, author: &str, year: i32) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": title,
            "author": author,
            "year_of_production": year
        }))
        .send()
        .await
        .expect("Failed to send create book request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No book ID")
}

async fn create_person(client: &Client, full_name: &str, year_of_birth: i32) -> i64 {
    let response = client
        .post(format!("{}/people", BASE_URL))
        .json(&json!({
            "full_name": full_name,
            "year_of_birth": year_of_birth
        }))
        .send()
        .await
        .expect("Failed to send create person request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No person ID")
}

async fn delete_book(client: &Client, id: i64) {
    let _ = client
        .delete(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await;
}

async fn delete_person(client: &Client, id: i64) {
    let _ = client
        .delete(format!("{}/people/{}", BASE_URL, id))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_list_books() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());
    assert!(body["total_pages"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_create_update_and_delete_book() {
    let client = Client::new();
    let book_id = create_book(&client, "Solaris", "Stanislaw Lem", 1961).await;

    // A fresh book is on the shelf and not overdue
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["borrower"].is_null());
    assert!(body["taken_at"].is_null());
    assert_eq!(body["is_overdue"], false);

    // Update bibliographic fields
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .json(&json!({
            "title": "Solaris (2nd ed.)",
            "author": "Stanislaw Lem",
            "year_of_production": 1970
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["title"], "Solaris (2nd ed.)");
    assert_eq!(body["year_of_production"], 1970);

    // Delete
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    // Gone
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_book_validation_rejected_with_field_errors() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "",
            "author": "Nobody",
            "year_of_production": 1925
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["fields"]["title"].is_array());
    assert!(body["fields"]["year_of_production"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_assign_then_release_returns_book_to_shelf() {
    let client = Client::new();
    let suffix = unique_suffix();
    let book_id = create_book(&client, "Roadside Picnic", "Arkady Strugatsky", 1972).await;
    let person_id = create_person(&client, &format!("Taras Melnyk {}", suffix), 1985).await;

    // Assign
    let response = client
        .post(format!("{}/books/{}/assign", BASE_URL, book_id))
        .json(&json!({ "person_id": person_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["borrower"]["id"].as_i64(), Some(person_id));
    assert!(body["taken_at"].is_string());
    assert_eq!(body["is_overdue"], false);

    // Release
    let response = client
        .post(format!("{}/books/{}/release", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["borrower"].is_null());
    assert!(body["taken_at"].is_null());

    delete_book(&client, book_id).await;
    delete_person(&client, person_id).await;
}

#[tokio::test]
#[ignore]
async fn test_assign_rejected_when_book_already_on_loan() {
    let client = Client::new();
    let suffix = unique_suffix();
    let book_id = create_book(&client, "The Master and Margarita", "Mikhail Bulgakov", 1967).await;
    let first_id = create_person(&client, &format!("Olena Shevchenko {}", suffix), 1990).await;
    let second_id = create_person(&client, &format!("Petro Kovalenko {}", suffix), 1975).await;

    let response = client
        .post(format!("{}/books/{}/assign", BASE_URL, book_id))
        .json(&json!({ "person_id": first_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Second assign without a release must conflict
    let response = client
        .post(format!("{}/books/{}/assign", BASE_URL, book_id))
        .json(&json!({ "person_id": second_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // The original loan is untouched
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["borrower"]["id"].as_i64(), Some(first_id));

    delete_book(&client, book_id).await;
    delete_person(&client, first_id).await;
    delete_person(&client, second_id).await;
}

#[tokio::test]
#[ignore]
async fn test_extend_loan_keeps_borrower() {
    let client = Client::new();
    let suffix = unique_suffix();
    let book_id = create_book(&client, "Foundation", "Isaac Asimov", 1951).await;
    let person_id = create_person(&client, &format!("Iryna Bondarenko {}", suffix), 1968).await;

    let response = client
        .post(format!("{}/books/{}/assign", BASE_URL, book_id))
        .json(&json!({ "person_id": person_id }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let taken_at_before = body["taken_at"].as_str().expect("No taken_at").to_string();

    let response = client
        .post(format!("{}/books/{}/extend", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["borrower"]["id"].as_i64(), Some(person_id));
    let taken_at_after = body["taken_at"].as_str().expect("No taken_at");
    assert!(taken_at_after >= taken_at_before.as_str());

    delete_book(&client, book_id).await;
    delete_person(&client, person_id).await;
}

#[tokio::test]
#[ignore]
async fn test_extend_rejected_for_book_on_shelf() {
    let client = Client::new();
    let book_id = create_book(&client, "Hyperion", "Dan Simmons", 1989).await;

    let response = client
        .post(format!("{}/books/{}/extend", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_update_preserves_loan_state() {
    let client = Client::new();
    let suffix = unique_suffix();
    let book_id = create_book(&client, "Neuromancer", "William Gibson", 1984).await;
    let person_id = create_person(&client, &format!("Andriy Tkachenko {}", suffix), 1979).await;

    let response = client
        .post(format!("{}/books/{}/assign", BASE_URL, book_id))
        .json(&json!({ "person_id": person_id }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let taken_at = body["taken_at"].as_str().expect("No taken_at").to_string();

    // Full replacement of bibliographic fields while on loan
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .json(&json!({
            "title": "Neuromancer (reissue)",
            "author": "William Gibson",
            "year_of_production": 2004
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["title"], "Neuromancer (reissue)");
    assert_eq!(body["borrower"]["id"].as_i64(), Some(person_id));
    assert_eq!(body["taken_at"].as_str(), Some(taken_at.as_str()));

    delete_book(&client, book_id).await;
    delete_person(&client, person_id).await;
}

#[tokio::test]
#[ignore]
async fn test_book_search_dispatch() {
    let client = Client::new();
    let suffix = unique_suffix();
    let title = format!("Dune {}", suffix);
    let book_id = create_book(&client, &title, "Frank Herbert", 1965).await;

    // Title prefix only
    let response = client
        .get(format!("{}/books/search", BASE_URL))
        .query(&[("title", title.as_str())])
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body.as_array().map(|a| a.len()), Some(1));

    // Year only
    let response = client
        .get(format!("{}/books/search?year=1965", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body
        .as_array()
        .expect("Expected array")
        .iter()
        .any(|b| b["id"].as_i64() == Some(book_id)));

    // All three fields
    let response = client
        .get(format!("{}/books/search", BASE_URL))
        .query(&[
            ("title", title.as_str()),
            ("author", "Frank"),
            ("year", "1965"),
        ])
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body.as_array().map(|a| a.len()), Some(1));

    // No fields at all: empty list, not an error
    let response = client
        .get(format!("{}/books/search", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body.as_array().map(|a| a.len()), Some(0));

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_person_search_by_name_is_containment() {
    let client = Client::new();
    let suffix = unique_suffix();
    let full_name = format!("Mykola Franko {}", suffix);
    let person_id = create_person(&client, &full_name, 1982).await;

    // A middle-of-name substring must match
    let response = client
        .get(format!("{}/people/search", BASE_URL))
        .query(&[("name", "Franko")])
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body
        .as_array()
        .expect("Expected array")
        .iter()
        .any(|p| p["id"].as_i64() == Some(person_id)));

    // Neither field: empty list
    let response = client
        .get(format!("{}/people/search", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body.as_array().map(|a| a.len()), Some(0));

    delete_person(&client, person_id).await;
}

#[tokio::test]
#[ignore]
async fn test_duplicate_person_name_rejected() {
    let client = Client::new();
    let suffix = unique_suffix();
    let full_name = format!("Oksana Lysenko {}", suffix);
    let person_id = create_person(&client, &full_name, 1970).await;

    let response = client
        .post(format!("{}/people", BASE_URL))
        .json(&json!({
            "full_name": full_name,
            "year_of_birth": 1995
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["fields"]["full_name"].is_array());

    // Only the original record exists
    let response = client
        .get(format!("{}/people/search", BASE_URL))
        .query(&[("name", full_name.as_str())])
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body.as_array().map(|a| a.len()), Some(1));

    delete_person(&client, person_id).await;
}

#[tokio::test]
#[ignore]
async fn test_delete_borrowed_book_keeps_person() {
    let client = Client::new();
    let suffix = unique_suffix();
    let book_id = create_book(&client, "Kobzar", "Taras Shevchenko", 1960).await;
    let person_id = create_person(&client, &format!("Yuriy Honchar {}", suffix), 1988).await;

    let response = client
        .post(format!("{}/books/{}/assign", BASE_URL, book_id))
        .json(&json!({ "person_id": person_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    // The borrower record survives
    let response = client
        .get(format!("{}/people/{}", BASE_URL, person_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["books"].as_array().map(|a| a.len()), Some(0));

    delete_person(&client, person_id).await;
}

#[tokio::test]
#[ignore]
async fn test_delete_person_releases_their_books() {
    let client = Client::new();
    let suffix = unique_suffix();
    let book_id = create_book(&client, "Fahrenheit 451", "Ray Bradbury", 1953).await;
    let person_id = create_person(&client, &format!("Daryna Moroz {}", suffix), 1992).await;

    let response = client
        .post(format!("{}/books/{}/assign", BASE_URL, book_id))
        .json(&json!({ "person_id": person_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .delete(format!("{}/people/{}", BASE_URL, person_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    // The book is back on the shelf, not dangling
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["borrower"].is_null());
    assert!(body["taken_at"].is_null());
    assert_eq!(body["is_overdue"], false);

    delete_book(&client, book_id).await;
}

#[tokio::test]
#[ignore]
async fn test_people_list_includes_loan_counts() {
    let client = Client::new();
    let suffix = unique_suffix();
    let book_id = create_book(&client, "The Left Hand of Darkness", "Ursula K. Le Guin", 1969).await;
    let person_id = create_person(&client, &format!("Lesya Horbach {}", suffix), 1983).await;

    let response = client
        .post(format!("{}/books/{}/assign", BASE_URL, book_id))
        .json(&json!({ "person_id": person_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/people?sort_by_name=true&per_page=1000", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let entry = body["items"]
        .as_array()
        .expect("Expected array")
        .iter()
        .find(|p| p["id"].as_i64() == Some(person_id))
        .expect("Person missing from listing")
        .clone();
    assert_eq!(entry["nb_books"].as_i64(), Some(1));
    assert_eq!(entry["nb_overdue"].as_i64(), Some(0));

    delete_book(&client, book_id).await;
    delete_person(&client, person_id).await;
}
