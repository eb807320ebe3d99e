//! Contract suite for the `/posts` resource of the JSONPlaceholder mock API.
//!
//! Expectations describe the mock as it behaves, quirks included: writes are
//! echoed but never persisted, unknown ids on DELETE still return `200 {}`,
//! and PUT to an unknown post fails with `500`.

use apicheck_domain::{
    BodyMatcher, HeaderMatcher, JsonKind, LengthOperator, Suite, TestCase,
};
use serde_json::{Value, json};

/// Latency budget checked by the "Verify API Response Time" cases.
pub const RESPONSE_TIME_BUDGET_MS: u64 = 2_000;

/// Length of the body sent by the large payload case.
pub const LARGE_BODY_LEN: usize = 100_000;

const SPECIAL_CHARS: &str = r#"!@#$%^&*(){}[]_+=|;:"<>,.?/"#;
const SQL_INJECTION: &str = "1; DROP TABLE users";

/// Builds the complete posts suite.
#[must_use]
pub fn suite() -> Suite {
    Suite::new("posts")
        .with_group("GET › positive", get_positive())
        .with_group("GET › negative", get_negative())
        .with_group("POST › positive", post_positive())
        .with_group("POST › negative", post_negative())
        .with_group("PUT › positive", put_positive())
        .with_group("PUT › negative", put_negative())
        .with_group("DELETE › positive", delete_positive())
        .with_group("DELETE › negative", delete_negative())
}

/// Matchers asserting every key of `fields` is echoed with the same value.
fn echoes(fields: &Value) -> Vec<BodyMatcher> {
    fields
        .as_object()
        .map(|map| {
            map.iter()
                .map(|(key, value)| BodyMatcher::field_equals(key.as_str(), value.clone()))
                .collect()
        })
        .unwrap_or_default()
}

fn absent(fields: &[&str]) -> Vec<BodyMatcher> {
    fields.iter().map(|f| BodyMatcher::field_absent(*f)).collect()
}

fn not_found(name: &str, id: &str) -> TestCase {
    TestCase::get(name, "/posts/{id}")
        .param("id", id)
        .expect_status(404)
        .expect_body(BodyMatcher::empty_object())
}

fn deleted(name: &str, id: &str) -> TestCase {
    TestCase::delete(name, "/posts/{id}")
        .param("id", id)
        .expect_body(BodyMatcher::empty_object())
}

fn get_positive() -> Vec<TestCase> {
    vec![
        TestCase::get("Retrieve all posts from the endpoint", "/posts")
            .expect_header(HeaderMatcher::json_content_type())
            .expect_body(BodyMatcher::is_array())
            .expect_body(BodyMatcher::length(LengthOperator::GreaterThan, 0)),
        TestCase::get("Retrieve a specific post by its ID", "/posts/{id}")
            .param("id", "1")
            .expect_bodies([
                BodyMatcher::has_field("userId"),
                BodyMatcher::has_field("id"),
                BodyMatcher::has_field("title"),
                BodyMatcher::has_field("body"),
                BodyMatcher::field_equals("userId", 1),
                BodyMatcher::field_equals("id", 1),
                BodyMatcher::field_type("title", JsonKind::String),
                BodyMatcher::field_type("body", JsonKind::String),
                BodyMatcher::field_not_null("title"),
                BodyMatcher::field_not_null("body"),
            ]),
        TestCase::get("Retrieve posts with query parameters", "/posts")
            .query("userId", "1")
            .expect_body(BodyMatcher::is_array())
            .expect_body(BodyMatcher::length(LengthOperator::GreaterThan, 0))
            .expect_body(BodyMatcher::each(BodyMatcher::field_equals("userId", 1))),
        TestCase::get("Verify API Response Time", "/posts/{id}")
            .param("id", "1")
            .within_ms(RESPONSE_TIME_BUDGET_MS),
    ]
}

fn get_negative() -> Vec<TestCase> {
    vec![
        not_found("Retrieve a non-existent post by ID", "9999999999"),
        TestCase::get("Retrieve posts with non-existent userId query parameter", "/posts")
            .query("userId", "1000000")
            .expect_body(BodyMatcher::is_array())
            .expect_body(BodyMatcher::length(LengthOperator::Equals, 0)),
        not_found("Retrieve post with string ID", "qwerty"),
        not_found("Retrieve post with special symbols in ID", "!@#$%^&*()"),
        not_found("Retrieve post with SQL injection attempt", SQL_INJECTION),
    ]
}

fn post_positive() -> Vec<TestCase> {
    let valid = json!({
        "title": "New Post",
        "body": "The body of new post",
        "userId": 1,
    });
    let minimal = json!({"title": "Minimal Post", "userId": 1});

    vec![
        TestCase::post("Create a post with valid data", "/posts")
            .json_body(valid.clone())
            .expect_status(201)
            .expect_header(HeaderMatcher::json_content_type())
            .expect_body(BodyMatcher::has_field("id"))
            .expect_bodies(echoes(&valid)),
        TestCase::post("Create a post with minimal required data", "/posts")
            .json_body(minimal.clone())
            .expect_status(201)
            .expect_body(BodyMatcher::has_field("id"))
            .expect_bodies(echoes(&minimal))
            .expect_body(BodyMatcher::field_falsy("body")),
        TestCase::post("Verify API Response Time", "/posts")
            .json_body(json!({
                "title": "New Post",
                "body": "The body of the new post",
                "userId": 1,
            }))
            .expect_status(201)
            .within_ms(RESPONSE_TIME_BUDGET_MS),
    ]
}

fn post_negative() -> Vec<TestCase> {
    let extra = json!({
        "title": "New Post",
        "extrafield": "Extra field",
        "body": "The body of the new post",
        "userId": 1,
    });
    let special = json!({
        "title": format!("Title {SPECIAL_CHARS}"),
        "body": format!("Body {SPECIAL_CHARS}"),
        "userId": 1,
    });

    vec![
        TestCase::post("Send an empty request body", "/posts")
            .json_body(json!({}))
            .expect_status(201)
            .expect_body(BodyMatcher::has_field("id"))
            .expect_bodies(absent(&["title", "body", "userId"])),
        TestCase::post("Send a post with invalid data types", "/posts")
            .json_body(json!({
                "title": 123_456_789,
                "body": false,
                "userId": "not-a-number",
            }))
            .expect_status(201)
            .expect_bodies([
                BodyMatcher::field_type("title", JsonKind::Number),
                BodyMatcher::field_type("body", JsonKind::Boolean),
                BodyMatcher::field_type("userId", JsonKind::String),
            ]),
        TestCase::post("Send a request body with extra field", "/posts")
            .json_body(extra.clone())
            .expect_status(201)
            .expect_body(BodyMatcher::has_field("id"))
            .expect_bodies(echoes(&extra)),
        TestCase::post("Send a post with missing required fields", "/posts")
            .json_body(json!({"body": "The post without title"}))
            .expect_status(201)
            .expect_body(BodyMatcher::has_field("id"))
            .expect_body(BodyMatcher::field_absent("title"))
            .expect_body(BodyMatcher::field_equals("body", "The post without title")),
        TestCase::post("Send a post with special characters", "/posts")
            .json_body(special.clone())
            .expect_status(201)
            .expect_body(BodyMatcher::has_field("id"))
            .expect_body(BodyMatcher::field_equals("title", special["title"].clone()))
            .expect_body(BodyMatcher::field_equals("body", special["body"].clone())),
        TestCase::post("Send a post with large payload", "/posts")
            .json_body(json!({
                "title": "Large payload test",
                "body": "a".repeat(LARGE_BODY_LEN),
                "userId": 1,
            }))
            .expect_status(201)
            .expect_body(BodyMatcher::has_field("id"))
            .expect_body(BodyMatcher::field_length(
                "body",
                LengthOperator::Equals,
                LARGE_BODY_LEN,
            )),
        TestCase::post("Send a post with SQL injection attempt", "/posts")
            .json_body(json!({
                "title": "SQL Injection",
                "body": "SQL Injection attempt",
                "userId": SQL_INJECTION,
            }))
            .expect_status(201)
            .expect_body(BodyMatcher::has_field("id"))
            .expect_body(BodyMatcher::field_equals("userId", SQL_INJECTION)),
        TestCase::post("Send a post to a non-existent endpoint", "/invalid-endpoint")
            .json_body(json!({
                "title": "Invalid endpoint test",
                "body": "Body of invalid endpoint test",
                "userId": 1,
            }))
            .expect_status(404),
    ]
}

fn put_positive() -> Vec<TestCase> {
    let full = json!({
        "id": 1,
        "title": "Updated title",
        "body": "The updated body",
        "userId": 1,
    });

    vec![
        TestCase::put("Update an existing post with valid data", "/posts/{id}")
            .param("id", "1")
            .json_body(full.clone())
            .expect_header(HeaderMatcher::json_content_type())
            .expect_bodies(echoes(&full)),
        TestCase::put("Update only some fields of a post", "/posts/{id}")
            .param("id", "1")
            .json_body(json!({"id": 1, "title": "Partialy updated title"}))
            .expect_body(BodyMatcher::field_equals("id", 1))
            .expect_body(BodyMatcher::field_equals("title", "Partialy updated title"))
            .expect_bodies(absent(&["body", "userId"])),
        TestCase::put("Verify API Response Time", "/posts/{id}")
            .param("id", "1")
            .json_body(full)
            .within_ms(RESPONSE_TIME_BUDGET_MS),
    ]
}

fn put_negative() -> Vec<TestCase> {
    let special = json!({
        "id": 1,
        "title": format!("Title with Special Characters {SPECIAL_CHARS}"),
        "body": r#"Body containing <script>alert("XSS")</script>"#,
        "userId": 1,
    });

    vec![
        // The mock answers PUT on an unknown post with a 500 error page.
        TestCase::put("Update non-existing post", "/posts/{id}")
            .param("id", "999999999")
            .json_body(json!({
                "id": 1,
                "title": "The title for non-existing post",
                "body": "The body for non-existing post",
                "userId": 1,
            }))
            .expect_status(500)
            .allow_non_json(),
        TestCase::put("Update a post with missing required fields", "/posts/{id}")
            .param("id", "1")
            .json_body(json!({}))
            .expect_body(BodyMatcher::field_equals("id", 1))
            .expect_bodies(absent(&["title", "body", "userId"])),
        TestCase::put("Send a PUT request with invalid data types", "/posts/{id}")
            .param("id", "1")
            .json_body(json!({
                "id": "not-a-number",
                "title": 123_456_789,
                "body": true,
                "userId": "invalid-user-id",
            }))
            .expect_bodies([
                BodyMatcher::field_type("id", JsonKind::Number),
                BodyMatcher::field_type("title", JsonKind::Number),
                BodyMatcher::field_type("body", JsonKind::Boolean),
                BodyMatcher::field_type("userId", JsonKind::String),
            ]),
        TestCase::put("Send a PUT request with special characters", "/posts/{id}")
            .param("id", "1")
            .json_body(special.clone())
            .expect_bodies(echoes(&special)),
    ]
}

fn delete_positive() -> Vec<TestCase> {
    vec![
        deleted("Delete an existing post", "1"),
        deleted("Delete with query parameters", "1").query("userId", "1"),
        TestCase::delete("Verify API Response Time", "/posts/{id}")
            .param("id", "1")
            .within_ms(RESPONSE_TIME_BUDGET_MS),
    ]
}

fn delete_negative() -> Vec<TestCase> {
    vec![
        deleted("Delete non-existing post", "999999999"),
        deleted("Delete post with invalid ID", "invalid-id"),
        // Already percent-encoded; sent verbatim rather than encoded twice.
        TestCase::delete("Delete a post using special characters in ID", "/posts/%21%40%23%24")
            .expect_body(BodyMatcher::empty_object()),
        deleted("Delete with extra query parameters", "1").query("extraParameter", "testValue"),
        TestCase::delete("Delete with missing ID in the URL", "/posts/")
            .expect_status(404)
            .allow_non_json(),
    ]
}
