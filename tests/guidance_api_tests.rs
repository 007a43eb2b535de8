// tests/guidance_api_tests.rs

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{app, request, send, three_question_bank, token};

#[tokio::test]
async fn archetype_profile_is_public() {
    let (app, _) = app(three_question_bank());

    let (status, profile) = send(&app, request("GET", "/api/archetypes/Arjuna", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["id"], "Arjuna");
    assert_eq!(profile["summary"], "The conflicted warrior.");
    assert_eq!(profile["strengths"], json!(["Skill under pressure"]));
    assert_eq!(profile["verse_refs"][0], "2.47");
}

#[tokio::test]
async fn archetype_profiles_list_in_declaration_order() {
    let (app, _) = app(three_question_bank());

    let (status, listed) = send(&app, request("GET", "/api/archetypes", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["Arjuna", "Karna"]);
}

#[tokio::test]
async fn unknown_or_missing_archetype_is_404() {
    let (app, _) = app(three_question_bank());

    // Not an archetype at all
    let (status, _) = send(&app, request("GET", "/api/archetypes/Shakuni", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A real archetype without a stored profile
    let (status, body) = send(&app, request("GET", "/api/archetypes/Bhishma", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Archetype not found");
}

#[tokio::test]
async fn problem_area_catalog_is_sorted_by_label() {
    let (app, _) = app(three_question_bank());

    let (status, areas) = send(&app, request("GET", "/api/problem-areas", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    let labels: Vec<&str> = areas
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Anger", "Anxiety", "Grief"]);
}

#[tokio::test]
async fn my_problem_areas_require_token() {
    let (app, _) = app(three_question_bank());

    let (status, _) = send(&app, request("GET", "/api/me/problem-areas", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        request(
            "PUT",
            "/api/me/problem-areas",
            Some(json!({ "problem_area_ids": ["grief"] })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn saving_problem_areas_replaces_previous_selection() {
    // Arrange
    let (app, _) = app(three_question_bank());
    let user = token("user-7", "user");

    // Act: first selection, with a repeat and notes
    let (status, first) = send(
        &app,
        request(
            "PUT",
            "/api/me/problem-areas",
            Some(json!({
                "problem_area_ids": ["grief", "anger", "grief"],
                "notes": "  Lost my father this year<script>x</script>  "
            })),
            Some(&user),
        ),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let first = first.as_array().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0]["id"], "anger");
    assert_eq!(first[1]["id"], "grief");
    assert_eq!(first[1]["notes"], "Lost my father this year");

    // Act: second selection replaces the first
    let (status, _) = send(
        &app,
        request(
            "PUT",
            "/api/me/problem-areas",
            Some(json!({ "problem_area_ids": ["anxiety"] })),
            Some(&user),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, mine) = send(&app, request("GET", "/api/me/problem-areas", None, Some(&user))).await;
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["id"], "anxiety");
    assert!(mine[0]["notes"].is_null());

    // Other users are unaffected
    let (_, theirs) = send(
        &app,
        request("GET", "/api/me/problem-areas", None, Some(&token("user-8", "user"))),
    )
    .await;
    assert_eq!(theirs, json!([]));
}

#[tokio::test]
async fn unknown_problem_area_is_rejected_and_keeps_selection() {
    let (app, _) = app(three_question_bank());
    let user = token("user-9", "user");
    send(
        &app,
        request(
            "PUT",
            "/api/me/problem-areas",
            Some(json!({ "problem_area_ids": ["anger"] })),
            Some(&user),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        request(
            "PUT",
            "/api/me/problem-areas",
            Some(json!({ "problem_area_ids": ["anger", "boredom"] })),
            Some(&user),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown problem area");

    let (_, mine) = send(&app, request("GET", "/api/me/problem-areas", None, Some(&user))).await;
    assert_eq!(mine[0]["id"], "anger");
}

#[tokio::test]
async fn empty_selection_clears_problem_areas() {
    let (app, _) = app(three_question_bank());
    let user = token("user-10", "user");
    send(
        &app,
        request(
            "PUT",
            "/api/me/problem-areas",
            Some(json!({ "problem_area_ids": ["anger", "grief"] })),
            Some(&user),
        ),
    )
    .await;

    let (status, cleared) = send(
        &app,
        request(
            "PUT",
            "/api/me/problem-areas",
            Some(json!({ "problem_area_ids": [] })),
            Some(&user),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared, json!([]));
}
