//! University CRUD tests

use crate::support::{
    assert_status, id_of, module_body, to_json_body, with_test_app, with_test_app_with_config,
    UniversityBuilder,
};
use axum::http::{header, Method, StatusCode};
use serde_json::json;

// ============================================================================
// Create / Read
// ============================================================================

#[tokio::test]
async fn create_returns_location_and_links() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let body = UniversityBuilder::new("Test University").build();
            let (status, headers, bytes) = app
                .request(Method::POST, "/universities", Some(to_json_body(&body)?))
                .await?;
            assert_status(status, StatusCode::CREATED, "create university");

            let created: serde_json::Value = serde_json::from_slice(&bytes)?;
            let id = id_of(&created);
            let location = headers
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            assert_eq!(location, format!("/universities/{id}"));

            assert_eq!(created["name"], "Test University");
            assert_eq!(created["departmentName"], "Computer Science");
            assert_eq!(created["modules"], json!([]));
            assert_eq!(created["_links"]["self"]["href"], location);
            assert_eq!(
                created["_links"]["modules"]["href"],
                format!("/universities/{id}/modules")
            );
            assert_eq!(
                created["_links"]["departmentUrl"]["href"],
                "https://cs.example.edu"
            );

            let (status, fetched) = app.json(Method::GET, location, None).await?;
            assert_status(status, StatusCode::OK, "get university");
            assert_eq!(fetched["country"], "Germany");
            assert_eq!(fetched["nextAutumnSemesterStart"], "2025-09-01");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn missing_university_is_404_with_json_error() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, body) = app.json(Method::GET, "/universities/999", None).await?;
            assert_status(status, StatusCode::NOT_FOUND, "get missing university");
            assert_eq!(body["status"], 404);
            assert_eq!(body["error"], "not-found");
            assert_eq!(body["message"], "University 999 not found");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn non_numeric_id_is_bad_request() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, body) = app.json(Method::GET, "/universities/abc", None).await?;
            assert_status(status, StatusCode::BAD_REQUEST, "non-numeric id");
            assert_eq!(body["error"], "validation");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn invalid_fields_are_rejected() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            for (field, value) in [
                ("maxOutgoingStudents", json!(-1)),
                ("departmentUrl", json!("not a url")),
                ("nextSpringSemesterStart", json!("March 2025")),
            ] {
                let body = UniversityBuilder::new("Invalid").field(field, value).build();
                let (status, error) = app
                    .json(Method::POST, "/universities", Some(&body))
                    .await?;
                assert_status(status, StatusCode::BAD_REQUEST, field);
                assert_eq!(error["error"], "validation");
            }

            let (status, _headers, _body) = app
                .request(
                    Method::POST,
                    "/universities",
                    Some(b"{\"name\": ".to_vec()),
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "malformed JSON");

            let (_status, list) = app.json(Method::GET, "/universities", None).await?;
            assert_eq!(list["page"]["totalElements"], 0);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn create_with_nested_modules_persists_them() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let body = UniversityBuilder::new("Nested")
                .modules(json!([
                    { "name": "Algorithms", "semester": 1, "creditPoints": 6 },
                    { "name": "Databases", "semester": 2, "creditPoints": 5 }
                ]))
                .build();
            let created = app.create_university(&body).await?;
            let id = id_of(&created);

            let modules = created["modules"].as_array().cloned().unwrap_or_default();
            assert_eq!(modules.len(), 2);
            for module in &modules {
                assert_eq!(module["university"]["id"], id);
            }

            let (status, owned) = app
                .json(Method::GET, &format!("/universities/{id}/modules"), None)
                .await?;
            assert_status(status, StatusCode::OK, "list owned modules");
            let names: Vec<&str> = owned["_embedded"]["modules"]
                .as_array()
                .map(|a| a.iter().filter_map(|m| m["name"].as_str()).collect())
                .unwrap_or_default();
            assert_eq!(names, vec!["Algorithms", "Databases"]);
            Ok(())
        })
    })
    .await
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn update_name_only_keeps_other_fields() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let original = UniversityBuilder::new("Old Name").build();
            let created = app.create_university(&original).await?;
            let id = id_of(&created);

            let mut changed = original.clone();
            changed["name"] = json!("New Name");
            let (status, updated) = app
                .json(Method::PUT, &format!("/universities/{id}"), Some(&changed))
                .await?;
            assert_status(status, StatusCode::OK, "update university");
            assert_eq!(updated["id"], id);

            let (_status, fetched) = app
                .json(Method::GET, &format!("/universities/{id}"), None)
                .await?;
            assert_eq!(fetched["name"], "New Name");
            for field in [
                "country",
                "departmentName",
                "departmentUrl",
                "contactPerson",
                "maxOutgoingStudents",
                "maxIncomingStudents",
                "nextSpringSemesterStart",
                "nextAutumnSemesterStart",
            ] {
                assert_eq!(fetched[field], original[field], "field {field} changed");
            }
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn update_is_full_overwrite() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let created = app
                .create_university(&UniversityBuilder::new("Full").build())
                .await?;
            let id = id_of(&created);

            let (status, updated) = app
                .json(
                    Method::PUT,
                    &format!("/universities/{id}"),
                    Some(&json!({ "name": "Full" })),
                )
                .await?;
            assert_status(status, StatusCode::OK, "overwrite university");
            assert_eq!(updated["country"], "");
            assert_eq!(updated["contactPerson"], serde_json::Value::Null);
            assert_eq!(updated["maxOutgoingStudents"], 0);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn update_missing_university_is_404_by_default() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let body = UniversityBuilder::new("Ghost").build();
            let (status, _body) = app
                .json(Method::PUT, "/universities/77", Some(&body))
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "update missing university");

            let (status, _body) = app.json(Method::GET, "/universities/77", None).await?;
            assert_status(status, StatusCode::NOT_FOUND, "nothing was created");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn update_missing_university_creates_when_allowed() -> anyhow::Result<()> {
    with_test_app_with_config(
        |config| {
            config.api.allow_update_create = true;
        },
        |app| {
            Box::pin(async move {
                let body = UniversityBuilder::new("Upserted").build();
                let (status, headers, _bytes) = app
                    .request(Method::PUT, "/universities/77", Some(to_json_body(&body)?))
                    .await?;
                assert_status(status, StatusCode::CREATED, "upsert university");
                assert_eq!(
                    headers.get(header::LOCATION).and_then(|v| v.to_str().ok()),
                    Some("/universities/77")
                );

                let (status, fetched) = app.json(Method::GET, "/universities/77", None).await?;
                assert_status(status, StatusCode::OK, "get upserted university");
                assert_eq!(fetched["name"], "Upserted");

                // Generated ids continue after the explicit one.
                let next = app
                    .create_university(&UniversityBuilder::new("After").build())
                    .await?;
                assert!(id_of(&next) > 77);
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn update_with_modules_replaces_the_set() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let created = app
                .create_university(
                    &UniversityBuilder::new("Replace")
                        .modules(json!([
                            { "name": "Keep", "semester": 1, "creditPoints": 5 },
                            { "name": "Drop", "semester": 1, "creditPoints": 5 }
                        ]))
                        .build(),
                )
                .await?;
            let id = id_of(&created);
            let keep_id = id_of(&created["modules"][0]);
            let drop_id = id_of(&created["modules"][1]);

            let body = UniversityBuilder::new("Replace")
                .modules(json!([
                    { "id": keep_id, "name": "Keep (v2)", "semester": 2, "creditPoints": 6 },
                    { "name": "Brand new", "semester": 3, "creditPoints": 4 }
                ]))
                .build();
            let (status, updated) = app
                .json(Method::PUT, &format!("/universities/{id}"), Some(&body))
                .await?;
            assert_status(status, StatusCode::OK, "replace modules");

            let modules = updated["modules"].as_array().cloned().unwrap_or_default();
            assert_eq!(modules.len(), 2);
            assert_eq!(id_of(&modules[0]), keep_id);
            assert_eq!(modules[0]["name"], "Keep (v2)");
            assert_eq!(modules[1]["name"], "Brand new");

            let (status, _body) = app
                .json(Method::GET, &format!("/modules/{drop_id}"), None)
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "dropped module is gone");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn update_without_modules_field_keeps_the_set() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let created = app
                .create_university(&UniversityBuilder::new("Keep set").build())
                .await?;
            let id = id_of(&created);
            app.create_module(&module_body("Standalone", id)).await?;

            let (status, updated) = app
                .json(
                    Method::PUT,
                    &format!("/universities/{id}"),
                    Some(&UniversityBuilder::new("Keep set (renamed)").build()),
                )
                .await?;
            assert_status(status, StatusCode::OK, "update without modules");
            assert_eq!(updated["modules"].as_array().map(Vec::len), Some(1));
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn update_can_re_parent_a_module_from_another_university() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let a = id_of(&app.create_university(&UniversityBuilder::new("A").build()).await?);
            let b = id_of(&app.create_university(&UniversityBuilder::new("B").build()).await?);
            let module = id_of(&app.create_module(&module_body("Moving", a)).await?);

            let body = UniversityBuilder::new("B")
                .modules(json!([{ "id": module, "name": "Moving", "semester": 1, "creditPoints": 5 }]))
                .build();
            let (status, _updated) = app
                .json(Method::PUT, &format!("/universities/{b}"), Some(&body))
                .await?;
            assert_status(status, StatusCode::OK, "re-parent via university update");

            let (_status, fetched) = app
                .json(Method::GET, &format!("/modules/{module}"), None)
                .await?;
            assert_eq!(fetched["university"]["id"], b);

            let (_status, owned_by_a) = app
                .json(Method::GET, &format!("/universities/{a}/modules"), None)
                .await?;
            assert_eq!(owned_by_a["_embedded"]["modules"], json!([]));
            Ok(())
        })
    })
    .await
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn delete_is_idempotent() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let id = id_of(&app.create_university(&UniversityBuilder::new("Gone").build()).await?);
            let uri = format!("/universities/{id}");

            let (status, _headers, body) = app.request(Method::DELETE, &uri, None).await?;
            assert_status(status, StatusCode::NO_CONTENT, "delete university");
            assert!(body.is_empty());

            let (status, _headers, _body) = app.request(Method::DELETE, &uri, None).await?;
            assert_status(status, StatusCode::NO_CONTENT, "delete again");

            let (status, _body) = app.json(Method::GET, &uri, None).await?;
            assert_status(status, StatusCode::NOT_FOUND, "deleted university");
            Ok(())
        })
    })
    .await
}
