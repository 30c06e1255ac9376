//! Module CRUD tests

use crate::support::{
    assert_status, id_of, module_body, with_test_app, with_test_app_with_config, UniversityBuilder,
};
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn module_without_university_is_rejected_and_not_persisted() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let body = json!({ "name": "Orphan", "semester": 1, "creditPoints": 5 });
            let (status, error) = app.json(Method::POST, "/modules", Some(&body)).await?;
            assert_status(status, StatusCode::BAD_REQUEST, "module without university");
            assert_eq!(error["error"], "validation");

            let (_status, list) = app.json(Method::GET, "/modules", None).await?;
            assert_eq!(list["page"]["totalElements"], 0);
            assert_eq!(list["_embedded"]["modules"], json!([]));
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn module_with_unknown_university_is_rejected() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, error) = app
                .json(Method::POST, "/modules", Some(&module_body("Lost", 404)))
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "unknown university");
            assert_eq!(error["message"], "Validation failed: university 404 does not exist");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn created_module_references_its_university() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let university = id_of(
                &app.create_university(&UniversityBuilder::new("Owner").build())
                    .await?,
            );
            let created = app.create_module(&module_body("Compilers", university)).await?;
            let id = id_of(&created);

            let (status, fetched) = app.json(Method::GET, &format!("/modules/{id}"), None).await?;
            assert_status(status, StatusCode::OK, "get module");
            assert_eq!(fetched["university"]["id"], university);
            assert_eq!(fetched["creditPoints"], 6);
            assert_eq!(fetched["_links"]["self"]["href"], format!("/modules/{id}"));
            assert_eq!(
                fetched["_links"]["university"]["href"],
                format!("/universities/{university}")
            );
            assert_eq!(fetched["_links"]["modules"]["href"], "/modules");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn negative_credit_points_are_rejected() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let university = id_of(
                &app.create_university(&UniversityBuilder::new("Owner").build())
                    .await?,
            );
            let mut body = module_body("Bad", university);
            body["creditPoints"] = json!(-3);
            let (status, _error) = app.json(Method::POST, "/modules", Some(&body)).await?;
            assert_status(status, StatusCode::BAD_REQUEST, "negative credit points");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn update_overwrites_fields_and_owner() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let a = id_of(&app.create_university(&UniversityBuilder::new("A").build()).await?);
            let b = id_of(&app.create_university(&UniversityBuilder::new("B").build()).await?);
            let id = id_of(&app.create_module(&module_body("Networks", a)).await?);

            let body = json!({
                "name": "Networks II",
                "semester": 4,
                "creditPoints": 8,
                "university": { "id": b }
            });
            let (status, updated) = app
                .json(Method::PUT, &format!("/modules/{id}"), Some(&body))
                .await?;
            assert_status(status, StatusCode::OK, "update module");
            assert_eq!(updated["name"], "Networks II");
            assert_eq!(updated["university"]["id"], b);

            let (_status, owned_by_b) = app
                .json(Method::GET, &format!("/universities/{b}/modules"), None)
                .await?;
            assert_eq!(owned_by_b["_embedded"]["modules"][0]["id"], id);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn update_with_unknown_university_is_rejected() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let a = id_of(&app.create_university(&UniversityBuilder::new("A").build()).await?);
            let id = id_of(&app.create_module(&module_body("Networks", a)).await?);

            let (status, _error) = app
                .json(Method::PUT, &format!("/modules/{id}"), Some(&module_body("Networks", 999)))
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "re-parent to unknown university");

            let (_status, fetched) = app.json(Method::GET, &format!("/modules/{id}"), None).await?;
            assert_eq!(fetched["university"]["id"], a);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn update_missing_module_follows_policy() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let a = id_of(&app.create_university(&UniversityBuilder::new("A").build()).await?);
            let (status, _body) = app
                .json(Method::PUT, "/modules/500", Some(&module_body("Nope", a)))
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "update missing module");
            Ok(())
        })
    })
    .await?;

    with_test_app_with_config(
        |config| config.api.allow_update_create = true,
        |app| {
            Box::pin(async move {
                let a = id_of(&app.create_university(&UniversityBuilder::new("A").build()).await?);
                let (status, created) = app
                    .json(Method::PUT, "/modules/500", Some(&module_body("Yes", a)))
                    .await?;
                assert_status(status, StatusCode::CREATED, "upsert module");
                assert_eq!(created["id"], 500);
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn modules_of_missing_university_is_404() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, body) = app.json(Method::GET, "/universities/12/modules", None).await?;
            assert_status(status, StatusCode::NOT_FOUND, "modules of missing university");
            assert_eq!(body["message"], "University 12 not found");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn delete_module_then_fetch_is_404() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let a = id_of(&app.create_university(&UniversityBuilder::new("A").build()).await?);
            let id = id_of(&app.create_module(&module_body("Temp", a)).await?);

            let (status, _headers, _body) = app
                .request(Method::DELETE, &format!("/modules/{id}"), None)
                .await?;
            assert_status(status, StatusCode::NO_CONTENT, "delete module");

            let (status, _body) = app.json(Method::GET, &format!("/modules/{id}"), None).await?;
            assert_status(status, StatusCode::NOT_FOUND, "deleted module");

            let (status, _headers, _body) = app
                .request(Method::DELETE, "/modules/31337", None)
                .await?;
            assert_status(status, StatusCode::NO_CONTENT, "delete unknown module");

            let (status, university) = app
                .json(Method::GET, &format!("/universities/{a}"), None)
                .await?;
            assert_status(status, StatusCode::OK, "owner survives module delete");
            assert_eq!(university["modules"], json!([]));
            Ok(())
        })
    })
    .await
}
