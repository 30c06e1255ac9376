//! Paging tests for the collection endpoints

use crate::support::{assert_status, id_of, module_body, with_test_app, with_test_app_with_config, UniversityBuilder};
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

fn embedded_len(body: &Value, rel: &str) -> usize {
    body["_embedded"][rel].as_array().map(Vec::len).unwrap_or(0)
}

#[tokio::test]
async fn twelve_universities_in_pages_of_five() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            for i in 0..12 {
                app.create_university(&UniversityBuilder::new(&format!("University {i:02}")).build())
                    .await?;
            }

            let mut sizes = Vec::new();
            for page in 0..3 {
                let (status, body) = app
                    .json(
                        Method::GET,
                        &format!("/universities?page={page}&size=5"),
                        None,
                    )
                    .await?;
                assert_status(status, StatusCode::OK, "list page");
                assert_eq!(body["page"]["totalElements"], 12);
                assert_eq!(body["page"]["totalPages"], 3);
                assert_eq!(body["page"]["number"], page);
                sizes.push(embedded_len(&body, "universities"));
            }
            assert_eq!(sizes, vec![5, 5, 2]);

            let (_status, beyond) = app
                .json(Method::GET, "/universities?page=7&size=5", None)
                .await?;
            assert_eq!(embedded_len(&beyond, "universities"), 0);
            assert_eq!(beyond["page"]["totalElements"], 12);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn paging_links_follow_position() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            for i in 0..12 {
                app.create_university(&UniversityBuilder::new(&format!("U{i}")).build())
                    .await?;
            }

            let (_status, middle) = app
                .json(Method::GET, "/universities?page=1&size=5", None)
                .await?;
            let links = &middle["_links"];
            assert_eq!(links["self"]["href"], "/universities?page=1&size=5&sort=id%2Casc");
            assert_eq!(links["first"]["href"], "/universities?page=0&size=5&sort=id%2Casc");
            assert_eq!(links["prev"]["href"], "/universities?page=0&size=5&sort=id%2Casc");
            assert_eq!(links["next"]["href"], "/universities?page=2&size=5&sort=id%2Casc");
            assert_eq!(links["last"]["href"], "/universities?page=2&size=5&sort=id%2Casc");

            let (_status, last) = app
                .json(Method::GET, "/universities?page=2&size=5", None)
                .await?;
            assert!(last["_links"].get("next").is_none());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn list_defaults_and_size_clamp() -> anyhow::Result<()> {
    with_test_app_with_config(
        |config| config.api.max_page_size = 50,
        |app| {
            Box::pin(async move {
                let (_status, body) = app.json(Method::GET, "/universities", None).await?;
                assert_eq!(body["page"]["size"], 20);
                assert_eq!(body["page"]["number"], 0);
                assert_eq!(body["_embedded"]["universities"], json!([]));

                let (_status, body) = app
                    .json(Method::GET, "/universities?size=5000", None)
                    .await?;
                assert_eq!(body["page"]["size"], 50);
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn list_sort_parameter_orders_results() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            for name in ["Bravo", "Alpha", "Charlie"] {
                app.create_university(&UniversityBuilder::new(name).build())
                    .await?;
            }

            let (_status, body) = app
                .json(Method::GET, "/universities?sort=name,desc", None)
                .await?;
            let names: Vec<&str> = body["_embedded"]["universities"]
                .as_array()
                .map(|a| a.iter().filter_map(|u| u["name"].as_str()).collect())
                .unwrap_or_default();
            assert_eq!(names, vec!["Charlie", "Bravo", "Alpha"]);

            let (status, _body) = app
                .json(Method::GET, "/universities?sort=salary", None)
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "unknown sort property");

            let (status, _body) = app
                .json(Method::GET, "/universities?page=-1", None)
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "negative page");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn modules_are_paged_and_sortable() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let u = id_of(&app.create_university(&UniversityBuilder::new("Owner").build()).await?);
            for (name, credits) in [("Low", 2), ("High", 10), ("Mid", 5)] {
                let mut body = module_body(name, u);
                body["creditPoints"] = json!(credits);
                app.create_module(&body).await?;
            }

            let (status, body) = app
                .json(Method::GET, "/modules?size=2&sort=creditPoints,desc", None)
                .await?;
            assert_status(status, StatusCode::OK, "list modules");
            assert_eq!(body["page"]["totalElements"], 3);
            assert_eq!(body["page"]["totalPages"], 2);
            assert_eq!(body["_embedded"]["modules"][0]["name"], "High");
            assert_eq!(body["_embedded"]["modules"][1]["name"], "Mid");
            assert_eq!(
                body["_links"]["next"]["href"],
                "/modules?page=1&size=2&sort=creditPoints%2Cdesc"
            );
            Ok(())
        })
    })
    .await
}
