//! University search filter and sort tests

use crate::support::{assert_status, with_test_app, TestApp, UniversityBuilder};
use axum::http::{Method, StatusCode};
use serde_json::Value;

async fn seed(app: &TestApp) -> anyhow::Result<()> {
    for (name, country, department) in [
        ("Test University Zurich", "Switzerland", "Informatics"),
        ("Alpha Test Institute", "Germany", "Computer Science"),
        ("Other College", "Germany", "Informatics"),
        ("test lowercase", "France", "Mathematics"),
        ("Beta Test School", "Austria", "Computer Science"),
    ] {
        app.create_university(
            &UniversityBuilder::new(name)
                .country(country)
                .department(department)
                .build(),
        )
        .await?;
    }
    Ok(())
}

fn names(body: &Value) -> Vec<String> {
    body["_embedded"]["universities"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|u| u["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn search_by_name_is_case_sensitive_and_sorted() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            seed(&app).await?;

            let (status, body) = app
                .json(
                    Method::GET,
                    "/universities/search?name=Test&country=&departmentName=&page=0&size=10&sortBy=name&direction=asc",
                    None,
                )
                .await?;
            assert_status(status, StatusCode::OK, "search by name");
            assert_eq!(
                names(&body),
                vec![
                    "Alpha Test Institute",
                    "Beta Test School",
                    "Test University Zurich"
                ]
            );
            assert_eq!(body["page"]["totalElements"], 3);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn search_defaults_match_everything_by_name_ascending() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            seed(&app).await?;

            let (status, body) = app.json(Method::GET, "/universities/search", None).await?;
            assert_status(status, StatusCode::OK, "search without parameters");
            assert_eq!(body["page"]["totalElements"], 5);
            assert_eq!(body["page"]["size"], 10);
            // Byte-wise ordering: uppercase before lowercase.
            assert_eq!(
                names(&body),
                vec![
                    "Alpha Test Institute",
                    "Beta Test School",
                    "Other College",
                    "Test University Zurich",
                    "test lowercase"
                ]
            );
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn filters_combine_with_and() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            seed(&app).await?;

            let (_status, body) = app
                .json(
                    Method::GET,
                    "/universities/search?country=Germany&departmentName=Informatics",
                    None,
                )
                .await?;
            assert_eq!(names(&body), vec!["Other College"]);

            let (_status, body) = app
                .json(
                    Method::GET,
                    "/universities/search?name=Test&country=Germany&departmentName=Computer",
                    None,
                )
                .await?;
            assert_eq!(names(&body), vec!["Alpha Test Institute"]);

            let (_status, body) = app
                .json(Method::GET, "/universities/search?name=Nowhere", None)
                .await?;
            assert!(names(&body).is_empty());
            assert_eq!(body["page"]["totalPages"], 0);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn direction_other_than_asc_sorts_descending() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            seed(&app).await?;

            for direction in ["desc", "DESC", "sideways"] {
                let (_status, body) = app
                    .json(
                        Method::GET,
                        &format!("/universities/search?name=Test&direction={direction}"),
                        None,
                    )
                    .await?;
                assert_eq!(
                    names(&body),
                    vec![
                        "Test University Zurich",
                        "Beta Test School",
                        "Alpha Test Institute"
                    ],
                    "direction={direction}"
                );
            }

            let (_status, body) = app
                .json(Method::GET, "/universities/search?name=Test&direction=ASC", None)
                .await?;
            assert_eq!(names(&body)[0], "Alpha Test Institute");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn search_sorts_by_other_fields_with_id_tie_break() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            seed(&app).await?;

            let (status, body) = app
                .json(
                    Method::GET,
                    "/universities/search?sortBy=country&direction=asc",
                    None,
                )
                .await?;
            assert_status(status, StatusCode::OK, "sort by country");
            // The two German universities keep creation (id) order.
            assert_eq!(
                names(&body),
                vec![
                    "Beta Test School",
                    "test lowercase",
                    "Alpha Test Institute",
                    "Other College",
                    "Test University Zurich"
                ]
            );
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn unknown_sort_field_is_rejected() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, body) = app
                .json(Method::GET, "/universities/search?sortBy=budget", None)
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "unknown sortBy");
            assert_eq!(body["error"], "validation");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn search_results_carry_entity_links_and_paging_links() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            seed(&app).await?;

            let (_status, body) = app
                .json(
                    Method::GET,
                    "/universities/search?name=Test&size=2&direction=DESC",
                    None,
                )
                .await?;
            let first = &body["_embedded"]["universities"][0];
            assert!(first["_links"]["self"]["href"]
                .as_str()
                .unwrap_or_default()
                .starts_with("/universities/"));

            assert_eq!(
                body["_links"]["next"]["href"],
                "/universities/search?name=Test&country=&departmentName=&page=1&size=2&sortBy=name&direction=desc"
            );
            assert!(body["_links"].get("prev").is_none());
            Ok(())
        })
    })
    .await
}
