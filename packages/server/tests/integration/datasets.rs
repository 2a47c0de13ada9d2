use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use csvlab_server::entity::csv;
use sea_orm::EntityTrait;
use serde_json::json;

use crate::common::{DatasetParts, TestApp, routes};

const CSV: &[u8] = b"sepal_length,sepal_width\n5.1,3.5\n";

async fn app_with_owner() -> TestApp {
    let app = TestApp::spawn().await;
    app.create_user("u-1", "alice@example.com", "securepass").await;
    app
}

async fn stored(app: &TestApp, csv_id: &str) -> csv::Model {
    csv::Entity::find_by_id(csv_id.to_string())
        .one(&app.db)
        .await
        .expect("DB query failed")
        .expect("Dataset not found")
}

mod upload {
    use super::*;

    #[tokio::test]
    async fn uploaded_dataset_is_listed_without_payloads() {
        let app = app_with_owner().await;
        app.upload_csv("c-1", "u-1", CSV).await;

        let res = app.post(routes::CSV_LIST, &json!({"user_id": "u-1"})).await;

        res.assert_success();
        let rows = res.body["CsvData"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["csv_id"], "c-1");
        assert_eq!(rows[0]["file_name"], "iris.csv");
        assert_eq!(rows[0]["data_columns"], 2);
        assert!(rows[0].get("csv_file").is_none());
    }

    #[tokio::test]
    async fn missing_parts_are_all_reported() {
        let app = app_with_owner().await;

        let res = app
            .post_multipart(
                routes::CSV_UPLOAD,
                DatasetParts {
                    csv_file: None,
                    json_file: None,
                    fields: vec![("user_id", "u-1")],
                },
            )
            .await;

        res.assert_failure(400, "MalformedInput");
        let message = res.body["message"].as_str().unwrap();
        for field in ["csv_file", "json_file", "csv_id", "file_name"] {
            assert!(message.contains(field), "{message}");
        }
    }

    #[tokio::test]
    async fn non_numeric_counts_are_rejected() {
        let app = app_with_owner().await;

        let res = app
            .post_multipart(
                routes::CSV_UPLOAD,
                DatasetParts {
                    csv_file: Some(CSV),
                    json_file: Some(b"[]"),
                    fields: vec![
                        ("csv_id", "c-1"),
                        ("user_id", "u-1"),
                        ("file_name", "iris.csv"),
                        ("data_rows", "lots"),
                    ],
                },
            )
            .await;

        res.assert_failure(400, "MalformedInput");
        assert_eq!(app.count_rows("csv", "true").await, 0);
    }

    #[tokio::test]
    async fn upload_for_an_unknown_user_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .post_multipart(
                routes::CSV_UPLOAD,
                DatasetParts {
                    csv_file: Some(CSV),
                    json_file: Some(b"[]"),
                    fields: vec![
                        ("csv_id", "c-1"),
                        ("user_id", "nobody"),
                        ("file_name", "iris.csv"),
                    ],
                },
            )
            .await;

        res.assert_failure(404, "NotFound");
    }

    #[tokio::test]
    async fn reusing_a_csv_id_is_an_integrity_violation() {
        let app = app_with_owner().await;
        app.upload_csv("c-1", "u-1", CSV).await;

        let res = app
            .post_multipart(
                routes::CSV_UPLOAD,
                DatasetParts {
                    csv_file: Some(CSV),
                    json_file: Some(b"[]"),
                    fields: vec![
                        ("csv_id", "c-1"),
                        ("user_id", "u-1"),
                        ("file_name", "copy.csv"),
                    ],
                },
            )
            .await;

        res.assert_failure(400, "IntegrityViolation");
    }
}

mod fetch {
    use super::*;

    #[tokio::test]
    async fn payloads_are_returned_base64_encoded() {
        let app = app_with_owner().await;
        app.upload_csv("c-1", "u-1", CSV).await;

        let res = app.get(&routes::csv("c-1")).await;

        res.assert_success();
        let encoded = res.body["file"]["csv_file"].as_str().unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), CSV);
        assert_eq!(res.body["file"]["json_file"], STANDARD.encode(b"[]"));
    }

    #[tokio::test]
    async fn download_is_a_csv_attachment() {
        let app = app_with_owner().await;
        app.upload_csv("c-1", "u-1", CSV).await;

        let res = app.get(&routes::csv_download("c-1")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.text.as_bytes(), CSV);
        let content_type = res.headers["content-type"].to_str().unwrap();
        assert!(content_type.starts_with("text/csv"), "{content_type}");
        let disposition = res.headers["content-disposition"].to_str().unwrap();
        assert_eq!(disposition, "attachment; filename=\"iris.csv\"");
    }

    #[tokio::test]
    async fn deleted_dataset_cannot_be_fetched() {
        let app = app_with_owner().await;
        app.upload_csv("c-1", "u-1", CSV).await;
        app.post(routes::CSV_DELETE, &json!({"csv_id": "c-1"}))
            .await
            .assert_success();

        app.get(&routes::csv("c-1"))
            .await
            .assert_failure(404, "NotFound");
        app.get(&routes::csv_download("c-1"))
            .await
            .assert_failure(404, "NotFound");
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn update_replaces_payload_and_keeps_identity() {
        let app = app_with_owner().await;
        app.upload_csv("c-1", "u-1", CSV).await;
        let before = stored(&app, "c-1").await;

        let res = app
            .post_multipart(
                routes::CSV_UPDATE,
                DatasetParts {
                    csv_file: Some(b"x,y,z\n1,2,3\n4,5,6\n"),
                    json_file: Some(b"[{}]"),
                    fields: vec![
                        ("csv_id", "c-1"),
                        ("data_size", "18"),
                        ("data_columns", "3"),
                        ("data_rows", "2"),
                    ],
                },
            )
            .await;

        res.assert_success();
        assert_eq!(res.body["file_name"], "iris.csv");

        let after = stored(&app, "c-1").await;
        assert_eq!(after.csv_file, b"x,y,z\n1,2,3\n4,5,6\n");
        assert_eq!(after.data_columns, 3);
        assert_eq!(after.csv_id, before.csv_id);
        assert_eq!(after.user_id, before.user_id);
        assert_eq!(after.upload_date, before.upload_date);
        assert!(after.last_accessed_date >= before.last_accessed_date);
    }

    #[tokio::test]
    async fn updating_a_deleted_dataset_says_it_is_deleted() {
        let app = app_with_owner().await;
        app.upload_csv("c-1", "u-1", CSV).await;
        app.post(routes::CSV_DELETE, &json!({"csv_id": "c-1"}))
            .await
            .assert_success();

        let res = app
            .post_multipart(
                routes::CSV_UPDATE,
                DatasetParts {
                    csv_file: Some(CSV),
                    json_file: Some(b"[]"),
                    fields: vec![("csv_id", "c-1")],
                },
            )
            .await;

        res.assert_failure(404, "NotFound");
        assert_eq!(res.body["message"], "Dataset is deleted");
    }

    #[tokio::test]
    async fn updating_an_unknown_dataset_is_not_found() {
        let app = app_with_owner().await;

        let res = app
            .post_multipart(
                routes::CSV_UPDATE,
                DatasetParts {
                    csv_file: Some(CSV),
                    json_file: Some(b"[]"),
                    fields: vec![("csv_id", "c-404")],
                },
            )
            .await;

        res.assert_failure(404, "NotFound");
        assert_eq!(res.body["message"], "Dataset not found");
    }
}

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn delete_moves_the_dataset_to_the_deleted_list() {
        let app = app_with_owner().await;
        app.upload_csv("c-1", "u-1", CSV).await;
        app.upload_csv("c-2", "u-1", CSV).await;

        app.post(routes::CSV_DELETE, &json!({"csv_id": "c-1"}))
            .await
            .assert_success();

        let live = app.post(routes::CSV_LIST, &json!({"user_id": "u-1"})).await;
        let live_ids: Vec<_> = live.body["CsvData"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["csv_id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(live_ids, ["c-2"]);

        let deleted = app
            .post(routes::CSV_LIST_DELETED, &json!({"user_id": "u-1"}))
            .await;
        deleted.assert_success();
        let rows = deleted.body["DeleteFiles"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["csv_id"], "c-1");
        assert_eq!(rows[0]["is_delete"], true);
        assert!(rows[0]["upload_date"].as_str().unwrap().parse::<DateTime<Utc>>().is_ok());
    }

    #[tokio::test]
    async fn restore_brings_a_dataset_back() {
        let app = app_with_owner().await;
        app.upload_csv("c-1", "u-1", CSV).await;
        app.post(routes::CSV_DELETE, &json!({"csv_id": "c-1"}))
            .await
            .assert_success();

        app.post(routes::CSV_RESTORE, &json!({"csv_id": "c-1"}))
            .await
            .assert_success();

        app.get(&routes::csv("c-1")).await.assert_success();
    }

    #[tokio::test]
    async fn illegal_transitions_are_not_found() {
        let app = app_with_owner().await;
        app.upload_csv("c-1", "u-1", CSV).await;

        // Restore from Active.
        app.post(routes::CSV_RESTORE, &json!({"csv_id": "c-1"}))
            .await
            .assert_failure(404, "NotFound");

        app.post(routes::CSV_DELETE, &json!({"csv_id": "c-1"}))
            .await
            .assert_success();

        // Delete from Deleted.
        let res = app.post(routes::CSV_DELETE, &json!({"csv_id": "c-1"})).await;
        res.assert_failure(404, "NotFound");
        assert_eq!(res.body["message"], "Dataset is deleted");
    }

    #[tokio::test]
    async fn permanent_delete_works_from_either_state() {
        let app = app_with_owner().await;
        app.upload_csv("c-live", "u-1", CSV).await;
        app.upload_csv("c-gone", "u-1", CSV).await;
        app.post(routes::CSV_DELETE, &json!({"csv_id": "c-gone"}))
            .await
            .assert_success();

        for csv_id in ["c-live", "c-gone"] {
            app.post(routes::CSV_PURGE, &json!({"csv_id": csv_id}))
                .await
                .assert_success();
        }

        assert_eq!(app.count_rows("csv", "true").await, 0);
        app.post(routes::CSV_PURGE, &json!({"csv_id": "c-live"}))
            .await
            .assert_failure(404, "NotFound");
    }

    #[tokio::test]
    async fn permanent_delete_leaves_rooms_alone() {
        let app = app_with_owner().await;
        app.upload_csv("c-1", "u-1", CSV).await;
        app.post(
            routes::ROOM_SAVE,
            &json!({"room_id": "r-1", "csv_id": "c-1", "visualization_type": "scatter"}),
        )
        .await
        .assert_success();

        app.post(routes::CSV_PURGE, &json!({"csv_id": "c-1"}))
            .await
            .assert_success();

        assert_eq!(app.count_rows("room", "csv_id = 'c-1'").await, 1);
    }

    #[tokio::test]
    async fn list_requires_a_user_id() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::CSV_LIST, &json!({})).await;

        res.assert_failure(400, "MalformedInput");
        assert_eq!(res.body["message"], "user_id is required");
    }
}
