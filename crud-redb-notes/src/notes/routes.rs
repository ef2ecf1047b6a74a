use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use crate::{
    extract::{Json, Path},
    state::AppState,
    store::Store,
};

use super::NewNote;

use super::handlers;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/notes", get(find_notes))
        .route("/notes/", get(find_notes))
        .route("/note", post(create_note))
        .route("/note/", post(create_note))
        .route("/note/{id}", get(get_note).delete(delete_note))
        .route("/note/{id}/", get(get_note).delete(delete_note))
        .with_state(state)
}

async fn find_notes(State(store): State<Store>) -> impl IntoResponse {
    handlers::find_notes(store).await.map(Json)
}

async fn create_note(State(store): State<Store>, Json(args): Json<NewNote>) -> impl IntoResponse {
    handlers::create_note(args, store).await.map(Json)
}

async fn get_note(Path(id): Path<String>, State(store): State<Store>) -> impl IntoResponse {
    handlers::get_note(id, store).await.map(Json)
}

async fn delete_note(Path(id): Path<String>, State(store): State<Store>) -> impl IntoResponse {
    handlers::delete_note(id, store).await.map(Json)
}

#[cfg(test)]
mod tests {
    use crate::{
        errors::Result,
        notes::{handlers::put_note, Note},
        store::{init_test_store, Store},
    };
    use axum_test::TestServer;
    use serde_json::json;

    fn is_note_id(id: &str) -> bool {
        id.len() == 14 && id.chars().all(|c| c.is_ascii_digit())
    }

    fn seed(store: &Store, ids: &[&str]) -> Result<()> {
        for id in ids {
            put_note(
                store,
                &Note {
                    id: id.to_string(),
                    title: format!("title {id}"),
                    body: format!("body {id}"),
                },
            )?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn find_notes_empty() -> Result<()> {
        let server = test_server(init_test_store()?);
        let response = server.get("/notes").await;

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<Vec<Note>>(), vec![]);
        assert_eq!(response.text(), "[]");
        Ok(())
    }

    #[tokio::test]
    async fn find_notes() -> Result<()> {
        let store = init_test_store()?;
        seed(&store, &["20240101000003", "20240101000001", "20240101000002"])?;

        let server = test_server(store);
        let notes = server.get("/notes").await.json::<Vec<Note>>();

        assert_eq!(notes.len(), 3);
        assert_eq!(notes[0].id, "20240101000001");
        assert_eq!(notes[2].title, "title 20240101000003");

        // trailing slash routes to the same handler
        assert_eq!(server.get("/notes/").await.json::<Vec<Note>>(), notes);
        Ok(())
    }

    #[tokio::test]
    async fn note_lifecycle() -> Result<()> {
        let server = test_server(init_test_store()?);

        let response = server
            .post("/note")
            .json(&json!({
                "title": "Groceries",
                "body": "milk, eggs"
            }))
            .await;

        assert_eq!(response.status_code(), 200);
        let created = response.json::<Note>();
        assert!(is_note_id(&created.id));
        assert_eq!(created.title, "Groceries");
        assert_eq!(created.body, "milk, eggs");

        let fetched = server.get(&format!("/note/{}", created.id)).await.json::<Note>();
        assert_eq!(fetched, created);

        let deleted = server.delete(&format!("/note/{}", created.id)).await;
        assert_eq!(deleted.status_code(), 200);
        assert_eq!(deleted.json::<String>(), format!("deleted note {}", created.id));

        let gone = server.get(&format!("/note/{}", created.id)).expect_failure().await;
        assert_eq!(gone.status_code(), 500);
        assert_eq!(gone.text(), "can't find note");
        Ok(())
    }

    #[tokio::test]
    async fn delete_keeps_the_rest() -> Result<()> {
        let store = init_test_store()?;
        seed(&store, &["20240101000001", "20240101000002", "20240101000003"])?;

        let server = test_server(store);
        server.delete("/note/20240101000002").await;

        let ids: Vec<_> = server
            .get("/notes")
            .await
            .json::<Vec<Note>>()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, ["20240101000001", "20240101000003"]);
        Ok(())
    }

    #[tokio::test]
    async fn delete_missing_note() -> Result<()> {
        let server = test_server(init_test_store()?);
        let response = server.delete("/note/20000101000000").await;

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<String>(), "deleted note 20000101000000");
        Ok(())
    }

    #[tokio::test]
    async fn get_missing_note() -> Result<()> {
        let server = test_server(init_test_store()?);
        let response = server.get("/note/20000101000000").expect_failure().await;

        assert_eq!(response.status_code(), 500);
        assert_eq!(response.text(), "can't find note");
        Ok(())
    }

    #[tokio::test]
    async fn create_note_bad_body() -> Result<()> {
        let server = test_server(init_test_store()?);
        let response = server.post("/note").text("{\"title\":").expect_failure().await;

        assert_eq!(response.status_code(), 500);
        assert!(response.text().contains("EOF"));
        assert_eq!(server.get("/notes").await.text(), "[]");
        Ok(())
    }

    #[tokio::test]
    async fn create_note_without_content_type() -> Result<()> {
        let server = test_server(init_test_store()?);
        let response = server.post("/note").text(r#"{"title":"a","body":"b"}"#).await;

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<Note>().title, "a");
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_record_fails_list() -> Result<()> {
        let store = init_test_store()?;
        store.with_write(|bucket| {
            bucket.insert("20240101000000", "oops".as_bytes())?;
            Ok(())
        })?;

        let server = test_server(store);
        let response = server.get("/notes").expect_failure().await;

        assert_eq!(response.status_code(), 500);
        assert_eq!(response.text(), "can't unmarshall note");
        Ok(())
    }

    #[tokio::test]
    async fn create_note_larger_than_default_body_limit() -> Result<()> {
        let server = test_server(init_test_store()?);
        let body = "x".repeat(3 * 1024 * 1024);

        let response = server.post("/note").json(&json!({"title": "t", "body": body})).await;

        assert_eq!(response.status_code(), 200);
        let created = response.json::<Note>();
        assert_eq!(created.body.len(), body.len());

        let fetched = server.get(&format!("/note/{}", created.id)).await.json::<Note>();
        assert_eq!(fetched.body, body);
        Ok(())
    }

    #[tokio::test]
    async fn create_note_repeated_key_last_wins() -> Result<()> {
        let server = test_server(init_test_store()?);

        let response = server
            .post("/note")
            .text(r#"{"title":"a","title":"A","body":"B"}"#)
            .await;
        assert_eq!(response.status_code(), 200);
        let created = response.json::<Note>();
        assert_eq!(created.title, "A");
        assert_eq!(created.body, "B");

        let response = server.post("/note").text(r#"{"title":"a","Title":"b"}"#).await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<Note>().title, "b");
        Ok(())
    }

    #[tokio::test]
    async fn create_note_null_body() -> Result<()> {
        let server = test_server(init_test_store()?);
        let response = server.post("/note").text("null").await;

        assert_eq!(response.status_code(), 200);
        let created = response.json::<Note>();
        assert!(is_note_id(&created.id));
        assert_eq!(created.title, "");
        assert_eq!(created.body, "");
        Ok(())
    }

    #[tokio::test]
    async fn create_note_wrong_shape() -> Result<()> {
        let server = test_server(init_test_store()?);
        let response = server.post("/note").text("[1, 2]").expect_failure().await;

        assert_eq!(response.status_code(), 500);
        assert!(response.text().contains("invalid type"));
        Ok(())
    }

    #[tokio::test]
    async fn note_by_id_with_trailing_slash() -> Result<()> {
        let store = init_test_store()?;
        seed(&store, &["20240101000001"])?;

        let server = test_server(store);
        let note = server.get("/note/20240101000001/").await.json::<Note>();
        assert_eq!(note.id, "20240101000001");

        let deleted = server.delete("/note/20240101000001/").await;
        assert_eq!(deleted.json::<String>(), "deleted note 20240101000001");
        assert_eq!(server.get("/notes").await.text(), "[]");
        Ok(())
    }

    fn test_server(store: Store) -> TestServer {
        crate::tests::test_server(store, super::router)
    }
}
