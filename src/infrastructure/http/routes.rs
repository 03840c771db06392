//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                 GET   健康检查
//! - /api/story/generate       POST  生成单个故事音频（multipart）
//! - /api/story/batch          POST  批量生成（multipart，.txt 文件）
//! - /api/audio/:file_name     GET   流式获取成品音频
//!
//! 其余路径由静态文件服务处理（表单页面）

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有 API 路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/story", story_routes())
        .route("/audio/:file_name", get(handlers::stream_audio))
}

/// Story 路由
fn story_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(handlers::generate_story))
        .route("/batch", post(handlers::generate_batch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tempfile::{tempdir, TempDir};
    use tower::util::ServiceExt;

    use crate::application::PipelineOptions;
    use crate::infrastructure::adapters::{FakeTtsClient, FileOutputStorage, SymphoniaLameCodec};

    const BOUNDARY: &str = "storyvox-test-boundary";

    async fn test_app() -> (Router, TempDir) {
        let dir = tempdir().unwrap();
        let storage = FileOutputStorage::new(dir.path().join("output")).await.unwrap();
        let state = AppState::new(
            Arc::new(FakeTtsClient::with_defaults()),
            Arc::new(SymphoniaLameCodec::new()),
            Arc::new(storage),
            PipelineOptions {
                temp_root: Some(dir.path().to_path_buf()),
                ..Default::default()
            },
            "http://localhost:5060",
        );
        (create_routes().with_state(Arc::new(state)), dir)
    }

    /// 构造 multipart 请求体：(字段名, 文件名, 内容)
    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(f) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/plain\r\n\r\n",
                    name, f
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body
    }

    fn multipart_request(uri: &str, parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let (app, _dir) = test_app().await;
        let response = app
            .oneshot(Request::builder().uri("/api/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["tts_available"], true);
    }

    #[tokio::test]
    async fn test_generate_story() {
        let (app, _dir) = test_app().await;
        let request = multipart_request(
            "/api/story/generate",
            &[
                ("title", None, "Fox"),
                ("text", None, "Once upon a time."),
                ("speed", None, "1.0"),
                ("music_volume", None, "-20"),
            ],
        );

        let json = json_body(app.clone().oneshot(request).await.unwrap()).await;
        assert_eq!(json["errno"], 0, "{}", json);

        let data = &json["data"];
        let file_name = data["file_name"].as_str().unwrap();
        assert!(file_name.starts_with("Fox_"));
        let link = data["download_link"].as_str().unwrap();
        assert!(link.starts_with("<a href=\"data:application/octet-stream;base64,"));
        assert!(link.ends_with(">Download audio file</a>"));
        assert_eq!(
            data["audio_url"],
            format!("http://localhost:5060/api/audio/{}", file_name)
        );

        // 成品可以通过播放地址获取
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/audio/{}", file_name))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    }

    #[tokio::test]
    async fn test_generate_default_title() {
        let (app, _dir) = test_app().await;
        let request = multipart_request("/api/story/generate", &[("text", None, "hello")]);

        let json = json_body(app.oneshot(request).await.unwrap()).await;
        assert_eq!(json["data"]["title"], "My Story");
    }

    #[tokio::test]
    async fn test_generate_empty_text_warns() {
        let (app, _dir) = test_app().await;
        let request = multipart_request(
            "/api/story/generate",
            &[("title", None, "Empty"), ("text", None, "   ")],
        );

        let json = json_body(app.oneshot(request).await.unwrap()).await;
        assert_eq!(json["errno"], 422);
        assert_eq!(json["error"], "Please enter some text to generate audio.");
    }

    #[tokio::test]
    async fn test_generate_invalid_speed() {
        let (app, _dir) = test_app().await;
        let request = multipart_request(
            "/api/story/generate",
            &[("text", None, "hello"), ("speed", None, "3")],
        );

        let json = json_body(app.oneshot(request).await.unwrap()).await;
        assert_eq!(json["errno"], 400);
        assert!(json["error"].as_str().unwrap().starts_with("An error occurred: "));
    }

    #[tokio::test]
    async fn test_batch() {
        let (app, _dir) = test_app().await;
        let request = multipart_request(
            "/api/story/batch",
            &[
                ("speed", None, "1.5"),
                ("files", Some("A.txt"), "hello"),
                ("files", Some("B.txt"), "world"),
            ],
        );

        let json = json_body(app.oneshot(request).await.unwrap()).await;
        assert_eq!(json["errno"], 0, "{}", json);
        assert_eq!(json["data"]["count"], 2);

        let outputs = json["data"]["outputs"].as_object().unwrap();
        let titles: Vec<_> = outputs.keys().cloned().collect();
        assert_eq!(titles, vec!["A.txt", "B.txt"]);
        assert_ne!(outputs["A.txt"]["file_name"], outputs["B.txt"]["file_name"]);
        assert!(outputs["A.txt"]["file_name"]
            .as_str()
            .unwrap()
            .starts_with("A.txt_"));
        assert!(outputs["B.txt"]["download_link"]
            .as_str()
            .unwrap()
            .ends_with(">Download audio for B.txt</a>"));
    }

    #[tokio::test]
    async fn test_batch_case_distinct_file_names() {
        let (app, _dir) = test_app().await;
        let request = multipart_request(
            "/api/story/batch",
            &[
                ("files", Some("a.txt"), "hello"),
                ("files", Some("a.TXT"), "world"),
            ],
        );

        let json = json_body(app.oneshot(request).await.unwrap()).await;
        assert_eq!(json["errno"], 0, "{}", json);
        assert_eq!(json["data"]["count"], 2);
    }

    #[tokio::test]
    async fn test_batch_duplicate_upload_replaces_earlier() {
        let (app, dir) = test_app().await;
        let request = multipart_request(
            "/api/story/batch",
            &[
                ("files", Some("A.txt"), ""),
                ("files", Some("A.txt"), "hello"),
            ],
        );

        // 先上传的空文件被替换，不会触发空正文错误
        let json = json_body(app.oneshot(request).await.unwrap()).await;
        assert_eq!(json["errno"], 0, "{}", json);
        assert_eq!(json["data"]["count"], 1);

        let produced = std::fs::read_dir(dir.path().join("output")).unwrap().count();
        assert_eq!(produced, 1);
    }

    #[tokio::test]
    async fn test_batch_error_prefix() {
        let (app, _dir) = test_app().await;
        let request = multipart_request(
            "/api/story/batch",
            &[("files", Some("A.txt"), "hello"), ("files", Some("B.txt"), "")],
        );

        let json = json_body(app.oneshot(request).await.unwrap()).await;
        assert_eq!(json["errno"], 422);
        assert_eq!(
            json["error"],
            "An error occurred during batch processing: No text to synthesize"
        );

        let request = multipart_request("/api/story/batch", &[("speed", None, "1.0")]);
        let (app, _dir) = test_app().await;
        let json = json_body(app.oneshot(request).await.unwrap()).await;
        assert_eq!(json["errno"], 400);
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("An error occurred during batch processing: "));
    }

    #[tokio::test]
    async fn test_batch_rejects_non_txt() {
        let (app, _dir) = test_app().await;
        let request = multipart_request(
            "/api/story/batch",
            &[("files", Some("story.md"), "# hello")],
        );

        let json = json_body(app.oneshot(request).await.unwrap()).await;
        assert_eq!(json["errno"], 400);
    }

    #[tokio::test]
    async fn test_audio_not_found() {
        let (app, _dir) = test_app().await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/audio/missing.mp3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let json = json_body(response).await;
        assert_eq!(json["errno"], 404);
    }
}
