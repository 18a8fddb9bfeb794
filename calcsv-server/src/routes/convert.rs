//! Upload form and conversion endpoint

use axum::{
    Router,
    extract::{Multipart, State, multipart::MultipartError},
    http::header,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use tracing::info;

use calcsv_core::CalCsvError;
use calcsv_core::source::InputSource;

use crate::routes::AppError;
use crate::state::AppState;

const FORM: &str = r#"<!doctype html>
<html>
  <head><meta charset="utf-8"><title>Calendar to CSV</title></head>
  <body>
    <form method="post" action="/convert" enctype="multipart/form-data">
      <label>
        Convert from local file:
        <input type="file" name="file">
      </label>
      <br><br>
      <label>
        OR convert from URL:
        <input type="text" name="url">
      </label>
      <br><br>
      <button type="submit">Convert to CSV</button>
    </form>
  </body>
</html>
"#;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(form))
        .route("/convert", post(convert))
}

/// GET / - Upload form
async fn form() -> Html<&'static str> {
    Html(FORM)
}

/// POST /convert - Convert an uploaded or linked calendar to CSV
async fn convert(State(state): State<AppState>, mut multipart: Multipart) -> Result<Response, AppError> {
    let mut upload = None;
    let mut url = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_upload)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => upload = Some(field.bytes().await.map_err(invalid_upload)?.to_vec()),
            "url" => url = Some(field.text().await.map_err(invalid_upload)?),
            _ => {}
        }
    }

    let source = InputSource::select(upload, url)?;
    let raw = source.load(&state.client).await?;
    let csv = calcsv_core::convert(&raw, &state.render)?;

    info!(input_bytes = raw.len(), output_bytes = csv.len(), "converted calendar");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=calendar.csv"),
        ],
        csv,
    )
        .into_response())
}

fn invalid_upload(err: MultipartError) -> CalCsvError {
    CalCsvError::InputUnavailable(format!("Invalid upload: {err}"))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use calcsv_core::config::{RenderSettings, Settings};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::routes::app;
    use crate::state::AppState;

    const BOUNDARY: &str = "calcsv-test-boundary";

    const ICS: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
UID:standup\r\n\
SUMMARY:Standup\r\n\
DTSTART:20250320T090000Z\r\n\
DTEND:20250320T091500Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    fn state() -> AppState {
        let settings = Settings {
            render: RenderSettings {
                locale: Some("en-US".to_string()),
                timezone: Some("UTC".to_string()),
            },
            ..Default::default()
        };
        AppState::new(&settings).unwrap()
    }

    /// Multipart body from (field name, optional filename, value) parts.
    fn multipart(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, filename, value) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match filename {
                Some(filename) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: text/calendar\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn convert_request(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/convert")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        response.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    #[tokio::test]
    async fn test_form_page() {
        let response = app(state())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains(r#"name="file""#));
        assert!(html.contains(r#"name="url""#));
    }

    #[tokio::test]
    async fn test_convert_uploaded_file() {
        let body = multipart(&[("file", Some("calendar.ics"), ICS), ("url", None, "")]);

        let response = app(state()).oneshot(convert_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=calendar.csv"
        );

        let bytes = body_bytes(response).await;
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert_eq!(
            text,
            "Summary,Start Date,End Date,Start Time,End Time,Total Hours,Participant,Location\n\
             Standup,3/20/2025,3/20/2025,09:00 AM,09:15 AM,0:15,,"
        );
    }

    #[tokio::test]
    async fn test_convert_without_input_is_bad_request() {
        let body = multipart(&[("url", None, "")]);

        let response = app(state()).oneshot(convert_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let text = String::from_utf8(body_bytes(response).await).unwrap();
        assert_eq!(text, "Error: no file or URL specified.");
    }

    #[tokio::test]
    async fn test_convert_malformed_calendar_is_unprocessable() {
        let broken = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nSUMMARY:Never closed\r\n";
        let body = multipart(&[("file", Some("broken.ics"), broken)]);

        let response = app(state()).oneshot(convert_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_convert_unreachable_url_is_bad_request() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{addr}/calendar.ics");
        let body = multipart(&[("url", None, url.as_str())]);

        let response = app(state()).oneshot(convert_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let text = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(text.starts_with("Failed to fetch ICS file"), "got {text}");
    }
}
