use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::stream;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};

use httpcmp::{Method, Router, Server, routes};

const BOUNDARY: &str = "7MA4YWxkTrZu0gW";

fn form_file(name: &str, file_name: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn form_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

async fn read_json(res: http::Response<Full<Bytes>>) -> (u16, Value) {
    let status = res.status().as_u16();
    let body = res.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get(router: &Router, uri: &str) -> (u16, Value) {
    let req = http::Request::get(uri).body(Empty::<Bytes>::new()).unwrap();
    read_json(router.dispatch(req).await).await
}

async fn post(router: &Router, content_type: Option<&str>, body: Vec<u8>) -> (u16, Value) {
    let mut req = http::Request::post("/upload");
    if let Some(ct) = content_type {
        req = req.header("content-type", ct);
    }
    let req = req.body(Full::new(Bytes::from(body))).unwrap();
    read_json(router.dispatch(req).await).await
}

#[tokio::test]
async fn ping_returns_pong() {
    let (status, body) = get(&routes::app(), "/ping").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"value": "pong"}));
}

#[tokio::test]
async fn user_book_echoes_integers() {
    let (status, body) = get(&routes::app(), "/users/1/books/1").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"user": 1, "book": 1}));
}

#[tokio::test]
async fn user_book_rejects_non_integers() {
    let app = routes::app();

    let (status, body) = get(&app, "/users/a/books/1").await;
    assert_eq!(status, 400);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("user"), "{message}");

    // both bad: the first segment's error is reported
    let (status, body) = get(&app, "/users/a/books/b").await;
    assert_eq!(status, 400);
    assert!(body["message"].as_str().unwrap().contains("`user`"));

    let (status, body) = get(&app, "/users/1/books/b").await;
    assert_eq!(status, 400);
    assert!(body["message"].as_str().unwrap().contains("`book`"));
}

#[tokio::test]
async fn upload_reports_bytes_written() {
    let body = form_file("file", "hello.txt", b"hello, world!\n");
    let (status, body) = post(&routes::app(), Some(&form_content_type()), body).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"bytesWritten": 14}));
}

#[tokio::test]
async fn upload_failures_are_classified() {
    let app = routes::app();
    let file = form_file("file", "a.txt", b"abc");

    let (status, body) = post(&app, None, file.clone()).await;
    assert_eq!(status, 415);
    assert!(!body["message"].as_str().unwrap().is_empty());

    let (status, _) = post(&app, Some("application/json"), file.clone()).await;
    assert_eq!(status, 415);

    let (status, missing_boundary) = post(&app, Some("multipart/form-data"), file.clone()).await;
    assert_eq!(status, 415);
    assert!(missing_boundary["message"].as_str().unwrap().contains("boundary"));

    let (status, _) = post(&app, Some("multipart/form-data; boundary="), file.clone()).await;
    assert_eq!(status, 415);

    let too_long = format!("multipart/form-data; boundary={}", "b".repeat(71));
    let (status, body) = post(&app, Some(&too_long), file).await;
    assert_eq!(status, 415);
    assert!(body["message"].as_str().unwrap().contains("invalid multipart boundary"));

    let closing_only = format!("--{BOUNDARY}--\r\n").into_bytes();
    let (status, _) = post(&app, Some(&form_content_type()), closing_only).await;
    assert_eq!(status, 422);
}

#[tokio::test]
async fn upload_error_response_disables_sniffing() {
    let req = http::Request::post("/upload").body(Empty::<Bytes>::new()).unwrap();
    let res = routes::app().dispatch(req).await;
    assert_eq!(res.status(), http::StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");
    assert_eq!(res.headers()["content-type"], "application/json");
}

/// Collects everything written into a buffer shared with the test.
#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl AsyncWrite for SharedSink {
    fn poll_write(self: Pin<&mut Self>, _: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[tokio::test]
async fn upload_streams_chunked_body_into_sink() {
    let sink = SharedSink::default();
    let app = Router::new().on(Method::Post, "/upload", routes::upload({
        let sink = sink.clone();
        move || sink.clone()
    }));

    let data: Vec<u8> = (0..64 * 1024).map(|i| (i % 256) as u8).collect();
    let body = form_file("file", "blob.bin", &data);
    let frames: Vec<Result<Frame<Bytes>, io::Error>> = body
        .chunks(1000)
        .map(|c| Ok(Frame::data(Bytes::copy_from_slice(c))))
        .collect();

    let req = http::Request::post("/upload")
        .header("content-type", form_content_type())
        .body(StreamBody::new(stream::iter(frames)))
        .unwrap();

    let (status, body) = read_json(app.dispatch(req).await).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"bytesWritten": data.len()}));
    assert_eq!(*sink.0.lock().unwrap(), data);
}

/// Hands frames over one at a time through a one-slot channel, the way a
/// socket would, so a later error arrives after earlier data was parsed.
fn paced(
    frames: Vec<Result<Frame<Bytes>, io::Error>>,
) -> StreamBody<impl futures_util::Stream<Item = Result<Frame<Bytes>, io::Error>> + Send + 'static> {
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(async move {
        for frame in frames {
            if tx.send(frame).await.is_err() {
                break;
            }
        }
    });
    StreamBody::new(stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|frame| (frame, rx))
    }))
}

#[tokio::test]
async fn upload_stream_error_is_internal() {
    let mut head = form_file("file", "x.bin", b"");
    // drop the closing delimiter so the part never ends
    head.truncate(head.len() - format!("\r\n--{BOUNDARY}--\r\n").len());
    head.extend_from_slice(b"some bytes");

    let frames = vec![
        Ok(Frame::data(Bytes::from(head))),
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "client went away")),
    ];
    let req = http::Request::post("/upload")
        .header("content-type", form_content_type())
        .body(paced(frames))
        .unwrap();

    let (status, body) = read_json(routes::app().dispatch(req).await).await;
    assert_eq!(status, 500);
    assert!(body["message"].as_str().unwrap().starts_with("reading part"), "{body}");
}

#[tokio::test]
async fn serves_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let server = tokio::spawn(
        Server::with_listener(listener).serve_with_shutdown(routes::app(), async {
            let _ = stopped.await;
        }),
    );

    let body = form_file("file", "hello.txt", b"hello, world!\n");
    let mut request = format!(
        "POST /upload HTTP/1.1\r\n\
         host: {addr}\r\n\
         content-type: {}\r\n\
         content-length: {}\r\n\
         connection: close\r\n\r\n",
        form_content_type(),
        body.len(),
    )
    .into_bytes();
    request.extend_from_slice(&body);

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(&request).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response.ends_with(r#"{"bytesWritten":14}"#), "{response}");

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}
