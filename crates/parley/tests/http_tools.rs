//! HTTP-backed pieces exercised against a loopback server.
//!
//! Each test starts a one-shot server on a random port that records the
//! request and answers with a canned response.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

use parley::OpenRouterClient;
use parley::bot::{BotConfig, ChatBot};
use parley::llm::LanguageModel;
use parley::tools::search::NO_RESULT;
use parley::tools::{
    BrowserTool, GoogleSearch, GoogleSearchResults, SearchApiWrapper, Tool, ToolSet,
};

struct Recorded {
    request_line: String,
    body: String,
}

/// Serve one request with `status` and `body`; the recorded request arrives
/// on the returned channel.
fn serve_once(status: &str, content_type: &str, body: &str) -> (String, mpsc::Receiver<Recorded>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut content_length = 0;
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).unwrap();
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':')
                && name.eq_ignore_ascii_case("content-length")
            {
                content_length = value.trim().parse().unwrap();
            }
        }
        let mut body = vec![0; content_length];
        reader.read_exact(&mut body).unwrap();

        let mut stream = reader.into_inner();
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();

        tx.send(Recorded {
            request_line: request_line.trim_end().to_string(),
            body: String::from_utf8(body).unwrap(),
        })
        .unwrap();
    });

    (base, rx)
}

// ── Browser ──────────────────────────────────────────────────────────

#[test]
fn browser_returns_filtered_page_text() {
    let html = "<html><head><title>x</title><script>track()</script></head>\
                <body><h1>Welcome</h1><p>Fish &amp; chips</p></body></html>";
    let (base, rx) = serve_once("200 OK", "text/html", html);

    let tool = BrowserTool::new();
    let text = tool.run(&format!("  {base}/menu  ")).unwrap();
    assert_eq!(text, "Welcome\nFish & chips");
    assert_eq!(rx.recv().unwrap().request_line, "GET /menu HTTP/1.1");
}

#[test]
fn browser_http_error_becomes_observation() {
    let (base, _rx) = serve_once("404 Not Found", "text/html", "<p>missing</p>");

    let tools = ToolSet::new().with(BrowserTool::new());
    let observation = tools.execute("browser", &format!("{base}/gone"));
    assert!(observation.starts_with("Error: HTTP 404 Not Found"));
}

// ── Search ───────────────────────────────────────────────────────────

const SEARCH_BODY: &str = r#"{
    "items": [
        {"title": "Paris weather", "link": "https://w.example/paris", "snippet": "Sunny, 21C."},
        {"title": "Forecast", "link": "https://f.example", "snippet": "Rain later."},
        {"title": "No snippet", "link": "https://n.example"}
    ]
}"#;

fn search_api(base: &str) -> SearchApiWrapper {
    SearchApiWrapper::new("test key", "cx-1")
        .unwrap()
        .with_endpoint(format!("{base}/customsearch/v1"))
}

#[test]
fn google_search_joins_snippets() {
    let (base, rx) = serve_once("200 OK", "application/json", SEARCH_BODY);

    let tool = GoogleSearch::new(search_api(&base));
    assert_eq!(tool.run("weather in Paris").unwrap(), "Sunny, 21C. Rain later.");

    let request = rx.recv().unwrap().request_line;
    assert!(request.starts_with(
        "GET /customsearch/v1?key=test%20key&cx=cx-1&q=weather%20in%20Paris&num=10 "
    ));
}

#[test]
fn google_search_keeps_snippets_of_untitled_items() {
    let body = r#"{"items": [{"snippet": "Only a snippet."}, {"title": "T", "link": "https://t.example", "snippet": "Full hit."}]}"#;
    let (base, _rx) = serve_once("200 OK", "application/json", body);
    let tool = GoogleSearch::new(search_api(&base));
    assert_eq!(tool.run("q").unwrap(), "Only a snippet. Full hit.");
}

#[test]
fn google_search_without_items() {
    let (base, _rx) = serve_once("200 OK", "application/json", r#"{"kind": "customsearch"}"#);
    let tool = GoogleSearch::new(search_api(&base));
    assert_eq!(tool.run("zzzz").unwrap(), NO_RESULT);
}

#[test]
fn google_search_json_returns_top_results() {
    let (base, rx) = serve_once("200 OK", "application/json", SEARCH_BODY);

    let tool = GoogleSearchResults::new(search_api(&base)).num_results(2);
    let output = tool.run("weather").unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value[0]["title"], "Paris weather");
    assert_eq!(value[1]["snippet"], "Rain later.");
    assert!(rx.recv().unwrap().request_line.contains("&num=2 "));
}

#[test]
fn google_search_api_error() {
    let (base, _rx) = serve_once("403 Forbidden", "application/json", r#"{"error": "denied"}"#);
    let tool = GoogleSearch::new(search_api(&base));
    let err = tool.run("x").unwrap_err();
    assert!(err.to_string().contains("search API HTTP 403 Forbidden"));
}

// ── Completion client ────────────────────────────────────────────────

#[test]
fn client_sends_prompt_and_stop_sequences() {
    let body = r#"{"choices": [{"message": {"content": "AI: Bonjour."}, "finish_reason": "stop"}]}"#;
    let (base, rx) = serve_once("200 OK", "application/json", body);

    let client = OpenRouterClient::new("sk-test")
        .unwrap()
        .with_endpoint(format!("{base}/v1/chat/completions"))
        .with_model("test/model");
    let tools = ToolSet::new();
    let mut bot = ChatBot::new(&client, &tools, BotConfig::default());

    let result = bot.chat("Say hello in French").unwrap();
    assert_eq!(result.output, "Bonjour.");

    let recorded = rx.recv().unwrap();
    assert_eq!(recorded.request_line, "POST /v1/chat/completions HTTP/1.1");
    let sent: serde_json::Value = serde_json::from_str(&recorded.body).unwrap();
    assert_eq!(sent["model"], "test/model");
    assert_eq!(sent["messages"][0]["role"], "user");
    assert!(
        sent["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("New input: Say hello in French")
    );
    assert_eq!(sent["stop"][0], "\nObservation:");
    assert_eq!(sent["stop"][1], "\n\tObservation:");
}

#[test]
fn client_reports_http_errors() {
    let (base, _rx) = serve_once("401 Unauthorized", "application/json", r#"{"error": {"message": "bad key"}}"#);
    let client = OpenRouterClient::new("bad")
        .unwrap()
        .with_endpoint(format!("{base}/v1/chat/completions"));
    let err = client.complete("hi", &[]).unwrap_err();
    assert!(err.contains("HTTP 401"));
}
