use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use yansi::Paint;

use super::error::ApiError;

static SILENT: AtomicBool = AtomicBool::new(false);

pub fn set_silent(silent: bool) {
    SILENT.store(silent, Ordering::Relaxed);
}

fn log_output(msg: String) {
    if !SILENT.load(Ordering::Relaxed) {
        println!("{}", msg);
    }
}

/// HTTP client for the blueprint and compose API.
#[derive(Clone, Debug)]
pub struct ComposerClient {
    client: reqwest::Client,
    base_url: String,
}

impl ComposerClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("composer/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Core request function: builds the request, logs it curl-style and
    /// turns HTTP and API level failures into `ApiError`.
    pub async fn call(&self, method: &str, endpoint: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        log_request(method, &url, body.as_ref());

        let mut req = match method {
            "GET" => self.client.get(&url),
            "POST" => self.client.post(&url),
            "PUT" => self.client.put(&url),
            "DELETE" => self.client.delete(&url),
            _ => self.client.get(&url),
        };
        if let Some(ref b) = body {
            req = req.json(b);
        }

        let resp = req.send().await.map_err(|e| {
            tracing::error!(%e, %url, "Request failed");
            ApiError::Network(e.to_string())
        })?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| ApiError::Network(e.to_string()))?;

        // Grayed out so the request line stands out
        log_output(format!("Response:\n{}", Paint::new(&text).rgb(100, 100, 100)));

        if !status.is_success() {
            let detail = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| error_messages(&v))
                .unwrap_or(text);
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: detail,
            });
        }

        let payload: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?
        };
        check_status(&payload)?;
        Ok(payload)
    }
}

fn log_request(method: &str, url: &str, body: Option<&Value>) {
    let mut parts = Vec::new();
    parts.push(Paint::new("curl").fg(yansi::Color::Green).bold().to_string());
    parts.push(format!("-X {}", Paint::new(method).fg(yansi::Color::Yellow).bold()));
    parts.push(format!("'{}'", Paint::new(url).fg(yansi::Color::Cyan)));
    if let Some(d) = body {
        parts.push(format!(
            "{} {}",
            Paint::new("-H").fg(yansi::Color::Magenta),
            Paint::new("'Content-Type: application/json'").fg(yansi::Color::Magenta)
        ));
        let json_str = serde_json::to_string_pretty(d).unwrap_or_default();
        let escaped_json = json_str.replace('\'', "'\\''");
        parts.push(format!(
            "{} {}",
            Paint::new("-d").fg(yansi::Color::Blue),
            Paint::new(format!("'{}'", escaped_json)).fg(yansi::Color::White)
        ));
    }
    log_output(format!("Request:\n{}", parts.join(" ")));
}

/// Rejects payloads of the form `{"status": false, "errors": [...]}`.
pub fn check_status(payload: &Value) -> Result<(), ApiError> {
    if payload.get("status").and_then(|s| s.as_bool()) == Some(false) {
        let msg = error_messages(payload).unwrap_or_else(|| "request was not accepted".to_string());
        return Err(ApiError::Api(msg));
    }
    Ok(())
}

/// Joins the `msg` fields of an `errors` array, if there is one.
pub fn error_messages(payload: &Value) -> Option<String> {
    let errors = payload.get("errors")?.as_array()?;
    let msgs: Vec<String> = errors
        .iter()
        .filter_map(|e| match e {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => obj.get("msg").and_then(|m| m.as_str()).map(|m| {
                match obj.get("id").and_then(|i| i.as_str()) {
                    Some(id) => format!("{}: {}", id, m),
                    None => m.to_string(),
                }
            }),
            _ => None,
        })
        .collect();
    if msgs.is_empty() {
        None
    } else {
        Some(msgs.join("; "))
    }
}
