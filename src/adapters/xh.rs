use std::collections::BTreeMap;
use std::process::{Command, Stdio};

use tracing::trace;

use crate::api::{HttpRequest, HttpResponse, Transport};
use crate::domain::error::TransportError;

/// Transport that shells out to the `xh` HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XhTransport {
    bin: String,
}

impl XhTransport {
    /// `bin` is a path or a name looked up on `PATH`.
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl Transport for XhTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut command = Command::new(&self.bin);
        command
            .arg("--ignore-stdin")
            .arg("--pretty=none")
            .arg("--print=hb")
            .arg(request.method.as_str())
            .arg(request.url.as_str());

        for (name, value) in &request.headers {
            command.arg(format!("{name}:{value}"));
        }
        if let Some(body) = request.body.as_ref() {
            command.arg("--raw").arg(body);
        }
        trace!(bin = %self.bin, ?command, "spawning xh");

        let output = match command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child.wait_with_output().map_err(TransportError::Spawn)?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(TransportError::Unavailable);
            }
            Err(error) => return Err(TransportError::Spawn(error)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8(output.stderr)
                .unwrap_or_else(|_| "failed to decode xh stderr".to_string());
            return Err(TransportError::Execution(stderr.trim().to_string()));
        }

        parse_response(&output.stdout)
    }
}

fn parse_response(raw: &[u8]) -> Result<HttpResponse, TransportError> {
    let text = std::str::from_utf8(raw).map_err(TransportError::Decode)?;
    let normalized = text.replace("\r\n", "\n");
    let (head, body) = split_head_and_body(normalized.as_str());

    let mut lines = head.lines();
    let status_line = lines
        .next()
        .ok_or_else(|| TransportError::Parse("missing HTTP status line".to_string()))?;
    let (status, status_text) = parse_status_line(status_line)?;

    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let (name, value) = trimmed
            .split_once(':')
            .ok_or_else(|| TransportError::Parse(format!("invalid header line `{trimmed}`")))?;
        let key = name.trim().to_ascii_lowercase();
        if key.is_empty() {
            return Err(TransportError::Parse(
                "header name cannot be empty".to_string(),
            ));
        }
        let value = value.trim().to_string();
        headers
            .entry(key)
            .and_modify(|existing| {
                if !existing.is_empty() {
                    existing.push_str(", ");
                }
                existing.push_str(value.as_str());
            })
            .or_insert(value);
    }

    Ok(HttpResponse {
        status,
        status_text,
        headers,
        body: body.trim_end_matches('\n').to_string(),
    })
}

fn split_head_and_body(input: &str) -> (&str, &str) {
    if let Some((head, body)) = input.split_once("\n\n") {
        (head, body)
    } else {
        (input, "")
    }
}

/// `HTTP/1.1 404 NOT FOUND` -> `(404, "NOT FOUND")`.
fn parse_status_line(status_line: &str) -> Result<(u16, String), TransportError> {
    let mut tokens = status_line.trim().splitn(3, ' ');
    let http_version = tokens.next().unwrap_or_default();
    if !http_version.starts_with("HTTP/") {
        return Err(TransportError::Parse(format!(
            "status line must start with HTTP version, got `{status_line}`"
        )));
    }
    let status_raw = tokens
        .next()
        .filter(|token| !token.is_empty())
        .ok_or_else(|| TransportError::Parse("missing status code in status line".to_string()))?;
    let status = status_raw
        .parse::<u16>()
        .map_err(|_| TransportError::Parse(format!("invalid status code `{status_raw}`")))?;
    let status_text = tokens.next().unwrap_or_default().trim().to_string();
    Ok((status, status_text))
}
