//! Server-sent-events plumbing shared by the streaming chat clients.
//!
//! Both providers stream completions as SSE: newline-delimited `data:` lines
//! carrying one JSON payload each. A background task reads the byte stream,
//! reassembles lines across chunk boundaries, and forwards extracted text
//! fragments through a channel; dropping the returned stream drops the
//! receiver and the task stops at its next send.

use futures::channel::mpsc;
use futures::StreamExt;
use tracing::debug;

use super::{CompletionStream, LlmError};

/// Extract the payload of an SSE `data:` line, if it is one
pub(crate) fn parse_sse_data_line(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim)
}

/// Turn an SSE response body into a [`CompletionStream`].
///
/// `extract` maps one `data:` payload to an optional text fragment;
/// payloads mapping to `None` (role deltas, usage frames) are skipped.
/// The OpenAI `[DONE]` sentinel terminates the stream.
pub(crate) fn sse_completion_stream<F>(response: reqwest::Response, extract: F) -> CompletionStream
where
    F: Fn(&str) -> Result<Option<String>, LlmError> + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded();

    tokio::spawn(async move {
        let mut bytes = response.bytes_stream();
        let mut buffer = String::new();

        while let Some(item) = bytes.next().await {
            let chunk = match item {
                Ok(chunk) => chunk,
                Err(e) => {
                    let _ = tx.unbounded_send(Err(LlmError::Network {
                        message: format!("stream interrupted: {e}"),
                    }));
                    return;
                }
            };
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(pos) = buffer.find('\n') {
                let line: String = buffer.drain(..=pos).collect();
                let line = line.trim();
                let Some(data) = parse_sse_data_line(line) else {
                    continue;
                };
                if data == "[DONE]" {
                    debug!("completion stream finished");
                    return;
                }
                match extract(data) {
                    Ok(Some(fragment)) => {
                        if tx.unbounded_send(Ok(fragment)).is_err() {
                            // Receiver dropped; stop reading.
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        let _ = tx.unbounded_send(Err(e));
                        return;
                    }
                }
            }
        }
    });

    Box::pin(rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sse_data_line() {
        assert_eq!(parse_sse_data_line("data: {\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(parse_sse_data_line("data:[DONE]"), Some("[DONE]"));
        assert_eq!(parse_sse_data_line("data: [DONE]"), Some("[DONE]"));
        assert_eq!(parse_sse_data_line("event: ping"), None);
        assert_eq!(parse_sse_data_line(""), None);
        assert_eq!(parse_sse_data_line(": keep-alive comment"), None);
    }
}
