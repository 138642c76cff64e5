use std::time::Duration;

use flume::{Receiver, Sender};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::PlaygroundConfig;
use crate::models::FileLanguage;

/// Markdown code-fence markers some providers wrap their reply in, with or
/// without a language tag.
static FENCE_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```[a-z]*\n?").expect("fence marker pattern compiles"));

/// Outcome messages sent back from the spawned request tasks. Each carries
/// the token of the request that produced it so the coordinator can tell a
/// live result from a superseded one.
#[derive(Debug, Clone)]
enum SuggestionMessage {
    Completed { id: u64, suggestion: String },
    Failed { id: u64, error: String },
}

/// What polling produced: an applicable suggestion, or the explicit
/// "nothing to suggest" outcome (empty reply or provider failure).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionOutcome {
    Suggestion(String),
    NoSuggestion,
}

#[derive(Debug, Serialize)]
struct SuggestionRequestBody<'a> {
    code: &'a str,
    language: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct SuggestionResponseBody {
    #[serde(default)]
    suggestion: String,
    #[serde(default)]
    error: Option<String>,
}

/// Issues inline-completion requests and arbitrates their results.
///
/// Requests are triggered on every cursor move and cannot be cancelled at
/// the provider, so the coordinator assigns a monotonically increasing
/// token to each request and remembers only the latest. A result arriving
/// with any other token is discarded silently; the editing flow never sees
/// stale text. Provider failures degrade to "no suggestion"; the activity
/// is advisory and must not interrupt editing.
pub struct SuggestionCoordinator {
    endpoint: String,
    request_timeout: Duration,
    client: reqwest::Client,
    next_request_id: u64,
    pending_request_id: Option<u64>,
    tx: Sender<SuggestionMessage>,
    rx: Receiver<SuggestionMessage>,
}

impl SuggestionCoordinator {
    pub fn new(config: &PlaygroundConfig) -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            endpoint: config.suggestion_endpoint.clone(),
            request_timeout: config.suggestion_timeout(),
            client: reqwest::Client::new(),
            next_request_id: 0,
            pending_request_id: None,
            tx,
            rx,
        }
    }

    /// Marks the next request as the latest and hands out its token.
    fn begin(&mut self) -> u64 {
        self.next_request_id += 1;
        self.pending_request_id = Some(self.next_request_id);
        self.next_request_id
    }

    /// Fires a single-shot completion request for the text from document
    /// start up to the cursor. Any request still in flight is superseded
    /// immediately; its result will be dropped on arrival.
    pub fn request(&mut self, code_prefix: &str, language: FileLanguage) -> u64 {
        let id = self.begin();
        let tx = self.tx.clone();
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let request_timeout = self.request_timeout;
        let code = code_prefix.to_string();

        tracing::debug!(id, language = language.as_str(), "issuing suggestion request");
        tokio::spawn(async move {
            let message =
                match fetch_suggestion(&client, &endpoint, request_timeout, &code, language).await {
                    Ok(suggestion) => SuggestionMessage::Completed { id, suggestion },
                    Err(e) => SuggestionMessage::Failed {
                        id,
                        error: e.to_string(),
                    },
                };
            // The coordinator may be gone by the time we finish; that is
            // the same as the result being stale.
            let _ = tx.send(message);
        });
        id
    }

    /// Drains arrived results without blocking. Only the latest issued
    /// request may produce an outcome; everything else is discarded.
    /// `None` means nothing applicable has arrived yet.
    pub fn poll(&mut self) -> Option<SuggestionOutcome> {
        while let Ok(message) = self.rx.try_recv() {
            match message {
                SuggestionMessage::Completed { id, suggestion }
                    if self.pending_request_id == Some(id) =>
                {
                    self.pending_request_id = None;
                    let cleaned = strip_code_fences(&suggestion);
                    if cleaned.is_empty() {
                        return Some(SuggestionOutcome::NoSuggestion);
                    }
                    return Some(SuggestionOutcome::Suggestion(cleaned));
                }
                SuggestionMessage::Failed { id, error } if self.pending_request_id == Some(id) => {
                    self.pending_request_id = None;
                    tracing::debug!(id, error, "suggestion request failed");
                    return Some(SuggestionOutcome::NoSuggestion);
                }
                SuggestionMessage::Completed { id, .. } | SuggestionMessage::Failed { id, .. } => {
                    tracing::debug!(id, "discarding stale suggestion result");
                }
            }
        }
        None
    }

    pub fn has_pending(&self) -> bool {
        self.pending_request_id.is_some()
    }

    #[cfg(test)]
    fn inject_completed(&self, id: u64, suggestion: &str) {
        self.tx
            .send(SuggestionMessage::Completed {
                id,
                suggestion: suggestion.to_string(),
            })
            .unwrap();
    }

    #[cfg(test)]
    fn inject_failed(&self, id: u64, error: &str) {
        self.tx
            .send(SuggestionMessage::Failed {
                id,
                error: error.to_string(),
            })
            .unwrap();
    }
}

async fn fetch_suggestion(
    client: &reqwest::Client,
    endpoint: &str,
    request_timeout: Duration,
    code: &str,
    language: FileLanguage,
) -> anyhow::Result<String> {
    let response = client
        .post(endpoint)
        .timeout(request_timeout)
        .json(&SuggestionRequestBody {
            code,
            language: language.as_str(),
        })
        .send()
        .await?;

    let status = response.status();
    let body: SuggestionResponseBody = response.json().await.unwrap_or_default();
    if !status.is_success() {
        anyhow::bail!(
            "provider returned {status}: {}",
            body.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    Ok(body.suggestion)
}

/// Strips leading/trailing code-fence markers and surrounding whitespace.
/// The remainder is the suggestion text; empty means "no suggestion".
fn strip_code_fences(raw: &str) -> String {
    FENCE_MARKERS.replace_all(raw, "").trim().to_string()
}

/// Cuts the completion prefix out of a document: everything from the
/// start up to the cursor at zero-based (line, column), never text after
/// it. Columns count characters, the way editors report them.
pub fn prefix_at(content: &str, line: usize, column: usize) -> &str {
    let mut offset = 0;
    for (index, text) in content.split('\n').enumerate() {
        if index == line {
            let column_bytes = text
                .char_indices()
                .nth(column)
                .map(|(i, _)| i)
                .unwrap_or(text.len());
            return &content[..offset + column_bytes];
        }
        offset += text.len() + 1;
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator() -> SuggestionCoordinator {
        SuggestionCoordinator::new(&PlaygroundConfig::default())
    }

    #[test]
    fn strips_fences_with_language_tag() {
        assert_eq!(strip_code_fences("```py\nx = 1\n```"), "x = 1");
    }

    #[test]
    fn strips_bare_fences_and_whitespace() {
        assert_eq!(strip_code_fences("```\nfor i in range(3):\n```"), "for i in range(3):");
        assert_eq!(strip_code_fences("  y = 2  \n"), "y = 2");
        assert_eq!(strip_code_fences("plain text"), "plain text");
    }

    #[test]
    fn whitespace_only_reply_is_no_suggestion() {
        let mut coordinator = coordinator();
        let id = coordinator.begin();
        coordinator.inject_completed(id, "```\n   \n```");
        assert_eq!(coordinator.poll(), Some(SuggestionOutcome::NoSuggestion));
    }

    #[test]
    fn provider_failure_degrades_to_no_suggestion() {
        let mut coordinator = coordinator();
        let id = coordinator.begin();
        coordinator.inject_failed(id, "provider returned 500");
        assert_eq!(coordinator.poll(), Some(SuggestionOutcome::NoSuggestion));
        assert!(!coordinator.has_pending());
    }

    #[test]
    fn latest_request_wins_when_results_arrive_in_order() {
        let mut coordinator = coordinator();
        let first = coordinator.begin();
        let second = coordinator.begin();

        // The stale result arrives first and must be skipped over.
        coordinator.inject_completed(first, "stale line");
        coordinator.inject_completed(second, "fresh line");

        assert_eq!(
            coordinator.poll(),
            Some(SuggestionOutcome::Suggestion("fresh line".to_string()))
        );
        assert_eq!(coordinator.poll(), None);
    }

    #[test]
    fn late_arriving_stale_result_is_discarded_silently() {
        let mut coordinator = coordinator();
        let first = coordinator.begin();
        let second = coordinator.begin();

        coordinator.inject_completed(second, "fresh line");
        assert_eq!(
            coordinator.poll(),
            Some(SuggestionOutcome::Suggestion("fresh line".to_string()))
        );

        // The superseded request's result arrives after the fact.
        coordinator.inject_completed(first, "stale line");
        assert_eq!(coordinator.poll(), None);
        assert!(!coordinator.has_pending());
    }

    #[test]
    fn prefix_stops_at_the_cursor() {
        let content = "line one\nline two\nline three";
        assert_eq!(prefix_at(content, 0, 4), "line");
        assert_eq!(prefix_at(content, 1, 0), "line one\n");
        assert_eq!(prefix_at(content, 1, 8), "line one\nline two");
        // A column past the end of the line clamps to the full line.
        assert_eq!(prefix_at(content, 0, 99), "line one");
        // A line past the end of the document takes everything.
        assert_eq!(prefix_at(content, 99, 0), content);
    }

    #[test]
    fn tokens_increase_monotonically() {
        let mut coordinator = coordinator();
        let a = coordinator.begin();
        let b = coordinator.begin();
        let c = coordinator.begin();
        assert!(a < b && b < c);
    }
}
