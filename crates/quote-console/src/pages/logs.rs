use quote_types::logs::LogEntry;

use crate::api::ApiClient;

/// The logs page fetches one fixed window and renders entries raw; it is
/// one of the two places that surface failure text instead of a toast.
pub struct LogsPage {
    client: ApiClient,
    entries: Vec<LogEntry>,
    error: Option<&'static str>,
}

const FETCH_LIMIT: u32 = 200;
const FETCH_FAILED: &str = "Could not fetch logs.";

/// One rendered log row: the action-type label plus pretty-printed details
/// for map-shaped actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLog {
    pub label: &'static str,
    pub details: Option<String>,
}

impl LogsPage {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            entries: Vec::new(),
            error: None,
        }
    }

    pub async fn load(&mut self) {
        match self.client.fetch_logs(FETCH_LIMIT, 1).await {
            Ok(entries) => {
                self.entries = entries;
                self.error = None;
            }
            Err(_) => {
                self.entries = Vec::new();
                self.error = Some(FETCH_FAILED);
            }
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    pub fn rendered(&self) -> Vec<RenderedLog> {
        self.entries
            .iter()
            .map(|entry| RenderedLog {
                label: entry.action.label(),
                details: entry
                    .action
                    .details()
                    .map(|v| serde_json::to_string_pretty(&v).unwrap_or_default()),
            })
            .collect()
    }
}
