//! Owned render model for a quote card: attribution runs, the clearance
//! badge color, and the footer line, ready for whatever widget toolkit
//! the shell draws with.

use quote_types::models::Quote;
use quote_types::render::{clearance_color, group_lines};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteCard {
    pub runs: Vec<AttributedRun>,
    pub clearance: u8,
    /// `hsl(...)` badge color derived from the clearance.
    pub clearance_color: String,
    pub likes: i64,
    pub timestamp: String,
    pub context: Option<String>,
}

/// Lines sharing one author, labelled once after the last line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributedRun {
    pub lines: Vec<String>,
    pub author_label: String,
}

impl QuoteCard {
    pub fn render(quote: &Quote) -> Self {
        let runs = group_lines(&quote.lines)
            .into_iter()
            .map(|run| AttributedRun {
                lines: run.lines.iter().map(|line| line.content.clone()).collect(),
                author_label: format!("— {}", run.author.name),
            })
            .collect();

        Self {
            runs,
            clearance: quote.clearance,
            clearance_color: clearance_color(quote.clearance as i64),
            likes: quote.likes,
            timestamp: quote.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            context: quote.context.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use quote_types::models::{LineAuthor, QuoteLine};
    use uuid::Uuid;

    fn quote() -> Quote {
        let ada = LineAuthor {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            obfname: "Raven".into(),
        };
        let bob = LineAuthor {
            id: Uuid::new_v4(),
            name: "Bob".into(),
            obfname: "Sparrow".into(),
        };
        let line = |author: &LineAuthor, position: u8, content: &str| QuoteLine {
            id: Uuid::new_v4(),
            content: content.into(),
            position,
            author: author.clone(),
        };
        Quote {
            id: Uuid::new_v4(),
            context: Some("standup".into()),
            clearance: 0,
            likes: 4,
            timestamp: Utc.with_ymd_and_hms(2026, 2, 1, 9, 30, 0).unwrap(),
            lines: vec![
                line(&ada, 0, "one"),
                line(&ada, 1, "two"),
                line(&bob, 2, "three"),
            ],
        }
    }

    #[test]
    fn card_carries_one_label_per_run() {
        let card = QuoteCard::render(&quote());
        assert_eq!(card.runs.len(), 2);
        assert_eq!(card.runs[0].lines, vec!["one", "two"]);
        assert_eq!(card.runs[0].author_label, "— Ada");
        assert_eq!(card.runs[1].author_label, "— Bob");
    }

    #[test]
    fn card_footer_fields() {
        let card = QuoteCard::render(&quote());
        assert_eq!(card.clearance_color, "hsl(100, 45%, 50%)");
        assert_eq!(card.likes, 4);
        assert_eq!(card.timestamp, "2026-02-01 09:30");
        assert_eq!(card.context.as_deref(), Some("standup"));
    }
}
