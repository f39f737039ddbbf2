use crate::api::{ApiClient, Stat};
use crate::quote_card::QuoteCard;

/// The landing page: quick-stat cards plus a featured public quote. Each
/// card resolves independently from the "..." placeholder to the fetched
/// text, or to "err" on failure.
pub struct DashboardPage {
    client: ApiClient,
    cards: Vec<StatCard>,
    featured: Option<QuoteCard>,
}

#[derive(Debug, Clone)]
pub struct StatCard {
    pub stat: Stat,
    pub value: String,
}

const PLACEHOLDER: &str = "...";
const ERR: &str = "err";

impl DashboardPage {
    pub fn new(client: ApiClient) -> Self {
        let cards = [
            Stat::QuoteCount,
            Stat::QuotedAuthorCount,
            Stat::UserCount,
            Stat::WeeklyQuoteCount,
            Stat::MonthlyQuoteCount,
        ]
        .into_iter()
        .map(|stat| StatCard {
            stat,
            value: PLACEHOLDER.to_string(),
        })
        .collect();
        Self {
            client,
            cards,
            featured: None,
        }
    }

    /// All six fetches go out together; each slot keeps its own outcome.
    pub async fn load(&mut self) {
        let (quotes, quoted, users, weekly, monthly, featured) = tokio::join!(
            self.client.fetch_stat(Stat::QuoteCount),
            self.client.fetch_stat(Stat::QuotedAuthorCount),
            self.client.fetch_stat(Stat::UserCount),
            self.client.fetch_stat(Stat::WeeklyQuoteCount),
            self.client.fetch_stat(Stat::MonthlyQuoteCount),
            self.client.random_public_quote(),
        );
        let results = [quotes, quoted, users, weekly, monthly];
        for (card, result) in self.cards.iter_mut().zip(results) {
            card.value = result.unwrap_or_else(|_| ERR.to_string());
        }
        self.featured = featured.ok().map(|quote| QuoteCard::render(&quote));
    }

    /// A random public quote, absent when none exist.
    pub fn featured(&self) -> Option<&QuoteCard> {
        self.featured.as_ref()
    }

    pub fn cards(&self) -> &[StatCard] {
        &self.cards
    }

    pub fn card(&self, stat: Stat) -> &str {
        self.cards
            .iter()
            .find(|card| card.stat == stat)
            .map(|card| card.value.as_str())
            .unwrap_or(PLACEHOLDER)
    }
}
