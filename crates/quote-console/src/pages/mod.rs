//! Page state machines. One struct per routed page; every management page
//! implements the same contract: `load()` on mount, dialog-gated mutations,
//! unconditional re-fetch afterwards.

pub mod authors;
pub mod dashboard;
pub mod login;
pub mod logs;
pub mod password;
pub mod users;

/// Outcome of a page's collection fetch, kept around for the lockout
/// check. Status 0 stands in for a request that never got an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchStat {
    pub status: u16,
}

impl FetchStat {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub(crate) fn fetch_stat_of(err: &crate::ConsoleError) -> FetchStat {
    FetchStat {
        status: err.status().map(|s| s.as_u16()).unwrap_or(0),
    }
}
