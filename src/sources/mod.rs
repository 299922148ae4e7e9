//! Candidate sources: trend feed and news APIs behind one provider trait.
//!
//! Providers are tried as an explicit ordered fallback chain; the first one
//! that answers wins. A provider error is logged and counted, never fatal.

pub mod gnews;
pub mod newsapi;
pub mod trends;

use anyhow::Result;
use async_trait::async_trait;
use metrics::counter;
use tracing::warn;

/// One fetched headline, prior to any generation or gating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateItem {
    pub title: String,
    pub description: String,
    pub url: String,
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Fetch up to `limit` candidates, newest first.
    async fn fetch(&self, limit: u32) -> Result<Vec<CandidateItem>>;

    fn name(&self) -> &'static str;
}

/// Try providers in order, returning the first successful batch together
/// with the winning provider's name. `None` when every provider failed.
pub async fn fetch_first_available(
    providers: &[Box<dyn NewsProvider>],
    limit: u32,
) -> Option<(&'static str, Vec<CandidateItem>)> {
    for p in providers {
        match p.fetch(limit).await {
            Ok(items) => {
                counter!("fetch_items_total").increment(items.len() as u64);
                return Some((p.name(), items));
            }
            Err(e) => {
                warn!(error = ?e, provider = p.name(), "provider error");
                counter!("fetch_provider_errors_total").increment(1);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct Failing;
    #[async_trait]
    impl NewsProvider for Failing {
        async fn fetch(&self, _limit: u32) -> Result<Vec<CandidateItem>> {
            Err(anyhow!("down"))
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct Fixed;
    #[async_trait]
    impl NewsProvider for Fixed {
        async fn fetch(&self, _limit: u32) -> Result<Vec<CandidateItem>> {
            Ok(vec![CandidateItem {
                title: "t".into(),
                description: "d".into(),
                url: "u".into(),
            }])
        }
        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn falls_back_to_next_provider() {
        let providers: Vec<Box<dyn NewsProvider>> = vec![Box::new(Failing), Box::new(Fixed)];
        let (name, items) = fetch_first_available(&providers, 5).await.expect("batch");
        assert_eq!(name, "fixed");
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn none_when_all_fail() {
        let providers: Vec<Box<dyn NewsProvider>> = vec![Box::new(Failing)];
        assert!(fetch_first_available(&providers, 5).await.is_none());
    }
}
