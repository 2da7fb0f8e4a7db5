// In crates/store/src/fetch.rs

use crate::Store;
use api_client::PortfolioApi;
use async_trait::async_trait;
use core_types::{HierarchyNode, TwrSnapshot};

/// The request/response boundary the store pulls snapshots from.
#[async_trait]
pub trait PortfolioSource: Send + Sync {
    async fn fetch_hierarchy(&self) -> api_client::Result<HierarchyNode>;

    async fn fetch_twr(&self) -> api_client::Result<TwrSnapshot>;
}

#[async_trait]
impl PortfolioSource for PortfolioApi {
    async fn fetch_hierarchy(&self) -> api_client::Result<HierarchyNode> {
        self.get_tag_hierarchy().await
    }

    async fn fetch_twr(&self) -> api_client::Result<TwrSnapshot> {
        self.get_twr().await
    }
}

/// The result of one fetch, with the error already rendered for display.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Hierarchy(Result<HierarchyNode, String>),
    Twr(Result<TwrSnapshot, String>),
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        match self {
            FetchOutcome::Hierarchy(result) => result.is_ok(),
            FetchOutcome::Twr(result) => result.is_ok(),
        }
    }
}

pub async fn fetch_hierarchy<S: PortfolioSource + ?Sized>(source: &S) -> FetchOutcome {
    let result = source.fetch_hierarchy().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch tag hierarchy.");
        e.to_string()
    });
    FetchOutcome::Hierarchy(result)
}

pub async fn fetch_twr<S: PortfolioSource + ?Sized>(source: &S) -> FetchOutcome {
    let result = source.fetch_twr().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch TWR data.");
        e.to_string()
    });
    FetchOutcome::Twr(result)
}

/// Fetches both snapshots concurrently and records them in `store`.
///
/// Each slice goes `Loading` first and then settles on its own; one failing
/// never rolls back or blocks the other.
pub async fn fetch_initial_data<S: PortfolioSource + ?Sized>(store: &mut Store, source: &S) {
    store.begin_hierarchy_fetch();
    store.begin_twr_fetch();

    let (hierarchy, twr) = tokio::join!(fetch_hierarchy(source), fetch_twr(source));

    tracing::info!(hierarchy_ok = hierarchy.is_ok(), twr_ok = twr.is_ok(), "Initial data fetch finished.");
    store.apply_fetch(hierarchy);
    store.apply_fetch(twr);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;
    use api_client::Error;

    struct FakeSource {
        hierarchy_status: Option<u16>,
        twr_status: Option<u16>,
    }

    #[async_trait]
    impl PortfolioSource for FakeSource {
        async fn fetch_hierarchy(&self) -> api_client::Result<HierarchyNode> {
            match self.hierarchy_status {
                Some(code) => Err(Error::HttpStatus(code)),
                None => Ok(HierarchyNode::root("Portfolio", 1.0, vec![])),
            }
        }

        async fn fetch_twr(&self) -> api_client::Result<TwrSnapshot> {
            match self.twr_status {
                Some(code) => Err(Error::HttpStatus(code)),
                None => Ok(TwrSnapshot { twr: 0.02, ..Default::default() }),
            }
        }
    }

    #[tokio::test]
    async fn test_hierarchy_failure_is_independent_of_twr() {
        let mut store = Store::new();
        let source = FakeSource { hierarchy_status: Some(500), twr_status: None };

        fetch_initial_data(&mut store, &source).await;

        assert_eq!(store.hierarchy().status(), Status::Failed);
        assert_eq!(store.hierarchy().data(), None);
        assert_eq!(store.hierarchy().error(), Some("HTTP error! status: 500"));
        assert_eq!(store.twr().status(), Status::Succeeded);
        assert_eq!(store.twr().data().map(|s| s.twr), Some(0.02));
    }

    #[tokio::test]
    async fn test_twr_failure_is_independent_of_hierarchy() {
        let mut store = Store::new();
        let source = FakeSource { hierarchy_status: None, twr_status: Some(503) };

        fetch_initial_data(&mut store, &source).await;

        assert_eq!(store.hierarchy().status(), Status::Succeeded);
        assert_eq!(store.twr().status(), Status::Failed);
        assert_eq!(store.twr().error(), Some("HTTP error! status: 503"));
    }

    #[tokio::test]
    async fn test_single_fetch_outcomes() {
        let source = FakeSource { hierarchy_status: Some(404), twr_status: None };
        assert_eq!(
            fetch_hierarchy(&source).await,
            FetchOutcome::Hierarchy(Err("HTTP error! status: 404".into()))
        );
        assert!(fetch_twr(&source).await.is_ok());
    }
}
