use crate::config::Config;
use crate::datasource::ChainSource;
use crate::domain::ordering::sort_events_descending;
use crate::domain::{
    Address, BlockNumber, Decimal, InvestmentEvent, InvestorHolding, PortfolioSnapshot,
    RebalanceEvent, ViewState,
};
use crate::engine::reconciler::{
    reconcile, Position, ReconcileAnomaly, ReconcileError, RedemptionPolicy,
};
use crate::engine::valuation::{self, AllocationValue, GainFigures, ValuationError};
use crate::orchestration::ingest::{EventIngestor, FetchError};
use crate::orchestration::snapshot::{PortfolioReader, ReadError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Portfolio-wide figures for the overview panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioOverview {
    pub snapshot: PortfolioSnapshot,
    /// Percent return since launch at 1 USDC per unit.
    pub historical_return: Decimal,
    pub allocation_values: Vec<AllocationValue>,
}

/// Everything the "My Investment" panel shows for one investor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvestmentOverview {
    pub holding: InvestorHolding,
    pub unit_value: Decimal,
    pub position: Position,
    pub gains: GainFigures,
    /// Newest first.
    pub events: Vec<InvestmentEvent>,
    pub anomalies: Vec<ReconcileAnomaly>,
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error(transparent)]
    Valuation(#[from] ValuationError),
}

/// Joins ingestion, live reads and reconciliation into display-ready views.
#[derive(Clone)]
pub struct Dashboard {
    ingestor: EventIngestor,
    reader: PortfolioReader,
    policy: RedemptionPolicy,
}

impl Dashboard {
    pub fn new(source: Arc<dyn ChainSource>, config: &Config) -> Self {
        Self {
            ingestor: EventIngestor::new(source.clone(), config),
            reader: PortfolioReader::new(source, config.portfolio_manager.clone()),
            policy: config.redemption_policy,
        }
    }

    pub fn policy(&self) -> RedemptionPolicy {
        self.policy
    }

    /// Latest block seen by the chain source.
    pub async fn chain_head(&self) -> Result<BlockNumber, DashboardError> {
        Ok(self.ingestor.chain_head().await?)
    }

    pub async fn load_portfolio(&self) -> Result<PortfolioOverview, DashboardError> {
        let snapshot = self.reader.read_snapshot().await?;
        let allocation_values =
            valuation::allocation_values(snapshot.total_value, &snapshot.current_allocations)?;
        Ok(PortfolioOverview {
            historical_return: valuation::historical_return(snapshot.unit_value),
            allocation_values,
            snapshot,
        })
    }

    /// Fetch the investor's history and live holding concurrently, then
    /// reconcile once both have arrived.
    pub async fn load_investment(
        &self,
        investor: &Address,
    ) -> Result<InvestmentOverview, DashboardError> {
        let (events, holding, snapshot) = futures::join!(
            self.ingestor.fetch_investment_events(Some(investor)),
            self.reader.read_holding(investor),
            self.reader.read_snapshot(),
        );
        let mut events = events?;
        let holding = holding?;
        let snapshot = snapshot?;

        let reconciliation = reconcile(&events, self.policy)?;
        let gains = valuation::evaluate(&reconciliation.position, &holding, &snapshot)?;

        if !reconciliation.anomalies.is_empty() {
            warn!(
                investor = %investor,
                count = reconciliation.anomalies.len(),
                "Reconciliation finished with anomalies"
            );
        }
        info!(
            investor = %investor,
            events = events.len(),
            cost_basis = %reconciliation.position.total_cost_basis,
            units = %reconciliation.position.total_units_acquired,
            "Reconciled investment position"
        );

        sort_events_descending(&mut events);
        Ok(InvestmentOverview {
            holding,
            unit_value: snapshot.unit_value,
            position: reconciliation.position,
            gains,
            events,
            anomalies: reconciliation.anomalies,
        })
    }

    pub async fn load_rebalances(&self) -> Result<Vec<RebalanceEvent>, DashboardError> {
        Ok(self.ingestor.fetch_rebalances().await?)
    }

    pub async fn portfolio_view(&self) -> ViewState<PortfolioOverview> {
        into_view("portfolio", self.load_portfolio().await)
    }

    pub async fn investment_view(&self, investor: &Address) -> ViewState<InvestmentOverview> {
        into_view("investment", self.load_investment(investor).await)
    }

    pub async fn rebalance_view(&self) -> ViewState<Vec<RebalanceEvent>> {
        into_view("rebalances", self.load_rebalances().await)
    }
}

fn into_view<T>(view: &str, result: Result<T, DashboardError>) -> ViewState<T> {
    if let Err(e) = &result {
        warn!(view, error = %e, "View failed to load");
    }
    ViewState::from_result(result)
}
