//! Per-shell selection state. A load started for one investor must not land
//! after the shell has moved on to another.

use crate::domain::{Address, ViewState};
use crate::orchestration::dashboard::{Dashboard, InvestmentOverview};
use tokio::sync::Mutex;
use tracing::debug;

/// Identifies one in-flight load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub investor: Address,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Stale,
}

#[derive(Debug, Clone)]
pub struct InvestmentSession<T> {
    selected: Option<Address>,
    generation: u64,
    view: ViewState<T>,
}

impl<T> Default for InvestmentSession<T> {
    fn default() -> Self {
        Self {
            selected: None,
            generation: 0,
            view: ViewState::Loading,
        }
    }
}

impl<T> InvestmentSession<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&Address> {
        self.selected.as_ref()
    }

    pub fn view(&self) -> &ViewState<T> {
        &self.view
    }

    /// Switch to `investor` and start a fresh load. Any earlier ticket is
    /// now stale.
    pub fn select_investor(&mut self, investor: Address) -> Ticket {
        self.generation += 1;
        self.selected = Some(investor.clone());
        self.view = ViewState::Loading;
        Ticket {
            investor,
            generation: self.generation,
        }
    }

    /// Drop the selection, e.g. on wallet disconnect.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.selected = None;
        self.view = ViewState::Loading;
    }

    /// Apply `view` only if `ticket` is still the latest load.
    pub fn resolve(&mut self, ticket: &Ticket, view: ViewState<T>) -> Resolution {
        let current = self.generation == ticket.generation
            && self.selected.as_ref() == Some(&ticket.investor);
        if !current {
            debug!(
                investor = %ticket.investor,
                generation = ticket.generation,
                latest = self.generation,
                "Discarding stale response"
            );
            return Resolution::Stale;
        }
        self.view = view;
        Resolution::Applied
    }
}

/// Select `investor`, load the investment view and apply it unless the
/// session moved on while the load was in flight.
pub async fn refresh_investment(
    dashboard: &Dashboard,
    session: &Mutex<InvestmentSession<InvestmentOverview>>,
    investor: Address,
) -> Resolution {
    let ticket = session.lock().await.select_investor(investor);
    let view = dashboard.investment_view(&ticket.investor).await;
    session.lock().await.resolve(&ticket, view)
}
