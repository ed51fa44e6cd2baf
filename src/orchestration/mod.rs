pub mod dashboard;
pub mod ingest;
pub mod session;
pub mod snapshot;

pub use dashboard::{Dashboard, DashboardError, InvestmentOverview, PortfolioOverview};
pub use ingest::{EventIngestor, FetchError};
pub use session::{refresh_investment, InvestmentSession, Resolution, Ticket};
pub use snapshot::{PortfolioReader, ReadError};
