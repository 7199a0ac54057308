//! Month-by-month financial projection of solar sales proposals.
//!
//! Projects consumption, generation, net-metering credits, and the monthly
//! utility bill over the proposal horizon, and aggregates the savings and
//! payback figures shown to the customer.

pub mod config;
pub mod error;
pub mod io;
/// Generation-factor lookup by location.
pub mod location;
pub mod proposal;
/// Projection engine: tariffs, projection, compensation, billing, and the monthly driver.
pub mod sim;
pub mod telemetry;

pub use error::{Error, Result};
pub use proposal::{ProposalScenarios, sales_proposal_scenarios};
