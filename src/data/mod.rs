//! Data layer: results tables, queries and derived series.
//!
//! Architecture:
//! ```text
//!   raw trial logs
//!        │  generator (external command)
//!        ▼
//!   ┌──────────┐
//!   │  store    │  resolve dir/<dataset>.csv, generate on miss
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse .csv / .json / .parquet → ResultsTable
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  column = value predicates → (x, y) Series
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  series   │  ratio / average / elementwise max
//!   └──────────┘
//! ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod series;
pub mod store;

pub use error::DataError;
pub use filter::{query, Filter};
pub use model::{Cell, ResultsTable};
pub use series::{average, elementwise_max, ratio, Ratio, RatioOutcome, Series, SpeedupSummary};
pub use store::{CommandGenerator, TablePath, TableGenerator, TableStore};
