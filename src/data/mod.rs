//! Data layer: core types, loading, derivation and filtering.
//!
//! Architecture:
//! ```text
//!  .json / .csv / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Vec<RawRecord>, drop PER <= 0
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  derive   │  StarSize, temp, gravity, status, relative_dist
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │ PlanetDataset │  Vec<PlanetRecord>, column info, RPLANET extrema
//!   └──────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  radius window + star sizes → filtered indices
//!   └──────────┘
//! ```

pub mod derive;
pub mod filter;
pub mod loader;
pub mod model;
