//! # Secondary-Key Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Nodes, validator networks, transactions
//! └── integration/      # Cross-component flows
//!     ├── account_flow.rs
//!     └── vote_extension_flow.rs
//! tests/benches/        # criterion benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sk-tests
//! RUST_LOG=secondary_keys=debug cargo test -p sk-tests -- --nocapture
//! cargo bench -p sk-tests
//! ```

pub mod integration;
