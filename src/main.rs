//! # tiny-events CLI
//!
//! Demonstrates scoped event channels from the command line.
//!
//! ## Usage
//! ```bash
//! tiny-events demo --modal-id settings
//! tiny-events inspect --output json
//! ```

mod cli;

#[cfg(test)]
#[allow(dead_code)]
#[path = "test_support.rs"]
mod test_support;

use tiny_events::Result;

fn main() -> Result<()> {
    cli::run()
}
