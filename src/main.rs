//! # lumiscan CLI
//!
//! Command-line interface for the barcode scanning core.
//!
//! ## Usage
//! ```bash
//! lumiscan scan ~/Pictures/receipts --formats qr
//! lumiscan scan ticket.jpg --output json --normalized
//! lumiscan classify "WIFI:T:WPA;S:home;P:secret;;"
//! ```

mod cli;

use lumiscan::Result;

fn main() -> Result<()> {
    cli::run()
}
