// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Ward server entry point.

use ward_bin::cli::Cli;
use ward_bin::error::report_error_and_exit;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if let Err(e) = ward_bin::commands::execute(cli).await {
        report_error_and_exit(e);
    }
}
