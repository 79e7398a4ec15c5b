//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::io;

use clap::Parser;
use cleanup_directives::error::GetExitCode;
use cleanup_directives::{Args, PROJECT_NAME};
use gettextrs::{bind_textdomain_codeset, setlocale, textdomain, LocaleCategory};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    setlocale(LocaleCategory::LcAll, "");
    textdomain(PROJECT_NAME)?;
    bind_textdomain_codeset(PROJECT_NAME, "UTF-8")?;

    let args = Args::parse();

    let result = cleanup_directives::run(
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
        &mut io::stderr(),
        args,
    );
    std::process::exit(result.get_exit_code())
}
