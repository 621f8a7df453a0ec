#![deny(unsafe_code)]

//! `snapvault` process entry point: installs the allocator and hands off
//! to [`cli::run`], translating a failure into a logged message and a
//! non-zero exit code.

use std::process::ExitCode;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("snapvault: {err}");
            ExitCode::FAILURE
        }
    }
}
