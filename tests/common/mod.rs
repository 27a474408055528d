#![allow(dead_code)]

use assert_cmd::cargo_bin;
use std::path::Path;
use std::process::Command;

/// A `storefront` invocation rooted at its own data directory.
pub fn storefront(data_dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin!("storefront"));
    cmd.env_remove("STOREFRONT_WALLET")
        .env_remove("STOREFRONT_UNIT")
        .env_remove("STOREFRONT_CART_KEY")
        .env_remove("STOREFRONT_DB_PATH")
        .env("RUST_LOG", "warn")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

/// Fast checkout flags: no gateway delay, 1ms ticks.
pub const FAST_CHECKOUT: [&str; 4] = ["--payment-delay-ms", "0", "--tick-ms", "1"];

pub fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().expect("Failed to execute command");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}
