mod common;

use assert_cmd::prelude::*;
use common::{stdout_of, storefront};
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_catalog_list_is_seeded() {
    let dir = tempdir().unwrap();

    storefront(dir.path())
        .args(["catalog", "list", "--sort", "price-low"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "id,name,category,price,status\n5,Liquidity Pool Access,DeFi,0.5 ETH,active\n",
        ))
        .stdout(predicate::str::contains("3,Metaverse Land Plot,Virtual Real Estate,5.2 ETH,active"));
}

#[test]
fn test_catalog_list_filters() {
    let dir = tempdir().unwrap();

    let out = stdout_of(storefront(dir.path()).args([
        "catalog", "list", "--min", "1", "--max", "3", "--sort", "name",
    ]));
    let ids: Vec<&str> = out
        .lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap())
        .collect();
    assert_eq!(ids, vec!["1", "6", "4"]);

    let out = stdout_of(storefront(dir.path()).args(["catalog", "list", "--search", "album"]));
    assert!(out.contains("Exclusive Album Drop"));
    assert_eq!(out.lines().count(), 2);
}

#[test]
fn test_cart_add_show_total() {
    let dir = tempdir().unwrap();

    storefront(dir.path())
        .args(["cart", "add", "1"])
        .assert()
        .success();
    storefront(dir.path())
        .args(["cart", "add", "1"])
        .assert()
        .success();
    storefront(dir.path())
        .args(["cart", "add", "5", "--quantity", "3"])
        .assert()
        .success();

    storefront(dir.path())
        .args(["cart", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1,Cosmic Dreams NFT,Digital Art,2.5 ETH,2"))
        .stdout(predicate::str::contains("5,Liquidity Pool Access,DeFi,0.5 ETH,3"))
        .stdout(predicate::str::contains("items: 5"))
        .stdout(predicate::str::contains("total: 6.500 ETH"));
}

#[test]
fn test_cart_set_and_remove() {
    let dir = tempdir().unwrap();

    storefront(dir.path()).args(["cart", "add", "2"]).assert().success();
    storefront(dir.path()).args(["cart", "add", "4"]).assert().success();

    storefront(dir.path())
        .args(["cart", "set", "2", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2,DeFi Yield Optimizer,Smart Contracts,0.8 ETH,5"))
        .stdout(predicate::str::contains("total: 5.200 ETH"));

    storefront(dir.path())
        .args(["cart", "set", "2", "-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DeFi Yield Optimizer").not())
        .stdout(predicate::str::contains("items: 1"));

    storefront(dir.path())
        .args(["cart", "remove", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("items: 0"))
        .stdout(predicate::str::contains("total: 0.000 ETH"));
}

#[test]
fn test_cart_clear() {
    let dir = tempdir().unwrap();

    storefront(dir.path()).args(["cart", "add", "3"]).assert().success();
    storefront(dir.path())
        .args(["cart", "clear"])
        .assert()
        .success()
        .stdout("id,name,category,price,quantity\nitems: 0\ntotal: 0.000 ETH\n");
}

#[test]
fn test_cart_toggle_keeps_lines() {
    let dir = tempdir().unwrap();

    storefront(dir.path()).args(["cart", "add", "3"]).assert().success();
    storefront(dir.path())
        .args(["cart", "toggle"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Cart panel open"))
        .stdout(predicate::str::contains("items: 1"));
    storefront(dir.path())
        .args(["cart", "toggle"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Cart panel closed"));
}

#[test]
fn test_unknown_and_inactive_products_are_refused() {
    let dir = tempdir().unwrap();

    storefront(dir.path())
        .args(["cart", "add", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown product: nope"));

    storefront(dir.path())
        .args(["catalog", "status", "6", "inactive"])
        .assert()
        .success();
    storefront(dir.path())
        .args(["cart", "add", "6"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not available for purchase"));
}

#[test]
fn test_catalog_add_and_remove() {
    let dir = tempdir().unwrap();

    storefront(dir.path())
        .args([
            "catalog", "add", "--id", "course", "--name", "Advanced Course", "--price", "0.3",
            "--category", "Education",
        ])
        .assert()
        .success();
    storefront(dir.path())
        .args(["catalog", "list", "--category", "Education"])
        .assert()
        .success()
        .stdout(predicate::str::contains("course,Advanced Course,Education,0.3 ETH,active"));

    storefront(dir.path())
        .args([
            "catalog", "add", "--id", "bad", "--name", "Bad", "--price", "cheap", "--category",
            "Education",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid price"));

    storefront(dir.path())
        .args(["catalog", "remove", "course"])
        .assert()
        .success();
    storefront(dir.path())
        .args(["catalog", "list", "--category", "Education"])
        .assert()
        .success()
        .stdout("id,name,category,price,status\n");
}

#[test]
fn test_catalog_import_fixture() {
    let dir = tempdir().unwrap();

    storefront(dir.path())
        .args(["catalog", "import", "tests/fixtures/catalog.csv"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Imported 3 new and 0 updated products"));

    storefront(dir.path())
        .args(["catalog", "list", "--status", "draft"])
        .assert()
        .success()
        .stdout(predicate::str::contains("premium,Premium Feature Unlock,Software,0.2 ETH,draft"));

    storefront(dir.path())
        .args(["cart", "add", "ebook", "--quantity", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total: 0.200 ETH"));
}

#[test]
fn test_custom_unit() {
    let dir = tempdir().unwrap();

    storefront(dir.path())
        .args(["--unit", "MATIC", "cart", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total: 0.000 MATIC"));

    storefront(dir.path())
        .args(["--unit", "MATIC", "catalog", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2.5 MATIC"));
}

#[test]
fn test_cart_set_rejects_oversized_quantity() {
    let dir = tempdir().unwrap();

    storefront(dir.path())
        .args(["cart", "add", "1"])
        .assert()
        .success();
    storefront(dir.path())
        .args(["cart", "set", "1", "10000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Quantity out of range"));

    storefront(dir.path())
        .args(["cart", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("items: 1"))
        .stdout(predicate::str::contains("total: 2.500 ETH"));
}

#[test]
fn test_switching_unit_never_mixes_totals() {
    let dir = tempdir().unwrap();

    storefront(dir.path())
        .args(["cart", "add", "1"])
        .assert()
        .success();
    storefront(dir.path())
        .args(["catalog", "remove", "6"])
        .assert()
        .success();

    storefront(dir.path())
        .args(["--unit", "MATIC", "cart", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("items: 0"))
        .stdout(predicate::str::contains("total: 0.000 MATIC"));
    storefront(dir.path())
        .args(["--unit", "MATIC", "catalog", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Price unit mismatch"));
    storefront(dir.path())
        .args(["--unit", "MATIC", "cart", "add", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Price unit mismatch"));

    storefront(dir.path())
        .args(["cart", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total: 2.500 ETH"));
}
