use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FIXTURE_PUBKEY: &str = "AtQaCqFnshaZQp6rIkvAPyzThvCvXSDO+9AzbxVErqJP";
const FIXTURE_ADDRESS: &str = "cosmos1h806c7khnvmjlywdrkdgk2vrayy2mmvf9rxk2r";

fn likesign(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("likesign").unwrap();
    cmd.arg("--home").arg(home.path());
    cmd
}

fn queue_send(home: &TempDir) {
    likesign(home)
        .args([
            "msgs", "add", "send", "--from", "cosmos1a", "--to", "cosmos1b", "--amount", "1000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 message(s) pending"));
}

#[test]
fn test_version_command() {
    let mut cmd = Command::cargo_bin("likesign").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("likesign"))
        .stdout(predicate::str::contains("build:"));
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("likesign").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("address"))
        .stdout(predicate::str::contains("msgs"))
        .stdout(predicate::str::contains("query"));
}

#[test]
fn test_address_from_pubkey() {
    let home = TempDir::new().unwrap();
    likesign(&home)
        .args(["address", "--pubkey", FIXTURE_PUBKEY])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{FIXTURE_ADDRESS}\n")));
}

#[test]
fn test_address_json_output() {
    let home = TempDir::new().unwrap();
    likesign(&home)
        .args(["--output", "json", "address", "--pubkey", FIXTURE_PUBKEY])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("\"address\": \"{FIXTURE_ADDRESS}\"")))
        .stdout(predicate::str::contains("tendermint/PubKeySecp256k1"));
}

#[test]
fn test_address_rejects_short_key() {
    let home = TempDir::new().unwrap();
    likesign(&home)
        .args(["address", "--pubkey", "AAAAAQ=="])
        .assert()
        .failure()
        .code(102)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_message_queue_lifecycle() {
    let home = TempDir::new().unwrap();
    queue_send(&home);

    likesign(&home)
        .args([
            "msgs",
            "add",
            "delegate",
            "--delegator",
            "cosmos1a",
            "--validator",
            "cosmosvaloper1v",
            "--amount",
            "10",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 message(s) pending"));

    likesign(&home)
        .args(["msgs", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0: {\"type\":\"cosmos-sdk/MsgSend\""))
        .stdout(predicate::str::contains("1: {\"type\":\"cosmos-sdk/MsgDelegate\""));

    likesign(&home)
        .args(["msgs", "remove", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 message(s) pending"));

    likesign(&home)
        .args(["msgs", "remove", "5"])
        .assert()
        .failure();

    likesign(&home).args(["msgs", "clear"]).assert().success();
    likesign(&home)
        .args(["msgs", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MsgDelegate").not());
}

#[test]
fn test_sign_doc_offline() {
    let home = TempDir::new().unwrap();
    queue_send(&home);

    likesign(&home)
        .args([
            "tx",
            "sign-doc",
            "--account-number",
            "7",
            "--sequence",
            "3",
            "--gas",
            "200000",
            "--memo",
            "hi",
        ])
        .assert()
        .success()
        .stdout(predicate::str::diff(concat!(
            r#"{"account_number":"7","chain_id":"likecoin-chain","fee":{"amount":[{"amount":"20000000","denom":"nanolike"}],"gas":"200000"},"memo":"hi","#,
            r#""msgs":[{"type":"cosmos-sdk/MsgSend","value":{"amount":[{"amount":"1000","denom":"nanolike"}],"from_address":"cosmos1a","to_address":"cosmos1b"}}],"sequence":"3"}"#,
            "\n"
        )));
}

#[test]
fn test_sign_doc_uses_gas_table() {
    let home = TempDir::new().unwrap();
    queue_send(&home);

    likesign(&home)
        .args(["tx", "sign-doc", "--account-number", "0", "--sequence", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""gas":"75000""#))
        .stdout(predicate::str::contains(r#""amount":"7500000""#));
}

#[test]
fn test_sign_doc_without_messages_fails() {
    let home = TempDir::new().unwrap();
    likesign(&home)
        .args(["tx", "sign-doc", "--account-number", "0", "--sequence", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no pending messages"));
}

#[test]
fn test_config_init_set_show() {
    let home = TempDir::new().unwrap();

    likesign(&home).args(["config", "init"]).assert().success();
    assert!(home.path().join("config.toml").exists());

    likesign(&home)
        .args(["config", "set", "chain_id", "likecoin-mainnet-2"])
        .assert()
        .success();
    likesign(&home)
        .args(["config", "set", "gas_table.cosmos-sdk/MsgSend", "80000"])
        .assert()
        .success();

    likesign(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("likecoin-mainnet-2"))
        .stdout(predicate::str::contains("80000"));
}

#[test]
fn test_config_set_unknown_key_fails() {
    let home = TempDir::new().unwrap();
    likesign(&home)
        .args(["config", "set", "invalid_key", "value"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown configuration key"))
        .code(121);
}

#[test]
fn test_config_set_zero_poll_interval_fails() {
    let home = TempDir::new().unwrap();
    likesign(&home)
        .args(["config", "set", "poll_interval", "0"])
        .assert()
        .failure()
        .code(121);
}

#[test]
fn test_address_hex_prefix() {
    let home = TempDir::new().unwrap();
    likesign(&home)
        .args([
            "address",
            "--pubkey",
            "hex:02d41a0aa167b21699429eab224bc03f2cd386f0af5d20cefbd0336f1544aea24f",
        ])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{FIXTURE_ADDRESS}
")));
}

#[test]
fn test_query_unreachable_node_is_network_error() {
    let home = TempDir::new().unwrap();
    likesign(&home)
        .args(["--node", "http://127.0.0.1:1", "query", "account", FIXTURE_ADDRESS])
        .assert()
        .failure()
        .code(110);
}
