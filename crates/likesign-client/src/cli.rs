//! CLI framework for the likesign client

use crate::config::{ClientConfig, ConfigError};
use crate::{Client, ClientError, HttpTransport, Result};
use base64::Engine;
use clap::{Args, Parser, Subcommand};
use likesign_crypto::{normalize_signature, PublicKey, RAW_SIGNATURE_LEN};
use likesign_ledger::LedgerError;
use likesign_log::{debug, info, instrument};
use likesign_types::msgs::{
    msg_begin_redelegate, msg_delegate, msg_send, msg_undelegate, msg_withdraw_delegation_reward,
    Message, MessageQueue,
};
use likesign_types::tx::{prepare_sign_doc, SignDoc, SignDocOptions};
use likesign_types::address::COMPRESSED_PUBKEY_LEN;
use likesign_types::compute_total_gas;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Name of the pending message file inside the home directory
pub const MESSAGE_QUEUE_FILE: &str = "msgs.json";

/// Shortest and longest DER encodings of a secp256k1 signature
const DER_SIGNATURE_LEN: RangeInclusive<usize> = 8..=72;

/// Hardware wallet transaction client for LikeCoin chain
#[derive(Parser, Debug)]
#[command(name = "likesign")]
#[command(about = "Build, sign and broadcast LikeCoin chain transactions signed on a hardware wallet")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global_opts: GlobalOpts,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global CLI options
#[derive(Args, Clone, Debug)]
pub struct GlobalOpts {
    /// LCD REST endpoint
    #[arg(long, global = true)]
    pub node: Option<String>,

    /// Chain ID
    #[arg(long, global = true)]
    pub chain_id: Option<String>,

    /// Home directory for configuration and pending messages
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (json, text)
    #[arg(long, global = true, value_parser = ["text", "json"])]
    pub output: Option<String>,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Derive the account address of a device public key
    Address(AddressCmd),

    /// Manage the pending message list
    Msgs(MsgsCmd),

    /// Transaction commands
    Tx(TxCmd),

    /// Query commands
    Query(QueryCmd),

    /// Configuration management
    Config(ConfigCmd),

    /// Display version information
    Version,
}

/// Address command
#[derive(Parser, Debug)]
pub struct AddressCmd {
    /// Compressed secp256k1 public key, base64 or hex (`hex:` / `base64:` prefix forces one)
    #[arg(long)]
    pub pubkey: String,

    /// Bech32 prefix, defaults to the configured one
    #[arg(long)]
    pub prefix: Option<String>,
}

/// Message list commands
#[derive(Parser, Debug)]
pub struct MsgsCmd {
    #[command(subcommand)]
    pub action: MsgsAction,
}

#[derive(Subcommand, Debug)]
pub enum MsgsAction {
    /// Append a message
    Add(MsgAddCmd),

    /// Remove the message at an index
    Remove(MsgRemoveCmd),

    /// Remove all messages
    Clear,

    /// Print the pending messages
    Show,
}

#[derive(Parser, Debug)]
pub struct MsgAddCmd {
    #[command(subcommand)]
    pub msg: MsgKindCmd,
}

/// Message kinds that can be queued
#[derive(Subcommand, Debug)]
pub enum MsgKindCmd {
    /// Send tokens
    Send {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Amount in the smallest unit; fractions are rounded
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        denom: Option<String>,
    },

    /// Delegate tokens to a validator
    Delegate {
        #[arg(long)]
        delegator: String,
        #[arg(long)]
        validator: String,
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        denom: Option<String>,
    },

    /// Move a delegation between validators
    Redelegate {
        #[arg(long)]
        delegator: String,
        #[arg(long)]
        from_validator: String,
        #[arg(long)]
        to_validator: String,
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        denom: Option<String>,
    },

    /// Unbond tokens from a validator
    Undelegate {
        #[arg(long)]
        delegator: String,
        #[arg(long)]
        validator: String,
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        denom: Option<String>,
    },

    /// Withdraw the rewards of one delegation
    WithdrawReward {
        #[arg(long)]
        delegator: String,
        #[arg(long)]
        validator: String,
    },
}

#[derive(Parser, Debug)]
pub struct MsgRemoveCmd {
    /// Zero-based index as shown by `msgs show`
    pub index: usize,
}

/// Transaction commands
#[derive(Parser, Debug)]
pub struct TxCmd {
    /// Transaction subcommands
    #[command(subcommand)]
    pub action: TxAction,
}

/// Transaction actions
#[derive(Subcommand, Debug)]
pub enum TxAction {
    /// Print the canonical sign document of the pending messages
    SignDoc(SignDocCmd),

    /// Attach a device signature to the pending messages and broadcast
    Broadcast(BroadcastTxCmd),
}

/// Account state and fee settings shared by sign-doc and broadcast
#[derive(Args, Clone, Debug)]
pub struct DocArgs {
    /// Account number; fetched from the node with --from when omitted
    #[arg(long)]
    pub account_number: Option<u64>,

    /// Sequence; fetched from the node with --from when omitted
    #[arg(long)]
    pub sequence: Option<u64>,

    /// Signer address used to fetch the account state
    #[arg(long)]
    pub from: Option<String>,

    /// Gas limit, defaults to the gas table sum
    #[arg(long)]
    pub gas: Option<Decimal>,

    /// Gas price, defaults to the configured one
    #[arg(long)]
    pub gas_price: Option<Decimal>,

    /// Transaction memo
    #[arg(long, default_value = "")]
    pub memo: String,
}

#[derive(Parser, Debug)]
pub struct SignDocCmd {
    #[command(flatten)]
    pub doc: DocArgs,
}

/// Broadcast transaction command
#[derive(Parser, Debug)]
pub struct BroadcastTxCmd {
    #[command(flatten)]
    pub doc: DocArgs,

    /// Device public key, base64 or hex (`hex:` / `base64:` prefix forces one)
    #[arg(long)]
    pub pubkey: String,

    /// Device signature over the sign document, DER or raw, base64 or hex
    /// (`hex:` / `base64:` prefix forces one)
    #[arg(long)]
    pub signature: String,

    /// Wait for the transaction to be included in a block
    #[arg(long)]
    pub wait: bool,
}

/// Query commands
#[derive(Parser, Debug)]
pub struct QueryCmd {
    /// Query subcommands
    #[command(subcommand)]
    pub action: QueryAction,
}

/// Query actions
#[derive(Subcommand, Debug)]
pub enum QueryAction {
    /// Account number, sequence, balances and delegations
    Account(AccountQueryCmd),

    /// Execution result of a transaction
    Tx(TxQueryCmd),
}

/// Account query command
#[derive(Parser, Debug)]
pub struct AccountQueryCmd {
    /// Account address
    pub address: String,
}

/// Transaction query command
#[derive(Parser, Debug)]
pub struct TxQueryCmd {
    /// Transaction hash
    pub hash: String,

    /// Keep polling until the transaction is found
    #[arg(long)]
    pub wait: bool,
}

/// Config command
#[derive(Parser, Debug)]
pub struct ConfigCmd {
    /// Config subcommands
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set(ConfigSetCmd),

    /// Initialize default configuration
    Init(ConfigInitCmd),
}

/// Config set command
#[derive(Parser, Debug)]
pub struct ConfigSetCmd {
    /// Configuration key, e.g. `node` or `gas_table.cosmos-sdk/MsgSend`
    pub key: String,

    /// Configuration value
    pub value: String,
}

/// Config init command
#[derive(Parser, Debug)]
pub struct ConfigInitCmd {
    /// Overwrite existing configuration
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Serialize)]
struct AddressOutput<'a> {
    #[serde(rename = "pubKey")]
    pub_key: &'a PublicKey,
    address: &'a str,
}

/// CLI command handler
pub struct CliHandler {
    /// Global options
    pub global_opts: GlobalOpts,
    /// Home directory
    pub home: PathBuf,
    /// Configuration with command line overrides applied
    pub config: ClientConfig,
}

impl CliHandler {
    /// Create a new CLI handler
    pub fn new(global_opts: GlobalOpts) -> Result<Self> {
        let home = global_opts
            .home
            .clone()
            .unwrap_or_else(ClientConfig::default_config_dir);
        let mut config = ClientConfig::load_or_default(&home)?;

        if let Some(node) = &global_opts.node {
            config.node = node.clone();
        }
        if let Some(chain_id) = &global_opts.chain_id {
            config.chain_id = chain_id.clone();
        }
        if let Some(output) = &global_opts.output {
            config.output = output.clone();
        }

        Ok(Self {
            global_opts,
            home,
            config,
        })
    }

    /// Execute a CLI command
    pub async fn execute(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Address(cmd) => self.handle_address(cmd),
            Commands::Msgs(cmd) => self.handle_msgs(cmd),
            Commands::Tx(cmd) => self.handle_tx(cmd).await,
            Commands::Query(cmd) => self.handle_query(cmd).await,
            Commands::Config(cmd) => self.handle_config(cmd),
            Commands::Version => {
                println!("likesign {}", env!("CARGO_PKG_VERSION"));
                println!("build: {}", env!("CARGO_PKG_NAME"));
                Ok(())
            }
        }
    }

    fn json_output(&self) -> bool {
        self.config.output == "json"
    }

    /// Print `value` as JSON, or `text` in text mode
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json_output() {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }

    pub fn queue_file(&self) -> PathBuf {
        self.home.join(MESSAGE_QUEUE_FILE)
    }

    pub fn load_queue(&self) -> Result<MessageQueue> {
        let path = self.queue_file();
        if !path.exists() {
            return Ok(MessageQueue::new());
        }
        Ok(MessageQueue::from_json(&fs::read_to_string(path)?)?)
    }

    pub fn save_queue(&self, queue: &MessageQueue) -> Result<()> {
        fs::create_dir_all(&self.home)?;
        fs::write(self.queue_file(), queue.to_json_pretty()?)?;
        Ok(())
    }

    /// Handle address command
    #[instrument(skip(self))]
    fn handle_address(&self, cmd: AddressCmd) -> Result<()> {
        let public_key = PublicKey::from_bytes(&decode_bytes(&cmd.pubkey, is_pubkey_len)?)?;
        let prefix = cmd.prefix.as_deref().unwrap_or(&self.config.bech32_prefix);
        let address = public_key.to_bech32(prefix)?;

        self.emit(
            &AddressOutput {
                pub_key: &public_key,
                address: &address,
            },
            || address.clone(),
        )
    }

    /// Handle message list command
    #[instrument(skip(self))]
    fn handle_msgs(&self, cmd: MsgsCmd) -> Result<()> {
        let mut queue = self.load_queue()?;
        match cmd.action {
            MsgsAction::Add(add_cmd) => {
                let msg = self.build_message(add_cmd.msg)?;
                info!(kind = %msg.kind(), "queueing message");
                queue.push(msg);
                self.save_queue(&queue)?;
                println!("{} message(s) pending", queue.len());
            }
            MsgsAction::Remove(remove_cmd) => {
                queue.remove(remove_cmd.index).ok_or_else(|| {
                    ClientError::InvalidArgument(format!(
                        "no message at index {} ({} pending)",
                        remove_cmd.index,
                        queue.len()
                    ))
                })?;
                self.save_queue(&queue)?;
                println!("{} message(s) pending", queue.len());
            }
            MsgsAction::Clear => {
                queue.clear();
                self.save_queue(&queue)?;
                println!("0 message(s) pending");
            }
            MsgsAction::Show => {
                let text = queue
                    .as_slice()
                    .iter()
                    .enumerate()
                    .map(|(i, msg)| Ok(format!("{i}: {}", serde_json::to_string(msg)?)))
                    .collect::<Result<Vec<_>>>()?
                    .join("\n");
                self.emit(&queue.as_slice(), || text)?;
            }
        }
        Ok(())
    }

    fn build_message(&self, cmd: MsgKindCmd) -> Result<Message> {
        let denom_or_default = |denom: Option<String>| denom.unwrap_or_else(|| self.config.denom.clone());
        let msg = match cmd {
            MsgKindCmd::Send {
                from,
                to,
                amount,
                denom,
            } => msg_send(&from, &to, amount, &denom_or_default(denom))?,
            MsgKindCmd::Delegate {
                delegator,
                validator,
                amount,
                denom,
            } => msg_delegate(&delegator, &validator, amount, &denom_or_default(denom))?,
            MsgKindCmd::Redelegate {
                delegator,
                from_validator,
                to_validator,
                amount,
                denom,
            } => msg_begin_redelegate(
                &delegator,
                &from_validator,
                &to_validator,
                amount,
                &denom_or_default(denom),
            )?,
            MsgKindCmd::Undelegate {
                delegator,
                validator,
                amount,
                denom,
            } => msg_undelegate(&delegator, &validator, amount, &denom_or_default(denom))?,
            MsgKindCmd::WithdrawReward {
                delegator,
                validator,
            } => msg_withdraw_delegation_reward(&delegator, &validator),
        };
        Ok(msg)
    }

    /// Sign document for the pending messages
    pub async fn build_sign_doc(&self, args: &DocArgs) -> Result<SignDoc> {
        let queue = self.load_queue()?;
        if queue.is_empty() {
            return Err(ClientError::InvalidArgument(
                "no pending messages, add some with `likesign msgs add`".to_string(),
            ));
        }

        let gas = match args.gas {
            Some(gas) => gas,
            None => Decimal::from(compute_total_gas(&self.config.gas_table()?, queue.as_slice())?),
        };
        let gas_price = match args.gas_price {
            Some(price) => price,
            None => self.config.gas_price()?,
        };

        let (account_number, sequence) = match (args.account_number, args.sequence) {
            (Some(account_number), Some(sequence)) => (account_number, sequence),
            _ => {
                let from = args.from.as_deref().ok_or_else(|| {
                    ClientError::InvalidArgument(
                        "pass --account-number and --sequence, or --from to fetch them".to_string(),
                    )
                })?;
                let state = Client::from_config(&self.config)?.fetch_account(from).await?;
                (
                    args.account_number.unwrap_or(state.account_number),
                    args.sequence.unwrap_or(state.sequence),
                )
            }
        };

        let options = SignDocOptions::default()
            .gas(gas)
            .gas_price(gas_price)
            .memo(args.memo.clone())
            .denom(self.config.denom.clone());
        Ok(prepare_sign_doc(
            queue.into_vec(),
            &self.config.chain_id,
            account_number,
            sequence,
            &options,
        )?)
    }

    /// Handle transaction command
    #[instrument(skip(self))]
    async fn handle_tx(&self, cmd: TxCmd) -> Result<()> {
        match cmd.action {
            TxAction::SignDoc(sign_cmd) => {
                let doc = self.build_sign_doc(&sign_cmd.doc).await?;
                println!("{}", doc.canonical_json()?);
                Ok(())
            }
            TxAction::Broadcast(broadcast_cmd) => self.handle_broadcast(broadcast_cmd).await,
        }
    }

    async fn handle_broadcast(&self, cmd: BroadcastTxCmd) -> Result<()> {
        let doc = self.build_sign_doc(&cmd.doc).await?;
        let public_key = PublicKey::from_bytes(&decode_bytes(&cmd.pubkey, is_pubkey_len)?)?;
        let signature = normalize_signature(&decode_bytes(&cmd.signature, is_signature_len)?)?;
        signature
            .verify(&public_key, &doc.sign_bytes()?)
            .map_err(LedgerError::from)?;
        debug!(signature = ?signature, "signature matches sign document");

        let client = Client::from_config(&self.config)?;
        let result = client.broadcast(&doc, &signature, &public_key).await?;
        if result.success {
            self.save_queue(&MessageQueue::new())?;
        }
        self.emit(&result, || {
            format!(
                "txhash: {}\nsuccess: {}\nlog: {}",
                result.tx_hash, result.success, result.log
            )
        })?;
        let result = result.into_result()?;

        if cmd.wait {
            self.wait_for_confirmation(&client, &result.tx_hash).await?;
        }
        Ok(())
    }

    async fn wait_for_confirmation<T: HttpTransport>(
        &self,
        client: &Client<T>,
        tx_hash: &str,
    ) -> Result<()> {
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });

        let confirmation = client
            .poll_confirmation(tx_hash, &self.config.poll_config()?, &cancel)
            .await?;
        self.emit(&confirmation, || {
            format!(
                "confirmed: {}{}",
                confirmation.success,
                confirmation
                    .log
                    .as_deref()
                    .map(|log| format!("\nlog: {log}"))
                    .unwrap_or_default()
            )
        })
    }

    /// Handle query command
    #[instrument(skip(self))]
    async fn handle_query(&self, cmd: QueryCmd) -> Result<()> {
        let client = Client::from_config(&self.config)?;
        match cmd.action {
            QueryAction::Account(account_cmd) => {
                let account = client.fetch_account_info(&account_cmd.address).await?;
                self.emit(&account, || {
                    let mut lines = vec![
                        format!("address: {}", account.address),
                        format!("account_number: {}", account.account_number),
                        format!("sequence: {}", account.sequence),
                    ];
                    lines.extend(account.coins.iter().map(|coin| format!("balance: {coin}")));
                    lines.extend(account.delegations.iter().map(|delegation| {
                        format!("delegation: {} {}", delegation.validator, delegation.balance)
                    }));
                    lines.join("\n")
                })
            }
            QueryAction::Tx(tx_cmd) => {
                if tx_cmd.wait {
                    return self.wait_for_confirmation(&client, &tx_cmd.hash).await;
                }
                let confirmation = client.query_tx(&tx_cmd.hash).await?;
                self.emit(&confirmation, || format!("confirmed: {}", confirmation.success))
            }
        }
    }

    /// Handle config command
    #[instrument(skip(self))]
    fn handle_config(&self, cmd: ConfigCmd) -> Result<()> {
        match cmd.action {
            ConfigAction::Show => {
                let text = toml::to_string_pretty(&self.config).map_err(ConfigError::from)?;
                self.emit(&self.config, || text)
            }
            ConfigAction::Set(set_cmd) => {
                let mut config = ClientConfig::load_or_default(&self.home)?;
                config.set(&set_cmd.key, &set_cmd.value)?;
                fs::create_dir_all(&self.home)?;
                config.save_to_file(ClientConfig::config_file(&self.home))?;
                info!(key = %set_cmd.key, value = %set_cmd.value, "configuration updated");
                println!("{} = {}", set_cmd.key, set_cmd.value);
                Ok(())
            }
            ConfigAction::Init(init_cmd) => {
                ClientConfig::init(&self.home, init_cmd.overwrite)?;
                println!(
                    "Configuration written to {}",
                    ClientConfig::config_file(&self.home).display()
                );
                Ok(())
            }
        }
    }
}

fn is_pubkey_len(len: usize) -> bool {
    len == COMPRESSED_PUBKEY_LEN
}

fn is_signature_len(len: usize) -> bool {
    len == RAW_SIGNATURE_LEN || DER_SIGNATURE_LEN.contains(&len)
}

fn decode_hex(input: &str) -> Result<Vec<u8>> {
    hex::decode(input).map_err(|e| ClientError::InvalidArgument(format!("invalid hex:: {e}")))
}

fn decode_base64(input: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(input)
        .map_err(|e| ClientError::InvalidArgument(format!("invalid base64:: {e}")))
}

/// Decode a hex or base64 command line argument.
///
/// A `hex:` or `base64:` prefix selects the encoding. Without one, input valid
/// in both encodings is resolved by `expected_len`; if that does not settle it
/// the input is rejected as ambiguous.
pub fn decode_bytes(input: &str, expected_len: fn(usize) -> bool) -> Result<Vec<u8>> {
    let input = input.trim();
    if let Some(hex_input) = input.strip_prefix("hex:") {
        return decode_hex(hex_input);
    }
    if let Some(base64_input) = input.strip_prefix("base64:") {
        return decode_base64(base64_input);
    }

    match (decode_hex(input).ok(), decode_base64(input).ok()) {
        (Some(as_hex), Some(as_base64)) => {
            match (expected_len(as_hex.len()), expected_len(as_base64.len())) {
                (true, false) => Ok(as_hex),
                (false, true) => Ok(as_base64),
                _ => Err(ClientError::InvalidArgument(format!(
                    "{input:?} is valid hex and base64, prefix it with hex: or base64:"
                ))),
            }
        }
        (Some(bytes), None) | (None, Some(bytes)) => Ok(bytes),
        (None, None) => Err(ClientError::InvalidArgument(format!(
            "expected hex or base64:: {input:?}"
        ))),
    }
}

/// Parse CLI arguments and execute commands
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let level = if cli.global_opts.verbose {
        "debug"
    } else {
        "info"
    };
    likesign_log::init_tracing_with_level(level).map_err(|e| {
        ClientError::InvalidArgument(format!("failed to initialize logging:: {e}"))
    })?;

    let handler = CliHandler::new(cli.global_opts)?;
    handler.execute(cli.command).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use likesign_types::MessageKind;
    use tempfile::tempdir;

    const FIXTURE_PUBKEY: &str = "AtQaCqFnshaZQp6rIkvAPyzThvCvXSDO+9AzbxVErqJP";

    fn handler(home: &std::path::Path) -> CliHandler {
        let cli = Cli::parse_from(["likesign", "--home", home.to_str().unwrap(), "version"]);
        CliHandler::new(cli.global_opts).unwrap()
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_generation() {
        let mut cmd = Cli::command();
        let help = cmd.render_help().to_string();
        assert!(help.contains("likesign"));
        assert!(help.contains("hardware wallet"));
    }

    #[test]
    fn test_global_options() {
        let cli = Cli::parse_from([
            "likesign",
            "--node",
            "http://localhost:8080",
            "--chain-id",
            "test-chain",
            "--verbose",
            "query",
            "tx",
            "ABCDEF",
            "--wait",
        ]);

        assert_eq!(cli.global_opts.node, Some("http://localhost:8080".to_string()));
        assert_eq!(cli.global_opts.chain_id, Some("test-chain".to_string()));
        assert!(cli.global_opts.verbose);
        if let Commands::Query(QueryCmd {
            action: QueryAction::Tx(tx_cmd),
        }) = cli.command
        {
            assert_eq!(tx_cmd.hash, "ABCDEF");
            assert!(tx_cmd.wait);
        } else {
            panic!("Expected Query Tx command");
        }
    }

    #[test]
    fn test_msgs_add_send_command() {
        let cli = Cli::parse_from([
            "likesign", "msgs", "add", "send", "--from", "cosmos1a", "--to", "cosmos1b", "--amount",
            "12.5",
        ]);

        if let Commands::Msgs(MsgsCmd {
            action: MsgsAction::Add(MsgAddCmd {
                msg: MsgKindCmd::Send { from, amount, denom, .. },
            }),
        }) = cli.command
        {
            assert_eq!(from, "cosmos1a");
            assert_eq!(amount, Decimal::new(125, 1));
            assert_eq!(denom, None);
        } else {
            panic!("Expected Msgs Add Send command");
        }
    }

    #[test]
    fn test_broadcast_requires_signature() {
        let result = Cli::try_parse_from(["likesign", "tx", "broadcast", "--pubkey", FIXTURE_PUBKEY]);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_bytes() {
        let key = decode_bytes(FIXTURE_PUBKEY, is_pubkey_len).unwrap();
        assert_eq!(key.len(), 33);
        assert_eq!(decode_bytes(&hex::encode(&key), is_pubkey_len).unwrap(), key);

        assert_eq!(decode_bytes("hex:0a0B", is_pubkey_len).unwrap(), vec![0x0a, 0x0b]);
        assert_eq!(decode_bytes("base64:AAAA", is_pubkey_len).unwrap(), vec![0, 0, 0]);
        assert!(decode_bytes("not base64!", is_pubkey_len).is_err());
    }

    #[test]
    fn test_decode_bytes_all_hex_digit_base64() {
        // 44 hex digits are also a valid base64 encoding of 33 bytes
        let input = "0".repeat(44);
        assert_eq!(decode_bytes(&input, is_pubkey_len).unwrap().len(), 33);
        assert_eq!(decode_bytes(&format!("hex:{input}"), is_pubkey_len).unwrap().len(), 22);

        // 128 hex digits: a raw signature as hex, 96 bytes as base64
        let input = "1".repeat(128);
        assert_eq!(decode_bytes(&input, is_signature_len).unwrap().len(), 64);

        assert!(matches!(
            decode_bytes("0a0B", |_| true),
            Err(ClientError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_output_override() {
        let temp_dir = tempdir().unwrap();
        let cli = Cli::parse_from([
            "likesign",
            "--home",
            temp_dir.path().to_str().unwrap(),
            "--output",
            "json",
            "config",
            "show",
        ]);
        let handler = CliHandler::new(cli.global_opts).unwrap();
        assert!(handler.json_output());
    }

    #[tokio::test]
    async fn test_queue_persists_between_handlers() {
        let temp_dir = tempdir().unwrap();
        let first = handler(temp_dir.path());
        first
            .handle_msgs(MsgsCmd {
                action: MsgsAction::Add(MsgAddCmd {
                    msg: MsgKindCmd::WithdrawReward {
                        delegator: "cosmos1d".to_string(),
                        validator: "cosmosvaloper1v".to_string(),
                    },
                }),
            })
            .unwrap();

        let second = handler(temp_dir.path());
        let queue = second.load_queue().unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.as_slice()[0].kind(), MessageKind::WithdrawDelegationReward);

        let err = second
            .handle_msgs(MsgsCmd {
                action: MsgsAction::Remove(MsgRemoveCmd { index: 3 }),
            })
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_sign_doc_offline() {
        let temp_dir = tempdir().unwrap();
        let handler = handler(temp_dir.path());
        let mut queue = MessageQueue::new();
        queue.push(msg_send("cosmos1a", "cosmos1b", Decimal::from(1000), "nanolike").unwrap());
        handler.save_queue(&queue).unwrap();

        let args = DocArgs {
            account_number: Some(7),
            sequence: Some(3),
            from: None,
            gas: None,
            gas_price: None,
            memo: String::new(),
        };
        let doc = handler.build_sign_doc(&args).await.unwrap();
        assert_eq!(doc.fee.gas, 75_000);
        assert_eq!(doc.fee.amount[0].amount, 7_500_000);
        assert_eq!(doc.chain_id, "likecoin-chain");

        let missing_state = DocArgs {
            sequence: None,
            ..args
        };
        assert!(matches!(
            handler.build_sign_doc(&missing_state).await,
            Err(ClientError::InvalidArgument(_))
        ));
    }
}
