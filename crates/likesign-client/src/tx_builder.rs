//! Transaction builder tying messages, fees, the signing device and the node together

use crate::{BroadcastResult, Client, HttpTransport, Result};
use likesign_errors::Error;
use likesign_ledger::{LedgerPath, LedgerSigner, SigningDevice};
use likesign_types::gas::{compute_total_gas, GasTable};
use likesign_types::msgs::Message;
use likesign_types::tx::{prepare_sign_doc, SignDoc, SignDocOptions, DEFAULT_GAS_PRICE};
use likesign_types::DEFAULT_DENOM;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

/// Builds, signs and broadcasts one transaction at a time.
///
/// Messages accumulate across calls and are cleared only after a broadcast the
/// node reports as successful, so a rejected transaction can be retried as is.
pub struct TxBuilder<'a, T, D> {
    client: &'a Client<T>,
    signer: &'a LedgerSigner<D>,
    path: LedgerPath,
    chain_id: String,
    messages: Vec<Message>,
    gas_table: GasTable,
    /// Overrides the gas computed from the table
    gas: Option<Decimal>,
    gas_price: Decimal,
    memo: String,
    denom: String,
}

impl<'a, T: HttpTransport, D: SigningDevice> TxBuilder<'a, T, D> {
    /// Create a new transaction builder
    pub fn new(
        client: &'a Client<T>,
        signer: &'a LedgerSigner<D>,
        chain_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            signer,
            path: LedgerPath::default(),
            chain_id: chain_id.into(),
            messages: Vec::new(),
            gas_table: GasTable::default(),
            gas: None,
            gas_price: Decimal::from(DEFAULT_GAS_PRICE),
            memo: String::new(),
            denom: DEFAULT_DENOM.to_string(),
        }
    }

    /// Set the device path that signs
    pub fn path(mut self, path: LedgerPath) -> Self {
        self.path = path;
        self
    }

    pub fn gas_table(mut self, gas_table: GasTable) -> Self {
        self.gas_table = gas_table;
        self
    }

    /// Use a fixed gas limit instead of the table sum
    pub fn gas(mut self, gas: Decimal) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn gas_price(mut self, gas_price: Decimal) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Set memo
    pub fn memo<S: Into<String>>(mut self, memo: S) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn denom<S: Into<String>>(mut self, denom: S) -> Self {
        self.denom = denom.into();
        self
    }

    /// Add a message to the transaction
    pub fn add_message(mut self, msg: Message) -> Self {
        self.messages.push(msg);
        self
    }

    /// Add multiple messages to the transaction
    pub fn add_messages(mut self, msgs: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(msgs);
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Sum of the gas table entries of the queued messages
    pub fn total_gas(&self) -> Result<u64> {
        Ok(compute_total_gas(&self.gas_table, &self.messages)?)
    }

    /// Sign document for the queued messages at the given account state
    pub fn sign_doc(&self, account_number: u64, sequence: u64) -> Result<SignDoc> {
        if self.messages.is_empty() {
            return Err(Error::Encoding("no messages to sign".to_string()).into());
        }

        let gas = match self.gas {
            Some(gas) => gas,
            None => Decimal::from(self.total_gas()?),
        };
        let options = SignDocOptions::default()
            .gas(gas)
            .gas_price(self.gas_price)
            .memo(self.memo.clone())
            .denom(self.denom.clone());

        Ok(prepare_sign_doc(
            self.messages.clone(),
            &self.chain_id,
            account_number,
            sequence,
            &options,
        )?)
    }

    /// Fetch the account state, sign on the device and broadcast.
    ///
    /// The queued messages are cleared only when the broadcast succeeded.
    #[instrument(skip(self), fields(path = %self.path, chain_id = %self.chain_id))]
    pub async fn sign_and_broadcast(&mut self) -> Result<BroadcastResult> {
        let info = self.signer.address_info(&self.path).await?;
        let account = self.client.fetch_account(&info.address).await?;
        debug!(
            account_number = account.account_number,
            sequence = account.sequence,
            "fetched account state"
        );

        let doc = self.sign_doc(account.account_number, account.sequence)?;
        let signed = self.signer.sign(&self.path, &doc).await?;
        let result = self
            .client
            .broadcast(&doc, &signed.signature, &signed.public_key)
            .await?;

        if result.success {
            info!(tx_hash = %result.tx_hash, messages = self.messages.len(), "clearing sent messages");
            self.messages.clear();
        }
        Ok(result)
    }
}
