//! JSON-RPC implementation of the ledger traits over `web3`.
//!
//! One HTTP transport, one contract handle, typed `query` calls against the
//! order-book storage accessors. Settlement goes through a signed call and
//! waits for the configured number of confirmations.

use async_trait::async_trait;
use tracing::debug;
use web3::contract::{Contract, Options};
use web3::signing::{SecretKey, SecretKeyRef};
use web3::transports::Http;
use web3::types::{Address, U256};
use web3::Web3;

use odx_schemas::Side;

use crate::{
    ChainOrderRecord, LedgerError, OrderStorage, SettlementClient, SettlementReceipt,
};

/// Order-book contract ABI: the two per-side storage accessors plus the
/// match call. Each accessor returns
/// `(owner, amount, price, remaining, active)`.
const ORDER_BOOK_ABI: &str = r#"[
    {"constant":true,"inputs":[{"name":"","type":"uint256"}],"name":"buyOrders","outputs":[{"name":"owner","type":"address"},{"name":"amount","type":"uint256"},{"name":"price","type":"uint256"},{"name":"remaining","type":"uint256"},{"name":"active","type":"bool"}],"type":"function"},
    {"constant":true,"inputs":[{"name":"","type":"uint256"}],"name":"sellOrders","outputs":[{"name":"owner","type":"address"},{"name":"amount","type":"uint256"},{"name":"price","type":"uint256"},{"name":"remaining","type":"uint256"},{"name":"active","type":"bool"}],"type":"function"},
    {"constant":false,"inputs":[{"name":"buyId","type":"uint256"},{"name":"sellId","type":"uint256"}],"name":"matchOrders","outputs":[],"type":"function"}
]"#;

#[derive(Debug, Clone)]
pub struct Web3LedgerConfig {
    pub rpc_url: String,
    /// Hex address of the exchange contract this adapter is bound to.
    pub contract_address: String,
    /// Hex-encoded secp256k1 private key used to sign settlement calls.
    /// `None` makes the adapter read-only; settlement attempts fail with
    /// [`LedgerError::Key`].
    pub settlement_key: Option<String>,
    /// Confirmations to await before a settlement call is considered landed.
    pub confirmations: usize,
}

impl Default for Web3LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            contract_address: String::new(),
            settlement_key: None,
            confirmations: 1,
        }
    }
}

/// Production ledger adapter: implements both [`OrderStorage`] and
/// [`SettlementClient`] against one exchange contract over JSON-RPC.
pub struct Web3Ledger {
    contract: Contract<Http>,
    address: Address,
    key: Option<SecretKey>,
    confirmations: usize,
}

impl Web3Ledger {
    pub fn connect(cfg: &Web3LedgerConfig) -> Result<Self, LedgerError> {
        let transport =
            Http::new(&cfg.rpc_url).map_err(|e| LedgerError::Transport(e.to_string()))?;
        let web3 = Web3::new(transport);

        let address = parse_address(&cfg.contract_address)?;
        let contract = Contract::from_json(web3.eth(), address, ORDER_BOOK_ABI.as_bytes())
            .map_err(|e| LedgerError::Decode(e.to_string()))?;

        let key = match &cfg.settlement_key {
            Some(raw) => Some(parse_key(raw)?),
            None => None,
        };

        Ok(Self {
            contract,
            address,
            key,
            confirmations: cfg.confirmations,
        })
    }

    /// The exchange contract this adapter is bound to, 0x-prefixed.
    pub fn contract_address(&self) -> String {
        format!("{:#x}", self.address)
    }
}

#[async_trait]
impl OrderStorage for Web3Ledger {
    async fn read_order(
        &self,
        side: Side,
        chain_order_id: u64,
    ) -> Result<ChainOrderRecord, LedgerError> {
        let accessor = match side {
            Side::Buy => "buyOrders",
            Side::Sell => "sellOrders",
        };

        let (owner, amount, price, remaining, active): (Address, U256, U256, U256, bool) =
            self.contract
                .query(
                    accessor,
                    (U256::from(chain_order_id),),
                    None,
                    Options::default(),
                    None,
                )
                .await
                .map_err(map_query_err)?;

        debug!(accessor, chain_order_id, "ledger order read");

        Ok(ChainOrderRecord {
            owner: format!("{owner:#x}"),
            amount: to_u128(amount)?,
            price: to_u128(price)?,
            remaining: to_u128(remaining)?,
            active,
        })
    }
}

#[async_trait]
impl SettlementClient for Web3Ledger {
    async fn match_orders(
        &self,
        contract_address: &str,
        buy_chain_order_id: u64,
        sell_chain_order_id: u64,
    ) -> Result<SettlementReceipt, LedgerError> {
        // The adapter is bound to one contract at connect time; a different
        // requested contract is a wiring error, not a transient failure.
        let bound = self.contract_address();
        if !contract_address.eq_ignore_ascii_case(&bound) {
            return Err(LedgerError::Decode(format!(
                "settlement requested for {contract_address} but adapter is bound to {bound}"
            )));
        }

        let key = self
            .key
            .as_ref()
            .ok_or_else(|| LedgerError::Key("no settlement key configured".to_string()))?;

        let receipt = self
            .contract
            .signed_call_with_confirmations(
                "matchOrders",
                (
                    U256::from(buy_chain_order_id),
                    U256::from(sell_chain_order_id),
                ),
                Options::default(),
                self.confirmations,
                SecretKeyRef::new(key),
            )
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        let tx_hash = format!("{:#x}", receipt.transaction_hash);
        if receipt.status.map(|s| s.as_u64()) == Some(0) {
            return Err(LedgerError::Reverted { tx_hash });
        }

        debug!(
            tx = %tx_hash,
            buy = buy_chain_order_id,
            sell = sell_chain_order_id,
            "settlement landed"
        );

        Ok(SettlementReceipt {
            tx_hash,
            block_number: receipt.block_number.map(|b| b.as_u64()).unwrap_or(0),
        })
    }
}

fn parse_address(s: &str) -> Result<Address, LedgerError> {
    s.strip_prefix("0x")
        .unwrap_or(s)
        .parse::<Address>()
        .map_err(|_| LedgerError::Decode(format!("bad contract address: {s}")))
}

fn parse_key(raw: &str) -> Result<SecretKey, LedgerError> {
    let bytes = hex::decode(raw.strip_prefix("0x").unwrap_or(raw))
        .map_err(|e| LedgerError::Key(format!("settlement key is not hex: {e}")))?;
    SecretKey::from_slice(&bytes).map_err(|e| LedgerError::Key(e.to_string()))
}

fn map_query_err(e: web3::contract::Error) -> LedgerError {
    match e {
        web3::contract::Error::InvalidOutputType(msg) => LedgerError::Decode(msg),
        other => LedgerError::Transport(other.to_string()),
    }
}

fn to_u128(v: U256) -> Result<u128, LedgerError> {
    if v > U256::from(u128::MAX) {
        return Err(LedgerError::Decode(format!("raw unit out of range: {v}")));
    }
    Ok(v.as_u128())
}
