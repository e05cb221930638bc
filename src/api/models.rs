use serde::Deserialize;
use serde_json::Value;

/// One transaction record as returned by the transactions endpoint.
///
/// Nothing in this shape is guaranteed: the API omits fields freely, and
/// amount-like values arrive as either JSON numbers or strings, so those stay
/// as raw `Value`s. Every accessor degrades to an empty string instead of
/// failing on a missing link.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Transaction {
    pub date: Option<String>,
    pub from: Option<TransferSide>,
    pub to: Option<TransferSide>,
    pub fee: Option<TransferSide>,
    pub net_value: Option<Value>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    pub txhash: Option<String>,
    pub contract_address: Option<String>,
    pub fee_value: Option<Value>,
}

/// One leg of a transfer (`from`, `to`, or `fee`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransferSide {
    pub amount: Option<Value>,
    pub currency: Option<Currency>,
    pub wallet: Option<WalletRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Currency {
    pub symbol: Option<String>,
    pub token_address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WalletRef {
    pub display_address: Option<String>,
}

impl Transaction {
    pub fn date_cell(&self) -> String {
        text(&self.date)
    }

    pub fn sent_amount(&self) -> String {
        amount(&self.from)
    }

    pub fn sent_currency(&self) -> String {
        symbol(&self.from)
    }

    pub fn received_amount(&self) -> String {
        amount(&self.to)
    }

    pub fn received_currency(&self) -> String {
        symbol(&self.to)
    }

    pub fn fee_amount(&self) -> String {
        amount(&self.fee)
    }

    pub fn fee_currency(&self) -> String {
        symbol(&self.fee)
    }

    pub fn net_worth_amount(&self) -> String {
        scalar(self.net_value.as_ref())
    }

    /// The transaction type doubles as the "Label" column.
    pub fn label(&self) -> String {
        text(&self.kind)
    }

    pub fn description_cell(&self) -> String {
        text(&self.description)
    }

    pub fn txhash_cell(&self) -> String {
        text(&self.txhash)
    }

    pub fn contract_address_cell(&self) -> String {
        text(&self.contract_address)
    }

    pub fn sent_token_address(&self) -> String {
        token_address(&self.from)
    }

    pub fn sent_display_address(&self) -> String {
        display_address(&self.from)
    }

    pub fn received_token_address(&self) -> String {
        token_address(&self.to)
    }

    pub fn received_display_address(&self) -> String {
        display_address(&self.to)
    }

    pub fn fee_value_cell(&self) -> String {
        scalar(self.fee_value.as_ref())
    }
}

/// Base currency symbol from a session payload; empty when any link in
/// `portfolios[0].base_currency.symbol` is missing.
pub fn base_currency(session: &Value) -> String {
    session
        .pointer("/portfolios/0/base_currency/symbol")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Wallet display name from a wallet-lookup payload. The endpoint answers
/// with either `{"wallet": {"name": ...}}` or a bare `{"name": ...}`.
pub fn wallet_name(body: &Value) -> Option<String> {
    let wallet = body.get("wallet").unwrap_or(body);
    wallet
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string())
}

/// Render a loosely-typed scalar for a CSV cell. Arrays, objects and null
/// all collapse to the empty string.
fn scalar(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn amount(side: &Option<TransferSide>) -> String {
    scalar(side.as_ref().and_then(|s| s.amount.as_ref()))
}

fn symbol(side: &Option<TransferSide>) -> String {
    side.as_ref()
        .and_then(|s| s.currency.as_ref())
        .and_then(|c| c.symbol.clone())
        .unwrap_or_default()
}

fn token_address(side: &Option<TransferSide>) -> String {
    side.as_ref()
        .and_then(|s| s.currency.as_ref())
        .and_then(|c| c.token_address.clone())
        .unwrap_or_default()
}

fn display_address(side: &Option<TransferSide>) -> String {
    side.as_ref()
        .and_then(|s| s.wallet.as_ref())
        .and_then(|w| w.display_address.clone())
        .unwrap_or_default()
}
