//! Basic types for the core ledger module

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Metals with a dedicated slot in every party ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Gold,
    Diamond,
    Silver,
    Platinum,
}

impl Metal {
    /// All tracked metals in ledger column order
    pub const ALL: [Metal; 4] = [Metal::Gold, Metal::Diamond, Metal::Silver, Metal::Platinum];

    /// Name as it appears in the sheet
    pub fn as_str(&self) -> &'static str {
        match self {
            Metal::Gold => "Gold",
            Metal::Diamond => "Diamond",
            Metal::Silver => "Silver",
            Metal::Platinum => "Platinum",
        }
    }

    /// Exact (case-sensitive) lookup of a sheet metal name
    pub fn from_sheet(name: &str) -> Option<Metal> {
        Metal::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

impl std::fmt::Display for Metal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metal type as recorded on a transaction: any non-blank string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetalType(String);

impl MetalType {
    pub fn new(name: impl Into<String>) -> Self {
        MetalType(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank metal types mark a malformed record
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The tracked metal this type names, if any
    pub fn known(&self) -> Option<Metal> {
        Metal::from_sheet(&self.0)
    }
}

impl From<Metal> for MetalType {
    fn from(metal: Metal) -> Self {
        MetalType(metal.as_str().to_string())
    }
}

impl From<&str> for MetalType {
    fn from(name: &str) -> Self {
        MetalType(name.to_string())
    }
}

impl std::fmt::Display for MetalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Voucher type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VoucherType {
    /// Metal leaving the `from` party
    #[default]
    Issue,
    /// Metal arriving from the `from` party
    Receipt,
}

impl VoucherType {
    /// Classify a sheet value: only the exact tag "Issue" is an issue,
    /// everything else is receipt-like.
    pub fn from_sheet(tag: &str) -> Self {
        if tag == "Issue" {
            VoucherType::Issue
        } else {
            VoucherType::Receipt
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoucherType::Issue => "Issue",
            VoucherType::Receipt => "Receipt",
        }
    }
}

impl std::str::FromStr for VoucherType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Issue" => Ok(VoucherType::Issue),
            "Receipt" => Ok(VoucherType::Receipt),
            _ => Err(format!("Invalid voucher type: {}", s)),
        }
    }
}

impl std::fmt::Display for VoucherType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    /// Parse a sheet role; anything other than "admin" (any case) is a user
    pub fn from_sheet(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Read a stored role with the same rule as the sheet
pub(crate) fn deserialize_role<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|raw| Role::from_sheet(&raw))
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

/// Which per-metal balance view is being computed.
///
/// The two views carry opposite sign conventions and different orderings;
/// both are kept as the sheet's users know them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceView {
    /// Global/admin summary: `issued - receipt`, sorted by metal type
    #[default]
    Ledger,
    /// Stock search view: `receipt - issued`, in first-seen order
    Stock,
}

impl BalanceView {
    /// Balance under this view's sign convention
    pub fn balance(&self, issued: Decimal, receipt: Decimal) -> Decimal {
        match self {
            BalanceView::Ledger => issued - receipt,
            BalanceView::Stock => receipt - issued,
        }
    }
}

impl std::str::FromStr for BalanceView {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ledger" => Ok(BalanceView::Ledger),
            "stock" => Ok(BalanceView::Stock),
            _ => Err(format!("Invalid balance view: {}", s)),
        }
    }
}

/// Stock level badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    GoodStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn classify(balance: Decimal, good_threshold: Decimal) -> Self {
        if balance > good_threshold {
            StockStatus::GoodStock
        } else if balance > Decimal::ZERO {
            StockStatus::LowStock
        } else {
            StockStatus::OutOfStock
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockStatus::GoodStock => write!(f, "Good Stock"),
            StockStatus::LowStock => write!(f, "Low Stock"),
            StockStatus::OutOfStock => write!(f, "Out of Stock"),
        }
    }
}
