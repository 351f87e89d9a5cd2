//! Bank-transfer payment: supported banks and the transfer reference format.

use serde::Serialize;
use uuid::Uuid;

pub const TRANSFER_CONTENT_PREFIX: &str = "Thanh toan";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BankInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub logo: &'static str,
}

pub const SUPPORTED_BANKS: &[BankInfo] = &[
    BankInfo {
        id: "VIETCOMBANK",
        name: "Vietcombank",
        logo: "https://cdn.haitrieu.com/wp-content/uploads/2022/02/Logo-Vietcombank.png",
    },
    BankInfo {
        id: "TECHCOMBANK",
        name: "Techcombank",
        logo: "https://cdn.haitrieu.com/wp-content/uploads/2021/11/Logo-TCB-V.png",
    },
    BankInfo {
        id: "BIDV",
        name: "BIDV",
        logo: "https://cdn.haitrieu.com/wp-content/uploads/2022/01/Logo-BIDV-.png",
    },
    BankInfo {
        id: "VIETINBANK",
        name: "Vietinbank",
        logo: "https://cdn.haitrieu.com/wp-content/uploads/2022/01/Logo-VietinBank-CTG-Te.png",
    },
    BankInfo {
        id: "MBBANK",
        name: "MB Bank",
        logo: "https://cdn.haitrieu.com/wp-content/uploads/2022/02/Logo-MB-Bank-MBB.png",
    },
    BankInfo {
        id: "TPBANK",
        name: "TPBank",
        logo: "https://cdn.haitrieu.com/wp-content/uploads/2022/02/Logo-TPBank.png",
    },
];

pub fn find_bank(bank_id: &str) -> Option<&'static BankInfo> {
    SUPPORTED_BANKS
        .iter()
        .find(|bank| bank.id.eq_ignore_ascii_case(bank_id.trim()))
}

/// Merchant account shown to the customer for manual transfer.
#[derive(Debug, Clone)]
pub struct BankAccount {
    pub account_number: String,
    pub account_name: String,
}

/// Transfer memo embedding the order id. Hyphens are dropped because several
/// banks strip punctuation from the memo.
pub fn transfer_content(order_id: Uuid) -> String {
    format!("{} {}", TRANSFER_CONTENT_PREFIX, order_id.simple())
}
