pub mod banking;
pub mod momo;
pub mod signature;

use serde::Serialize;

pub use banking::{BankAccount, BankInfo, SUPPORTED_BANKS};
pub use momo::{MomoClient, MomoError, MomoIpnPayload, MomoOutcome, MomoSettings};

use crate::domain::PaymentMethod;

/// Entry of the payment method picker.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethodInfo {
    pub id: PaymentMethod,
    pub name: &'static str,
    pub logo: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banks: Option<&'static [BankInfo]>,
}

pub fn payment_methods() -> Vec<PaymentMethodInfo> {
    vec![
        PaymentMethodInfo {
            id: PaymentMethod::Momo,
            name: "Ví MoMo",
            logo: "https://static.mservice.io/img/logo-momo.png",
            description: "Thanh toán nhanh chóng qua ví MoMo",
            banks: None,
        },
        PaymentMethodInfo {
            id: PaymentMethod::Banking,
            name: "Chuyển khoản ngân hàng",
            logo: "https://cdn-icons-png.flaticon.com/512/2830/2830284.png",
            description: "Thanh toán bằng chuyển khoản ngân hàng",
            banks: Some(SUPPORTED_BANKS),
        },
        PaymentMethodInfo {
            id: PaymentMethod::Cod,
            name: "Thanh toán khi nhận hàng",
            logo: "https://cdn-icons-png.flaticon.com/512/1554/1554401.png",
            description: "Thanh toán khi nhận được sản phẩm",
            banks: None,
        },
    ]
}
