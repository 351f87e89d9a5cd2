//! Payment initiation for MoMo wallet and bank transfer.
//! Neither path changes the order status; both record pending payment metadata.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Order, OrderStatus, PaymentDetails, PaymentMethod};
use crate::error::AppError;
use crate::payment::banking::{find_bank, transfer_content};
use crate::payment::{BankAccount, MomoClient};
use crate::ports::OrderRepository;
use crate::validation::{sanitize_string, validate_max_len, ORDER_INFO_MAX_LEN};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MomoPaymentInput {
    pub order_id: Uuid,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub order_info: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MomoPaymentOutput {
    pub success: bool,
    pub pay_url: String,
    pub order_id: Uuid,
    pub request_id: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BankingPaymentInput {
    pub order_id: Uuid,
    #[serde(default)]
    pub amount: Option<i64>,
    pub bank_id: String,
}

/// What the customer needs to make the transfer by hand.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BankTransferInstructions {
    pub success: bool,
    pub order_id: Uuid,
    pub bank_id: String,
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
    pub amount: i64,
    pub content: String,
}

#[derive(Clone)]
pub struct PaymentInitiator {
    orders: Arc<dyn OrderRepository>,
    momo: MomoClient,
    bank_account: BankAccount,
}

impl PaymentInitiator {
    pub fn new(orders: Arc<dyn OrderRepository>, momo: MomoClient, bank_account: BankAccount) -> Self {
        Self {
            orders,
            momo,
            bank_account,
        }
    }

    async fn payable_order(
        &self,
        order_id: Uuid,
        method: PaymentMethod,
        amount: Option<i64>,
    ) -> Result<Order, AppError> {
        let order = self.orders.get_by_id(order_id).await?;

        if order.payment_method != method {
            return Err(AppError::BadRequest(format!(
                "order {} is paid by {}, not {}",
                order.id, order.payment_method, method
            )));
        }
        if order.status != OrderStatus::Pending {
            return Err(AppError::Conflict(format!(
                "order {} is {}; only pending orders can be paid",
                order.id, order.status
            )));
        }
        if let Some(amount) = amount {
            if amount != order.total_amount {
                return Err(AppError::BadRequest(format!(
                    "amount {} does not match order total {}",
                    amount, order.total_amount
                )));
            }
        }

        Ok(order)
    }

    async fn record_pending_details(
        &self,
        order: &Order,
        details: &PaymentDetails,
    ) -> Result<Order, AppError> {
        self.orders
            .set_payment_details(order.id, OrderStatus::Pending, details)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!("order {} changed while starting payment", order.id))
            })
    }

    pub async fn create_momo(&self, input: MomoPaymentInput) -> Result<MomoPaymentOutput, AppError> {
        let order = self
            .payable_order(input.order_id, PaymentMethod::Momo, input.amount)
            .await?;

        let order_info = input
            .order_info
            .as_deref()
            .map(sanitize_string)
            .filter(|info| !info.is_empty())
            .unwrap_or_else(|| format!("Thanh toan don hang {}", order.id.simple()));
        validate_max_len("orderInfo", &order_info, ORDER_INFO_MAX_LEN)?;

        let request_id = Uuid::new_v4().to_string();
        let request = self.momo.build_create_request(
            &order.id.to_string(),
            &request_id,
            order.total_amount,
            &order_info,
        )?;

        let response = self.momo.create_payment(&request).await.map_err(|e| {
            tracing::error!(order_id = %order.id, error = %e, "MoMo payment creation failed");
            AppError::from(e)
        })?;
        let pay_url = response
            .pay_url
            .ok_or_else(|| AppError::Upstream("MoMo response has no payUrl".to_string()))?;

        let mut details = PaymentDetails::new(PaymentMethod::Momo, order.total_amount);
        details.request_id = Some(request_id.clone());
        self.record_pending_details(&order, &details).await?;

        tracing::info!(order_id = %order.id, request_id = %request_id, "MoMo payment created");

        Ok(MomoPaymentOutput {
            success: true,
            pay_url,
            order_id: order.id,
            request_id,
        })
    }

    pub async fn create_banking(
        &self,
        input: BankingPaymentInput,
    ) -> Result<BankTransferInstructions, AppError> {
        let bank = find_bank(&input.bank_id)
            .ok_or_else(|| AppError::Validation(format!("bankId: unsupported bank '{}'", input.bank_id)))?;

        let order = self
            .payable_order(input.order_id, PaymentMethod::Banking, input.amount)
            .await?;

        let content = transfer_content(order.id);
        let mut details = PaymentDetails::new(PaymentMethod::Banking, order.total_amount);
        details.bank_id = Some(bank.id.to_string());
        details.transfer_content = Some(content.clone());
        self.record_pending_details(&order, &details).await?;

        tracing::info!(order_id = %order.id, bank_id = bank.id, "Bank transfer requested");

        Ok(BankTransferInstructions {
            success: true,
            order_id: order.id,
            bank_id: bank.id.to_string(),
            bank_name: bank.name.to_string(),
            account_number: self.bank_account.account_number.clone(),
            account_name: self.bank_account.account_name.clone(),
            amount: order.total_amount,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryOrderRepository;
    use crate::domain::{CustomerInfo, OrderLine};
    use crate::payment::MomoSettings;

    fn momo(endpoint: String) -> MomoClient {
        MomoClient::new(MomoSettings {
            endpoint,
            partner_code: "MOMOTEST".to_string(),
            access_key: "access".to_string(),
            secret_key: "secret".to_string(),
            redirect_url: "http://localhost:3000/payment/result".to_string(),
            ipn_url: "http://localhost:3000/payment/momo/ipn".to_string(),
            request_type: "captureWallet".to_string(),
            timeout_secs: 5,
        })
    }

    fn order(method: PaymentMethod) -> Order {
        Order::new(
            None,
            vec![OrderLine {
                product_id: Uuid::new_v4(),
                name: "Tai nghe".to_string(),
                unit_price: 150_000,
                quantity: 2,
            }],
            CustomerInfo {
                name: "Tran B".to_string(),
                email: "b@example.vn".to_string(),
                phone: "0912345678".to_string(),
                address: "2 Hai Ba Trung".to_string(),
                city: None,
                note: None,
            },
            method,
        )
    }

    async fn initiator_with(order: &Order, endpoint: String) -> (Arc<InMemoryOrderRepository>, PaymentInitiator) {
        let orders = Arc::new(InMemoryOrderRepository::new());
        orders.insert(order).await.unwrap();
        let initiator = PaymentInitiator::new(
            orders.clone(),
            momo(endpoint),
            BankAccount {
                account_number: "0123456789".to_string(),
                account_name: "CONG TY MERN".to_string(),
            },
        );
        (orders, initiator)
    }

    #[tokio::test]
    async fn banking_records_transfer_reference() {
        let order = order(PaymentMethod::Banking);
        let (orders, initiator) = initiator_with(&order, "http://localhost".to_string()).await;

        let out = initiator
            .create_banking(BankingPaymentInput {
                order_id: order.id,
                amount: Some(300_000),
                bank_id: "vietcombank".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(out.bank_id, "VIETCOMBANK");
        assert_eq!(out.amount, 300_000);
        assert_eq!(out.content, format!("Thanh toan {}", order.id.simple()));

        let stored = orders.get_by_id(order.id).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
        let details = stored.payment_details.unwrap();
        assert_eq!(details.bank_id.as_deref(), Some("VIETCOMBANK"));
        assert_eq!(details.transfer_content, Some(out.content));
    }

    #[tokio::test]
    async fn banking_rejects_unknown_bank_and_wrong_amount() {
        let order = order(PaymentMethod::Banking);
        let (_, initiator) = initiator_with(&order, "http://localhost".to_string()).await;

        let unknown = initiator
            .create_banking(BankingPaymentInput {
                order_id: order.id,
                amount: None,
                bank_id: "NOBANK".to_string(),
            })
            .await;
        assert!(matches!(unknown, Err(AppError::Validation(_))));

        let wrong_amount = initiator
            .create_banking(BankingPaymentInput {
                order_id: order.id,
                amount: Some(1),
                bank_id: "BIDV".to_string(),
            })
            .await;
        assert!(matches!(wrong_amount, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn momo_requires_pending_momo_order() {
        let cod = order(PaymentMethod::Cod);
        let (_, initiator) = initiator_with(&cod, "http://localhost".to_string()).await;

        let result = initiator
            .create_momo(MomoPaymentInput {
                order_id: cod.id,
                amount: None,
                order_info: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let missing = initiator
            .create_momo(MomoPaymentInput {
                order_id: Uuid::new_v4(),
                amount: None,
                order_info: None,
            })
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn momo_stores_request_id_and_keeps_pending() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v2/gateway/api/create")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"resultCode":0,"message":"Successful.","payUrl":"https://pay.example/abc"}"#)
            .create_async()
            .await;

        let order = order(PaymentMethod::Momo);
        let (orders, initiator) =
            initiator_with(&order, format!("{}/v2/gateway/api/create", server.url())).await;

        let out = initiator
            .create_momo(MomoPaymentInput {
                order_id: order.id,
                amount: Some(300_000),
                order_info: None,
            })
            .await
            .unwrap();

        assert_eq!(out.pay_url, "https://pay.example/abc");
        let stored = orders.get_by_id(order.id).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(
            stored.payment_details.unwrap().request_id,
            Some(out.request_id)
        );
    }

    #[tokio::test]
    async fn momo_gateway_rejection_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v2/gateway/api/create")
            .with_status(200)
            .with_body(r#"{"resultCode":13,"message":"Merchant authentication failed."}"#)
            .create_async()
            .await;

        let order = order(PaymentMethod::Momo);
        let (orders, initiator) =
            initiator_with(&order, format!("{}/v2/gateway/api/create", server.url())).await;

        let result = initiator
            .create_momo(MomoPaymentInput {
                order_id: order.id,
                amount: None,
                order_info: Some("Don hang".to_string()),
            })
            .await;

        assert!(matches!(result, Err(AppError::Upstream(_))));
        assert!(orders.get_by_id(order.id).await.unwrap().payment_details.is_none());
    }
}
