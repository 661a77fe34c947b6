//! Subscription and payment endpoints

use popstruct_core::domain::user::SubscriptionStatus;
use popstruct_core::dto::subscription::{
    CreateOrder, PaymentOrder, PaymentVerification, VerifyPayment,
};

use crate::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// Get the current plan and remaining job quota
    pub async fn subscription_status(&self) -> Result<SubscriptionStatus> {
        let url = self.url("/subscription/status");
        let response = self.send_authorized(|c| c.get(&url)).await?;

        self.handle_response(response).await
    }

    /// Create a payment order for the premium upgrade
    ///
    /// # Arguments
    /// * `amount` - Amount in whole currency units
    pub async fn create_order(&self, amount: u64) -> Result<PaymentOrder> {
        let url = self.url("/subscription/create-order");
        let body = CreateOrder { amount };
        let response = self.send_authorized(|c| c.post(&url).json(&body)).await?;

        self.handle_response(response).await
    }

    /// Forward the gateway's payment confirmation for verification
    pub async fn verify_payment(&self, req: &VerifyPayment) -> Result<PaymentVerification> {
        let url = self.url("/subscription/verify-payment");
        let response = self.send_authorized(|c| c.post(&url).json(req)).await?;

        self.handle_response(response).await
    }
}
