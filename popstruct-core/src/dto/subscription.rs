//! Subscription and payment DTOs

use serde::{Deserialize, Serialize};

use crate::domain::user::SubscriptionTier;

/// Body of `POST /subscription/create-order`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrder {
    /// Amount in whole currency units
    pub amount: u64,
}

/// Gateway order returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub order_id: String,
    pub amount: u64,
    pub currency: String,
    pub key_id: String,
}

/// Gateway callback data forwarded to `POST /subscription/verify-payment`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPayment {
    #[serde(rename = "razorpay_order_id")]
    pub order_id: String,
    #[serde(rename = "razorpay_payment_id")]
    pub payment_id: String,
    #[serde(rename = "razorpay_signature")]
    pub signature: String,
}

/// Outcome of a payment verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub subscription_tier: Option<SubscriptionTier>,
}
