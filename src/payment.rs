//! Payment capability for paid updates.
//!
//! No payment processor is integrated; [`SimulatedGateway`] approves every
//! valid charge.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::PaymentError;

/// Supported payment providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Stripe,
    #[value(name = "paypal")]
    PayPal,
    Wise,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Stripe => write!(f, "stripe"),
            PaymentMethod::PayPal => write!(f, "paypal"),
            PaymentMethod::Wise => write!(f, "wise"),
        }
    }
}

/// Charges the user for an update.
///
/// Returns `Ok(false)` when the provider declines.
#[cfg_attr(test, mockall::automock)]
pub trait PaymentGateway {
    fn charge(&self, method: PaymentMethod, amount: f64) -> Result<bool, PaymentError>;
}

/// Gateway that approves every charge without contacting a provider.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedGateway;

impl PaymentGateway for SimulatedGateway {
    fn charge(&self, method: PaymentMethod, amount: f64) -> Result<bool, PaymentError> {
        validate_amount(amount)?;
        info!("Simulated {method} charge of ${amount:.2}");
        Ok(true)
    }
}

/// Reject amounts no provider could charge.
pub fn validate_amount(amount: f64) -> Result<(), PaymentError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(PaymentError::InvalidAmount(amount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_gateway_approves() {
        assert!(SimulatedGateway.charge(PaymentMethod::Stripe, 2.99).unwrap());
    }

    #[test]
    fn test_invalid_amounts_rejected() {
        assert!(SimulatedGateway.charge(PaymentMethod::Wise, -1.0).is_err());
        assert!(SimulatedGateway.charge(PaymentMethod::Wise, f64::NAN).is_err());
        assert!(
            SimulatedGateway
                .charge(PaymentMethod::PayPal, f64::INFINITY)
                .is_err()
        );
    }

    #[test]
    fn test_method_display_matches_cli_names() {
        for method in PaymentMethod::value_variants() {
            let name = method.to_possible_value().unwrap();
            assert_eq!(name.get_name(), method.to_string());
        }
    }
}
