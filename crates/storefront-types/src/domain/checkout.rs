use serde::{Deserialize, Serialize};

use crate::domain::cart::Cart;
use crate::domain::validation::ValidationError;

pub const EMPTY_CART_NOTICE: &str = "Your cart is empty. Add products before placing an order.";

/// Delivery details collected for one checkout attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CheckoutDetails {
    pub customer_name: String,
    pub contact_number: String,
    pub delivery_address: String,
}

impl CheckoutDetails {
    /// Returns the trimmed details, or every blank field at once.
    pub fn validate(&self) -> Result<CheckoutDetails, ValidationError> {
        ValidationError::check(&[
            ("customer name", self.customer_name.as_str()),
            ("contact number", self.contact_number.as_str()),
            ("delivery address", self.delivery_address.as_str()),
        ])?;
        Ok(CheckoutDetails {
            customer_name: self.customer_name.trim().to_string(),
            contact_number: self.contact_number.trim().to_string(),
            delivery_address: self.delivery_address.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CheckoutPhase {
    #[default]
    Idle,
    CollectingDetails,
    Submitting,
    Sent,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Your cart is empty. Add products before placing an order.")]
    EmptyCart,
    #[error(transparent)]
    Incomplete(#[from] ValidationError),
    #[error("checkout is not collecting details (currently {0:?})")]
    NotCollecting(CheckoutPhase),
}

/// `Idle -> CollectingDetails -> Submitting -> (Sent | Idle)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutFlow {
    phase: CheckoutPhase,
}

impl CheckoutFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// Opens the details form. Refused on an empty cart; a second start while
    /// the form is open changes nothing.
    pub fn start(&mut self, cart: &Cart) -> Result<CheckoutPhase, CheckoutError> {
        match self.phase {
            CheckoutPhase::CollectingDetails => Ok(self.phase),
            CheckoutPhase::Submitting => Err(CheckoutError::NotCollecting(self.phase)),
            CheckoutPhase::Idle | CheckoutPhase::Sent => {
                if cart.is_empty() {
                    self.phase = CheckoutPhase::Idle;
                    return Err(CheckoutError::EmptyCart);
                }
                self.phase = CheckoutPhase::CollectingDetails;
                Ok(self.phase)
            }
        }
    }

    /// Abandons an open form. Only possible before submission starts.
    pub fn cancel(&mut self) -> bool {
        if self.phase == CheckoutPhase::CollectingDetails {
            self.phase = CheckoutPhase::Idle;
            true
        } else {
            false
        }
    }

    /// Accepts complete details and moves to `Submitting`. Incomplete details
    /// leave the form open.
    pub fn submit(&mut self, details: &CheckoutDetails) -> Result<CheckoutDetails, CheckoutError> {
        if self.phase != CheckoutPhase::CollectingDetails {
            return Err(CheckoutError::NotCollecting(self.phase));
        }
        let details = details.validate()?;
        self.phase = CheckoutPhase::Submitting;
        Ok(details)
    }

    /// Drops an in-flight submission back to `Idle`.
    pub fn abort(&mut self) {
        if self.phase == CheckoutPhase::Submitting {
            self.phase = CheckoutPhase::Idle;
        }
    }

    /// Marks the submission sent and closes the form for the next round.
    /// Returns the phase reached, `Sent`, or the current phase if nothing was
    /// being submitted.
    pub fn complete(&mut self) -> CheckoutPhase {
        if self.phase != CheckoutPhase::Submitting {
            return self.phase;
        }
        self.phase = CheckoutPhase::Sent;
        let reached = self.phase;
        self.phase = CheckoutPhase::Idle;
        reached
    }
}
