// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Payment resource model.
//!
//! Monetary values are [`Decimal`]s using the string representation: they
//! travel as JSON strings and keep their scale, so `"2.00000"` comes back as
//! `"2.00000"`. A value is only accepted if it is already in canonical form
//! and fits a [`Decimal`] exactly; anything that would come back different
//! (rounded, `+5`, `007.1`, `1e3`, `-0.00`) or a bare JSON number is rejected.

use crate::base::{Record, Resource};
use rust_decimal::Decimal;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// A payment resource.
///
/// Serializes as the flat [`Resource`] envelope plus an `attributes` object,
/// which may be absent or `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Payment {
    #[serde(flatten)]
    pub resource: Resource,
    #[serde(default)]
    pub attributes: Option<PaymentAttributes>,
}

impl Payment {
    /// Creates a payment with the given id and no attributes.
    pub fn new(id: impl Into<String>) -> Self {
        Payment {
            resource: Resource {
                kind: "Payment".to_string(),
                id: id.into(),
                ..Resource::default()
            },
            attributes: None,
        }
    }

    pub fn with_attributes(mut self, attributes: PaymentAttributes) -> Self {
        self.attributes = Some(attributes);
        self
    }
}

impl Record for Payment {
    const COLLECTION: &'static str = "payments";

    fn id(&self) -> &str {
        &self.resource.id
    }

    fn set_id(&mut self, id: String) {
        self.resource.id = id;
    }
}

/// Details of the payment itself.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PaymentAttributes {
    #[serde(deserialize_with = "exact_decimal")]
    pub amount: Option<Decimal>,
    pub beneficiary_party: Option<PaymentParty>,
    pub charges_information: Option<PaymentCharges>,
    pub currency: String,
    pub debtor_party: Option<PaymentParty>,
    pub end_to_end_reference: String,
    pub fx: Option<PaymentFx>,
    pub numeric_reference: String,
    pub payment_id: String,
    pub payment_purpose: String,
    pub payment_scheme: String,
    pub payment_type: String,
    pub processing_date: String,
    pub reference: String,
    pub scheme_payment_sub_type: String,
    pub scheme_payment_type: String,
    pub sponsor_party: Option<PaymentParty>,
}

/// A party involved in the payment (beneficiary, debtor or sponsor).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PaymentParty {
    pub account_name: String,
    pub account_number: String,
    pub account_number_code: String,
    pub account_type: i64,
    pub address: String,
    pub bank_id: String,
    pub bank_id_code: String,
    pub name: String,
}

/// Charges levied on the payment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PaymentCharges {
    pub bearer_code: String,
    pub sender_charges: Vec<SenderCharge>,
    #[serde(deserialize_with = "exact_decimal")]
    pub receiver_charges_amount: Option<Decimal>,
    pub receiver_charges_currency: String,
}

/// A single charge borne by the sender.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SenderCharge {
    #[serde(deserialize_with = "exact_decimal")]
    pub amount: Option<Decimal>,
    pub currency: String,
}

/// Foreign exchange details.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PaymentFx {
    pub contract_reference: String,
    #[serde(deserialize_with = "exact_decimal")]
    pub exchange_rate: Option<Decimal>,
    #[serde(deserialize_with = "exact_decimal")]
    pub original_amount: Option<Decimal>,
    pub original_currency: String,
}

/// Decodes an optional decimal string that must re-encode to exactly itself.
fn exact_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let value = Decimal::from_str_exact(&text).map_err(de::Error::custom)?;
    if value.to_string() != text {
        return Err(de::Error::custom(format!(
            "decimal {text:?} cannot be stored exactly"
        )));
    }
    Ok(Some(value))
}
