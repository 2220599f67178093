//! Invoice records and field validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Key the model uses for the client name field.
pub const KEY_CLIENT_NAME: &str = "client_name";
/// Key the model uses for the invoice amount field.
pub const KEY_INVOICE_AMOUNT: &str = "invoice_amount";
/// Key the model uses for the product name field.
pub const KEY_PRODUCT_NAME: &str = "product_name";

/// Errors produced while validating model-extracted field values.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The amount was a string that does not parse as a float.
    #[error("invoice_amount is not numeric: {0:?}")]
    NonNumericAmount(String),

    /// A field held a JSON value of an unexpected type.
    #[error("field '{field}' has unexpected type: {value}")]
    UnexpectedType {
        /// Name of the offending field.
        field: &'static str,
        /// The value as received from the model.
        value: Value,
    },
}

/// The persisted unit: one row per source document.
///
/// `file` is the natural key. Re-processing the same document replaces the
/// three non-key fields rather than duplicating the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Unique identity of the source document.
    pub file: String,
    /// Extracted client name, if the model could determine it.
    pub client: Option<String>,
    /// Extracted invoice amount, if the model could determine it.
    pub amount: Option<f64>,
    /// Extracted product name, if the model could determine it.
    pub product: Option<String>,
}

/// The validated three-field mapping produced from a model response.
///
/// The document identity is attached by the caller via [`into_record`],
/// never taken from the model output.
///
/// [`into_record`]: InvoiceFields::into_record
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InvoiceFields {
    /// Client name, or `None` when the model reported `null`.
    pub client_name: Option<String>,
    /// Invoice amount, or `None` when the model reported `null`.
    pub invoice_amount: Option<f64>,
    /// Product name, or `None` when the model reported `null`.
    pub product_name: Option<String>,
}

impl InvoiceFields {
    /// Validate a generic JSON mapping into typed fields.
    ///
    /// Missing keys and explicit JSON `null` both map to `None`. The amount
    /// accepts a JSON number, or a string holding a valid float; anything
    /// else is a [`FieldError`] rather than a silent coercion.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, FieldError> {
        Ok(Self {
            client_name: string_field(map, KEY_CLIENT_NAME)?,
            invoice_amount: amount_field(map)?,
            product_name: string_field(map, KEY_PRODUCT_NAME)?,
        })
    }

    /// Attach a document identity, producing the persistable record.
    pub fn into_record(self, file: impl Into<String>) -> InvoiceRecord {
        InvoiceRecord {
            file: file.into(),
            client: self.client_name,
            amount: self.invoice_amount,
            product: self.product_name,
        }
    }
}

fn string_field(
    map: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<String>, FieldError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(FieldError::UnexpectedType {
            field: key,
            value: other.clone(),
        }),
    }
}

fn amount_field(map: &Map<String, Value>) -> Result<Option<f64>, FieldError> {
    match map.get(KEY_INVOICE_AMOUNT) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        // Models occasionally quote the number; accept it when it parses.
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(FieldError::NonNumericAmount(s.clone())),
        },
        Some(other) => Err(FieldError::UnexpectedType {
            field: KEY_INVOICE_AMOUNT,
            value: other.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn test_all_fields_present() {
        let fields = InvoiceFields::from_map(&map(json!({
            "client_name": "Acme Corp",
            "invoice_amount": 120.0,
            "product_name": "Widget"
        })))
        .unwrap();

        assert_eq!(fields.client_name.as_deref(), Some("Acme Corp"));
        assert_eq!(fields.invoice_amount, Some(120.0));
        assert_eq!(fields.product_name.as_deref(), Some("Widget"));
    }

    #[test]
    fn test_missing_keys_are_none() {
        let fields = InvoiceFields::from_map(&map(json!({}))).unwrap();
        assert_eq!(fields, InvoiceFields::default());
    }

    #[test]
    fn test_explicit_nulls_are_none() {
        let fields = InvoiceFields::from_map(&map(json!({
            "client_name": null,
            "invoice_amount": null,
            "product_name": null
        })))
        .unwrap();
        assert_eq!(fields, InvoiceFields::default());
    }

    #[test]
    fn test_numeric_string_amount_parses() {
        let fields = InvoiceFields::from_map(&map(json!({
            "invoice_amount": "120.50"
        })))
        .unwrap();
        assert_eq!(fields.invoice_amount, Some(120.50));
    }

    #[test]
    fn test_non_numeric_amount_is_rejected() {
        let err = InvoiceFields::from_map(&map(json!({
            "invoice_amount": "one hundred"
        })))
        .unwrap_err();
        assert!(matches!(err, FieldError::NonNumericAmount(_)));
    }

    #[test]
    fn test_wrong_typed_client_is_rejected() {
        let err = InvoiceFields::from_map(&map(json!({
            "client_name": 42
        })))
        .unwrap_err();
        assert!(matches!(
            err,
            FieldError::UnexpectedType { field: "client_name", .. }
        ));
    }

    #[test]
    fn test_into_record_attaches_identity() {
        let record = InvoiceFields {
            client_name: Some("Acme Corp".to_string()),
            invoice_amount: Some(120.0),
            product_name: Some("Widget".to_string()),
        }
        .into_record("doc1.pdf");

        assert_eq!(record.file, "doc1.pdf");
        assert_eq!(record.client.as_deref(), Some("Acme Corp"));
        assert_eq!(record.amount, Some(120.0));
        assert_eq!(record.product.as_deref(), Some("Widget"));
    }
}
