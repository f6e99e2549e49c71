use crate::error::{InvoiceError, InvoiceResult};
use validator::{Validate, ValidationErrors};

/// Longest single order the prompt will carry.
pub const MAX_ORDER_CHARS: usize = 8_000;

pub fn validate_model<T: Validate>(model: &T) -> InvoiceResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(InvoiceError::validation("invoice", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages("", errors, &mut messages);
    messages.sort();
    messages.join(", ")
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, messages: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            validator::ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = match &error.message {
                        Some(message) => format!("{}: {}", path, message),
                        None => match error.code.as_ref() {
                            "length" => format!("Length validation failed for field '{}'", path),
                            "range" => format!("Value out of range for field '{}'", path),
                            "required" => format!("Field '{}' is required", path),
                            code => format!("Validation failed for field '{}': {}", path, code),
                        },
                    };
                    messages.push(message);
                }
            }
            validator::ValidationErrorsKind::Struct(nested) => {
                collect_messages(&path, nested, messages);
            }
            validator::ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(&format!("{}[{}]", path, index), nested, messages);
                }
            }
        }
    }
}

/// Reject a submission with nothing to invoice.
pub fn validate_order_text(text: &str) -> InvoiceResult<()> {
    if text.trim().is_empty() {
        return Err(InvoiceError::validation(
            "order_details",
            "Paste at least one order",
        ));
    }

    Ok(())
}

/// Reject a single order too long to send to the model.
pub fn validate_order_length(order: &str) -> InvoiceResult<()> {
    let length = order.chars().count();
    if length > MAX_ORDER_CHARS {
        return Err(InvoiceError::validation(
            "order_details",
            format!("Order is {} characters; the limit is {}", length, MAX_ORDER_CHARS),
        ));
    }

    Ok(())
}
