//! Order Splitter
//!
//! Splits the operator's pasted text into individual orders on the
//! delimiter the order-intake template puts in front of each customer name.

use regex::Regex;

use crate::config::DEFAULT_ORDER_DELIMITER;
use crate::error::{InvoiceError, InvoiceResult};

/// Label restored in front of each order, since the split consumes it.
const NAME_LABEL: &str = "Name: ";

/// Regex-driven order splitter
#[derive(Debug, Clone)]
pub struct OrderSplitter {
    delimiter: Regex,
}

impl Default for OrderSplitter {
    fn default() -> Self {
        Self {
            delimiter: Regex::new(DEFAULT_ORDER_DELIMITER).expect("default delimiter is a valid regex"),
        }
    }
}

impl OrderSplitter {
    pub fn new(pattern: &str) -> InvoiceResult<Self> {
        let delimiter = Regex::new(pattern).map_err(|e| {
            InvoiceError::configuration(format!("Invalid order delimiter '{}': {}", pattern, e))
        })?;
        Ok(Self { delimiter })
    }

    /// Split `text` into trimmed, non-empty orders in their original order.
    ///
    /// Pieces that followed a delimiter get the customer-name label back.
    /// Text before the first delimiter is kept as-is when it is not blank.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.delimiter
            .split(text)
            .enumerate()
            .filter_map(|(idx, piece)| {
                let piece = piece.trim();
                if piece.is_empty() {
                    None
                } else if idx == 0 {
                    Some(piece.to_string())
                } else {
                    Some(format!("{}{}", NAME_LABEL, piece))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_multiple_orders() {
        let text = "✅Name : Jane Doe\nQueen mattress\n\n✅Name  : John Roe\nKing bed frame, black";
        let orders = OrderSplitter::default().split(text);

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0], "Name: Jane Doe\nQueen mattress");
        assert_eq!(orders[1], "Name: John Roe\nKing bed frame, black");
    }

    #[test]
    fn test_split_without_delimiter_keeps_whole_text() {
        let orders = OrderSplitter::default().split("  Twin bunk bed, white  \n");
        assert_eq!(orders, vec!["Twin bunk bed, white".to_string()]);
    }

    #[test]
    fn test_split_keeps_non_blank_preamble() {
        let text = "Orders for Saturday\n✅Name : Jane\nSofa";
        let orders = OrderSplitter::default().split(text);
        assert_eq!(orders, vec!["Orders for Saturday".to_string(), "Name: Jane\nSofa".to_string()]);
    }

    #[test]
    fn test_split_drops_empty_pieces() {
        let orders = OrderSplitter::default().split("✅Name :   ✅Name : Jane\nSofa\n✅Name :\n");
        assert_eq!(orders, vec!["Name: Jane\nSofa".to_string()]);
    }

    #[test]
    fn test_split_blank_input() {
        assert!(OrderSplitter::default().split("").is_empty());
        assert!(OrderSplitter::default().split(" \n ").is_empty());
    }

    #[test]
    fn test_delimiter_requires_whitespace_before_colon() {
        let splitter = OrderSplitter::default();
        assert_eq!(splitter.split("✅Name: Jane"), vec!["✅Name: Jane"]);
        assert_eq!(splitter.split("✅Name : Jane ✅Name\t: Joe"), vec!["Name: Jane", "Name: Joe"]);
    }

    #[test]
    fn test_custom_delimiter() {
        let splitter = OrderSplitter::new(r"-{3,}").unwrap();
        assert_eq!(splitter.split("a\n---\nb"), vec!["a".to_string(), "Name: b".to_string()]);
    }

    #[test]
    fn test_invalid_delimiter() {
        let err = OrderSplitter::new("(").unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }
}
