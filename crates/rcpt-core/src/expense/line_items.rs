//! Line item extraction.

use tracing::debug;

use crate::models::expense::{AnalyzeExpenseResponse, LineItemFields};
use crate::models::receipt::{ReceiptItem, ReceiptRecord};

use super::ExpenseExtractor;

/// Item-level detection types that map onto a receipt item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemFieldType {
    /// `ITEM`, the item name.
    Item,
    /// `PRICE`
    Price,
    /// `QUANTITY`
    Quantity,
}

impl LineItemFieldType {
    /// Parse a type tag. Tags outside the vocabulary yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ITEM" => Some(Self::Item),
            "PRICE" => Some(Self::Price),
            "QUANTITY" => Some(Self::Quantity),
            _ => None,
        }
    }

    /// The tag this type is parsed from.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Item => "ITEM",
            Self::Price => "PRICE",
            Self::Quantity => "QUANTITY",
        }
    }
}

/// Extract named items from every line item group of the first document.
///
/// Groups and items keep document order. Items without an `ITEM` detection
/// are dropped. Price and quantity are left unset when not detected.
pub fn extract_items(response: &AnalyzeExpenseResponse) -> Vec<ReceiptItem> {
    let Some(groups) = response
        .first_document()
        .and_then(|doc| doc.line_item_groups.as_ref())
    else {
        return Vec::new();
    };

    groups
        .iter()
        .filter_map(|group| group.line_items.as_ref())
        .flatten()
        .enumerate()
        .filter_map(|(index, line_item)| {
            let item = parse_line_item(line_item);
            if item.is_none() {
                debug!(
                    "Dropping line item {} without an {} detection",
                    index,
                    LineItemFieldType::Item.as_tag()
                );
            }
            item
        })
        .collect()
}

fn parse_line_item(line_item: &LineItemFields) -> Option<ReceiptItem> {
    let mut name = None;
    let mut price = None;
    let mut quantity = None;

    for field in &line_item.line_item_expense_fields {
        let slot = match LineItemFieldType::from_tag(field.type_tag()) {
            Some(LineItemFieldType::Item) => &mut name,
            Some(LineItemFieldType::Price) => &mut price,
            Some(LineItemFieldType::Quantity) => &mut quantity,
            None => continue,
        };
        *slot = Some(field.value().to_string());
    }

    Some(ReceiptItem {
        name: name?,
        price,
        quantity,
    })
}

/// Appends line items to the record.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineItemExtractor;

impl ExpenseExtractor for LineItemExtractor {
    fn extract_into(&self, response: &AnalyzeExpenseResponse, record: &mut ReceiptRecord) {
        record.items.extend(extract_items(response));
    }
}
