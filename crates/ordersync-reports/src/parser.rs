//! Parser for the XML order report document.
//!
//! The document carries repeated `<Message>` elements, each holding an
//! `<Order>` (order id and purchase date) and an `<OrderItem>` (SKU):
//!
//! ```xml
//! <Message>
//!   <Order>
//!     <AmazonOrderId>A-1</AmazonOrderId>
//!     <PurchaseDate>2023-01-01T00:00:00</PurchaseDate>
//!   </Order>
//!   <OrderItem>
//!     <SKU>SKU1</SKU>
//!   </OrderItem>
//! </Message>
//! ```
//!
//! Parsing is all-or-nothing: a message missing any required field aborts the
//! whole parse instead of being skipped, so silent data loss cannot hide in a
//! partially ingested report.

use quick_xml::events::Event;
use quick_xml::Reader;

use ordersync_core::Purchase;

use crate::error::ReportsError;

/// Parses a raw order report document into purchase records, in document order.
///
/// The full record set is materialized in memory; report windows are at most
/// a week, which bounds the payload.
///
/// # Errors
///
/// - [`ReportsError::Xml`] if the payload is not well-formed XML.
/// - [`ReportsError::MalformedReport`] if the payload contains no elements at
///   all, or any `<Message>` is empty or lacks an order id, purchase date,
///   or SKU.
pub fn parse_order_report(xml: &str) -> Result<Vec<Purchase>, ReportsError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut purchases = Vec::new();
    let mut saw_element = false;
    let mut message_index = 0usize;

    let mut in_message = false;
    let mut in_order = false;
    let mut in_order_item = false;
    let mut current_tag = String::new();

    let mut order_id: Option<String> = None;
    let mut purchase_date: Option<String> = None;
    let mut sku: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                saw_element = true;
                let name_buf = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_buf).unwrap_or("").to_string();
                match name.as_str() {
                    "Message" => {
                        in_message = true;
                        message_index += 1;
                        order_id = None;
                        purchase_date = None;
                        sku = None;
                    }
                    "Order" if in_message => in_order = true,
                    "OrderItem" if in_message => in_order_item = true,
                    _ => {}
                }
                current_tag = name;
            }
            Ok(Event::End(e)) => {
                let name_buf = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_buf).unwrap_or("");
                match name {
                    "Order" => in_order = false,
                    "OrderItem" => in_order_item = false,
                    "Message" if in_message => {
                        in_message = false;
                        purchases.push(Purchase {
                            order_id: take_required(&mut order_id, message_index, "AmazonOrderId")?,
                            purchase_date: take_required(
                                &mut purchase_date,
                                message_index,
                                "PurchaseDate",
                            )?,
                            sku: take_required(&mut sku, message_index, "SKU")?,
                        });
                    }
                    _ => {}
                }
                current_tag.clear();
            }
            Ok(Event::Text(e)) => {
                if in_message {
                    let text = e.unescape()?.into_owned();
                    match current_tag.as_str() {
                        "AmazonOrderId" if in_order => order_id = Some(text),
                        "PurchaseDate" if in_order => purchase_date = Some(text),
                        "SKU" if in_order_item => sku = Some(text),
                        _ => {}
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                saw_element = true;
                let name_buf = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_buf).unwrap_or("");
                // A self-closing <Message/> carries no fields at all; that is
                // a malformed message, not an absent one.
                if name == "Message" {
                    message_index += 1;
                    return Err(ReportsError::MalformedReport {
                        reason: format!("message {message_index} is empty"),
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReportsError::Xml(e)),
            _ => {}
        }
    }

    if !saw_element {
        return Err(ReportsError::MalformedReport {
            reason: "payload contains no XML elements".to_owned(),
        });
    }

    Ok(purchases)
}

fn take_required(
    field: &mut Option<String>,
    message_index: usize,
    name: &str,
) -> Result<String, ReportsError> {
    field
        .take()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ReportsError::MalformedReport {
            reason: format!("message {message_index} is missing <{name}>"),
        })
}
