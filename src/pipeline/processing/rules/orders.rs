use tracing::{debug, warn};

use super::{mark_text_if_written, required_column, TableRules};
use crate::error::Result;
use crate::types::{RecordSet, TableName, Value};

pub const STATUS_SHIPPED: &str = "Shipped";
pub const STATUS_PENDING: &str = "Pending";
pub const PAYMENT_COD: &str = "COD";
pub const PAYMENT_UNKNOWN: &str = "Unknown";

/// Infers missing order status and payment method.
///
/// Precedence: a cash-on-delivery order with no status is `Shipped`; any
/// other order with no status is `Pending`; a missing payment method is
/// `Unknown`. Every `Shipped` order is then forced to `COD`, whatever set the
/// status, which overwrites a non-COD method on orders that arrived already
/// marked `Shipped`.
#[derive(Debug, Default)]
pub struct OrderRules;

impl OrderRules {
    pub fn new() -> Self {
        Self
    }
}

impl TableRules for OrderRules {
    fn apply(&self, mut records: RecordSet) -> Result<RecordSet> {
        let payment = required_column(&mut records, TableName::Orders, "payment_method")?
            .values
            .clone();

        let status = required_column(&mut records, TableName::Orders, "order_status")?;
        let mut shipped_inferred = 0usize;
        let mut pending_inferred = 0usize;
        for (s, p) in status.values.iter_mut().zip(&payment) {
            if !s.is_missing() {
                continue;
            }
            if p.as_text() == Some(PAYMENT_COD) {
                *s = Value::text(STATUS_SHIPPED);
                shipped_inferred += 1;
            } else {
                *s = Value::text(STATUS_PENDING);
                pending_inferred += 1;
            }
        }
        mark_text_if_written(status);
        let shipped: Vec<bool> = status
            .values
            .iter()
            .map(|s| s.as_text() == Some(STATUS_SHIPPED))
            .collect();

        let payment = required_column(&mut records, TableName::Orders, "payment_method")?;
        let mut forced_cod = 0usize;
        for (p, is_shipped) in payment.values.iter_mut().zip(shipped) {
            if p.is_missing() {
                *p = Value::text(PAYMENT_UNKNOWN);
            }
            if is_shipped && p.as_text() != Some(PAYMENT_COD) {
                if !matches!(p.as_text(), Some(PAYMENT_UNKNOWN)) {
                    warn!(previous = %p, "shipped order payment method overwritten with COD");
                }
                *p = Value::text(PAYMENT_COD);
                forced_cod += 1;
            }
        }
        mark_text_if_written(payment);

        debug!(shipped_inferred, pending_inferred, forced_cod, "applied order rules");
        Ok(records)
    }

    fn table(&self) -> TableName {
        TableName::Orders
    }

    fn name(&self) -> &str {
        "order status and payment inference"
    }
}
