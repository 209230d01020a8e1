use event_core::event::{DomainEvent, Event};
use event_macros::domain_event;

#[domain_event(aggregate_type = "Order")]
struct OrderShipped {
    carrier: String,
}

#[domain_event]
struct StockAdjusted {
    sku: String,
    delta: i32,
}

fn main() {
    let shipped = OrderShipped::new("ups".to_string()).with_aggregate("order-7", 3);
    assert_eq!(shipped.event_name(), "OrderShipped");
    assert_eq!(shipped.aggregate_type(), "Order");
    assert_eq!(shipped.aggregate_id(), "order-7");
    assert_eq!(shipped.aggregate_version(), 3);
    assert_eq!(shipped.carrier, "ups");

    let adjusted = StockAdjusted::new("sku-1".to_string(), -2);
    assert_eq!(adjusted.aggregate_type(), "");
    assert_eq!(adjusted.aggregate_version(), 0);
    assert_eq!(adjusted.delta, -2);
    assert_eq!(adjusted.sku, "sku-1");
}
