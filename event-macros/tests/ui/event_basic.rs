use event_core::event::Event;
use event_macros::event;

#[event(version = "2.0", source = "billing")]
#[derive(PartialEq)]
pub struct InvoiceIssued {
    pub invoice_id: String,
    pub amount_cents: i64,
}

#[event]
struct Ping {}

fn main() {
    let issued = InvoiceIssued::new("inv-1".to_string(), 1200);
    assert_eq!(issued.event_name(), "InvoiceIssued");
    assert_eq!(issued.schema_version(), "2.0");
    assert_eq!(issued.source(), "billing");
    assert_eq!(issued.amount_cents, 1200);
    assert!(!issued.event_id().is_nil());

    let cloned = issued.clone();
    assert_eq!(cloned, issued);

    let ping = Ping::new();
    assert_eq!(ping.event_name(), "Ping");
    assert_eq!(ping.schema_version(), "1.0");
    assert_ne!(ping.event_id(), issued.event_id());
    let _ = format!("{ping:?}");
}
