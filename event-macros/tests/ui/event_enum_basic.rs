use event_core::event::Event;
use event_core::eventing::Dispatchable;
use event_macros::{event, event_enum};

#[event]
struct CartOpened {
    cart_id: u32,
}

#[event]
struct CartClosed {
    cart_id: u32,
}

#[event_enum]
enum CartEvent {
    Opened(CartOpened),
    Closed(CartClosed),
}

fn assert_dispatchable<D: Dispatchable>() {}

fn main() {
    assert_dispatchable::<CartEvent>();

    let opened = CartOpened::new(1);
    let id = opened.event_id();
    let ev: CartEvent = opened.into();
    assert_eq!(ev.event_name(), "CartOpened");
    assert_eq!(ev.event_id(), id);

    let closed = CartEvent::from(CartClosed::new(1));
    assert_eq!(closed.event_name(), "CartClosed");
    if let CartEvent::Closed(inner) = &closed {
        assert_eq!(inner.cart_id, 1);
    }
    if let CartEvent::Opened(inner) = &ev {
        assert_eq!(inner.cart_id, 1);
    }
}
