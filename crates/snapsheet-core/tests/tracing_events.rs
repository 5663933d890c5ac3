//! Drag lifecycle logging with the `tracing` feature enabled.

#![cfg(feature = "tracing")]

use std::sync::{Arc, Mutex};

use snapsheet_core::controller::SheetController;
use snapsheet_core::event::InputSource;
use snapsheet_core::geometry::SheetMeasurement;
use snapsheet_core::options::SheetOptions;
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Clone, Default)]
struct MessageCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for MessageCapture
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct V(Option<String>);
        impl tracing::field::Visit for V {
            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.0 = Some(format!("{value:?}"));
                }
            }
        }
        let mut visitor = V(None);
        event.record(&mut visitor);
        if let Some(message) = visitor.0 {
            self.messages.lock().expect("capture lock").push(message);
        }
    }
}

#[test]
fn drag_lifecycle_is_logged() {
    let capture = MessageCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let options = SheetOptions::new(vec![0.3, 0.6, 0.9]).with_open(true);
    let mut sheet = SheetController::new(options, SheetMeasurement::container(1000.0, 1000.0));
    sheet.mount();
    sheet.pointer_down(InputSource::Touch, 700.0);
    sheet.pointer_move(InputSource::Touch, 450.0);
    sheet.pointer_up(InputSource::Touch, 450.0);
    sheet.set_open(false);

    let messages = capture.messages.lock().expect("capture lock").clone();
    for expected in ["sheet mounted", "drag started", "drag released", "sheet closed"] {
        assert!(
            messages.iter().any(|m| m == expected),
            "missing {expected:?} in {messages:?}"
        );
    }
}
