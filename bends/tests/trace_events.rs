use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

use bends::cli::{run, Cli, Commands, NotifyArgs};

/// Layer that records the debug rendering of every event.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{:?}", event));
    }
}

#[tokio::test]
async fn configuration_errors_are_traced_and_returned() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = Registry::default().with(EventCollector {
        events: events.clone(),
    });
    let _guard = tracing::subscriber::set_default(subscriber);

    let cli = Cli {
        command: Commands::Notify(NotifyArgs {
            dry_run: true,
            ..NotifyArgs::default()
        }),
    };
    let result = run(cli).await;
    assert!(result.is_err(), "no workspace configured");

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
    assert!(
        event_msgs
            .iter()
            .any(|msg| msg.contains("No Bitbucket workspace configured")),
        "Expected the missing workspace to be logged, got: {:?}",
        event_msgs
    );
}
