use netmon_dashboard::monitoring::{NetworkStats, Severity};
use netmon_dashboard::notifications::{
    Capability, ChannelSink, MemorySink, NotificationDispatcher, NotificationSink,
};
use netmon_dashboard::errors::NotifyError;
use netmon_dashboard::notifications::Notification;

fn stats(download: f64, ping: f64) -> NetworkStats {
    NetworkStats {
        download,
        upload: 20.0,
        ping,
        signal_strength: 80,
        connected_devices: 3,
        data_transfer: 12.0,
        network_speed: download,
    }
}

#[test]
fn low_speed_raises_exactly_one_notification() {
    let sink = MemorySink::new();
    let dispatcher = NotificationDispatcher::with_capability(Capability::available(sink.clone()));

    let raised = dispatcher.dispatch(&stats(3.0, 20.0));

    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].rule_id, "speed_low");
    assert_eq!(raised[0].severity, Severity::Warning);
    assert_eq!(sink.count_for("speed_low"), 1);
    assert_eq!(sink.count(), 1);
}

#[test]
fn excellent_speed_never_pairs_with_low_speed() {
    let sink = MemorySink::new();
    let dispatcher = NotificationDispatcher::with_capability(Capability::available(sink.clone()));

    let raised = dispatcher.dispatch(&stats(120.0, 20.0));

    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].rule_id, "speed_excellent");
    assert_eq!(raised[0].severity, Severity::Success);
    assert_eq!(sink.count_for("speed_low"), 0);
}

#[test]
fn independent_rules_fire_together() {
    let dispatcher = NotificationDispatcher::with_capability(Capability::Unavailable);
    let ids: Vec<_> = dispatcher
        .dispatch(&stats(2.0, 180.0))
        .into_iter()
        .map(|n| n.rule_id)
        .collect();
    assert_eq!(ids, vec!["speed_low", "ping_high"]);
}

#[test]
fn nothing_fires_inside_the_normal_band() {
    let dispatcher = NotificationDispatcher::with_capability(Capability::Unavailable);
    assert!(dispatcher.dispatch(&stats(50.0, 100.0)).is_empty());
}

#[test]
fn every_qualifying_update_notifies_again() {
    let sink = MemorySink::new();
    let dispatcher = NotificationDispatcher::with_capability(Capability::available(sink.clone()));
    for _ in 0..3 {
        dispatcher.dispatch(&stats(3.0, 20.0));
    }
    assert_eq!(sink.count_for("speed_low"), 3);
}

#[test]
fn unavailable_capability_still_returns_notifications() {
    let dispatcher = NotificationDispatcher::with_capability(Capability::Unavailable);
    let raised = dispatcher.dispatch(&stats(3.0, 20.0));
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].message, "Download speed is only 3.0 Mbps");
}

struct FailingSink;

impl NotificationSink for FailingSink {
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Rejected {
            id: notification.id,
            reason: "display is busy".to_string(),
        })
    }
}

#[test]
fn sink_failures_do_not_drop_notifications() {
    let dispatcher = NotificationDispatcher::with_capability(Capability::available(FailingSink));
    assert_eq!(dispatcher.dispatch(&stats(150.0, 120.0)).len(), 2);
}

#[tokio::test]
async fn channel_sink_forwards_to_receiver() {
    let (sink, mut rx) = ChannelSink::new();
    let dispatcher = NotificationDispatcher::with_capability(Capability::available(sink));

    let raised = dispatcher.dispatch(&stats(3.0, 20.0));
    let received = rx.recv().await.expect("notification forwarded");
    assert_eq!(received, raised[0]);
}
