use serde_json::json;
use simpletodo_core::db::open_db_in_memory;
use simpletodo_core::{
    BucketListener, ChangeType, ObjectBucket, RemoteChange, SqliteBucket, Todo, TodoKey,
};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq)]
enum Event {
    Saved(TodoKey),
    Deleted(TodoKey),
    BeforeNetworkUpdate(TodoKey),
    NetworkChange(ChangeType, TodoKey),
}

/// Forwards every callback into a channel so tests can assert delivery and
/// ordering regardless of which thread the bucket fires from.
struct RecordingListener {
    events: Mutex<Sender<Event>>,
}

impl RecordingListener {
    fn subscribed(bucket: &SqliteBucket) -> Receiver<Event> {
        let (sender, receiver) = channel();
        bucket.add_listener(Arc::new(Self {
            events: Mutex::new(sender),
        }));
        receiver
    }

    fn send(&self, event: Event) {
        let _ = self.events.lock().unwrap().send(event);
    }
}

impl BucketListener for RecordingListener {
    fn on_save_object(&self, todo: &Todo) {
        self.send(Event::Saved(todo.key));
    }

    fn on_delete_object(&self, todo: &Todo) {
        self.send(Event::Deleted(todo.key));
    }

    fn on_before_network_update(&self, key: &TodoKey) {
        self.send(Event::BeforeNetworkUpdate(*key));
    }

    fn on_network_change(&self, change: ChangeType, key: &TodoKey) {
        self.send(Event::NetworkChange(change, *key));
    }
}

fn bucket() -> SqliteBucket {
    SqliteBucket::new(open_db_in_memory().unwrap())
}

fn recv(receiver: &Receiver<Event>) -> Event {
    receiver
        .recv_timeout(Duration::from_secs(5))
        .expect("expected a bucket event")
}

#[test]
fn save_and_delete_notify_registered_listeners() {
    let bucket = bucket();
    let events = RecordingListener::subscribed(&bucket);

    let todo = bucket.new_object();
    bucket.save(&todo).unwrap();
    assert_eq!(recv(&events), Event::Saved(todo.key));

    bucket.delete(&todo).unwrap();
    assert_eq!(recv(&events), Event::Deleted(todo.key));
}

#[test]
fn deleting_an_absent_record_does_not_notify() {
    let bucket = bucket();
    let events = RecordingListener::subscribed(&bucket);

    let never_saved = bucket.new_object();
    bucket.delete(&never_saved).unwrap();

    assert!(events.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn removed_listeners_stop_receiving_events() {
    let bucket = bucket();
    let (sender, receiver) = channel();
    let id = bucket.add_listener(Arc::new(RecordingListener {
        events: Mutex::new(sender),
    }));

    let todo = bucket.new_object();
    bucket.save(&todo).unwrap();
    assert_eq!(recv(&receiver), Event::Saved(todo.key));

    bucket.remove_listener(id);
    bucket.save(&todo).unwrap();
    assert!(receiver.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn remote_changes_fire_before_and_after_callbacks_in_order() {
    let bucket = bucket();
    let events = RecordingListener::subscribed(&bucket);

    let key = Uuid::new_v4();
    bucket
        .apply_remote_change(&RemoteChange {
            kind: ChangeType::Insert,
            key,
            properties: Some(json!({ "title": "from network" }).as_object().unwrap().clone()),
        })
        .unwrap();

    assert_eq!(recv(&events), Event::BeforeNetworkUpdate(key));
    assert_eq!(recv(&events), Event::NetworkChange(ChangeType::Insert, key));

    bucket
        .apply_remote_change(&RemoteChange {
            kind: ChangeType::Remove,
            key,
            properties: None,
        })
        .unwrap();

    assert_eq!(recv(&events), Event::BeforeNetworkUpdate(key));
    assert_eq!(recv(&events), Event::NetworkChange(ChangeType::Remove, key));
}

#[test]
fn remote_changes_do_not_fire_local_save_callbacks() {
    let bucket = bucket();
    let events = RecordingListener::subscribed(&bucket);

    bucket
        .apply_remote_change(&RemoteChange {
            kind: ChangeType::Modify,
            key: Uuid::new_v4(),
            properties: Some(json!({ "done": true }).as_object().unwrap().clone()),
        })
        .unwrap();

    assert!(matches!(recv(&events), Event::BeforeNetworkUpdate(_)));
    assert!(matches!(recv(&events), Event::NetworkChange(_, _)));
    assert!(events.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn background_work_runs_off_the_caller_thread() {
    let bucket = bucket();
    let (sender, receiver) = channel();

    let caller = std::thread::current().id();
    bucket.execute_async(Box::new(move || {
        let _ = sender.send(std::thread::current().id());
    }));

    let worker = receiver
        .recv_timeout(Duration::from_secs(5))
        .expect("async task should run");
    assert_ne!(worker, caller);
}
