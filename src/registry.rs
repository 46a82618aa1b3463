//! Correlation registry mapping outstanding request ids to handlers.
//!
//! The registry is owned by the connection actor and is never shared, so it
//! needs no interior locking. One-shot entries are removed right after their
//! first delivery; standing subscriptions stay until a local unsubscribe or a
//! connection loss.
use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::{
    correlation::RequestId,
    envelope::Inbound,
    metrics,
    response::{Response, ResponseKind},
};

/// Callback receiving every [`Response`] for one request id.
pub type ResponseHandler = Box<dyn FnMut(Response) + Send + 'static>;

/// Result of routing an addressed frame through the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A one-shot handler ran and its entry was removed.
    Delivered,
    /// A standing subscription handler ran and its entry was kept.
    Retained,
    /// No handler is registered for the id; the frame was dropped.
    Miss,
}

/// Handlers keyed by [`RequestId`], plus the set of standing ids.
#[derive(Default)]
pub struct Registry {
    handlers: HashMap<RequestId, ResponseHandler>,
    standing: HashSet<RequestId>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("handlers", &self.handlers.len())
            .field("standing", &self.standing)
            .finish()
    }
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Store `handler` for `id`, marking it standing when `subscribe` is set.
    ///
    /// Registering an id twice replaces the earlier handler; ids come from a
    /// monotonic counter so this only happens when a caller reuses one by hand.
    pub fn register(&mut self, id: RequestId, handler: ResponseHandler, subscribe: bool) {
        if subscribe {
            self.standing.insert(id.clone());
        } else {
            self.standing.remove(&id);
        }
        self.handlers.insert(id, handler);
    }

    /// Deliver `inbound` to the handler registered for its id.
    ///
    /// # Examples
    ///
    /// ```
    /// use muxframe::{
    ///     envelope::{Envelope, decode},
    ///     registry::{DispatchOutcome, Registry},
    /// };
    ///
    /// let mut registry = Registry::new();
    /// registry.register("0".into(), Box::new(|_| {}), false);
    /// let Envelope::Addressed(inbound) = decode(r#"{"id":"0","code":200}"#)? else {
    ///     unreachable!()
    /// };
    /// assert_eq!(registry.dispatch(inbound.clone()), DispatchOutcome::Delivered);
    /// assert_eq!(registry.dispatch(inbound), DispatchOutcome::Miss);
    /// # Ok::<(), muxframe::envelope::FrameError>(())
    /// ```
    pub fn dispatch(&mut self, inbound: Inbound) -> DispatchOutcome {
        if self.standing.contains(&inbound.id) {
            let Some(handler) = self.handlers.get_mut(&inbound.id) else {
                self.standing.remove(&inbound.id);
                return Self::miss(&inbound);
            };
            handler(inbound.into_response(ResponseKind::Event));
            return DispatchOutcome::Retained;
        }

        match self.handlers.remove(&inbound.id) {
            Some(mut handler) => {
                handler(inbound.into_response(ResponseKind::Reply));
                DispatchOutcome::Delivered
            }
            None => Self::miss(&inbound),
        }
    }

    fn miss(inbound: &Inbound) -> DispatchOutcome {
        warn!(id = %inbound.id, code = ?inbound.code(), "dispatch miss: no handler for id");
        metrics::inc_dispatch_misses();
        DispatchOutcome::Miss
    }

    /// Drop the handler and standing marker for `id`.
    ///
    /// Returns `true` when an entry existed.
    pub fn unsubscribe(&mut self, id: &RequestId) -> bool {
        self.standing.remove(id);
        let removed = self.handlers.remove(id).is_some();
        debug!(%id, removed, "local unsubscribe");
        removed
    }

    /// Deliver the synthetic connection-loss response to every handler once,
    /// then clear the registry.
    ///
    /// Returns the number of handlers notified.
    pub fn fail_all(&mut self) -> usize {
        self.standing.clear();
        let count = self.handlers.len();
        for (id, mut handler) in self.handlers.drain() {
            handler(Response::connection_lost(id));
        }
        if count > 0 {
            debug!(count, "failed outstanding handlers");
        }
        count
    }

    /// Whether `id` is a standing subscription.
    #[must_use]
    pub fn is_standing(&self, id: &RequestId) -> bool { self.standing.contains(id) }

    /// Whether a handler is registered for `id`.
    #[must_use]
    pub fn contains(&self, id: &RequestId) -> bool { self.handlers.contains_key(id) }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize { self.handlers.len() }

    /// Whether no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.handlers.is_empty() }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rstest::{fixture, rstest};
    use serde_json::{Map, Value, json};
    use tracing_test::traced_test;

    use super::*;
    use crate::response::CONNECTION_LOST;

    type Seen = Arc<Mutex<Vec<Response>>>;

    #[fixture]
    fn seen() -> Seen { Arc::new(Mutex::new(Vec::new())) }

    fn recorder(seen: &Seen) -> ResponseHandler {
        let seen = Arc::clone(seen);
        Box::new(move |response| seen.lock().expect("lock").push(response))
    }

    fn inbound(id: &str, body: &str) -> Inbound {
        let Value::Object(header) = json!({"id": id, "code": 200}) else {
            unreachable!()
        };
        Inbound {
            id: RequestId::from(id),
            header,
            body: body.to_owned(),
        }
    }

    #[rstest]
    fn one_shot_handlers_run_once(seen: Seen) {
        let mut registry = Registry::new();
        registry.register(RequestId::from(0), recorder(&seen), false);

        assert_eq!(registry.dispatch(inbound("0", "first")), DispatchOutcome::Delivered);
        assert_eq!(registry.dispatch(inbound("0", "second")), DispatchOutcome::Miss);

        let seen = seen.lock().expect("lock");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].body(), "first");
        assert_eq!(seen[0].kind(), ResponseKind::Reply);
        assert!(registry.is_empty());
    }

    #[rstest]
    fn subscriptions_receive_every_event_until_unsubscribed(seen: Seen) {
        let mut registry = Registry::new();
        let id = RequestId::from(1);
        registry.register(id.clone(), recorder(&seen), true);

        for body in ["a", "b", "c"] {
            assert_eq!(registry.dispatch(inbound("1", body)), DispatchOutcome::Retained);
        }
        assert!(registry.unsubscribe(&id));
        assert_eq!(registry.dispatch(inbound("1", "d")), DispatchOutcome::Miss);
        assert!(!registry.is_standing(&id));

        let bodies: Vec<_> = seen
            .lock()
            .expect("lock")
            .iter()
            .map(|r| (r.body().to_owned(), r.kind()))
            .collect();
        assert_eq!(
            bodies,
            [
                ("a".to_owned(), ResponseKind::Event),
                ("b".to_owned(), ResponseKind::Event),
                ("c".to_owned(), ResponseKind::Event),
            ]
        );
    }

    #[rstest]
    fn fail_all_notifies_each_handler_exactly_once(seen: Seen) {
        let mut registry = Registry::new();
        registry.register(RequestId::from(0), recorder(&seen), false);
        registry.register(RequestId::from(1), recorder(&seen), true);
        registry.register(RequestId::from(2), recorder(&seen), false);

        assert_eq!(registry.fail_all(), 3);
        assert_eq!(registry.fail_all(), 0);
        assert!(registry.is_empty());
        assert!(!registry.is_standing(&RequestId::from(1)));

        let seen = seen.lock().expect("lock");
        let mut ids: Vec<_> = seen.iter().map(|r| r.id().as_str().to_owned()).collect();
        ids.sort();
        assert_eq!(ids, ["0", "1", "2"]);
        assert!(seen.iter().all(|r| r.code() == Some(CONNECTION_LOST) && r.body().is_empty()));
        assert!(seen.iter().all(Response::is_connection_lost));
    }

    #[test]
    fn unsubscribe_of_unknown_id_reports_nothing_removed() {
        let mut registry = Registry::new();
        assert!(!registry.unsubscribe(&RequestId::from(42)));
    }

    #[rstest]
    fn re_registering_as_one_shot_clears_standing_marker(seen: Seen) {
        let mut registry = Registry::new();
        let id = RequestId::from(5);
        registry.register(id.clone(), recorder(&seen), true);
        registry.register(id.clone(), recorder(&seen), false);
        assert!(!registry.is_standing(&id));
        assert_eq!(registry.dispatch(inbound("5", "x")), DispatchOutcome::Delivered);
    }

    #[test]
    #[traced_test]
    fn misses_are_logged() {
        let mut registry = Registry::new();
        let outcome = registry.dispatch(Inbound {
            id: RequestId::from(9),
            header: Map::new(),
            body: String::new(),
        });
        assert_eq!(outcome, DispatchOutcome::Miss);
        assert!(logs_contain("dispatch miss"));
    }
}
