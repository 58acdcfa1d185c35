//! Per-event-name listener lists, owned by the main thread.

use std::collections::HashMap;

use serde_json::Value;

/// Handle returned by [`Listeners::listen`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&Value)>;

#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    by_name: HashMap<String, Vec<(ListenerId, Listener)>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listen<F>(&mut self, name: &str, listener: F) -> ListenerId
    where
        F: FnMut(&Value) + 'static,
    {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.by_name
            .entry(name.to_string())
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        for list in self.by_name.values_mut() {
            if let Some(pos) = list.iter().position(|(lid, _)| *lid == id) {
                drop(list.remove(pos));
                return true;
            }
        }
        false
    }

    /// Call every listener for `name` in registration order. Returns how
    /// many ran.
    pub fn deliver(&mut self, name: &str, payload: &Value) -> usize {
        match self.by_name.get_mut(name) {
            Some(list) => {
                for (_, listener) in list.iter_mut() {
                    listener(payload);
                }
                list.len()
            }
            None => 0,
        }
    }

    pub fn count(&self, name: &str) -> usize {
        self.by_name.get(name).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_zero_listeners() {
        let mut listeners = Listeners::new();
        assert_eq!(listeners.deliver("historyUpdated", &json!([])), 0);
    }

    #[test]
    fn test_listeners_run_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();
        for tag in ["first", "second"] {
            let seen = seen.clone();
            listeners.listen("messageReceived", move |payload| {
                seen.borrow_mut().push((tag, payload.clone()));
            });
        }

        assert_eq!(listeners.deliver("messageReceived", &json!(1)), 2);
        assert_eq!(
            *seen.borrow(),
            vec![("first", json!(1)), ("second", json!(1))]
        );
    }

    #[test]
    fn test_unlisten() {
        let mut listeners = Listeners::new();
        let id = listeners.listen("x", |_| {});
        listeners.listen("x", |_| {});
        assert!(listeners.unlisten(id));
        assert!(!listeners.unlisten(id));
        assert_eq!(listeners.count("x"), 1);
    }
}
