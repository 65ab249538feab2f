use std::{cell::RefCell, collections::HashMap, collections::VecDeque, rc::Rc};

use esi_remote_client::{Transport, TransportError};
use serde_json::Value;

#[derive(Default)]
struct ResponseQueue {
    queued: VecDeque<Value>,
    last_served: Option<Value>,
}

impl ResponseQueue {
    /// Serves the next queued response; once the queue runs dry, the
    /// last served response repeats.
    fn serve(&mut self) -> Option<Value> {
        if let Some(next) = self.queued.pop_front() {
            self.last_served = Some(next.clone());
            return Some(next);
        }
        self.last_served.clone()
    }
}

#[derive(Default)]
struct MockTransportState {
    get_responses: HashMap<String, ResponseQueue>,
    put_answers: HashMap<String, ResponseQueue>,
    puts: Vec<(String, Value)>,
    gets: Vec<String>,
}

/// Scripted stand-in for the HTTP transport.
///
/// A cloned handle shares the script and the recorded traffic, so a
/// test keeps one handle while the session owns the other.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Rc<RefCell<MockTransportState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the next GET response for `path`.
    pub fn queue_get(&self, path: &str, body: Value) {
        self.state
            .borrow_mut()
            .get_responses
            .entry(path.to_string())
            .or_default()
            .queued
            .push_back(body);
    }

    /// Scripts the next PUT answer for `path`.
    pub fn queue_put_answer(&self, path: &str, answer: Value) {
        self.state
            .borrow_mut()
            .put_answers
            .entry(path.to_string())
            .or_default()
            .queued
            .push_back(answer);
    }

    /// Every PUT the session sent, in order.
    pub fn puts(&self) -> Vec<(String, Value)> {
        self.state.borrow().puts.clone()
    }

    /// Every GET path the session requested, in order.
    pub fn gets(&self) -> Vec<String> {
        self.state.borrow().gets.clone()
    }
}

impl Transport for MockTransport {
    fn get(&mut self, path: &str) -> Result<Value, TransportError> {
        let mut state = self.state.borrow_mut();
        state.gets.push(path.to_string());
        match state.get_responses.get_mut(path).and_then(ResponseQueue::serve) {
            Some(body) => Ok(body),
            None => panic!("no GET response scripted for '{path}'"),
        }
    }

    fn put(&mut self, path: &str, body: &Value) -> Result<Value, TransportError> {
        let mut state = self.state.borrow_mut();
        state.puts.push((path.to_string(), body.clone()));
        match state.put_answers.get_mut(path).and_then(ResponseQueue::serve) {
            Some(answer) => Ok(answer),
            None => panic!("no PUT answer scripted for '{path}'"),
        }
    }
}
