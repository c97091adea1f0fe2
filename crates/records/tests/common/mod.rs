#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{watch, Semaphore};

use counsel_client::{HttpError, Method, RecordApi};
use counsel_core::identity::StudentCandidate;
use counsel_core::record::Record;
use counsel_core::types::RecordId;
use counsel_records::AppContext;

/// One request as the backend saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Call {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct MockState {
    tables: HashMap<String, Vec<Record>>,
    next_id: RecordId,
    calls: Vec<Call>,
    failures: HashMap<(Method, String), (u16, String)>,
    students: Vec<StudentCandidate>,
    search_delays: HashMap<String, Duration>,
    analytics: HashMap<String, Value>,
    read_on_arrival: HashSet<String>,
}

/// In-memory stand-in for the records backend.
///
/// Every request is logged before anything else happens, so a test can
/// observe a request that is still held open by [`MockApi::hold`].
pub struct MockApi {
    state: Mutex<MockState>,
    call_count: watch::Sender<usize>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MockState {
                next_id: 100,
                ..Default::default()
            }),
            call_count: watch::Sender::new(0),
            gates: Mutex::new(HashMap::new()),
        })
    }

    /// Context wired to this backend.
    pub fn context(self: &Arc<Self>) -> AppContext {
        AppContext::new(Arc::clone(self) as Arc<dyn RecordApi>)
    }

    // ---- seeding ----

    /// Store a record under `endpoint` as if it had been saved earlier.
    pub fn seed(&self, endpoint: &str, record: Record) {
        self.state
            .lock()
            .unwrap()
            .tables
            .entry(endpoint.to_string())
            .or_default()
            .push(record);
    }

    pub fn set_students(&self, students: Vec<StudentCandidate>) {
        self.state.lock().unwrap().students = students;
    }

    /// Delay the answer to one exact search query.
    pub fn delay_search(&self, query: &str, delay: Duration) {
        self.state
            .lock()
            .unwrap()
            .search_delays
            .insert(query.to_string(), delay);
    }

    pub fn set_analytics(&self, endpoint: &str, body: Value) {
        self.state
            .lock()
            .unwrap()
            .analytics
            .insert(endpoint.to_string(), body);
    }

    /// Answer `method path` with an error status until [`clear_failure`](Self::clear_failure).
    pub fn fail(&self, method: Method, path: &str, status: u16, message: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((method, path.to_string()), (status, message.to_string()));
    }

    pub fn clear_failure(&self, method: Method, path: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .remove(&(method, path.to_string()));
    }

    // ---- gating ----

    /// Hold every request to `path` open until released.
    pub fn hold(&self, path: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(path.to_string(), Arc::new(Semaphore::new(0)));
    }

    /// Like [`hold`](Self::hold), but the response is computed when the
    /// request arrives, so writes made while it is held are not in it.
    pub fn hold_after_read(&self, path: &str) {
        self.state
            .lock()
            .unwrap()
            .read_on_arrival
            .insert(path.to_string());
        self.hold(path);
    }

    /// Let one held request to `path` through.
    pub fn release(&self, path: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(path) {
            gate.add_permits(1);
        }
    }

    /// Stop holding `path` and let every waiting request through.
    pub fn open(&self, path: &str) {
        if let Some(gate) = self.gates.lock().unwrap().remove(path) {
            gate.close();
        }
    }

    // ---- inspection ----

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        *self.call_count.borrow()
    }

    /// Wait until at least `n` requests have arrived.
    pub async fn wait_for_calls(&self, n: usize) {
        let mut rx = self.call_count.subscribe();
        let _ = rx.wait_for(|count| *count >= n).await;
    }

    /// What the backend currently holds under `endpoint`.
    pub fn records(&self, endpoint: &str) -> Vec<Record> {
        self.state
            .lock()
            .unwrap()
            .tables
            .get(endpoint)
            .cloned()
            .unwrap_or_default()
    }

    // ---- dispatch ----

    fn log(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
        self.call_count.send_modify(|n| *n += 1);
    }

    async fn pass_gate(&self, path: &str) {
        let gate = self.gates.lock().unwrap().get(path).cloned();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }

    fn dispatch(&self, method: &Method, path: &str, body: Option<&Value>) -> Result<Value, HttpError> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let mut state = self.state.lock().unwrap();

        match (method.as_str(), segments.as_slice()) {
            ("GET", [endpoint]) => {
                if let Some(body) = state.analytics.get(*endpoint) {
                    return Ok(body.clone());
                }
                let records = state.tables.get(*endpoint).cloned().unwrap_or_default();
                Ok(serde_json::to_value(records)?)
            }
            ("POST", [endpoint]) => {
                let mut record: Record =
                    serde_json::from_value(body.cloned().unwrap_or(Value::Null))?;
                state.next_id += 1;
                record.id = Some(state.next_id);
                state
                    .tables
                    .entry(endpoint.to_string())
                    .or_default()
                    .push(record.clone());
                Ok(serde_json::to_value(record)?)
            }
            ("PUT", [endpoint, id]) => {
                let id: RecordId = id.parse().map_err(|_| not_found())?;
                let mut record: Record =
                    serde_json::from_value(body.cloned().unwrap_or(Value::Null))?;
                record.id = Some(id);
                let slot = state
                    .tables
                    .get_mut(*endpoint)
                    .and_then(|rows| rows.iter_mut().find(|r| r.id == Some(id)))
                    .ok_or_else(not_found)?;
                *slot = record.clone();
                Ok(serde_json::to_value(record)?)
            }
            ("DELETE", [endpoint, id]) => {
                let id: RecordId = id.parse().map_err(|_| not_found())?;
                let rows = state.tables.get_mut(*endpoint).ok_or_else(not_found)?;
                let before = rows.len();
                rows.retain(|r| r.id != Some(id));
                if rows.len() == before {
                    return Err(not_found());
                }
                Ok(Value::Null)
            }
            _ => Err(not_found()),
        }
    }
}

fn not_found() -> HttpError {
    HttpError::Status {
        status: 404,
        message: "Not found.".into(),
    }
}

#[async_trait]
impl RecordApi for MockApi {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, HttpError> {
        self.log(Call {
            method: method.clone(),
            path: path.to_string(),
            query: query.to_vec(),
            body: body.cloned(),
        });
        let read_first = self.state.lock().unwrap().read_on_arrival.contains(path);
        if read_first {
            let response = self.respond(&method, path, query, body).await;
            self.pass_gate(path).await;
            return response;
        }
        self.pass_gate(path).await;
        self.respond(&method, path, query, body).await
    }
}

impl MockApi {
    async fn respond(
        &self,
        method: &Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, HttpError> {
        let failure = self
            .state
            .lock()
            .unwrap()
            .failures
            .get(&(method.clone(), path.to_string()))
            .cloned();
        if let Some((status, message)) = failure {
            return Err(HttpError::Status { status, message });
        }

        if path == counsel_client::api::SEARCH_STUDENT_PATH {
            let needle = query
                .iter()
                .find(|(k, _)| k == "query")
                .map(|(_, v)| v.clone())
                .unwrap_or_default();
            let delay = self.state.lock().unwrap().search_delays.get(&needle).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let hits: Vec<StudentCandidate> = self
                .state
                .lock()
                .unwrap()
                .students
                .iter()
                .filter(|s| s.sr_code.contains(needle.as_str()))
                .cloned()
                .collect();
            return Ok(json!(hits));
        }

        self.dispatch(method, path, body)
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn student(sr_code: &str, first: &str, last: &str, year: &str, section: &str) -> StudentCandidate {
    StudentCandidate {
        sr_code: sr_code.into(),
        firstname: first.into(),
        lastname: last.into(),
        year: year.into(),
        section: section.into(),
    }
}

/// Jane Doe (`SR-001`), John Roe (`SR-002`) and Ana Cruz (`SR-010`).
pub fn roster() -> Vec<StudentCandidate> {
    vec![
        student("SR-001", "Jane", "Doe", "Grade7", "A"),
        student("SR-002", "John", "Roe", "Grade 8", "B"),
        student("SR-010", "Ana", "Cruz", "Grade 7", "C"),
    ]
}

/// A saved grade-level record.
pub fn grade_record(id: RecordId, sr_code: &str, name: &str) -> Record {
    Record::from_pairs([
        ("sr_code", sr_code),
        ("name", name),
        ("grade", "Grade 7"),
        ("section", "A"),
        ("status", "Open"),
    ])
    .with_id(id)
}
