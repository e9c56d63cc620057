//! In-process backend used by tests and offline smoke runs.
//!
//! Holds the curriculum hierarchy and accounts in memory, optionally sleeping
//! a fixed latency per call and failing every call while marked offline.
//! Clones share state, so a test can keep a handle to flip the outage switch
//! after handing the remote to a repository.

use super::{
    AuthRemote, AuthResponse, ContentRemote, LoginRequest, RegisterRequest, RemoteError,
    RemoteResult,
};
use crate::model::curriculum::{
    ClassLevel, Content, HierarchyLevel, HierarchyNode, Subject, Subtopic, Topic,
};
use crate::model::user::User;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug)]
struct Account {
    user: User,
    password: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    classes: Vec<ClassLevel>,
    subjects: Vec<Subject>,
    topics: Vec<Topic>,
    subtopics: Vec<Subtopic>,
    contents: Vec<Content>,
    accounts: BTreeMap<String, Account>,
    tokens: BTreeMap<String, String>,
    offline: bool,
    fetch_calls: usize,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRemote {
    state: Arc<Mutex<MemoryState>>,
    latency: Duration,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps `latency` before answering every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// While offline every call fails with `RemoteError::Network`.
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Number of hierarchy fetches served (successful or not).
    pub fn fetch_calls(&self) -> usize {
        self.state().fetch_calls
    }

    /// Inserts or replaces a node without going through the write API.
    pub fn seed(&self, node: HierarchyNode) {
        let mut state = self.state();
        upsert(&mut state, node);
    }

    /// Registers an account directly, bypassing validation.
    pub fn seed_account(&self, user: User, password: impl Into<String>) {
        self.state().accounts.insert(
            user.email.to_lowercase(),
            Account {
                user,
                password: password.into(),
            },
        );
    }

    /// Whether `token` belongs to a live session.
    pub fn is_token_active(&self, token: &str) -> bool {
        self.state().tokens.contains_key(token)
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, counts_as_fetch: bool) -> RemoteResult<MutexGuard<'_, MemoryState>> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        let mut state = self.state();
        if counts_as_fetch {
            state.fetch_calls += 1;
        }
        if state.offline {
            return Err(RemoteError::Network("backend unreachable".to_string()));
        }
        Ok(state)
    }

    fn issue_token(state: &mut MemoryState, user_id: &str) -> String {
        let token = format!("tok-{}", Uuid::new_v4().simple());
        state.tokens.insert(token.clone(), user_id.to_string());
        token
    }
}

fn sorted_children<T: Clone>(
    items: &[T],
    matches: impl Fn(&T) -> bool,
    order: impl Fn(&T) -> (i64, String),
) -> Vec<T> {
    let mut children: Vec<T> = items.iter().filter(|item| matches(item)).cloned().collect();
    children.sort_by_key(|item| order(item));
    children
}

fn upsert(state: &mut MemoryState, node: HierarchyNode) {
    macro_rules! replace {
        ($list:expr, $value:expr) => {{
            let value = $value;
            match $list.iter_mut().find(|item| item.id == value.id) {
                Some(slot) => *slot = value,
                None => $list.push(value),
            }
        }};
    }

    match node {
        HierarchyNode::Class(value) => replace!(state.classes, value),
        HierarchyNode::Subject(value) => replace!(state.subjects, value),
        HierarchyNode::Topic(value) => replace!(state.topics, value),
        HierarchyNode::Subtopic(value) => replace!(state.subtopics, value),
        HierarchyNode::Content(value) => replace!(state.contents, value),
    }
}

fn contains(state: &MemoryState, level: HierarchyLevel, id: &str) -> bool {
    match level {
        HierarchyLevel::Class => state.classes.iter().any(|item| item.id == id),
        HierarchyLevel::Subject => state.subjects.iter().any(|item| item.id == id),
        HierarchyLevel::Topic => state.topics.iter().any(|item| item.id == id),
        HierarchyLevel::Subtopic => state.subtopics.iter().any(|item| item.id == id),
        HierarchyLevel::Content => state.contents.iter().any(|item| item.id == id),
    }
}

fn status(status: u16, message: impl Into<String>) -> RemoteError {
    RemoteError::Status {
        status,
        message: message.into(),
    }
}

impl ContentRemote for InMemoryRemote {
    fn fetch_classes(&self) -> RemoteResult<Vec<ClassLevel>> {
        let state = self.enter(true)?;
        Ok(sorted_children(
            &state.classes,
            |_| true,
            |item| (item.order, item.id.clone()),
        ))
    }

    fn fetch_subjects(&self, class_id: &str) -> RemoteResult<Vec<Subject>> {
        let state = self.enter(true)?;
        Ok(sorted_children(
            &state.subjects,
            |item| item.class_id == class_id,
            |item| (0, item.name.clone()),
        ))
    }

    fn fetch_topics(&self, subject_id: &str) -> RemoteResult<Vec<Topic>> {
        let state = self.enter(true)?;
        Ok(sorted_children(
            &state.topics,
            |item| item.subject_id == subject_id,
            |item| (item.order, item.id.clone()),
        ))
    }

    fn fetch_subtopics(&self, topic_id: &str) -> RemoteResult<Vec<Subtopic>> {
        let state = self.enter(true)?;
        Ok(sorted_children(
            &state.subtopics,
            |item| item.topic_id == topic_id,
            |item| (item.order, item.id.clone()),
        ))
    }

    fn fetch_contents(&self, subtopic_id: &str) -> RemoteResult<Vec<Content>> {
        let state = self.enter(true)?;
        Ok(sorted_children(
            &state.contents,
            |item| item.subtopic_id == subtopic_id,
            |item| (item.order, item.id.clone()),
        ))
    }

    fn create_node(&self, node: &HierarchyNode) -> RemoteResult<HierarchyNode> {
        let mut state = self.enter(false)?;
        if contains(&state, node.level(), node.id()) {
            return Err(status(409, format!("{} already exists", node.id())));
        }
        upsert(&mut state, node.clone());
        Ok(node.clone())
    }

    fn update_node(&self, node: &HierarchyNode) -> RemoteResult<HierarchyNode> {
        let mut state = self.enter(false)?;
        if !contains(&state, node.level(), node.id()) {
            return Err(status(404, format!("{} not found", node.id())));
        }
        upsert(&mut state, node.clone());
        Ok(node.clone())
    }

    fn delete_node(&self, level: HierarchyLevel, id: &str) -> RemoteResult<()> {
        let mut state = self.enter(false)?;
        if !contains(&state, level, id) {
            return Err(status(404, format!("{id} not found")));
        }
        match level {
            HierarchyLevel::Class => state.classes.retain(|item| item.id != id),
            HierarchyLevel::Subject => state.subjects.retain(|item| item.id != id),
            HierarchyLevel::Topic => state.topics.retain(|item| item.id != id),
            HierarchyLevel::Subtopic => state.subtopics.retain(|item| item.id != id),
            HierarchyLevel::Content => state.contents.retain(|item| item.id != id),
        }
        Ok(())
    }
}

impl AuthRemote for InMemoryRemote {
    fn login(&self, request: &LoginRequest) -> RemoteResult<AuthResponse> {
        let mut state = self.enter(false)?;
        let user = state
            .accounts
            .get(&request.email.trim().to_lowercase())
            .filter(|account| account.password == request.password)
            .map(|account| account.user.clone())
            .ok_or_else(|| status(401, "Invalid email or password"))?;
        let token = Self::issue_token(&mut state, &user.id);
        Ok(AuthResponse { user, token })
    }

    fn register(&self, request: &RegisterRequest) -> RemoteResult<AuthResponse> {
        let mut state = self.enter(false)?;
        let key = request.email.trim().to_lowercase();
        if state.accounts.contains_key(&key) {
            return Err(status(409, "Email is already registered"));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            role: request.role,
            school: request.school.clone(),
            class_id: request.class_id.clone(),
        };
        state.accounts.insert(
            key,
            Account {
                user: user.clone(),
                password: request.password.clone(),
            },
        );
        let token = Self::issue_token(&mut state, &user.id);
        Ok(AuthResponse { user, token })
    }

    fn logout(&self, token: &str) -> RemoteResult<()> {
        let mut state = self.enter(false)?;
        state.tokens.remove(token);
        Ok(())
    }
}
