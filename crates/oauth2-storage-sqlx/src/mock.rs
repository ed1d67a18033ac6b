//! Recording adapter for store unit tests.

use async_trait::async_trait;
use std::any::Any;
use std::collections::VecDeque;
use std::sync::Mutex;

use oauth2_core::StoreError;

use crate::adapter::{Adapter, Arg, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallKind {
    Exec,
    SelectOne,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub kind: CallKind,
    pub query: String,
    pub args: Vec<Arg>,
}

type ScriptedRow = Result<Box<dyn Any + Send>, String>;

/// Records every statement; selects answer from a script, falling back to "no rows".
#[derive(Default)]
pub(crate) struct MockAdapter {
    calls: Mutex<Vec<Call>>,
    rows: Mutex<VecDeque<ScriptedRow>>,
    exec_error: Option<String>,
}

impl MockAdapter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every `exec` fails with a driver error carrying `message`.
    pub(crate) fn with_exec_error(mut self, message: &str) -> Self {
        self.exec_error = Some(message.to_string());
        self
    }

    pub(crate) fn push_row<T: Record>(&self, row: T) {
        self.rows.lock().unwrap().push_back(Ok(Box::new(row)));
    }

    pub(crate) fn push_select_error(&self, message: &str) {
        self.rows
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, kind: CallKind, query: &str, args: &[Arg]) {
        self.calls.lock().unwrap().push(Call {
            kind,
            query: query.to_string(),
            args: args.to_vec(),
        });
    }
}

fn driver_error(message: &str) -> StoreError {
    StoreError::Database(sqlx::Error::Protocol(message.to_string()))
}

#[async_trait]
impl Adapter for MockAdapter {
    async fn exec(&self, query: &str, args: &[Arg]) -> Result<u64, StoreError> {
        self.record(CallKind::Exec, query, args);
        match &self.exec_error {
            Some(message) => Err(driver_error(message)),
            None => Ok(1),
        }
    }

    async fn select_one<T: Record>(&self, query: &str, args: &[Arg]) -> Result<T, StoreError> {
        self.record(CallKind::SelectOne, query, args);
        let scripted = self.rows.lock().unwrap().pop_front();
        match scripted {
            None => Err(StoreError::NoRows),
            Some(Err(message)) => Err(driver_error(&message)),
            Some(Ok(row)) => Ok(*row
                .downcast::<T>()
                .unwrap_or_else(|_| panic!("scripted row is not a {}", std::any::type_name::<T>()))),
        }
    }
}
