//! Test support: a scriptable replay client and small fixture helpers.
//!
//! `ScriptedClient` stands in for the backend transport: tests preload the
//! replies it should serve, optionally gate a reply so it arrives "late",
//! and afterwards inspect the calls the coordinator made.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use serde_json::Value;
use tokio::sync::Semaphore;

use crate::{
    Command, Error, ExecutionPoint, Frame, FrameId, FramePositions, ReplayClient, Result,
    ScopeReply, ScopeStatus, SourceLocation, ThreadId,
};

/// One backend call observed by the scripted client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCall {
    Frames(ThreadId),
    Scopes(ThreadId, FrameId),
    FramePositions(ThreadId),
    Execute(ThreadId, Command, Option<ExecutionPoint>),
    Interrupt(ThreadId),
    Evaluate(ThreadId, String),
    SetLogExceptions(bool),
}

#[derive(Default)]
struct Script {
    frames: Vec<Frame>,
    scopes: HashMap<FrameId, ScopeReply>,
    positions: FramePositions,
    evaluation: Option<Value>,
    calls: Vec<ClientCall>,
}

/// Replay-client stub serving preloaded replies.
pub struct ScriptedClient {
    script: Mutex<Script>,
    frames_gated: AtomicBool,
    frames_gate: Semaphore,
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            script: Mutex::default(),
            frames_gated: AtomicBool::new(false),
            frames_gate: Semaphore::new(0),
        }
    }

    pub fn set_frames(&self, frames: Vec<Frame>) {
        self.script.lock().unwrap().frames = frames;
    }

    pub fn set_scope(&self, frame: Frame, value: Value) {
        self.script.lock().unwrap().scopes.insert(
            frame.id.clone(),
            ScopeReply {
                frame,
                status: ScopeStatus::Done,
                value: Some(value),
            },
        );
    }

    pub fn set_positions(&self, positions: FramePositions) {
        self.script.lock().unwrap().positions = positions;
    }

    pub fn set_evaluation(&self, value: Value) {
        self.script.lock().unwrap().evaluation = Some(value);
    }

    /// Make the next `frames` call block until [`release_frames`] is called,
    /// simulating a reply that lands after the world has moved on.
    ///
    /// [`release_frames`]: ScriptedClient::release_frames
    pub fn gate_frames(&self) {
        self.frames_gated.store(true, Ordering::Release);
    }

    pub fn release_frames(&self) {
        self.frames_gate.add_permits(1);
    }

    /// All backend calls made so far, in order.
    pub fn calls(&self) -> Vec<ClientCall> {
        self.script.lock().unwrap().calls.clone()
    }

    fn record(&self, call: ClientCall) {
        self.script.lock().unwrap().calls.push(call);
    }
}

impl ReplayClient for ScriptedClient {
    async fn frames(&self, thread: &ThreadId) -> Result<Vec<Frame>> {
        self.record(ClientCall::Frames(thread.clone()));
        if self.frames_gated.load(Ordering::Acquire) {
            self.frames_gate
                .acquire()
                .await
                .expect("gate closed")
                .forget();
        }
        Ok(self.script.lock().unwrap().frames.clone())
    }

    async fn scopes(&self, thread: &ThreadId, frame: &FrameId) -> Result<ScopeReply> {
        self.record(ClientCall::Scopes(thread.clone(), frame.clone()));
        self.script
            .lock()
            .unwrap()
            .scopes
            .get(frame)
            .cloned()
            .ok_or_else(|| Error::client(format!("no scope scripted for frame {frame}")))
    }

    async fn frame_positions(&self, thread: &ThreadId) -> Result<FramePositions> {
        self.record(ClientCall::FramePositions(thread.clone()));
        Ok(self.script.lock().unwrap().positions.clone())
    }

    async fn execute(
        &self,
        thread: &ThreadId,
        command: Command,
        target: Option<ExecutionPoint>,
    ) -> Result<()> {
        self.record(ClientCall::Execute(thread.clone(), command, target));
        Ok(())
    }

    async fn interrupt(&self, thread: &ThreadId) -> Result<()> {
        self.record(ClientCall::Interrupt(thread.clone()));
        Ok(())
    }

    async fn evaluate(
        &self,
        thread: &ThreadId,
        _frame: Option<&FrameId>,
        expression: &str,
    ) -> Result<Value> {
        self.record(ClientCall::Evaluate(thread.clone(), expression.to_string()));
        Ok(self
            .script
            .lock()
            .unwrap()
            .evaluation
            .clone()
            .unwrap_or(Value::Null))
    }

    async fn set_log_exceptions(&self, enabled: bool) -> Result<()> {
        self.record(ClientCall::SetLogExceptions(enabled));
        Ok(())
    }
}

/// A frame at line `line` of source `s1`.
pub fn frame(id: &str, line: u32) -> Frame {
    Frame::new(id, SourceLocation::new("s1", line, 0))
}

/// An execution point from a digit string. Panics on invalid input.
pub fn point(s: &str) -> ExecutionPoint {
    ExecutionPoint::new(s).expect("valid execution point")
}
