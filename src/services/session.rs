//! Remote install session.
//!
//! One session walks `Authenticating -> VerifyingIdentity ->
//! Resolving -> Transmitting -> Closed` and never goes back. Search directives
//! are resolved by wrapping the server-side search in a random token and
//! picking the answer out from between the two copies of that token.

use crate::domain::constants::{IDENTITY_COMMAND, QUIET_PREAMBLE, TOKEN_LENGTH};
use crate::domain::errors::MushError;
use crate::domain::models::{
    CompiledDocument, HostConfig, InstallReport, ResolvedSearch, SearchDirective,
    SubstitutionTable,
};
use crate::services::channel::{Channel, TcpChannel};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashSet;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Authenticating,
    VerifyingIdentity,
    Resolving,
    Transmitting,
    Closed,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionTiming {
    /// Quiet period that ends a drain.
    pub settle: Duration,
    /// Upper bound on any single wait for server output.
    pub reply_timeout: Duration,
}

impl SessionTiming {
    pub fn from_host(host: &HostConfig) -> Self {
        Self {
            settle: Duration::from_millis(host.settle_ms),
            reply_timeout: Duration::from_millis(host.reply_timeout_ms),
        }
    }
}

pub struct Session<C: Channel> {
    channel: C,
    state: SessionState,
    timing: SessionTiming,
    identity_marker: String,
    used_tokens: HashSet<String>,
}

impl<C: Channel> Session<C> {
    /// Wraps an already connected channel.
    pub fn new(channel: C, timing: SessionTiming, identity_marker: &str) -> Self {
        Self {
            channel,
            state: SessionState::Authenticating,
            timing,
            identity_marker: identity_marker.to_string(),
            used_tokens: HashSet::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn authenticate(&mut self, username: &str, password: &str) -> anyhow::Result<()> {
        self.expect_state(SessionState::Authenticating, "authenticate")?;
        self.discard()?;
        self.channel
            .send_line(&format!("connect {} {}", username, password))?;
        self.discard()?;
        self.channel.send_line(QUIET_PREAMBLE)?;
        self.discard()?;
        tracing::info!(user = %username, "authenticated");
        self.state = SessionState::VerifyingIdentity;
        Ok(())
    }

    pub fn verify_identity(&mut self) -> anyhow::Result<()> {
        self.expect_state(SessionState::VerifyingIdentity, "verify identity")?;
        self.channel.send_line(IDENTITY_COMMAND)?;
        let reply = self.wait_for_reply(self.deadline())?;
        if !reply.contains(&self.identity_marker) {
            return Err(MushError::UnsupportedHost(self.identity_marker.clone()).into());
        }
        tracing::info!(marker = %self.identity_marker, "server identity confirmed");
        self.state = SessionState::Resolving;
        Ok(())
    }

    /// Resolves every search whose key is not already bound, binding the
    /// answer into `table` and substituting it throughout `text`.
    pub fn resolve_searches(
        &mut self,
        searches: &[SearchDirective],
        table: &mut SubstitutionTable,
        text: &mut String,
    ) -> anyhow::Result<Vec<ResolvedSearch>> {
        self.expect_state(SessionState::Resolving, "resolve searches")?;
        let mut resolved = Vec::new();
        for search in searches {
            if table.contains(&search.key) {
                tracing::debug!(key = %search.key, "search already satisfied by a define");
                continue;
            }
            let answer = self.resolve(search)?;
            tracing::info!(key = %search.key, query = %search.query, answer = %answer, "search resolved");
            *text = text.replace(&search.key, &answer);
            table.set(search.key.clone(), answer.clone());
            resolved.push(ResolvedSearch {
                key: search.key.clone(),
                query: search.query.clone(),
                answer,
            });
        }
        Ok(resolved)
    }

    /// Sends `text` one physical line at a time. Nothing is acknowledged, so
    /// a failure part way leaves the server partially updated.
    pub fn transmit(&mut self, text: &str) -> anyhow::Result<usize> {
        self.expect_state(SessionState::Resolving, "transmit")?;
        self.state = SessionState::Transmitting;
        self.discard()?;
        tracing::info!("installing...");
        let mut sent = 0usize;
        for (n, line) in text.lines().enumerate() {
            tracing::info!("    line #{}", n + 1);
            self.channel.send_line(line)?;
            self.discard()?;
            sent += 1;
        }
        tracing::info!(lines = sent, "installation complete");
        Ok(sent)
    }

    pub fn close(&mut self) -> anyhow::Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        self.state = SessionState::Closed;
        self.channel.close()
    }

    fn resolve(&mut self, search: &SearchDirective) -> anyhow::Result<String> {
        let token = self.fresh_token();
        let probe = format!(
            "think {} [searchng(%# objects={})] {}",
            token, search.query, token
        );
        self.channel.send_line(&probe)?;
        let deadline = self.deadline();
        let mut reply = String::new();
        // The echoed probe may arrive on its own before the answer.
        loop {
            let chunk = self.wait_for_reply(deadline)?;
            if chunk.is_empty() {
                break;
            }
            reply.push_str(&chunk);
            if reply.replace(&probe, "").contains(&token) || Instant::now() >= deadline {
                break;
            }
        }
        if reply.trim().is_empty() {
            return Err(MushError::NoReply(search.query.clone()).into());
        }
        let reply = reply.replace(&probe, "");
        match extract_answer(&reply, &token) {
            None => Err(MushError::AnswerMissing(search.query.clone()).into()),
            Some(answer) if answer.is_empty() => Err(MushError::SearchFailed {
                key: search.key.clone(),
                query: search.query.clone(),
            }
            .into()),
            Some(answer) => Ok(answer),
        }
    }

    fn expect_state(&self, expected: SessionState, action: &str) -> anyhow::Result<()> {
        if self.state == SessionState::Closed {
            return Err(MushError::SessionClosed.into());
        }
        if self.state != expected {
            anyhow::bail!("cannot {} while session is {:?}", action, self.state);
        }
        Ok(())
    }

    fn discard(&mut self) -> anyhow::Result<()> {
        let noise = self
            .channel
            .drain(self.timing.settle, self.timing.reply_timeout)?;
        if !noise.is_empty() {
            tracing::trace!(bytes = noise.len(), "discarded server output");
        }
        Ok(())
    }

    fn deadline(&self) -> Instant {
        Instant::now() + self.timing.reply_timeout
    }

    /// Drains repeatedly until some non-blank text shows up or `deadline`
    /// passes; returns an empty string on timeout.
    fn wait_for_reply(&mut self, deadline: Instant) -> anyhow::Result<String> {
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            let text = self.channel.drain(self.timing.settle, left)?;
            if !text.trim().is_empty() {
                return Ok(text);
            }
            if Instant::now() >= deadline {
                return Ok(String::new());
            }
        }
    }

    fn fresh_token(&mut self) -> String {
        loop {
            let token: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(TOKEN_LENGTH)
                .map(char::from)
                .collect();
            if self.used_tokens.insert(token.clone()) {
                return token;
            }
        }
    }
}

/// Text strictly between the first and last occurrence of `token`, trimmed.
/// `None` when the token never appears.
pub fn extract_answer(text: &str, token: &str) -> Option<String> {
    let first = text.find(token)?;
    let last = text.rfind(token)?;
    let start = first + token.len();
    if last <= first || start > last {
        return Some(String::new());
    }
    Some(text[start..last].trim().to_string())
}

/// Runs a full install over `channel`: authenticate, verify, resolve, send.
/// The channel is closed whether or not the install succeeds.
pub fn run_install<C: Channel>(
    channel: C,
    host: &HostConfig,
    doc: CompiledDocument,
    mut table: SubstitutionTable,
) -> anyhow::Result<InstallReport> {
    let mut session = Session::new(
        channel,
        SessionTiming::from_host(host),
        &host.identity_marker,
    );
    let outcome = drive(&mut session, host, doc, &mut table);
    tracing::debug!(state = ?session.state(), "closing session");
    let closed = session.close();
    let report = outcome?;
    closed?;
    Ok(report)
}

fn drive<C: Channel>(
    session: &mut Session<C>,
    host: &HostConfig,
    doc: CompiledDocument,
    table: &mut SubstitutionTable,
) -> anyhow::Result<InstallReport> {
    session.authenticate(&host.username, &host.password)?;
    session.verify_identity()?;
    let mut text = doc.text;
    let resolved = session.resolve_searches(&doc.searches, table, &mut text)?;
    let lines_sent = session.transmit(&text)?;
    Ok(InstallReport {
        host: format!("{}:{}", host.address, host.port),
        resolved,
        lines_sent,
    })
}

pub fn install(
    host: &HostConfig,
    doc: CompiledDocument,
    table: SubstitutionTable,
) -> anyhow::Result<InstallReport> {
    tracing::info!(address = %host.address, port = host.port, "connecting");
    let channel = TcpChannel::connect(&host.address, host.port)?;
    run_install(channel, host, doc, table)
}
