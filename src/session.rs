//! # Chat Session
//!
//! Orchestrates the pipeline across refresh cycles.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        REFRESH CYCLE                                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  HostApi::search_messages ──► resolve_canonical                         │
//! │                                    │                                    │
//! │              ┌─────────────────────┼──────────────────────┐             │
//! │              ▼                     ▼                      ▼             │
//! │       participant set      selected-sender         dedup-key map        │
//! │       (unfiltered)         filter                  (reply lookups)      │
//! │              │                     │                      │             │
//! │              ▼                     └───────┬──────────────┘             │
//! │       name resolution                      ▼                            │
//! │       (cached)                     Reconciler::reconcile                │
//! │                                    (decode + render only for            │
//! │                                     new or revised messages)            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A fetch failure abandons the whole cycle before any render state is
//! touched; the next tick retries. Login state, the name directory, and
//! the reconciler live here so every cache has one owner and a clear
//! lifetime.

use std::collections::HashMap;
use std::time::Duration;

use crate::api::{Account, HostApi, SendDestination};
use crate::error::{Error, Result};
use crate::message::{filter_by_sender, participants, resolve_canonical};
use crate::names::{truncate_address, NameDirectory};
use crate::payload::{encode_payload, ParsedPayload};
use crate::render::links::LinkTarget;
use crate::render::{render_message, RenderContext};
use crate::scheduler::RefreshScheduler;
use crate::view::{Reconciler, ReconcileStats, RenderTarget};

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Group timeline under view
    pub group_id: i64,
    /// Periodic refresh interval
    pub refresh_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { group_id: 0, refresh_interval: Duration::from_secs(15) }
    }
}

/// Send-flow transitions, reported so the UI can disable input while a
/// send is in flight and restore it afterwards. On `Failed` the caller
/// keeps its draft text; the session never clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    /// The payload is on its way to the host
    Sending,
    /// The host accepted the message
    Sent,
    /// The host rejected the message; the draft must be preserved
    Failed,
}

/// One entry of the participant list, rebuilt in full every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Sender address
    pub address: String,
    /// Resolved display name (or truncated address)
    pub display_name: String,
    /// Whether this is the logged-in account
    pub is_self: bool,
}

/// The chat session: host handle, caches, reconciler, and filter state.
pub struct ChatSession<A: HostApi> {
    api: A,
    config: SessionConfig,
    account: Option<Account>,
    names: NameDirectory,
    reconciler: Reconciler,
    selected_sender: Option<String>,
    participants: Vec<Participant>,
}

impl<A: HostApi> ChatSession<A> {
    /// A fresh session over the given host handle.
    pub fn new(api: A, config: SessionConfig) -> Self {
        Self {
            api,
            config,
            account: None,
            names: NameDirectory::new(),
            reconciler: Reconciler::new(),
            selected_sender: None,
            participants: Vec::new(),
        }
    }

    /// The logged-in account, if any.
    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    /// Whether an account is logged in.
    pub fn is_logged_in(&self) -> bool {
        self.account.is_some()
    }

    /// Fetches the host account and resolves its display name.
    pub async fn login(&mut self) -> Result<Account> {
        let account = self.api.get_account().await?;
        let name = self.names.display_name(&self.api, &account.address).await;
        tracing::info!("logged in as {name}");
        self.account = Some(account.clone());
        Ok(account)
    }

    /// Clears login state and every per-login cache.
    pub fn logout(&mut self) {
        self.account = None;
        self.names.clear();
        tracing::info!("logged out");
    }

    /// Restricts the view to one sender, or lifts the restriction. Takes
    /// effect on the next refresh.
    pub fn set_selected_sender(&mut self, sender: Option<String>) {
        self.selected_sender = sender;
    }

    /// The current sender restriction.
    pub fn selected_sender(&self) -> Option<&str> {
        self.selected_sender.as_deref()
    }

    /// The participant list from the last refresh, independent of the
    /// selected-sender filter.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Runs one full refresh cycle against the rendering target.
    ///
    /// A fetch failure returns before any shared state is mutated: render
    /// state, participants, and caches survive untouched for the retry.
    pub async fn refresh<T>(&mut self, target: &mut T) -> Result<ReconcileStats>
    where
        T: RenderTarget + ?Sized,
    {
        let batch = self.api.search_messages(self.config.group_id).await?;
        tracing::debug!("fetched {} raw messages", batch.len());

        let canonical = resolve_canonical(batch);
        let senders = participants(&canonical);

        // Resolve every sender up front so rendering stays synchronous.
        for address in &senders {
            self.names.display_name(&self.api, address).await;
        }

        self.participants = senders
            .into_iter()
            .map(|address| {
                let display_name = match self.names.cached_name(&address) {
                    Some(name) => name.to_string(),
                    None => truncate_address(&address),
                };
                let is_self = self.account.as_ref().is_some_and(|a| a.address == address);
                Participant { address, display_name, is_self }
            })
            .collect();

        let filtered = filter_by_sender(&canonical, self.selected_sender.as_deref());
        let mut by_key: HashMap<String, &_> = HashMap::with_capacity(canonical.len());
        for msg in &canonical {
            by_key.insert(msg.dedup_key().to_string(), msg);
        }

        let ctx = RenderContext {
            by_key: &by_key,
            names: &self.names,
            own_address: self.account.as_ref().map(|a| a.address.as_str()),
        };
        let stats = self
            .reconciler
            .reconcile(&filtered, |msg| render_message(msg, &ctx), target);

        tracing::info!(
            "cycle: {} canonical, {} shown, +{} ~{} -{}",
            canonical.len(),
            filtered.len(),
            stats.inserted,
            stats.replaced,
            stats.removed,
        );
        Ok(stats)
    }

    /// Sends a typed message to the group under view.
    ///
    /// The periodic timer is suppressed for the duration of the host call
    /// and resumed on either outcome. Success triggers an immediate
    /// refresh so the message appears without waiting a tick. Blank input
    /// is a silent no-op.
    pub async fn send<T, F>(
        &mut self,
        text: &str,
        scheduler: &RefreshScheduler,
        target: &mut T,
        mut on_state: F,
    ) -> Result<()>
    where
        T: RenderTarget + ?Sized,
        F: FnMut(SendState),
    {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        let payload = encode_payload(&ParsedPayload::from_plain_text(trimmed))?;

        on_state(SendState::Sending);
        scheduler.pause();
        let outcome = self
            .api
            .send_message(SendDestination::Group(self.config.group_id), &payload)
            .await;
        scheduler.resume();

        match outcome {
            Ok(()) => {
                on_state(SendState::Sent);
                self.refresh(target).await?;
                Ok(())
            }
            Err(err) => {
                on_state(SendState::Failed);
                tracing::warn!("send failed: {err}");
                Err(Error::SendFailed(err.to_string()))
            }
        }
    }

    /// Performs the host-side action behind an activated link.
    pub async fn activate_link(&self, link: &LinkTarget) -> Result<()> {
        match link {
            LinkTarget::JoinGroup { group_id } => self.api.join_group(*group_id).await,
            LinkTarget::OpenExternal { uri } => self.api.open_external(uri).await,
            LinkTarget::Embed { .. } => Ok(()),
            LinkTarget::Invalid => Err(Error::InvalidLink("malformed resource link".into())),
        }
    }

    /// Drives periodic refreshes until the scheduler is stopped. The first
    /// tick fires immediately; ticks that land while a cycle is running or
    /// while the scheduler is paused are skipped. Failed cycles are logged
    /// and retried on the next tick.
    pub async fn run<T>(&mut self, scheduler: &RefreshScheduler, target: &mut T)
    where
        T: RenderTarget + ?Sized,
    {
        let mut ticker = tokio::time::interval(self.config.refresh_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        while !scheduler.is_stopped() {
            ticker.tick().await;
            let Some(_cycle) = scheduler.try_begin_cycle() else {
                tracing::debug!("refresh tick skipped");
                continue;
            };
            if let Err(err) = self.refresh(target).await {
                tracing::warn!("refresh cycle abandoned: {err}");
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
