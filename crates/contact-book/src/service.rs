//! # Contact Book Service
//!
//! Plays the host runtime's role around the pure contract: one message at a
//! time, it loads state, runs the transition on a working copy, commits and
//! asks the ledger to settle. Any failure leaves storage and balances as they
//! were and bounces the message.
//!
//! ## Processing steps
//!
//! 1. Load committed state (`NotDeployed` if none)
//! 2. Read the balance and credit the inbound value
//! 3. Decode the body and run the transition on a clone
//! 4. Check invariants (if enabled)
//! 5. Commit, then settle; re-commit the original state if settlement fails

use crate::adapters::{InMemoryLedger, InMemoryStateStore};
use crate::codec;
use crate::domain::entities::{
    ContactBookState, ContactMap, ExecutionContext, FeeSchedule, InboundMessage, InitParams,
};
use crate::domain::invariants::check_all_invariants;
use crate::domain::messages::{ContractMessage, MessageKind};
use crate::domain::services;
use crate::domain::value_objects::{Address, Body, Coins};
use crate::errors::{ConfigError, ContractError};
use crate::ports::inbound::{ContactBookApi, TransactionReceipt};
use crate::ports::outbound::{LedgerHost, StateStore};

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Contact Book Service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Fees charged per outgoing message.
    pub fees: FeeSchedule,
    /// Check state invariants before every commit.
    pub check_invariants: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            fees: FeeSchedule::default(),
            check_invariants: true,
        }
    }
}

impl ServiceConfig {
    /// Reads `CB_MESSAGE_FEE` (decimal coins) and `CB_CHECK_INVARIANTS`.
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` if a variable is set but does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`ServiceConfig::from_env`] with a custom variable source.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` if a variable is set but does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("CB_MESSAGE_FEE") {
            config.fees.per_message = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "CB_MESSAGE_FEE",
                value: raw.clone(),
            })?;
        }

        if let Some(raw) = lookup("CB_CHECK_INVARIANTS") {
            config.check_invariants = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "CB_CHECK_INVARIANTS",
                        value: raw,
                    })
                }
            };
        }

        Ok(config)
    }
}

// =============================================================================
// STATISTICS
// =============================================================================

/// Statistics for the Contact Book Service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Inbound messages handled.
    pub messages_processed: u64,
    /// Transitions committed.
    pub successful: u64,
    /// Messages bounced.
    pub failed: u64,
    /// Messages rejected because the sender was not the owner.
    pub unauthorized_rejections: u64,
    /// Outgoing messages emitted.
    pub outgoing_messages: u64,
    /// Commits undone after a settlement failure.
    pub rollbacks: u64,
}

// =============================================================================
// SERVICE
// =============================================================================

/// The main Contact Book Service.
///
/// One instance serves one deployed contract. Deliveries are serialised, so
/// concurrent callers observe the contract one message at a time.
pub struct ContactBookService<S: StateStore, L: LedgerHost> {
    config: ServiceConfig,
    address: Address,
    store: Arc<S>,
    ledger: Arc<L>,
    /// Held for the whole load→commit→settle sequence.
    delivery: Mutex<()>,
    stats: Arc<RwLock<ServiceStats>>,
}

impl<S: StateStore, L: LedgerHost> ContactBookService<S, L> {
    /// Deploy a new contract.
    ///
    /// The address is derived from `init`. The initial state is committed
    /// first, then `value` is credited from `deployer`; if that settlement
    /// fails the state is removed again, so the ledger never credits an
    /// address without a contract.
    ///
    /// # Errors
    ///
    /// `InitialBookTooLarge`, `AlreadyDeployed`, or a storage/ledger error.
    #[instrument(skip(store, ledger, init, config), fields(owner = %init.owner, capacity = init.capacity))]
    pub async fn deploy(
        store: Arc<S>,
        ledger: Arc<L>,
        init: InitParams,
        deployer: Address,
        value: Coins,
        config: ServiceConfig,
    ) -> Result<Self, ContractError> {
        let state = ContactBookState::from_init(&init)?;
        let address = services::compute_contract_address(&init)?;

        if store.exists(address).await? {
            warn!(contract = %address, "Contract already deployed");
            return Err(ContractError::AlreadyDeployed(address));
        }

        store.commit(address, &state).await?;
        let deploy_message = InboundMessage::new(deployer, value, Body::new());
        if let Err(err) = ledger
            .settle(address, &deploy_message, &[], &config.fees)
            .await
        {
            store.remove(address).await?;
            warn!(contract = %address, error = %err, "Deploy value not settled, state removed");
            return Err(err.into());
        }

        info!(contract = %address, contacts = state.len(), "Contact book deployed");
        #[cfg(feature = "metrics")]
        contact_telemetry::metrics::set_contacts_stored(state.len());

        Ok(Self::from_parts(store, ledger, address, config))
    }

    /// Attach to a contract that is already deployed.
    ///
    /// # Errors
    ///
    /// `NotDeployed` if nothing is stored at `address`.
    pub async fn attach(
        store: Arc<S>,
        ledger: Arc<L>,
        address: Address,
        config: ServiceConfig,
    ) -> Result<Self, ContractError> {
        if !store.exists(address).await? {
            return Err(ContractError::NotDeployed);
        }
        Ok(Self::from_parts(store, ledger, address, config))
    }

    fn from_parts(store: Arc<S>, ledger: Arc<L>, address: Address, config: ServiceConfig) -> Self {
        Self {
            config,
            address,
            store,
            ledger,
            delivery: Mutex::new(()),
            stats: Arc::new(RwLock::new(ServiceStats::default())),
        }
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The ledger this service settles against.
    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    async fn load(&self) -> Result<ContactBookState, ContractError> {
        self.store
            .load(self.address)
            .await?
            .ok_or(ContractError::NotDeployed)
    }

    /// Handle one inbound message end to end.
    #[instrument(skip(self, message), fields(sender = %message.sender, value = %message.value))]
    async fn deliver(&self, message: InboundMessage) -> Result<TransactionReceipt, ContractError> {
        let _guard = self.delivery.lock().await;

        let decoded = codec::decode(&message.body);
        let kind = decoded.as_ref().ok().map(ContractMessage::kind);
        let result = match decoded {
            Ok(decoded) => self.apply(&message, decoded).await,
            Err(err) => Err(err.into()),
        };

        self.record(kind, &result).await;

        if let Err(err) = &result {
            if err.is_authorization_failure() {
                warn!(error = %err, "Rejected sender");
            } else {
                debug!(error = %err, "Transition failed");
            }
            if let Err(bounce_err) = self
                .ledger
                .bounce(self.address, &message, err.label())
                .await
            {
                error!(error = %bounce_err, "Failed to bounce message");
            }
        }
        result
    }

    async fn apply(
        &self,
        message: &InboundMessage,
        decoded: ContractMessage,
    ) -> Result<TransactionReceipt, ContractError> {
        let original = self.load().await?;
        let balance = self
            .ledger
            .balance(self.address)
            .await?
            .checked_add(message.value)
            .ok_or(ContractError::ValueOverflow)?;

        let ctx = ExecutionContext {
            contract: self.address,
            sender: message.sender,
            inbound_value: message.value,
            balance,
            fees: self.config.fees,
        };
        let kind = decoded.kind();

        let mut working = original.clone();
        let transition = services::execute(&mut working, &ctx, decoded)?;

        if self.config.check_invariants {
            if let Some(description) =
                check_all_invariants(&original, &working, &transition, &ctx).describe()
            {
                error!(%description, "Invariant violation");
                return Err(ContractError::InvariantViolation(description));
            }
        }
        let value_sent = transition
            .total_value()
            .ok_or(ContractError::ValueOverflow)?;

        let changed = working != original;
        if changed {
            self.store.commit(self.address, &working).await?;
        }

        let fees_paid = match self
            .ledger
            .settle(self.address, message, &transition.outgoing, &self.config.fees)
            .await
        {
            Ok(fees) => fees,
            Err(err) => {
                if changed {
                    self.store.commit(self.address, &original).await?;
                    self.stats.write().await.rollbacks += 1;
                }
                error!(error = %err, "Settlement failed, state rolled back");
                return Err(ContractError::from_settlement(self.address, err));
            }
        };

        info!(
            %kind,
            messages = transition.outgoing.len(),
            value_sent = %value_sent,
            fees = %fees_paid,
            "Transition committed"
        );

        #[cfg(feature = "metrics")]
        {
            contact_telemetry::metrics::set_contacts_stored(working.len());
            if kind == MessageKind::Broadcast {
                contact_telemetry::metrics::observe_broadcast_fanout(transition.outgoing.len());
            }
        }

        Ok(TransactionReceipt {
            kind,
            outgoing: transition.outgoing,
            events: transition.events,
            value_sent,
            fees_paid,
        })
    }

    async fn record(
        &self,
        kind: Option<MessageKind>,
        result: &Result<TransactionReceipt, ContractError>,
    ) {
        let mut stats = self.stats.write().await;
        stats.messages_processed += 1;
        match result {
            Ok(receipt) => {
                stats.successful += 1;
                stats.outgoing_messages += receipt.outgoing.len() as u64;
            }
            Err(err) => {
                stats.failed += 1;
                if err.is_authorization_failure() {
                    stats.unauthorized_rejections += 1;
                }
            }
        }
        drop(stats);

        #[cfg(feature = "metrics")]
        {
            let kind = kind.map_or("undecodable", |k| k.as_str());
            match result {
                Ok(receipt) => {
                    contact_telemetry::metrics::record_message(kind, "ok");
                    contact_telemetry::metrics::record_outgoing(receipt.outgoing.len());
                }
                Err(err) => contact_telemetry::metrics::record_message(kind, err.label()),
            }
        }
        #[cfg(not(feature = "metrics"))]
        let _ = kind;
    }
}

/// Create a service on fresh in-memory adapters, for tests and examples.
///
/// The contract is deployed by its owner with no value attached.
///
/// # Errors
///
/// See [`ContactBookService::deploy`].
pub async fn create_test_service(
    init: InitParams,
) -> Result<ContactBookService<InMemoryStateStore, InMemoryLedger>, ContractError> {
    let owner = init.owner;
    ContactBookService::deploy(
        Arc::new(InMemoryStateStore::new()),
        Arc::new(InMemoryLedger::new()),
        init,
        owner,
        Coins::ZERO,
        ServiceConfig::default(),
    )
    .await
}

// =============================================================================
// ContactBookApi Implementation
// =============================================================================

#[async_trait]
impl<S: StateStore, L: LedgerHost> ContactBookApi for ContactBookService<S, L> {
    async fn handle_message(
        &self,
        message: InboundMessage,
    ) -> Result<TransactionReceipt, ContractError> {
        self.deliver(message).await
    }

    async fn get_address_stat(&self, address: Address) -> Result<Option<u64>, ContractError> {
        let state = self.load().await?;
        Ok(services::get_address_stat(&state, &address))
    }

    async fn owner(&self) -> Result<Address, ContractError> {
        Ok(self.load().await?.owner())
    }

    async fn capacity(&self) -> Result<u32, ContractError> {
        Ok(self.load().await?.capacity())
    }

    async fn contacts(&self) -> Result<ContactMap, ContractError> {
        Ok(self.load().await?.contacts().clone())
    }

    async fn balance(&self) -> Result<Coins, ContractError> {
        Ok(self.ledger.balance(self.address).await?)
    }

    fn address(&self) -> Address {
        self.address
    }
}

// =============================================================================
// TESTS
// =============================================================================
