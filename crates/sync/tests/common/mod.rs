//! Shared fixtures: in-memory fakes for every engine collaborator.
//!
//! The fakes record every invocation so tests can assert not just on the
//! resulting state but on exactly which remote calls were (not) made.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tidepool_core::{CartLine, CurrencyCode, LineItem, PriceTable, ProductId, WishlistEntry};
use tidepool_sync::api::{ApiError, CartApi, WishlistApi};
use tidepool_sync::auth::AuthOracle;
use tidepool_sync::engine::{EngineDeps, EngineOptions, SyncEngine};
use tidepool_sync::notify::{Notice, Notifier};
use tidepool_sync::persist::{LocalStore, MemoryStore};
use tidepool_sync::store::StateStore;

// =============================================================================
// Builders
// =============================================================================

pub fn line_item(id: i64, usd_cents: i64) -> LineItem {
    LineItem {
        id: ProductId::new(id),
        name: format!("product-{id}"),
        prices: PriceTable::new().with(CurrencyCode::USD, Decimal::new(usd_cents, 2)),
        image_url: None,
        quantity: 1,
    }
}

pub fn wishlist_entry(id: i64) -> WishlistEntry {
    WishlistEntry {
        id: ProductId::new(id),
        name: format!("product-{id}"),
        prices: PriceTable::new(),
        image_url: None,
    }
}

// =============================================================================
// FakeCartApi
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CartMethod {
    FetchAll,
    AddOne,
    AddBulk,
    UpdateQuantity,
    RemoveOne,
    RemoveBulk,
    ClearAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartCall {
    FetchAll,
    AddOne(ProductId, u32),
    AddBulk(Vec<CartLine>),
    UpdateQuantity(ProductId, u32),
    RemoveOne(ProductId),
    RemoveBulk(Vec<ProductId>),
    ClearAll,
}

/// In-memory [`CartApi`] that records calls and fails on demand.
#[derive(Default)]
pub struct FakeCartApi {
    calls: Mutex<Vec<CartCall>>,
    remote: Mutex<Vec<LineItem>>,
    failing: Mutex<HashSet<CartMethod>>,
}

impl FakeCartApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// What `fetch_all` should answer.
    pub fn set_remote(&self, items: Vec<LineItem>) {
        *self.remote.lock().unwrap_or_else(PoisonError::into_inner) = items;
    }

    /// Make every future call of `method` answer HTTP 500.
    pub fn fail(&self, method: CartMethod) {
        self.failing.lock().unwrap_or_else(PoisonError::into_inner).insert(method);
    }

    /// Clear a scripted failure.
    pub fn succeed(&self, method: &CartMethod) {
        self.failing.lock().unwrap_or_else(PoisonError::into_inner).remove(method);
    }

    pub fn calls(&self) -> Vec<CartCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, call: CartCall, method: &CartMethod) -> Result<(), ApiError> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(call);
        if self.failing.lock().unwrap_or_else(PoisonError::into_inner).contains(method) {
            Err(ApiError::Status(500))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CartApi for FakeCartApi {
    async fn fetch_all(&self) -> Result<Vec<LineItem>, ApiError> {
        self.record(CartCall::FetchAll, &CartMethod::FetchAll)?;
        Ok(self.remote.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    async fn add_one(&self, id: ProductId, quantity: u32) -> Result<(), ApiError> {
        self.record(CartCall::AddOne(id, quantity), &CartMethod::AddOne)
    }

    async fn add_bulk(&self, lines: &[CartLine]) -> Result<(), ApiError> {
        self.record(CartCall::AddBulk(lines.to_vec()), &CartMethod::AddBulk)
    }

    async fn update_quantity(&self, id: ProductId, quantity: u32) -> Result<(), ApiError> {
        self.record(
            CartCall::UpdateQuantity(id, quantity),
            &CartMethod::UpdateQuantity,
        )
    }

    async fn remove_one(&self, id: ProductId) -> Result<(), ApiError> {
        self.record(CartCall::RemoveOne(id), &CartMethod::RemoveOne)
    }

    async fn remove_bulk(&self, ids: &[ProductId]) -> Result<(), ApiError> {
        self.record(CartCall::RemoveBulk(ids.to_vec()), &CartMethod::RemoveBulk)
    }

    async fn clear_all(&self) -> Result<(), ApiError> {
        self.record(CartCall::ClearAll, &CartMethod::ClearAll)
    }
}

// =============================================================================
// FakeWishlistApi
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WishlistMethod {
    FetchAll,
    AddOne,
    AddBulk,
    RemoveOne,
    RemoveBulk,
    ClearAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WishlistCall {
    FetchAll,
    AddOne(ProductId),
    AddBulk(Vec<ProductId>),
    RemoveOne(ProductId),
    RemoveBulk(Vec<ProductId>),
    ClearAll,
}

/// In-memory [`WishlistApi`] that records calls and fails on demand.
#[derive(Default)]
pub struct FakeWishlistApi {
    calls: Mutex<Vec<WishlistCall>>,
    remote: Mutex<Vec<WishlistEntry>>,
    failing: Mutex<HashSet<WishlistMethod>>,
}

impl FakeWishlistApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_remote(&self, entries: Vec<WishlistEntry>) {
        *self.remote.lock().unwrap_or_else(PoisonError::into_inner) = entries;
    }

    pub fn fail(&self, method: WishlistMethod) {
        self.failing.lock().unwrap_or_else(PoisonError::into_inner).insert(method);
    }

    /// Clear a scripted failure.
    pub fn succeed(&self, method: &WishlistMethod) {
        self.failing.lock().unwrap_or_else(PoisonError::into_inner).remove(method);
    }

    pub fn calls(&self) -> Vec<WishlistCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, call: WishlistCall, method: &WishlistMethod) -> Result<(), ApiError> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(call);
        if self.failing.lock().unwrap_or_else(PoisonError::into_inner).contains(method) {
            Err(ApiError::Status(500))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl WishlistApi for FakeWishlistApi {
    async fn fetch_all(&self) -> Result<Vec<WishlistEntry>, ApiError> {
        self.record(WishlistCall::FetchAll, &WishlistMethod::FetchAll)?;
        Ok(self.remote.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    async fn add_one(&self, id: ProductId) -> Result<(), ApiError> {
        self.record(WishlistCall::AddOne(id), &WishlistMethod::AddOne)
    }

    async fn add_bulk(&self, ids: &[ProductId]) -> Result<(), ApiError> {
        self.record(WishlistCall::AddBulk(ids.to_vec()), &WishlistMethod::AddBulk)
    }

    async fn remove_one(&self, id: ProductId) -> Result<(), ApiError> {
        self.record(WishlistCall::RemoveOne(id), &WishlistMethod::RemoveOne)
    }

    async fn remove_bulk(&self, ids: &[ProductId]) -> Result<(), ApiError> {
        self.record(
            WishlistCall::RemoveBulk(ids.to_vec()),
            &WishlistMethod::RemoveBulk,
        )
    }

    async fn clear_all(&self) -> Result<(), ApiError> {
        self.record(WishlistCall::ClearAll, &WishlistMethod::ClearAll)
    }
}

// =============================================================================
// Oracle and notifier fakes
// =============================================================================

/// [`AuthOracle`] whose answer a test can flip at will.
pub struct StaticOracle {
    authenticated: AtomicBool,
}

impl StaticOracle {
    pub fn new(authenticated: bool) -> Arc<Self> {
        Arc::new(Self {
            authenticated: AtomicBool::new(authenticated),
        })
    }

    pub fn set(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::SeqCst);
    }
}

impl AuthOracle for StaticOracle {
    fn has_valid_session(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }
}

/// [`Notifier`] that stores the notices it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).push(notice);
    }
}

// =============================================================================
// Harness
// =============================================================================

/// An engine wired entirely to in-memory fakes.
pub struct Harness {
    pub engine: SyncEngine,
    pub cart_api: Arc<FakeCartApi>,
    pub wishlist_api: Arc<FakeWishlistApi>,
    pub oracle: Arc<StaticOracle>,
    pub notifier: Arc<RecordingNotifier>,
    pub persist: Arc<MemoryStore>,
}

impl Harness {
    pub fn signed_in() -> Self {
        Self::build(true)
    }

    pub fn signed_out() -> Self {
        Self::build(false)
    }

    fn build(authenticated: bool) -> Self {
        let cart_api = FakeCartApi::new();
        let wishlist_api = FakeWishlistApi::new();
        let oracle = StaticOracle::new(authenticated);
        let notifier = RecordingNotifier::new();
        let persist = Arc::new(MemoryStore::new());

        let engine = SyncEngine::new(EngineDeps {
            store: StateStore::new(Arc::clone(&persist) as Arc<dyn LocalStore>),
            cart_api: Arc::clone(&cart_api) as Arc<dyn CartApi>,
            wishlist_api: Arc::clone(&wishlist_api) as Arc<dyn WishlistApi>,
            auth: Arc::clone(&oracle) as Arc<dyn AuthOracle>,
            notifier: Arc::clone(&notifier) as Arc<dyn Notifier>,
            options: EngineOptions::immediate(),
        });

        Self {
            engine,
            cart_api,
            wishlist_api,
            oracle,
            notifier,
            persist,
        }
    }
}
