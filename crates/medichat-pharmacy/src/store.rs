//! `PharmacyStore`: the single owner of all pharmacy state.
//!
//! Every operation takes the store lock for its whole duration, so each
//! call sees and leaves a consistent catalog, cart, order book and ledger.
//! Cloning the store shares the same state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use medichat_contracts::error::{MediChatError, MediChatResult};

use crate::{
    account::{normalize_email, PublicUser, Registration, Session, UserRecord},
    cart::{self, CartCommand, CartItem, CartView},
    catalog::{seed_products, Product, ProductQuery},
    order::{DeliveryAddress, NewOrder, Order, OrderLine},
    payment::{PaymentMethod, PaymentOrder, PaymentRequest},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct StoreState {
    pub(crate) products: Vec<Product>,
    pub(crate) cart: Vec<CartItem>,
    pub(crate) orders: Vec<Order>,
    pub(crate) payments: Vec<PaymentOrder>,
    pub(crate) users: Vec<UserRecord>,
}

// ── Public store ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PharmacyStore {
    state: Arc<Mutex<StoreState>>,
}

impl PharmacyStore {
    /// An empty store: no products, no users.
    pub fn empty() -> Self {
        Self::from_state(StoreState {
            products: Vec::new(),
            cart: Vec::new(),
            orders: Vec::new(),
            payments: Vec::new(),
            users: Vec::new(),
        })
    }

    /// A store with the standard catalog and the demo account
    /// `user@example.com` / `password123`.
    pub fn seeded() -> Self {
        let store = Self::empty();
        {
            let mut state = store.lock();
            state.products = seed_products();
            let demo = Registration {
                email: "user@example.com".to_string(),
                password: "password123".to_string(),
                name: "John Doe".to_string(),
                phone: "+1234567890".to_string(),
            };
            match UserRecord::new("1".to_string(), demo) {
                Ok(record) => state.users.push(record),
                Err(err) => error!(error = %err, "demo account could not be created"),
            }
        }
        store
    }

    fn from_state(state: StoreState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    // A panic mid-operation leaves plain data behind; keep serving it.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Catalog ──────────────────────────────────────────────────────────────

    pub fn list_products(&self, query: &ProductQuery) -> Vec<Product> {
        let state = self.lock();
        let products: Vec<Product> = state
            .products
            .iter()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();
        debug!(
            category = ?query.category,
            search = ?query.search,
            count = products.len(),
            "listed products"
        );
        products
    }

    pub fn product(&self, id: &str) -> MediChatResult<Product> {
        self.lock()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found("product", id))
    }

    // ── Cart ─────────────────────────────────────────────────────────────────

    pub fn cart(&self) -> MediChatResult<CartView> {
        CartView::of(&self.lock().cart)
    }

    /// Apply `command`. The cart is left unchanged when the command fails
    /// or the new total would overflow.
    pub fn update_cart(&self, command: CartCommand) -> MediChatResult<CartView> {
        let mut state = self.lock();
        let state = &mut *state;
        let product = state.products.iter().find(|p| p.id == command.product_id);
        let mut items = state.cart.clone();
        cart::apply(&mut items, &command, product)?;
        let view = CartView::of(&items)?;
        state.cart = items;

        debug!(
            product_id = %command.product_id,
            action = ?command.action,
            lines = view.items.len(),
            total = %view.total_price,
            "cart updated"
        );
        Ok(view)
    }

    // ── Orders ───────────────────────────────────────────────────────────────

    pub fn create_order(&self, new: NewOrder) -> MediChatResult<Order> {
        let order = Order::place(new)?;
        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total = %order.total_amount,
            "order created"
        );
        self.lock().orders.push(order.clone());
        Ok(order)
    }

    /// Turn the current cart into an order and empty the cart.
    pub fn checkout(&self, user_id: &str, delivery_address: DeliveryAddress) -> MediChatResult<Order> {
        let mut state = self.lock();
        if state.cart.is_empty() {
            return Err(MediChatError::invalid("cart", "Your cart is empty."));
        }
        let lines = state
            .cart
            .iter()
            .map(|item| OrderLine {
                product_id: item.product.id.clone(),
                quantity: item.quantity,
                price: item.product.price,
            })
            .collect();
        let order = Order::place(NewOrder {
            user_id: user_id.to_string(),
            lines,
            delivery_address,
        })?;

        state.cart.clear();
        state.orders.push(order.clone());
        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total = %order.total_amount,
            "checked out"
        );
        Ok(order)
    }

    /// All orders, or only those of `user_id`, oldest first.
    pub fn orders(&self, user_id: Option<&str>) -> Vec<Order> {
        self.lock()
            .orders
            .iter()
            .filter(|o| user_id.map_or(true, |u| o.user_id == u))
            .cloned()
            .collect()
    }

    pub fn order(&self, id: &str) -> MediChatResult<Order> {
        self.lock()
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| not_found("order", id))
    }

    // ── Payment ──────────────────────────────────────────────────────────────

    pub fn create_payment_order(&self, request: PaymentRequest) -> MediChatResult<PaymentOrder> {
        let payment = PaymentOrder::create(request)?;
        info!(
            payment_order_id = %payment.id,
            amount = payment.amount,
            currency = %payment.currency,
            receipt = %payment.receipt,
            "payment order created"
        );
        self.lock().payments.push(payment.clone());
        Ok(payment)
    }

    /// Settle a payment order. When its receipt names a known order, that
    /// order is confirmed.
    pub fn process_payment(&self, payment_order_id: &str, method: PaymentMethod) -> MediChatResult<PaymentOrder> {
        let mut state = self.lock();
        let state = &mut *state;
        let payment = state
            .payments
            .iter_mut()
            .find(|p| p.id == payment_order_id)
            .ok_or_else(|| not_found("payment order", payment_order_id))?;

        if let Err(err) = payment.settle(method) {
            warn!(payment_order_id, error = %err, "payment rejected");
            return Err(err);
        }

        if let Some(order) = state.orders.iter_mut().find(|o| o.id == payment.receipt) {
            order.mark_paid();
            info!(order_id = %order.id, "order confirmed");
        }
        info!(payment_order_id, method = %method, "payment processed");
        Ok(payment.clone())
    }

    // ── Accounts ─────────────────────────────────────────────────────────────

    pub fn register(&self, registration: Registration) -> MediChatResult<Session> {
        let mut state = self.lock();
        let email = normalize_email(&registration.email);
        if state.users.iter().any(|u| u.user.email == email) {
            return Err(MediChatError::Conflict {
                reason: "an account with this email already exists".to_string(),
            });
        }
        let id = (state.users.len() + 1).to_string();
        let record = UserRecord::new(id, registration)?;
        let user = record.user.clone();
        state.users.push(record);

        info!(user_id = %user.id, "user registered");
        Ok(Session::open(user))
    }

    pub fn login(&self, email: &str, password: &str) -> MediChatResult<Session> {
        let state = self.lock();
        let email = normalize_email(email);
        let user = state
            .users
            .iter()
            .find(|u| u.user.email == email && u.password_matches(password))
            .map(|u| u.user.clone());

        match user {
            Some(user) => {
                debug!(user_id = %user.id, "login succeeded");
                Ok(Session::open(user))
            }
            None => {
                warn!("login rejected");
                Err(MediChatError::Unauthorized {
                    reason: "invalid email or password".to_string(),
                })
            }
        }
    }

    pub fn user(&self, id: &str) -> MediChatResult<PublicUser> {
        self.lock()
            .users
            .iter()
            .find(|u| u.user.id == id)
            .map(|u| u.user.clone())
            .ok_or_else(|| not_found("user", id))
    }
}

impl Default for PharmacyStore {
    fn default() -> Self {
        Self::seeded()
    }
}

fn not_found(entity: &str, id: &str) -> MediChatError {
    MediChatError::NotFound {
        entity: entity.to_string(),
        id: id.to_string(),
    }
}
