pub mod auth_store;
pub mod clock;
pub mod persistence;
pub mod stock_store;

pub use auth_store::{AuthStore, Session, SessionCache, SessionStatus};
pub use clock::{Clock, ManualClock, SystemClock};
pub use persistence::{FileStorage, MemoryStorage, StateStorage};
pub use stock_store::StockStore;
