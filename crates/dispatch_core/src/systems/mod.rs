//! Recovery systems run by the timeout supervisor. Each one acts only when
//! the session is still in the exact status its job expects; anything else is
//! counted as a stale job and ignored, which makes at-least-once redelivery
//! safe.

pub mod negotiation_timeout;
pub mod search_timeout;

pub use negotiation_timeout::negotiation_timeout_system;
pub use search_timeout::search_timeout_system;
