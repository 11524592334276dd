// NGO ↔ artisan connections: request, accept, reject, withdraw.
// Transition rules are pure functions in `policy`; SQL lives in `store`.

pub mod handlers;
pub mod policy;
pub mod store;
