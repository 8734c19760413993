pub mod hash_state;
pub mod transactions;
