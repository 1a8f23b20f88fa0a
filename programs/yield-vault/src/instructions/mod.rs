pub mod add_pool;
pub mod create_market;
pub mod deposit;
pub mod emergency_withdraw;
pub mod harvest;
pub mod initialize;
pub mod manage_pool;
pub mod modify_position;
pub mod pool_accounts;
pub mod publish_rewards_root;
pub mod rebalance;
pub mod update_price_feed;
pub mod withdraw;

pub use add_pool::*;
pub use create_market::*;
pub use deposit::*;
pub use emergency_withdraw::*;
pub use harvest::*;
pub use initialize::*;
pub use manage_pool::*;
pub use modify_position::*;
pub use publish_rewards_root::*;
pub use rebalance::*;
pub use update_price_feed::*;
pub use withdraw::*;
