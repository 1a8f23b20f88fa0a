pub mod asset_config;
pub mod lock_record;
pub mod pool_registry;
pub mod position;
pub mod price_feed;
pub mod rewards;
pub mod vault;

pub use asset_config::*;
pub use lock_record::*;
pub use pool_registry::*;
pub use position::*;
pub use price_feed::*;
pub use rewards::*;
pub use vault::*;
