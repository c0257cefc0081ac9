pub mod memory_coordination;
pub mod redis_coordination;

pub use memory_coordination::MemoryStore;
pub use redis_coordination::RedisStore;
