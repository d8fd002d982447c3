use redis::{aio::ConnectionManager, Client};

// ConnectionManager сам переподключается после обрыва соединения
#[derive(Clone)]
pub struct RedisClient {
    pub conn: ConnectionManager,
}

impl RedisClient {
    pub async fn new(redis_url: &str) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        Ok(RedisClient { conn })
    }
}
