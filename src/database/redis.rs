use redis::AsyncCommands;
use redis::Client;
use redis::aio::MultiplexedConnection;

/// Redis connection wrapper
pub struct RedisClient {
    connection: MultiplexedConnection,
}

impl RedisClient {
    pub async fn init(redis_url: &str) -> Result<Self, String> {
        let client =
            Client::open(redis_url).map_err(|e| format!("Failed to create Redis client: {}", e))?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| format!("Failed to connect to Redis: {}", e))?;

        log::info!("Connected successfully to Redis");

        Ok(Self { connection })
    }

    pub fn get_connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }
}

/// Session lookups against the keys written by the identity provider.
#[derive(Clone)]
pub struct RedisService {
    connection: MultiplexedConnection,
}

impl RedisService {
    pub fn new(client: &RedisClient) -> Self {
        Self {
            connection: client.get_connection(),
        }
    }

    /// User id bound to a live session token, if any
    pub async fn validate_session(&self, token: &str) -> Result<Option<String>, String> {
        let mut conn = self.connection.clone();
        let token_key = session_key(token);

        let user_id: Option<String> = conn
            .get(&token_key)
            .await
            .map_err(|e| format!("Failed to validate session: {}", e))?;

        Ok(user_id)
    }
}

fn session_key(token: &str) -> String {
    format!("token:{}", token)
}

pub async fn connect_to_redis(redis_url: &str) -> Result<RedisClient, String> {
    RedisClient::init(redis_url).await
}

#[cfg(test)]
mod tests {
    use super::session_key;

    #[test]
    fn session_keys_are_namespaced() {
        assert_eq!(session_key("abc"), "token:abc");
    }
}
