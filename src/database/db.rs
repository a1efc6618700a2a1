use mongodb::IndexModel;
use mongodb::bson::{Document, doc};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Database as MongoDatabase};
use std::error::Error;

pub struct Database {
    pub client: Client,
}

impl Database {
    pub async fn init(mongodb_uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = ClientOptions::parse(mongodb_uri).await?;
        client_options.app_name = Some("jobfeed".to_string());

        let client = Client::with_options(client_options)?;

        // Ping the server to see if you can connect to the cluster
        client.database("admin").run_command(doc! {"ping": 1}).await?;

        log::info!("Connected successfully to MongoDB");

        Ok(Self { client })
    }

    /// Indexes the feature services rely on for lookups and uniqueness.
    pub async fn ensure_indexes(&self, database_name: &str) -> Result<(), Box<dyn Error>> {
        let db = self.client.database(database_name);

        create_index(&db, "comments", doc! { "post_id": 1, "created_at": 1 }, false).await?;
        create_index(&db, "comments", doc! { "parent_comment_id": 1 }, false).await?;
        create_index(&db, "posts", doc! { "created_at": -1 }, false).await?;
        create_index(&db, "jobs", doc! { "company_id": 1, "created_at": -1 }, false).await?;
        create_index(&db, "applications", doc! { "job_id": 1, "applicant_id": 1 }, true).await?;
        create_index(
            &db,
            "follows",
            doc! { "follower.kind": 1, "follower.id": 1, "following.kind": 1, "following.id": 1 },
            true,
        )
        .await?;

        Ok(())
    }
}

async fn create_index(
    db: &MongoDatabase,
    collection: &str,
    keys: Document,
    unique: bool,
) -> Result<(), mongodb::error::Error> {
    let options = IndexOptions::builder().unique(unique).build();
    let model = IndexModel::builder().keys(keys).options(options).build();
    db.collection::<Document>(collection).create_index(model).await?;
    Ok(())
}

// Convenience wrapper around Database::init() that also prepares indexes
pub async fn connect_to_mongo(mongodb_uri: &str, database_name: &str) -> Result<Client, Box<dyn Error>> {
    let database = Database::init(mongodb_uri).await.map_err(|e| {
        log::error!("Failed to initialize database: {:?}", e);
        e
    })?;
    database.ensure_indexes(database_name).await?;
    Ok(database.client)
}
