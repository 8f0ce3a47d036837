use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

pub async fn ensure_indexes(db: &Database) -> Result<(), String> {
    // subscribers: unique chat id
    {
        let col = db.collection::<mongodb::bson::Document>("subscribers");
        let model = IndexModel::builder()
            .keys(doc! { "chat_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // alerts: helpful for the watch-loop scan and for per-owner listing
    {
        let col = db.collection::<mongodb::bson::Document>("alerts");

        let model = IndexModel::builder()
            .keys(doc! { "triggered": 1, "symbol": 1 })
            .build();
        let _ = col.create_index(model, None).await;

        let model = IndexModel::builder()
            .keys(doc! { "owner": 1, "created_at": -1 })
            .build();
        let _ = col.create_index(model, None).await;
    }

    Ok(())
}
