use actix_web::{delete, get, post, put, web, HttpResponse};
use bson::oid::ObjectId;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::FindOptions, Client, Collection};
use serde::Deserialize;
use serde_json::json;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::expenses::check_amount;
use crate::schemas::{Debt, Direction, Status};
use crate::DB_NAME;

fn debts(client: &Client) -> Collection<Debt> {
    client.database(DB_NAME).collection("Debts")
}

#[derive(Deserialize)]
struct AddDebtJson {
    #[serde(rename = "friendName")]
    friend_name: String,
    amount: f64,
    #[serde(rename = "type")]
    direction: Direction,
}

#[post("/add-debt")]
pub async fn add_debt(
    client: web::Data<Client>,
    identity: Identity,
    json: web::Json<AddDebtJson>,
) -> Result<HttpResponse, ApiError> {
    let json = json.into_inner();
    if json.friend_name.trim().is_empty() {
        return Err(ApiError::Validation(
            "friendName must not be empty".to_owned(),
        ));
    }
    check_amount(json.amount)?;
    let debt = Debt {
        id: ObjectId::new().to_hex(),
        owner: identity.0,
        friend_name: json.friend_name,
        amount: json.amount,
        direction: json.direction,
        status: Status::Pending,
        date: Utc::now(),
    };
    debts(&client).insert_one(&debt, None).await?;
    Ok(HttpResponse::Created().json(debt))
}

/// Settled debts stay in the store but drop out of the default view, so the
/// list filters on status as well as owner.
#[get("/all-debts")]
pub async fn all_debts(
    client: web::Data<Client>,
    identity: Identity,
) -> Result<HttpResponse, ApiError> {
    let newest_first = FindOptions::builder().sort(doc! { "date": -1 }).build();
    let found: Vec<Debt> = debts(&client)
        .find(
            doc! { "owner": &identity.0, "status": "Pending" },
            newest_first,
        )
        .await?
        .try_collect()
        .await?;
    Ok(HttpResponse::Ok().json(found))
}

#[delete("/delete-debt/{id}")]
pub async fn delete_debt(
    client: web::Data<Client>,
    identity: Identity,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let debt = debts(&client)
        .find_one(doc! { "id": &id }, None)
        .await?
        .ok_or(ApiError::NotFound("Debt record"))?;
    if debt.owner != identity.0 {
        return Err(ApiError::Forbidden);
    }
    debts(&client).delete_one(doc! { "id": &id }, None).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Debt deleted!" })))
}

#[put("/settle-debt/{id}")]
pub async fn settle_debt(
    client: web::Data<Client>,
    identity: Identity,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let debt = debts(&client)
        .find_one(doc! { "id": &id }, None)
        .await?
        .ok_or(ApiError::NotFound("Debt record"))?;
    if debt.owner != identity.0 {
        return Err(ApiError::Forbidden);
    }
    // The write is re-applied even if the debt is already settled; the
    // result is the same either way.
    debts(&client)
        .update_one(
            doc! { "id": &id },
            doc! { "$set": { "status": "Settled" } },
            None,
        )
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Balance settled!" })))
}
