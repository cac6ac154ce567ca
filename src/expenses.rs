use actix_web::{delete, get, post, web, HttpResponse};
use bson::oid::ObjectId;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::FindOptions, Client, Collection};
use serde::Deserialize;
use serde_json::json;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::schemas::{Category, Expense};
use crate::DB_NAME;

fn expenses(client: &Client) -> Collection<Expense> {
    client.database(DB_NAME).collection("Expenses")
}

pub(crate) fn check_amount(amount: f64) -> Result<(), ApiError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(ApiError::Validation(
            "amount must be a positive number".to_owned(),
        ))
    }
}

#[derive(Deserialize)]
struct AddExpenseJson {
    title: String,
    amount: f64,
    category: Option<Category>,
}

#[post("/add-expense")]
pub async fn add_expense(
    client: web::Data<Client>,
    identity: Identity,
    json: web::Json<AddExpenseJson>,
) -> Result<HttpResponse, ApiError> {
    let json = json.into_inner();
    if json.title.trim().is_empty() {
        return Err(ApiError::Validation("title must not be empty".to_owned()));
    }
    check_amount(json.amount)?;
    let expense = Expense {
        id: ObjectId::new().to_hex(),
        owner: identity.0,
        title: json.title,
        amount: json.amount,
        category: json.category.unwrap_or_default(),
        date: Utc::now(),
    };
    expenses(&client).insert_one(&expense, None).await?;
    Ok(HttpResponse::Created().json(expense))
}

#[get("/all-expenses")]
pub async fn all_expenses(
    client: web::Data<Client>,
    identity: Identity,
) -> Result<HttpResponse, ApiError> {
    let newest_first = FindOptions::builder().sort(doc! { "date": -1 }).build();
    let found: Vec<Expense> = expenses(&client)
        .find(doc! { "owner": &identity.0 }, newest_first)
        .await?
        .try_collect()
        .await?;
    Ok(HttpResponse::Ok().json(found))
}

#[delete("/delete-expense/{id}")]
pub async fn delete_expense(
    client: web::Data<Client>,
    identity: Identity,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let expense = expenses(&client)
        .find_one(doc! { "id": &id }, None)
        .await?
        .ok_or(ApiError::NotFound("Expense"))?;
    if expense.owner != identity.0 {
        return Err(ApiError::Forbidden);
    }
    expenses(&client).delete_one(doc! { "id": &id }, None).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Expense deleted!" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_must_be_positive_and_finite() {
        assert!(check_amount(50.0).is_ok());
        assert!(check_amount(0.01).is_ok());
        assert!(check_amount(0.0).is_err());
        assert!(check_amount(-5.0).is_err());
        assert!(check_amount(f64::NAN).is_err());
        assert!(check_amount(f64::INFINITY).is_err());
    }

    #[test]
    fn add_expense_body_requires_title_and_amount() {
        assert!(serde_json::from_str::<AddExpenseJson>(r#"{ "amount": 50 }"#).is_err());
        assert!(serde_json::from_str::<AddExpenseJson>(r#"{ "title": "Coffee" }"#).is_err());
        let body: AddExpenseJson =
            serde_json::from_str(r#"{ "title": "Coffee", "amount": 50 }"#).unwrap();
        assert_eq!(body.title, "Coffee");
        assert_eq!(body.amount, 50.0);
        assert_eq!(body.category, None);
    }
}
