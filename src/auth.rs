use actix_web::{dev::Payload, post, web, FromRequest, HttpRequest, HttpResponse};
use bson::oid::ObjectId;
use chrono::Utc;
use futures::future::{ready, Ready};
use mongodb::{bson::doc, Client, Collection};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::schemas::{User, UserId};
use crate::token::{TokenError, TokenService};
use crate::DB_NAME;

pub const AUTH_HEADER: &str = "auth-token";

// Matches the ~10-round work factor the stored hashes were tuned for.
const HASH_COST: u32 = 10;

fn users(client: &Client) -> Collection<User> {
    client.database(DB_NAME).collection("Users")
}

#[derive(Deserialize)]
struct RegisterJson {
    name: String,
    email: String,
    secret: String,
}

#[derive(Deserialize)]
struct LoginJson {
    email: String,
    secret: String,
}

#[post("/register")]
pub async fn register(
    client: web::Data<Client>,
    tokens: web::Data<TokenService>,
    json: web::Json<RegisterJson>,
) -> Result<HttpResponse, ApiError> {
    let json = json.into_inner();
    if json.name.trim().is_empty() || json.email.trim().is_empty() || json.secret.is_empty() {
        return Err(ApiError::Validation(
            "name, email and secret are required".to_owned(),
        ));
    }
    // The duplicate check runs before any hashing work. Emails are compared
    // exactly as stored, case included.
    if users(&client)
        .find_one(doc! { "email": &json.email }, None)
        .await?
        .is_some()
    {
        return Err(ApiError::DuplicateIdentity);
    }
    let user = User {
        id: ObjectId::new().to_hex(),
        name: json.name,
        email: json.email,
        secret_hash: bcrypt::hash(&json.secret, HASH_COST)?,
        date: Utc::now(),
    };
    users(&client).insert_one(&user, None).await?;
    let auth_token = tokens.issue(&user.id);
    Ok(HttpResponse::Ok().json(json!({ "success": true, "authToken": auth_token })))
}

#[post("/login")]
pub async fn login(
    client: web::Data<Client>,
    tokens: web::Data<TokenService>,
    json: web::Json<LoginJson>,
) -> Result<HttpResponse, ApiError> {
    let json = json.into_inner();
    let user = users(&client)
        .find_one(doc! { "email": &json.email }, None)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;
    if !bcrypt::verify(&json.secret, &user.secret_hash)? {
        return Err(ApiError::InvalidCredentials);
    }
    let auth_token = tokens.issue(&user.id);
    Ok(HttpResponse::Ok().json(json!({ "success": true, "authToken": auth_token })))
}

/// The caller's identity, resolved by the authorization guard. Protected
/// handlers take this as an argument, so extraction fails the request with
/// 401 before the handler body ever runs. Ownership of individual records
/// is checked per handler, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub UserId);

impl FromRequest for Identity {
    type Error = ApiError;
    type Future = Ready<Result<Identity, ApiError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve_identity(req))
    }
}

fn resolve_identity(req: &HttpRequest) -> Result<Identity, ApiError> {
    let header = req
        .headers()
        .get(AUTH_HEADER)
        .ok_or(ApiError::AuthRequired)?;
    let token = header.to_str().map_err(|_| TokenError::Malformed)?;
    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .expect("TokenService is registered at startup");
    let user_id = tokens.verify(token)?;
    Ok(Identity(user_id))
}
