use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::models::CallType;
use crate::validate::{validate_contact_update, validate_new_contact};
use crate::AppState;

use super::{db_error, parse_body, reject};

async fn create_contact(data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let payload = match parse_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let new_contact = match validate_new_contact(&payload) {
        Ok(c) => c,
        Err(f) => return reject(f, "Contact validation failed"),
    };

    match data.db.insert_contact(&new_contact) {
        Ok(contact_id) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "contactId": contact_id,
            "message": "Contact created successfully"
        })),
        Err(e) => db_error("Failed to create contact", e),
    }
}

#[derive(Deserialize)]
struct ContactsQuery {
    #[serde(rename = "phoneNumber")]
    phone_number: Option<String>,
    #[serde(rename = "type")]
    contact_type: Option<String>,
    search: Option<String>,
}

/// Look up one contact by phone number, or list contacts filtered by type
/// and a case-insensitive name/number search.
async fn get_contacts(
    data: web::Data<AppState>,
    query: web::Query<ContactsQuery>,
) -> impl Responder {
    if let Some(phone) = &query.phone_number {
        return match data.db.get_contact_by_phone(phone) {
            Ok(Some(contact)) => HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "contact": contact
            })),
            Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
                "success": false,
                "error": "Contact not found"
            })),
            Err(e) => db_error("Failed to get contact", e),
        };
    }

    let contact_type = query.contact_type.as_deref().and_then(CallType::from_str);

    match data.db.list_contacts(contact_type, query.search.as_deref()) {
        Ok(contacts) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "count": contacts.len(),
            "contacts": contacts
        })),
        Err(e) => db_error("Failed to list contacts", e),
    }
}

async fn update_contact(data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let payload = match parse_body(&body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let (contact_id, update) = match validate_contact_update(&data.db, &payload) {
        Ok(u) => u,
        Err(f) => return reject(f, "Contact update validation failed"),
    };

    match data.db.update_contact(&contact_id, &update) {
        Ok(Some(contact)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "contact": contact,
            "message": "Contact updated successfully"
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": "Contact not found"
        })),
        Err(e) => db_error("Failed to update contact", e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/contacts")
            .route("", web::post().to(create_contact))
            .route("", web::get().to(get_contacts))
            .route("", web::put().to(update_contact)),
    );
}
